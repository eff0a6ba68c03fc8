// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Discovers Meteor client addons on GitHub and validates each candidate
//! repository.
//!
//! A run searches for candidate repositories, drops template clones and
//! blacklisted entries, then drives every remaining repository through the
//! [`Pipeline`]. Each repository ends up as exactly one [`AddonRecord`] or
//! one [`ErrorRecord`]; the [`Aggregator`] writes both collections as
//! `database.json` and `error_database.json`.
//!
//! Remote access goes through the [`AddonHost`] trait so the pipeline can be
//! exercised against in-memory hosts. [`GitHubHost`] is the production
//! implementation and [`PacedHost`] enforces the shared request interval.

mod aggregate;
mod asset;
mod blacklist;
mod cancel;
mod config;
mod descriptor;
mod error;
mod github;
mod host;
mod icon;
mod model;
mod patterns;
mod pipeline;
mod properties;
mod scraper;
mod version;

pub use aggregate::{ADDON_DATABASE_FILE, Aggregator, ERROR_DATABASE_FILE, Summary, WrittenDatabases};
pub use asset::select_asset;
pub use blacklist::Blacklist;
pub use cancel::{CancelHandle, CancelToken, cancellation};
pub use config::ScraperConfig;
pub use descriptor::{Entrypoint, Icon, MainClass, ModDescriptor, Person};
pub use error::{Error, FetchError, io_error, output_io_error};
pub use github::{DEFAULT_API_BASE, DEFAULT_RAW_BASE, DEFAULT_USER_AGENT, GitHubHost, GitHubSettings};
pub use host::{AddonHost, PacedHost, Pacer};
pub use icon::{DEFAULT_ICON_SIZE, IconError, compress_icon, thumbnail_dimensions};
pub use model::{
    AddonRecord, Database, DirEntry, DownloadMeta, EntryKind, ErrorRecord, ReleaseAsset,
    ReleaseInfo, RepoMeta, RepositoryRef, SearchPage,
};
pub use patterns::{
    TEMPLATE_DESCRIPTION, TEMPLATE_TITLE, features_from_source, find_discord_invite,
    is_default_readme, merge_features,
};
pub use pipeline::{DEFAULT_DESCRIPTION, Outcome, Pipeline, PipelineSettings, Rejection};
pub use properties::Properties;
pub use scraper::{RunReport, RunSettings, SEARCH_RESULT_LIMIT, Scraper, parse_repository_id};
pub use version::{DEFAULT_ACCEPTED_VERSIONS, VersionGate, VersionMeta};
