// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Per-repository validation and extraction.
//!
//! [`Pipeline::run`] drives one search result through a fixed sequence of
//! stages. Each stage either yields the value the next one needs or stops
//! with a [`Rejection`]; the first rejection becomes the repository's
//! [`ErrorRecord`]. An [`AddonRecord`] is built only after every required
//! stage has succeeded, so partial records never leave this module.
//!
//! Stage order:
//!
//! 1. repository metadata and invite link from homepage/description
//! 2. README (present, not the untouched template; invite fallback)
//! 3. `gradle.properties` and `fabric.mod.json`
//! 4. descriptor authors against the blacklist
//! 5. Minecraft/Meteor versions and the version gate
//! 6. latest release and its installable asset
//! 7. Meteor entrypoint, display name and description
//! 8. main class source and feature list
//! 9. icon thumbnail
//!
//! Icon and secondary feature scan failures are logged and leave the
//! corresponding fields empty; they never reject.

use std::{fmt, sync::Arc, time::Instant};

use tracing::{debug, info, warn};

use crate::{
    asset::select_asset,
    blacklist::Blacklist,
    cancel::CancelToken,
    descriptor::{MainClass, ModDescriptor, RESOURCE_ROOT},
    error::FetchError,
    github::DEFAULT_RAW_BASE,
    host::AddonHost,
    icon::{DEFAULT_ICON_SIZE, compress_icon},
    model::{
        AddonRecord, DirEntry, DownloadMeta, EntryKind, ErrorRecord, RepoMeta, RepositoryRef,
    },
    patterns::{features_from_source, find_discord_invite, is_default_readme, merge_features},
    properties::Properties,
    version::{VersionGate, VersionMeta},
};

/// Repository file holding the README.
const README_PATH: &str = "README.md";
/// Repository file holding the build configuration.
const BUILD_CONFIG_PATH: &str = "gradle.properties";
/// Repository file holding the module descriptor.
const DESCRIPTOR_PATH: &str = "src/main/resources/fabric.mod.json";
/// Description used when the descriptor declares none.
pub const DEFAULT_DESCRIPTION: &str = "A Meteor Client Addon";
/// Suffix identifying Java sources during the module directory scan.
const JAVA_SUFFIX: &str = ".java";

/// Reason a repository was not accepted.
///
/// The [`Display`](fmt::Display) output is the exact text stored in
/// [`ErrorRecord::error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash,)]
pub enum Rejection
{
    NoReadme,
    UnusedTemplate,
    MissingBuildConfig,
    MissingDescriptor,
    MalformedDescriptor,
    BlacklistedAuthor,
    InvalidBuildConfig,
    OutdatedMinecraft,
    NoRelease,
    NoValidAsset,
    InvalidEntrypoint,
    InvalidMainClass,
}

impl Rejection
{
    pub fn reason(self,) -> &'static str
    {
        match self {
            Self::NoReadme => "No readme",
            Self::UnusedTemplate => "Unused clone/fork",
            Self::MissingBuildConfig => "Error getting gradle.properties data",
            Self::MissingDescriptor => "Error getting fabric.mod.json data",
            Self::MalformedDescriptor => "Error parsing fabric.mod.json data",
            Self::BlacklistedAuthor => "Blacklisted author in fabric json author list",
            Self::InvalidBuildConfig => "Error with gradle.properties",
            Self::OutdatedMinecraft => "Outdated minecraft version",
            Self::NoRelease => "No release available",
            Self::NoValidAsset => "No valid release asset available.",
            Self::InvalidEntrypoint => "Invalid or improper entrypoint",
            Self::InvalidMainClass => "Main class data is invalid",
        }
    }
}

impl fmt::Display for Rejection
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        f.write_str(self.reason(),)
    }
}

/// Terminal state of one repository.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub enum Outcome
{
    Accepted(AddonRecord,),
    Rejected(ErrorRecord,),
    /// Stopped at a stage boundary after cancellation; produces no record.
    Cancelled
    {
        id: String,
    },
}

impl Outcome
{
    pub fn id(&self,) -> &str
    {
        match self {
            Self::Accepted(record,) => record.id.as_str(),
            Self::Rejected(record,) => record.id.as_str(),
            Self::Cancelled {
                id,
            } => id.as_str(),
        }
    }
}

/// Why a run stopped before producing an addon record.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
enum Halt
{
    Rejected(Rejection,),
    Cancelled,
}

impl From<Rejection,> for Halt
{
    fn from(rejection: Rejection,) -> Self
    {
        Self::Rejected(rejection,)
    }
}

/// Settings that shape URLs and thumbnails.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct PipelineSettings
{
    /// Base for raw file URLs, e.g. `https://raw.githubusercontent.com`.
    pub raw_base:  String,
    /// Thumbnail bound in pixels.
    pub icon_size: u32,
}

impl Default for PipelineSettings
{
    fn default() -> Self
    {
        Self {
            raw_base: DEFAULT_RAW_BASE.to_owned(), icon_size: DEFAULT_ICON_SIZE,
        }
    }
}

/// Validation pipeline bound to a host and the run's policy.
#[derive(Debug,)]
pub struct Pipeline<H,>
{
    host:      H,
    blacklist: Arc<Blacklist,>,
    gate:      VersionGate,
    settings:  PipelineSettings,
}

impl<H,> Pipeline<H,>
where
    H: AddonHost,
{
    pub fn new(
        host: H,
        blacklist: Arc<Blacklist,>,
        gate: VersionGate,
        settings: PipelineSettings,
    ) -> Self
    {
        Self {
            host,
            blacklist,
            gate,
            settings,
        }
    }

    pub fn host(&self,) -> &H
    {
        &self.host
    }

    pub fn blacklist(&self,) -> &Blacklist
    {
        &self.blacklist
    }

    /// Processes one repository and returns exactly one outcome.
    ///
    /// Cancellation is observed between stages; a cancelled run returns
    /// [`Outcome::Cancelled`] and nothing else.
    pub async fn run(&self, repo: &RepositoryRef, cancel: &CancelToken,) -> Outcome
    {
        let repo_meta = RepoMeta::from_repository(repo,);
        let id = repo_meta.id();
        let started = Instant::now();
        debug!(repo = %id, "Checking repository");

        match self.evaluate(repo, &repo_meta, &id, cancel,).await {
            Ok(record,) => {
                info!(
                    repo = %id,
                    features = record.features.len(),
                    "Accepted addon in {}ms",
                    started.elapsed().as_millis()
                );
                Outcome::Accepted(record,)
            }
            Err(Halt::Rejected(rejection,),) => {
                info!(repo = %id, "Rejected: {rejection}");
                Outcome::Rejected(ErrorRecord {
                    repo_meta,
                    id,
                    error: rejection.to_string(),
                },)
            }
            Err(Halt::Cancelled,) => {
                info!(repo = %id, "Cancelled before completion");
                Outcome::Cancelled {
                    id,
                }
            }
        }
    }

    async fn evaluate(
        &self,
        repo: &RepositoryRef,
        repo_meta: &RepoMeta,
        id: &str,
        cancel: &CancelToken,
    ) -> Result<AddonRecord, Halt,>
    {
        let mut discord_url = invite_from_metadata(repo,);
        if let Some(invite,) = discord_url.as_deref() {
            debug!(repo = %id, "Found discord url in repository metadata: {invite}");
        }

        checkpoint(cancel,)?;
        let readme = self.fetch_required(id, repo_meta, README_PATH, Rejection::NoReadme,).await?;
        if is_default_readme(&readme,) {
            info!(repo = %id, "Repository is an unmodified template clone");
            return Err(Rejection::UnusedTemplate.into(),);
        }
        if discord_url.is_none() {
            discord_url = find_discord_invite(&readme,).map(str::to_owned,);
            if let Some(invite,) = discord_url.as_deref() {
                debug!(repo = %id, "Found discord url in readme: {invite}");
            }
        }

        checkpoint(cancel,)?;
        let build_config = self
            .fetch_required(id, repo_meta, BUILD_CONFIG_PATH, Rejection::MissingBuildConfig,)
            .await?;

        checkpoint(cancel,)?;
        let descriptor_text = self
            .fetch_required(id, repo_meta, DESCRIPTOR_PATH, Rejection::MissingDescriptor,)
            .await?;

        let descriptor = ModDescriptor::parse(&descriptor_text,).map_err(|e| {
            warn!(repo = %id, "Unable to parse fabric.mod.json: {e}");
            Rejection::MalformedDescriptor
        },)?;
        let authors = self.resolve_authors(id, repo_meta, &descriptor,)?;
        let versions = self.resolve_versions(id, &build_config,)?;

        checkpoint(cancel,)?;
        let download_meta = self.resolve_download(id, repo_meta,).await?;

        let main_class = descriptor.main_class().ok_or_else(|| {
            info!(repo = %id, "Unable to find meteor entrypoint");
            Rejection::InvalidEntrypoint
        },)?;
        let name = descriptor.display_name().unwrap_or(&repo_meta.name,).to_owned();
        let description = descriptor.display_description().unwrap_or(DEFAULT_DESCRIPTION,).to_owned();

        checkpoint(cancel,)?;
        let main_source = self
            .fetch_required(id, repo_meta, &main_class.source_path(), Rejection::InvalidMainClass,)
            .await?;

        checkpoint(cancel,)?;
        let features = self.resolve_features(id, repo_meta, &main_class, &main_source,).await;

        checkpoint(cancel,)?;
        let (icon_url, compressed_icon,) = self.resolve_icon(id, repo_meta, &descriptor,).await;

        checkpoint(cancel,)?;
        Ok(AddonRecord {
            id: id.to_owned(),
            name,
            description,
            authors,
            features,
            meteor_version: versions.meteor,
            minecraft_version: versions.minecraft,
            icon_url,
            compressed_icon,
            discord_url,
            repo_meta: repo_meta.clone(),
            download_meta,
        },)
    }

    /// Fetches a repository text file that must exist and be non-blank.
    async fn fetch_required(
        &self,
        id: &str,
        repo_meta: &RepoMeta,
        path: &str,
        rejection: Rejection,
    ) -> Result<String, Rejection,>
    {
        let url = repo_meta.raw_url(&self.settings.raw_base, path,);
        match self.host.fetch_text(&url,).await {
            Ok(text,) if !text.trim().is_empty() => Ok(text,),
            Ok(_,) => {
                info!(repo = %id, "{path} is empty");
                Err(rejection,)
            }
            Err(FetchError::NotFound {
                ..
            },) => {
                info!(repo = %id, "{path} doesn't exist in repository");
                Err(rejection,)
            }
            Err(error,) => {
                warn!(repo = %id, "Failed to fetch {path}: {error}");
                Err(rejection,)
            }
        }
    }

    fn resolve_authors(
        &self,
        id: &str,
        repo_meta: &RepoMeta,
        descriptor: &ModDescriptor,
    ) -> Result<Vec<String,>, Rejection,>
    {
        let authors =
            descriptor.author_names().unwrap_or_else(|| vec![repo_meta.author.clone()],);

        if let Some(blocked,) = authors.iter().find(|author| self.blacklist.is_blocked_author(author,),)
        {
            info!(repo = %id, "Project author {blocked} is blacklisted");
            return Err(Rejection::BlacklistedAuthor,);
        }
        Ok(authors,)
    }

    fn resolve_versions(&self, id: &str, build_config: &str,) -> Result<VersionMeta, Rejection,>
    {
        let versions = Properties::parse(build_config,)
            .as_ref()
            .and_then(VersionMeta::from_properties,)
            .ok_or_else(|| {
                info!(repo = %id, "Unable to find versions in gradle.properties");
                Rejection::InvalidBuildConfig
            },)?;

        if !self.gate.accepts(Some(versions.minecraft.as_str(),),) {
            info!(repo = %id, minecraft = %versions.minecraft, "Addon targets an outdated minecraft version");
            return Err(Rejection::OutdatedMinecraft,);
        }
        Ok(versions,)
    }

    async fn resolve_download(&self, id: &str, repo_meta: &RepoMeta,) -> Result<DownloadMeta, Rejection,>
    {
        let release = match self.host.latest_release(repo_meta,).await {
            Ok(release,) => release,
            Err(error,) if error.is_not_found() => {
                info!(repo = %id, "No release available");
                return Err(Rejection::NoRelease,);
            }
            Err(error,) => {
                warn!(repo = %id, "Failed to fetch latest release: {error}");
                return Err(Rejection::NoRelease,);
            }
        };

        let asset = select_asset(&release.assets,).ok_or_else(|| {
            info!(repo = %id, "No proper asset in the latest release");
            Rejection::NoValidAsset
        },)?;

        Ok(DownloadMeta {
            release_url:    release.html_url.clone(),
            download_url:   asset.browser_download_url.clone().unwrap_or_default(),
            file_name:      asset.name.clone(),
            download_count: asset.download_count,
        },)
    }

    async fn resolve_features(
        &self,
        id: &str,
        repo_meta: &RepoMeta,
        main_class: &MainClass,
        main_source: &str,
    ) -> Vec<String,>
    {
        let primary = features_from_source(main_source,);
        let secondary = if primary.is_empty() {
            debug!(repo = %id, "No features registered in the main class, scanning module sources");
            match self.scan_module_directory(repo_meta, main_class,).await {
                Ok(found,) => found,
                Err(error,) => {
                    warn!(repo = %id, "Unable to scan module sources: {error}");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let features = merge_features(primary, secondary,);
        if features.is_empty() {
            info!(repo = %id, "No features were found");
        }
        features
    }

    /// Lists `.java` files in the `modules` directory and in each of its
    /// immediate subdirectories. Deeper nesting is not visited.
    async fn scan_module_directory(
        &self,
        repo_meta: &RepoMeta,
        main_class: &MainClass,
    ) -> Result<Vec<String,>, FetchError,>
    {
        let root = main_class.modules_path();
        let entries = self.host.list_directory(repo_meta, &root,).await?;

        let mut features = java_class_names(&entries,);
        let folders: Vec<&DirEntry,> =
            entries.iter().filter(|entry| entry.kind == EntryKind::Dir,).collect();
        debug!(
            "Found {} top-level modules and {} module folders in {root}",
            features.len(),
            folders.len()
        );

        for folder in folders {
            let contents = self.host.list_directory(repo_meta, &folder.path,).await?;
            features.extend(java_class_names(&contents,),);
        }
        Ok(features,)
    }

    async fn resolve_icon(
        &self,
        id: &str,
        repo_meta: &RepoMeta,
        descriptor: &ModDescriptor,
    ) -> (Option<String,>, Option<String,>,)
    {
        let Some(path,) = descriptor.icon_path() else {
            debug!(repo = %id, "No icon declared");
            return (None, None,);
        };

        let url = repo_meta.raw_url(
            &self.settings.raw_base,
            &format!("{RESOURCE_ROOT}/{}", path.trim_start_matches('/')),
        );
        let started = Instant::now();

        let bytes = match self.host.fetch_bytes(&url,).await {
            Ok(bytes,) => bytes,
            Err(error,) => {
                warn!(repo = %id, "Unable to download icon: {error}");
                return (None, None,);
            }
        };

        match compress_icon(&bytes, self.settings.icon_size,) {
            Ok(encoded,) => {
                debug!(repo = %id, "Downloaded and compressed icon in {}ms", started.elapsed().as_millis());
                (Some(url,), Some(encoded,),)
            }
            Err(error,) => {
                warn!(repo = %id, "Unable to compress icon: {error}");
                (None, None,)
            }
        }
    }
}

fn checkpoint(cancel: &CancelToken,) -> Result<(), Halt,>
{
    if cancel.is_cancelled() { Err(Halt::Cancelled,) } else { Ok((),) }
}

/// Invite link from the homepage, else from the description.
fn invite_from_metadata(repo: &RepositoryRef,) -> Option<String,>
{
    [repo.homepage.as_deref(), repo.description.as_deref(),]
        .into_iter()
        .flatten()
        .find_map(find_discord_invite,)
        .map(str::to_owned,)
}

/// File names ending in `.java`, without the suffix.
fn java_class_names(entries: &[DirEntry],) -> Vec<String,>
{
    entries
        .iter()
        .filter(|entry| entry.kind == EntryKind::File,)
        .filter_map(|entry| entry.name.strip_suffix(JAVA_SUFFIX,),)
        .filter(|name| !name.is_empty(),)
        .map(str::to_owned,)
        .collect()
}
