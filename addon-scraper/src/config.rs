// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Run configuration loaded from an optional YAML document.
//!
//! Every field has a default so an empty document, or no document at all,
//! describes the standard scrape. Relative paths are resolved against the
//! directory that contains the configuration file.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    blacklist::Blacklist,
    error::{self, Error},
    github::{DEFAULT_API_BASE, DEFAULT_RAW_BASE, DEFAULT_USER_AGENT, GitHubSettings},
    icon::DEFAULT_ICON_SIZE,
    pipeline::PipelineSettings,
    scraper::SEARCH_RESULT_LIMIT,
    version::{DEFAULT_ACCEPTED_VERSIONS, VersionGate},
};

/// Largest page size accepted by the search API.
const MAX_PER_PAGE: u32 = 100;

/// Scrape configuration.
///
/// # Examples
///
/// ```
/// use addon_scraper::ScraperConfig;
///
/// let config = ScraperConfig::parse("concurrency: 4\naccepted_minecraft_versions: [\"1.20\"]\n",)
///     .expect("valid configuration",);
/// assert_eq!(config.concurrency, 4);
/// assert_eq!(config.per_page, 100);
/// assert_eq!(config.version_gate().accepted(), ["1.20"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
#[serde(default, deny_unknown_fields)]
pub struct ScraperConfig
{
    /// Free-text part of the repository search.
    pub query:                       String,
    /// Language filter applied to the search.
    pub language:                    String,
    /// Only repositories updated within this many months are searched.
    pub updated_within_months:       u32,
    pub max_pages:                   u32,
    pub per_page:                    u32,
    /// Substrings accepted in `minecraft_version`.
    pub accepted_minecraft_versions: Vec<String,>,
    /// Number of repositories processed at the same time.
    pub concurrency:                 usize,
    /// Minimum spacing between any two remote calls.
    pub request_delay_ms:            u64,
    pub token_file:                  PathBuf,
    pub author_blacklist:            PathBuf,
    pub id_blacklist:                PathBuf,
    /// Directory receiving `database.json` and `error_database.json`.
    pub output_dir:                  PathBuf,
    pub api_base_url:                String,
    pub raw_base_url:                String,
    /// Thumbnail bound in pixels.
    pub icon_size:                   u32,
    pub user_agent:                  String,

    #[serde(skip)]
    base_dir: PathBuf,
}

impl Default for ScraperConfig
{
    fn default() -> Self
    {
        Self {
            query:                       "meteor addon".to_owned(),
            language:                    "Java".to_owned(),
            updated_within_months:       3,
            max_pages:                   10,
            per_page:                    MAX_PER_PAGE,
            accepted_minecraft_versions: DEFAULT_ACCEPTED_VERSIONS
                .iter()
                .map(|version| (*version).to_owned(),)
                .collect(),
            concurrency:                 1,
            request_delay_ms:            1000,
            token_file:                  PathBuf::from("github_key.txt",),
            author_blacklist:            PathBuf::from("author_blacklist.txt",),
            id_blacklist:                PathBuf::from("id_blacklist.txt",),
            output_dir:                  PathBuf::from(".",),
            api_base_url:                DEFAULT_API_BASE.to_owned(),
            raw_base_url:                DEFAULT_RAW_BASE.to_owned(),
            icon_size:                   DEFAULT_ICON_SIZE,
            user_agent:                  DEFAULT_USER_AGENT.to_owned(),
            base_dir:                    PathBuf::new(),
        }
    }
}

impl ScraperConfig
{
    /// Loads the configuration at `path`, or the defaults when `path` is
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read,
    /// [`Error::Parse`] for malformed YAML and [`Error::Validation`] when a
    /// value is out of range.
    pub fn load(path: Option<&Path,>,) -> Result<Self, Error,>
    {
        let Some(path,) = path else {
            debug!("No configuration file given, using defaults");
            return Ok(Self::default(),);
        };

        let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
        let mut config = Self::parse(&contents,)?;
        config.base_dir = path.parent().map(Path::to_path_buf,).unwrap_or_default();
        debug!("Loaded configuration from {}", path.display());
        Ok(config,)
    }

    /// Parses a YAML document. Relative paths stay relative to the working
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] or [`Error::Validation`].
    pub fn parse(contents: &str,) -> Result<Self, Error,>
    {
        let config: Self = if contents.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(contents,)?
        };
        config.validate()?;
        Ok(config,)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first offending field.
    pub fn validate(&self,) -> Result<(), Error,>
    {
        if self.query.trim().is_empty() {
            return Err(Error::validation("query must not be empty",),);
        }
        if self.concurrency == 0 {
            return Err(Error::validation("concurrency must be at least 1",),);
        }
        if self.per_page == 0 || self.per_page > MAX_PER_PAGE {
            return Err(Error::validation(format!("per_page must be between 1 and {MAX_PER_PAGE}"),),);
        }
        if self.max_pages == 0 {
            return Err(Error::validation("max_pages must be at least 1",),);
        }
        if u64::from(self.per_page,) * u64::from(self.max_pages,) > u64::from(SEARCH_RESULT_LIMIT,) {
            return Err(Error::validation(format!(
                "per_page * max_pages must not exceed {SEARCH_RESULT_LIMIT} search results"
            ),),);
        }
        if self.icon_size == 0 {
            return Err(Error::validation("icon_size must be at least 1",),);
        }
        if self.version_gate().accepted().is_empty() {
            return Err(Error::validation("accepted_minecraft_versions must not be empty",),);
        }
        Ok((),)
    }

    /// Resolves `path` against the configuration file's directory.
    pub fn resolve(&self, path: &Path,) -> PathBuf
    {
        if path.is_absolute() { path.to_path_buf() } else { self.base_dir.join(path,) }
    }

    /// Search query for repositories updated after `now` minus
    /// `updated_within_months`.
    ///
    /// # Examples
    ///
    /// ```
    /// use addon_scraper::ScraperConfig;
    /// use chrono::{TimeZone, Utc};
    ///
    /// let now = Utc.with_ymd_and_hms(2023, 5, 20, 12, 0, 0,).single().expect("valid date",);
    /// assert_eq!(
    ///     ScraperConfig::default().search_query(now),
    ///     "meteor addon language:Java archived:false in:readme,description updated:>2023-02-20"
    /// );
    /// ```
    pub fn search_query(&self, now: DateTime<Utc,>,) -> String
    {
        let today = now.date_naive();
        let since =
            today.checked_sub_months(Months::new(self.updated_within_months,),).unwrap_or(today,);
        format!(
            "{} language:{} archived:false in:readme,description updated:>{}",
            self.query.trim(),
            self.language,
            since.format("%Y-%m-%d")
        )
    }

    pub fn request_delay(&self,) -> Duration
    {
        Duration::from_millis(self.request_delay_ms,)
    }

    pub fn output_path(&self,) -> PathBuf
    {
        self.resolve(&self.output_dir,)
    }

    pub fn version_gate(&self,) -> VersionGate
    {
        VersionGate::new(self.accepted_minecraft_versions.iter().cloned(),)
    }

    /// Loads both blacklist files. Missing files yield empty sets.
    pub fn load_blacklist(&self,) -> Blacklist
    {
        Blacklist::load(&self.resolve(&self.author_blacklist,), &self.resolve(&self.id_blacklist,),)
    }

    pub fn pipeline_settings(&self,) -> PipelineSettings
    {
        PipelineSettings {
            raw_base: self.raw_base_url.clone(), icon_size: self.icon_size,
        }
    }

    pub fn github_settings(&self, token: Option<String,>,) -> GitHubSettings
    {
        GitHubSettings {
            api_base: self.api_base_url.clone(),
            token,
            user_agent: self.user_agent.clone(),
        }
    }

    /// Picks the API token: a non-blank `explicit` value, else the first
    /// line of the token file. A missing token is logged, not fatal.
    pub fn load_token(&self, explicit: Option<&str,>,) -> Option<String,>
    {
        if let Some(token,) = explicit.map(str::trim,).filter(|token| !token.is_empty(),) {
            return Some(token.to_owned(),);
        }

        let path = self.resolve(&self.token_file,);
        let token = fs::read_to_string(&path,)
            .ok()
            .and_then(|contents| contents.lines().next().map(|line| line.trim().to_owned(),),)
            .filter(|token| !token.is_empty(),);
        if token.is_none() {
            warn!("No API token found in {}, continuing unauthenticated", path.display());
        }
        token
    }
}
