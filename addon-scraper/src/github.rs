// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! GitHub implementation of [`AddonHost`].
//!
//! REST calls go through an [`Octocrab`] client with partial response types
//! so only the fields the scraper reads have to be present. Raw files are
//! downloaded with `reqwest` from `raw.githubusercontent.com` (or whichever
//! base the configuration names).

use std::{fmt, time::Duration};

use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{Error, FetchError},
    host::AddonHost,
    model::{DirEntry, EntryKind, ReleaseAsset, ReleaseInfo, RepoMeta, RepositoryRef, SearchPage},
};

/// Public GitHub REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";
/// Public raw content endpoint.
pub const DEFAULT_RAW_BASE: &str = "https://raw.githubusercontent.com";
/// User agent sent with raw downloads.
pub const DEFAULT_USER_AGENT: &str = "meteor-addon-scraper";

const RAW_TIMEOUT: Duration = Duration::from_secs(30,);
/// Branch assumed when the API omits `default_branch`.
const FALLBACK_BRANCH: &str = "main";

/// Connection settings for [`GitHubHost`].
#[derive(Debug, Clone,)]
pub struct GitHubSettings
{
    pub api_base:   String,
    pub token:      Option<String,>,
    pub user_agent: String,
}

impl Default for GitHubSettings
{
    fn default() -> Self
    {
        Self {
            api_base:   DEFAULT_API_BASE.to_owned(),
            token:      None,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// GitHub-backed host.
#[derive(Clone,)]
pub struct GitHubHost
{
    api:  Octocrab,
    http: reqwest::Client,
}

impl fmt::Debug for GitHubHost
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        f.debug_struct("GitHubHost",).finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize,)]
struct SearchParams<'a,>
{
    q:        &'a str,
    per_page: u32,
    page:     u32,
}

#[derive(Debug, Serialize,)]
struct RefParams<'a,>
{
    #[serde(rename = "ref")]
    reference: &'a str,
}

#[derive(Debug, Deserialize,)]
struct ApiSearchResponse
{
    #[serde(default)]
    incomplete_results: bool,
    #[serde(default)]
    items:              Vec<ApiRepository,>,
}

#[derive(Debug, Deserialize,)]
struct ApiRepository
{
    name:           String,
    html_url:       String,
    #[serde(default)]
    default_branch: Option<String,>,
    #[serde(default)]
    homepage:       Option<String,>,
    #[serde(default)]
    description:    Option<String,>,
    #[serde(default)]
    owner:          Option<ApiOwner,>,
}

#[derive(Debug, Deserialize,)]
struct ApiOwner
{
    login: String,
}

#[derive(Debug, Deserialize,)]
struct ApiRelease
{
    html_url: String,
    #[serde(default)]
    assets:   Vec<ApiAsset,>,
}

#[derive(Debug, Deserialize,)]
struct ApiAsset
{
    name:                 String,
    #[serde(default)]
    browser_download_url: Option<String,>,
    #[serde(default)]
    download_count:       u64,
}

#[derive(Debug, Deserialize,)]
struct ApiContent
{
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

impl From<ApiRepository,> for RepositoryRef
{
    fn from(repo: ApiRepository,) -> Self
    {
        Self {
            name:           repo.name,
            html_url:       repo.html_url,
            default_branch: repo
                .default_branch
                .filter(|branch| !branch.is_empty(),)
                .unwrap_or_else(|| FALLBACK_BRANCH.to_owned(),),
            homepage:       repo.homepage,
            description:    repo.description,
            owner:          repo.owner.map(|owner| owner.login,),
        }
    }
}

impl From<ApiRelease,> for ReleaseInfo
{
    fn from(release: ApiRelease,) -> Self
    {
        Self {
            html_url: release.html_url,
            assets:   release
                .assets
                .into_iter()
                .map(|asset| ReleaseAsset {
                    name:                 asset.name,
                    browser_download_url: asset.browser_download_url,
                    download_count:       asset.download_count,
                },)
                .collect(),
        }
    }
}

impl From<ApiContent,> for DirEntry
{
    fn from(content: ApiContent,) -> Self
    {
        let kind = match content.kind.as_str() {
            "file" => EntryKind::File,
            "dir" => EntryKind::Dir,
            _ => EntryKind::Other,
        };
        Self {
            name: content.name,
            path: content.path,
            kind,
        }
    }
}

impl GitHubHost
{
    /// Builds the API and raw-content clients.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an unusable API base and
    /// [`Error::Service`] when either HTTP client cannot be constructed.
    pub fn new(settings: &GitHubSettings,) -> Result<Self, Error,>
    {
        let mut builder = Octocrab::builder()
            .base_uri(settings.api_base.as_str(),)
            .map_err(|e| Error::validation(format!("invalid API base URL: {e}"),),)?;
        if let Some(token,) = settings.token.as_ref() {
            builder = builder.personal_token(token.clone(),);
        }
        let api = builder
            .build()
            .map_err(|e| Error::service(format!("failed to initialize GitHub client: {e}"),),)?;

        let http = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str(),)
            .timeout(RAW_TIMEOUT,)
            .build()
            .map_err(|e| Error::service(format!("failed to initialize HTTP client: {e}"),),)?;

        Ok(Self {
            api,
            http,
        },)
    }

    async fn download(&self, url: &str,) -> Result<reqwest::Response, FetchError,>
    {
        debug!("Downloading {url}");
        let response = self
            .http
            .get(url,)
            .send()
            .await
            .map_err(|e| FetchError::transient(url, e.to_string(),),)?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(FetchError::not_found(url,),),
            status if !status.is_success() => {
                Err(FetchError::transient(url, format!("HTTP {}", status.as_u16()),),)
            }
            _ => Ok(response,),
        }
    }
}

fn api_error(route: &str, error: octocrab::Error,) -> FetchError
{
    match &error {
        octocrab::Error::GitHub {
            source, ..
        } if source.status_code.as_u16() == StatusCode::NOT_FOUND.as_u16()
            || source.message == "Not Found" =>
        {
            FetchError::not_found(route,)
        }
        _ => FetchError::transient(route, error.to_string(),),
    }
}

#[async_trait]
impl AddonHost for GitHubHost
{
    async fn search_repositories(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<SearchPage, FetchError,>
    {
        let route = "/search/repositories";
        let params = SearchParams {
            q: query, per_page, page,
        };
        let response: ApiSearchResponse =
            self.api.get(route, Some(&params,),).await.map_err(|e| api_error(route, e,),)?;

        Ok(SearchPage {
            items:              response.items.into_iter().map(RepositoryRef::from,).collect(),
            incomplete_results: response.incomplete_results,
        },)
    }

    async fn repository(&self, owner: &str, name: &str,) -> Result<RepositoryRef, FetchError,>
    {
        let route = format!("/repos/{owner}/{name}");
        let repo: ApiRepository =
            self.api.get(&route, None::<&(),>,).await.map_err(|e| api_error(&route, e,),)?;
        Ok(repo.into(),)
    }

    async fn fetch_text(&self, url: &str,) -> Result<String, FetchError,>
    {
        let text = self
            .download(url,)
            .await?
            .text()
            .await
            .map_err(|e| FetchError::transient(url, e.to_string(),),)?;
        Ok(match text.strip_prefix('\u{feff}',) {
            Some(stripped,) => stripped.to_owned(),
            None => text,
        },)
    }

    async fn fetch_bytes(&self, url: &str,) -> Result<Vec<u8,>, FetchError,>
    {
        let bytes = self
            .download(url,)
            .await?
            .bytes()
            .await
            .map_err(|e| FetchError::transient(url, e.to_string(),),)?;
        Ok(bytes.to_vec(),)
    }

    async fn list_directory(
        &self,
        repo: &RepoMeta,
        path: &str,
    ) -> Result<Vec<DirEntry,>, FetchError,>
    {
        let route = format!(
            "/repos/{}/{}/contents/{}",
            repo.author,
            repo.name,
            path.trim_matches('/')
        );
        let params = RefParams {
            reference: &repo.default_branch,
        };
        let contents: Vec<ApiContent,> =
            self.api.get(&route, Some(&params,),).await.map_err(|e| api_error(&route, e,),)?;
        Ok(contents.into_iter().map(DirEntry::from,).collect(),)
    }

    async fn latest_release(&self, repo: &RepoMeta,) -> Result<ReleaseInfo, FetchError,>
    {
        let route = format!("/repos/{}/{}/releases/latest", repo.author, repo.name);
        let release: ApiRelease =
            self.api.get(&route, None::<&(),>,).await.map_err(|e| api_error(&route, e,),)?;
        Ok(release.into(),)
    }
}
