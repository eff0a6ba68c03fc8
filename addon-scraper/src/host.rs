// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Seam between the pipeline and the code-hosting platform.
//!
//! [`AddonHost`] lists every remote collaborator the scraper needs. The
//! production implementation lives in [`crate::github`]; tests substitute an
//! in-memory host. [`PacedHost`] wraps any host so that all calls, from any
//! worker, pass through one shared [`Pacer`].

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::{
    sync::Mutex,
    time::{Instant, sleep_until},
};
use tracing::debug;

use crate::{
    error::FetchError,
    model::{DirEntry, ReleaseInfo, RepoMeta, RepositoryRef, SearchPage},
};

/// Remote operations required by the scraper.
#[async_trait]
pub trait AddonHost: Send + Sync
{
    /// Runs a repository search and returns one page of results.
    async fn search_repositories(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<SearchPage, FetchError,>;

    /// Looks up a single repository by owner and name.
    async fn repository(&self, owner: &str, name: &str,) -> Result<RepositoryRef, FetchError,>;

    /// Downloads a raw file as UTF-8 text.
    async fn fetch_text(&self, url: &str,) -> Result<String, FetchError,>;

    /// Downloads a raw file as bytes.
    async fn fetch_bytes(&self, url: &str,) -> Result<Vec<u8,>, FetchError,>;

    /// Lists a directory on the repository's default branch.
    async fn list_directory(
        &self,
        repo: &RepoMeta,
        path: &str,
    ) -> Result<Vec<DirEntry,>, FetchError,>;

    /// Fetches the latest published release.
    async fn latest_release(&self, repo: &RepoMeta,) -> Result<ReleaseInfo, FetchError,>;
}

#[async_trait]
impl<H,> AddonHost for Arc<H,>
where
    H: AddonHost + ?Sized,
{
    async fn search_repositories(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<SearchPage, FetchError,>
    {
        (**self).search_repositories(query, page, per_page,).await
    }

    async fn repository(&self, owner: &str, name: &str,) -> Result<RepositoryRef, FetchError,>
    {
        (**self).repository(owner, name,).await
    }

    async fn fetch_text(&self, url: &str,) -> Result<String, FetchError,>
    {
        (**self).fetch_text(url,).await
    }

    async fn fetch_bytes(&self, url: &str,) -> Result<Vec<u8,>, FetchError,>
    {
        (**self).fetch_bytes(url,).await
    }

    async fn list_directory(
        &self,
        repo: &RepoMeta,
        path: &str,
    ) -> Result<Vec<DirEntry,>, FetchError,>
    {
        (**self).list_directory(repo, path,).await
    }

    async fn latest_release(&self, repo: &RepoMeta,) -> Result<ReleaseInfo, FetchError,>
    {
        (**self).latest_release(repo,).await
    }
}

/// Minimum-interval gate shared by every caller.
///
/// Each [`wait`](Self::wait) returns no earlier than `interval` after the
/// previous one returned, regardless of which task called it.
#[derive(Debug,)]
pub struct Pacer
{
    interval: Duration,
    last:     Mutex<Option<Instant,>,>,
}

impl Pacer
{
    pub fn new(interval: Duration,) -> Self
    {
        Self {
            interval,
            last: Mutex::new(None,),
        }
    }

    pub fn interval(&self,) -> Duration
    {
        self.interval
    }

    /// Waits for the next free slot.
    pub async fn wait(&self,)
    {
        let mut last = self.last.lock().await;
        if let Some(previous,) = *last {
            let ready = previous + self.interval;
            if ready > Instant::now() {
                debug!("Pacing request for {}ms", (ready - Instant::now()).as_millis());
                sleep_until(ready,).await;
            }
        }
        *last = Some(Instant::now(),);
    }
}

/// Host decorator that awaits a shared [`Pacer`] before each call.
#[derive(Debug, Clone,)]
pub struct PacedHost<H,>
{
    inner: H,
    pacer: Arc<Pacer,>,
}

impl<H,> PacedHost<H,>
{
    pub fn new(inner: H, pacer: Arc<Pacer,>,) -> Self
    {
        Self {
            inner,
            pacer,
        }
    }

    pub fn inner(&self,) -> &H
    {
        &self.inner
    }
}

#[async_trait]
impl<H,> AddonHost for PacedHost<H,>
where
    H: AddonHost,
{
    async fn search_repositories(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<SearchPage, FetchError,>
    {
        self.pacer.wait().await;
        self.inner.search_repositories(query, page, per_page,).await
    }

    async fn repository(&self, owner: &str, name: &str,) -> Result<RepositoryRef, FetchError,>
    {
        self.pacer.wait().await;
        self.inner.repository(owner, name,).await
    }

    async fn fetch_text(&self, url: &str,) -> Result<String, FetchError,>
    {
        self.pacer.wait().await;
        self.inner.fetch_text(url,).await
    }

    async fn fetch_bytes(&self, url: &str,) -> Result<Vec<u8,>, FetchError,>
    {
        self.pacer.wait().await;
        self.inner.fetch_bytes(url,).await
    }

    async fn list_directory(
        &self,
        repo: &RepoMeta,
        path: &str,
    ) -> Result<Vec<DirEntry,>, FetchError,>
    {
        self.pacer.wait().await;
        self.inner.list_directory(repo, path,).await
    }

    async fn latest_release(&self, repo: &RepoMeta,) -> Result<ReleaseInfo, FetchError,>
    {
        self.pacer.wait().await;
        self.inner.latest_release(repo,).await
    }
}
