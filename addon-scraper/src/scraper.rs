// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Batch runner: search, filter, fan out, aggregate.

use std::collections::HashSet;

use futures::{StreamExt, stream};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::{
    aggregate::Aggregator,
    cancel::CancelToken,
    error::Error,
    host::AddonHost,
    model::RepositoryRef,
    pipeline::{Outcome, Pipeline},
};

/// Number of results the search API serves for one query; pages past it fail.
pub const SEARCH_RESULT_LIMIT: u32 = 1000;

/// Search and fan-out parameters.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct RunSettings
{
    pub query:       String,
    pub per_page:    u32,
    pub max_pages:   u32,
    pub concurrency: usize,
    /// Draw an `indicatif` progress bar on stderr.
    pub progress:    bool,
}

/// Totals reported after a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq,)]
pub struct RunReport
{
    /// Repositories left after the blacklist filter.
    pub candidates: usize,
    pub accepted:   usize,
    pub rejected:   usize,
    /// Whether the run stopped early.
    pub cancelled:  bool,
}

/// Drives a [`Pipeline`] over every search result.
#[derive(Debug,)]
pub struct Scraper<H,>
{
    pipeline: Pipeline<H,>,
    settings: RunSettings,
}

impl<H,> Scraper<H,>
where
    H: AddonHost,
{
    pub fn new(pipeline: Pipeline<H,>, settings: RunSettings,) -> Self
    {
        Self {
            pipeline,
            settings,
        }
    }

    pub fn pipeline(&self,) -> &Pipeline<H,>
    {
        &self.pipeline
    }

    /// Pages through the search results, de-duplicated by `author/name`.
    ///
    /// Paging stops at `max_pages`, at the first short page, or once
    /// [`SEARCH_RESULT_LIMIT`] results have been requested.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Service`] when any search call fails; without the
    /// search there is nothing to process.
    pub async fn search(&self,) -> Result<Vec<RepositoryRef,>, Error,>
    {
        let RunSettings {
            query,
            per_page,
            max_pages,
            ..
        } = &self.settings;
        info!("Searching repositories: {query}");

        let mut found = Vec::new();
        let mut seen = HashSet::new();
        for page in 1..=*max_pages {
            if (page - 1).saturating_mul(*per_page,) >= SEARCH_RESULT_LIMIT {
                warn!(page, "Search result limit of {SEARCH_RESULT_LIMIT} reached");
                break;
            }
            let result = self
                .pipeline
                .host()
                .search_repositories(query, page, *per_page,)
                .await
                .map_err(|e| Error::service(format!("repository search failed: {e}"),),)?;

            if result.incomplete_results {
                warn!(page, "Search results are incomplete");
            }

            let count = result.items.len();
            for repo in result.items {
                if seen.insert(repo.candidate_id(),) {
                    found.push(repo,);
                }
            }
            info!(page, "Search page returned {count} repositories");

            if count < *per_page as usize {
                break;
            }
        }

        info!("Found {} repositories", found.len());
        Ok(found,)
    }

    /// Search results that survive the blacklist filter.
    ///
    /// # Errors
    ///
    /// See [`Scraper::search`].
    pub async fn candidates(&self,) -> Result<Vec<RepositoryRef,>, Error,>
    {
        let found = self.search().await?;
        let total = found.len();
        let candidates = self.pipeline.blacklist().filter(found,);
        info!("{} repositories remain after filtering {total}", candidates.len());
        Ok(candidates,)
    }

    /// Runs the pipeline for `repos` with bounded concurrency and records
    /// every outcome.
    ///
    /// Repositories not yet started when `cancel` fires are skipped.
    pub async fn process(
        &self,
        repos: Vec<RepositoryRef,>,
        cancel: &CancelToken,
        aggregator: &Aggregator,
    ) -> RunReport
    {
        let progress = self.progress_bar(repos.len(),);
        let mut report = RunReport {
            candidates: repos.len(),
            ..RunReport::default()
        };

        let mut outcomes = stream::iter(repos,)
            .map(|repo| async move {
                if cancel.is_cancelled() {
                    return Outcome::Cancelled {
                        id: repo.candidate_id(),
                    };
                }
                self.pipeline.run(&repo, cancel,).await
            },)
            .buffer_unordered(self.settings.concurrency.max(1,),);

        while let Some(outcome,) = outcomes.next().await {
            match &outcome {
                Outcome::Accepted(_,) => report.accepted += 1,
                Outcome::Rejected(_,) => report.rejected += 1,
                Outcome::Cancelled {
                    ..
                } => report.cancelled = true,
            }
            progress.set_message(outcome.id().to_owned(),);
            progress.inc(1,);
            aggregator.record(outcome,);
        }

        progress.finish_with_message(format!(
            "{} accepted, {} rejected",
            report.accepted, report.rejected
        ),);
        report
    }

    /// Searches, filters and processes every candidate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Service`] when the search fails. Per-repository
    /// failures never surface here.
    pub async fn run(&self, cancel: &CancelToken, aggregator: &Aggregator,) -> Result<RunReport, Error,>
    {
        let candidates = self.candidates().await?;
        let report = self.process(candidates, cancel, aggregator,).await;
        if report.cancelled {
            warn!("Run cancelled; unfinished repositories were skipped");
        }
        info!(
            accepted = report.accepted,
            rejected = report.rejected,
            "Processed {} repositories",
            report.candidates
        );
        Ok(report,)
    }

    /// Looks up `owner/name` and runs the pipeline for it alone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Service`] when the repository cannot be fetched.
    pub async fn check(&self, owner: &str, name: &str,) -> Result<Outcome, Error,>
    {
        let repo = self
            .pipeline
            .host()
            .repository(owner, name,)
            .await
            .map_err(|e| Error::service(format!("failed to look up {owner}/{name}: {e}"),),)?;

        if !self.pipeline.blacklist().admits(&repo,) {
            warn!(repo = %repo.candidate_id(), "Repository would be filtered by the blacklist");
        }
        Ok(self.pipeline.run(&repo, &CancelToken::never(),).await,)
    }

    fn progress_bar(&self, len: usize,) -> ProgressBar
    {
        if !self.settings.progress {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(len as u64,);
        let style = ProgressStyle::with_template(
            "{spinner:.yellow} [{elapsed_precise}] {bar:30.cyan/blue} {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar(),);
        bar.set_style(style,);
        bar
    }
}

/// Splits `owner/name`.
///
/// # Errors
///
/// Returns [`Error::Validation`] unless the input has exactly two non-empty
/// segments.
///
/// # Examples
///
/// ```
/// use addon_scraper::parse_repository_id;
///
/// assert_eq!(parse_repository_id("a/addon").expect("valid id"), ("a", "addon"));
/// assert!(parse_repository_id("addon").is_err());
/// ```
pub fn parse_repository_id(id: &str,) -> Result<(&str, &str,), Error,>
{
    match id.trim().split_once('/',) {
        Some((owner, name,),) if !owner.is_empty() && !name.is_empty() && !name.contains('/',) => {
            Ok((owner, name,),)
        }
        _ => Err(Error::validation(format!("expected <owner>/<name>, got '{id}'"),),),
    }
}
