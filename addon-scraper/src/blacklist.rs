// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Author and repository blacklists applied before per-repository work.
//!
//! Both lists are newline-delimited text files. A missing or empty file
//! degrades to an empty list and is reported through `tracing`; it never
//! aborts the run.

use std::{collections::HashSet, fs, path::Path, time::Instant};

use tracing::{info, warn};

use crate::model::RepositoryRef;

/// Name suffix used by clones of the addon template.
const TEMPLATE_SUFFIX: &str = "-addon-template";
/// Literal name of the addon template repository.
const TEMPLATE_NAME: &str = "template";

/// Blocked authors and `author/name` repository ids.
#[derive(Debug, Clone, Default, PartialEq, Eq,)]
pub struct Blacklist
{
    authors: HashSet<String,>,
    ids:     HashSet<String,>,
}

impl Blacklist
{
    /// Builds a blacklist from in-memory entries.
    pub fn new<A, I,>(authors: A, ids: I,) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String,>,
        I: IntoIterator,
        I::Item: Into<String,>,
    {
        Self {
            authors: authors.into_iter().map(Into::into,).collect(),
            ids:     ids.into_iter().map(Into::into,).collect(),
        }
    }

    /// Loads both lists from disk.
    ///
    /// Each file is read line by line; entries are trimmed and blank lines
    /// are skipped. Unreadable or empty files yield an empty list and a
    /// warning.
    pub fn load(author_path: &Path, id_path: &Path,) -> Self
    {
        let started = Instant::now();
        let authors = load_list(author_path, "author",);
        let ids = load_list(id_path, "repo id",);
        info!(
            authors = authors.len(),
            ids = ids.len(),
            "Loaded blacklists in {}ms",
            started.elapsed().as_millis()
        );

        Self {
            authors,
            ids,
        }
    }

    /// Whether `author` is blocked.
    pub fn is_blocked_author(&self, author: &str,) -> bool
    {
        self.authors.contains(author,)
    }

    /// Whether the `author/name` id is blocked.
    pub fn is_blocked_id(&self, id: &str,) -> bool
    {
        self.ids.contains(id,)
    }

    /// Whether the search result survives the filter.
    pub fn admits(&self, repo: &RepositoryRef,) -> bool
    {
        if repo.name.ends_with(TEMPLATE_SUFFIX,) || repo.name == TEMPLATE_NAME {
            return false;
        }

        let author = repo.author();
        let id = format!("{author}/{}", repo.name);
        !self.is_blocked_author(&author,) && !self.is_blocked_id(&id,)
    }

    /// Removes template clones and blacklisted repositories, preserving
    /// order.
    pub fn filter(&self, repos: Vec<RepositoryRef,>,) -> Vec<RepositoryRef,>
    {
        repos.into_iter().filter(|repo| self.admits(repo,),).collect()
    }
}

fn load_list(path: &Path, label: &str,) -> HashSet<String,>
{
    let content = match fs::read_to_string(path,) {
        Ok(content,) => content,
        Err(error,) => {
            warn!("Unable to load {label} blacklist from {}: {error}", path.display());
            return HashSet::new();
        }
    };

    let entries: HashSet<String,> = content
        .lines()
        .map(str::trim,)
        .filter(|line| !line.is_empty(),)
        .map(str::to_owned,)
        .collect();

    if entries.is_empty() {
        warn!("Unable to load {label} blacklist: {} is empty", path.display());
    }
    entries
}
