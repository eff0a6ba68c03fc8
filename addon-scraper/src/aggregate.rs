// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Accumulates pipeline outcomes and writes the two output databases.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
    time::Instant,
};

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    error::{Error, output_io_error},
    model::{AddonRecord, Database, ErrorRecord},
    pipeline::Outcome,
};

/// File name of the accepted addon database.
pub const ADDON_DATABASE_FILE: &str = "database.json";
/// File name of the rejected repository database.
pub const ERROR_DATABASE_FILE: &str = "error_database.json";

#[derive(Debug, Default,)]
struct Collections
{
    addons: Vec<AddonRecord,>,
    errors: Vec<ErrorRecord,>,
}

/// Append-only store shared by concurrent pipelines.
#[derive(Debug, Default,)]
pub struct Aggregator
{
    inner: Mutex<Collections,>,
}

/// Snapshot of both collections, sorted by id.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct Summary
{
    pub addons: Vec<AddonRecord,>,
    pub errors: Vec<ErrorRecord,>,
}

/// Paths written by [`Aggregator::write_to`].
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct WrittenDatabases
{
    pub addons: PathBuf,
    pub errors: PathBuf,
}

impl Aggregator
{
    pub fn new() -> Self
    {
        Self::default()
    }

    fn lock(&self,) -> MutexGuard<'_, Collections,>
    {
        // A panic while holding the lock cannot leave a half-pushed record.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner(),)
    }

    /// Records an outcome. Cancelled outcomes are dropped.
    pub fn record(&self, outcome: Outcome,)
    {
        match outcome {
            Outcome::Accepted(record,) => self.lock().addons.push(record,),
            Outcome::Rejected(record,) => self.lock().errors.push(record,),
            Outcome::Cancelled {
                id,
            } => debug!(repo = %id, "Dropping cancelled repository"),
        }
    }

    /// Number of accepted and rejected records so far.
    pub fn counts(&self,) -> (usize, usize,)
    {
        let collections = self.lock();
        (collections.addons.len(), collections.errors.len(),)
    }

    pub fn summary(&self,) -> Summary
    {
        let collections = self.lock();
        let mut addons = collections.addons.clone();
        let mut errors = collections.errors.clone();
        drop(collections,);

        addons.sort_by(|a, b| a.id.cmp(&b.id,),);
        errors.sort_by(|a, b| a.id.cmp(&b.id,),);
        Summary {
            addons,
            errors,
        }
    }

    /// Writes `database.json` and `error_database.json` into `dir`, creating
    /// the directory when missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutputIo`] when the directory or a file cannot be
    /// written and [`Error::Serialize`] when a record cannot be encoded.
    pub fn write_to(&self, dir: &Path,) -> Result<WrittenDatabases, Error,>
    {
        let summary = self.summary();
        fs::create_dir_all(dir,).map_err(|source| output_io_error(dir, source,),)?;

        let addons = dir.join(ADDON_DATABASE_FILE,);
        let errors = dir.join(ERROR_DATABASE_FILE,);
        write_database(&addons, summary.addons,)?;
        write_database(&errors, summary.errors,)?;

        Ok(WrittenDatabases {
            addons,
            errors,
        },)
    }
}

fn write_database<T: Serialize,>(path: &Path, records: Vec<T,>,) -> Result<(), Error,>
{
    let started = Instant::now();
    let count = records.len();
    let document = Database {
        database: records,
    };
    let mut json = serde_json::to_string_pretty(&document,)?;
    json.push('\n',);
    fs::write(path, json,).map_err(|source| output_io_error(path, source,),)?;

    info!(
        "Wrote {count} records to {} in {}ms",
        path.display(),
        started.elapsed().as_millis()
    );
    Ok((),)
}
