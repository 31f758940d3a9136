//! Multi-file front end: reads sources, parses each on its own worker, and locates includes.
//!
//! Every file gets a fresh lexer and parser; nothing is shared between workers except the
//! job and result channels.

use std::path::{Path, PathBuf};

use crossbeam_channel::unbounded;
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::ParseOptions;
use crate::{ParseResult, parse_with_options};

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("include \"{include}\" from {} not found (searched {} directories)", .from.display(), .searched.len())]
    IncludeNotFound { include: String, from: PathBuf, searched: Vec<PathBuf> },
}

/// One parsed file.
#[derive(Debug)]
pub struct FileResult {
    pub path: PathBuf,
    pub source: String,
    pub result: ParseResult,
}

pub fn parse_file(path: &Path, options: &ParseOptions) -> Result<FileResult, DriverError> {
    let source =
        std::fs::read_to_string(path).map_err(|source| DriverError::Read { path: path.to_path_buf(), source })?;
    let result = parse_with_options(&source, options);
    trace!(path = %path.display(), diagnostics = result.diagnostics.len(), "parsed file");
    Ok(FileResult { path: path.to_path_buf(), source, result })
}

/// Parse `paths` on up to `jobs` threads. Results are returned in input order.
pub fn parse_files(paths: &[PathBuf], options: &ParseOptions, jobs: usize) -> Vec<Result<FileResult, DriverError>> {
    let workers = jobs.clamp(1, paths.len().max(1));
    debug!(files = paths.len(), workers, "parsing files");

    let (job_tx, job_rx) = unbounded::<(usize, &Path)>();
    let (result_tx, result_rx) = unbounded();
    for (index, path) in paths.iter().enumerate() {
        // The receiver lives until the scope below ends.
        let _ = job_tx.send((index, path.as_path()));
    }
    drop(job_tx);

    std::thread::scope(|scope| {
        for worker in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for (index, path) in job_rx.iter() {
                    trace!(worker, index, path = %path.display(), "worker picked up file");
                    if result_tx.send((index, parse_file(path, options))).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(result_tx);

    let mut slots: Vec<Option<Result<FileResult, DriverError>>> = (0..paths.len()).map(|_| None).collect();
    for (index, result) in result_rx.iter() {
        slots[index] = Some(result);
    }
    slots.into_iter().flatten().collect()
}

/// Default worker count: one per available core.
pub fn default_jobs() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Maps an `include "path"` directive to a file on disk. The parser never follows includes itself.
pub trait IncludeResolver {
    fn resolve(&self, include: &str, from: &Path) -> Result<PathBuf, DriverError>;
}

/// Looks next to the including file first, then in each search directory in order.
#[derive(Debug, Clone, Default)]
pub struct SearchPathResolver {
    dirs: Vec<PathBuf>,
}

impl SearchPathResolver {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }
}

impl IncludeResolver for SearchPathResolver {
    fn resolve(&self, include: &str, from: &Path) -> Result<PathBuf, DriverError> {
        let requested = Path::new(include);
        if requested.is_absolute() {
            if requested.is_file() {
                return Ok(requested.to_path_buf());
            }
        } else {
            let here = from.parent().unwrap_or_else(|| Path::new("."));
            let mut searched = vec![here.to_path_buf()];
            searched.extend(self.dirs.iter().cloned());
            if let Some(found) = searched.iter().map(|dir| dir.join(requested)).find(|p| p.is_file()) {
                return Ok(found);
            }
            return Err(DriverError::IncludeNotFound {
                include: include.to_string(),
                from: from.to_path_buf(),
                searched,
            });
        }
        Err(DriverError::IncludeNotFound { include: include.to_string(), from: from.to_path_buf(), searched: Vec::new() })
    }
}

/// Resolve every include of an already parsed file, in source order.
pub fn resolve_includes(
    file: &FileResult,
    resolver: &dyn IncludeResolver,
) -> Vec<(String, Result<PathBuf, DriverError>)> {
    file.result
        .ast
        .includes
        .iter()
        .map(|inc| (inc.node.path.clone(), resolver.resolve(&inc.node.path, &file.path)))
        .collect()
}
