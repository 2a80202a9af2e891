//! Independent output tasks.
//!
//! Each [`Artifact`] produces one or more files and reports its own result.
//! [`run_artifacts`] runs them in order and keeps going after a failure or
//! a panic.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

use tracing::{error, info};

use crate::error::{MatrixAnalysisError, Result};

type Produce<'a> = Box<dyn FnOnce() -> Result<Vec<PathBuf>> + 'a>;

/// A named task writing output files
pub struct Artifact<'a> {
    pub name: String,
    pub produce: Produce<'a>,
}

impl<'a> Artifact<'a> {
    pub fn new<F>(name: impl Into<String>, produce: F) -> Self
    where
        F: FnOnce() -> Result<Vec<PathBuf>> + 'a,
    {
        Self {
            name: name.into(),
            produce: Box::new(produce),
        }
    }
}

impl fmt::Debug for Artifact<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifact").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Result of one artifact task
#[derive(Debug)]
pub struct ArtifactOutcome {
    pub name: String,
    pub result: Result<Vec<PathBuf>>,
}

impl ArtifactOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Files written, empty on failure
    pub fn paths(&self) -> &[PathBuf] {
        match &self.result {
            Ok(paths) => paths,
            Err(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&MatrixAnalysisError> {
        self.result.as_ref().err()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run every artifact in order, logging each outcome.
///
/// A panicking task is recorded as [`MatrixAnalysisError::ArtifactPanicked`].
pub fn run_artifacts<'a>(artifacts: impl IntoIterator<Item = Artifact<'a>>) -> Vec<ArtifactOutcome> {
    artifacts
        .into_iter()
        .map(|Artifact { name, produce }| {
            let result = panic::catch_unwind(AssertUnwindSafe(produce)).unwrap_or_else(|payload| {
                Err(MatrixAnalysisError::ArtifactPanicked {
                    name: name.clone(),
                    message: panic_message(payload.as_ref()),
                })
            });
            match &result {
                Ok(paths) => {
                    for path in paths {
                        info!(artifact = %name, path = %path.display(), "saved");
                    }
                }
                Err(e) => error!(artifact = %name, error = %e, "artifact failed"),
            }
            ArtifactOutcome { name, result }
        })
        .collect()
}
