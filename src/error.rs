//! Typed errors for the enhancement engine.
//!
//! Only [`EnhanceError`] ever reaches a caller of `Enhancer::enhance`. Every
//! other adverse condition is recovered locally: collaborator I/O problems are
//! reported as [`Ignored`] values so the degradation stays visible in logs.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum EnhanceError {
    /// The raw prompt was empty or whitespace-only.
    #[error("input is empty: provide a task description")]
    EmptyInput,
}

/// A best-effort read that was skipped. The sub-analysis that produced it
/// contributes an empty result instead of failing the whole call.
#[derive(Debug, thiserror::Error)]
pub enum Ignored {
    #[error("{} does not exist", .0.display())]
    Missing(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

impl Ignored {
    pub fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            return Ignored::Missing(path.to_path_buf());
        }
        Ignored::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn parse(path: &Path, message: impl Into<String>) -> Self {
        Ignored::Parse {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Absent collaborators are expected (no manifest, no agents dir), so they
    /// only show up at debug level.
    pub fn log(&self, what: &str) {
        match self {
            Ignored::Missing(_) => debug!("{} skipped: {}", what, self),
            _ => warn!("{} degraded: {}", what, self),
        }
    }
}

/// Unwrap a best-effort result, logging the degradation and falling back to
/// the type's empty value.
pub fn or_empty<T: Default>(result: Result<T, Ignored>, what: &str) -> T {
    match result {
        Ok(value) => value,
        Err(ignored) => {
            ignored.log(what);
            T::default()
        }
    }
}
