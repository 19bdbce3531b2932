//! Library error type

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading the content store or running the build
#[derive(Error, Debug)]
pub enum Error {
    #[error("io error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {path:?}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("front matter opened with '{delimiter}' is never closed")]
    UnterminatedFrontMatter { delimiter: &'static str },

    #[error("malformed {format} front matter: {message}")]
    FrontMatter {
        format: &'static str,
        message: String,
    },

    #[error("{path:?}: {source}")]
    Document {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("malformed data file {path:?}: {message}")]
    DataFile { path: PathBuf, message: String },

    #[error("{path:?} references missing asset '{reference}'")]
    MissingAsset { path: PathBuf, reference: String },

    #[error("content store has {count} error(s)")]
    Invalid { count: usize },

    #[error("package.json found but lockfile {lockfile:?} is missing")]
    MissingLockfile { lockfile: PathBuf },

    #[error("generator version {found} does not satisfy {required}")]
    GeneratorVersion { required: String, found: String },

    #[error("could not read a version from `{program}` output")]
    UnknownGeneratorVersion { program: String },

    #[error("failed to start step '{step}' ({program}): {source}")]
    Spawn {
        step: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("step '{step}' exited with {}", code.map(|c| c.to_string()).unwrap_or_else(|| "a signal".to_string()))]
    StepFailed { step: String, code: Option<i32> },

    #[error("nothing to publish: {path:?} is missing or empty")]
    EmptyOutput { path: PathBuf },

    #[error("publish target {target:?} contains the output tree {source_dir:?}")]
    PublishOverlap { source_dir: PathBuf, target: PathBuf },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
