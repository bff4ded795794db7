use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while collecting diagnostics.
///
/// Most of these are recovered locally by the pipeline (logged and skipped);
/// only a failure of the primary source ends the run.
#[derive(Error, Debug)]
pub enum LintError {
    #[error("could not launch {name}: {source}")]
    Launch {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("waiting for {name} failed: {source}")]
    Wait {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{name} exited with {status} and produced no output")]
    PrimaryFailed { name: String, status: String },

    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no JSON object in output")]
    NoJsonObject,

    #[error("unexpected payload before JSON")]
    UnexpectedPayload,

    #[error("could not decode JSON report: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid config {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
}
