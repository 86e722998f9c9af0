use std::{io, path::PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum VendorError {
    #[error("failed to create vendor output directory {path:?}")]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write vendor entry template {path:?}")]
    WriteTemplate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("malformed options")]
    Json(#[from] serde_json::Error),
    #[error("asset rule test `{test}` is not a valid pattern")]
    InvalidAssetRule {
        test: String,
        #[source]
        source: regex::Error,
    },
}
