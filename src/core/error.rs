//! Domain error taxonomy. Every variant is fatal for the run; per-symbol
//! skips are logged, never raised.

use std::path::PathBuf;

/// Fatal failures surfaced to the command layer (exit status 1)
#[derive(Debug, thiserror::Error)]
pub enum AdaptError
{
    /// Malformed or unreadable configuration, rules or directives
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No usable input files were found
    #[error("discovery error: {0}")]
    Discovery(String),

    /// A configured package could not be located, read or parsed
    #[error("failed to load package {import_path}: {reason}")]
    Load
    {
        import_path: String,
        reason: String,
    },

    /// The output directory or file could not be written
    #[error("failed to write {}: {reason}", path.display())]
    Write
    {
        path: PathBuf,
        reason: String,
    },
}

impl AdaptError
{
    pub fn config(msg: impl Into<String>) -> Self
    {
        Self::Configuration(msg.into())
    }

    pub fn load(
        import_path: &str,
        reason: impl Into<String>,
    ) -> Self
    {
        Self::Load { import_path: import_path.to_string(), reason: reason.into() }
    }
}
