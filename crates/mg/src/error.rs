//! CLI error types.

use std::path::PathBuf;

use mg_config::ConfigError;
use mg_directives::RegistryError;

use crate::frontmatter::FrontmatterError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Registry(#[from] RegistryError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Frontmatter {
        path: PathBuf,
        source: FrontmatterError,
    },

    #[error("{0}")]
    Check(String),
}
