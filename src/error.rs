use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from saving or sharing the composed image
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export: the canvas has no size yet")]
    EmptyCanvas,

    #[error("An export is already in progress")]
    Busy,

    #[error("Storage access denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Export worker stopped before reporting a result")]
    WorkerGone,

    #[error("Nothing to share yet: save the drawing first")]
    NothingToShare,
}

impl ExportError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::PermissionDenied {
            Self::PermissionDenied { path: path.to_owned() }
        } else {
            Self::Io { path: path.to_owned(), source }
        }
    }
}

/// Errors from loading a background image
#[derive(Debug, Error)]
pub enum BackgroundError {
    #[error("Not a supported image: {0}")]
    Unsupported(String),

    #[error("Storage access denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image has no pixels")]
    EmptyImage,
}

impl BackgroundError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::PermissionDenied {
            Self::PermissionDenied { path: path.to_owned() }
        } else {
            Self::Io { path: path.to_owned(), source }
        }
    }
}

/// Errors from loading the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_is_mapped() {
        let err = ExportError::io(Path::new("/x.png"), io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, ExportError::PermissionDenied { .. }));

        let err = BackgroundError::io(Path::new("/bg.png"), io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, BackgroundError::Io { .. }));
        assert!(err.to_string().contains("/bg.png"));
    }
}
