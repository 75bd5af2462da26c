use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while scanning a path into a directory table.
///
/// A failed scan never destroys the previous table; the caller shows the
/// message in the status line and carries on.
#[derive(Debug, Clone, Error)]
pub enum ScanError {
    #[error("path does not exist or is not accessible: {}", .0.display())]
    InvalidPath(PathBuf),

    /// The requested file itself has an unrecognized extension. Unrecognized
    /// extensions elsewhere in the directory are silently skipped.
    #[error("cannot open files of the type '.{0}'")]
    UnsupportedFormat(String),

    #[error("no supported image files in {}", .0.display())]
    Empty(PathBuf),
}

/// Errors produced by a single decode attempt. These degrade exactly one
/// directory slot to the placeholder display; navigation stays usable.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("corrupt file: {0}")]
    CorruptFile(String),

    #[error("image is too large ({width}x{height}, limit {limit})")]
    ImageTooLarge { width: u32, height: u32, limit: u32 },

    #[error("file type '.{0}' is not supported by any installed codec")]
    CodecNotFound(String),

    #[error("codec for '.{0}' failed to initialize; it is likely not installed")]
    CodecInitFailed(String),

    #[error("loading the file failed: {0}")]
    DecodeFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_names_the_extension() {
        let err = ScanError::UnsupportedFormat("xyz".into());
        assert_eq!(format!("{}", err), "cannot open files of the type '.xyz'");
    }

    #[test]
    fn too_large_reports_dimensions_and_limit() {
        let err = LoadError::ImageTooLarge {
            width: 20000,
            height: 400,
            limit: 16384,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("20000x400"));
        assert!(msg.contains("16384"));
    }
}
