//! Error types for configuration operations.

use freqresp_analysis::AnalysisError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create directory
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Path of the directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Neither a factory preset nor a readable file
    #[error("preset not found: {0}")]
    PresetNotFound(String),

    /// The configuration does not describe a valid analysis
    #[error("invalid analysis configuration: {0}")]
    Analysis(#[from] AnalysisError),
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create a create directory error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::CreateDir {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn mock_io_err() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotFound, "mock")
    }

    #[test]
    fn read_file_display() {
        let err = ConfigError::read_file("/a/b.toml", mock_io_err());
        let msg = err.to_string();
        assert!(msg.contains("failed to read file"), "got: {msg}");
        assert!(msg.contains("/a/b.toml"), "got: {msg}");
        assert!(err.source().is_some(), "ReadFile must expose I/O source");
    }

    #[test]
    fn write_file_display() {
        let err = ConfigError::write_file("/a/b.toml", mock_io_err());
        assert!(matches!(err, ConfigError::WriteFile { ref path, .. } if path == std::path::Path::new("/a/b.toml")));
        assert!(err.to_string().contains("failed to write file"));
    }

    #[test]
    fn create_dir_display() {
        let err = ConfigError::create_dir("/a/b", mock_io_err());
        assert!(err.to_string().contains("failed to create directory"));
        assert!(err.source().is_some());
    }

    #[test]
    fn preset_not_found_display() {
        let err = ConfigError::PresetNotFound("sweep".to_string());
        assert_eq!(err.to_string(), "preset not found: sweep");
        assert!(err.source().is_none());
    }

    #[test]
    fn analysis_error_converts() {
        let err: ConfigError = AnalysisError::invalid("window", "kaiser", "unknown window kind").into();
        let msg = err.to_string();
        assert!(msg.starts_with("invalid analysis configuration"), "got: {msg}");
        assert!(msg.contains("kaiser"), "got: {msg}");
    }
}
