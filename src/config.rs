//! Configuration types for archive-tee

use crate::error::{Error, Result};
use crate::types::ArchiveFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single local archive output
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Destination path of the archive file (parent directories are
    /// created as needed)
    pub path: PathBuf,

    /// Archive format; when `None` the format is inferred from the path's
    /// extension (`.tar.gz`/`.tgz`/`.zip`)
    #[serde(default)]
    pub format: Option<ArchiveFormat>,
}

impl OutputConfig {
    /// The effective format: the explicit one, or the one inferred from
    /// the output path
    #[must_use]
    pub fn resolved_format(&self) -> Option<ArchiveFormat> {
        self.format.or_else(|| ArchiveFormat::from_path(&self.path))
    }
}

/// Declarative description of one packaging run
///
/// Drives [`crate::package`]: every file matched by `sources` is streamed
/// into every output in `outputs` in a single pass over the filesystem.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PackageConfig {
    /// Source glob patterns, processed in order. A pattern matching
    /// nothing is allowed and contributes no entries.
    #[serde(default)]
    pub sources: Vec<String>,

    /// Archive outputs; each receives an identical entry sequence
    #[serde(default)]
    pub outputs: Vec<OutputConfig>,
}

impl PackageConfig {
    /// Validate the configuration before running
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when no sources are given, no outputs are
    /// given, or an output's format can neither be read nor inferred.
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(Error::Config {
                message: "at least one source pattern is required".to_string(),
                key: Some("sources".to_string()),
            });
        }
        if self.outputs.is_empty() {
            return Err(Error::Config {
                message: "at least one output is required".to_string(),
                key: Some("outputs".to_string()),
            });
        }
        for output in &self.outputs {
            if output.resolved_format().is_none() {
                return Err(Error::Config {
                    message: format!(
                        "cannot infer archive format from {}; set format explicitly",
                        output.path.display()
                    ),
                    key: Some("outputs".to_string()),
                });
            }
        }
        Ok(())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn output(path: &str) -> OutputConfig {
        OutputConfig {
            path: PathBuf::from(path),
            format: None,
        }
    }

    #[test]
    fn valid_config_passes_validation() {
        let config = PackageConfig {
            sources: vec!["data/*.log".to_string()],
            outputs: vec![output("out/logs.tar.gz"), output("out/logs.zip")],
        };
        config.validate().unwrap();
    }

    #[test]
    fn empty_sources_are_rejected() {
        let config = PackageConfig {
            sources: Vec::new(),
            outputs: vec![output("out.zip")],
        };
        match config.validate() {
            Err(Error::Config { key, .. }) => assert_eq!(key.as_deref(), Some("sources")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn empty_outputs_are_rejected() {
        let config = PackageConfig {
            sources: vec!["*.log".to_string()],
            outputs: Vec::new(),
        };
        match config.validate() {
            Err(Error::Config { key, .. }) => assert_eq!(key.as_deref(), Some("outputs")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn uninferable_format_is_rejected() {
        let config = PackageConfig {
            sources: vec!["*.log".to_string()],
            outputs: vec![output("out.archive")],
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn explicit_format_overrides_extension_inference() {
        let out = OutputConfig {
            path: PathBuf::from("weird.bin"),
            format: Some(ArchiveFormat::Zip),
        };
        assert_eq!(out.resolved_format(), Some(ArchiveFormat::Zip));
    }

    #[test]
    fn config_round_trips_through_serde() {
        let config = PackageConfig {
            sources: vec!["data/**/*.log".to_string()],
            outputs: vec![
                output("out/logs.tgz"),
                OutputConfig {
                    path: PathBuf::from("out/logs.zip"),
                    format: Some(ArchiveFormat::Zip),
                },
            ],
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: PackageConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.sources, config.sources);
        assert_eq!(parsed.outputs.len(), 2);
        assert_eq!(parsed.outputs[0].resolved_format(), Some(ArchiveFormat::TarGz));
        assert_eq!(parsed.outputs[1].format, Some(ArchiveFormat::Zip));
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let parsed: PackageConfig = serde_json::from_str("{}").unwrap();
        assert!(parsed.sources.is_empty());
        assert!(parsed.outputs.is_empty());
    }
}
