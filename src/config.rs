//! Runtime configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Where data and reports live and how hard writes are pushed to disk.
///
/// Loaded from JSON; every field is optional in the file.
///
/// ```json
/// { "data_dir": "./lab_data", "report_dir": "./reports", "sync_on_write": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    /// Directory holding one `.dat` file per entity type.
    pub data_dir: PathBuf,
    /// Directory report files are written to.
    pub report_dir: PathBuf,
    /// Whether to fsync after every append or rewrite.
    pub sync_on_write: bool,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./lab_data"),
            report_dir: PathBuf::from("./reports"),
            sync_on_write: true,
        }
    }
}

impl LabConfig {
    /// A default configuration rooted at `data_dir`.
    #[must_use]
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn validate(self) -> Result<Self, ValidationError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ValidationError::InvalidConfig {
                reason: "data_dir must not be empty".to_string(),
            });
        }
        if self.report_dir.as_os_str().is_empty() {
            return Err(ValidationError::InvalidConfig {
                reason: "report_dir must not be empty".to_string(),
            });
        }
        Ok(self)
    }

    /// Reads and validates a JSON configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ValidationError> {
        let content = fs::read_to_string(path).map_err(|e| ValidationError::InvalidConfig {
            reason: format!("cannot read {}: {e}", path.display()),
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| ValidationError::InvalidConfig {
            reason: format!("cannot parse {}: {e}", path.display()),
        })?;
        config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = LabConfig::default().validate().unwrap();
        assert!(cfg.sync_on_write);
        assert_eq!(cfg.data_dir, PathBuf::from("./lab_data"));
    }

    #[test]
    fn test_empty_data_dir_rejected() {
        let err = LabConfig::with_data_dir("").validate().unwrap_err();
        assert!(err.to_string().contains("data_dir"));
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labdesk.json");
        fs::write(&path, r#"{ "data_dir": "/srv/labs", "sync_on_write": false }"#).unwrap();

        let cfg = LabConfig::from_file(&path).unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/labs"));
        assert!(!cfg.sync_on_write);
        assert_eq!(cfg.report_dir, PathBuf::from("./reports"));
    }

    #[test]
    fn test_malformed_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labdesk.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            LabConfig::from_file(&path),
            Err(ValidationError::InvalidConfig { .. })
        ));
    }
}
