//! File-based settings
//!
//! Precedence, lowest first: defaults, TOML file, `CPM_API_*` environment,
//! command-line flags.

use anyhow::Context;
use cpm_client::ClientConfig;
use cpm_recon::ReconConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything a reconciliation run needs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    /// `[api]` table
    pub(crate) api: ClientConfig,
    /// `[reconcile]` table
    pub(crate) reconcile: ReconConfig,
}

impl Settings {
    /// Read `path`, or start from defaults when no file is given
    pub(crate) fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpm_client::TokenConfig;
    use std::path::PathBuf;

    #[test]
    fn no_file_means_defaults() {
        assert_eq!(Settings::load(None).unwrap(), Settings::default());
    }

    #[test]
    fn reads_both_tables() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            r#"
[api]
base_url = "https://pm.example.com/api"
timeout_secs = 20

[api.token]
kind = "file"
path = "/var/lib/cpm/token"

[reconcile]
enrichment_concurrency = 2
"#,
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();

        assert_eq!(settings.api.base_url, "https://pm.example.com/api");
        assert_eq!(settings.api.timeout_secs, Some(20));
        assert_eq!(
            settings.api.token,
            TokenConfig::File {
                path: PathBuf::from("/var/lib/cpm/token")
            }
        );
        assert_eq!(settings.reconcile.enrichment_concurrency, 2);
        assert_eq!(settings.reconcile.project_concurrency, 1);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("reading config file"));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[api\nbase_url = 1").unwrap();
        assert!(Settings::load(Some(file.path())).is_err());
    }
}
