//! Configuration file handling
//!
//! Reads `cobbler.toml`: the Cobbler API endpoint, an optional session token,
//! cache location and lifetime, and grouping options. Unknown keys are
//! rejected and every value is validated before use.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::cache::{self, CachePaths};
use crate::cobbler::ClassKey;
use crate::error::{InventoryError, Result};
use crate::inventory::InventoryBuilder;

pub const CONFIG_FILE: &str = "cobbler.toml";

const DEFAULT_NAMESPACE: &str = "cobbler";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub cobbler: CobblerSettings,
    pub cache: CacheSettings,
    #[serde(default)]
    pub inventory: InventorySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CobblerSettings {
    /// XML-RPC endpoint, e.g. `http://cobbler.example.com/cobbler_api`.
    pub host: String,
    /// Session token passed to `get_systems`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheSettings {
    /// Directory holding the cache files; the platform cache dir when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Seconds before the cache goes stale. Zero disables caching.
    pub max_age: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InventorySettings {
    #[serde(default)]
    pub group_by: ClassKey,
    #[serde(default)]
    pub safe_group_names: bool,
    #[serde(default = "default_namespace")]
    pub hostvars_namespace: String,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            group_by: ClassKey::default(),
            safe_group_names: false,
            hostvars_namespace: default_namespace(),
        }
    }
}

impl Settings {
    /// OS-specific default location of the config file.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "cobbler-inventory").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Read and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| InventoryError::ConfigUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            toml::from_str(&text).map_err(|source| InventoryError::ConfigSyntax {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let host = self.cobbler.host.trim();
        if host.is_empty() {
            return Err(invalid("cobbler.host", "must not be empty"));
        }
        if !(host.starts_with("http://") || host.starts_with("https://")) {
            return Err(invalid("cobbler.host", "must be an http:// or https:// URL"));
        }
        if matches!(&self.cobbler.token, Some(token) if token.trim().is_empty()) {
            return Err(invalid("cobbler.token", "must not be empty when set"));
        }
        if self.cobbler.timeout_secs == Some(0) {
            return Err(invalid("cobbler.timeout_secs", "must be greater than zero"));
        }
        if matches!(&self.cache.path, Some(path) if path.as_os_str().is_empty()) {
            return Err(invalid("cache.path", "must not be empty when set"));
        }
        Ok(())
    }

    /// Cache file pair, under the configured or the platform cache directory.
    ///
    /// The platform directory is created on first use; a configured one must
    /// already exist.
    pub fn cache_paths(&self) -> Result<CachePaths> {
        match &self.cache.path {
            Some(path) => Ok(CachePaths::in_dir(path)),
            None => {
                let dir = cache::cache_dir().ok_or_else(|| {
                    invalid("cache.path", "no platform cache directory; set it explicitly")
                })?;
                platform_cache_paths(&dir)
            }
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cache.max_age)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.cobbler.timeout_secs.map(Duration::from_secs)
    }

    pub fn builder(&self) -> InventoryBuilder {
        InventoryBuilder::new(self.inventory.group_by)
            .with_safe_group_names(self.inventory.safe_group_names)
    }
}

fn platform_cache_paths(dir: &Path) -> Result<CachePaths> {
    fs::create_dir_all(dir).map_err(|source| InventoryError::CacheWrite {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(CachePaths::in_dir(dir))
}

fn invalid(field: &'static str, reason: &str) -> InventoryError {
    InventoryError::ConfigInvalid {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, text: &str) -> PathBuf {
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_load_minimal_config() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[cobbler]
host = "http://cobbler.example.com/cobbler_api"

[cache]
path = "/var/tmp"
max_age = 900
"#,
        );

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.cobbler.token, None);
        assert_eq!(settings.ttl(), Duration::from_secs(900));
        assert_eq!(settings.timeout(), None);
        assert_eq!(settings.inventory, InventorySettings::default());
        assert_eq!(settings.inventory.hostvars_namespace, "cobbler");
        assert_eq!(
            settings.cache_paths().unwrap(),
            CachePaths::in_dir(Path::new("/var/tmp"))
        );
    }

    #[test]
    fn test_load_full_config() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[cobbler]
host = "https://cobbler.example.com/cobbler_api"
token = "abc123"
timeout_secs = 10

[cache]
max_age = 0

[inventory]
group_by = "mgmt_classes"
safe_group_names = true
hostvars_namespace = ""
"#,
        );

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.cobbler.token.as_deref(), Some("abc123"));
        assert_eq!(settings.timeout(), Some(Duration::from_secs(10)));
        assert_eq!(settings.ttl(), Duration::ZERO);
        assert_eq!(settings.inventory.group_by, ClassKey::MgmtClasses);
        assert!(settings.inventory.safe_group_names);
        assert!(settings.inventory.hostvars_namespace.is_empty());
    }

    #[test]
    fn test_missing_required_field() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "[cobbler]\nhost = \"http://cobbler/cobbler_api\"\n\n[cache]\npath = \"/tmp\"\n",
        );

        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(err, InventoryError::ConfigSyntax { .. }));
        assert!(err.to_string().contains("max_age"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "[cobbler]\nhost = \"http://cobbler/cobbler_api\"\nusername = \"admin\"\n\n[cache]\nmax_age = 60\n",
        );

        let err = Settings::load(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("username"));
    }

    #[test]
    fn test_invalid_values() {
        let dir = TempDir::new().unwrap();
        let cases = [
            ("host = \"\"", "cobbler.host"),
            ("host = \"cobbler.example.com\"", "cobbler.host"),
            ("host = \"http://c/api\"\ntoken = \" \"", "cobbler.token"),
            ("host = \"http://c/api\"\ntimeout_secs = 0", "cobbler.timeout_secs"),
        ];

        for (cobbler, field) in cases {
            let path = write_config(&dir, &format!("[cobbler]\n{}\n\n[cache]\nmax_age = 60\n", cobbler));
            match Settings::load(&path) {
                Err(InventoryError::ConfigInvalid { field: got, .. }) => assert_eq!(got, field),
                other => panic!("expected invalid {}, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_platform_cache_dir_is_created() {
        let dir = TempDir::new().unwrap();
        let cache_dir = dir.path().join("home").join(".cache").join("cobbler-inventory");

        let paths = platform_cache_paths(&cache_dir).unwrap();
        assert!(cache_dir.is_dir());
        assert_eq!(paths, CachePaths::in_dir(&cache_dir));

        cache::write_json(&paths.detail, &serde_json::json!({})).unwrap();
        cache::write_json(&paths.index, &serde_json::json!({})).unwrap();

        // already present is fine
        assert!(platform_cache_paths(&cache_dir).is_ok());
    }

    #[test]
    fn test_configured_cache_dir_is_not_created() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let path = write_config(
            &dir,
            &format!(
                "[cobbler]\nhost = \"http://c/api\"\n\n[cache]\npath = {:?}\nmax_age = 60\n",
                missing.display().to_string()
            ),
        );

        let paths = Settings::load(&path).unwrap().cache_paths().unwrap();
        assert_eq!(paths, CachePaths::in_dir(&missing));
        assert!(!missing.exists());
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Settings::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, InventoryError::ConfigUnreadable { .. }));
    }
}
