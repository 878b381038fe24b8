//! Server configuration, loaded from a TOML file.
//!
//! The context name resolves to `/etc/mealhub/<name>.toml`; a value
//! containing `/` or `.` is treated as a path directly.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub family: FamilyOptions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// HS256 signing secret.
    pub secret: String,
    /// Token lifetime in seconds.
    #[serde(default = "default_expire_secs")]
    pub expire_secs: i64,
}

fn default_expire_secs() -> i64 {
    604_800 // 7 days
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the SQLite database.
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FamilyOptions {
    /// Whether a meal vote may list the same recipe twice.
    #[serde(default = "default_true")]
    pub allow_duplicate_vote_options: bool,
}

fn default_true() -> bool {
    true
}

impl Default for FamilyOptions {
    fn default() -> Self {
        Self {
            allow_duplicate_vote_options: true,
        }
    }
}

impl ServerConfig {
    /// Resolve a context name or path to a config file path.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/mealhub/{name_or_path}.toml"))
        }
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read config {}: {e}", path.display()))?;
        let config: ServerConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display()))?;
        Ok(config)
    }

    /// Path of the SQLite database inside the data directory.
    pub fn sqlite_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir).join("mealhub.sqlite")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_name_and_path() {
        assert_eq!(
            ServerConfig::resolve_path("prod"),
            PathBuf::from("/etc/mealhub/prod.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("./local.toml"),
            PathBuf::from("./local.toml")
        );
    }

    #[test]
    fn load_minimal_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.toml");
        std::fs::write(
            &path,
            "[jwt]\nsecret = \"s3cret\"\n\n[storage]\ndata_dir = \"/var/lib/mealhub\"\n",
        )
        .unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.jwt.secret, "s3cret");
        assert_eq!(config.jwt.expire_secs, 604_800);
        assert!(config.family.allow_duplicate_vote_options);
        assert_eq!(
            config.sqlite_path(),
            PathBuf::from("/var/lib/mealhub/mealhub.sqlite")
        );
    }

    #[test]
    fn load_with_family_options() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.toml");
        std::fs::write(
            &path,
            "[jwt]\nsecret = \"s\"\nexpire_secs = 3600\n\n\
             [storage]\ndata_dir = \"/tmp\"\n\n\
             [family]\nallow_duplicate_vote_options = false\n",
        )
        .unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.jwt.expire_secs, 3600);
        assert!(!config.family.allow_duplicate_vote_options);
    }
}
