//! Configuration loader for MediRAG.
//!
//! Reads `config.toml` from the data directory (`~/.medirag/` by default)
//! and deserializes it into [`AppConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::{Path, PathBuf};

use medirag_types::config::AppConfig;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "MEDIRAG_DATA_DIR";

/// Config file name inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: returns [`AppConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
pub async fn load_config(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join(CONFIG_FILE);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", config_path.display());
            AppConfig::default()
        }
    }
}

/// Resolve the data directory.
///
/// Priority: explicit flag, then `MEDIRAG_DATA_DIR`, then `~/.medirag`.
/// Falls back to `./.medirag` when no home directory is known.
pub fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    let env = std::env::var_os(DATA_DIR_ENV).map(PathBuf::from);
    pick_data_dir(flag, env, dirs::home_dir())
}

fn pick_data_dir(flag: Option<PathBuf>, env: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    flag.or(env)
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| home.unwrap_or_else(|| PathBuf::from(".")).join(".medirag"))
}

#[cfg(test)]
mod tests {
    use medirag_types::config::VectorBackend;
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).await;
        assert_eq!(config.knowledge.chunk_size, 512);
        assert_eq!(config.server.port, 3000);
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
[knowledge]
backend = "memory"
chunk_size = 256

[memory]
retention_days = 7

[server]
port = 8080
"#,
        )
        .await
        .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.knowledge.backend, VectorBackend::Memory);
        assert_eq!(config.knowledge.chunk_size, 256);
        assert_eq!(config.memory.retention_days, 7);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.rag.response_timeout_secs, 30);
    }

    #[tokio::test]
    async fn load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join(CONFIG_FILE), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.knowledge.backend, VectorBackend::Lance);
        assert_eq!(config.memory.retention_days, 30);
    }

    #[test]
    fn pick_data_dir_priority() {
        let flag = Some(PathBuf::from("/flag"));
        let env = Some(PathBuf::from("/env"));
        let home = Some(PathBuf::from("/home/user"));

        assert_eq!(pick_data_dir(flag, env.clone(), home.clone()), PathBuf::from("/flag"));
        assert_eq!(pick_data_dir(None, env, home.clone()), PathBuf::from("/env"));
        assert_eq!(pick_data_dir(None, None, home), PathBuf::from("/home/user/.medirag"));
        assert_eq!(pick_data_dir(None, None, None), PathBuf::from("./.medirag"));
    }
}
