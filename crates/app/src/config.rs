//! Settings discovery: explicit file, platform config dir, then defaults.

use anyhow::{Context, Result};
use shared::settings::AppSettings;
use std::fs;
use std::path::{Path, PathBuf};

pub fn config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com.local", "QRX3", "QRX3Chat")
        .map(|proj| proj.config_dir().join("settings.json"))
}

fn read_settings(path: &Path) -> Result<AppSettings> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

/// Load settings. An explicit path must exist and parse; the platform file is
/// optional and falls back to defaults if unreadable.
pub fn load_settings(explicit: Option<&Path>) -> Result<AppSettings> {
    let mut settings = match explicit {
        Some(path) => read_settings(path)?,
        None => match config_path() {
            Some(path) if path.exists() => read_settings(&path).unwrap_or_else(|e| {
                tracing::warn!(error = %format!("{:#}", e), "ignoring unreadable settings file");
                AppSettings::default()
            }),
            _ => AppSettings::default(),
        },
    };
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

/// `QRX3_DATA_DIR` relocates every relative store path.
pub fn apply_env_overrides(settings: &mut AppSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(dir) = lookup("QRX3_DATA_DIR").filter(|d| !d.trim().is_empty()) {
        settings.storage.data_dir = dir;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::settings::PersistenceMode;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"persistence": "overwrite", "model": {"local_model": "llama3.2:3b"}}"#,
        )
        .unwrap();

        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.persistence, PersistenceMode::Overwrite);
        assert_eq!(settings.model.local_model, "llama3.2:3b");
        assert_eq!(settings.lockout.max_attempts, 3);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_settings(Some(&dir.path().join("nope.json"))).is_err());
    }

    #[test]
    fn test_env_override() {
        let mut settings = AppSettings::default();
        apply_env_overrides(&mut settings, |key| {
            (key == "QRX3_DATA_DIR").then(|| "/var/lib/qrx3".to_string())
        });
        assert_eq!(settings.auth_path(), PathBuf::from("/var/lib/qrx3/auth.json"));

        let mut untouched = AppSettings::default();
        apply_env_overrides(&mut untouched, |_| Some("  ".to_string()));
        assert_eq!(untouched.storage.data_dir, ".");
    }
}
