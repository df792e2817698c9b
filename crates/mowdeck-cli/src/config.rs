//! Configuration – reads/writes `~/.mowdeck/config.toml`.
//!
//! ```toml
//! state_path = "/var/lib/mowdeck/state.json"   # optional
//!
//! [[devices]]
//! name = "Luba-VS1KXYZ"
//! [devices.limits]
//! blade_height = { min = 30.0, max = 60.0 }
//!
//! [[devices]]
//! name = "Yuka-MN1234"
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use mowdeck_types::{DeviceLimits, MowerError};
use serde::{Deserialize, Serialize};

/// One mower to expose controls for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Device name as reported by the vendor cloud; also selects the variant.
    pub name: String,

    /// Per-device bounds overrides.  Keys without an entry keep the
    /// built-in bounds.
    #[serde(default, skip_serializing_if = "DeviceLimits::is_empty")]
    pub limits: DeviceLimits,
}

/// Persisted user configuration stored in `~/.mowdeck/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Where numeric control values are persisted between runs.  Defaults to
    /// `state.json` next to the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_path: Option<PathBuf>,

    #[serde(default = "default_devices")]
    pub devices: Vec<DeviceConfig>,
}

fn default_devices() -> Vec<DeviceConfig> {
    vec![DeviceConfig {
        name: "Luba-DEMO".to_string(),
        limits: DeviceLimits::default(),
    }]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_path: None,
            devices: default_devices(),
        }
    }
}

impl Config {
    /// Reject configurations the control layer cannot set up.
    pub fn validate(&self) -> Result<(), MowerError> {
        let mut seen = HashSet::new();
        for device in &self.devices {
            if device.name.trim().is_empty() {
                return Err(MowerError::Config("device name must not be empty".to_string()));
            }
            if !seen.insert(device.name.as_str()) {
                return Err(MowerError::Config(format!(
                    "device '{}' is configured twice",
                    device.name
                )));
            }
            device.limits.validate().map_err(|e| {
                MowerError::Config(format!("device '{}': {e}", device.name))
            })?;
        }
        Ok(())
    }

    /// State file path: `state_path`, or `state.json` next to the config file.
    pub fn resolved_state_path(&self) -> PathBuf {
        self.state_path.clone().unwrap_or_else(|| {
            config_path()
                .parent()
                .map(|dir| dir.join("state.json"))
                .unwrap_or_else(|| PathBuf::from("state.json"))
        })
    }
}

fn home_dir() -> String {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string())
}

/// Return the path to `~/.mowdeck/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(&home_dir())
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".mowdeck").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, MowerError> {
    let Some(mut cfg) = load_from(&config_path())? else {
        return Ok(None);
    };
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Load and validate the config at `path`, without environment overrides.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, MowerError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        MowerError::Config(format!("failed to read config at {}: {e}", path.display()))
    })?;
    let cfg: Config = toml::from_str(&raw)
        .map_err(|e| MowerError::Config(format!("failed to parse config: {e}")))?;
    cfg.validate()?;
    Ok(Some(cfg))
}

/// Apply `MOWDECK_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `MOWDECK_STATE_PATH` | `state_path` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("MOWDECK_STATE_PATH")
        && !v.is_empty()
    {
        cfg.state_path = Some(PathBuf::from(v));
    }
}

/// Save the config to disk, creating `~/.mowdeck/` if necessary.
pub fn save(cfg: &Config) -> Result<(), MowerError> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), MowerError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            MowerError::Config(format!("failed to create config directory: {e}"))
        })?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700)).map_err(|e| {
                MowerError::Config(format!("failed to set config directory permissions: {e}"))
            })?;
        }
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| MowerError::Config(format!("failed to serialize config: {e}")))?;
    crate::state::write_private(path, raw.as_bytes())
        .map_err(|e| MowerError::Config(format!("failed to write config at {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_devices_and_limits() {
        let raw = r#"
            [[devices]]
            name = "Luba-1"
            [devices.limits]
            blade_height = { min = 30.0, max = 60.0 }

            [[devices]]
            name = "Yuka-2"
        "#;
        let cfg: Config = toml::from_str(raw).unwrap();
        assert_eq!(cfg.devices.len(), 2);
        assert_eq!(cfg.devices[0].limits.get("blade_height").unwrap().min, 30.0);
        assert!(cfg.devices[1].limits.is_empty());
        assert!(cfg.state_path.is_none());
    }

    #[test]
    fn missing_devices_fall_back_to_demo_device() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.devices, default_devices());
    }

    #[test]
    fn duplicate_device_names_are_rejected() {
        let mut cfg = Config::default();
        cfg.devices.push(cfg.devices[0].clone());
        assert!(matches!(cfg.validate(), Err(MowerError::Config(_))));
    }

    #[test]
    fn empty_device_name_is_rejected() {
        let mut cfg = Config::default();
        cfg.devices[0].name = "  ".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn roundtrip_config_with_limits() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let mut cfg = Config::default();
        cfg.devices[0].limits = DeviceLimits::new().with("working_speed", 0.3, 0.5);
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.devices, cfg.devices);
    }

    #[cfg(unix)]
    #[test]
    fn config_file_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        save_to(&Config::default(), &path).expect("save");

        let file_mode = fs::metadata(&path).expect("file metadata").permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600);
        let dir_mode = fs::metadata(path.parent().unwrap()).expect("dir metadata").permissions().mode() & 0o777;
        assert_eq!(dir_mode, 0o700);
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(load_from(&path).expect("no error").is_none());
    }

    #[test]
    fn inverted_device_limit_is_rejected_at_load() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
                [[devices]]
                name = "Luba-1"
                [devices.limits]
                blade_height = { min = 60.0, max = 30.0 }
            "#,
        )
        .unwrap();
        match load_from(&path) {
            Err(MowerError::Config(msg)) => {
                assert!(msg.contains("Luba-1"), "{msg}");
                assert!(msg.contains("blade_height"), "{msg}");
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn nan_device_limit_is_rejected() {
        let raw = r#"
            [[devices]]
            name = "Luba-1"
            [devices.limits]
            working_speed = { min = nan, max = 0.6 }
        "#;
        let cfg: Config = toml::from_str(raw).unwrap();
        assert!(matches!(cfg.validate(), Err(MowerError::Config(_))));
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "devices = 3").unwrap();
        assert!(matches!(load_from(&path), Err(MowerError::Config(_))));
    }

    #[test]
    fn config_path_points_to_mowdeck_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".mowdeck"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn apply_env_overrides_changes_state_path() {
        // SAFETY: MOWDECK_STATE_PATH is read only by `apply_env_overrides`, which
        // no other test calls; `load_from` does not consult the environment.
        unsafe { std::env::set_var("MOWDECK_STATE_PATH", "/tmp/mowdeck-state.json") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.state_path, Some(PathBuf::from("/tmp/mowdeck-state.json")));
        unsafe { std::env::remove_var("MOWDECK_STATE_PATH") };
    }
}
