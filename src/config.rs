use crate::dispatch::DispatchSettings;
use crate::menu::MenuSchedule;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use time::UtcOffset;
use tracing::info;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub dispatch: DispatchSettings,
    pub providers: ProviderConfig,
}

impl AppConfig {
    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join("users.json")
    }

    pub fn displays_path(&self) -> PathBuf {
        self.data_dir.join("displays.json")
    }
}

#[cfg(test)]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: std::env::temp_dir(),
            dispatch: DispatchSettings {
                batch_size: std::num::NonZeroUsize::MIN,
                cooldown: std::time::Duration::from_secs(1),
            },
            providers: ProviderConfig::default(),
        }
    }
}

/// Provider credentials, loaded from a TOML file. Every section is optional;
/// a missing section leaves that provider unconfigured.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub twilio: Option<TwilioConfig>,
    pub slack: Option<SlackConfig>,
    pub cater2me: Option<Cater2MeConfig>,
    pub menu: MenuSection,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub notify_service_sid: String,
    pub messaging_service_sid: String,
    /// Number of the device that drives the shared displays.
    pub display_number: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SlackConfig {
    pub token: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Cater2MeConfig {
    pub client_id: String,
    pub user_id: String,
    #[serde(default)]
    pub profile_ids: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MenuSection {
    pub refresh_hour: u8,
    pub utc_offset_hours: i8,
}

impl Default for MenuSection {
    fn default() -> Self {
        Self {
            refresh_hour: 8,
            utc_offset_hours: -8,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("menu refresh_hour must be 0-23, got {0}")]
    RefreshHour(u8),
    #[error("menu utc_offset_hours out of range: {0}")]
    UtcOffset(i8),
}

impl ProviderConfig {
    /// Falls back to an empty configuration when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!(path = %path.display(), "no provider config found, providers disabled");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.menu.schedule()?;
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

impl MenuSection {
    pub fn schedule(&self) -> Result<MenuSchedule, ConfigError> {
        if self.refresh_hour > 23 {
            return Err(ConfigError::RefreshHour(self.refresh_hour));
        }
        let offset = UtcOffset::from_hms(self.utc_offset_hours, 0, 0)
            .map_err(|_| ConfigError::UtcOffset(self.utc_offset_hours))?;
        Ok(MenuSchedule {
            hour: self.refresh_hour,
            offset,
        })
    }
}
