//! Policy configuration for the rolling stocktake.
//!
//! The host system owns the settings store; this module turns raw setting
//! values (environment variables or a JSON settings document) into a validated
//! [`PolicyConfig`] that is passed explicitly into the selector.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stocktake_core::GroupId;

pub const ENV_DAILY_LIMIT: &str = "ROLLING_STOCKTAKE_DAILY_LIMIT";
pub const ENV_IGNORE_EXTERNAL: &str = "ROLLING_STOCKTAKE_IGNORE_EXTERNAL";
pub const ENV_SCOPE: &str = "ROLLING_STOCKTAKE_SCOPE";
pub const ENV_USER_GROUP: &str = "ROLLING_STOCKTAKE_USER_GROUP";

pub const DEFAULT_DAILY_LIMIT: u32 = 5;

/// Which related items are returned alongside the anchor item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StocktakeScope {
    /// Only the oldest item.
    #[default]
    Item,
    /// Items of the same part at exactly the anchor's location.
    Location,
    /// Items of the same part at the anchor's location or anywhere below it.
    LocationWithSublocations,
    /// Every item of the same part.
    All,
}

impl StocktakeScope {
    pub const ALL_SCOPES: [StocktakeScope; 4] = [
        StocktakeScope::Item,
        StocktakeScope::Location,
        StocktakeScope::LocationWithSublocations,
        StocktakeScope::All,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StocktakeScope::Item => "ITEM",
            StocktakeScope::Location => "LOCATION",
            StocktakeScope::LocationWithSublocations => "LOCATION_WITH_SUBLOCATIONS",
            StocktakeScope::All => "ALL",
        }
    }

    /// Human-readable label for settings screens.
    pub fn label(self) -> &'static str {
        match self {
            StocktakeScope::Item => "Single Item",
            StocktakeScope::Location => "Stock Location",
            StocktakeScope::LocationWithSublocations => "Stock Location with Sublocations",
            StocktakeScope::All => "All Items of Part",
        }
    }

    /// Parse a stored setting value, falling back to [`StocktakeScope::Item`]
    /// for anything unrecognised.
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            tracing::warn!(scope = value, "unrecognised stocktake scope, falling back to ITEM");
            StocktakeScope::Item
        })
    }
}

impl core::fmt::Display for StocktakeScope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StocktakeScope {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL_SCOPES
            .into_iter()
            .find(|scope| scope.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownScope(s.to_string()))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("daily limit must be a non-negative integer (got '{0}')")]
    InvalidDailyLimit(String),

    #[error("{key} must be a boolean (got '{value}')")]
    InvalidFlag { key: &'static str, value: String },

    #[error("unknown stocktake scope '{0}'")]
    UnknownScope(String),

    #[error("invalid user group: {0}")]
    InvalidGroup(String),

    #[error("malformed settings document: {0}")]
    Malformed(String),
}

/// Validated policy for one selection call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Maximum items a user may count per day; `0` means unlimited.
    pub daily_limit: u32,
    /// Skip items stored in external locations.
    pub ignore_external: bool,
    pub scope: StocktakeScope,
    /// Group a user must belong to; enforced by the caller, not the selector.
    pub allowed_group: Option<GroupId>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            daily_limit: DEFAULT_DAILY_LIMIT,
            ignore_external: true,
            scope: StocktakeScope::Item,
            allowed_group: None,
        }
    }
}

/// Raw settings document as stored by the host (plugin setting keys).
#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    #[serde(rename = "DAILY_LIMIT")]
    daily_limit: Option<serde_json::Value>,
    #[serde(rename = "IGNORE_EXTERNAL")]
    ignore_external: Option<serde_json::Value>,
    #[serde(rename = "STOCKTAKE_SCOPE")]
    scope: Option<String>,
    #[serde(rename = "USER_GROUP")]
    user_group: Option<String>,
}

impl PolicyConfig {
    pub fn unlimited(mut self) -> Self {
        self.daily_limit = 0;
        self
    }

    pub fn with_daily_limit(mut self, limit: u32) -> Self {
        self.daily_limit = limit;
        self
    }

    pub fn with_scope(mut self, scope: StocktakeScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_ignore_external(mut self, ignore: bool) -> Self {
        self.ignore_external = ignore;
        self
    }

    pub fn with_allowed_group(mut self, group: Option<GroupId>) -> Self {
        self.allowed_group = group;
        self
    }

    /// `Some(limit)` when a positive quota applies.
    pub fn quota(&self) -> Option<u32> {
        (self.daily_limit > 0).then_some(self.daily_limit)
    }

    /// Load from `ROLLING_STOCKTAKE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup; missing keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_DAILY_LIMIT) {
            config.daily_limit = parse_daily_limit(&raw)?;
        }
        if let Some(raw) = lookup(ENV_IGNORE_EXTERNAL) {
            config.ignore_external = parse_flag(ENV_IGNORE_EXTERNAL, &raw)?;
        }
        if let Some(raw) = lookup(ENV_SCOPE) {
            config.scope = StocktakeScope::parse_lenient(&raw);
        }
        if let Some(raw) = lookup(ENV_USER_GROUP) {
            config.allowed_group = parse_group(&raw)?;
        }

        Ok(config)
    }

    /// Load from a JSON settings document keyed by the plugin setting names
    /// (`DAILY_LIMIT`, `IGNORE_EXTERNAL`, `STOCKTAKE_SCOPE`, `USER_GROUP`).
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        let raw: RawSettings =
            serde_json::from_str(document).map_err(|e| ConfigError::Malformed(e.to_string()))?;

        let mut config = Self::default();

        match raw.daily_limit {
            None | Some(serde_json::Value::Null) => {}
            Some(serde_json::Value::String(s)) => config.daily_limit = parse_daily_limit(&s)?,
            Some(v) => config.daily_limit = parse_daily_limit(&v.to_string())?,
        }

        match raw.ignore_external {
            None | Some(serde_json::Value::Null) => {}
            Some(serde_json::Value::Bool(b)) => config.ignore_external = b,
            Some(serde_json::Value::String(s)) => {
                config.ignore_external = parse_flag("IGNORE_EXTERNAL", &s)?
            }
            Some(v) => {
                return Err(ConfigError::InvalidFlag {
                    key: "IGNORE_EXTERNAL",
                    value: v.to_string(),
                });
            }
        }

        if let Some(scope) = raw.scope {
            config.scope = StocktakeScope::parse_lenient(&scope);
        }
        if let Some(group) = raw.user_group {
            config.allowed_group = parse_group(&group)?;
        }

        Ok(config)
    }

    /// Declared settings, for hosts that render a settings form.
    pub fn settings() -> &'static [SettingDescriptor] {
        SETTINGS
    }
}

fn parse_daily_limit(raw: &str) -> Result<u32, ConfigError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidDailyLimit(raw.to_string()))?;
    u32::try_from(value).map_err(|_| ConfigError::InvalidDailyLimit(raw.to_string()))
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            key,
            value: raw.to_string(),
        }),
    }
}

/// Empty values mean "no group restriction".
fn parse_group(raw: &str) -> Result<Option<GroupId>, ConfigError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    raw.parse::<GroupId>()
        .map(Some)
        .map_err(|e| ConfigError::InvalidGroup(e.to_string()))
}

/// Metadata for one declared setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettingDescriptor {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub default: Option<&'static str>,
}

static SETTINGS: &[SettingDescriptor] = &[
    SettingDescriptor {
        key: "USER_GROUP",
        name: "Allowed Group",
        description: "The user group required to participate in rolling stocktake",
        default: None,
    },
    SettingDescriptor {
        key: "DAILY_LIMIT",
        name: "Daily Limit",
        description: "The maximum number of stock items to be counted by a user in a single day (set to 0 for unlimited)",
        default: Some("5"),
    },
    SettingDescriptor {
        key: "IGNORE_EXTERNAL",
        name: "Ignore External Locations",
        description: "Ignore stock items which are located in external locations",
        default: Some("true"),
    },
    SettingDescriptor {
        key: "STOCKTAKE_SCOPE",
        name: "Stocktake Scope",
        description: "Which stock items to present for stocktake: the oldest item, all items at its location, all items at its location and sublocations, or all items of its part",
        default: Some("ITEM"),
    },
];
