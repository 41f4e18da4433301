//! Notification channel configuration.
//!
//! Pure configuration mapping for the channel SDK: caller-provided specs are
//! normalized against the stock defaults and handed to the
//! [`ChannelRegistry`](crate::external::ChannelRegistry) seam. A default
//! channel is always created so operational notifications have somewhere to
//! land.

use crate::error::Result;
use crate::external::ChannelRegistry;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Identifier of the channel created unconditionally.
pub const DEFAULT_CHANNEL_ID: &str = "channel_default";

/// Channel importance level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelImportance {
    None,
    Min,
    Low,
    Default,
    High,
}

/// Lock-screen visibility.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelVisibility {
    Private,
    Public,
    Secret,
}

/// Fully resolved channel configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub badge: bool,
    pub importance: ChannelImportance,
    pub lights: bool,
    pub sound: String,
    pub vibration: bool,
    pub vibration_pattern: Vec<u32>,
    pub visibility: ChannelVisibility,
}

impl ChannelConfig {
    /// Stock defaults: high importance, public, default sound.
    fn base(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            badge: true,
            importance: ChannelImportance::High,
            lights: true,
            sound: "default".to_string(),
            vibration: true,
            vibration_pattern: vec![500, 1000, 500, 1000],
            visibility: ChannelVisibility::Public,
        }
    }
}

/// Caller-facing channel description: either just a name, or a name plus
/// overrides.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelSpec {
    Name(String),
    Spec(ChannelOverrides),
}

/// Per-channel overrides applied on top of the stock defaults. Importance is
/// not overridable; delivered channels always use high importance.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChannelOverrides {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sound: Option<String>,
    #[serde(default)]
    pub badge: Option<bool>,
    #[serde(default)]
    pub lights: Option<bool>,
    #[serde(default)]
    pub vibration: Option<bool>,
    #[serde(default)]
    pub vibration_pattern: Option<Vec<u32>>,
    #[serde(default)]
    pub visibility: Option<ChannelVisibility>,
}

/// Normalize one spec. Specs without a name are invalid and map to `None`;
/// a missing id falls back to the name.
pub fn parse_channel_spec(spec: &ChannelSpec) -> Option<ChannelConfig> {
    let overrides = match spec {
        ChannelSpec::Name(name) => ChannelOverrides {
            name: name.clone(),
            ..Default::default()
        },
        ChannelSpec::Spec(overrides) => overrides.clone(),
    };

    if overrides.name.is_empty() {
        return None;
    }

    let id = overrides
        .id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| overrides.name.clone());

    let mut config = ChannelConfig::base(id, overrides.name);
    config.description = overrides.description.filter(|d| !d.is_empty());
    if let Some(sound) = overrides.sound {
        config.sound = sound;
    }
    if let Some(badge) = overrides.badge {
        config.badge = badge;
    }
    if let Some(lights) = overrides.lights {
        config.lights = lights;
    }
    if let Some(vibration) = overrides.vibration {
        config.vibration = vibration;
    }
    if let Some(pattern) = overrides.vibration_pattern {
        config.vibration_pattern = pattern;
    }
    if let Some(visibility) = overrides.visibility {
        config.visibility = visibility;
    }

    Some(config)
}

/// The channel created unconditionally, optionally with a custom sound.
pub fn default_channel(sound: Option<&str>) -> ChannelConfig {
    let mut config = ChannelConfig::base(DEFAULT_CHANNEL_ID, "Operational notifications");
    config.description = Some("Default channel to receive operational notifications".to_string());

    if let Some(sound) = sound {
        let trimmed = sound.trim();
        if !trimmed.is_empty() {
            config.sound = trimmed.to_string();
        }
    }

    config
}

/// Create the caller's channels (invalid specs are skipped) and then the
/// default channel.
pub fn create_notification_channels(
    registry: &dyn ChannelRegistry,
    specs: &[ChannelSpec],
    default_sound: Option<&str>,
) -> Result<()> {
    let parsed: Vec<ChannelConfig> = specs.iter().filter_map(parse_channel_spec).collect();

    if !parsed.is_empty() {
        debug!(channels = parsed.len(), "creating notification channels");
        registry.create_channels(&parsed)?;
    }

    registry.create_channel(&default_channel(default_sound))
}
