use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Entity category shown by the host UI.  Config controls are grouped apart
/// from the primary controls of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    None,
    Config,
}

/// Semantic unit tag attached to a numeric control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Percent,
    Degree,
    SquareMeters,
    MetersPerSecond,
    Centimeters,
}

impl Unit {
    /// Display symbol, e.g. `"m/s"`.
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Percent => "%",
            Unit::Degree => "°",
            Unit::SquareMeters => "m²",
            Unit::MetersPerSecond => "m/s",
            Unit::Centimeters => "cm",
        }
    }

    /// Whether values of this unit are angles in degrees.
    pub fn is_angle(self) -> bool {
        matches!(self, Unit::Degree)
    }
}

/// How the host should render a numeric control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberMode {
    #[default]
    Auto,
    Box,
    Slider,
}

/// Optional semantic class of a numeric control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Speed,
    Distance,
}

/// Static validation bounds of a numeric control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

/// A device-reported `{min, max}` override for one capability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Limit {
    pub min: f64,
    pub max: f64,
}

/// Per-device bounds overrides keyed by capability key (e.g. `"blade_height"`).
///
/// Entries that are absent fall back to the descriptor's static bounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceLimits(BTreeMap<String, Limit>);

impl DeviceLimits {
    /// Create an empty set of limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, min: f64, max: f64) -> Self {
        self.insert(key, Limit { min, max });
        self
    }

    /// Insert or replace the limit for `key`.
    pub fn insert(&mut self, key: impl Into<String>, limit: Limit) {
        self.0.insert(key.into(), limit);
    }

    /// Limit reported for `key`, if any.
    pub fn get(&self, key: &str) -> Option<Limit> {
        self.0.get(key).copied()
    }

    /// `true` when the device reports no limits at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check every entry has finite bounds with `min <= max`.
    ///
    /// # Errors
    ///
    /// [`MowerError::InvalidLimit`] for the first offending entry.
    pub fn validate(&self) -> Result<(), MowerError> {
        for (key, limit) in &self.0 {
            if !limit.min.is_finite() || !limit.max.is_finite() || limit.min > limit.max {
                return Err(MowerError::InvalidLimit {
                    key: key.clone(),
                    min: limit.min,
                    max: limit.max,
                });
            }
        }
        Ok(())
    }
}

/// Named fields of the coordinator's pending operation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingField {
    StartProgress,
    Toward,
    TowardIncludedAngle,
    CollectGrassFrequency,
    BladeHeight,
    Speed,
    ChannelWidth,
}

/// Settings the mower will use for the next mowing job.  Numeric controls
/// write into this structure; nothing is sent to the device until a job is
/// started by the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationSettings {
    /// Percentage of the job to skip when starting.
    pub start_progress: f64,
    /// Mowing heading in degrees.
    pub toward: f64,
    pub toward_included_angle: f64,
    /// Grass collection interval in square meters (Yuka only).
    pub collect_grass_frequency: f64,
    /// Blade height in millimeters.
    pub blade_height: f64,
    /// Working speed in m/s.
    pub speed: f64,
    /// Path spacing in centimeters.
    pub channel_width: f64,
}

impl OperationSettings {
    /// Write `value` to `field`.
    pub fn set(&mut self, field: SettingField, value: f64) {
        match field {
            SettingField::StartProgress => self.start_progress = value,
            SettingField::Toward => self.toward = value,
            SettingField::TowardIncludedAngle => self.toward_included_angle = value,
            SettingField::CollectGrassFrequency => self.collect_grass_frequency = value,
            SettingField::BladeHeight => self.blade_height = value,
            SettingField::Speed => self.speed = value,
            SettingField::ChannelWidth => self.channel_width = value,
        }
    }

    /// Read the current value of `field`.
    pub fn get(&self, field: SettingField) -> f64 {
        match field {
            SettingField::StartProgress => self.start_progress,
            SettingField::Toward => self.toward,
            SettingField::TowardIncludedAngle => self.toward_included_angle,
            SettingField::CollectGrassFrequency => self.collect_grass_frequency,
            SettingField::BladeHeight => self.blade_height,
            SettingField::Speed => self.speed,
            SettingField::ChannelWidth => self.channel_width,
        }
    }
}

/// Direction of a manual nudge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Forward,
    Left,
    Right,
    Back,
}

/// The one-shot commands a button control can issue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "snake_case")]
pub enum TriggerAction {
    /// Re-download the map set from the mower.
    SyncMaps,
    /// Re-locate the RTK reference station / dock.
    RelocateDock,
    LeaveDock,
    Move { direction: MoveDirection, distance_m: f32 },
    CancelTask,
    /// Wipe every stored map on the device.
    ClearAllMaps,
}

impl TriggerAction {
    /// Short name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            TriggerAction::SyncMaps => "sync_maps",
            TriggerAction::RelocateDock => "relocate_dock",
            TriggerAction::LeaveDock => "leave_dock",
            TriggerAction::Move { .. } => "move",
            TriggerAction::CancelTask => "cancel_task",
            TriggerAction::ClearAllMaps => "clear_all_maps",
        }
    }
}

/// Global error type for control dispatch, coordinator failures and
/// configuration problems.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MowerError {
    #[error("Coordinator action {action} failed: {details}")]
    Coordinator { action: String, details: String },

    #[error("Value {value} for {key} is outside [{min}, {max}]")]
    OutOfRange {
        key: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid device limit for {key}: [{min}, {max}]")]
    InvalidLimit { key: String, min: f64, max: f64 },

    #[error("Unknown control: {0}")]
    UnknownControl(String),

    #[error("Control {unique_id} is not a {expected} control")]
    KindMismatch { unique_id: String, expected: String },

    #[error("Configuration error: {0}")]
    Config(String),
}
