//! Control descriptors – the static tables every device's controls are built
//! from.
//!
//! A descriptor is pure data: a stable key, display metadata, and the action
//! to run against a [`Coordinator`][crate::coordinator::Coordinator].  The
//! tables below are ordered and never mutated; platform setup picks the ones
//! that apply to a device (see [`crate::platform::numeric_subsets`]).
//!
//! | Table | Kind | Applies to |
//! |---|---|---|
//! | [`BUTTON_CONTROLS`] | trigger | every device |
//! | [`WORKING_NUMBERS`] | numeric, device limits | every device |
//! | [`CONFIG_NUMBERS`] | numeric, static bounds | every device |
//! | [`YUKA_NUMBERS`] | numeric, static bounds | Yuka |
//! | [`LUBA_WORKING_NUMBERS`] | numeric, device limits | Luba (default) |

use mowdeck_types::{
    Bounds, Category, DeviceClass, MoveDirection, NumberMode, SettingField, TriggerAction, Unit,
};

/// Key of the control whose initial value is 90° rather than 0°.
pub const INCLUDED_ANGLE_KEY: &str = "toward_included_angle";

/// Distance of one emergency nudge, in meters.
pub const NUDGE_DISTANCE_M: f32 = 0.4;

/// A button-like control that fires one coordinator action per press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerDescriptor {
    pub key: &'static str,
    pub category: Category,
    pub action: TriggerAction,
}

/// A numeric control whose value is written to one operation-settings field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberDescriptor {
    pub key: &'static str,
    pub category: Category,
    pub bounds: Bounds,
    pub unit: Option<Unit>,
    pub mode: NumberMode,
    pub device_class: Option<DeviceClass>,
    pub field: SettingField,
}

impl NumberDescriptor {
    /// Panic on descriptors that can never hold a valid value.
    pub(crate) fn assert_valid(&self) {
        assert!(
            self.bounds.min <= self.bounds.max,
            "descriptor {}: min {} exceeds max {}",
            self.key,
            self.bounds.min,
            self.bounds.max
        );
        assert!(
            self.bounds.step > 0.0,
            "descriptor {}: step must be positive",
            self.key
        );
    }
}

pub static BUTTON_CONTROLS: &[TriggerDescriptor] = &[
    TriggerDescriptor {
        key: "start_map_sync",
        category: Category::Config,
        action: TriggerAction::SyncMaps,
    },
    TriggerDescriptor {
        key: "resync_rtk_dock",
        category: Category::Config,
        action: TriggerAction::RelocateDock,
    },
    TriggerDescriptor {
        key: "release_from_dock",
        category: Category::None,
        action: TriggerAction::LeaveDock,
    },
    TriggerDescriptor {
        key: "emergency_nudge_forward",
        category: Category::None,
        action: TriggerAction::Move {
            direction: MoveDirection::Forward,
            distance_m: NUDGE_DISTANCE_M,
        },
    },
    TriggerDescriptor {
        key: "emergency_nudge_left",
        category: Category::None,
        action: TriggerAction::Move {
            direction: MoveDirection::Left,
            distance_m: NUDGE_DISTANCE_M,
        },
    },
    TriggerDescriptor {
        key: "emergency_nudge_right",
        category: Category::None,
        action: TriggerAction::Move {
            direction: MoveDirection::Right,
            distance_m: NUDGE_DISTANCE_M,
        },
    },
    TriggerDescriptor {
        key: "emergency_nudge_back",
        category: Category::None,
        action: TriggerAction::Move {
            direction: MoveDirection::Back,
            distance_m: NUDGE_DISTANCE_M,
        },
    },
    TriggerDescriptor {
        key: "cancel_task",
        category: Category::None,
        action: TriggerAction::CancelTask,
    },
    TriggerDescriptor {
        key: "clear_all_mapdata",
        category: Category::Config,
        action: TriggerAction::ClearAllMaps,
    },
];

/// Job parameters whose range the device itself reports.
pub static WORKING_NUMBERS: &[NumberDescriptor] = &[
    NumberDescriptor {
        key: "working_speed",
        category: Category::Config,
        bounds: Bounds {
            min: 0.2,
            max: 0.6,
            step: 0.1,
        },
        unit: Some(Unit::MetersPerSecond),
        mode: NumberMode::Auto,
        device_class: Some(DeviceClass::Speed),
        field: SettingField::Speed,
    },
    NumberDescriptor {
        key: "path_spacing",
        category: Category::Config,
        bounds: Bounds {
            min: 20.0,
            max: 35.0,
            step: 1.0,
        },
        unit: Some(Unit::Centimeters),
        mode: NumberMode::Auto,
        device_class: Some(DeviceClass::Distance),
        field: SettingField::ChannelWidth,
    },
];

pub static CONFIG_NUMBERS: &[NumberDescriptor] = &[
    NumberDescriptor {
        key: "start_progress",
        category: Category::Config,
        bounds: Bounds {
            min: 0.0,
            max: 100.0,
            step: 1.0,
        },
        unit: Some(Unit::Percent),
        mode: NumberMode::Slider,
        device_class: None,
        field: SettingField::StartProgress,
    },
    NumberDescriptor {
        key: "cutting_angle",
        category: Category::Config,
        bounds: Bounds {
            min: -180.0,
            max: 180.0,
            step: 1.0,
        },
        unit: Some(Unit::Degree),
        mode: NumberMode::Auto,
        device_class: None,
        field: SettingField::Toward,
    },
    NumberDescriptor {
        key: INCLUDED_ANGLE_KEY,
        category: Category::Config,
        bounds: Bounds {
            min: -180.0,
            max: 180.0,
            step: 1.0,
        },
        unit: Some(Unit::Degree),
        mode: NumberMode::Auto,
        device_class: None,
        field: SettingField::TowardIncludedAngle,
    },
];

pub static YUKA_NUMBERS: &[NumberDescriptor] = &[NumberDescriptor {
    key: "dumping_interval",
    category: Category::Config,
    bounds: Bounds {
        min: 5.0,
        max: 100.0,
        step: 1.0,
    },
    unit: Some(Unit::SquareMeters),
    mode: NumberMode::Slider,
    device_class: None,
    field: SettingField::CollectGrassFrequency,
}];

pub static LUBA_WORKING_NUMBERS: &[NumberDescriptor] = &[NumberDescriptor {
    key: "blade_height",
    category: Category::Config,
    bounds: Bounds {
        min: 25.0,
        max: 70.0,
        step: 1.0,
    },
    unit: None,
    mode: NumberMode::Box,
    device_class: None,
    field: SettingField::BladeHeight,
}];
