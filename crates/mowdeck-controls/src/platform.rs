//! Platform setup: turn a discovered device into its set of controls.
//!
//! Which numeric controls a device gets depends on its [`DeviceVariant`].
//! The mapping is explicit in [`numeric_subsets`] and resolved once per
//! device:
//!
//! | Variant | Numeric subsets, in order |
//! |---|---|
//! | [`DeviceVariant::Luba`] | working (device limits), config (static), Luba working (device limits) |
//! | [`DeviceVariant::Yuka`] | working (device limits), config (static), Yuka (static) |
//!
//! Every device gets every button in [`BUTTON_CONTROLS`].

use std::sync::Arc;

use mowdeck_types::{DeviceLimits, MowerError};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::coordinator::Coordinator;
use crate::descriptor::{
    BUTTON_CONTROLS, CONFIG_NUMBERS, LUBA_WORKING_NUMBERS, NumberDescriptor, WORKING_NUMBERS,
    YUKA_NUMBERS,
};
use crate::notify::StateNotifier;
use crate::numeric::{BoundsStrategy, NumericAdapter};
use crate::registry::{Control, ControlHost};
use crate::trigger::TriggerAdapter;

const YUKA_PREFIX: &str = "Yuka-";

/// Hardware family of a mower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceVariant {
    /// Luba and every other non-Yuka model.
    #[default]
    Luba,
    Yuka,
}

impl DeviceVariant {
    /// Classify a device by its name, e.g. `"Yuka-MN1234"` → [`DeviceVariant::Yuka`].
    /// The prefix match is case-sensitive.
    pub fn classify(device_name: &str) -> Self {
        if device_name.starts_with(YUKA_PREFIX) {
            DeviceVariant::Yuka
        } else {
            DeviceVariant::Luba
        }
    }
}

/// Where a numeric subset takes its bounds from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsSource {
    Static,
    DeviceLimits,
}

/// One ordered group of numeric descriptors and its bounds source.
#[derive(Debug, Clone, Copy)]
pub struct NumberSubset {
    pub descriptors: &'static [NumberDescriptor],
    pub bounds: BoundsSource,
}

/// The three numeric subsets a device of `variant` gets, in registration order.
pub fn numeric_subsets(variant: DeviceVariant) -> [NumberSubset; 3] {
    let variant_subset = match variant {
        DeviceVariant::Luba => NumberSubset {
            descriptors: LUBA_WORKING_NUMBERS,
            bounds: BoundsSource::DeviceLimits,
        },
        DeviceVariant::Yuka => NumberSubset {
            descriptors: YUKA_NUMBERS,
            bounds: BoundsSource::Static,
        },
    };
    [
        NumberSubset {
            descriptors: WORKING_NUMBERS,
            bounds: BoundsSource::DeviceLimits,
        },
        NumberSubset {
            descriptors: CONFIG_NUMBERS,
            bounds: BoundsSource::Static,
        },
        variant_subset,
    ]
}

/// Build every control of one device and hand them to `host`.
///
/// Numeric controls seed the coordinator's operation settings as they are
/// constructed.  Returns the number of controls registered.
///
/// # Errors
///
/// [`MowerError::InvalidLimit`] when `limits` holds an inverted or
/// non-finite entry.  Nothing is constructed or registered in that case.
pub fn setup_device(
    coordinator: Arc<dyn Coordinator>,
    limits: Arc<DeviceLimits>,
    notifier: Arc<dyn StateNotifier>,
    host: &mut impl ControlHost,
) -> Result<usize, MowerError> {
    limits.validate()?;
    let variant = DeviceVariant::classify(coordinator.device_name());
    let static_strategy = BoundsStrategy::Static;
    let limits_strategy = BoundsStrategy::DeviceLimits(limits);

    let mut controls: Vec<Control> = BUTTON_CONTROLS
        .iter()
        .map(|d| Control::Trigger(TriggerAdapter::new(coordinator.clone(), d)))
        .collect();

    for subset in numeric_subsets(variant) {
        let strategy = match subset.bounds {
            BoundsSource::Static => &static_strategy,
            BoundsSource::DeviceLimits => &limits_strategy,
        };
        controls.extend(subset.descriptors.iter().map(|d| {
            Control::Numeric(NumericAdapter::new(
                coordinator.clone(),
                d,
                strategy,
                notifier.clone(),
            ))
        }));
    }

    let count = controls.len();
    info!(device = coordinator.device_name(), ?variant, controls = count, "device set up");
    host.add_controls(controls);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use mowdeck_types::SettingField;

    use super::*;
    use crate::notify::BroadcastNotifier;
    use crate::registry::ControlRegistry;
    use crate::sim::{CoordinatorCall, SimCoordinator};

    #[test]
    fn classify_by_name_prefix() {
        assert_eq!(DeviceVariant::classify("Yuka-MN1234"), DeviceVariant::Yuka);
        assert_eq!(DeviceVariant::classify("yuka-abc"), DeviceVariant::Luba);
        assert_eq!(DeviceVariant::classify("YUKA-abc"), DeviceVariant::Luba);
        assert_eq!(DeviceVariant::classify("Luba-VS1KXYZ"), DeviceVariant::Luba);
        assert_eq!(DeviceVariant::classify("Yuk"), DeviceVariant::Luba);
        assert_eq!(DeviceVariant::classify(""), DeviceVariant::Luba);
    }

    #[test]
    fn variant_subsets_differ_only_in_last_group() {
        let luba = numeric_subsets(DeviceVariant::Luba);
        let yuka = numeric_subsets(DeviceVariant::Yuka);
        assert_eq!(luba[0].descriptors, yuka[0].descriptors);
        assert_eq!(luba[1].descriptors, yuka[1].descriptors);
        assert_eq!(luba[2].descriptors[0].key, "blade_height");
        assert_eq!(luba[2].bounds, BoundsSource::DeviceLimits);
        assert_eq!(yuka[2].descriptors[0].key, "dumping_interval");
        assert_eq!(yuka[2].bounds, BoundsSource::Static);
    }

    fn setup(name: &str, limits: DeviceLimits) -> (Arc<SimCoordinator>, ControlRegistry, usize) {
        let sim = Arc::new(SimCoordinator::new(name));
        let mut registry = ControlRegistry::new();
        let count = setup_device(
            sim.clone(),
            Arc::new(limits),
            Arc::new(BroadcastNotifier::default()),
            &mut registry,
        )
        .unwrap();
        (sim, registry, count)
    }

    #[test]
    fn luba_gets_blade_height_and_no_dumping_interval() {
        let (_, registry, count) = setup("Luba-1", DeviceLimits::new());
        assert_eq!(count, 9 + 2 + 3 + 1);
        assert_eq!(registry.len(), count);
        assert!(registry.ids().any(|id| id == "Luba-1_blade_height"));
        assert!(!registry.ids().any(|id| id == "Luba-1_dumping_interval"));
    }

    #[test]
    fn yuka_gets_dumping_interval_and_no_blade_height() {
        let (_, registry, _) = setup("Yuka-1", DeviceLimits::new());
        assert!(registry.ids().any(|id| id == "Yuka-1_dumping_interval"));
        assert!(!registry.ids().any(|id| id == "Yuka-1_blade_height"));
    }

    #[test]
    fn setup_seeds_operation_settings_once_per_number() {
        let limits = DeviceLimits::new()
            .with("blade_height", 30.0, 60.0)
            .with("start_progress", 50.0, 60.0);
        let (sim, _, _) = setup("Luba-1", limits);

        let settings = sim.operation_settings();
        assert_eq!(settings.blade_height, 30.0);
        assert_eq!(settings.speed, 0.2);
        assert_eq!(settings.channel_width, 20.0);
        assert_eq!(settings.toward, 0.0);
        assert_eq!(settings.toward_included_angle, 90.0);
        // start_progress is a static-bounds control; device limits do not apply.
        assert_eq!(settings.start_progress, 0.0);

        let setting_calls = sim
            .calls()
            .into_iter()
            .filter(|c| matches!(c, CoordinatorCall::Setting(..)))
            .count();
        assert_eq!(setting_calls, 6);
        assert!(!sim
            .calls()
            .contains(&CoordinatorCall::Setting(SettingField::CollectGrassFrequency, 5.0)));
    }

    #[test]
    fn inverted_limit_registers_nothing() {
        let sim = Arc::new(SimCoordinator::new("Luba-1"));
        let mut registry = ControlRegistry::new();
        let err = setup_device(
            sim.clone(),
            Arc::new(DeviceLimits::new().with("blade_height", 60.0, 30.0)),
            Arc::new(BroadcastNotifier::default()),
            &mut registry,
        )
        .unwrap_err();
        assert!(matches!(err, MowerError::InvalidLimit { ref key, .. } if key == "blade_height"));
        assert!(registry.is_empty());
        assert!(sim.calls().is_empty());
    }

    #[test]
    fn setup_never_triggers_buttons() {
        let (sim, _, _) = setup("Yuka-2", DeviceLimits::new());
        assert!(sim
            .calls()
            .iter()
            .all(|c| matches!(c, CoordinatorCall::Setting(..))));
    }
}
