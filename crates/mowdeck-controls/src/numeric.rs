//! [`NumericAdapter`] – a slider/box control bound to one coordinator.
//!
//! # Bounds resolution
//!
//! The adapter is parameterised by a [`BoundsStrategy`]:
//!
//! | Strategy | Effective bounds |
//! |---|---|
//! | [`BoundsStrategy::Static`] | the descriptor's bounds |
//! | [`BoundsStrategy::DeviceLimits`] | the device's limit for the key, or the descriptor's bounds when the device reports none |
//!
//! # Initial value
//!
//! The effective minimum, except 0 for angle controls and 90 for
//! [`INCLUDED_ANGLE_KEY`], then clamped into the effective bounds.  The
//! initial value is written to the coordinator during construction so the
//! pending operation settings are seeded before anyone touches a control.
//!
//! # Range checking
//!
//! [`NumericAdapter::set_value`] rejects values outside the effective bounds
//! and leaves both the adapter and the coordinator untouched.  Step alignment
//! is left to the host widget.

use std::sync::Arc;

use mowdeck_types::{Category, DeviceClass, DeviceLimits, Limit, MowerError, NumberMode, Unit};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::coordinator::Coordinator;
use crate::descriptor::{INCLUDED_ANGLE_KEY, NumberDescriptor};
use crate::notify::{StateChanged, StateNotifier};

/// How a [`NumericAdapter`] resolves its effective bounds.
#[derive(Debug, Clone, Default)]
pub enum BoundsStrategy {
    #[default]
    Static,
    DeviceLimits(Arc<DeviceLimits>),
}

impl BoundsStrategy {
    /// Effective `{min, max}` for `descriptor` under this strategy.
    pub fn resolve(&self, descriptor: &NumberDescriptor) -> Limit {
        let fallback = Limit {
            min: descriptor.bounds.min,
            max: descriptor.bounds.max,
        };
        match self {
            BoundsStrategy::Static => fallback,
            BoundsStrategy::DeviceLimits(limits) => limits.get(descriptor.key).unwrap_or(fallback),
        }
    }
}

/// Host-facing view of a numeric control; also what gets persisted for
/// restore-on-restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberSnapshot {
    pub unique_id: String,
    pub key: String,
    pub category: Category,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub unit: Option<Unit>,
    pub mode: NumberMode,
    pub device_class: Option<DeviceClass>,
}

/// Runtime object bridging one [`NumberDescriptor`] to one device.
pub struct NumericAdapter {
    unique_id: String,
    device_name: String,
    descriptor: &'static NumberDescriptor,
    coordinator: Arc<dyn Coordinator>,
    notifier: Arc<dyn StateNotifier>,
    min: f64,
    max: f64,
    value: f64,
}

impl NumericAdapter {
    /// Resolve bounds, compute the initial value and write it to the
    /// coordinator (exactly one call).
    ///
    /// # Panics
    ///
    /// When the descriptor or the device limit has `min > max` or a
    /// non-positive step.
    pub fn new(
        coordinator: Arc<dyn Coordinator>,
        descriptor: &'static NumberDescriptor,
        strategy: &BoundsStrategy,
        notifier: Arc<dyn StateNotifier>,
    ) -> Self {
        descriptor.assert_valid();
        let Limit { min, max } = strategy.resolve(descriptor);
        assert!(
            min <= max,
            "device limit for {}: min {min} exceeds max {max}",
            descriptor.key
        );

        let value = initial_value(descriptor, min, max);
        let adapter = Self {
            unique_id: format!("{}_{}", coordinator.device_name(), descriptor.key),
            device_name: coordinator.device_name().to_string(),
            descriptor,
            coordinator,
            notifier,
            min,
            max,
            value,
        };
        debug!(unique_id = %adapter.unique_id, min, max, value, "numeric control initialised");
        adapter.apply();
        adapter
    }

    /// `{device}_{key}`, stable across restarts.
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Name of the device this control belongs to.
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// The static description this control was built from.
    pub fn descriptor(&self) -> &'static NumberDescriptor {
        self.descriptor
    }

    /// Value currently in effect.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Effective minimum after bounds resolution.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Effective maximum after bounds resolution.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Accept a new value from the host: store it, write it to the
    /// coordinator, then notify the host.
    ///
    /// # Errors
    ///
    /// [`MowerError::OutOfRange`] when `value` is outside the effective
    /// bounds (NaN included); nothing is stored, applied or notified.
    pub fn set_value(&mut self, value: f64) -> Result<(), MowerError> {
        if !(self.min..=self.max).contains(&value) {
            warn!(unique_id = %self.unique_id, value, min = self.min, max = self.max, "rejected out-of-range value");
            return Err(MowerError::OutOfRange {
                key: self.descriptor.key.to_string(),
                value,
                min: self.min,
                max: self.max,
            });
        }
        self.value = value;
        self.apply();
        self.notifier.state_changed(StateChanged {
            unique_id: self.unique_id.clone(),
            value,
        });
        Ok(())
    }

    /// Re-seed a value persisted before a restart.  The value is clamped
    /// into the current bounds (device limits may have changed) and written
    /// to the coordinator; the host is not notified.  Returns the value in
    /// effect afterwards.
    pub fn restore(&mut self, value: f64) -> f64 {
        if value.is_nan() {
            return self.value;
        }
        self.value = value.clamp(self.min, self.max);
        self.apply();
        self.value
    }

    /// Current host-facing view.
    pub fn snapshot(&self) -> NumberSnapshot {
        NumberSnapshot {
            unique_id: self.unique_id.clone(),
            key: self.descriptor.key.to_string(),
            category: self.descriptor.category,
            value: self.value,
            min: self.min,
            max: self.max,
            step: self.descriptor.bounds.step,
            unit: self.descriptor.unit,
            mode: self.descriptor.mode,
            device_class: self.descriptor.device_class,
        }
    }

    fn apply(&self) {
        self.coordinator
            .apply_setting(self.descriptor.field, self.value);
    }
}

fn initial_value(descriptor: &NumberDescriptor, min: f64, max: f64) -> f64 {
    let mut value = min;
    if descriptor.unit.is_some_and(Unit::is_angle) {
        value = 0.0;
    }
    if descriptor.key == INCLUDED_ANGLE_KEY {
        value = 90.0;
    }
    value.clamp(min, max)
}
