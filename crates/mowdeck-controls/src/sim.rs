//! [`SimCoordinator`] – in-process coordinator for tests and the CLI.
//!
//! Records every call instead of talking to a mower and keeps the pending
//! [`OperationSettings`] in memory, so the full control stack can run
//! without a device or a vendor cloud account.
//!
//! # Example
//!
//! ```rust
//! use mowdeck_controls::sim::{CoordinatorCall, SimCoordinator};
//! use mowdeck_controls::Coordinator;
//! use mowdeck_types::SettingField;
//!
//! let coordinator = SimCoordinator::new("Luba-VS1KXYZ");
//! coordinator.apply_setting(SettingField::BladeHeight, 40.0);
//! assert_eq!(coordinator.operation_settings().blade_height, 40.0);
//! assert_eq!(
//!     coordinator.calls(),
//!     vec![CoordinatorCall::Setting(SettingField::BladeHeight, 40.0)]
//! );
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use mowdeck_types::{MoveDirection, MowerError, OperationSettings, SettingField, TriggerAction};
use tracing::{debug, info};

use crate::coordinator::Coordinator;

/// One recorded coordinator invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinatorCall {
    Trigger(TriggerAction),
    Setting(SettingField, f64),
}

/// Stub coordinator.  Calls are recorded in order, including ones made to
/// fail with [`SimCoordinator::fail_next`].
#[derive(Debug, Default)]
pub struct SimCoordinator {
    device_name: String,
    calls: Mutex<Vec<CoordinatorCall>>,
    settings: Mutex<OperationSettings>,
    fail_next: Mutex<Option<String>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SimCoordinator {
    /// A simulated mower called `device_name` with default settings.
    pub fn new(device_name: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
            ..Self::default()
        }
    }

    /// Make the next trigger action fail with `details`.
    pub fn fail_next(&self, details: impl Into<String>) {
        *lock(&self.fail_next) = Some(details.into());
    }

    /// Snapshot of every call made so far.
    pub fn calls(&self) -> Vec<CoordinatorCall> {
        lock(&self.calls).clone()
    }

    /// Pending operation settings as last written by numeric controls.
    pub fn operation_settings(&self) -> OperationSettings {
        lock(&self.settings).clone()
    }

    fn trigger(&self, action: TriggerAction) -> Result<(), MowerError> {
        lock(&self.calls).push(CoordinatorCall::Trigger(action));
        if let Some(details) = lock(&self.fail_next).take() {
            return Err(MowerError::Coordinator {
                action: action.name().to_string(),
                details,
            });
        }
        info!(device = %self.device_name, action = action.name(), "sim: command accepted");
        Ok(())
    }
}

#[async_trait]
impl Coordinator for SimCoordinator {
    fn device_name(&self) -> &str {
        &self.device_name
    }

    async fn sync_maps(&self) -> Result<(), MowerError> {
        self.trigger(TriggerAction::SyncMaps)
    }

    async fn relocate_dock(&self) -> Result<(), MowerError> {
        self.trigger(TriggerAction::RelocateDock)
    }

    async fn leave_dock(&self) -> Result<(), MowerError> {
        self.trigger(TriggerAction::LeaveDock)
    }

    async fn move_by(&self, direction: MoveDirection, distance_m: f32) -> Result<(), MowerError> {
        self.trigger(TriggerAction::Move {
            direction,
            distance_m,
        })
    }

    async fn cancel_task(&self) -> Result<(), MowerError> {
        self.trigger(TriggerAction::CancelTask)
    }

    async fn clear_all_maps(&self) -> Result<(), MowerError> {
        self.trigger(TriggerAction::ClearAllMaps)
    }

    fn apply_setting(&self, field: SettingField, value: f64) {
        debug!(device = %self.device_name, ?field, value, "sim: setting updated");
        lock(&self.calls).push(CoordinatorCall::Setting(field, value));
        lock(&self.settings).set(field, value);
    }
}
