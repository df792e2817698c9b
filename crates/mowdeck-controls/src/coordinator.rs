//! The per-device [`Coordinator`] seam.
//!
//! Controls never speak the mower protocol themselves.  Every action a
//! control can take is a call on this trait; the implementation owns the
//! connection to the device, serialises conflicting commands and holds the
//! pending [`OperationSettings`][mowdeck_types::OperationSettings] for the
//! next job.

use async_trait::async_trait;
use mowdeck_types::{MoveDirection, MowerError, SettingField, TriggerAction};
use tracing::debug;

/// Shared, stateful collaborator mediating all communication with one mower.
///
/// One coordinator is shared by every control of a device, so implementations
/// must be safe to call from several pending actions at once.
#[async_trait]
pub trait Coordinator: Send + Sync {
    /// Device name as reported by the vendor cloud, e.g. `"Luba-VS1KXYZ"`.
    fn device_name(&self) -> &str;

    async fn sync_maps(&self) -> Result<(), MowerError>;

    /// Re-locate the RTK reference station (charging dock).
    async fn relocate_dock(&self) -> Result<(), MowerError>;

    async fn leave_dock(&self) -> Result<(), MowerError>;

    /// Nudge the mower `distance_m` meters in `direction`.
    async fn move_by(&self, direction: MoveDirection, distance_m: f32) -> Result<(), MowerError>;

    async fn cancel_task(&self) -> Result<(), MowerError>;

    async fn clear_all_maps(&self) -> Result<(), MowerError>;

    /// Write one field of the pending operation settings.  Nothing is sent to
    /// the device.
    fn apply_setting(&self, field: SettingField, value: f64);
}

/// Run `action` against `coordinator`.
///
/// Errors are returned exactly as the coordinator produced them.
pub async fn run_trigger(
    coordinator: &dyn Coordinator,
    action: TriggerAction,
) -> Result<(), MowerError> {
    debug!(device = coordinator.device_name(), action = action.name(), "running trigger action");
    match action {
        TriggerAction::SyncMaps => coordinator.sync_maps().await,
        TriggerAction::RelocateDock => coordinator.relocate_dock().await,
        TriggerAction::LeaveDock => coordinator.leave_dock().await,
        TriggerAction::Move {
            direction,
            distance_m,
        } => coordinator.move_by(direction, distance_m).await,
        TriggerAction::CancelTask => coordinator.cancel_task().await,
        TriggerAction::ClearAllMaps => coordinator.clear_all_maps().await,
    }
}
