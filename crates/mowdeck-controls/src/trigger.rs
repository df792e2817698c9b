//! [`TriggerAdapter`] – a button bound to one coordinator.

use std::sync::Arc;

use mowdeck_types::{Category, MowerError};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::coordinator::{Coordinator, run_trigger};
use crate::descriptor::TriggerDescriptor;

/// Host-facing view of a button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonSnapshot {
    pub unique_id: String,
    pub key: String,
    pub translation_key: String,
    pub category: Category,
}

/// Runtime object bridging one [`TriggerDescriptor`] to one device.
pub struct TriggerAdapter {
    unique_id: String,
    device_name: String,
    descriptor: &'static TriggerDescriptor,
    coordinator: Arc<dyn Coordinator>,
}

impl TriggerAdapter {
    /// Bind `descriptor` to `coordinator`.  Construction performs no action.
    pub fn new(coordinator: Arc<dyn Coordinator>, descriptor: &'static TriggerDescriptor) -> Self {
        Self {
            unique_id: format!("{}_{}", coordinator.device_name(), descriptor.key),
            device_name: coordinator.device_name().to_string(),
            descriptor,
            coordinator,
        }
    }

    /// `{device}_{key}`, stable across restarts.
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Name of the device this button belongs to.
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// The static description this button was built from.
    pub fn descriptor(&self) -> &'static TriggerDescriptor {
        self.descriptor
    }

    /// Handle a press: run the descriptor's action exactly once.
    ///
    /// # Errors
    ///
    /// Whatever the coordinator returned; there is no retry.
    pub async fn press(&self) -> Result<(), MowerError> {
        run_trigger(self.coordinator.as_ref(), self.descriptor.action)
            .await
            .inspect_err(|e| warn!(unique_id = %self.unique_id, error = %e, "button action failed"))
    }

    /// Current host-facing view.
    pub fn snapshot(&self) -> ButtonSnapshot {
        ButtonSnapshot {
            unique_id: self.unique_id.clone(),
            key: self.descriptor.key.to_string(),
            translation_key: self.descriptor.key.to_string(),
            category: self.descriptor.category,
        }
    }
}
