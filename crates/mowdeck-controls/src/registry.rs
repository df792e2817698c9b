//! [`ControlRegistry`] – in-process host for constructed controls.
//!
//! The registry plays the host platform's part: platform setup hands it the
//! controls of every device via [`ControlHost::add_controls`], and UI events
//! are routed to the targeted control by unique id through
//! [`ControlRegistry::dispatch`].
//!
//! Every control sits behind its own async mutex.  Events for different
//! controls run concurrently (their actions may suspend on the network);
//! events for the same control are handled one at a time, in order.

use std::collections::HashMap;

use futures_util::future::join_all;
use mowdeck_types::MowerError;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::numeric::{NumberSnapshot, NumericAdapter};
use crate::trigger::{ButtonSnapshot, TriggerAdapter};

/// A constructed control of either kind.
pub enum Control {
    Trigger(TriggerAdapter),
    Numeric(NumericAdapter),
}

impl Control {
    /// Unique id of the wrapped control.
    pub fn unique_id(&self) -> &str {
        match self {
            Control::Trigger(t) => t.unique_id(),
            Control::Numeric(n) => n.unique_id(),
        }
    }

    /// Name of the device the control belongs to.
    pub fn device_name(&self) -> &str {
        match self {
            Control::Trigger(t) => t.device_name(),
            Control::Numeric(n) => n.device_name(),
        }
    }

    /// Host-facing view of the wrapped control.
    pub fn snapshot(&self) -> ControlSnapshot {
        match self {
            Control::Trigger(t) => ControlSnapshot::Button(t.snapshot()),
            Control::Numeric(n) => ControlSnapshot::Number(n.snapshot()),
        }
    }
}

/// Host-facing view of a control of either kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ControlSnapshot {
    Button(ButtonSnapshot),
    Number(NumberSnapshot),
}

impl ControlSnapshot {
    /// Unique id of the snapshotted control.
    pub fn unique_id(&self) -> &str {
        match self {
            ControlSnapshot::Button(b) => &b.unique_id,
            ControlSnapshot::Number(n) => &n.unique_id,
        }
    }
}

/// A UI event aimed at one control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ControlEvent {
    Press { unique_id: String },
    SetValue { unique_id: String, value: f64 },
}

/// The host platform's registration call.
pub trait ControlHost {
    /// Take ownership of newly constructed controls.
    fn add_controls(&mut self, controls: Vec<Control>);
}

/// Registry of every control of every device, in registration order.
#[derive(Default)]
pub struct ControlRegistry {
    order: Vec<String>,
    controls: HashMap<String, Mutex<Control>>,
}

impl ControlHost for ControlRegistry {
    /// Register controls.  A control whose unique id is already registered
    /// replaces the old one and keeps its position.
    fn add_controls(&mut self, controls: Vec<Control>) {
        for control in controls {
            let id = control.unique_id().to_string();
            if self.controls.insert(id.clone(), Mutex::new(control)).is_none() {
                self.order.push(id);
            }
        }
        info!(total = self.order.len(), "controls registered");
    }
}

impl ControlRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered controls.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// `true` when no control is registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Unique ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Remove every control of `device_name` (device teardown).  Controls
    /// are matched on the exact device name they were built for.  Returns how
    /// many were removed.
    pub fn remove_device(&mut self, device_name: &str) -> usize {
        let before = self.order.len();
        self.controls
            .retain(|_, control| control.get_mut().device_name() != device_name);
        let controls = &self.controls;
        self.order.retain(|id| controls.contains_key(id));
        let removed = before - self.order.len();
        info!(device = device_name, removed, "controls removed");
        removed
    }

    /// Route `event` to its control.
    ///
    /// # Errors
    ///
    /// * [`MowerError::UnknownControl`] – no control has that id.
    /// * [`MowerError::KindMismatch`] – pressing a number or setting a button.
    /// * Anything the control's action returned.
    pub async fn dispatch(&self, event: ControlEvent) -> Result<(), MowerError> {
        debug!(?event, "dispatching control event");
        match event {
            ControlEvent::Press { unique_id } => {
                let control = self.lookup(&unique_id)?.lock().await;
                match &*control {
                    Control::Trigger(button) => button.press().await,
                    Control::Numeric(_) => Err(MowerError::KindMismatch {
                        unique_id,
                        expected: "button".to_string(),
                    }),
                }
            }
            ControlEvent::SetValue { unique_id, value } => {
                let mut control = self.lookup(&unique_id)?.lock().await;
                match &mut *control {
                    Control::Numeric(number) => number.set_value(value),
                    Control::Trigger(_) => Err(MowerError::KindMismatch {
                        unique_id,
                        expected: "number".to_string(),
                    }),
                }
            }
        }
    }

    /// Snapshot of one control.
    pub async fn snapshot(&self, unique_id: &str) -> Result<ControlSnapshot, MowerError> {
        Ok(self.lookup(unique_id)?.lock().await.snapshot())
    }

    /// Snapshots of every control, in registration order.
    pub async fn snapshots(&self) -> Vec<ControlSnapshot> {
        join_all(
            self.order
                .iter()
                .filter_map(|id| self.controls.get(id))
                .map(|control| async move { control.lock().await.snapshot() }),
        )
        .await
    }

    /// Re-seed numeric controls from persisted snapshots.  Snapshots for
    /// unknown or non-numeric controls are skipped.  Returns how many
    /// controls were restored.
    pub async fn restore(&self, saved: &[NumberSnapshot]) -> usize {
        let mut restored = 0;
        for snap in saved {
            let Some(control) = self.controls.get(&snap.unique_id) else {
                debug!(unique_id = %snap.unique_id, "skipping restore for unknown control");
                continue;
            };
            if let Control::Numeric(number) = &mut *control.lock().await {
                let value = number.restore(snap.value);
                debug!(unique_id = %snap.unique_id, value, "restored numeric control");
                restored += 1;
            }
        }
        restored
    }

    fn lookup(&self, unique_id: &str) -> Result<&Mutex<Control>, MowerError> {
        self.controls
            .get(unique_id)
            .ok_or_else(|| MowerError::UnknownControl(unique_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures_util::future::join;
    use mowdeck_types::{SettingField, TriggerAction};

    use super::*;
    use crate::descriptor::{BUTTON_CONTROLS, WORKING_NUMBERS};
    use crate::notify::BroadcastNotifier;
    use crate::numeric::BoundsStrategy;
    use crate::sim::{CoordinatorCall, SimCoordinator};

    fn registry_with(sim: &Arc<SimCoordinator>) -> ControlRegistry {
        let notifier = Arc::new(BroadcastNotifier::default());
        let mut registry = ControlRegistry::new();
        let mut controls: Vec<Control> = BUTTON_CONTROLS
            .iter()
            .map(|d| Control::Trigger(TriggerAdapter::new(sim.clone(), d)))
            .collect();
        controls.extend(WORKING_NUMBERS.iter().map(|d| {
            Control::Numeric(NumericAdapter::new(
                sim.clone(),
                d,
                &BoundsStrategy::Static,
                notifier.clone(),
            ))
        }));
        registry.add_controls(controls);
        registry
    }

    #[tokio::test]
    async fn press_routes_to_button() {
        let sim = Arc::new(SimCoordinator::new("Luba-A"));
        let registry = registry_with(&sim);
        registry
            .dispatch(ControlEvent::Press {
                unique_id: "Luba-A_cancel_task".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(
            sim.calls().last(),
            Some(&CoordinatorCall::Trigger(TriggerAction::CancelTask))
        );
    }

    #[tokio::test]
    async fn set_value_routes_to_number() {
        let sim = Arc::new(SimCoordinator::new("Luba-A"));
        let registry = registry_with(&sim);
        registry
            .dispatch(ControlEvent::SetValue {
                unique_id: "Luba-A_working_speed".to_string(),
                value: 0.5,
            })
            .await
            .unwrap();
        assert_eq!(sim.operation_settings().speed, 0.5);
        match registry.snapshot("Luba-A_working_speed").await.unwrap() {
            ControlSnapshot::Number(n) => assert_eq!(n.value, 0.5),
            other => panic!("unexpected snapshot {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_id_and_kind_mismatch_are_errors() {
        let sim = Arc::new(SimCoordinator::new("Luba-A"));
        let registry = registry_with(&sim);

        let err = registry
            .dispatch(ControlEvent::Press {
                unique_id: "Luba-A_nope".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, MowerError::UnknownControl("Luba-A_nope".to_string()));

        let err = registry
            .dispatch(ControlEvent::Press {
                unique_id: "Luba-A_path_spacing".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MowerError::KindMismatch { .. }));

        let err = registry
            .dispatch(ControlEvent::SetValue {
                unique_id: "Luba-A_cancel_task".to_string(),
                value: 1.0,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MowerError::KindMismatch { .. }));
    }

    #[tokio::test]
    async fn events_for_different_controls_run_concurrently() {
        let sim = Arc::new(SimCoordinator::new("Luba-A"));
        let registry = registry_with(&sim);
        let (a, b) = join(
            registry.dispatch(ControlEvent::Press {
                unique_id: "Luba-A_start_map_sync".to_string(),
            }),
            registry.dispatch(ControlEvent::SetValue {
                unique_id: "Luba-A_path_spacing".to_string(),
                value: 30.0,
            }),
        )
        .await;
        a.unwrap();
        b.unwrap();
        assert!(sim.calls().contains(&CoordinatorCall::Trigger(TriggerAction::SyncMaps)));
        assert!(sim.calls().contains(&CoordinatorCall::Setting(SettingField::ChannelWidth, 30.0)));
    }

    #[tokio::test]
    async fn snapshots_follow_registration_order() {
        let sim = Arc::new(SimCoordinator::new("Luba-A"));
        let registry = registry_with(&sim);
        let ids: Vec<String> = registry
            .snapshots()
            .await
            .iter()
            .map(|s| s.unique_id().to_string())
            .collect();
        assert_eq!(ids.len(), BUTTON_CONTROLS.len() + WORKING_NUMBERS.len());
        assert_eq!(ids[0], "Luba-A_start_map_sync");
        assert_eq!(ids.last().unwrap(), "Luba-A_path_spacing");
    }

    #[tokio::test]
    async fn restore_skips_unknown_controls() {
        let sim = Arc::new(SimCoordinator::new("Luba-A"));
        let registry = registry_with(&sim);
        let ControlSnapshot::Number(mut saved) = registry.snapshot("Luba-A_path_spacing").await.unwrap() else {
            panic!("expected number");
        };
        saved.value = 33.0;
        let mut stale = saved.clone();
        stale.unique_id = "Gone-Device_path_spacing".to_string();

        assert_eq!(registry.restore(&[saved, stale]).await, 1);
        assert_eq!(sim.operation_settings().channel_width, 33.0);
    }

    #[test]
    fn re_registering_replaces_without_duplicating() {
        let sim = Arc::new(SimCoordinator::new("Luba-A"));
        let mut registry = registry_with(&sim);
        let before = registry.len();
        registry.add_controls(vec![Control::Trigger(TriggerAdapter::new(
            sim.clone(),
            &BUTTON_CONTROLS[0],
        ))]);
        assert_eq!(registry.len(), before);
    }

    #[test]
    fn remove_device_keeps_sibling_with_underscore_suffix() {
        let luba = Arc::new(SimCoordinator::new("Luba"));
        let garage = Arc::new(SimCoordinator::new("Luba_garage"));
        let mut registry = ControlRegistry::new();
        registry.add_controls(vec![
            Control::Trigger(TriggerAdapter::new(luba.clone(), &BUTTON_CONTROLS[0])),
            Control::Trigger(TriggerAdapter::new(garage.clone(), &BUTTON_CONTROLS[0])),
        ]);

        assert_eq!(registry.remove_device("Luba"), 1);
        assert_eq!(registry.ids().collect::<Vec<_>>(), ["Luba_garage_start_map_sync"]);
        assert_eq!(registry.remove_device("Luba"), 0);
    }

    #[test]
    fn remove_device_drops_only_that_device() {
        let a = Arc::new(SimCoordinator::new("Luba-A"));
        let b = Arc::new(SimCoordinator::new("Luba-AB"));
        let mut registry = registry_with(&a);
        registry.add_controls(vec![Control::Trigger(TriggerAdapter::new(
            b.clone(),
            &BUTTON_CONTROLS[0],
        ))]);
        let removed = registry.remove_device("Luba-A");
        assert_eq!(removed, BUTTON_CONTROLS.len() + WORKING_NUMBERS.len());
        assert_eq!(registry.ids().collect::<Vec<_>>(), ["Luba-AB_start_map_sync"]);
    }
}
