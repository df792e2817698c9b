//! State-change notifications from numeric controls to the host.
//!
//! The host supplies a [`StateNotifier`]; numeric controls call it once after
//! every accepted value change.  [`BroadcastNotifier`] fans the changes out
//! over a [`tokio::sync::broadcast`] channel so any number of listeners (a UI,
//! a state persister, …) see every change.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

/// Default channel capacity before slow listeners start lagging.
const DEFAULT_CAPACITY: usize = 64;

/// A numeric control's displayed value changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChanged {
    pub unique_id: String,
    pub value: f64,
}

/// Host-side "write state" primitive.
pub trait StateNotifier: Send + Sync {
    /// Called once per accepted value change.
    fn state_changed(&self, change: StateChanged);
}

/// Broadcast-backed notifier.  Clones share the same channel.
#[derive(Clone, Debug)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<StateChanged>,
}

impl BroadcastNotifier {
    /// Create a notifier whose channel buffers `capacity` changes.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receive every change sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChanged> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl StateNotifier for BroadcastNotifier {
    fn state_changed(&self, change: StateChanged) {
        // No listeners is a normal condition.
        if let Err(broadcast::error::SendError(change)) = self.sender.send(change) {
            trace!(unique_id = %change.unique_id, "state change dropped: no listeners");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_changes() {
        let notifier = BroadcastNotifier::default();
        let mut rx = notifier.subscribe();
        notifier.state_changed(StateChanged {
            unique_id: "Luba-X_blade_height".to_string(),
            value: 40.0,
        });
        let change = rx.recv().await.unwrap();
        assert_eq!(change.unique_id, "Luba-X_blade_height");
        assert_eq!(change.value, 40.0);
    }

    #[test]
    fn sending_without_subscribers_does_not_panic() {
        let notifier = BroadcastNotifier::new(4);
        notifier.state_changed(StateChanged {
            unique_id: "x".to_string(),
            value: 1.0,
        });
    }
}
