//! `mowdeck-controls` – Mower Control Entities
//!
//! Buttons and numeric sliders for a robotic mower, built from static
//! descriptor tables and bound to a per-device [`Coordinator`].
//!
//! # Modules
//!
//! - [`descriptor`] – the ordered, immutable descriptor tables.
//! - [`coordinator`] – [`Coordinator`]: the device seam every action goes
//!   through.
//! - [`trigger`] – [`TriggerAdapter`]: one press, one coordinator call.
//! - [`numeric`] – [`NumericAdapter`]: bounds resolution, initial value
//!   seeding, range-checked updates.
//! - [`platform`] – per-device setup and variant selection.
//! - [`registry`] – [`ControlRegistry`]: in-process host that routes UI
//!   events to controls.
//! - [`notify`] – state-change notifications to the host.
//! - [`sim`] – [`SimCoordinator`][sim::SimCoordinator]: a recording stub
//!   coordinator.

pub mod coordinator;
pub mod descriptor;
pub mod notify;
pub mod numeric;
pub mod platform;
pub mod registry;
pub mod sim;
pub mod trigger;

pub use coordinator::Coordinator;
pub use notify::{BroadcastNotifier, StateChanged, StateNotifier};
pub use numeric::{BoundsStrategy, NumberSnapshot, NumericAdapter};
pub use platform::{DeviceVariant, setup_device};
pub use registry::{Control, ControlEvent, ControlHost, ControlRegistry, ControlSnapshot};
pub use trigger::{ButtonSnapshot, TriggerAdapter};
