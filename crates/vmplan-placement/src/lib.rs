//! Device-graph planner: give every virtual disk a legal storage controller.
//!
//! The planner consumes a caller-owned [`ConfigSpec`] plus the devices
//! already realised on the machine, and mutates the change set until every
//! pending disk names a controller that exists or will exist, synthesising
//! controllers (and the PCI root they hang off) when none suffice:
//!
//! - [`ensure_disks_have_controllers`]: default limits
//! - [`ensure_disks_have_controllers_with`]: explicit [`PlacementOptions`]
//!
//! The planner is synchronous, performs no I/O, and touches no global state;
//! concurrent calls over disjoint change sets need no synchronisation. On
//! error the change set may be partially mutated and must be discarded.
//!
//! [`ConfigSpec`]: vmplan_devices::ConfigSpec

mod index;
mod planner;

pub use planner::{
    ensure_disks_have_controllers, ensure_disks_have_controllers_with, PlacementError,
    PlacementOptions, Result,
};

#[cfg(test)]
mod proptests;
