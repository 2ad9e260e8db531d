//! Virtual-machine device taxonomy and the configuration change set.
//!
//! The device model is a closed tagged sum ([`VirtualDevice`]) over a small
//! common record: every device carries a signed [`DeviceKey`], controllers
//! additionally carry a parent key (the PCI root) and a bus number, and disks
//! carry a `controller_key` back-reference. Back-references stay opaque
//! integers; nothing here materialises a cyclic object graph.
//!
//! Key convention: devices pending addition carry strictly negative keys,
//! unique within a change set; devices already realised on a machine carry
//! hypervisor-assigned non-negative keys. A disk `controller_key` of `0`
//! means unassigned.

mod capacity;
mod changeset;
mod device;
mod kind;

pub use capacity::SLOT_RESERVE;
pub use changeset::{ConfigSpec, DeviceChange, FileOperation, Operation};
pub use device::{BusSharing, Controller, DeviceKey, Disk, Ethernet, PciRoot, VirtualDevice};
pub use kind::{ControllerFamily, ControllerKind};
