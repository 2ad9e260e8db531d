use thiserror::Error;
use tracing::{debug, trace};

use vmplan_devices::{
    BusSharing, ConfigSpec, Controller, ControllerFamily, ControllerKind, DeviceKey, Operation,
    PciRoot, VirtualDevice,
};
use vmplan_versions::HardwareVersion;

use crate::index::ControllerIndex;

pub type Result<T> = std::result::Result<T, PlacementError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    /// Every controller family is at its per-machine cap and at least one
    /// disk remains unplaced. The change set is poisoned; discard it.
    #[error("no controllers available")]
    NoControllersAvailable,
}

/// Knobs for one planning pass.
#[derive(Debug, Clone, Default)]
pub struct PlacementOptions {
    /// Virtual-hardware generation of the target machine, if known.
    pub hardware_version: Option<HardwareVersion>,
    /// Apply the hardware-version-dependent per-controller disk limits.
    /// Off by default; see `ControllerKind::disk_capacity`.
    pub versioned_disk_limits: bool,
}

/// Ensure every pending disk in `spec` is attached to a legal storage
/// controller, with default [`PlacementOptions`].
///
/// See [`ensure_disks_have_controllers_with`].
pub fn ensure_disks_have_controllers(
    spec: &mut ConfigSpec,
    existing: &[VirtualDevice],
) -> Result<()> {
    ensure_disks_have_controllers_with(spec, existing, &PlacementOptions::default())
}

/// Ensure every pending disk in `spec` is attached to a legal storage
/// controller.
///
/// Disks whose `controller_key` already names a controller (pending or
/// existing) are left alone. Unattached disks are placed on the first
/// controller with a free slot, probing kinds in preference order
/// ([`ControllerKind::ALL`]) and instances in first-seen order. When no
/// controller has room, a new one is synthesised (paravirtual SCSI first,
/// then AHCI, then NVMe as each family fills its four-instance cap) and
/// wired to the PCI root, itself synthesised when absent. Synthesised
/// devices take fresh negative keys below every key observed on entry.
///
/// On success, every disk in the change set names a present-or-pending
/// controller, no controller exceeds its capacity minus the reserved slot,
/// and entry order is preserved (the planner only appends). On
/// [`PlacementError::NoControllersAvailable`] the change set is partially
/// mutated and must be discarded.
pub fn ensure_disks_have_controllers_with(
    spec: &mut ConfigSpec,
    existing: &[VirtualDevice],
    options: &PlacementOptions,
) -> Result<()> {
    let mut index = ControllerIndex::new(options.clone());
    let mut pci_root: Option<DeviceKey> = None;
    let mut min_key: DeviceKey = 0;
    // Indices into `spec.device_changes` of the disks to place, in entry
    // order. Later appends never invalidate them.
    let mut pending: Vec<usize> = Vec::new();

    // Phase 1: ingest the change set.
    for (at, change) in spec.device_changes.iter().enumerate() {
        if change.operation == Operation::Remove {
            continue;
        }
        let Some(device) = &change.device else {
            continue;
        };
        min_key = min_key.min(device.key());
        match device {
            // Last observation wins; duplicates are accepted silently.
            VirtualDevice::PciRoot(root) => pci_root = Some(root.key),
            VirtualDevice::Controller(controller) => index.add(controller),
            VirtualDevice::Disk(disk) => {
                pending.push(at);
                if disk.controller_key != 0 {
                    // Optimistic: the key is not yet known to be valid.
                    index.attach(disk.controller_key);
                }
            }
            VirtualDevice::Ethernet(_) => {}
        }
    }

    // Nothing to place.
    if pending.is_empty() {
        return Ok(());
    }

    // Phase 2: ingest existing devices. Existing disks carry valid
    // controller keys by construction, so they only contribute inventory
    // and attachment counts.
    for device in existing {
        min_key = min_key.min(device.key());
        match device {
            VirtualDevice::PciRoot(root) => pci_root = Some(root.key),
            VirtualDevice::Controller(controller) => index.add(controller),
            VirtualDevice::Disk(disk) => index.attach(disk.controller_key),
            VirtualDevice::Ethernet(_) => {}
        }
    }

    // Every synthesised key must sit strictly below every key observed.
    let mut cursor: DeviceKey = min_key - 1;

    // Phase 3: the PCI root, synthesised when neither source had one.
    let pci_root_key = match pci_root {
        Some(key) => key,
        None => {
            let key = cursor;
            cursor -= 1;
            debug!(key, "synthesising pci root");
            spec.add_device(VirtualDevice::PciRoot(PciRoot { key }));
            key
        }
    };

    // Phase 4: attachment counts become trustworthy.
    index.validate_attachments();

    // Phase 5: place each pending disk.
    for at in pending {
        let controller_key = match &spec.device_changes[at].device {
            Some(VirtualDevice::Disk(disk)) => disk.controller_key,
            _ => continue,
        };
        if index.contains(controller_key) {
            trace!(controller_key, "disk already placed");
            continue;
        }

        let chosen = match find_free(&index) {
            Some(key) => {
                trace!(controller_key = key, "placing disk on existing controller");
                key
            }
            None => {
                let key = create_controller(spec, &mut index, cursor, pci_root_key)?;
                cursor -= 1;
                key
            }
        };
        index.attach(chosen);
        if let Some(VirtualDevice::Disk(disk)) = &mut spec.device_changes[at].device {
            disk.controller_key = chosen;
        }
    }

    Ok(())
}

/// First controller with a free slot, probing kinds in preference order and
/// instances within a kind in first-seen order.
fn find_free(index: &ControllerIndex) -> Option<DeviceKey> {
    for kind in ControllerKind::ALL {
        for &key in index.keys_of_kind(kind) {
            if index.has_free_slot(key) {
                return Some(key);
            }
        }
    }
    None
}

/// Synthesise a controller in the first family below its instance cap and
/// append its `add` entry. The caller owns the key cursor; `key` is taken
/// as-is.
fn create_controller(
    spec: &mut ConfigSpec,
    index: &mut ControllerIndex,
    key: DeviceKey,
    pci_root_key: DeviceKey,
) -> Result<DeviceKey> {
    let kind = if index.count(ControllerFamily::Scsi) < ControllerFamily::Scsi.max_per_vm() {
        ControllerKind::ParaVirtualScsi
    } else if index.count(ControllerFamily::Sata) < ControllerFamily::Sata.max_per_vm() {
        ControllerKind::Ahci
    } else if index.count(ControllerFamily::Nvme) < ControllerFamily::Nvme.max_per_vm() {
        ControllerKind::Nvme
    } else {
        return Err(PlacementError::NoControllersAvailable);
    };

    let controller = Controller {
        key,
        kind,
        controller_key: pci_root_key,
        bus_number: index.free_bus_number(kind.family()),
        sharing: match kind {
            ControllerKind::ParaVirtualScsi | ControllerKind::Nvme => Some(BusSharing::NoSharing),
            _ => None,
        },
        hot_add_remove: match kind {
            ControllerKind::ParaVirtualScsi => Some(true),
            _ => None,
        },
    };
    debug!(
        key,
        ?kind,
        bus_number = controller.bus_number,
        "synthesising controller"
    );
    index.add(&controller);
    spec.add_device(VirtualDevice::Controller(controller));
    Ok(key)
}
