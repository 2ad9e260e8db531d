use serde::{Deserialize, Serialize};

use crate::ControllerKind;

/// Signed device identifier.
///
/// Negative keys name devices pending addition; non-negative keys are
/// assigned by the hypervisor once a device is realised.
pub type DeviceKey = i32;

/// Bus-sharing policy of a SCSI or NVMe controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusSharing {
    #[serde(rename = "noSharing")]
    NoSharing,
    #[serde(rename = "virtualSharing")]
    VirtualSharing,
    #[serde(rename = "physicalSharing")]
    PhysicalSharing,
}

/// The machine's PCI root. At most one per machine; parent of every storage
/// controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PciRoot {
    pub key: DeviceKey,
}

/// A storage controller instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Controller {
    pub key: DeviceKey,
    pub kind: ControllerKind,
    /// Parent device: the PCI root's key.
    pub controller_key: DeviceKey,
    /// Instance number on the machine's bus topology; the planner assigns
    /// values in 0..=3, but observed devices may carry anything.
    pub bus_number: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sharing: Option<BusSharing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hot_add_remove: Option<bool>,
}

/// A virtual disk. `controller_key == 0` means not yet attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disk {
    pub key: DeviceKey,
    pub controller_key: DeviceKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_number: Option<i32>,
    #[serde(default)]
    pub capacity_kb: u64,
    /// Backing path, opaque to the planner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// A network adapter. The planner ignores it; it exists so change sets that
/// carry non-storage devices flow through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ethernet {
    pub key: DeviceKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
}

/// Closed device sum. The tag doubles as the wire discriminator for the
/// typed JSON codec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_typeName")]
pub enum VirtualDevice {
    PciRoot(PciRoot),
    #[serde(rename = "StorageController")]
    Controller(Controller),
    #[serde(rename = "VirtualDisk")]
    Disk(Disk),
    #[serde(rename = "EthernetAdapter")]
    Ethernet(Ethernet),
}

impl VirtualDevice {
    pub fn key(&self) -> DeviceKey {
        match self {
            VirtualDevice::PciRoot(d) => d.key,
            VirtualDevice::Controller(d) => d.key,
            VirtualDevice::Disk(d) => d.key,
            VirtualDevice::Ethernet(d) => d.key,
        }
    }

    pub fn as_controller(&self) -> Option<&Controller> {
        match self {
            VirtualDevice::Controller(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_disk(&self) -> Option<&Disk> {
        match self {
            VirtualDevice::Disk(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_disk_mut(&mut self) -> Option<&mut Disk> {
        match self {
            VirtualDevice::Disk(d) => Some(d),
            _ => None,
        }
    }
}
