use serde::{Deserialize, Serialize};

use crate::VirtualDevice;

/// What a change-set entry does to its embedded device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "add")]
    Add,
    #[serde(rename = "edit")]
    Edit,
    #[serde(rename = "remove")]
    Remove,
}

/// Side effect on the device's backing file, for devices that have one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileOperation {
    #[serde(rename = "create")]
    Create,
    #[serde(rename = "destroy")]
    Destroy,
    #[serde(rename = "replace")]
    Replace,
}

/// One entry of the change set.
///
/// `device` is optional to mirror wire payloads in which the embedded device
/// is absent; consumers skip such entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceChange {
    pub operation: Operation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<VirtualDevice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_operation: Option<FileOperation>,
}

/// Desired-configuration change set for one virtual machine.
///
/// Entry order is preserved by every consumer; downstream processing is
/// index-based. The planner's only mutations are appending entries and
/// rewriting disk `controller_key` back-references in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_mb: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_cpus: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    #[serde(default)]
    pub device_changes: Vec<DeviceChange>,
}

impl ConfigSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an `add` entry for the device.
    pub fn add_device(&mut self, device: VirtualDevice) {
        self.device_changes.push(DeviceChange {
            operation: Operation::Add,
            device: Some(device),
            file_operation: None,
        });
    }

    /// Append an `edit` entry for an already-realised device.
    pub fn edit_device(&mut self, device: VirtualDevice) {
        self.device_changes.push(DeviceChange {
            operation: Operation::Edit,
            device: Some(device),
            file_operation: None,
        });
    }

    /// Append a `remove` entry; removed entries are invisible to planning.
    pub fn remove_device(&mut self, device: VirtualDevice, file_operation: Option<FileOperation>) {
        self.device_changes.push(DeviceChange {
            operation: Operation::Remove,
            device: Some(device),
            file_operation,
        });
    }
}
