use vmplan_versions::HardwareVersion;

use crate::ControllerKind;

/// Slots held back per controller: a controller is treated as full one disk
/// before its hard capacity, so a concurrent modification racing this plan
/// cannot over-pack it.
pub const SLOT_RESERVE: u32 = 1;

const SCSI_DISKS: u32 = 16;
const SATA_DISKS: u32 = 30;
const NVME_DISKS: u32 = 15;

const PVSCSI_DISKS_EXTENDED: u32 = 256;
const NVME_DISKS_EXTENDED: u32 = 255;

impl ControllerKind {
    /// Hard per-controller disk capacity.
    ///
    /// The baseline pins the lower bound of each range (16 / 30 / 15) and
    /// ignores hardware version. With `versioned_limits` set and a hardware
    /// version supplied, the extended limits apply: paravirtual SCSI grows
    /// to 256 at vmx-14 and NVMe to 255 at vmx-21. The flag stays off by
    /// default until the reference behaviour is confirmed.
    pub fn disk_capacity(
        self,
        hardware_version: Option<HardwareVersion>,
        versioned_limits: bool,
    ) -> u32 {
        if versioned_limits {
            if let Some(hw) = hardware_version {
                match self {
                    ControllerKind::ParaVirtualScsi if hw >= HardwareVersion::VMX_14 => {
                        return PVSCSI_DISKS_EXTENDED;
                    }
                    ControllerKind::Nvme if hw >= HardwareVersion::VMX_21 => {
                        return NVME_DISKS_EXTENDED;
                    }
                    _ => {}
                }
            }
        }
        match self {
            ControllerKind::ParaVirtualScsi
            | ControllerKind::BusLogic
            | ControllerKind::LsiLogic
            | ControllerKind::LsiLogicSas
            | ControllerKind::GenericScsi => SCSI_DISKS,
            ControllerKind::Sata | ControllerKind::Ahci => SATA_DISKS,
            ControllerKind::Nvme => NVME_DISKS,
        }
    }
}
