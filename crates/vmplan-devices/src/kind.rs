use serde::{Deserialize, Serialize};

/// Storage-controller family. The PCI root is not a storage controller and
/// has no family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerFamily {
    Scsi,
    Sata,
    Nvme,
}

impl ControllerFamily {
    /// Synthesis order when a new controller must be created.
    pub const ALL: [ControllerFamily; 3] = [
        ControllerFamily::Scsi,
        ControllerFamily::Sata,
        ControllerFamily::Nvme,
    ];

    /// Per-machine instance cap, identical across families.
    pub fn max_per_vm(self) -> u32 {
        4
    }
}

/// Concrete controller model.
///
/// Declaration order is the placement preference order: SCSI models first
/// (paravirtual preferred), then SATA models, then NVMe. Downstream
/// consumers rely on SCSI being preferred over SATA over NVMe, so this
/// order is load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerKind {
    ParaVirtualScsi,
    BusLogic,
    LsiLogic,
    LsiLogicSas,
    GenericScsi,
    Sata,
    Ahci,
    Nvme,
}

impl ControllerKind {
    /// Probe order used by the placer, most preferred first.
    pub const ALL: [ControllerKind; 8] = [
        ControllerKind::ParaVirtualScsi,
        ControllerKind::BusLogic,
        ControllerKind::LsiLogic,
        ControllerKind::LsiLogicSas,
        ControllerKind::GenericScsi,
        ControllerKind::Sata,
        ControllerKind::Ahci,
        ControllerKind::Nvme,
    ];

    pub fn family(self) -> ControllerFamily {
        match self {
            ControllerKind::ParaVirtualScsi
            | ControllerKind::BusLogic
            | ControllerKind::LsiLogic
            | ControllerKind::LsiLogicSas
            | ControllerKind::GenericScsi => ControllerFamily::Scsi,
            ControllerKind::Sata | ControllerKind::Ahci => ControllerFamily::Sata,
            ControllerKind::Nvme => ControllerFamily::Nvme,
        }
    }

    /// Stable index of this kind within [`ControllerKind::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}
