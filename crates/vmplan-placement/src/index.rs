use std::collections::HashMap;

use vmplan_devices::{Controller, ControllerFamily, ControllerKind, DeviceKey, SLOT_RESERVE};

use crate::planner::PlacementOptions;

/// In-memory projection of the controllers visible to one planning pass,
/// built from the change set and the machine's existing devices.
///
/// Attachment counts are recorded optimistically: `attach` does not check
/// that the key names a controller. [`ControllerIndex::validate_attachments`]
/// drops counts for keys that never materialised; it runs exactly once,
/// after ingestion and before placement.
pub(crate) struct ControllerIndex {
    options: PlacementOptions,
    controller_by_key: HashMap<DeviceKey, ControllerKind>,
    disk_count_by_controller_key: HashMap<DeviceKey, u32>,
    /// Keys per controller kind, first-seen order. The placer probes
    /// instances in this order, so it is load-bearing.
    keys_by_kind: [Vec<DeviceKey>; 8],
    /// Used bus numbers per family, bits 0..=2. Observed bus numbers above
    /// 2 record nothing.
    used_buses: [u8; 3],
}

fn family_slot(family: ControllerFamily) -> usize {
    match family {
        ControllerFamily::Scsi => 0,
        ControllerFamily::Sata => 1,
        ControllerFamily::Nvme => 2,
    }
}

impl ControllerIndex {
    pub(crate) fn new(options: PlacementOptions) -> Self {
        ControllerIndex {
            options,
            controller_by_key: HashMap::new(),
            disk_count_by_controller_key: HashMap::new(),
            keys_by_kind: Default::default(),
            used_buses: [0; 3],
        }
    }

    /// Record a controller in every projection.
    pub(crate) fn add(&mut self, controller: &Controller) {
        self.controller_by_key
            .insert(controller.key, controller.kind);
        self.keys_by_kind[controller.kind.index()].push(controller.key);
        if (0..=2).contains(&controller.bus_number) {
            self.used_buses[family_slot(controller.kind.family())] |=
                1 << controller.bus_number;
        }
    }

    /// Bump the tentative disk count for `key`, whether or not `key` names a
    /// controller.
    pub(crate) fn attach(&mut self, key: DeviceKey) {
        *self.disk_count_by_controller_key.entry(key).or_insert(0) += 1;
    }

    /// Drop counts whose key names no controller.
    pub(crate) fn validate_attachments(&mut self) {
        let controllers = &self.controller_by_key;
        self.disk_count_by_controller_key
            .retain(|key, _| controllers.contains_key(key));
    }

    pub(crate) fn contains(&self, key: DeviceKey) -> bool {
        self.controller_by_key.contains_key(&key)
    }

    /// Whether `key` can take one more disk under the reserved-slot rule.
    pub(crate) fn has_free_slot(&self, key: DeviceKey) -> bool {
        let Some(&kind) = self.controller_by_key.get(&key) else {
            return false;
        };
        let capacity = kind.disk_capacity(
            self.options.hardware_version,
            self.options.versioned_disk_limits,
        );
        let attached = self
            .disk_count_by_controller_key
            .get(&key)
            .copied()
            .unwrap_or(0);
        attached < capacity.saturating_sub(SLOT_RESERVE)
    }

    /// Lowest unused bus number in {0,1,2}, else 3. The fallback is not
    /// checked for collisions; the per-family instance cap enforced upstream
    /// keeps it safe.
    pub(crate) fn free_bus_number(&self, family: ControllerFamily) -> i32 {
        let mask = self.used_buses[family_slot(family)];
        for bus in 0..=2 {
            if mask & (1 << bus) == 0 {
                return bus;
            }
        }
        3
    }

    /// Number of controllers seen in `family`.
    pub(crate) fn count(&self, family: ControllerFamily) -> u32 {
        ControllerKind::ALL
            .iter()
            .filter(|kind| kind.family() == family)
            .map(|kind| self.keys_by_kind[kind.index()].len() as u32)
            .sum()
    }

    /// Keys of `kind`, first-seen order.
    pub(crate) fn keys_of_kind(&self, kind: ControllerKind) -> &[DeviceKey] {
        &self.keys_by_kind[kind.index()]
    }
}
