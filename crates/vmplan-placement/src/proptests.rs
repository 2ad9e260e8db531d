use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use proptest::test_runner::TestCaseResult;

use vmplan_devices::{
    ConfigSpec, Controller, ControllerFamily, ControllerKind, DeviceChange, DeviceKey, Disk,
    Ethernet, Operation, PciRoot, VirtualDevice,
};

use crate::{ensure_disks_have_controllers, PlacementError};

const PHANTOM_KEY: DeviceKey = 987_654;

#[derive(Debug, Clone)]
enum PendingTarget {
    /// `controller_key = 0`.
    Unassigned,
    /// A key that names no controller anywhere.
    Phantom,
    /// Wired to an existing controller picked by index (modulo count),
    /// honouring the reserved-slot rule at generation time.
    Existing(usize),
}

#[derive(Debug, Clone)]
struct Scenario {
    existing: Vec<VirtualDevice>,
    spec: ConfigSpec,
}

fn scsi_kind() -> impl Strategy<Value = ControllerKind> {
    prop_oneof![
        Just(ControllerKind::ParaVirtualScsi),
        Just(ControllerKind::BusLogic),
        Just(ControllerKind::LsiLogic),
        Just(ControllerKind::LsiLogicSas),
        Just(ControllerKind::GenericScsi),
    ]
}

fn sata_kind() -> impl Strategy<Value = ControllerKind> {
    prop_oneof![Just(ControllerKind::Sata), Just(ControllerKind::Ahci)]
}

fn pending_target() -> impl Strategy<Value = PendingTarget> {
    prop_oneof![
        4 => Just(PendingTarget::Unassigned),
        1 => Just(PendingTarget::Phantom),
        3 => (0usize..16).prop_map(PendingTarget::Existing),
    ]
}

/// Per-family existing controllers with their initial disk loads. Loads stay
/// at or below capacity minus the reserved slot, matching what a planner
/// run would itself leave behind.
fn family_strategy(
    kind: BoxedStrategy<ControllerKind>,
    max_load: u32,
) -> impl Strategy<Value = Vec<(ControllerKind, u32)>> {
    prop::collection::vec((kind, 0..=max_load), 0..=4)
}

fn scenario_strategy() -> impl Strategy<Value = Scenario> {
    (
        any::<bool>(),
        family_strategy(scsi_kind().boxed(), 15),
        family_strategy(sata_kind().boxed(), 29),
        family_strategy(Just(ControllerKind::Nvme).boxed(), 14),
        prop::collection::vec(pending_target(), 1..=24),
        any::<bool>(),
    )
        .prop_map(|(has_root, scsi, sata, nvme, pending, noise)| {
            build_scenario(has_root, &[scsi, sata, nvme].concat(), &pending, noise)
        })
}

fn build_scenario(
    has_root: bool,
    controllers: &[(ControllerKind, u32)],
    pending: &[PendingTarget],
    noise: bool,
) -> Scenario {
    let mut existing = Vec::new();
    if has_root {
        existing.push(VirtualDevice::PciRoot(PciRoot { key: 100 }));
    }

    let mut family_bus: HashMap<ControllerFamily, i32> = HashMap::new();
    let mut keys_and_remaining: Vec<(DeviceKey, u32)> = Vec::new();
    let mut key = 1000;
    let mut disk_key = 5000;
    for &(kind, load) in controllers {
        let bus = family_bus.entry(kind.family()).or_insert(0);
        existing.push(VirtualDevice::Controller(Controller {
            key,
            kind,
            controller_key: 100,
            bus_number: *bus,
            sharing: None,
            hot_add_remove: None,
        }));
        *bus += 1;
        for _ in 0..load {
            existing.push(VirtualDevice::Disk(Disk {
                key: disk_key,
                controller_key: key,
                unit_number: None,
                capacity_kb: 1024,
                file_name: None,
            }));
            disk_key += 1;
        }
        let capacity = kind.disk_capacity(None, false);
        keys_and_remaining.push((key, capacity - 1 - load));
        key += 1;
    }

    let mut spec = ConfigSpec::new();
    for (i, target) in pending.iter().enumerate() {
        let controller_key = match target {
            PendingTarget::Unassigned => 0,
            PendingTarget::Phantom => PHANTOM_KEY,
            PendingTarget::Existing(at) if !keys_and_remaining.is_empty() => {
                let at = at % keys_and_remaining.len();
                let (ctrl_key, remaining) = &mut keys_and_remaining[at];
                if *remaining > 0 {
                    *remaining -= 1;
                    *ctrl_key
                } else {
                    0
                }
            }
            PendingTarget::Existing(_) => 0,
        };
        spec.add_device(VirtualDevice::Disk(Disk {
            key: -(1 + i as DeviceKey),
            controller_key,
            unit_number: None,
            capacity_kb: 1024,
            file_name: None,
        }));
    }

    if noise {
        spec.add_device(VirtualDevice::Ethernet(Ethernet {
            key: -100,
            mac_address: None,
        }));
        spec.remove_device(
            VirtualDevice::Disk(Disk {
                key: 5999,
                controller_key: PHANTOM_KEY,
                unit_number: None,
                capacity_kb: 1024,
                file_name: None,
            }),
            None,
        );
        spec.device_changes.push(DeviceChange {
            operation: Operation::Add,
            device: None,
            file_operation: None,
        });
    }

    Scenario { existing, spec }
}

fn controller_union(spec: &ConfigSpec, existing: &[VirtualDevice]) -> HashMap<DeviceKey, ControllerKind> {
    let mut union = HashMap::new();
    for change in &spec.device_changes {
        if change.operation == Operation::Remove {
            continue;
        }
        if let Some(VirtualDevice::Controller(c)) = &change.device {
            union.insert(c.key, c.kind);
        }
    }
    for device in existing {
        if let VirtualDevice::Controller(c) = device {
            union.insert(c.key, c.kind);
        }
    }
    union
}

fn planned_disks(spec: &ConfigSpec) -> Vec<(usize, Disk)> {
    spec.device_changes
        .iter()
        .enumerate()
        .filter(|(_, c)| c.operation != Operation::Remove)
        .filter_map(|(i, c)| match &c.device {
            Some(VirtualDevice::Disk(d)) => Some((i, d.clone())),
            _ => None,
        })
        .collect()
}

fn check_scenario(scenario: &Scenario) -> TestCaseResult {
    let mut spec = scenario.spec.clone();
    let baseline_len = spec.device_changes.len();

    let min_entry_key = spec
        .device_changes
        .iter()
        .filter(|c| c.operation != Operation::Remove)
        .filter_map(|c| c.device.as_ref().map(VirtualDevice::key))
        .chain(scenario.existing.iter().map(VirtualDevice::key))
        .fold(0, DeviceKey::min);

    let union_before = controller_union(&spec, &scenario.existing);
    let valid_before: Vec<(usize, DeviceKey)> = planned_disks(&spec)
        .into_iter()
        .filter(|(_, d)| union_before.contains_key(&d.controller_key))
        .map(|(i, d)| (i, d.controller_key))
        .collect();

    if let Err(err) = ensure_disks_have_controllers(&mut spec, &scenario.existing) {
        // The only recoverable failure; the change set is poisoned.
        prop_assert_eq!(err, PlacementError::NoControllersAvailable);
        return Ok(());
    }

    let union_after = controller_union(&spec, &scenario.existing);

    // 1. Every disk names a controller in the union.
    for (_, disk) in planned_disks(&spec) {
        prop_assert!(
            union_after.contains_key(&disk.controller_key),
            "disk points at {} which is not a controller",
            disk.controller_key
        );
    }

    // 2. Valid attachments were not rewritten.
    for (at, key_before) in valid_before {
        let disk = spec.device_changes[at]
            .device
            .as_ref()
            .and_then(VirtualDevice::as_disk)
            .expect("entry kept its disk");
        prop_assert_eq!(disk.controller_key, key_before);
    }

    // 3. Synthesised keys are distinct and below every key seen on entry.
    let synthesised: Vec<&VirtualDevice> = spec.device_changes[baseline_len..]
        .iter()
        .filter_map(|c| c.device.as_ref())
        .collect();
    let mut seen = HashSet::new();
    for device in &synthesised {
        prop_assert!(device.key() < min_entry_key);
        prop_assert!(seen.insert(device.key()), "duplicate key {}", device.key());
    }

    // 4. No controller exceeds capacity minus the reserved slot.
    let mut attached: HashMap<DeviceKey, u32> = HashMap::new();
    for (_, disk) in planned_disks(&spec) {
        *attached.entry(disk.controller_key).or_insert(0) += 1;
    }
    for device in &scenario.existing {
        if let VirtualDevice::Disk(d) = device {
            *attached.entry(d.controller_key).or_insert(0) += 1;
        }
    }
    for (&key, &kind) in &union_after {
        let capacity = kind.disk_capacity(None, false);
        let count = attached.get(&key).copied().unwrap_or(0);
        prop_assert!(
            count <= capacity - 1,
            "controller {key} holds {count} of {capacity}"
        );
    }

    // 5. Synthesised controllers: distinct buses per family; below four
    //    instances total, all buses come from {0,1,2}.
    let mut family_totals: HashMap<ControllerFamily, u32> = HashMap::new();
    for &kind in union_after.values() {
        *family_totals.entry(kind.family()).or_insert(0) += 1;
    }
    let mut synth_buses: HashMap<ControllerFamily, Vec<i32>> = HashMap::new();
    for device in &synthesised {
        if let VirtualDevice::Controller(c) = device {
            synth_buses.entry(c.kind.family()).or_default().push(c.bus_number);
        }
    }
    for (family, buses) in &synth_buses {
        let mut unique = buses.clone();
        unique.sort_unstable();
        unique.dedup();
        prop_assert_eq!(unique.len(), buses.len(), "bus collision in {:?}", family);
        if family_totals[family] < 4 {
            prop_assert!(buses.iter().all(|b| (0..=2).contains(b)));
        } else {
            prop_assert!(buses.iter().all(|b| (0..=3).contains(b)));
        }
    }

    // 8. Idempotence: a second pass adds nothing and changes nothing.
    let after_first = spec.clone();
    ensure_disks_have_controllers(&mut spec, &scenario.existing)
        .expect("second pass cannot fail");
    prop_assert_eq!(spec, after_first);

    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_planner_invariants_hold(scenario in scenario_strategy()) {
        check_scenario(&scenario)?;
    }
}
