use proptest::prelude::*;

use crate::{decode_byte_array, device_registry, encode_byte_array, TypedJsonCodec};
use vmplan_devices::{ConfigSpec, Controller, ControllerKind, Disk, PciRoot, VirtualDevice};

fn kind_strategy() -> impl Strategy<Value = ControllerKind> {
    prop::sample::select(ControllerKind::ALL.to_vec())
}

fn device_strategy() -> impl Strategy<Value = VirtualDevice> {
    prop_oneof![
        any::<i32>().prop_map(|key| VirtualDevice::PciRoot(PciRoot { key })),
        (any::<i32>(), kind_strategy(), any::<i32>(), 0i32..4).prop_map(
            |(key, kind, controller_key, bus_number)| {
                VirtualDevice::Controller(Controller {
                    key,
                    kind,
                    controller_key,
                    bus_number,
                    sharing: None,
                    hot_add_remove: None,
                })
            }
        ),
        (any::<i32>(), any::<i32>(), any::<u64>()).prop_map(|(key, controller_key, capacity_kb)| {
            VirtualDevice::Disk(Disk {
                key,
                controller_key,
                unit_number: None,
                capacity_kb,
                file_name: None,
            })
        }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_byte_array_round_trips(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let wire = encode_byte_array("byte", &bytes);
        prop_assert_eq!(decode_byte_array("byte", &wire).unwrap(), bytes);
    }

    #[test]
    fn prop_change_sets_round_trip_through_json(devices in prop::collection::vec(device_strategy(), 0..12)) {
        let registry = device_registry();
        let codec = TypedJsonCodec::new(&registry);

        let mut spec = ConfigSpec::new();
        for device in devices {
            spec.add_device(device);
        }

        let wire = codec.encode_spec(&spec).unwrap();
        prop_assert_eq!(codec.decode_spec(wire).unwrap(), spec);
    }
}
