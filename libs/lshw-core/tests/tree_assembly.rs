#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end assembly of a recorded workstation snapshot.
//!
//! Covers:
//! - the full nested layout produced from the built-in registry
//! - single placement of drives reachable from controllers and the bus
//! - controller chains rebuilt from association rows
//! - leaf failures that drop a subtree without failing the report
//! - the sparse serialized form

use std::collections::HashSet;

use lshw_core::{
    AssociationRecord, CategoryRegistry, DataAccessError, Entity, InventoryConfig, InventoryError,
    Node, SnapshotSource, TreeAssembler,
};
use serde_json::json;

const WORKSTATION: &str = include_str!("fixtures/workstation.json");

fn workstation() -> SnapshotSource {
    SnapshotSource::from_json(WORKSTATION).expect("fixture snapshot is valid")
}

fn assemble(source: &SnapshotSource) -> Result<Node, InventoryError> {
    let registry = CategoryRegistry::builtin().unwrap();
    let config = InventoryConfig::default();
    TreeAssembler::new(&registry, source, &config).assemble("system", true)
}

fn find<'a>(tree: &'a Node, id: &str) -> &'a Node {
    tree.walk()
        .find(|node| node.id == id)
        .unwrap_or_else(|| panic!("node {id} missing"))
}

#[test]
fn workstation_tree_has_expected_layout() {
    let tree = assemble(&workstation()).unwrap();

    let ids: Vec<&str> = tree.walk().map(|node| node.id.as_str()).collect();
    assert_eq!(
        ids,
        [
            "WS-01",
            "core",
            "firmware",
            "memory:0",
            "bank:0",
            "bank:1",
            "pci",
            "pci:0",
            "controller:0",
            "channel:0",
            "disk",
            "volume:0",
            "volume:1",
            "logicalvolume:2",
            "channel:1",
            "cdrom",
            "scsi:0",
            "disk",
            "network",
            "display",
            "usb:0",
            "usb_mouse",
            "multimedia",
            "cpu:0",
        ]
    );

    assert_eq!(tree.description, "AT/AT COMPATIBLE, mini-tower");
    assert_eq!(tree.serial, "7XK2BZ1");
    assert_eq!(find(&tree, "memory:0").size, 8_589_934_592);
    assert_eq!(find(&tree, "firmware").version, "DELL   - 1072009");
    assert_eq!(find(&tree, "volume:0").capabilities["bootable"], "Bootable partition (active)");
    assert_eq!(find(&tree, "logicalvolume:2").configuration["mount.fstype"], "NTFS");
    assert_eq!(find(&tree, "cdrom").configuration["status"], "no disc");
    assert_eq!(find(&tree, "usb_mouse").vendor, "Microsoft");
}

#[test]
fn every_drive_is_placed_exactly_once() {
    let tree = assemble(&workstation()).unwrap();

    let mut seen = HashSet::new();
    for node in tree.walk().filter(|node| node.category == "disk") {
        assert!(
            seen.insert(node.pnp_device_id.clone()),
            "{} placed twice",
            node.pnp_device_id
        );
    }
    assert_eq!(seen.len(), 3);

    let pci = find(&tree, "pci");
    assert!(
        pci.children.iter().all(|child| child.id != "disk"),
        "drives claimed by controllers must not repeat under the bus"
    );
}

#[test]
fn shared_antecedent_yields_one_controller_with_two_channels() {
    let tree = assemble(&workstation()).unwrap();

    let controllers: Vec<&Node> = tree.walk().filter(|n| n.id.starts_with("controller:")).collect();
    assert_eq!(controllers.len(), 1);
    let channels: Vec<&str> = controllers[0].children.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(channels, ["channel:0", "channel:1"]);
    assert_eq!(controllers[0].product, "Intel(R) 7 Series/C216 Chipset Family SATA AHCI Controller");
}

#[test]
fn resolution_stops_after_the_channel_level() {
    let path = |class: &str, value: &str| {
        format!(r#"\\H\root\cimv2:{class}.DeviceID="{}""#, value.replace('\\', r"\\"))
    };
    let link = |a: &str, d: &str| AssociationRecord::new(path("Win32_IDEController", a), path("Win32_IDEController", d));
    let controller = |pnp: &str| json!({"PNPDeviceID": pnp, "Caption": pnp}).as_object().cloned().unwrap();

    let source = SnapshotSource::new()
        .with_records(Entity::ComputerSystem, [json!({"Name": "VM"}).as_object().cloned().unwrap()])
        .with_associations(
            Entity::IdeControllerDevice,
            [
                link(r"PCI\ROOT", r"PCIIDE\CHANNEL\0"),
                link(r"PCIIDE\CHANNEL\0", r"PCIIDE\NESTED\1"),
                link(r"PCIIDE\NESTED\1", r"PCIIDE\DEEPER\2"),
            ],
        )
        .with_records(
            Entity::IdeController,
            [
                controller(r"PCI\ROOT"),
                controller(r"PCIIDE\CHANNEL\0"),
                controller(r"PCIIDE\NESTED\1"),
                controller(r"PCIIDE\DEEPER\2"),
            ],
        );

    let tree = assemble(&source).unwrap();
    let primary = find(&tree, "controller:0");
    assert_eq!(primary.children.len(), 1);
    let channel = &primary.children[0];
    assert_eq!(channel.id, "channel:0");
    assert!(channel.children.is_empty());
    assert!(tree.walk().all(|n| n.pnp_device_id != r"PCIIDE\DEEPER\2"));
}

#[test]
fn failing_leaf_sources_keep_the_rest_of_the_report() {
    let source = workstation()
        .fail(Entity::NetworkAdapter, DataAccessError::PermissionDenied("access denied".to_owned()))
        .fail(Entity::DiskDriveToDiskPartition, DataAccessError::Malformed("truncated".to_owned()));

    let tree = assemble(&source).unwrap();
    assert!(tree.walk().all(|n| n.id != "network"));
    assert!(tree.walk().all(|n| !n.id.starts_with("volume:")));
    assert_eq!(tree.walk().filter(|n| n.id == "disk").count(), 2);
}

#[test]
fn report_is_identical_across_runs() {
    let source = workstation();
    let first = assemble(&source).unwrap();
    let second = assemble(&source).unwrap();
    assert_eq!(first, second);
}

#[test]
fn serialized_nodes_are_sparse() {
    let tree = assemble(&workstation()).unwrap();
    let cpu = serde_json::to_value(find(&tree, "cpu:0")).unwrap();

    assert_eq!(cpu["class"], "processor");
    assert_eq!(cpu["businfo"], "cpu@0");
    assert_eq!(cpu["clock"], 3401);
    for absent in ["size", "capacity", "logicalname", "configuration", "capabilities", "date"] {
        assert!(cpu.get(absent).is_none(), "{absent} should be omitted");
    }
    assert!(cpu.get("category").is_none());
    assert_eq!(cpu["children"], json!([]));
}
