#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Snapshot and configuration files driven through the report builder.

use std::fs;

use lshw_bootstrap::{AppConfig, build_report, load_snapshot};

const SNAPSHOT: &str = r#"{
  "records": {
    "Win32_ComputerSystem": [{"Name": "LAB-7", "Description": "x64-based PC", "Model": "ThinkCentre M720q"}],
    "Win32_BaseBoard": [{"Product": "3136", "Manufacturer": "LENOVO"}],
    "Win32_Processor": [
      {"Name": "Intel(R) Core(TM) i5-8500T", "MaxClockSpeed": 2100},
      {"Name": "Intel(R) Core(TM) i5-8500T", "MaxClockSpeed": 2100}
    ]
  },
  "failures": {
    "Win32_BIOS": {"kind": "permission_denied", "message": "access denied"}
  }
}"#;

#[test]
fn builds_report_from_snapshot_and_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("lab-7.json");
    fs::write(&snapshot, SNAPSHOT).unwrap();
    let config_file = dir.path().join("lshw.yaml");
    fs::write(&config_file, "report:\n  root: baseboard\n").unwrap();

    let config = temp_env::with_vars_unset(
        ["LSHW__REPORT__ROOT", "LSHW__REPORT__INCLUDE_CHILDREN"],
        || AppConfig::load(Some(&config_file)).unwrap(),
    );
    let source = load_snapshot(snapshot.to_str().unwrap()).unwrap();
    let tree = build_report(&config, &source).unwrap();

    assert_eq!(tree.id, "core");
    assert_eq!(tree.vendor, "LENOVO");
    let cpus: Vec<&str> = tree.children.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(cpus, ["cpu:0", "cpu:1"]);
}

#[test]
fn default_root_is_the_computer() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("lab-7.json");
    fs::write(&snapshot, SNAPSHOT).unwrap();

    let source = load_snapshot(snapshot.to_str().unwrap()).unwrap();
    let tree = build_report(&AppConfig::default(), &source).unwrap();
    assert_eq!(tree.id, "LAB-7");
    assert_eq!(tree.children.len(), 1);
}

#[test]
fn bad_inputs_surface_with_context() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.json");
    assert!(load_snapshot(missing.to_str().unwrap()).is_err());

    let broken = dir.path().join("broken.json");
    fs::write(&broken, r#"{"records": {"Win32_Service": []}}"#).unwrap();
    let err = load_snapshot(broken.to_str().unwrap()).unwrap_err();
    assert!(format!("{err:#}").contains("Win32_Service"));

    let empty = dir.path().join("empty.json");
    fs::write(&empty, "{}").unwrap();
    let source = load_snapshot(empty.to_str().unwrap()).unwrap();
    let err = build_report(&AppConfig::default(), &source).unwrap_err();
    assert!(format!("{err:#}").contains("produced no nodes"));
}
