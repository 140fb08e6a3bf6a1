#![no_main]

use libfuzzer_sys::fuzz_target;
use lshw_core::AssociationRecord;
use lshw_core::resolver::{AssociationPair, DevicePath, primary_roots};

fuzz_target!(|data: &[u8]| {
    if data.len() > 4096 {
        return;
    }
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    if let Some(path) = DevicePath::parse(s) {
        let _ = path.trailing_segment();
    }
    // First line is the antecedent, the rest the dependent.
    let (antecedent, dependent) = s.split_once('\n').unwrap_or((s, ""));
    let rows = [AssociationRecord::new(antecedent, dependent)];
    let pairs = AssociationPair::parse_all("fuzz", &rows);
    let _ = primary_roots(&pairs, r"PCI\");
});
