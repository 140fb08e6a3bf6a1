#![no_main]

use libfuzzer_sys::fuzz_target;
use lshw_core::{CategoryRegistry, InventoryConfig, SnapshotSource, TreeAssembler};

fuzz_target!(|data: &[u8]| {
    if data.len() > 16 * 1024 {
        return;
    }
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    // Any snapshot that loads must assemble without panicking.
    let Ok(source) = SnapshotSource::from_json(s) else {
        return;
    };
    let Ok(registry) = CategoryRegistry::builtin() else {
        return;
    };
    let config = InventoryConfig::default();
    if let Ok(tree) = TreeAssembler::new(&registry, &source, &config).assemble("system", true) {
        let _ = serde_json::to_string(&tree);
    }
});
