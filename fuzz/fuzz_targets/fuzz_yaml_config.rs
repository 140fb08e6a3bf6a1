#![no_main]

use libfuzzer_sys::fuzz_target;
use lshw_bootstrap::AppConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Rejection is fine; panics are not.
        let _ = AppConfig::from_yaml_str(s);
    }
});
