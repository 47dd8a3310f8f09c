#![no_main]

use fingwit_cli::config::FingwitConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        // Parsing arbitrary text must never panic
        if let Ok(config) = serde_json::from_str::<FingwitConfig>(text) {
            // Accepted configs must survive a round-trip
            let reserialized = serde_json::to_string(&config).unwrap();
            let reparsed: FingwitConfig = serde_json::from_str(&reserialized).unwrap();
            assert_eq!(reparsed, config);
        }
    }
});
