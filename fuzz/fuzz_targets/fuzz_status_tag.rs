#![no_main]

use fingwit_core::MatchSignal;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(tag) = std::str::from_utf8(data) {
        // Tag mapping must be total and stable
        let first = MatchSignal::from_tag(tag);
        let second = MatchSignal::from_tag(tag);
        assert_eq!(first, second);

        // Unknown tags must be preserved verbatim
        if let MatchSignal::Other(kept) = &first {
            assert_eq!(kept, tag);
        }
    }
});
