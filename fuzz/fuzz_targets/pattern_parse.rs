#![no_main]

use libfuzzer_sys::fuzz_target;
use unshape_eca::{PatternSeed, parse_pattern, pattern_to_string};

fuzz_target!(|data: &str| {
    // parse_pattern should never panic on any input
    if let Ok(cells) = parse_pattern(data) {
        assert_eq!(pattern_to_string(&cells), data);
        let _ = PatternSeed::periodic(cells);
    }
});
