#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(expr) = vuload::threshold::parse_threshold(input) {
            debug_assert!(!expr.metric.is_empty());
            debug_assert_eq!(expr.source, input.trim());
            let reparsed = vuload::threshold::parse_threshold(&expr.source);
            debug_assert_eq!(reparsed.ok(), Some(expr));
        }
    }
});
