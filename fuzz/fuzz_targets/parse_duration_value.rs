#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let sleep = vuload::fuzzing::parse_sleep_input(input);
        if let Ok(duration) = vuload::fuzzing::parse_duration_arg_input(input) {
            debug_assert!(!duration.is_zero());
            debug_assert_eq!(sleep.ok(), Some(duration));
        }
    }
});
