#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(rendered) = vuload::fuzzing::render_path_input(input, 7, 3) {
            debug_assert!(!rendered.contains("{{vu}}"));
            debug_assert!(!rendered.contains("{{iter}}"));
        }
    }
});
