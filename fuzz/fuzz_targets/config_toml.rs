#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(args) = vuload::fuzzing::apply_config_from_toml(input) {
            debug_assert!(args.vus.get() > 0);
            debug_assert!(!args.duration.is_zero());
            if let Some(steps) = args.steps.as_ref() {
                debug_assert!(!steps.is_empty());
                for step in steps {
                    debug_assert!(step.path.as_str().starts_with('/'));
                }
            }
        }
    }
});
