#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(args) = vuload::fuzzing::apply_config_from_json(data) {
        debug_assert!(args.vus.get() > 0);
        for threshold in &args.thresholds {
            debug_assert!(threshold.contains(':'));
        }
    }
});
