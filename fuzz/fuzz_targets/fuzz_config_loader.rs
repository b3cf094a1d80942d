#![no_main]
use libfuzzer_sys::fuzz_target;

// Arbitrary text must either fail to parse or yield a config whose
// validation returns, never a panic.
fuzz_target!(|data: &str| {
    if let Ok(cfg) = dispenser_config::load_toml(data) {
        let _ = cfg.validate();
    }
});
