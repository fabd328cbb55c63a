#![no_main]

use fractile_scene::SceneConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    for parsed in [SceneConfig::from_toml_str(text), SceneConfig::from_json_str(text)] {
        let Ok(config) = parsed else {
            continue;
        };
        // Validation never panics, and a clean config stays clean.
        let errors = config.validate();
        if errors.is_empty() {
            assert!(config.validated().is_ok(), "validate/validated disagree");
        }
    }
});
