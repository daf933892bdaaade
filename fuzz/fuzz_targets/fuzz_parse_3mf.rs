#![no_main]

use libfuzzer_sys::fuzz_target;
use printsight::{Config, RawAsset};

fuzz_target!(|data: &[u8]| {
    // Complete container pipeline: ZIP extraction -> XML parsing -> analysis and scene
    let asset = RawAsset::new("fuzz.3mf", data);
    if let Ok(model) = printsight::load(&asset, &Config::default()) {
        let _ = model.analyze();
        let _ = model.build_scene(&Config::default());
    }
});
