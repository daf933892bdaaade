#![no_main]

use libfuzzer_sys::fuzz_target;
use printsight::{Config, stl};

fuzz_target!(|data: &[u8]| {
    if let Ok(geometry) = stl::decode(data) {
        let _ = printsight::scene::build_from_geometry(&geometry, &Config::default());
    }
});
