#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Model XML without the archive layer
    if let Ok(xml) = std::str::from_utf8(data)
        && let Ok(doc) = printsight::parser::parse_model_xml(xml)
    {
        let _ = printsight::analyze(&doc);
    }
});
