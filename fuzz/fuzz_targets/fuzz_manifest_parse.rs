#![no_main]

use libfuzzer_sys::fuzz_target;
use packgen::Manifest;

fuzz_target!(|data: &[u8]| {
    let text = match std::str::from_utf8(data) {
        Ok(t) => t,
        Err(_) => return,
    };

    if let Ok(manifest) = Manifest::parse(text) {
        for entry in &manifest.entries {
            let _ = (entry.width(), entry.extents(), entry.version());
        }
    }
});
