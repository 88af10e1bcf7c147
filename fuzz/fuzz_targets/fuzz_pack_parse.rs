#![no_main]

use libfuzzer_sys::fuzz_target;
use packgen::ArchiveReader;
use std::io::Write;
use tempfile::NamedTempFile;

fuzz_target!(|data: &[u8]| {
    // Header is 8 bytes minimum
    if data.len() < 8 {
        return;
    }

    let mut temp_file = match NamedTempFile::new() {
        Ok(f) => f,
        Err(_) => return,
    };

    if temp_file.write_all(data).is_err() || temp_file.flush().is_err() {
        return;
    }

    // Opening validates header, manifest and entry bounds - should never panic
    let mut reader = match ArchiveReader::open(temp_file.path()) {
        Ok(r) => r,
        Err(_) => return,
    };

    let names: Vec<String> = reader.entries().iter().map(|e| e.name.clone()).collect();
    for name in &names {
        let _ = reader.read_entry(name);
        let _ = reader.entry(name).map(|e| (e.width(), e.extents(), e.version()));
    }

    let _ = reader.contains("");
    let _ = reader.read_entry("../../../etc/passwd");
});
