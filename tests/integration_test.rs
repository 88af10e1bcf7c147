//! Integration tests for packgen

use packgen::{
    pack, ArchiveReader, EntryKind, Manifest, ModelTrailerPolicy, PackOptions, IMAGE_MAGIC,
    MODEL_MAGIC, PACK_MAGIC,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper: write `data` to `name` inside `dir`
fn source(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    path
}

fn image_bytes(pixels: &[u8], width: u32) -> Vec<u8> {
    let mut data = pixels.to_vec();
    data.extend_from_slice(&width.to_le_bytes());
    data.extend_from_slice(&IMAGE_MAGIC.to_le_bytes());
    data
}

fn model_bytes(vertices: &[u8], extents: [f32; 6]) -> Vec<u8> {
    let mut data = vertices.to_vec();
    for value in extents {
        data.extend_from_slice(&value.to_le_bytes());
    }
    data.extend_from_slice(&MODEL_MAGIC.to_le_bytes());
    data
}

fn manifest_of(archive: &[u8]) -> (usize, Manifest) {
    let len = u32::from_le_bytes(archive[0..4].try_into().unwrap()) as usize;
    let text = std::str::from_utf8(&archive[8..8 + len]).unwrap();
    (len, Manifest::parse(text).unwrap())
}

#[test]
fn test_end_to_end_example() {
    let dir = TempDir::new().unwrap();
    let a = source(dir.path(), "a.bin", &[1u8; 10]);
    let b_content: Vec<u8> = (0u8..20).collect();
    let b = source(dir.path(), "b.py", &b_content);
    let out = dir.path().join("out.pack");

    pack(&out, [&a, &b], &PackOptions::default()).unwrap();
    let archive = std::fs::read(&out).unwrap();

    assert_eq!(&archive[4..8], &PACK_MAGIC.to_le_bytes());
    let (len, manifest) = manifest_of(&archive);

    let names: Vec<&str> = manifest.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec![a.to_str().unwrap(), b.to_str().unwrap()]);
    assert_eq!((manifest.entries[0].offset, manifest.entries[0].size), (0, 10));
    assert_eq!((manifest.entries[1].offset, manifest.entries[1].size), (10, 22));

    let payload = &archive[8 + len..];
    assert_eq!(payload.len(), 32);
    assert_eq!(&payload[..10], &[1u8; 10]);
    assert_eq!(&payload[10..30], &b_content[..]);
    assert_eq!(&payload[30..], &[0x0A, 0xFF]);
}

#[test]
fn test_archive_length_invariant() {
    let dir = TempDir::new().unwrap();
    let inputs = vec![
        source(dir.path(), "init.py", b"import aga\n"),
        source(dir.path(), "wall.raw", &image_bytes(&[0x11; 64], 4)),
        source(dir.path(), "cube.raw", &model_bytes(&[0x22; 96], [0.0; 6])),
        source(dir.path(), "beep.snd", &[0x80; 300]),
        source(dir.path(), "empty.bin", b""),
    ];
    let out = dir.path().join("out.pack");

    let summary = pack(&out, &inputs, &PackOptions::default()).unwrap();
    let archive = std::fs::read(&out).unwrap();
    let (len, manifest) = manifest_of(&archive);

    let total: u64 = summary.entries.iter().map(|e| e.effective_size).sum();
    assert_eq!(archive.len() as u64, 8 + len as u64 + total);
    assert_eq!(summary.archive_len, archive.len() as u64);
    assert_eq!(summary.manifest_len, len as u64);
    assert_eq!(summary.payload_len, total);

    // Offsets start at zero and are contiguous
    let mut expected = 0;
    for entry in &manifest.entries {
        assert_eq!(entry.offset, expected);
        expected += entry.size;
    }
    assert_eq!(expected, total);
}

#[test]
fn test_roundtrip_through_reader() {
    let dir = TempDir::new().unwrap();
    let pixels: Vec<u8> = (0..64).collect();
    let vertices = vec![0x5Au8; 48 * 2];
    let wall = source(dir.path(), "wall.raw", &image_bytes(&pixels, 4));
    let cube = source(
        dir.path(),
        "cube.raw",
        &model_bytes(&vertices, [-1.0, -1.0, -1.0, 1.0, 1.0, 1.0]),
    );
    let script = source(dir.path(), "init.py", b"print('hi')");
    let out = dir.path().join("out.pack");

    pack(&out, [&wall, &cube, &script], &PackOptions::default()).unwrap();

    let mut reader = ArchiveReader::open(&out).unwrap();
    assert_eq!(reader.entry_count(), 3);

    let wall_name = wall.to_str().unwrap();
    assert_eq!(reader.read_entry(wall_name).unwrap(), pixels);
    assert_eq!(reader.entry(wall_name).unwrap().width(), Some(4));

    let cube_name = cube.to_str().unwrap();
    assert_eq!(reader.read_entry(cube_name).unwrap(), vertices);
    let cube_entry = reader.entry(cube_name).unwrap();
    let extents = cube_entry.extents().unwrap();
    assert_eq!(extents.min, [-1.0, -1.0, -1.0]);
    assert_eq!(extents.max, [1.0, 1.0, 1.0]);
    assert_eq!(cube_entry.version(), Some(2));

    let script_name = script.to_str().unwrap();
    assert_eq!(reader.read_entry(script_name).unwrap(), b"print('hi')\n\xFF");
}

#[test]
fn test_image_width_matches_trailer() {
    let dir = TempDir::new().unwrap();
    let img = source(dir.path(), "sky.raw", &image_bytes(&[0u8; 4 * 640], 640));
    let out = dir.path().join("out.pack");

    let summary = pack(&out, [&img], &PackOptions::default()).unwrap();
    assert_eq!(summary.entries[0].kind, EntryKind::Image { width: 640 });
    assert_eq!(summary.entries[0].effective_size, 4 * 640);

    let reader = ArchiveReader::open(&out).unwrap();
    assert_eq!(reader.entries()[0].width(), Some(640));
}

#[test]
fn test_generic_model_policy() {
    let dir = TempDir::new().unwrap();
    let raw = model_bytes(&[0x33; 48], [0.0, 0.0, 0.0, 2.0, 2.0, 2.0]);
    let cube = source(dir.path(), "cube.raw", &raw);
    let out = dir.path().join("out.pack");

    let options = PackOptions::default().with_model_trailers(ModelTrailerPolicy::Generic);
    let summary = pack(&out, [&cube], &options).unwrap();
    assert_eq!(summary.entries[0].kind, EntryKind::Generic);

    let mut reader = ArchiveReader::open(&out).unwrap();
    let name = cube.to_str().unwrap();
    let entry = reader.entry(name).unwrap();
    assert_eq!(entry.size, raw.len() as u64);
    assert!(entry.extents().is_none());
    assert!(entry.version().is_none());
    assert_eq!(reader.read_entry(name).unwrap(), raw);
}

#[test]
fn test_builds_are_reproducible() {
    let dir = TempDir::new().unwrap();
    let inputs = vec![
        source(dir.path(), "a.py", b"x = 1"),
        source(dir.path(), "b.raw", &image_bytes(&[9; 8], 2)),
        source(
            dir.path(),
            "c.raw",
            &model_bytes(&[1; 48], [0.1, 0.2, 0.3, 1.5, 2.5, 3.25]),
        ),
    ];
    let first = dir.path().join("first.pack");
    let second = dir.path().join("second.pack");

    pack(&first, &inputs, &PackOptions::default()).unwrap();
    pack(&second, &inputs, &PackOptions::default()).unwrap();

    assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
}

#[test]
fn test_input_order_is_manifest_order() {
    let dir = TempDir::new().unwrap();
    let inputs = vec![
        source(dir.path(), "z.bin", b"zz"),
        source(dir.path(), "a.bin", b"a"),
        source(dir.path(), "m.py", b"m"),
    ];
    let out = dir.path().join("out.pack");

    pack(&out, &inputs, &PackOptions::default()).unwrap();

    let reader = ArchiveReader::open(&out).unwrap();
    let names: Vec<&str> = reader.entries().iter().map(|e| e.name.as_str()).collect();
    let expected: Vec<&str> = inputs.iter().map(|p| p.to_str().unwrap()).collect();
    assert_eq!(names, expected);
}

#[test]
fn test_script_sentinel_sizes() {
    let dir = TempDir::new().unwrap();
    let script = source(dir.path(), "main.py", b"");
    let out = dir.path().join("out.pack");

    let summary = pack(&out, [&script], &PackOptions::default()).unwrap();
    assert_eq!(summary.entries[0].raw_size, 0);
    assert_eq!(summary.entries[0].effective_size, 2);

    let mut reader = ArchiveReader::open(&out).unwrap();
    assert_eq!(
        reader.read_entry(script.to_str().unwrap()).unwrap(),
        vec![0x0A, 0xFF]
    );
}
