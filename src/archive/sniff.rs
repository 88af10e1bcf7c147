//! Type sniffing
//!
//! Converter output is classified by a little-endian magic in its last four
//! bytes. Scripts are the exception: they are recognised by extension and
//! carry no trailer.
//!
//! ```text
//! image:  [RGBA pixels ...][width u32][IMAGE_MAGIC u32]
//! model:  [vertices ...][min x/y/z f32][max x/y/z f32][MODEL_MAGIC u32]
//! ```

use crate::archive::format::{
    Entry, EntryKind, Extents, IMAGE_MAGIC, IMAGE_TRAILER_SIZE, MAGIC_PROBE_SIZE, MODEL_MAGIC,
    MODEL_SCHEMA_VERSION, MODEL_TRAILER_SIZE,
};
use crate::config::{ModelTrailerPolicy, PackOptions};
use crate::error::{PackError, Result};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

/// Longest trailer any kind can carry
pub const MAX_TRAILER_SIZE: u64 = MODEL_TRAILER_SIZE;

/// Classify a source from its name, size and trailing bytes.
///
/// `tail` holds the last `min(raw_size, MAX_TRAILER_SIZE)` bytes of the source.
pub fn classify(
    name: &str,
    raw_size: u64,
    tail: &[u8],
    options: &PackOptions,
) -> Result<EntryKind> {
    if options.is_script(name) {
        return Ok(EntryKind::Script);
    }

    if raw_size < MAGIC_PROBE_SIZE || (tail.len() as u64) < MAGIC_PROBE_SIZE {
        return Ok(EntryKind::Generic);
    }

    let magic = le_u32(&tail[tail.len() - 4..]);

    if magic == IMAGE_MAGIC {
        let trailer = trailer(name, raw_size, tail, IMAGE_TRAILER_SIZE)?;
        return Ok(EntryKind::Image {
            width: le_u32(&trailer[0..4]),
        });
    }

    if magic == MODEL_MAGIC && options.model_trailers == ModelTrailerPolicy::Strip {
        let trailer = trailer(name, raw_size, tail, MODEL_TRAILER_SIZE)?;
        let mut floats = [0f32; 6];
        for (i, value) in floats.iter_mut().enumerate() {
            *value = f32::from_le_bytes([
                trailer[i * 4],
                trailer[i * 4 + 1],
                trailer[i * 4 + 2],
                trailer[i * 4 + 3],
            ]);
        }
        if floats.iter().any(|v| !v.is_finite()) {
            return Err(PackError::NonFiniteExtent {
                name: name.to_string(),
            });
        }
        return Ok(EntryKind::Model {
            extents: Extents {
                min: [floats[0], floats[1], floats[2]],
                max: [floats[3], floats[4], floats[5]],
            },
            version: MODEL_SCHEMA_VERSION,
        });
    }

    Ok(EntryKind::Generic)
}

/// Open `path`, classify it and close it again.
///
/// The handle is scoped to this call; payload copying reopens the file.
pub fn sniff_file(name: &str, path: &Path, options: &PackOptions) -> Result<Entry> {
    let mut file = File::open(path).map_err(|e| PackError::file(path, e))?;
    let metadata = file.metadata().map_err(|e| PackError::file(path, e))?;

    if !metadata.is_file() {
        return Err(PackError::file(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
        ));
    }

    let raw_size = metadata.len();
    let tail = read_tail(&mut file, raw_size).map_err(|e| PackError::file(path, e))?;
    let kind = classify(name, raw_size, &tail, options)?;
    let entry = Entry::new(name, kind, raw_size)?;

    debug!(
        name = %entry.name,
        kind = kind.label(),
        raw_size = entry.raw_size,
        effective_size = entry.effective_size,
        "sniffed entry"
    );

    Ok(entry)
}

fn read_tail(file: &mut File, raw_size: u64) -> std::io::Result<Vec<u8>> {
    let len = raw_size.min(MAX_TRAILER_SIZE);
    file.seek(SeekFrom::Start(raw_size - len))?;

    let mut tail = vec![0u8; len as usize];
    file.read_exact(&mut tail)?;
    Ok(tail)
}

/// The `size`-byte trailer at the end of `tail`, minus its magic
fn trailer<'a>(name: &str, raw_size: u64, tail: &'a [u8], size: u64) -> Result<&'a [u8]> {
    if raw_size < size || (tail.len() as u64) < size {
        return Err(PackError::TrailerTooShort {
            name: name.to_string(),
            size: raw_size,
            needed: size,
        });
    }

    let start = tail.len() - size as usize;
    Ok(&tail[start..tail.len() - MAGIC_PROBE_SIZE as usize])
}

fn le_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
