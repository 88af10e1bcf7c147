use crate::error::{PackError, Result};
use std::io::{Read, Write};

/// Container magic stored in the second header word
pub const PACK_MAGIC: u32 = 0x0000_0A6A;

/// Header size in bytes: manifest length (u32) + magic (u32)
pub const HEADER_SIZE: u64 = 8;

/// Trailing magic written by the image converter
pub const IMAGE_MAGIC: u32 = 0xA6A1_3600;

/// Trailing magic written by the model converter
pub const MODEL_MAGIC: u32 = 0xA6A3_D700;

/// Image trailer: width (u32) then magic (u32)
pub const IMAGE_TRAILER_SIZE: u64 = 8;

/// Model trailer: six f32 extents then magic (u32)
pub const MODEL_TRAILER_SIZE: u64 = 28;

/// Size of the trailing magic probe
pub const MAGIC_PROBE_SIZE: u64 = 4;

/// Appended after every script payload. The newline works around an
/// end-of-buffer parsing defect in the script loader; 0xFF marks end of script.
pub const SCRIPT_SENTINEL: [u8; 2] = [b'\n', 0xFF];

/// Model schema version recorded for sniffed models.
/// Version 2 marks the mesh revision without per-vertex colour.
pub const MODEL_SCHEMA_VERSION: u32 = 2;

/// Axis-aligned bounds recovered from a model trailer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extents {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

/// Type tag plus type-specific metadata for one entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryKind {
    /// Script source; packed with a trailing sentinel
    Script,
    /// RGBA pixels; width recovered from the trailer
    Image { width: u32 },
    /// Flattened vertex buffer; extents recovered from the trailer
    Model { extents: Extents, version: u32 },
    /// Anything else, packed verbatim
    Generic,
}

impl EntryKind {
    /// Bytes stripped from the end of the source
    pub fn trailer_len(&self) -> u64 {
        match self {
            Self::Image { .. } => IMAGE_TRAILER_SIZE,
            Self::Model { .. } => MODEL_TRAILER_SIZE,
            Self::Script | Self::Generic => 0,
        }
    }

    /// Bytes appended after the copied source content
    pub fn sentinel(&self) -> &'static [u8] {
        match self {
            Self::Script => &SCRIPT_SENTINEL,
            Self::Image { .. } | Self::Model { .. } | Self::Generic => &[],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Image { .. } => "image",
            Self::Model { .. } => "model",
            Self::Generic => "generic",
        }
    }
}

/// One packaged asset
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Source path as given; the manifest key
    pub name: String,
    pub kind: EntryKind,
    /// Source size before trailer stripping
    pub raw_size: u64,
    /// Bytes written into the payload section
    pub effective_size: u64,
    /// Position within the payload section, assigned by the planner
    pub offset: u64,
}

impl Entry {
    /// Build an entry from a classification, deriving the effective size.
    ///
    /// Fails with [`PackError::TrailerTooShort`] when `raw_size` cannot hold
    /// the kind's trailer.
    pub fn new(name: impl Into<String>, kind: EntryKind, raw_size: u64) -> Result<Self> {
        let name = name.into();
        let trailer_len = kind.trailer_len();
        let content_size = raw_size
            .checked_sub(trailer_len)
            .ok_or_else(|| PackError::TrailerTooShort {
                name: name.clone(),
                size: raw_size,
                needed: trailer_len,
            })?;

        Ok(Self {
            name,
            kind,
            raw_size,
            effective_size: content_size + kind.sentinel().len() as u64,
            offset: 0,
        })
    }

    /// Bytes copied from the source, excluding any sentinel
    pub fn content_size(&self) -> u64 {
        self.effective_size - self.kind.sentinel().len() as u64
    }
}

/// Fixed header at the start of every pack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackHeader {
    pub manifest_len: u32,
}

impl PackHeader {
    pub fn new(manifest_len: usize) -> Result<Self> {
        let manifest_len =
            u32::try_from(manifest_len).map_err(|_| PackError::ManifestTooLarge(manifest_len))?;
        Ok(Self { manifest_len })
    }

    /// Write header to a writer
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.manifest_len.to_le_bytes())?;
        writer.write_all(&PACK_MAGIC.to_le_bytes())?;
        Ok(())
    }

    /// Read header from a reader
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let manifest_len = read_u32(&mut reader)?;
        let magic = read_u32(&mut reader)?;

        if magic != PACK_MAGIC {
            return Err(PackError::InvalidMagic {
                expected: PACK_MAGIC,
                found: magic,
            });
        }

        Ok(Self { manifest_len })
    }

    /// Offset of the payload section from the start of the file
    pub fn payload_offset(&self) -> u64 {
        HEADER_SIZE + self.manifest_len as u64
    }
}

pub(crate) fn read_u32<R: Read>(mut reader: R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}
