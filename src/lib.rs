//! packgen: asset pack builder
//!
//! Concatenates converted game assets into one resource pack. The pack is a
//! fixed header, a nested-tag text manifest describing every entry, then the
//! entry payloads back to back:
//!
//! ```text
//! [manifest length u32 LE][0x00000A6A u32 LE][manifest text][payload ...]
//! ```
//!
//! Inputs are classified by the trailer their converter appended: images
//! carry their width, models their extents, scripts are recognised by
//! extension and get an end-of-script sentinel. Trailers are stripped from
//! the packed payload and recorded in the manifest instead.
//!
//! # Example
//!
//! ```no_run
//! use packgen::{pack, ArchiveReader, PackOptions};
//!
//! let summary = pack("game.pack", ["init.py", "wall.raw"], &PackOptions::default())?;
//! println!("{} entries, {} bytes", summary.entries.len(), summary.archive_len);
//!
//! let mut reader = ArchiveReader::open("game.pack")?;
//! let script = reader.read_entry("init.py")?;
//! # Ok::<(), packgen::PackError>(())
//! ```

pub mod archive;
pub mod build;
pub mod config;
pub mod error;
pub mod manifest;

pub use archive::{
    ArchiveReader, ArchiveWriter, Entry, EntryKind, Extents, PackHeader, HEADER_SIZE,
    IMAGE_MAGIC, MODEL_MAGIC, MODEL_SCHEMA_VERSION, PACK_MAGIC, SCRIPT_SENTINEL,
};
pub use build::{pack, PackSummary};
pub use config::{ModelTrailerPolicy, PackOptions};
pub use error::{PackError, Result};
pub use manifest::{Manifest, ManifestEntry};
