mod format;
mod plan;
mod reader;
mod sniff;
mod writer;

pub use format::{
    Entry, EntryKind, Extents, PackHeader, HEADER_SIZE, IMAGE_MAGIC, IMAGE_TRAILER_SIZE,
    MODEL_MAGIC, MODEL_SCHEMA_VERSION, MODEL_TRAILER_SIZE, PACK_MAGIC, SCRIPT_SENTINEL,
};
pub use plan::plan_offsets;
pub use reader::ArchiveReader;
pub use sniff::{classify, sniff_file, MAX_TRAILER_SIZE};
pub use writer::ArchiveWriter;
