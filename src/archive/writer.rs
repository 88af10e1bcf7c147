use crate::archive::format::{Entry, PackHeader, HEADER_SIZE};
use crate::error::{PackError, Result};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Pack writer.
///
/// Everything is written to a temporary file next to the destination, which
/// replaces the destination only in [`ArchiveWriter::finalize`]. Dropping the
/// writer early, or any error on the way, leaves the destination untouched.
pub struct ArchiveWriter {
    writer: BufWriter<NamedTempFile>,
    destination: PathBuf,
    manifest_len: u64,
    payload_written: u64,
}

impl ArchiveWriter {
    /// Start a pack at `path`, writing the header and manifest
    pub fn create<P: AsRef<Path>>(path: P, manifest: &str) -> Result<Self> {
        let destination = path.as_ref().to_path_buf();
        let dir = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let temp = tempfile::Builder::new()
            .prefix(".packgen-")
            .suffix(".tmp")
            .tempfile_in(&dir)
            .map_err(|e| PackError::file(&dir, e))?;
        let mut writer = BufWriter::new(temp);

        let header = PackHeader::new(manifest.len())?;
        header.write_to(&mut writer)?;
        writer.write_all(manifest.as_bytes())?;

        Ok(Self {
            writer,
            destination,
            manifest_len: manifest.len() as u64,
            payload_written: 0,
        })
    }

    /// Copy one entry's payload from `source`.
    ///
    /// Takes exactly `entry.content_size()` bytes, then appends the kind's
    /// sentinel. Entries must arrive in planned order.
    pub fn write_entry<R: Read>(&mut self, entry: &Entry, source: R) -> Result<()> {
        if entry.offset != self.payload_written {
            return Err(PackError::PlanMismatch {
                name: entry.name.clone(),
                planned: entry.offset,
                actual: self.payload_written,
            });
        }

        let expected = entry.content_size();
        let copied = io::copy(&mut source.take(expected), &mut self.writer)?;
        if copied != expected {
            return Err(PackError::SourceTruncated {
                name: entry.name.clone(),
                expected,
                actual: copied,
            });
        }

        let sentinel = entry.kind.sentinel();
        self.writer.write_all(sentinel)?;

        self.payload_written += copied + sentinel.len() as u64;
        debug!(
            name = %entry.name,
            offset = entry.offset,
            size = entry.effective_size,
            "copied payload"
        );

        Ok(())
    }

    /// Bytes written so far, header included
    pub fn bytes_written(&self) -> u64 {
        HEADER_SIZE + self.manifest_len + self.payload_written
    }

    /// Flush, sync and move the pack into place. Returns the pack length.
    pub fn finalize(self) -> Result<u64> {
        let len = self.bytes_written();
        let destination = self.destination;

        let temp = self.writer.into_inner().map_err(|e| e.into_error())?;
        temp.as_file().sync_all()?;
        set_default_permissions(&temp)?;

        temp.persist(&destination)
            .map_err(|e| PackError::file(&destination, e.error))?;

        Ok(len)
    }
}

/// Temporary files are created owner-only; packs are ordinary output files.
#[cfg(unix)]
fn set_default_permissions(temp: &NamedTempFile) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    temp.as_file()
        .set_permissions(std::fs::Permissions::from_mode(0o644))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_default_permissions(_temp: &NamedTempFile) -> Result<()> {
    Ok(())
}
