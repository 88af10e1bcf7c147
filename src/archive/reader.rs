use crate::archive::format::PackHeader;
use crate::error::{PackError, Result};
use crate::manifest::{Manifest, ManifestEntry};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Pack reader with name lookup
pub struct ArchiveReader {
    file: File,
    header: PackHeader,
    manifest: Manifest,
    index: HashMap<String, usize>,
    payload_len: u64,
}

impl ArchiveReader {
    /// Open a pack, parse its manifest and bounds-check every entry
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| PackError::file(path, e))?;
        let file_len = file.metadata()?.len();

        let header = PackHeader::read_from(&mut file)?;
        if header.payload_offset() > file_len {
            return Err(PackError::InvalidManifest(format!(
                "manifest length {} runs past end of pack ({} bytes)",
                header.manifest_len, file_len
            )));
        }

        let mut text = vec![0u8; header.manifest_len as usize];
        file.read_exact(&mut text)?;
        let text = String::from_utf8(text)
            .map_err(|e| PackError::InvalidManifest(format!("manifest is not UTF-8: {}", e)))?;
        let manifest = Manifest::parse(&text)?;

        let payload_len = file_len - header.payload_offset();
        let mut index = HashMap::with_capacity(manifest.entries.len());
        for (i, entry) in manifest.entries.iter().enumerate() {
            let end = entry.offset.checked_add(entry.size);
            if end.map_or(true, |end| end > payload_len) {
                return Err(PackError::EntryOutOfBounds {
                    name: entry.name.clone(),
                    offset: entry.offset,
                    size: entry.size,
                    payload_len,
                });
            }
            index.insert(entry.name.clone(), i);
        }

        Ok(Self {
            file,
            header,
            manifest,
            index,
            payload_len,
        })
    }

    pub fn header(&self) -> &PackHeader {
        &self.header
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Length of the payload section
    pub fn payload_len(&self) -> u64 {
        self.payload_len
    }

    pub fn entry_count(&self) -> usize {
        self.manifest.entries.len()
    }

    /// Entries in manifest order
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.manifest.entries
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn entry(&self, name: &str) -> Option<&ManifestEntry> {
        self.index.get(name).map(|&i| &self.manifest.entries[i])
    }

    /// Read an entry's payload bytes
    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        let entry = self
            .entry(name)
            .ok_or_else(|| PackError::EntryNotFound(name.to_string()))?;
        let (offset, size) = (entry.offset, entry.size);

        self.file
            .seek(SeekFrom::Start(self.header.payload_offset() + offset))?;
        let mut data = vec![0u8; size as usize];
        self.file.read_exact(&mut data)?;
        Ok(data)
    }
}
