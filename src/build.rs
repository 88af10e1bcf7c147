//! Build pipeline
//!
//! `Discover -> Sniff -> Plan -> EmitManifest -> WritePayload -> Close`,
//! strictly in that order. The first error ends the build; the destination
//! is only replaced once every payload has been copied.

use crate::archive::{plan_offsets, sniff_file, ArchiveWriter, Entry, HEADER_SIZE};
use crate::config::PackOptions;
use crate::error::{PackError, Result};
use crate::manifest;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span};

/// Outcome of a successful build
#[derive(Debug, Clone, PartialEq)]
pub struct PackSummary {
    /// Entries in manifest order, offsets assigned
    pub entries: Vec<Entry>,
    pub manifest_len: u64,
    pub payload_len: u64,
    pub archive_len: u64,
}

/// Pack `inputs` into a single archive at `output`
pub fn pack<P, I>(output: P, inputs: I, options: &PackOptions) -> Result<PackSummary>
where
    P: AsRef<Path>,
    I: IntoIterator,
    I::Item: AsRef<Path>,
{
    let output = output.as_ref();

    let sources = {
        let _span = info_span!("discover").entered();
        discover(inputs)?
    };

    let mut entries = {
        let _span = info_span!("sniff").entered();
        sources
            .iter()
            .map(|(name, path)| sniff_file(name, path, options))
            .collect::<Result<Vec<_>>>()?
    };

    let payload_len = {
        let _span = info_span!("plan").entered();
        plan_offsets(&mut entries)
    };

    let manifest = {
        let _span = info_span!("emit_manifest").entered();
        manifest::emit(&entries)?
    };

    let writer = {
        let _span = info_span!("write_payload", output = %output.display()).entered();
        let mut writer = ArchiveWriter::create(output, &manifest)?;
        for (entry, (_, path)) in entries.iter().zip(&sources) {
            let file = File::open(path).map_err(|e| PackError::file(path, e))?;
            writer
                .write_entry(entry, BufReader::new(file))
                .map_err(|e| match e {
                    PackError::Io(source) => PackError::file(path, source),
                    other => other,
                })?;
        }
        writer
    };

    let archive_len = {
        let _span = info_span!("close").entered();
        writer.finalize()?
    };

    let manifest_len = manifest.len() as u64;
    debug_assert_eq!(archive_len, HEADER_SIZE + manifest_len + payload_len);

    info!(
        output = %output.display(),
        entries = entries.len(),
        manifest_len,
        payload_len,
        archive_len,
        "pack written"
    );

    Ok(PackSummary {
        entries,
        manifest_len,
        payload_len,
        archive_len,
    })
}

/// Turn input paths into `(manifest name, path)` pairs, in argument order
fn discover<I>(inputs: I) -> Result<Vec<(String, PathBuf)>>
where
    I: IntoIterator,
    I::Item: AsRef<Path>,
{
    let mut seen = HashSet::new();
    let mut sources = Vec::new();

    for input in inputs {
        let path = input.as_ref();
        let name = path
            .to_str()
            .ok_or_else(|| {
                PackError::InvalidName(format!("{} is not valid UTF-8", path.display()))
            })?
            .to_string();

        manifest::validate_name(&name)?;
        if !seen.insert(name.clone()) {
            return Err(PackError::DuplicateEntry(name));
        }

        debug!(name = %name, "discovered input");
        sources.push((name, path.to_path_buf()));
    }

    if sources.is_empty() {
        return Err(PackError::Usage("no input files given".to_string()));
    }

    Ok(sources)
}
