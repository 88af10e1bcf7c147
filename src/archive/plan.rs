use crate::archive::format::Entry;

/// Assign payload offsets by running sum, in input order.
///
/// Returns the total payload length. No reordering and no padding: entry
/// `i + 1` starts exactly where entry `i` ends.
pub fn plan_offsets(entries: &mut [Entry]) -> u64 {
    let mut offset = 0u64;
    for entry in entries.iter_mut() {
        entry.offset = offset;
        offset += entry.effective_size;
    }
    offset
}
