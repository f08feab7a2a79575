//! Shared position conversion helpers.
//!
//! Tree-sitter positions and byte offsets are zero-based. For user-facing
//! messages, we prefer one-based line and column numbers.

/// Converts a Tree-sitter position (0-based) to one-based display coordinates.
#[must_use]
pub(crate) fn point_to_one_based(pos: tree_sitter::Point) -> (u32, u32) {
    // Line/column numbers will realistically never exceed u32::MAX.
    let line = u32::try_from(pos.row.saturating_add(1)).unwrap_or(u32::MAX);
    let column = u32::try_from(pos.column.saturating_add(1)).unwrap_or(u32::MAX);
    (line, column)
}

/// Converts a byte offset in `source` to one-based line and column numbers.
///
/// Columns count bytes. Offsets past the end clamp to the end of the buffer.
#[must_use]
pub fn offset_to_one_based(source: &[u8], offset: usize) -> (u32, u32) {
    let prefix = source.get(..offset).unwrap_or(source);
    let row = prefix.iter().filter(|byte| **byte == b'\n').count();
    let line_start = prefix
        .iter()
        .rposition(|byte| *byte == b'\n')
        .map_or(0, |newline| newline.saturating_add(1));
    point_to_one_based(tree_sitter::Point {
        row,
        column: prefix.len().saturating_sub(line_start),
    })
}
