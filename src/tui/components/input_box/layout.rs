//! Row layout for the input box.
//!
//! The draft is hard-wrapped by display width (not word-wrapped), so every
//! byte offset maps to exactly one (row, column) and back.

use std::ops::Range;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Border (2) + padding (2) consumed horizontally by the bordered block
pub(super) const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders consumed vertically
pub(super) const VERTICAL_OVERHEAD: u16 = 2;
/// Offset from area edge to first content column (border + padding)
pub(super) const CONTENT_OFFSET_X: u16 = 2;

pub(super) fn inner_width(area_width: u16) -> u16 {
    area_width.saturating_sub(HORIZONTAL_OVERHEAD)
}

/// Byte ranges of each visual row. Never empty: "" is one empty row.
pub(super) fn visual_rows(text: &str, width: u16) -> Vec<Range<usize>> {
    let width = width.max(1) as usize;
    let mut rows = Vec::new();
    let mut line_start = 0;
    for line in text.split('\n') {
        let mut row_start = line_start;
        let mut used = 0;
        for (i, ch) in line.char_indices() {
            let w = ch.width().unwrap_or(0);
            if used + w > width && used > 0 {
                rows.push(row_start..line_start + i);
                row_start = line_start + i;
                used = 0;
            }
            used += w;
        }
        rows.push(row_start..line_start + line.len());
        line_start += line.len() + 1;
    }
    rows
}

/// Row index and display column of byte offset `pos`.
///
/// At a soft wrap the cursor belongs to the start of the next row.
pub(super) fn cursor_position(text: &str, rows: &[Range<usize>], pos: usize) -> (usize, u16) {
    let row = rows.iter().rposition(|r| r.start <= pos).unwrap_or(0);
    let start = rows.get(row).map_or(0, |r| r.start);
    let col = text.get(start..pos).map_or(0, |s| s.width());
    (row, col as u16)
}

/// Byte offset in `row` closest to display column `col` without passing it.
pub(super) fn offset_at_column(text: &str, row: &Range<usize>, col: u16) -> usize {
    let mut used = 0u16;
    for (i, ch) in text[row.clone()].char_indices() {
        let w = ch.width().unwrap_or(0) as u16;
        if used + w > col {
            return row.start + i;
        }
        used += w;
    }
    row.end
}

pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map(|c| pos + c.len_utf8())
        .unwrap_or(text.len())
}
