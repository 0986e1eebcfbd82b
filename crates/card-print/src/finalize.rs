//! Post-write file finalization
//!
//! Once a sheet is on disk its record is assembled from the size and digest
//! of the exact bytes that were persisted.

use crate::compose::SavedFile;
use crate::layout::{LayoutDimensions, LayoutKind};
use crate::types::*;
use chrono::Utc;
use std::path::Path;
use tracing::debug;

/// Everything about a sheet known before it is written
#[derive(Debug, Clone, PartialEq)]
pub struct SheetSummary {
    pub id: String,
    pub card_ids: Vec<String>,
    pub layout: LayoutKind,
    pub format: OutputFormat,
    pub page_count: usize,
    pub page_width_pt: f32,
    pub page_height_pt: f32,
}

impl SheetSummary {
    pub fn new(
        id: String,
        card_ids: Vec<String>,
        layout: LayoutKind,
        format: OutputFormat,
        page_count: usize,
        dims: &LayoutDimensions,
    ) -> Self {
        Self {
            id,
            card_ids,
            layout,
            format,
            page_count,
            page_width_pt: dims.page_width_pt,
            page_height_pt: dims.page_height_pt,
        }
    }
}

/// BLAKE3 digest of a byte slice as 64 lowercase hex characters
pub fn checksum(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Build the immutable record for a sheet that [`save_pdf`] wrote to `path`.
///
/// Size and checksum come from the bytes that were written, not from a later
/// read of `path`, which another writer may have replaced since.
///
/// [`save_pdf`]: crate::compose::save_pdf
pub fn finalize_record(
    path: &Path,
    saved: SavedFile,
    summary: SheetSummary,
) -> Result<PrintFileRecord> {
    let file_path = std::path::absolute(path)?;

    debug!(
        path = %file_path.display(),
        file_size = saved.file_size,
        checksum = %saved.checksum,
        "Finalized print file"
    );

    Ok(PrintFileRecord {
        id: summary.id,
        card_ids: summary.card_ids,
        layout: summary.layout,
        format: summary.format,
        file_path,
        file_size: saved.file_size,
        page_count: summary.page_count,
        page_width_pt: summary.page_width_pt,
        page_height_pt: summary.page_height_pt,
        created_at: Utc::now(),
        checksum: saved.checksum,
    })
}
