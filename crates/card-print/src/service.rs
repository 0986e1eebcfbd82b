//! Print sheet service
//!
//! Entry point tying the pieces together. A generation request runs:
//! 1. Validate the output format and options, reject empty input
//! 2. Expand copies and resolve the layout into concrete dimensions
//! 3. Consult the cache under the request's fingerprint lock
//! 4. On a miss, compose the document, then write it and record the result
//!    under the output path's lock

use crate::cache::{CacheLookup, PrintCache};
use crate::compose::{compose, ensure_output_dir, save_pdf};
use crate::config::ServiceConfig;
use crate::finalize::{SheetSummary, finalize_record};
use crate::identity::{fingerprint, sheet_id, sorted_card_ids};
use crate::layout::{SheetLayout, calculate_layout};
use crate::naming::output_file_name;
use crate::options::PrintSheetOptions;
use crate::types::*;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Generates print sheets into a single output directory and remembers
/// what it has produced for the lifetime of the service.
pub struct PrintService {
    output_dir: PathBuf,
    cache: PrintCache,
}

impl PrintService {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            output_dir: config.output_dir,
            cache: PrintCache::new(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn cache(&self) -> &PrintCache {
        &self.cache
    }

    /// Generate (or reuse) a print sheet for `cards`.
    ///
    /// # Errors
    /// - [`PrintError::UnsupportedFormat`] for any format other than PDF,
    ///   checked before anything else
    /// - [`PrintError::NoCards`] for empty input
    /// - [`PrintError::Config`] when the options or a custom layout are invalid
    pub async fn generate_print_sheet(
        &self,
        cards: &[CardPrintInput],
        layout: &SheetLayout,
        options: &PrintSheetOptions,
    ) -> Result<GeneratedSheet> {
        options.ensure_supported_format()?;
        options.validate()?;
        if cards.is_empty() {
            return Err(PrintError::NoCards);
        }

        let cards = options.expand_copies(cards);
        let cards = cards.as_slice();
        let dims = calculate_layout(layout, options)?;
        let key = fingerprint(cards, layout, options);

        let _build = self.cache.lock_fingerprint(&key).await;

        let status = match self.cache.lookup(&key).await {
            CacheLookup::Hit(record) => {
                info!(
                    id = %record.id,
                    path = %record.file_path.display(),
                    "Reusing cached print sheet"
                );
                return Ok(GeneratedSheet {
                    record,
                    cache: CacheStatus::Hit,
                    warnings: Vec::new(),
                });
            }
            CacheLookup::Stale(_) => CacheStatus::Stale,
            CacheLookup::Miss => CacheStatus::Miss,
        };

        ensure_output_dir(&self.output_dir).await?;
        let output_dir = tokio::fs::canonicalize(&self.output_dir).await?;

        let composed = compose(cards, &dims, options).await?;
        debug!(
            pages = composed.page_count,
            placed = composed.placed_cards,
            cut_marks = composed.cut_mark_groups,
            "Composed print sheet"
        );

        let file_name = output_file_name(cards, layout, options.output_format, Utc::now());
        let path = output_dir.join(file_name);

        let ids = sorted_card_ids(cards);
        let summary = SheetSummary::new(
            sheet_id(&ids, &dims),
            ids,
            layout.kind(),
            options.output_format,
            composed.page_count,
            &dims,
        );

        let record = {
            let _publish = self.cache.lock_output_path(&path).await;
            let saved = save_pdf(composed.document, &path).await?;
            let record = finalize_record(&path, saved, summary)?;
            self.cache.put(key, record.clone());
            record
        };

        info!(
            id = %record.id,
            path = %record.file_path.display(),
            cards = cards.len(),
            pages = record.page_count,
            layout = %record.layout,
            warnings = composed.warnings.len(),
            "Generated print sheet"
        );

        Ok(GeneratedSheet {
            record,
            cache: status,
            warnings: composed.warnings,
        })
    }

    /// Delete a generated file and forget every cache entry pointing at it.
    ///
    /// A file that is already gone is not an error.
    pub async fn delete_print_file(&self, path: impl AsRef<Path>) -> Result<DeletedPrintFile> {
        let path = resolve_record_path(path.as_ref()).await?;
        let _publish = self.cache.lock_output_path(&path).await;

        let removed_from_disk = match tokio::fs::remove_file(&path).await {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => return Err(e.into()),
        };
        let evicted_entries = self.cache.evict_path(&path);

        info!(
            path = %path.display(),
            removed_from_disk,
            evicted_entries,
            "Deleted print file"
        );

        Ok(DeletedPrintFile {
            removed_from_disk,
            evicted_entries,
        })
    }
}

/// Spell `path` the way records do: the parent directory canonicalized, so
/// `..` and symlinked spellings of an output file match its record
async fn resolve_record_path(path: &Path) -> Result<PathBuf> {
    let path = std::path::absolute(path)?;
    let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
        return Ok(path);
    };
    match tokio::fs::canonicalize(parent).await {
        Ok(dir) => Ok(dir.join(name)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(path),
        Err(e) => Err(e.into()),
    }
}

impl Default for PrintService {
    fn default() -> Self {
        Self::new(ServiceConfig::default())
    }
}
