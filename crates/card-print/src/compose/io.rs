//! Document output for composed sheets

use crate::finalize::checksum;
use crate::types::*;
use lopdf::Document;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;
use tracing::warn;

static PART_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Size and digest of the bytes written by [`save_pdf`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub file_size: u64,
    pub checksum: String,
}

/// Create the output directory (and parents). An existing directory is fine.
pub async fn ensure_output_dir(dir: impl AsRef<Path>) -> Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    Ok(())
}

/// Serialize the composed document and write it to `path`.
///
/// The bytes go to a uniquely named part file next to `path`, which is synced
/// and then renamed over `path`. Readers of `path` therefore see either the
/// previous file or the complete new one, never a mix of two writers.
pub async fn save_pdf(mut doc: Document, path: impl AsRef<Path>) -> Result<SavedFile> {
    let path = path.as_ref().to_owned();
    let (bytes, digest) = tokio::task::spawn_blocking(move || {
        doc.compress();
        let mut writer = Vec::new();
        doc.save_to(&mut writer)?;
        let digest = checksum(&writer);
        Ok::<_, PrintError>((writer, digest))
    })
    .await??;

    let part = part_path(&path);
    if let Err(e) = write_synced(&part, &bytes).await {
        discard_part(&part).await;
        return Err(e.into());
    }
    if let Err(e) = tokio::fs::rename(&part, &path).await {
        discard_part(&part).await;
        return Err(e.into());
    }

    Ok(SavedFile {
        file_size: bytes.len() as u64,
        checksum: digest,
    })
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await
}

async fn discard_part(part: &Path) {
    if let Err(e) = tokio::fs::remove_file(part).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %part.display(), error = %e, "Failed to remove partial file");
        }
    }
}

/// Hidden sibling of `path`, unique within this process
fn part_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sheet".to_string());
    let seq = PART_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{}.{}-{}.part", name, std::process::id(), seq))
}
