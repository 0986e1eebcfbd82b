use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::layout::LayoutKind;

#[derive(Error, Debug)]
pub enum PrintError {
    #[error("Unsupported layout: {0}")]
    UnsupportedLayout(String),
    #[error("Invalid layout configuration: {0}")]
    Config(String),
    #[error("output format '{0}' is not implemented; only 'pdf' print sheets are supported")]
    UnsupportedFormat(OutputFormat),
    #[error("No cards to print")]
    NoCards,
    #[error("Failed to decode image {}: {source}", path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, PrintError>;

/// Paper orientation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Portrait: height > width
    #[default]
    Portrait,
    /// Landscape: width > height
    Landscape,
}

/// Reference paper sizes
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaperSize {
    A4,
    Letter,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PaperSize {
    /// Get base dimensions (portrait for the standard sizes)
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    /// Get dimensions with orientation applied
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// Output document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OutputFormat {
    #[default]
    Pdf,
    /// Accepted by the option parser but not rendered yet
    Png,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Png => "png",
        }
    }

    pub fn extension(self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = PrintError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "png" => Ok(OutputFormat::Png),
            other => Err(PrintError::Config(format!("Unknown output format: {}", other))),
        }
    }
}

/// How a card image is scaled into its card box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ImageFit {
    /// Keep the aspect ratio and center the image; the box edges may stay blank
    #[default]
    Fit,
    /// Fill the box exactly, distorting the image if the ratios differ
    Stretch,
}

impl ImageFit {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageFit::Fit => "fit",
            ImageFit::Stretch => "stretch",
        }
    }
}

impl fmt::Display for ImageFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A downloaded card image ready to be placed on a sheet.
///
/// The download subsystem guarantees `file_path` existed when it produced the
/// record; the composer re-checks at placement time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CardPrintInput {
    /// Stable card identifier (Scryfall id)
    pub card_id: String,
    pub name: String,
    pub set_code: String,
    pub collector_number: String,
    pub file_path: PathBuf,
    #[cfg_attr(feature = "serde", serde(default))]
    pub width_px: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub height_px: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub dpi: Option<u32>,
}

impl CardPrintInput {
    pub fn new(
        card_id: impl Into<String>,
        name: impl Into<String>,
        set_code: impl Into<String>,
        collector_number: impl Into<String>,
        file_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            card_id: card_id.into(),
            name: name.into(),
            set_code: set_code.into(),
            collector_number: collector_number.into(),
            file_path: file_path.into(),
            width_px: None,
            height_px: None,
            dpi: None,
        }
    }
}

/// A finished print sheet on disk.
///
/// Records are immutable; regenerating a sheet produces a new record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrintFileRecord {
    /// Content-addressed sheet identifier (16 hex chars)
    pub id: String,
    pub card_ids: Vec<String>,
    pub layout: LayoutKind,
    pub format: OutputFormat,
    /// Absolute path of the output file
    pub file_path: PathBuf,
    pub file_size: u64,
    pub page_count: usize,
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub created_at: DateTime<Utc>,
    /// BLAKE3 digest of the finished file (64 hex chars)
    pub checksum: String,
}

/// Non-fatal conditions met while composing a sheet
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SheetWarning {
    /// Source image was gone at placement time; its slot was left blank
    MissingImage { card_id: String, path: PathBuf },
    /// The image prints below the minimum useful resolution
    LowResolution {
        card_id: String,
        effective_dpi: f32,
        declared_dpi: Option<u32>,
    },
}

impl fmt::Display for SheetWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetWarning::MissingImage { card_id, path } => write!(
                f,
                "image for card {} not found at {}; slot left blank",
                card_id,
                path.display()
            ),
            SheetWarning::LowResolution {
                card_id,
                effective_dpi,
                ..
            } => write!(
                f,
                "image for card {} prints at {:.0} dpi; expect a soft print",
                card_id, effective_dpi
            ),
        }
    }
}

/// How a generation request was satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CacheStatus {
    /// A cached record with an existing file was returned
    Hit,
    /// Nothing was cached; the sheet was generated
    Miss,
    /// A cached record pointed at a deleted file; the sheet was regenerated
    Stale,
}

/// Result of a successful `generate_print_sheet` call
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneratedSheet {
    pub record: PrintFileRecord,
    pub cache: CacheStatus,
    pub warnings: Vec<SheetWarning>,
}

/// Result of a `delete_print_file` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeletedPrintFile {
    pub removed_from_disk: bool,
    pub evicted_entries: usize,
}
