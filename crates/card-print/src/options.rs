use crate::constants::MAX_CROP_FRACTION;
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-request print sheet options
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PrintSheetOptions {
    /// Inflate each card by the bleed margin and draw cut marks
    pub include_bleed: bool,
    pub output_format: OutputFormat,
    /// Overrides the layout's inter-card spacing (mm)
    pub card_spacing_mm: Option<f32>,
    /// Overrides both of the layout's page margins (mm)
    pub margin_size_mm: Option<f32>,
    /// Each card is placed this many times, in consecutive slots
    pub copies_per_card: usize,
    pub image_fit: ImageFit,
    /// Fraction of each image edge trimmed before placement (scan borders)
    pub crop_fraction: f32,
}

impl Default for PrintSheetOptions {
    fn default() -> Self {
        Self {
            include_bleed: false,
            output_format: OutputFormat::Pdf,
            card_spacing_mm: None,
            margin_size_mm: None,
            copies_per_card: 1,
            image_fit: ImageFit::Fit,
            crop_fraction: 0.0,
        }
    }
}

impl PrintSheetOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| PrintError::Config(format!("Failed to parse options: {}", e)))?;
        Ok(options)
    }

    /// Validate the numeric overrides
    pub fn validate(&self) -> Result<()> {
        let overrides = [
            ("Card spacing", self.card_spacing_mm),
            ("Margin size", self.margin_size_mm),
        ];
        for (label, value) in overrides {
            if let Some(v) = value {
                if !(v.is_finite() && v >= 0.0) {
                    return Err(PrintError::Config(format!(
                        "{} must be a non-negative number of millimeters (got {})",
                        label, v
                    )));
                }
            }
        }

        if self.copies_per_card == 0 {
            return Err(PrintError::Config(
                "Copies per card must be at least 1".to_string(),
            ));
        }

        if !(0.0..=MAX_CROP_FRACTION).contains(&self.crop_fraction) {
            return Err(PrintError::Config(format!(
                "Crop fraction must be between 0 and {} (got {})",
                MAX_CROP_FRACTION, self.crop_fraction
            )));
        }
        Ok(())
    }

    /// The card list with every card repeated `copies_per_card` times
    pub fn expand_copies(&self, cards: &[CardPrintInput]) -> Vec<CardPrintInput> {
        cards
            .iter()
            .flat_map(|card| std::iter::repeat_n(card, self.copies_per_card.max(1)))
            .cloned()
            .collect()
    }

    /// Reject formats the composer cannot produce
    pub fn ensure_supported_format(&self) -> Result<()> {
        match self.output_format {
            OutputFormat::Pdf => Ok(()),
            other => Err(PrintError::UnsupportedFormat(other)),
        }
    }
}
