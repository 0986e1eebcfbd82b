//! Shared constants for print sheet generation
//!
//! This module centralizes the physical card geometry, unit conversion and
//! cut mark dimensions used throughout sheet generation.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4; // ≈ 2.83465

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Convert points to millimeters
#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / POINTS_PER_MM
}

// =============================================================================
// Card Geometry
// =============================================================================

/// Trimmed card width (standard poker-size trading card)
pub const CARD_WIDTH_MM: f32 = 63.0;

/// Trimmed card height
pub const CARD_HEIGHT_MM: f32 = 88.0;

/// Bleed added to each edge of the card when bleed is requested
pub const BLEED_MM: f32 = 3.0;

/// Slack allowed when checking that a card box fits its cell (points)
pub const FIT_TOLERANCE_PT: f32 = 0.001;

// =============================================================================
// Cut Marks
// =============================================================================

/// Line width for cut marks (points)
pub const CUT_MARK_WIDTH: f32 = 0.25;

/// Length of each cut mark leg (points)
pub const CUT_MARK_LENGTH: f32 = 12.0;

/// Gap between a cut mark and the card box edge (points)
pub const CUT_MARK_GAP: f32 = 3.0;

/// Segments drawn per card: two legs at each of four corners
pub const CUT_MARK_SEGMENTS: usize = 8;

/// Legs clipped by the page edge shorter than this are not drawn (points)
pub const CUT_MARK_MIN_LENGTH: f32 = 2.0;

// =============================================================================
// Images
// =============================================================================

/// Effective resolution below which a placed card is reported as low quality
pub const MIN_PRINT_DPI: f32 = 150.0;

/// Largest fraction of each image edge that may be cropped away
pub const MAX_CROP_FRACTION: f32 = 0.25;

// =============================================================================
// Identity
// =============================================================================

/// Length of the truncated sheet identifier (hex characters)
pub const SHEET_ID_LEN: usize = 16;
