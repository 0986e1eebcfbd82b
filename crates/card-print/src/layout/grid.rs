//! Grid layout calculation
//!
//! Turns a [`LayoutProfile`] into concrete [`LayoutDimensions`] and checks
//! that every card box fits inside its grid cell.

use crate::constants::{BLEED_MM, CARD_HEIGHT_MM, CARD_WIDTH_MM, FIT_TOLERANCE_PT, mm_to_pt};
use crate::options::PrintSheetOptions;
use crate::types::{PrintError, Result};

use super::{LayoutDimensions, LayoutProfile, SheetLayout};

// =============================================================================
// Layout Calculation
// =============================================================================

/// Calculate the sheet geometry for a layout and request options.
///
/// Spacing/margin overrides from `options` are applied to the layout's
/// profile before the geometry is computed and validated.
pub fn calculate_layout(
    layout: &SheetLayout,
    options: &PrintSheetOptions,
) -> Result<LayoutDimensions> {
    let profile = layout
        .profile()
        .with_overrides(options.card_spacing_mm, options.margin_size_mm);
    profile_dimensions(&profile, options.include_bleed)
}

/// Calculate the geometry of a single profile.
///
/// # Errors
/// Returns [`PrintError::Config`] when the grid is empty, a value is not a
/// finite non-negative number, or a card box does not fit its cell.
pub fn profile_dimensions(
    profile: &LayoutProfile,
    include_bleed: bool,
) -> Result<LayoutDimensions> {
    validate_profile(profile)?;

    let (page_w_mm, page_h_mm) = profile.paper.dimensions_with_orientation(profile.orientation);
    let bleed_mm = if include_bleed { BLEED_MM } else { 0.0 };

    let card_w_mm = (CARD_WIDTH_MM + 2.0 * bleed_mm) * profile.card_scale;
    let card_h_mm = (CARD_HEIGHT_MM + 2.0 * bleed_mm) * profile.card_scale;

    let dims = LayoutDimensions {
        page_width_pt: mm_to_pt(page_w_mm),
        page_height_pt: mm_to_pt(page_h_mm),
        card_width_pt: mm_to_pt(card_w_mm),
        card_height_pt: mm_to_pt(card_h_mm),
        rows: profile.rows,
        cols: profile.cols,
        margin_x_pt: mm_to_pt(profile.margin_x_mm),
        margin_y_pt: mm_to_pt(profile.margin_y_mm),
        spacing_pt: mm_to_pt(profile.spacing_mm),
        bleed_pt: mm_to_pt(bleed_mm * profile.card_scale),
    };

    check_cards_fit(&dims)?;
    Ok(dims)
}

// =============================================================================
// Validation
// =============================================================================

fn validate_profile(profile: &LayoutProfile) -> Result<()> {
    if profile.rows == 0 || profile.cols == 0 {
        return Err(PrintError::Config(format!(
            "Layout grid must have at least one slot (got {} x {})",
            profile.rows, profile.cols
        )));
    }

    if !(profile.card_scale.is_finite() && profile.card_scale > 0.0) {
        return Err(PrintError::Config(format!(
            "Card scale must be positive (got {})",
            profile.card_scale
        )));
    }

    let (page_w, page_h) = profile.paper.dimensions_mm();
    let lengths = [
        ("page width", page_w),
        ("page height", page_h),
        ("horizontal margin", profile.margin_x_mm),
        ("vertical margin", profile.margin_y_mm),
        ("card spacing", profile.spacing_mm),
    ];
    for (label, value) in lengths {
        if !(value.is_finite() && value >= 0.0) {
            return Err(PrintError::Config(format!(
                "{} must be a non-negative number (got {})",
                label, value
            )));
        }
    }

    Ok(())
}

/// Cards must fit their cells on both axes; otherwise neighbouring card
/// boxes would overlap.
fn check_cards_fit(dims: &LayoutDimensions) -> Result<()> {
    let cell_w = dims.cell_width_pt();
    let cell_h = dims.cell_height_pt();

    if cell_w <= 0.0 || cell_h <= 0.0 {
        return Err(PrintError::Config(
            "Margins and spacing leave no room for cards".to_string(),
        ));
    }

    if dims.card_width_pt > cell_w + FIT_TOLERANCE_PT {
        return Err(PrintError::Config(format!(
            "Card width {:.2}pt exceeds cell width {:.2}pt",
            dims.card_width_pt, cell_w
        )));
    }

    if dims.card_height_pt > cell_h + FIT_TOLERANCE_PT {
        return Err(PrintError::Config(format!(
            "Card height {:.2}pt exceeds cell height {:.2}pt",
            dims.card_height_pt, cell_h
        )));
    }

    Ok(())
}
