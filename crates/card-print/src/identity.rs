//! Sheet identity derivation
//!
//! Two keys are derived from a request:
//! - the *fingerprint*, the cache key covering everything that changes the
//!   rendered output (cards with their copies, layout, format, bleed,
//!   spacing/margin overrides, image fit and crop)
//! - the *sheet id*, a short content hash over the cards and grid shape that
//!   is embedded in the finished record
//!
//! Both sort the card identifiers first so submission order does not matter.

use crate::constants::SHEET_ID_LEN;
use crate::layout::{LayoutDimensions, SheetLayout};
use crate::options::PrintSheetOptions;
use crate::types::CardPrintInput;

/// Card identifiers in lexicographic order (duplicates kept)
pub fn sorted_card_ids(cards: &[CardPrintInput]) -> Vec<String> {
    let mut ids: Vec<String> = cards.iter().map(|c| c.card_id.clone()).collect();
    ids.sort();
    ids
}

/// Cache key for a generation request
pub fn fingerprint(
    cards: &[CardPrintInput],
    layout: &SheetLayout,
    options: &PrintSheetOptions,
) -> String {
    let ids = sorted_card_ids(cards).join(",");
    format!(
        "{}|{}|{}|bleed={}|spacing={}|margin={}|fit={}|crop={}",
        ids,
        layout_key(layout),
        options.output_format,
        options.include_bleed,
        override_key(options.card_spacing_mm),
        override_key(options.margin_size_mm),
        options.image_fit,
        options.crop_fraction,
    )
}

/// Content-addressed identifier of a sheet: BLAKE3 over the sorted ids and
/// the `rows x cols` grid shape, truncated for readability
pub fn sheet_id(sorted_ids: &[String], dims: &LayoutDimensions) -> String {
    let input = format!("{}{}x{}", sorted_ids.join(","), dims.rows, dims.cols);
    let hash = blake3::hash(input.as_bytes()).to_hex();
    hash.as_str()[..SHEET_ID_LEN].to_string()
}

fn layout_key(layout: &SheetLayout) -> String {
    match layout {
        SheetLayout::Custom(p) => {
            let (w, h) = p.paper.dimensions_with_orientation(p.orientation);
            format!(
                "{}[{}x{}mm;{}x{};scale={};margin={},{};spacing={}]",
                layout.name(),
                w,
                h,
                p.rows,
                p.cols,
                p.card_scale,
                p.margin_x_mm,
                p.margin_y_mm,
                p.spacing_mm
            )
        }
        _ => layout.name().to_string(),
    }
}

fn override_key(value: Option<f32>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "default".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::calculate_layout;
    use crate::types::ImageFit;

    fn card(id: &str) -> CardPrintInput {
        CardPrintInput::new(id, "Card", "set", "1", format!("/tmp/{}.png", id))
    }

    #[test]
    fn test_fingerprint_includes_every_render_input() {
        let cards = vec![card("b"), card("a")];
        let options = PrintSheetOptions {
            include_bleed: true,
            card_spacing_mm: Some(1.5),
            ..Default::default()
        };
        let fp = fingerprint(&cards, &SheetLayout::LetterNineUp, &options);
        assert_eq!(
            fp,
            "a,b|letter_9up|pdf|bleed=true|spacing=1.5|margin=default|fit=fit|crop=0"
        );
    }

    #[test]
    fn test_fingerprint_separates_image_handling() {
        let cards = vec![card("a")];
        let fit = PrintSheetOptions::default();
        let stretch = PrintSheetOptions {
            image_fit: ImageFit::Stretch,
            ..Default::default()
        };
        let cropped = PrintSheetOptions {
            crop_fraction: 0.05,
            ..Default::default()
        };
        let layout = SheetLayout::A4NineUp;
        assert_ne!(fingerprint(&cards, &layout, &fit), fingerprint(&cards, &layout, &stretch));
        assert_ne!(fingerprint(&cards, &layout, &fit), fingerprint(&cards, &layout, &cropped));

        let doubled = PrintSheetOptions {
            copies_per_card: 2,
            ..Default::default()
        };
        let copies = doubled.expand_copies(&cards);
        assert_ne!(fingerprint(&cards, &layout, &fit), fingerprint(&copies, &layout, &fit));
    }

    #[test]
    fn test_sheet_id_is_short_hex() {
        let dims = calculate_layout(&SheetLayout::A4NineUp, &PrintSheetOptions::default()).unwrap();
        let id = sheet_id(&["a".to_string(), "b".to_string()], &dims);
        assert_eq!(id.len(), SHEET_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_sheet_id_depends_on_grid_shape() {
        let ids = vec!["a".to_string()];
        let nine = calculate_layout(&SheetLayout::A4NineUp, &PrintSheetOptions::default()).unwrap();
        let eighteen =
            calculate_layout(&SheetLayout::A4EighteenUp, &PrintSheetOptions::default()).unwrap();
        assert_ne!(sheet_id(&ids, &nine), sheet_id(&ids, &eighteen));
    }
}
