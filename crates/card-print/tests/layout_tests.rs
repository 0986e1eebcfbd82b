use card_print::constants::{BLEED_MM, CARD_HEIGHT_MM, CARD_WIDTH_MM, mm_to_pt};
use card_print::layout::*;
use card_print::*;

fn options(include_bleed: bool) -> PrintSheetOptions {
    PrintSheetOptions {
        include_bleed,
        ..Default::default()
    }
}

#[test]
fn test_named_layouts_fit_their_pages() {
    for include_bleed in [false, true] {
        for layout in SheetLayout::NAMED {
            let dims = calculate_layout(&layout, &options(include_bleed)).unwrap();
            let rects = dims.slot_rects();
            assert_eq!(rects.len(), dims.rows * dims.cols);

            for rect in &rects {
                assert!(rect.x >= 0.0, "{} slot left of page", layout.name());
                assert!(rect.y >= 0.0, "{} slot below page", layout.name());
                assert!(rect.right() <= dims.page_width_pt + 0.01);
                assert!(rect.top() <= dims.page_height_pt + 0.01);
            }

            for (i, a) in rects.iter().enumerate() {
                for b in &rects[i + 1..] {
                    assert!(!a.overlaps(b), "{} slots overlap", layout.name());
                }
            }
        }
    }
}

#[test]
fn test_grid_shapes() {
    let nine = calculate_layout(&SheetLayout::A4NineUp, &options(false)).unwrap();
    assert_eq!((nine.rows, nine.cols), (3, 3));

    let letter = calculate_layout(&SheetLayout::LetterNineUp, &options(false)).unwrap();
    assert_eq!(letter.slots_per_page(), 9);

    let eighteen = calculate_layout(&SheetLayout::A4EighteenUp, &options(false)).unwrap();
    assert_eq!(eighteen.slots_per_page(), 18);
    assert!(eighteen.page_width_pt > eighteen.page_height_pt);
}

#[test]
fn test_bleed_inflates_card_box() {
    let plain = calculate_layout(&SheetLayout::A4NineUp, &options(false)).unwrap();
    let bled = calculate_layout(&SheetLayout::A4NineUp, &options(true)).unwrap();

    assert!((plain.card_width_pt - mm_to_pt(CARD_WIDTH_MM)).abs() < 0.01);
    assert!((plain.card_height_pt - mm_to_pt(CARD_HEIGHT_MM)).abs() < 0.01);
    assert!((bled.card_width_pt - mm_to_pt(CARD_WIDTH_MM + 2.0 * BLEED_MM)).abs() < 0.01);
    assert!((bled.card_height_pt - mm_to_pt(CARD_HEIGHT_MM + 2.0 * BLEED_MM)).abs() < 0.01);
    assert_eq!(plain.bleed_pt, 0.0);
    assert!(bled.bleed_pt > 0.0);
}

#[test]
fn test_first_slot_is_top_left() {
    let dims = calculate_layout(&SheetLayout::A4NineUp, &options(false)).unwrap();
    let first = dims.slot_rect(0);
    let last = dims.slot_rect(8);
    assert!(first.x < last.x);
    assert!(first.y > last.y);
    assert_eq!(dims.grid_position(4), GridPosition::new(1, 1));
}

#[test]
fn test_layout_names_resolve() {
    assert_eq!(SheetLayout::from_name(None).unwrap(), SheetLayout::A4NineUp);
    assert_eq!(
        SheetLayout::from_name(Some("letter_9up")).unwrap(),
        SheetLayout::LetterNineUp
    );
    assert_eq!("A4_18UP".parse::<SheetLayout>().unwrap(), SheetLayout::A4EighteenUp);

    match SheetLayout::from_name(Some("a3_4up")) {
        Err(PrintError::UnsupportedLayout(name)) => assert_eq!(name, "a3_4up"),
        other => panic!("Expected UnsupportedLayout, got {:?}", other),
    }
}

#[test]
fn test_custom_layout_that_does_not_fit_is_rejected() {
    let profile = LayoutProfile {
        paper: PaperSize::Custom {
            width_mm: 100.0,
            height_mm: 100.0,
        },
        orientation: Orientation::Portrait,
        rows: 2,
        cols: 2,
        card_scale: 1.0,
        margin_x_mm: 0.0,
        margin_y_mm: 0.0,
        spacing_mm: 0.0,
    };
    let result = calculate_layout(&SheetLayout::Custom(profile), &options(false));
    assert!(matches!(result, Err(PrintError::Config(_))));
}

#[test]
fn test_spacing_override_that_overflows_is_rejected() {
    let opts = PrintSheetOptions {
        card_spacing_mm: Some(40.0),
        ..Default::default()
    };
    let result = calculate_layout(&SheetLayout::A4NineUp, &opts);
    assert!(matches!(result, Err(PrintError::Config(_))));
}
