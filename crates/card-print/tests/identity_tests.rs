use card_print::*;

fn cards(ids: &[&str]) -> Vec<CardPrintInput> {
    ids.iter()
        .map(|id| CardPrintInput::new(*id, "Card", "tst", "1", format!("/tmp/{}.png", id)))
        .collect()
}

#[test]
fn test_fingerprint_ignores_card_order() {
    let layout = SheetLayout::A4NineUp;
    let options = PrintSheetOptions::default();
    assert_eq!(
        fingerprint(&cards(&["c", "a", "b"]), &layout, &options),
        fingerprint(&cards(&["a", "b", "c"]), &layout, &options)
    );
}

#[test]
fn test_fingerprint_changes_with_each_input() {
    let base_cards = cards(&["a", "b"]);
    let layout = SheetLayout::A4NineUp;
    let options = PrintSheetOptions::default();
    let base = fingerprint(&base_cards, &layout, &options);

    let variants = [
        fingerprint(&cards(&["a", "c"]), &layout, &options),
        fingerprint(&cards(&["a", "b", "b"]), &layout, &options),
        fingerprint(&base_cards, &SheetLayout::LetterNineUp, &options),
        fingerprint(
            &base_cards,
            &layout,
            &PrintSheetOptions {
                include_bleed: true,
                ..Default::default()
            },
        ),
        fingerprint(
            &base_cards,
            &layout,
            &PrintSheetOptions {
                output_format: OutputFormat::Png,
                ..Default::default()
            },
        ),
        fingerprint(
            &base_cards,
            &layout,
            &PrintSheetOptions {
                card_spacing_mm: Some(1.0),
                ..Default::default()
            },
        ),
        fingerprint(
            &base_cards,
            &layout,
            &PrintSheetOptions {
                margin_size_mm: Some(2.0),
                ..Default::default()
            },
        ),
    ];

    for variant in &variants {
        assert_ne!(variant, &base);
    }
}

#[test]
fn test_custom_geometry_is_part_of_fingerprint() {
    let mut profile = SheetLayout::A4NineUp.profile();
    let a = SheetLayout::Custom(profile);
    profile.card_scale = 0.9;
    let b = SheetLayout::Custom(profile);

    let options = PrintSheetOptions::default();
    let ids = cards(&["a"]);
    assert_ne!(fingerprint(&ids, &a, &options), fingerprint(&ids, &b, &options));
}

#[test]
fn test_sheet_id_ignores_card_order() {
    let dims = calculate_layout(&SheetLayout::A4NineUp, &PrintSheetOptions::default()).unwrap();
    let forward = identity::sorted_card_ids(&cards(&["a", "b"]));
    let backward = identity::sorted_card_ids(&cards(&["b", "a"]));
    assert_eq!(forward, backward);
    assert_eq!(sheet_id(&forward, &dims), sheet_id(&backward, &dims));
}
