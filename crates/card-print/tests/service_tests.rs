use card_print::*;
use lopdf::Document;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn make_cards(dir: &Path, count: usize) -> Vec<CardPrintInput> {
    (0..count)
        .map(|i| {
            let id = format!("card-{:02}", i);
            let path = dir.join(format!("{}.png", id));
            image::RgbImage::from_pixel(40, 56, image::Rgb([20, 20, 160]))
                .save(&path)
                .unwrap();
            CardPrintInput::new(&id, format!("Card {}", i), "tst", i.to_string(), path)
        })
        .collect()
}

fn service(dir: &TempDir) -> PrintService {
    PrintService::new(ServiceConfig::new(dir.path().join("prints")))
}

fn missing_images(warnings: &[SheetWarning]) -> usize {
    warnings
        .iter()
        .filter(|w| matches!(w, SheetWarning::MissingImage { .. }))
        .count()
}

fn bleed() -> PrintSheetOptions {
    PrintSheetOptions {
        include_bleed: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_generate_writes_pdf_and_record() {
    let dir = TempDir::new().unwrap();
    let cards = make_cards(dir.path(), 9);
    let service = service(&dir);

    let sheet = service
        .generate_print_sheet(&cards, &SheetLayout::A4NineUp, &bleed())
        .await
        .unwrap();
    let record = &sheet.record;

    assert_eq!(sheet.cache, CacheStatus::Miss);
    assert_eq!(missing_images(&sheet.warnings), 0);
    assert!(record.file_path.is_absolute());
    let output_dir = std::fs::canonicalize(service.output_dir()).unwrap();
    assert!(record.file_path.starts_with(output_dir));
    assert_eq!(service.cache().active_locks(), 0);
    assert_eq!(record.layout, LayoutKind::A4NineUp);
    assert_eq!(record.format, OutputFormat::Pdf);
    assert_eq!(record.page_count, 1);
    assert_eq!(record.id.len(), 16);
    assert_eq!(record.checksum.len(), 64);

    let bytes = std::fs::read(&record.file_path).unwrap();
    assert_eq!(record.file_size, bytes.len() as u64);
    assert_eq!(record.checksum, checksum(&bytes));
    assert!(bytes.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn test_page_count_rounds_up() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);

    for (count, layout, expected) in [
        (1, SheetLayout::A4NineUp, 1),
        (9, SheetLayout::LetterNineUp, 1),
        (19, SheetLayout::A4NineUp, 3),
        (19, SheetLayout::A4EighteenUp, 2),
    ] {
        let cards = make_cards(dir.path(), count);
        let sheet = service
            .generate_print_sheet(&cards, &layout, &PrintSheetOptions::default())
            .await
            .unwrap();
        assert_eq!(sheet.record.page_count, expected);

        let doc = Document::load(&sheet.record.file_path).unwrap();
        assert_eq!(doc.get_pages().len(), expected);
    }
}

#[tokio::test]
async fn test_second_request_is_cache_hit() {
    let dir = TempDir::new().unwrap();
    let cards = make_cards(dir.path(), 3);
    let service = service(&dir);

    let first = service
        .generate_print_sheet(&cards, &SheetLayout::A4NineUp, &bleed())
        .await
        .unwrap();

    let mut reversed = cards.clone();
    reversed.reverse();
    let second = service
        .generate_print_sheet(&reversed, &SheetLayout::A4NineUp, &bleed())
        .await
        .unwrap();

    assert_eq!(second.cache, CacheStatus::Hit);
    assert_eq!(second.record, first.record);
    assert_eq!(service.cache().len(), 1);
}

#[tokio::test]
async fn test_different_options_miss_the_cache() {
    let dir = TempDir::new().unwrap();
    let cards = make_cards(dir.path(), 1);
    let service = service(&dir);

    let layout = SheetLayout::A4NineUp;
    let plain = PrintSheetOptions::default();
    let with_bleed = bleed();

    let a = service.generate_print_sheet(&cards, &layout, &plain).await.unwrap();
    let b = service
        .generate_print_sheet(&cards, &layout, &with_bleed)
        .await
        .unwrap();

    assert_eq!(a.cache, CacheStatus::Miss);
    assert_eq!(b.cache, CacheStatus::Miss);
}

#[tokio::test]
async fn test_stale_entry_is_regenerated() {
    let dir = TempDir::new().unwrap();
    let cards = make_cards(dir.path(), 2);
    let service = service(&dir);

    let first = service
        .generate_print_sheet(&cards, &SheetLayout::A4NineUp, &bleed())
        .await
        .unwrap();
    std::fs::remove_file(&first.record.file_path).unwrap();

    let second = service
        .generate_print_sheet(&cards, &SheetLayout::A4NineUp, &bleed())
        .await
        .unwrap();

    assert_eq!(second.cache, CacheStatus::Stale);
    assert!(second.record.file_path.exists());
    assert_eq!(second.record.id, first.record.id);
}

#[tokio::test]
async fn test_concurrent_identical_requests_build_once() {
    let dir = TempDir::new().unwrap();
    let cards = make_cards(dir.path(), 4);
    let service = Arc::new(service(&dir));

    let tasks: Vec<_> = (0..2)
        .map(|_| {
            let service = Arc::clone(&service);
            let cards = cards.clone();
            tokio::spawn(async move {
                service
                    .generate_print_sheet(&cards, &SheetLayout::A4NineUp, &bleed())
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut statuses = Vec::new();
    for task in tasks {
        statuses.push(task.await.unwrap().cache);
    }

    assert_eq!(
        statuses.iter().filter(|s| **s == CacheStatus::Miss).count(),
        1
    );
    assert_eq!(
        statuses.iter().filter(|s| **s == CacheStatus::Hit).count(),
        1
    );
}

#[tokio::test]
async fn test_png_format_is_rejected_before_anything_else() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);
    let options = PrintSheetOptions {
        output_format: OutputFormat::Png,
        ..Default::default()
    };

    let err = service
        .generate_print_sheet(&[], &SheetLayout::A4NineUp, &options)
        .await
        .unwrap_err();

    assert!(matches!(err, PrintError::UnsupportedFormat(OutputFormat::Png)));
    assert_eq!(
        err.to_string(),
        "output format 'png' is not implemented; only 'pdf' print sheets are supported"
    );
    assert!(!service.output_dir().exists());
}

#[tokio::test]
async fn test_zero_cards_is_rejected() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);

    let result = service
        .generate_print_sheet(&[], &SheetLayout::A4NineUp, &PrintSheetOptions::default())
        .await;

    assert!(matches!(result, Err(PrintError::NoCards)));
}

#[tokio::test]
async fn test_invalid_override_is_rejected() {
    let dir = TempDir::new().unwrap();
    let cards = make_cards(dir.path(), 1);
    let service = service(&dir);
    let options = PrintSheetOptions {
        margin_size_mm: Some(-1.0),
        ..Default::default()
    };

    let result = service
        .generate_print_sheet(&cards, &SheetLayout::A4NineUp, &options)
        .await;

    assert!(matches!(result, Err(PrintError::Config(_))));
}

#[tokio::test]
async fn test_missing_image_still_produces_sheet() {
    let dir = TempDir::new().unwrap();
    let cards = make_cards(dir.path(), 3);
    std::fs::remove_file(&cards[0].file_path).unwrap();
    let service = service(&dir);

    let sheet = service
        .generate_print_sheet(&cards, &SheetLayout::A4NineUp, &bleed())
        .await
        .unwrap();

    assert_eq!(missing_images(&sheet.warnings), 1);
    assert!(sheet.record.file_path.exists());
    assert_eq!(sheet.record.card_ids.len(), 3);
}

#[tokio::test]
async fn test_file_naming() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);

    let single = vec![CardPrintInput::new(
        "bolt",
        "Lightning Bolt",
        "lea",
        "161",
        make_cards(dir.path(), 1).remove(0).file_path,
    )];
    let sheet = service
        .generate_print_sheet(&single, &SheetLayout::A4NineUp, &PrintSheetOptions::default())
        .await
        .unwrap();
    assert_eq!(
        sheet.record.file_path.file_name().unwrap(),
        "lea_161_Lightning_Bolt.pdf"
    );

    let many = make_cards(dir.path(), 5);
    let sheet = service
        .generate_print_sheet(&many, &SheetLayout::LetterNineUp, &PrintSheetOptions::default())
        .await
        .unwrap();
    let name = sheet
        .record
        .file_path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned();
    assert!(name.starts_with("print_sheet_letter_9up_5cards_"));
    assert!(name.ends_with(".pdf"));
}

#[tokio::test]
async fn test_delete_evicts_cache_entry() {
    let dir = TempDir::new().unwrap();
    let cards = make_cards(dir.path(), 2);
    let service = service(&dir);

    let sheet = service
        .generate_print_sheet(&cards, &SheetLayout::A4NineUp, &bleed())
        .await
        .unwrap();
    let path = sheet.record.file_path.clone();

    let deleted = service.delete_print_file(&path).await.unwrap();
    assert!(deleted.removed_from_disk);
    assert_eq!(deleted.evicted_entries, 1);
    assert!(!path.exists());
    assert!(service.cache().is_empty());

    let again = service.delete_print_file(&path).await.unwrap();
    assert!(!again.removed_from_disk);
    assert_eq!(again.evicted_entries, 0);
}

#[tokio::test]
async fn test_delete_through_dot_dot_path_evicts_entry() {
    let dir = TempDir::new().unwrap();
    let cards = make_cards(dir.path(), 2);
    let service = service(&dir);

    let sheet = service
        .generate_print_sheet(&cards, &SheetLayout::A4NineUp, &bleed())
        .await
        .unwrap();
    let file_name = sheet.record.file_path.file_name().unwrap().to_owned();
    std::fs::create_dir(dir.path().join("elsewhere")).unwrap();
    let roundabout = dir
        .path()
        .join("elsewhere")
        .join("..")
        .join("prints")
        .join(file_name);

    let deleted = service.delete_print_file(&roundabout).await.unwrap();
    assert!(deleted.removed_from_disk);
    assert_eq!(deleted.evicted_entries, 1);
    assert!(service.cache().is_empty());
}

#[tokio::test]
async fn test_copies_fill_consecutive_slots() {
    let dir = TempDir::new().unwrap();
    let cards = make_cards(dir.path(), 2);
    let service = service(&dir);
    let options = PrintSheetOptions {
        copies_per_card: 5,
        ..Default::default()
    };

    let sheet = service
        .generate_print_sheet(&cards, &SheetLayout::A4NineUp, &options)
        .await
        .unwrap();

    assert_eq!(sheet.record.page_count, 2);
    assert_eq!(sheet.record.card_ids.len(), 10);
    let doc = Document::load(&sheet.record.file_path).unwrap();
    let pages: Vec<_> = doc.get_pages().into_values().collect();
    let first = String::from_utf8(doc.get_page_content(pages[0]).unwrap()).unwrap();
    assert_eq!(first.matches("/Im0 Do").count(), 5);
    assert_eq!(first.matches("/Im1 Do").count(), 4);

    let invalid = PrintSheetOptions {
        copies_per_card: 0,
        ..Default::default()
    };
    let result = service
        .generate_print_sheet(&cards, &SheetLayout::A4NineUp, &invalid)
        .await;
    assert!(matches!(result, Err(PrintError::Config(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_writers_of_one_file_leave_a_valid_cache() {
    let dir = TempDir::new().unwrap();
    let cards = make_cards(dir.path(), 1);
    let service = Arc::new(service(&dir));
    let layout = SheetLayout::A4NineUp;
    let variants = [PrintSheetOptions::default(), bleed()];

    for _ in 0..6 {
        let tasks: Vec<_> = variants
            .iter()
            .cloned()
            .map(|options| {
                let service = Arc::clone(&service);
                let cards = cards.clone();
                tokio::spawn(async move {
                    service
                        .generate_print_sheet(&cards, &SheetLayout::A4NineUp, &options)
                        .await
                        .unwrap()
                })
            })
            .collect();
        let mut paths = Vec::new();
        for task in tasks {
            paths.push(task.await.unwrap().record.file_path);
        }
        // Both variants of a single card share one file name
        assert_eq!(paths[0], paths[1]);

        let mut cached = Vec::new();
        for options in &variants {
            let key = fingerprint(&cards, &layout, options);
            if let Some(record) = service.cache().get(&key).await {
                cached.push(record);
            }
        }
        assert_eq!(cached.len(), 1);
        let record = &cached[0];
        let bytes = std::fs::read(&record.file_path).unwrap();
        assert_eq!(record.file_size, bytes.len() as u64);
        assert_eq!(record.checksum, checksum(&bytes));
        Document::load(&record.file_path).unwrap();

        std::fs::remove_file(&record.file_path).unwrap();
    }

    let leftovers = std::fs::read_dir(service.output_dir()).unwrap().count();
    assert_eq!(leftovers, 0);
    assert_eq!(service.cache().active_locks(), 0);
}
