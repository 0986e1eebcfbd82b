//! Print sheet composition
//!
//! The composer walks the input cards in order and places each one into the
//! next free slot of the current page:
//! 1. Open a blank document sized to the layout's page
//! 2. Place card images slot by slot, starting a new page when one fills
//! 3. Draw cut marks around each placed card when bleed is requested
//! 4. Close the page tree and hand the document off for writing

mod io;
mod source_image;

pub use io::{SavedFile, ensure_output_dir, save_pdf};

use crate::constants::MIN_PRINT_DPI;
use crate::layout::{LayoutDimensions, Rect};
use crate::marks::draw_cut_marks;
use crate::options::PrintSheetOptions;
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use source_image::{LoadedImage, load_card_image};
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Composer lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerState {
    Idle,
    PagePopulating,
    PageFull,
    Finalizing,
    Done,
}

/// A composed, not yet written, print sheet document
#[derive(Debug)]
pub struct ComposedSheet {
    pub document: Document,
    pub page_count: usize,
    /// Cards whose image was placed on a page
    pub placed_cards: usize,
    /// Cut mark groups drawn (one per placed card when bleed is on)
    pub cut_mark_groups: usize,
    pub warnings: Vec<SheetWarning>,
}

/// Content of the page currently being populated
struct PageContent {
    ops: Vec<u8>,
    xobjects: Dictionary,
}

impl Default for PageContent {
    fn default() -> Self {
        Self {
            ops: Vec::new(),
            xobjects: Dictionary::new(),
        }
    }
}

/// Embedded image shared by every slot that uses the same source file
#[derive(Clone)]
struct EmbeddedImage {
    id: ObjectId,
    name: String,
    width: u32,
    height: u32,
}

/// Sequential sheet composer.
///
/// The underlying document is an append-only sink, so cards are placed
/// strictly one after another.
pub struct SheetComposer {
    dims: LayoutDimensions,
    include_bleed: bool,
    image_fit: ImageFit,
    crop_fraction: f32,
    state: ComposerState,
    document: Document,
    pages_id: ObjectId,
    page_refs: Vec<Object>,
    current: PageContent,
    position: usize,
    page_count: usize,
    placed_cards: usize,
    cut_mark_groups: usize,
    images: HashMap<PathBuf, EmbeddedImage>,
    warnings: Vec<SheetWarning>,
}

impl SheetComposer {
    /// Composer for `dims`, taking bleed, image fit and crop from `options`
    pub fn new(dims: LayoutDimensions, options: &PrintSheetOptions) -> Self {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        Self {
            dims,
            include_bleed: options.include_bleed,
            image_fit: options.image_fit,
            crop_fraction: options.crop_fraction,
            state: ComposerState::Idle,
            document,
            pages_id,
            page_refs: Vec::new(),
            current: PageContent::default(),
            position: 0,
            page_count: 0,
            placed_cards: 0,
            cut_mark_groups: 0,
            images: HashMap::new(),
            warnings: Vec::new(),
        }
    }

    pub fn state(&self) -> ComposerState {
        self.state
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    fn transition(&mut self, next: ComposerState) {
        debug!(from = ?self.state, to = ?next, page = self.page_count, "composer state");
        self.state = next;
    }

    /// Open the first blank page
    pub fn begin(&mut self) {
        if self.state != ComposerState::Idle {
            return;
        }
        self.current = PageContent::default();
        self.page_count = 1;
        self.transition(ComposerState::PagePopulating);
    }

    /// Place the next card into the next slot
    pub fn place(&mut self, card: &CardPrintInput) -> Result<()> {
        if self.state == ComposerState::Idle {
            self.begin();
        }

        let slot = self.position % self.dims.slots_per_page();
        if slot == 0 && self.position > 0 {
            self.transition(ComposerState::PageFull);
            self.flush_page()?;
            self.current = PageContent::default();
            self.page_count += 1;
            self.transition(ComposerState::PagePopulating);
        }
        self.position += 1;

        let Some(image) = self.embed_image(card)? else {
            warn!(
                card_id = %card.card_id,
                path = %card.file_path.display(),
                "Card image missing, leaving slot blank"
            );
            self.warnings.push(SheetWarning::MissingImage {
                card_id: card.card_id.clone(),
                path: card.file_path.clone(),
            });
            return Ok(());
        };

        let rect = self.dims.slot_rect(slot);
        self.current
            .xobjects
            .set(image.name.as_bytes(), Object::Reference(image.id));
        let target = self.image_rect(&rect, image.width, image.height);
        draw_image(&mut self.current.ops, &image.name, &target)?;
        self.placed_cards += 1;

        if self.include_bleed {
            draw_cut_marks(&mut self.current.ops, &rect, &self.dims.page_rect())?;
            self.cut_mark_groups += 1;
        }

        Ok(())
    }

    /// Close the last page and build the page tree
    pub fn finish(mut self) -> Result<ComposedSheet> {
        if self.state == ComposerState::Idle {
            self.begin();
        }
        self.transition(ComposerState::Finalizing);
        self.flush_page()?;

        let count = self.page_refs.len() as i64;
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(std::mem::take(&mut self.page_refs))),
            ("Count", Object::Integer(count)),
        ]);
        self.document
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        let catalog_id = self.document.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]));
        self.document.trailer.set("Root", catalog_id);

        self.transition(ComposerState::Done);

        Ok(ComposedSheet {
            document: self.document,
            page_count: self.page_count,
            placed_cards: self.placed_cards,
            cut_mark_groups: self.cut_mark_groups,
            warnings: self.warnings,
        })
    }

    /// Where an image lands inside its card box
    fn image_rect(&self, slot: &Rect, width: u32, height: u32) -> Rect {
        match self.image_fit {
            ImageFit::Fit => slot.fit_centered(width as f32, height as f32),
            ImageFit::Stretch => *slot,
        }
    }

    /// Embed a card's image once per document.
    /// Returns `None` when the source file is gone.
    fn embed_image(&mut self, card: &CardPrintInput) -> Result<Option<EmbeddedImage>> {
        if let Some(image) = self.images.get(&card.file_path) {
            return Ok(Some(image.clone()));
        }

        let Some(loaded) = load_card_image(&card.file_path, self.crop_fraction)? else {
            return Ok(None);
        };
        self.check_resolution(card, &loaded);

        let image = EmbeddedImage {
            id: self.document.add_object(loaded.stream),
            name: format!("Im{}", self.images.len()),
            width: loaded.width,
            height: loaded.height,
        };
        self.images.insert(card.file_path.clone(), image.clone());
        Ok(Some(image))
    }

    /// Record a warning when an image will print below `MIN_PRINT_DPI`
    fn check_resolution(&mut self, card: &CardPrintInput, loaded: &LoadedImage) {
        if let (Some(w), Some(h)) = (card.width_px, card.height_px) {
            if (w, h) != loaded.source_size {
                warn!(
                    card_id = %card.card_id,
                    declared = ?(w, h),
                    decoded = ?loaded.source_size,
                    "Declared image size does not match the file"
                );
            }
        }

        // Every slot has the same size
        let target = self.image_rect(&self.dims.slot_rect(0), loaded.width, loaded.height);
        let effective_dpi = effective_dpi(loaded.width, loaded.height, &target);
        if effective_dpi >= MIN_PRINT_DPI {
            return;
        }

        warn!(
            card_id = %card.card_id,
            effective_dpi,
            declared_dpi = ?card.dpi,
            "Card image resolution is too low for print"
        );
        self.warnings.push(SheetWarning::LowResolution {
            card_id: card.card_id.clone(),
            effective_dpi,
            declared_dpi: card.dpi,
        });
    }

    /// Write the current page into the document
    fn flush_page(&mut self) -> Result<()> {
        let page = std::mem::take(&mut self.current);

        let content_id = self
            .document
            .add_object(Stream::new(Dictionary::new(), page.ops));

        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(page.xobjects));

        // The layout's margins are part of the slot geometry; the page
        // itself has none.
        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(self.pages_id));
        page_dict.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(self.dims.page_width_pt),
                Object::Real(self.dims.page_height_pt),
            ]),
        );
        page_dict.set("Contents", Object::Reference(content_id));
        page_dict.set("Resources", Object::Dictionary(resources));

        let page_id = self.document.add_object(page_dict);
        self.page_refs.push(Object::Reference(page_id));
        Ok(())
    }
}

/// Pixels per inch when `width` x `height` pixels are painted into `rect`.
/// The less dense axis decides.
pub fn effective_dpi(width: u32, height: u32, rect: &Rect) -> f32 {
    let inches_w = rect.width / 72.0;
    let inches_h = rect.height / 72.0;
    if inches_w <= 0.0 || inches_h <= 0.0 {
        return 0.0;
    }
    (width as f32 / inches_w).min(height as f32 / inches_h)
}

/// Paint an image XObject scaled to fill `rect`
fn draw_image<W: Write>(out: &mut W, name: &str, rect: &Rect) -> std::io::Result<()> {
    writeln!(
        out,
        "q {} 0 0 {} {} {} cm /{} Do Q",
        rect.width, rect.height, rect.x, rect.y, name
    )
}

/// Compose a sheet synchronously.
///
/// Cards are placed as given; copies must already be expanded.
///
/// # Errors
/// Returns [`PrintError::NoCards`] for empty input. A missing source image
/// is not an error: its slot stays blank and a warning is recorded.
pub fn compose_sheet(
    cards: &[CardPrintInput],
    dims: &LayoutDimensions,
    options: &PrintSheetOptions,
) -> Result<ComposedSheet> {
    if cards.is_empty() {
        return Err(PrintError::NoCards);
    }

    let mut composer = SheetComposer::new(*dims, options);
    composer.begin();
    for card in cards {
        composer.place(card)?;
    }
    composer.finish()
}

/// Compose a sheet on the blocking thread pool
pub async fn compose(
    cards: &[CardPrintInput],
    dims: &LayoutDimensions,
    options: &PrintSheetOptions,
) -> Result<ComposedSheet> {
    let cards = cards.to_vec();
    let dims = *dims;
    let options = options.clone();

    tokio::task::spawn_blocking(move || compose_sheet(&cards, &dims, &options)).await?
}
