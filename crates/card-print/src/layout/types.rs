//! Layout data types for print sheets
//!
//! These types represent the geometry computed by the layout calculator and
//! consumed by the document composer.

/// Position within the grid (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPosition {
    /// Row index (0 = top row)
    pub row: usize,
    /// Column index (0 = leftmost column)
    pub col: usize,
}

impl GridPosition {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A rectangular area in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X position (left edge)
    pub x: f32,
    /// Y position (bottom edge)
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge y coordinate
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Largest rect with the aspect ratio `width : height` that fits inside
    /// this one, centered on both axes
    pub fn fit_centered(&self, width: f32, height: f32) -> Rect {
        if width <= 0.0 || height <= 0.0 {
            return *self;
        }
        let scale = (self.width / width).min(self.height / height);
        let w = width * scale;
        let h = height * scale;
        Rect::new(
            self.x + (self.width - w) / 2.0,
            self.y + (self.height - h) / 2.0,
            w,
            h,
        )
    }

    /// Whether the interiors of two rectangles intersect.
    /// Rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.top()
            && other.y < self.top()
    }
}

/// Physical geometry of one print sheet layout, in points.
///
/// `card_width_pt`/`card_height_pt` describe the box each image is scaled
/// into: the trimmed card inflated by bleed (when requested) and multiplied
/// by the profile's card scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutDimensions {
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub card_width_pt: f32,
    pub card_height_pt: f32,
    pub rows: usize,
    pub cols: usize,
    pub margin_x_pt: f32,
    pub margin_y_pt: f32,
    pub spacing_pt: f32,
    /// Bleed on each edge of the card box (0 when bleed is off)
    pub bleed_pt: f32,
}

impl LayoutDimensions {
    /// The whole page as a rect
    pub fn page_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.page_width_pt, self.page_height_pt)
    }

    /// Number of card slots on one page
    pub fn slots_per_page(&self) -> usize {
        self.rows * self.cols
    }

    /// Width of one grid cell: the interior width shared evenly by columns
    pub fn cell_width_pt(&self) -> f32 {
        let interior = self.page_width_pt
            - 2.0 * self.margin_x_pt
            - (self.cols.saturating_sub(1)) as f32 * self.spacing_pt;
        interior / self.cols as f32
    }

    /// Height of one grid cell
    pub fn cell_height_pt(&self) -> f32 {
        let interior = self.page_height_pt
            - 2.0 * self.margin_y_pt
            - (self.rows.saturating_sub(1)) as f32 * self.spacing_pt;
        interior / self.rows as f32
    }

    /// Grid position of a slot (row-major, row 0 at the top)
    pub fn grid_position(&self, slot_index: usize) -> GridPosition {
        GridPosition::new(slot_index / self.cols, slot_index % self.cols)
    }

    /// Card box of a slot, centered in its cell.
    ///
    /// The returned rect is in PDF space (origin bottom-left).
    pub fn slot_rect(&self, slot_index: usize) -> Rect {
        let pos = self.grid_position(slot_index);
        let cell_w = self.cell_width_pt();
        let cell_h = self.cell_height_pt();

        let x = self.margin_x_pt
            + pos.col as f32 * (cell_w + self.spacing_pt)
            + (cell_w - self.card_width_pt) / 2.0;
        // Measured from the top edge, then flipped into PDF space
        let y_from_top = self.margin_y_pt
            + pos.row as f32 * (cell_h + self.spacing_pt)
            + (cell_h - self.card_height_pt) / 2.0;
        let y = self.page_height_pt - y_from_top - self.card_height_pt;

        Rect::new(x, y, self.card_width_pt, self.card_height_pt)
    }

    /// Card boxes of every slot on a page, in slot order
    pub fn slot_rects(&self) -> Vec<Rect> {
        (0..self.slots_per_page())
            .map(|idx| self.slot_rect(idx))
            .collect()
    }
}
