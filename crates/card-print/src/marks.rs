//! Cut mark rendering for card slots
//!
//! Each card box gets four L-shaped corner marks (eight line segments)
//! drawn just outside its edges, written as PDF content stream operators.
//! Legs that would run off the page are shortened to the page edge, and
//! dropped when too little of them is left.

use crate::constants::{
    CUT_MARK_GAP, CUT_MARK_LENGTH, CUT_MARK_MIN_LENGTH, CUT_MARK_SEGMENTS, CUT_MARK_WIDTH,
};
use crate::layout::Rect;
use std::io::{self, Write};

/// A straight line segment in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkSegment {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl MarkSegment {
    fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn length(&self) -> f32 {
        ((self.x2 - self.x1).powi(2) + (self.y2 - self.y1).powi(2)).sqrt()
    }

    /// Clamp an axis-aligned segment to `page`.
    ///
    /// Returns `None` when the segment lies off the page or less than
    /// `CUT_MARK_MIN_LENGTH` of it remains.
    pub fn clip_to(&self, page: &Rect) -> Option<MarkSegment> {
        let within_x = |x: f32| (page.x..=page.right()).contains(&x);
        let within_y = |y: f32| (page.y..=page.top()).contains(&y);
        let clamp_x = |x: f32| x.clamp(page.x, page.right());
        let clamp_y = |y: f32| y.clamp(page.y, page.top());

        let clipped = if self.x1 == self.x2 {
            if !within_x(self.x1) {
                return None;
            }
            MarkSegment::new(self.x1, clamp_y(self.y1), self.x2, clamp_y(self.y2))
        } else {
            if !within_y(self.y1) {
                return None;
            }
            MarkSegment::new(clamp_x(self.x1), self.y1, clamp_x(self.x2), self.y2)
        };

        (clipped.length() >= CUT_MARK_MIN_LENGTH).then_some(clipped)
    }
}

/// Compute the eight segments of a card's cut marks.
///
/// At every corner one leg runs vertically away from the box (above the top
/// edge or below the bottom edge) and one runs horizontally (left of the left
/// edge or right of the right edge), each starting `CUT_MARK_GAP` from the box.
pub fn cut_mark_segments(card: &Rect) -> [MarkSegment; CUT_MARK_SEGMENTS] {
    let left = card.x;
    let right = card.right();
    let bottom = card.y;
    let top = card.top();
    let near = CUT_MARK_GAP;
    let far = CUT_MARK_GAP + CUT_MARK_LENGTH;

    [
        // Top-left
        MarkSegment::new(left, top + near, left, top + far),
        MarkSegment::new(left - near, top, left - far, top),
        // Top-right
        MarkSegment::new(right, top + near, right, top + far),
        MarkSegment::new(right + near, top, right + far, top),
        // Bottom-left
        MarkSegment::new(left, bottom - near, left, bottom - far),
        MarkSegment::new(left - near, bottom, left - far, bottom),
        // Bottom-right
        MarkSegment::new(right, bottom - near, right, bottom - far),
        MarkSegment::new(right + near, bottom, right + far, bottom),
    ]
}

/// The part of a card's cut marks that lands on the page
pub fn visible_cut_marks(card: &Rect, page: &Rect) -> Vec<MarkSegment> {
    cut_mark_segments(card)
        .iter()
        .filter_map(|seg| seg.clip_to(page))
        .collect()
}

/// Draw cut marks around a card box into a content stream.
///
/// Returns the number of segments drawn.
pub fn draw_cut_marks<W: Write>(out: &mut W, card: &Rect, page: &Rect) -> io::Result<usize> {
    let segments = visible_cut_marks(card, page);

    // Save graphics state, black hairline stroke
    writeln!(out, "q")?;
    writeln!(out, "0 0 0 RG")?;
    writeln!(out, "{} w", CUT_MARK_WIDTH)?;
    writeln!(out, "[] 0 d")?;

    for seg in &segments {
        writeln!(out, "{} {} m {} {} l S", seg.x1, seg.y1, seg.x2, seg.y2)?;
    }

    writeln!(out, "Q")?;
    Ok(segments.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_stay_outside_card_box() {
        let card = Rect::new(100.0, 200.0, 180.0, 250.0);
        for seg in cut_mark_segments(&card) {
            let min_x = seg.x1.min(seg.x2);
            let max_x = seg.x1.max(seg.x2);
            let min_y = seg.y1.min(seg.y2);
            let max_y = seg.y1.max(seg.y2);
            let inside = min_x > card.x
                && max_x < card.right()
                && min_y > card.y
                && max_y < card.top();
            assert!(!inside, "segment {:?} intrudes into the card box", seg);
        }
    }

    #[test]
    fn test_every_leg_has_fixed_length() {
        let card = Rect::new(0.0, 0.0, 50.0, 70.0);
        for seg in cut_mark_segments(&card) {
            assert!((seg.length() - CUT_MARK_LENGTH).abs() < 1e-4);
        }
    }

    #[test]
    fn test_legs_near_page_edge_are_shortened_or_dropped() {
        let page = Rect::new(0.0, 0.0, 200.0, 300.0);
        // 10pt from the left edge: the outer horizontal legs keep 7pt,
        // everything else fits
        let card = Rect::new(10.0, 100.0, 50.0, 70.0);
        let visible = visible_cut_marks(&card, &page);
        assert_eq!(visible.len(), CUT_MARK_SEGMENTS);
        assert!(visible.iter().all(|s| s.x1 >= 0.0 && s.x2 >= 0.0));
        let shortened = visible.iter().filter(|s| (s.length() - 7.0).abs() < 1e-4);
        assert_eq!(shortened.count(), 2);

        // 4pt from the edge leaves only 1pt of those legs, under the minimum
        let card = Rect::new(4.0, 100.0, 50.0, 70.0);
        assert_eq!(visible_cut_marks(&card, &page).len(), CUT_MARK_SEGMENTS - 2);
    }

    #[test]
    fn test_draw_emits_eight_strokes() {
        let mut out = Vec::new();
        let page = Rect::new(0.0, 0.0, 500.0, 500.0);
        let card = Rect::new(100.0, 100.0, 100.0, 140.0);
        let drawn = draw_cut_marks(&mut out, &card, &page).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(drawn, CUT_MARK_SEGMENTS);
        assert_eq!(text.matches(" l S").count(), CUT_MARK_SEGMENTS);
        assert!(text.starts_with("q\n"));
        assert!(text.ends_with("Q\n"));
    }
}
