//! Output file naming

use crate::layout::SheetLayout;
use crate::types::{CardPrintInput, OutputFormat};
use chrono::{DateTime, Utc};

/// File name for a generated sheet.
///
/// A single card is named after the card itself
/// (`{set}_{collector}_{name}.pdf`); a multi-card sheet gets a timestamped
/// name so repeated generations never collide
/// (`print_sheet_{layout}_{n}cards_{YYYYmmdd_HHMMSS_mmm}.pdf`).
pub fn output_file_name(
    cards: &[CardPrintInput],
    layout: &SheetLayout,
    format: OutputFormat,
    now: DateTime<Utc>,
) -> String {
    match cards {
        [card] => format!(
            "{}_{}_{}.{}",
            sanitize_name(&card.set_code),
            sanitize_name(&card.collector_number),
            sanitize_name(&card.name),
            format.extension()
        ),
        _ => format!(
            "print_sheet_{}_{}cards_{}.{}",
            layout.name(),
            cards.len(),
            now.format("%Y%m%d_%H%M%S_%3f"),
            format.extension()
        ),
    }
}

/// Reduce a string to a file-name-safe token.
///
/// ASCII letters, digits, `-` and `_` are kept; every other run of
/// characters collapses to one `_`. Leading and trailing underscores are
/// trimmed, and an empty result becomes `card`.
pub fn sanitize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            if pending_sep {
                out.push('_');
                pending_sep = false;
            }
            out.push(c);
        } else {
            pending_sep = true;
        }
    }

    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "card".to_string()
    } else {
        trimmed.to_string()
    }
}
