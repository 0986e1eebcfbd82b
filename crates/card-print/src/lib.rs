pub mod cache;
pub mod compose;
mod config;
pub mod constants;
pub mod finalize;
pub mod identity;
pub mod layout;
pub mod marks;
mod naming;
mod options;
mod service;
mod types;

pub use cache::{CacheLookup, PrintCache};
pub use compose::{
    ComposedSheet, ComposerState, SavedFile, SheetComposer, compose, compose_sheet, effective_dpi,
};
pub use config::*;
pub use finalize::{SheetSummary, checksum, finalize_record};
pub use identity::{fingerprint, sheet_id};
pub use layout::{LayoutDimensions, LayoutKind, LayoutProfile, SheetLayout, calculate_layout};
pub use marks::{MarkSegment, cut_mark_segments, draw_cut_marks, visible_cut_marks};
pub use naming::{output_file_name, sanitize_name};
pub use options::*;
pub use service::PrintService;
pub use types::*;
