//! Layout calculation for print sheets
//!
//! This module handles all the geometric calculations for a sheet:
//! - Named layout profiles and their canonical names
//! - Page, card box and grid dimensions
//! - Per-slot card box positions

mod grid;
mod profile;
mod types;

pub use grid::*;
pub use profile::*;
pub use types::*;
