//! Terminal output building blocks for the live progress display.

pub mod livelog;
pub mod settings;
pub mod text;
