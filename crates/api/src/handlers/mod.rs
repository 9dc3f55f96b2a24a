pub mod artifacts;
pub mod spreadsheets;
