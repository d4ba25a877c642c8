pub mod logging;
pub mod numerals;

pub use logging::truncate_text;
pub use numerals::to_roman;
