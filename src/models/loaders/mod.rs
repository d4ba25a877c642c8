pub mod json_loader;
pub mod toml_loader;

pub use json_loader::{filter_by_scope, load_question_bank, parse_question_bank};
pub use toml_loader::{load_template, parse_template};
