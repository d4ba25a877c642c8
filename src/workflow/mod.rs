pub mod answer_key_renderer;
pub mod layout;
pub mod paper_renderer;

pub use answer_key_renderer::AnswerKeyRenderer;
pub use layout::{LayoutEngine, PageLayout};
pub use paper_renderer::{PaperRenderer, RenderOutcome};
