pub mod content_classifier;
pub mod pool_builder;
pub mod section_assembler;
pub mod slot_selector;
pub mod subpart_parser;
pub mod warn_writer;

pub use content_classifier::{classify, emphasis_spans, ClassifyContext, ContentBlock, LabeledItem};
pub use pool_builder::{build_pools, QuestionPools};
pub use section_assembler::assemble;
pub use slot_selector::{default_substitutes, GroupSelection, SlotSelector};
pub use subpart_parser::{analyze_question, parse_sub_parts, resolve_sub_marks, QuestionStructure};
pub use warn_writer::WarnWriter;
