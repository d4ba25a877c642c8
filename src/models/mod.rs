pub mod discipline;
pub mod loaders;
pub mod question;
pub mod template;

pub use discipline::Discipline;
pub use loaders::{load_question_bank, load_template};
pub use question::{
    CandidateQuestion, Rubric, RubricBlock, ScenarioData, SelectedQuestion, SelectionResult,
    SlotShortfall,
};
pub use template::{
    AnswerKeyHeader, DisciplineRatio, Instruction, NumberingScheme, PaperHeader, PaperTemplate,
    SectionHeading, SlotGroup, SlotSpec, Subsection, TemplateSection,
};
