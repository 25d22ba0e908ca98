//! Prompt building and answer composition

pub mod composer;
pub mod prompt;

pub use composer::AnswerComposer;
pub use prompt::PromptBuilder;
