//! Prompt templates for grounded generation
//!
//! The template is deterministic: the same question, segments, and history
//! always produce the same prompt.

use crate::retrieval::RetrievedSegment;

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the numbered context block from retrieved segments. Each block
    /// carries a source attribution marker that mirrors the citations
    /// returned with the answer.
    pub fn build_context(results: &[RetrievedSegment]) -> String {
        let mut context = String::new();
        for (i, result) in results.iter().enumerate() {
            context.push_str(&format!(
                "[{}] {}, segment {}\n\nContent:\n{}\n\n---\n\n",
                i + 1,
                result.filename,
                result.segment.segment_index,
                result.segment.content
            ));
        }
        context
    }

    /// Build the full grounded prompt
    pub fn build_prompt(question: &str, context: &str) -> String {
        format!(
            r#"You are a document-grounded assistant that ONLY uses information from provided documents.

GROUNDING RULES:
1. ONLY use information that is EXPLICITLY stated in the CONTEXT below
2. If the answer is not in the context, respond with "This information is not available in the provided documents."
3. NEVER use external knowledge or make inferences beyond what is stated
4. Reference sources inline using their numbers, e.g. [1]

CONTEXT FROM DOCUMENTS:
{context}

QUESTION: {question}

Provide a grounded answer using ONLY the document content above:"#
        )
    }
}
