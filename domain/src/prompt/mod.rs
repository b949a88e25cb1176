//! Prompt templates for the reasoning call.

/// Builds the system context for canvas command reasoning.
pub struct CanvasPromptTemplate;

impl CanvasPromptTemplate {
    const PREAMBLE: &'static str = "\
You are a canvas assistant. You manipulate a shared 2-D canvas on behalf of \
a user by calling the provided operations.

Rules:
- Only reference object ids that appear in the canvas state below.
- Use query operations (find_shapes, describe_canvas) when you need more \
information before acting; their results will be returned to you.
- When the request is satisfied, respond with a short confirmation and no \
further operation calls.
- Prefer a small number of precise operations over many speculative ones.";

    /// System context: behavior rules plus the rendered canvas digest.
    ///
    /// Rebuilt every iteration from a fresh snapshot so the model never
    /// reasons over stale state.
    pub fn system_context(digest_text: &str) -> String {
        format!(
            "{}\n\nCurrent canvas state:\n{}",
            Self::PREAMBLE, digest_text
        )
    }
}
