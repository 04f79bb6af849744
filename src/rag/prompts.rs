//! Prompts for grounded question answering

/// Build the grounded answer prompt: instructions, then context, then the question
pub fn build_grounded_prompt(question: &str, context: &str) -> String {
    format!(
        r#"Answer the question based on the context below, and if the question can't be answered based on the context, say "I don't know".
Always use markdown for your response.
The context is hidden to the user, so don't mention sections.

Context:
{context}

Question: {question}"#
    )
}
