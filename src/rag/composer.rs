//! Answer composition: grounded prompt plus one completion call

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::errors::RagbotError;
use crate::errors::Result;
use crate::llm::ChatMessage;
use crate::llm::CompletionModel;
use crate::llm::GenerationParams;
use crate::rag::prompts::build_grounded_prompt;
use crate::rag::ContextAssembler;
use crate::rag::SearchResult;

/// A composed answer and the context it was grounded on
#[derive(Debug, Clone)]
pub struct ComposedAnswer {
    pub answer: String,
    pub context: String,
    pub metadata: Vec<HashMap<String, String>>,
}

pub struct AnswerComposer {
    model: Arc<dyn CompletionModel>,
    context_assembler: ContextAssembler,
    params: GenerationParams,
}

impl AnswerComposer {
    pub fn new(model: Arc<dyn CompletionModel>, params: GenerationParams) -> Self {
        Self {
            model,
            context_assembler: ContextAssembler::default(),
            params,
        }
    }

    /// Answer `question` using only the retrieved chunks
    pub async fn compose(&self, question: &str, results: &[SearchResult]) -> Result<ComposedAnswer> {
        let (context, metadata) = self.context_assembler.assemble_with_metadata(results);
        let prompt = build_grounded_prompt(question, &context);
        debug!("Prompt is {} chars with {} context entries", prompt.len(), metadata.len());

        let answer = self
            .model
            .complete(&[ChatMessage::user(prompt)], self.params)
            .await?;

        if answer.trim().is_empty() {
            return Err(RagbotError::Completion(
                "model returned an empty answer".to_string(),
            ));
        }

        Ok(ComposedAnswer {
            answer,
            context,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::rag::chunker::Chunk;

    struct RecordingModel {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CompletionModel for RecordingModel {
        async fn complete(&self, messages: &[ChatMessage], _params: GenerationParams) -> Result<String> {
            self.prompts
                .lock()
                .unwrap()
                .push(messages[0].content.clone());
            Ok(self.reply.clone())
        }
    }

    fn result(text: &str) -> SearchResult {
        SearchResult {
            chunk: Chunk {
                text: text.to_string(),
                source: "docs/a.txt".to_string(),
                position: 0,
            },
            score: 1.0,
        }
    }

    #[tokio::test]
    async fn test_prompt_contains_every_chunk_and_question_last() {
        let model = Arc::new(RecordingModel {
            reply: "**42**".to_string(),
            prompts: Mutex::new(Vec::new()),
        });
        let composer = AnswerComposer::new(model.clone(), GenerationParams::default());

        let composed = composer
            .compose("What is the answer?", &[result("first fact"), result("second fact")])
            .await
            .unwrap();

        assert_eq!(composed.answer, "**42**");
        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].contains("first fact"));
        assert!(prompts[0].contains("second fact"));
        assert!(prompts[0].ends_with("Question: What is the answer?"));
    }

    #[tokio::test]
    async fn test_empty_answer_is_completion_error() {
        let model = Arc::new(RecordingModel {
            reply: "  \n".to_string(),
            prompts: Mutex::new(Vec::new()),
        });
        let composer = AnswerComposer::new(model, GenerationParams::default());

        assert!(matches!(
            composer.compose("q", &[result("fact")]).await,
            Err(RagbotError::Completion(_))
        ));
    }
}
