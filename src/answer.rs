//! Prompt assembly for the two chat modes.
//!
//! Document Q&A builds a bounded context from matched documents and asks the
//! model to answer strictly from it at low temperature. General chat prepends
//! a fixed instruction and the caller-supplied history at a higher
//! temperature. Both paths are stateless: each call is independent and the
//! server holds no conversation memory.

use crate::completion::{CompletionError, CompletionProvider};
use crate::config::CompletionConfig;
use crate::models::{ChatMessage, Document, QaAnswer};
use crate::store::excerpt;

const GENERAL_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant. Provide clear and concise answers.";

const QA_SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions based only on \
    the provided documents. Be accurate and cite sources when possible.";

/// The phrase the model is instructed to emit verbatim when the context does
/// not contain the answer.
pub const NOT_IN_DOCUMENTS: &str =
    "I couldn't find that information in the provided documents.";

/// Answer a question from the supplied documents.
///
/// Callers must not pass an empty document list — the no-match short-circuit
/// lives at the request boundary, not here. `sources` in the result is the
/// list of supplied document names, regardless of which the model used.
pub async fn answer_question(
    provider: &dyn CompletionProvider,
    config: &CompletionConfig,
    question: &str,
    documents: &[Document],
) -> Result<QaAnswer, CompletionError> {
    let context = build_context(documents, config.context_chars_per_doc);
    let prompt = build_qa_prompt(&context, question);

    let messages = vec![ChatMessage::system(QA_SYSTEM_PROMPT), ChatMessage::user(prompt)];

    let answer = provider
        .complete(&messages, config.qa_temperature, config.qa_max_tokens)
        .await?;

    Ok(QaAnswer {
        answer,
        sources: documents.iter().map(|d| d.name.clone()).collect(),
    })
}

/// General-purpose chat with optional caller-supplied history.
pub async fn general_chat(
    provider: &dyn CompletionProvider,
    config: &CompletionConfig,
    message: &str,
    history: &[ChatMessage],
) -> Result<String, CompletionError> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(GENERAL_SYSTEM_PROMPT));
    messages.extend(history.iter().cloned());
    messages.push(ChatMessage::user(message));

    provider
        .complete(&messages, config.chat_temperature, config.chat_max_tokens)
        .await
}

/// Concatenate labeled excerpts, one per document, capped at
/// `max_chars_per_doc` characters each and joined by blank lines.
fn build_context(documents: &[Document], max_chars_per_doc: usize) -> String {
    documents
        .iter()
        .map(|doc| format!("From {}:\n{}", doc.name, excerpt(&doc.content, max_chars_per_doc)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn build_qa_prompt(context: &str, question: &str) -> String {
    format!(
        "Based on the following documents, answer the question. If the answer is not found \
         in the documents, say \"{NOT_IN_DOCUMENTS}\"\n\n\
         Documents:\n{context}\n\nQuestion: {question}\n\nAnswer:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Captures the last request so tests can assert on prompt assembly.
    struct RecordingProvider {
        reply: String,
        last_call: Mutex<Option<(Vec<ChatMessage>, f32, u32)>>,
    }

    impl RecordingProvider {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                last_call: Mutex::new(None),
            }
        }

        fn last(&self) -> (Vec<ChatMessage>, f32, u32) {
            self.last_call.lock().unwrap().clone().unwrap()
        }
    }

    #[async_trait]
    impl CompletionProvider for RecordingProvider {
        fn model_name(&self) -> &str {
            "recording"
        }

        async fn complete(
            &self,
            messages: &[ChatMessage],
            temperature: f32,
            max_tokens: u32,
        ) -> Result<String, CompletionError> {
            *self.last_call.lock().unwrap() =
                Some((messages.to_vec(), temperature, max_tokens));
            Ok(self.reply.clone())
        }
    }

    /// Fails every call with a fixed error; used to verify propagation.
    struct FailingProvider(fn() -> CompletionError);

    #[async_trait]
    impl CompletionProvider for FailingProvider {
        fn model_name(&self) -> &str {
            "failing"
        }

        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<String, CompletionError> {
            Err((self.0)())
        }
    }

    fn doc(name: &str, content: &str) -> Document {
        Document {
            name: name.to_string(),
            content: content.to_string(),
        }
    }

    fn config() -> CompletionConfig {
        CompletionConfig::default()
    }

    #[tokio::test]
    async fn test_answer_prompt_labels_each_document() {
        let provider = RecordingProvider::new("Lions are mammals.");
        let docs = vec![
            doc("animals.txt", "Lions are mammals."),
            doc("india.txt", "India is a country."),
        ];

        let result = answer_question(&provider, &config(), "What are mammals?", &docs)
            .await
            .unwrap();

        assert_eq!(result.sources, vec!["animals.txt", "india.txt"]);

        let (messages, temperature, max_tokens) = provider.last();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        let prompt = &messages[1].content;
        assert!(prompt.contains("From animals.txt:\nLions are mammals."));
        assert!(prompt.contains("From india.txt:\nIndia is a country."));
        assert!(prompt.contains("Question: What are mammals?"));
        assert!(prompt.contains(NOT_IN_DOCUMENTS));
        assert!(prompt.ends_with("Answer:"));
        assert!((temperature - 0.2).abs() < 1e-6);
        assert_eq!(max_tokens, 800);
    }

    #[tokio::test]
    async fn test_answer_context_is_truncated_per_document() {
        let provider = RecordingProvider::new("ok");
        let long = "x".repeat(4000);
        let docs = vec![doc("big.txt", &long)];

        let mut cfg = config();
        cfg.context_chars_per_doc = 1500;
        answer_question(&provider, &cfg, "anything", &docs)
            .await
            .unwrap();

        let (messages, _, _) = provider.last();
        let prompt = &messages[1].content;
        assert!(prompt.contains(&"x".repeat(1500)));
        assert!(!prompt.contains(&"x".repeat(1501)));
    }

    #[tokio::test]
    async fn test_sources_are_structural_not_semantic() {
        // Sources list every supplied document even when the model's reply
        // plainly ignores some of them.
        let provider = RecordingProvider::new("Only the first document was useful.");
        let docs = vec![doc("a.txt", "alpha"), doc("b.txt", "beta")];

        let result = answer_question(&provider, &config(), "alpha?", &docs)
            .await
            .unwrap();
        assert_eq!(result.sources, vec!["a.txt", "b.txt"]);
    }

    #[tokio::test]
    async fn test_general_chat_orders_history() {
        let provider = RecordingProvider::new("hello again");
        let history = vec![
            ChatMessage::user("hi"),
            ChatMessage {
                role: "assistant".to_string(),
                content: "hello".to_string(),
            },
        ];

        let reply = general_chat(&provider, &config(), "how are you?", &history)
            .await
            .unwrap();
        assert_eq!(reply, "hello again");

        let (messages, temperature, max_tokens) = provider.last();
        let roles: Vec<&str> = messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert_eq!(messages[3].content, "how are you?");
        assert!((temperature - 0.7).abs() < 1e-6);
        assert_eq!(max_tokens, 1000);
    }

    #[tokio::test]
    async fn test_quota_error_propagates_with_stable_message() {
        let provider = FailingProvider(|| CompletionError::QuotaExceeded);
        let docs = vec![doc("a.txt", "alpha")];

        let err = answer_question(&provider, &config(), "alpha?", &docs)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "OpenAI API quota exceeded. Please check your plan and billing details."
        );
    }

    #[tokio::test]
    async fn test_auth_error_propagates_from_chat() {
        let provider = FailingProvider(|| CompletionError::InvalidApiKey);
        let err = general_chat(&provider, &config(), "hi", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::InvalidApiKey));
    }
}
