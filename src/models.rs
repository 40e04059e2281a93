//! Core data models used throughout doc-chat.
//!
//! These types represent the documents and conversation turns that flow
//! through the retrieval and answering pipeline.

use serde::{Deserialize, Serialize};

/// A plain-text document loaded from the document directory.
///
/// The filename is the document's identity; the content is a full snapshot
/// taken at read time. Documents are re-read from disk on every request,
/// so a `Document` is never stale for longer than one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub content: String,
}

/// A single turn in a chat conversation.
///
/// `role` is `"user"` or `"assistant"` in caller-supplied history, and
/// `"system"` for the instruction message prepended internally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Result of a document-grounded answer: the generated text plus the names
/// of the documents that were supplied as context. Attribution is structural
/// (which documents were provided), not a claim about which were cited.
#[derive(Debug, Clone, Serialize)]
pub struct QaAnswer {
    pub answer: String,
    pub sources: Vec<String>,
}

/// Metadata for a file written by the upload path.
#[derive(Debug, Clone, Serialize)]
pub struct StoredDocument {
    pub name: String,
    pub size: u64,
}
