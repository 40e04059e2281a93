//! # doc-chat
//!
//! A small chat service with two modes: general-purpose conversation and
//! document-grounded question answering over a flat directory of plain-text
//! files. Retrieval is keyword-based — a configurable topic table first,
//! then a free-text fallback — and answers come from an OpenAI-compatible
//! chat completions API.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌────────────┐
//! │ Document │──▶│ Matcher  │──▶│ Composer │──▶│ Completion │
//! │  store   │   │ topics + │   │ context + │   │  provider  │
//! │ (disk)   │   │ keywords │   │  prompt   │   │ (OpenAI)   │
//! └──────────┘   └──────────┘   └──────────┘   └─────┬──────┘
//!                                                    │
//!                               ┌────────────────────┤
//!                               ▼                    ▼
//!                          ┌──────────┐        ┌──────────┐
//!                          │   CLI    │        │   HTTP   │
//!                          │(docchat) │        │  (axum)  │
//!                          └──────────┘        └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`store`] | Flat-directory document store |
//! | [`matcher`] | Topic and keyword relevance matching |
//! | [`completion`] | Completion provider abstraction |
//! | [`answer`] | Prompt assembly for chat and Q&A |
//! | [`server`] | HTTP JSON API |

pub mod answer;
pub mod ask;
pub mod completion;
pub mod config;
pub mod documents;
pub mod matcher;
pub mod models;
pub mod server;
pub mod store;
