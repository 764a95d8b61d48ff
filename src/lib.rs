//! # Recap
//!
//! Summarise videos with Gemini and render the result as HTML.
//!
//! ## Features
//!
//! - **Model fallback**: tries an ordered list of Gemini models until one answers
//! - **Two credential kinds**: API key or OAuth token, switching to the key when OAuth is rejected
//! - **Markdown rendering**: converts model output to HTML for display and clipboard export

pub mod agent;
pub mod config;
pub mod export;
pub mod logging;
pub mod markdown;
pub mod summary;

pub use agent::{AgentError, Credential, KeyStore, ServiceConfig, Summarizer};
pub use config::Config;
pub use export::ExportBundle;
pub use summary::{ContentDescriptor, DetailLevel, SummaryResult};
