//! Web-search backed collaborators: contact discovery and email convention
//! detection over the OpenAI Responses API.

pub mod client;
pub mod contacts;
pub mod debug;
pub mod error;
pub mod pattern;
pub(crate) mod retry;
pub(crate) mod types;

pub use client::OpenAiClient;
pub use contacts::LlmContactFinder;
pub use debug::{DebugContactFinder, DebugPatternDetector};
pub use error::LlmError;
pub use pattern::LlmEmailPatternDetector;
