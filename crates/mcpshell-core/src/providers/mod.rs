//! Model providers
//!
//! `GenaiProvider` talks to Gemini through the `genai` crate, which handles
//! streaming and the wire protocol. API keys are handed in explicitly rather
//! than read by genai from the environment. `MockProvider` replays scripted
//! responses for tests.

mod traits;
mod error;
mod genai_adapter;
mod genai_provider;
mod mock;

pub use traits::{Provider, StreamChatOptions, StreamResponse};
pub use error::{ProviderError, ProviderResult};
pub use genai_provider::GenaiProvider;
pub use genai_adapter::{gemini_endpoint, GEMINI_DEFAULT_ENDPOINT};
pub use mock::{MockMode, MockProvider, MockTurn, RecordedRequest};
