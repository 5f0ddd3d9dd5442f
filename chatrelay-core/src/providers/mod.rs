//! Provider abstraction, the OpenRouter client and retry handling

pub mod adapter;
pub mod error;
pub mod openrouter;
pub mod retry;

pub use adapter::LlmProvider;
pub use error::{ProviderError, ProviderResult};
pub use openrouter::{OpenRouterProvider, PROVIDER_NAME};
pub use retry::{RetryExecutor, RetryPolicy, RetryResult};
