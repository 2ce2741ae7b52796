//! HTTP adapters for the external collaborators.
//!
//! Each module provides a struct implementing one or more traits from
//! [`crate::provider`]. Response parsing lives in separate functions so it
//! can be tested without a network.

pub mod arxiv;
pub mod github;
pub mod openai;
pub mod tavily;

pub use arxiv::ArxivProvider;
pub use github::GithubProvider;
pub use openai::ChatCompletionsClient;
pub use tavily::TavilyProvider;
