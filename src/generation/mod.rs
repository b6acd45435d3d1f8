pub mod client;
pub mod http;
pub mod types;

pub use client::{GenerateError, GenerationClient, generate_cancellable};
pub use http::HttpGenerationClient;
pub use types::{GenerateRequest, GenerateResponse};
