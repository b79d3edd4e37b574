pub mod llm;
pub mod processor;
pub mod scorer;

pub use llm::{ChatCompletionClient, LlmClient};
pub use processor::LeadProcessor;
pub use scorer::{LeadScorer, ModelScorer};
