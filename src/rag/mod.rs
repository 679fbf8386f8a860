//! RAG (Retrieval-Augmented Generation) module
//!
//! This module answers election-law questions from a frozen case index:
//! - Similarity search over the index ([`Searcher`])
//! - Typed case records from ranked hits ([`Retriever`])
//! - Context and citation assembly ([`ContextAssembler`])
//! - Template or model-generated answers with a fixed disclaimer ([`Answerer`])
//!
//! # Examples
//!
//! ```rust,no_run
//! use caserag::config::AppConfig;
//! use caserag::rag::CaseRag;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let rag = CaseRag::from_config(&config)?;
//!
//!     let report = rag.ask("campaign banner 20 days before election day", 3).await?;
//!     println!("Mode: {}", report.answer.mode());
//!     println!("Cases: {}", report.cases.len());
//!
//!     Ok(())
//! }
//! ```

pub mod answerer;
pub mod context;
pub mod pipeline;
pub mod prompts;
pub mod retriever;
pub mod searcher;

pub use answerer::AnswerBackend;
pub use answerer::Answerer;
pub use answerer::GenerationSettings;
pub use context::ContextAssembler;
pub use pipeline::CaseRag;
pub use retriever::Retriever;
pub use searcher::Searcher;
