//! Precedent case retrieval and reference answers for election-law questions
//!
//! A frozen TF-IDF index ([`index`]) is searched for the cases closest to a question
//! ([`rag::Searcher`]), the hits become typed records ([`rag::Retriever`]) and an
//! [`rag::Answerer`] composes either a citation template or a model-generated text.
//! Every answer carries the same disclaimer; nothing here gives legal advice.

pub mod cli;
pub mod config;
pub mod errors;
pub mod index;
pub mod llm;
pub mod logging;
pub mod models;
pub mod rag;


pub use config::AppConfig;
pub use errors::*;
pub use models::Answer;
pub use models::AskReport;
pub use models::RetrievedCase;
pub use models::SearchHit;
pub use rag::CaseRag;
