//! Answer composition over retrieved cases

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::config::AppConfig;
use crate::config::DEFAULT_MODEL;
use crate::config::DEFAULT_TEMPERATURE;
use crate::errors::CaseRagError;
use crate::errors::Result;
use crate::llm::ChatClient;
use crate::llm::ChatMessage;
use crate::llm::GenerationRequest;
use crate::llm::TextGenerator;
use crate::models::Answer;
use crate::models::RetrievedCase;
use crate::rag::prompts::build_case_rag_prompt;
use crate::rag::prompts::build_system_instruction;
use crate::rag::prompts::DISCLAIMER;
use crate::rag::prompts::TEMPLATE_GUIDANCE;
use crate::rag::prompts::TEMPLATE_SUMMARY;
use crate::rag::ContextAssembler;

/// Answer backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnswerBackend {
    /// Fixed template with citations, no external calls
    #[default]
    Template,
    /// Free text from a [`TextGenerator`]
    Generated,
}

impl AnswerBackend {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::Generated => "generated",
        }
    }
}

impl fmt::Display for AnswerBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerBackend {
    type Err = CaseRagError;

    /// `none` and `openai` are accepted as aliases of the two backends
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "template" | "none" => Ok(Self::Template),
            "generated" | "openai" => Ok(Self::Generated),
            _ => Err(CaseRagError::UnsupportedBackend(s.to_string())),
        }
    }
}

/// Model parameters of the generated backend
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Turns a query and its retrieved cases into an [`Answer`]
///
/// The backend and the generation capability are fixed at construction. A generated
/// backend without a generator answers in template mode with `degraded` set.
#[derive(Clone)]
pub struct Answerer {
    backend: AnswerBackend,
    settings: GenerationSettings,
    generator: Option<Arc<dyn TextGenerator>>,
    assembler: ContextAssembler,
}

impl fmt::Debug for Answerer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Answerer")
            .field("backend", &self.backend)
            .field("settings", &self.settings)
            .field("generation_available", &self.generation_available())
            .finish()
    }
}

impl Answerer {
    pub fn new(
        backend: AnswerBackend,
        settings: GenerationSettings,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        Self {
            backend,
            settings,
            generator,
            assembler: ContextAssembler::new(),
        }
    }

    /// Template-only answerer
    pub fn template() -> Self {
        Self::new(AnswerBackend::Template, GenerationSettings::default(), None)
    }

    /// Build from the `answer` and `llm` sections
    ///
    /// # Errors
    /// - `answer.backend` is not a known backend (`UnsupportedBackend`)
    ///
    /// A generator that cannot be built is not an error: the answerer degrades to
    /// template answers.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let backend: AnswerBackend = config.answer.backend.parse()?;
        let settings = GenerationSettings {
            model: config.answer.model_or_default().to_string(),
            temperature: config.answer.temperature_or_default(),
            timeout: Duration::from_secs(config.answer.timeout_secs),
        };

        let generator: Option<Arc<dyn TextGenerator>> = match backend {
            AnswerBackend::Template => None,
            AnswerBackend::Generated => {
                match ChatClient::from_config(&config.llm, settings.timeout) {
                    Ok(client) => {
                        info!(
                            "Generation enabled: {} at {}",
                            settings.model,
                            client.endpoint()
                        );
                        Some(Arc::new(client))
                    }
                    Err(e) => {
                        warn!("Generation unavailable, answers fall back to template: {}", e);
                        None
                    }
                }
            }
        };

        Ok(Self::new(backend, settings, generator))
    }

    pub const fn backend(&self) -> AnswerBackend {
        self.backend
    }

    pub const fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub const fn generation_available(&self) -> bool {
        self.generator.is_some()
    }

    /// Compose an answer for `query` from `cases`
    ///
    /// # Errors
    /// - Generated mode only: `LlmError`, `HttpError` or `GenerationTimeout` from the
    ///   generator, propagated without retry
    pub async fn answer(&self, query: &str, cases: &[RetrievedCase]) -> Result<Answer> {
        match (self.backend, &self.generator) {
            (AnswerBackend::Template, _) => Ok(self.template_answer(cases, false)),
            (AnswerBackend::Generated, Some(generator)) => {
                self.generated_answer(generator.as_ref(), query, cases).await
            }
            (AnswerBackend::Generated, None) => {
                warn!("Generated answer requested without a generator, using template");
                Ok(self.template_answer(cases, true))
            }
        }
    }

    fn template_answer(&self, cases: &[RetrievedCase], degraded: bool) -> Answer {
        debug!("Template answer over {} cases", cases.len());
        Answer::Template {
            summary: TEMPLATE_SUMMARY.to_string(),
            guidance: TEMPLATE_GUIDANCE.to_string(),
            citations: self.assembler.citations(cases),
            disclaimer: DISCLAIMER.to_string(),
            degraded,
        }
    }

    async fn generated_answer(
        &self,
        generator: &dyn TextGenerator,
        query: &str,
        cases: &[RetrievedCase],
    ) -> Result<Answer> {
        let context = self.assembler.assemble(cases);
        let request = GenerationRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatMessage::system(build_system_instruction()),
                ChatMessage::user(build_case_rag_prompt(query, &context)),
            ],
            temperature: self.settings.temperature,
        };

        debug!(
            "Generating answer with {} over {} cases",
            request.model,
            cases.len()
        );
        let text = tokio::time::timeout(self.settings.timeout, generator.generate(&request))
            .await
            .map_err(|_| CaseRagError::GenerationTimeout {
                timeout_ms: u64::try_from(self.settings.timeout.as_millis()).unwrap_or(u64::MAX),
            })??;

        Ok(Answer::Generated {
            text: text.trim().to_string(),
            disclaimer: DISCLAIMER.to_string(),
        })
    }
}
