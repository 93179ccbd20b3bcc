use chrono::Utc;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::fallback::{estimate_complexity, FallbackSynthesizer, FALLBACK_CONFIDENCE};
use super::tables;
use crate::agents::{AgentMentionResolver, CatalogLoader};
use crate::cache::BoundedCache;
use crate::classifier::WorkflowClassifier;
use crate::config::Config;
use crate::context::{ContextAnalyzer, ContextOptions};
use crate::error::EnhanceError;
use crate::llm::client::LlmClient;
use crate::llm::prompts;
use crate::llm::structured;
use crate::types::{
    AiEnhancement, ContextBundle, EnhancementSource, MentionResolution, RawInput, ResultUpdate,
    StructuredResult, WorkflowCategory,
};
use crate::validator::QualityValidator;

/// Confidence assumed when the model leaves the field out.
pub const DEFAULT_MODEL_CONFIDENCE: u8 = 75;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parse,
    Contextualize,
    Generate,
    Validate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Parse => write!(f, "parse"),
            Stage::Contextualize => write!(f, "contextualize"),
            Stage::Generate => write!(f, "generate"),
            Stage::Validate => write!(f, "validate"),
        }
    }
}

/// Everything the generate stage needs, gathered by the contextualize stage.
struct Contextualized {
    category: WorkflowCategory,
    resolution: MentionResolution,
    context: ContextBundle,
}

pub struct Enhancer {
    client: Option<Arc<dyn LlmClient>>,
    timeout: Duration,
    agents_dir: PathBuf,
    classifier: WorkflowClassifier,
    resolver: AgentMentionResolver,
    catalogs: CatalogLoader,
    context: ContextAnalyzer,
    fallback: FallbackSynthesizer,
    validator: QualityValidator,
}

impl Enhancer {
    /// An offline enhancer for the project at `root`. Attach a model with
    /// [`with_client`](Self::with_client).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            client: None,
            timeout: DEFAULT_TIMEOUT,
            agents_dir: root.join(".claude").join("agents"),
            classifier: WorkflowClassifier::new(),
            resolver: AgentMentionResolver::new(),
            catalogs: CatalogLoader::default(),
            context: ContextAnalyzer::new(root),
            fallback: FallbackSynthesizer::new(),
            validator: QualityValidator::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let enhancement = &config.enhancement;
        let capacity = enhancement.cache_capacity;
        Self::new(enhancement.root.clone())
            .with_timeout(Duration::from_secs(config.llm.timeout_secs))
            .with_agents_dir(enhancement.resolved_agents_dir())
            .with_context_options(enhancement.context_options())
            .with_cache_capacity(capacity)
    }

    pub fn with_client(mut self, client: Arc<dyn LlmClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_agents_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.agents_dir = dir.into();
        self
    }

    pub fn with_context_options(mut self, options: ContextOptions) -> Self {
        self.context = self.context.with_options(options);
        self
    }

    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.context = self.context.with_cache(BoundedCache::new(capacity));
        self.catalogs = CatalogLoader::new(capacity);
        self
    }

    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    pub async fn enhance(
        &self,
        raw: &str,
        explicit: Option<WorkflowCategory>,
    ) -> Result<StructuredResult, EnhanceError> {
        let mut input = RawInput::new(raw);
        input.category = explicit;
        self.enhance_input(input).await
    }

    pub async fn enhance_input(&self, input: RawInput) -> Result<StructuredResult, EnhanceError> {
        info!("Stage: {}", Stage::Parse);
        let text = input.trimmed_content()?;
        if let Some(author) = &input.metadata.author {
            debug!("Prompt from {} (tags: {:?})", author, input.metadata.tags);
        }

        info!("Stage: {}", Stage::Contextualize);
        let prepared = self.contextualize(text, input.category);

        info!("Stage: {}", Stage::Generate);
        let (enhancement, source) = self.generate_or_fallback(&prepared).await;

        info!("Stage: {}", Stage::Validate);
        let mut result = self.assemble(text, prepared, enhancement, source);
        result.validation = self.validator.validate(&result);

        info!(
            "Enhanced as {} via {:?}: score {}, {} issue(s)",
            result.category,
            result.source,
            result.validation.score,
            result.validation.issues.len()
        );
        Ok(result)
    }

    /// Apply `update` to `result` and re-validate. `id` and `created_at` are
    /// kept; `updated_at` moves forward.
    pub fn revise(&self, result: &StructuredResult, update: ResultUpdate) -> StructuredResult {
        let mut next = result.merged(update);
        next.validation = self.validator.validate(&next);
        debug!(
            "Revised {}: score {} -> {}",
            next.id, result.validation.score, next.validation.score
        );
        next
    }

    fn contextualize(&self, text: &str, explicit: Option<WorkflowCategory>) -> Contextualized {
        let category = self.classifier.classify(text, explicit);
        let catalog = self.catalogs.load(&self.agents_dir);
        let resolution = self.resolver.resolve(text, &catalog);
        if !resolution.agents.is_empty() {
            info!("Resolved agents: {:?}", resolution.agent_names());
        }
        let context = self.context.analyze(text);

        Contextualized {
            category,
            resolution,
            context,
        }
    }

    async fn generate_or_fallback(
        &self,
        prepared: &Contextualized,
    ) -> (AiEnhancement, EnhancementSource) {
        let text = prepared.resolution.processed.as_str();
        let fallback = || {
            (
                self.fallback.synthesize_with(text, Some(prepared.category)),
                EnhancementSource::Fallback,
            )
        };

        let Some(client) = &self.client else {
            debug!("No model configured; using fallback");
            return fallback();
        };

        let prompt = prompts::enhancement_prompt(
            text,
            prepared.category,
            &prepared.resolution.agents,
            &prepared.context,
        );
        let call = structured::generate::<AiEnhancement>(client.as_ref(), &prompt);

        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(enhancement)) if !enhancement.instruction.trim().is_empty() => {
                (enhancement, EnhancementSource::Model)
            }
            Ok(Ok(_)) => {
                warn!("Model returned an empty instruction; using fallback");
                fallback()
            }
            Ok(Err(e)) => {
                warn!("Generation failed: {:#}; using fallback", e);
                fallback()
            }
            Err(_) => {
                warn!(
                    "Generation timed out after {:?}; using fallback",
                    self.timeout
                );
                fallback()
            }
        }
    }

    fn assemble(
        &self,
        text: &str,
        prepared: Contextualized,
        enhancement: AiEnhancement,
        source: EnhancementSource,
    ) -> StructuredResult {
        let category = prepared.category;
        if let Some(suggested) = enhancement.category {
            if suggested != category {
                debug!("Ignoring model category {} (keeping {})", suggested, category);
            }
        }

        let confidence_score = match source {
            EnhancementSource::Model => enhancement
                .confidence_score
                .unwrap_or(DEFAULT_MODEL_CONFIDENCE)
                .min(100),
            EnhancementSource::Fallback => FALLBACK_CONFIDENCE,
        };
        let expected_output = enhancement
            .expected_output
            .unwrap_or_else(|| tables::template(category).expected_output());
        let references = prepared
            .resolution
            .agents
            .iter()
            .map(|a| a.canonical_token())
            .collect();

        let now = Utc::now();
        StructuredResult {
            id: Uuid::new_v4().to_string(),
            category,
            instruction: enhancement.instruction.trim().to_string(),
            original: text.to_string(),
            context: Some(prepared.context),
            inputs: enhancement.inputs,
            expected_output,
            validation: Default::default(),
            created_at: now,
            updated_at: now,
            source,
            complexity: enhancement
                .complexity
                .or_else(|| Some(estimate_complexity(text))),
            confidence_score,
            clarifying_questions: enhancement.clarifying_questions,
            success_criteria: enhancement.success_criteria,
            constraints: enhancement.constraints,
            steps: enhancement.steps,
            examples: enhancement.examples,
            references,
        }
    }
}
