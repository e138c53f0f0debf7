//! Support-plan generation with deterministic fallback.
//!
//! One backend attempt per request, bounded by a timeout:
//!
//! - backend failure (network, timeout, API error, no backend) yields the
//!   rule-based [`fallback_plan`]
//! - a response that does not fit the schema yields a
//!   [`DegradedPlan`] carrying the error and the untouched response text
//!
//! [`SupportGenerator::generate`] never returns an error.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, instrument, warn};

use crate::prompt::{PromptBuilder, SYSTEM_PROMPT};
use crate::providers::{DEFAULT_TIMEOUT, GenerateProvider};
use crate::sanitize::sanitize;
use crate::schema::SupportPlanSchema;
use crate::telemetry;
use crate::types::{
    ActionDirective, CycleType, DegradedPlan, EmotionLabel, GenerateOptions, PlanBody,
    SupportPlan,
};
use crate::{Result, SolaceError};

/// Output token budget for a support plan.
pub const DEFAULT_MAX_TOKENS: usize = 300;

/// Activities offered when the backend is unavailable.
pub const FALLBACK_ACTIVITIES: [&str; 3] = [
    "Take a short walk",
    "Write down your thoughts",
    "Practice mindful breathing",
];

/// Breathing timer length in the fallback plan.
pub const FALLBACK_BREATHING_SECS: u32 = 60;

/// Name reported when no backend is configured.
const NO_BACKEND: &str = "none";

/// Which path produced a plan, for metrics and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Ok,
    Fallback,
    Degraded,
}

impl Outcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Fallback => "fallback",
            Self::Degraded => "degraded",
        }
    }
}

/// Generates support plans from a configurable backend.
pub struct SupportGenerator {
    provider: Option<Arc<dyn GenerateProvider>>,
    schema: SupportPlanSchema,
    options: GenerateOptions,
    timeout: Duration,
}

impl SupportGenerator {
    /// Create a generator for the given backend.
    ///
    /// The system persona is added to `options` when none is set.
    pub fn new(provider: Arc<dyn GenerateProvider>, mut options: GenerateOptions) -> Self {
        if options.system.is_none() {
            options.system = Some(SYSTEM_PROMPT.to_string());
        }
        Self {
            provider: Some(provider),
            schema: SupportPlanSchema::new(),
            options,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// A generator that always returns the fallback plan.
    pub fn without_backend() -> Self {
        Self {
            provider: None,
            schema: SupportPlanSchema::new(),
            options: GenerateOptions::new(NO_BACKEND)
                .max_tokens(DEFAULT_MAX_TOKENS)
                .system(SYSTEM_PROMPT),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Bound each backend call; exceeding it counts as a backend failure.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn backend_name(&self) -> &str {
        self.provider.as_ref().map_or(NO_BACKEND, |p| p.name())
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    pub fn schema(&self) -> &SupportPlanSchema {
        &self.schema
    }

    /// Generate a support plan for a classified journal entry.
    #[instrument(skip(self, text), fields(emotion = %emotion, backend = self.backend_name()))]
    pub async fn generate(&self, emotion: EmotionLabel, text: &str) -> SupportPlan {
        let start = Instant::now();
        let prompt = PromptBuilder::build(emotion, text, &self.schema.format_instructions());

        let (plan, outcome) = match self.call_backend(&prompt).await {
            Ok(raw) => match self.parse_response(&raw) {
                Ok(body) => (SupportPlan::Plan(body), Outcome::Ok),
                Err(e) => {
                    warn!(error = %e, "generated plan did not match schema");
                    let degraded = DegradedPlan {
                        error: e.to_string(),
                        raw_response: raw,
                    };
                    (SupportPlan::Degraded(degraded), Outcome::Degraded)
                }
            },
            Err(e) => {
                warn!(error = %e, "generation backend failed, using fallback plan");
                (SupportPlan::Plan(fallback_plan(emotion)), Outcome::Fallback)
            }
        };

        self.record(outcome, start);
        debug!(outcome = outcome.as_str(), "support plan ready");
        plan
    }

    /// Clean and parse backend output into a plan.
    pub fn parse_response(&self, raw: &str) -> Result<PlanBody> {
        let cleaned = sanitize(raw);
        let mut body = self.schema.parse(&cleaned)?;
        body.resources = filter_resources(std::mem::take(&mut body.resources));
        Ok(body)
    }

    /// Single backend attempt under the configured timeout.
    async fn call_backend(&self, prompt: &str) -> Result<String> {
        let provider = self.provider.as_ref().ok_or_else(|| {
            SolaceError::Configuration("no generation backend configured".to_string())
        })?;

        tokio::time::timeout(self.timeout, provider.generate(prompt, &self.options))
            .await
            .map_err(|_| SolaceError::Timeout(self.timeout))?
    }

    fn record(&self, outcome: Outcome, start: Instant) {
        let backend = self.backend_name().to_owned();
        metrics::counter!(telemetry::GENERATIONS_TOTAL,
            "backend" => backend.clone(),
            "outcome" => outcome.as_str(),
        )
        .increment(1);
        metrics::histogram!(telemetry::GENERATION_DURATION_SECONDS,
            "backend" => backend,
        )
        .record(start.elapsed().as_secs_f64());
    }
}

impl std::fmt::Debug for SupportGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupportGenerator")
            .field("backend", &self.backend_name())
            .field("options", &self.options)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Rule-based plan used when the backend cannot be reached.
pub fn fallback_plan(emotion: EmotionLabel) -> PlanBody {
    PlanBody {
        support_message: format!(
            "I'm here for you. Remember, your feelings of {emotion} are valid."
        ),
        activities: FALLBACK_ACTIVITIES.map(String::from),
        actions: ActionDirective {
            suggest_breathing_timer: emotion.benefits_from_breathing(),
            recommended_duration: FALLBACK_BREATHING_SECS,
            cycle_type: CycleType::InhaleExhale,
            user_confirmation_required: true,
        },
        resources: Vec::new(),
    }
}

/// Filter model-suggested resources before they reach the user.
///
/// Currently drops everything; no resource source is vetted yet.
pub fn filter_resources(_resources: Vec<String>) -> Vec<String> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_message_names_emotion() {
        let plan = fallback_plan(EmotionLabel::Love);
        assert_eq!(
            plan.support_message,
            "I'm here for you. Remember, your feelings of love are valid."
        );
    }

    #[test]
    fn fallback_directive_fields() {
        let plan = fallback_plan(EmotionLabel::Fear);
        assert_eq!(plan.actions.recommended_duration, 60);
        assert_eq!(plan.actions.cycle_type, CycleType::InhaleExhale);
        assert!(plan.actions.user_confirmation_required);
        assert_eq!(plan.activities, FALLBACK_ACTIVITIES.map(String::from));
    }

    #[test]
    fn resources_are_dropped() {
        assert!(filter_resources(vec!["https://example.org".to_string()]).is_empty());
    }

    #[test]
    fn new_adds_system_persona() {
        struct Noop;

        #[async_trait::async_trait]
        impl GenerateProvider for Noop {
            fn name(&self) -> &str {
                "noop"
            }

            async fn generate(&self, _prompt: &str, _options: &GenerateOptions) -> Result<String> {
                Ok(String::new())
            }
        }

        let generator = SupportGenerator::new(Arc::new(Noop), GenerateOptions::new("m"));
        assert_eq!(generator.options().system.as_deref(), Some(SYSTEM_PROMPT));
        assert_eq!(generator.backend_name(), "noop");
        assert_eq!(SupportGenerator::without_backend().backend_name(), "none");
    }
}
