//! Declared shape of a generated support plan.
//!
//! The schema renders format instructions for the prompt and parses cleaned
//! generator output into a [`PlanBody`].

use crate::sanitize::json_object_span;
use crate::types::{CycleType, PlanBody};
use crate::{Result, SolaceError};

/// Wire type of a schema field, as named in the format instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    List,
    Object,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::List => "list",
            Self::Object => "object",
        }
    }
}

/// One top-level field the generator must produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: String,
}

impl FieldSpec {
    fn new(name: &'static str, kind: FieldKind, description: impl Into<String>) -> Self {
        Self {
            name,
            kind,
            description: description.into(),
        }
    }
}

/// Schema for [`PlanBody`].
#[derive(Debug, Clone)]
pub struct SupportPlanSchema {
    fields: Vec<FieldSpec>,
}

impl Default for SupportPlanSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl SupportPlanSchema {
    pub fn new() -> Self {
        let cycles = CycleType::ALL
            .iter()
            .map(|c| format!("\"{}\"", c.as_str()))
            .collect::<Vec<_>>()
            .join(" | ");

        Self {
            fields: vec![
                FieldSpec::new(
                    "support_message",
                    FieldKind::String,
                    "A short, supportive message for the user",
                ),
                FieldSpec::new(
                    "activities",
                    FieldKind::List,
                    "A list of exactly 3 helpful, practical activities (strings)",
                ),
                FieldSpec::new(
                    "actions",
                    FieldKind::Object,
                    format!(
                        "Breathing timer or other assistive actions with keys \
                         suggest_breathing_timer (bool), recommended_duration (integer seconds), \
                         cycle_type ({cycles}), user_confirmation_required (always true)"
                    ),
                ),
            ],
        }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Instructions telling the generator the exact output shape.
    pub fn format_instructions(&self) -> String {
        let body = self
            .fields
            .iter()
            .map(|f| format!("\t\"{}\": {}  // {}", f.name, f.kind.as_str(), f.description))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "The output should be a markdown code snippet formatted in the following schema, \
             including the leading and trailing \"```json\" and \"```\":\n\n\
             ```json\n{{\n{body}\n}}\n```"
        )
    }

    /// Parse cleaned generator output.
    ///
    /// Expects text already passed through [`sanitize`](crate::sanitize::sanitize).
    /// Prose around the object is tolerated; anything else that does not match
    /// the declared shape is a [`SolaceError::SchemaParse`].
    pub fn parse(&self, text: &str) -> Result<PlanBody> {
        let candidate = json_object_span(text).unwrap_or(text);

        let value: serde_json::Value = serde_json::from_str(candidate)
            .map_err(|e| SolaceError::SchemaParse(format!("invalid JSON: {e}")))?;

        let object = value
            .as_object()
            .ok_or_else(|| SolaceError::SchemaParse("expected a JSON object".to_string()))?;

        if let Some(missing) = self.fields.iter().find(|f| !object.contains_key(f.name)) {
            return Err(SolaceError::SchemaParse(format!(
                "missing field `{}`",
                missing.name
            )));
        }

        let mut plan: PlanBody = serde_json::from_value(value)
            .map_err(|e| SolaceError::SchemaParse(e.to_string()))?;
        plan.actions.user_confirmation_required = true;
        Ok(plan)
    }
}
