//! Support plan types produced by the generator.

use serde::{Deserialize, Serialize};

/// Breathing pattern suggested to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleType {
    InhaleExhale,
    BoxBreathing,
    #[default]
    None,
}

impl CycleType {
    pub const ALL: [CycleType; 3] = [Self::InhaleExhale, Self::BoxBreathing, Self::None];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InhaleExhale => "inhale_exhale",
            Self::BoxBreathing => "box_breathing",
            Self::None => "none",
        }
    }
}

/// Assistive action the client may offer, such as a breathing timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDirective {
    pub suggest_breathing_timer: bool,
    pub recommended_duration: u32,
    pub cycle_type: CycleType,
    /// Always true: the client must ask before starting anything.
    #[serde(default = "always_true")]
    pub user_confirmation_required: bool,
}

fn always_true() -> bool {
    true
}

impl ActionDirective {
    /// A directive that recommends nothing.
    pub fn none() -> Self {
        Self {
            suggest_breathing_timer: false,
            recommended_duration: 0,
            cycle_type: CycleType::None,
            user_confirmation_required: true,
        }
    }

    /// Whether `cycle_type` agrees with `suggest_breathing_timer`.
    ///
    /// Advisory only; generated and fallback plans are not rejected for it.
    pub fn is_consistent(&self) -> bool {
        self.suggest_breathing_timer || self.cycle_type == CycleType::None
    }
}

/// A well-formed support plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanBody {
    pub support_message: String,
    /// Exactly three practical activities.
    pub activities: [String; 3],
    pub actions: ActionDirective,
    #[serde(default)]
    pub resources: Vec<String>,
}

/// Returned when the backend answered but its output did not fit the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegradedPlan {
    pub error: String,
    /// The backend output exactly as received, before any cleanup.
    pub raw_response: String,
}

/// Support plan as seen by callers.
///
/// Serializes flat: either the plan fields or `{error, raw_response}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SupportPlan {
    Plan(PlanBody),
    Degraded(DegradedPlan),
}

impl SupportPlan {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    pub fn as_plan(&self) -> Option<&PlanBody> {
        match self {
            Self::Plan(body) => Some(body),
            Self::Degraded(_) => None,
        }
    }

    pub fn as_degraded(&self) -> Option<&DegradedPlan> {
        match self {
            Self::Plan(_) => None,
            Self::Degraded(degraded) => Some(degraded),
        }
    }
}

impl From<PlanBody> for SupportPlan {
    fn from(body: PlanBody) -> Self {
        Self::Plan(body)
    }
}

impl From<DegradedPlan> for SupportPlan {
    fn from(degraded: DegradedPlan) -> Self {
        Self::Degraded(degraded)
    }
}
