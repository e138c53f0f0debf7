//! Public types for the Solace API.

mod emotion;
mod generate;
mod plan;
mod result;

pub use emotion::{ClassificationResult, EmotionDistribution, EmotionLabel};
pub use generate::GenerateOptions;
pub use plan::{ActionDirective, CycleType, DegradedPlan, PlanBody, SupportPlan};
pub use result::PipelineResult;
