//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (e.g. prometheus, statsd);
//! without a recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `solace_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).

/// Total successful classifications.
///
/// Labels: `emotion`.
pub const CLASSIFICATIONS_TOTAL: &str = "solace_classifications_total";

/// Total support-plan generations.
///
/// Labels: `backend`, `outcome` ("ok" | "fallback" | "degraded").
pub const GENERATIONS_TOTAL: &str = "solace_generations_total";

/// Support-plan generation duration in seconds, fallback path included.
///
/// Labels: `backend`.
pub const GENERATION_DURATION_SECONDS: &str = "solace_generation_duration_seconds";
