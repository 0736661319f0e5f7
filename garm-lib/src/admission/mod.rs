//! The admission pipeline: one allow/deny/cache decision per request.
//!
//! Checks run in a fixed order — SSRF, then rate limit, then cache lookup —
//! because the first two are cheap and local while the cache read (possibly
//! compressed) is the most expensive step and should only run for admitted
//! traffic. A denied request leaves no rate or cache side effects behind the
//! point where it was denied.

mod maintenance;
mod pipeline;

pub use maintenance::{spawn_maintenance, MaintenanceConfig};
pub use pipeline::{
    AdmissionDecision, AdmissionPipeline, AdmissionRequest, DenialReason, PipelineBuilder,
};
