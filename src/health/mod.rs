//! Threshold evaluation and alert routing.
//!
//! Each cycle takes a metric snapshot, runs every rule against it through
//! the router, files the results into per-level buckets and reduces those
//! buckets to one passive check per configured service.

mod aggregate;
mod emitter;
mod engine;
mod evaluator;
mod formatter;
mod level;
mod provider;
mod router;
mod rule;
mod snapshot;

pub use aggregate::LevelAggregate;
pub use emitter::{ActiveEmitter, PassiveCheckEmitter};
pub use engine::{CheckEngine, CycleReport, CycleSettings};
pub use level::WarningLevel;
pub use provider::{HttpSnapshotSource, SnapshotSource};
pub use rule::CheckSet;
