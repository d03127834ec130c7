//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "regenerate code for this build cycle".

pub mod orchestrator;

pub use orchestrator::{BuildOrchestrator, CycleOutcome, OrchestratorPorts};
