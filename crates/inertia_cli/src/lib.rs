//! Inertia CLI
//!
//! Headless gesture simulator for the scroll engine. A scenario is a JSON
//! list of pointer events, frame steps and assertions; the runner replays it
//! against a [`inertia_scroll::Scroll`] on a manual clock and produces a
//! machine-readable report.

pub mod config;
pub mod report;
pub mod runner;
pub mod scenario;

pub use config::{InertiaConfig, ViewportConfig};
pub use report::{FinalState, ReportStatus, SimulationReport, TracePoint};
pub use runner::{run_loaded_scenario, run_scenario, RunOptions, RunOutcome};
pub use scenario::{Scenario, ScenarioStep};
