//! Scenario runner that replays gestures against a [`Scroll`] on a manual clock.

use crate::config::InertiaConfig;
use crate::report::{FinalState, SimulationReport, TracePoint};
use crate::scenario::{Scenario, ScenarioStep};
use anyhow::Result;
use inertia_core::{elapsed_ms, Clock, ManualClock};
use inertia_scroll::Scroll;
use std::sync::{Arc, Mutex, MutexGuard};

/// Intervals shorter than this count as no time at all
const TIME_EPSILON_MS: f64 = 1e-9;

/// Final outcome of a scenario run.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Passed { report: SimulationReport },
    Failed { report: SimulationReport },
}

impl RunOutcome {
    pub fn report(&self) -> &SimulationReport {
        match self {
            RunOutcome::Passed { report } => report,
            RunOutcome::Failed { report } => report,
        }
    }

    pub fn into_report(self) -> SimulationReport {
        match self {
            RunOutcome::Passed { report } | RunOutcome::Failed { report } => report,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. })
    }
}

/// Knobs that do not change the engine itself
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Record every published offset in the report
    pub trace: bool,
}

/// Callback output collected during a run
#[derive(Debug, Default)]
struct Recorder {
    offsets: Vec<TracePoint>,
    ends: Vec<bool>,
}

/// Execute scenario JSON.
pub fn run_scenario(input: &str, config: &InertiaConfig, options: RunOptions) -> Result<RunOutcome> {
    let scenario = Scenario::from_json(input)?;
    Ok(run_loaded_scenario(&scenario, config, options))
}

/// Execute a pre-loaded scenario.
pub fn run_loaded_scenario(
    scenario: &Scenario,
    config: &InertiaConfig,
    options: RunOptions,
) -> RunOutcome {
    let mut sim = Simulator::new(config);
    tracing::info!(
        "simulating {} steps: view {} content {}",
        scenario.steps.len(),
        config.viewport.view_len,
        config.viewport.content_len
    );

    for (step_index, step) in scenario.steps.iter().enumerate() {
        tracing::debug!("step {}: {:?}", step_index, step);
        if let Err(message) = sim.apply(step) {
            tracing::info!("step {} ({}) failed: {}", step_index, step.kind(), message);
            let report = SimulationReport::failed(
                step.kind(),
                step_index,
                message,
                sim.elapsed_frames,
                sim.elapsed_ms(),
                sim.final_state(),
            );
            return RunOutcome::Failed {
                report: sim.finish_report(report, options),
            };
        }
    }

    let report = SimulationReport::passed(sim.elapsed_frames, sim.elapsed_ms(), sim.final_state());
    RunOutcome::Passed {
        report: sim.finish_report(report, options),
    }
}

/// A scroll axis plus the host-side frame driver around it
struct Simulator {
    scroll: Scroll<ManualClock>,
    clock: ManualClock,
    recorder: Arc<Mutex<Recorder>>,
    elapsed_frames: u64,
}

impl Simulator {
    fn new(config: &InertiaConfig) -> Self {
        let clock = ManualClock::new();
        let recorder = Arc::new(Mutex::new(Recorder::default()));

        let scroll_recorder = recorder.clone();
        let scroll_clock = clock.clone();
        let end_recorder = recorder.clone();
        let scroll = Scroll::with_clock(config.scroll, clock.clone())
            .with_geometry(config.viewport.view_len, config.viewport.content_len)
            .with_offset(config.viewport.initial_offset)
            .on_scroll(move |offset| {
                lock(&scroll_recorder).offsets.push(TracePoint {
                    elapsed_ms: elapsed_ms(scroll_clock.origin(), scroll_clock.now()),
                    offset,
                });
            })
            .on_scroll_end(move |settled| lock(&end_recorder).ends.push(settled));

        Self {
            scroll,
            clock,
            recorder,
            elapsed_frames: 0,
        }
    }

    fn apply(&mut self, step: &ScenarioStep) -> std::result::Result<(), String> {
        match *step {
            ScenarioStep::Down { pos, after_ms } => {
                self.advance(after_ms);
                self.scroll.on_down(pos, self.clock.now());
            }
            ScenarioStep::Move { pos, after_ms } => {
                self.advance(after_ms);
                self.scroll.on_move(pos, self.clock.now());
            }
            ScenarioStep::Up { pos, after_ms } => {
                self.advance(after_ms);
                self.scroll.on_up(pos, self.clock.now());
            }
            ScenarioStep::Cancel { after_ms } => {
                self.advance(after_ms);
                self.scroll.on_cancel(self.clock.now());
            }
            ScenarioStep::SetPos { offset } => self.scroll.set_pos(offset),
            ScenarioStep::Wait { ms } => self.advance(ms),
            ScenarioStep::Tick { frames } => {
                let interval = self.scroll.config().frame_interval_ms();
                for _ in 0..frames {
                    self.frame(interval);
                }
            }
            ScenarioStep::RunUntilIdle { max_frames } => {
                let interval = self.scroll.config().frame_interval_ms();
                let mut frames = 0u32;
                while self.scroll.pending_frames() > 0 {
                    if frames >= max_frames {
                        return Err(format!(
                            "still {:?} at offset {} after {} frames",
                            self.scroll.state(),
                            self.scroll.offset(),
                            max_frames
                        ));
                    }
                    self.frame(interval);
                    frames += 1;
                }
            }
            ScenarioStep::AssertOffset { min, max } => {
                let offset = self.scroll.offset();
                if let Some(min) = min.filter(|min| offset < *min) {
                    return Err(format!("offset {offset} is below {min}"));
                }
                if let Some(max) = max.filter(|max| offset > *max) {
                    return Err(format!("offset {offset} is above {max}"));
                }
            }
            ScenarioStep::AssertState { state } => {
                if self.scroll.state() != state {
                    return Err(format!(
                        "expected state {:?}, got {:?}",
                        state,
                        self.scroll.state()
                    ));
                }
            }
        }
        Ok(())
    }

    /// Let `ms` pass, running a frame at every interval along the way
    fn advance(&mut self, ms: f64) {
        if !(ms.is_finite() && ms > 0.0) {
            return;
        }
        let interval = self.scroll.config().frame_interval_ms();
        let mut remaining = ms;
        while remaining > TIME_EPSILON_MS {
            let step = remaining.min(interval);
            self.frame(step);
            remaining -= step;
        }
    }

    fn frame(&mut self, ms: f64) {
        self.clock.advance_ms(ms);
        self.scroll.tick();
        self.elapsed_frames = self.elapsed_frames.saturating_add(1);
    }

    fn elapsed_ms(&self) -> f64 {
        elapsed_ms(self.clock.origin(), self.clock.now())
    }

    fn final_state(&self) -> FinalState {
        let recorder = lock(&self.recorder);
        FinalState {
            offset: self.scroll.offset(),
            state: self.scroll.state(),
            scroll_events: recorder.offsets.len(),
            scroll_end_events: recorder.ends.len(),
        }
    }

    fn finish_report(&self, report: SimulationReport, options: RunOptions) -> SimulationReport {
        if options.trace {
            report.with_trace(lock(&self.recorder).offsets.clone())
        } else {
            report
        }
    }
}

fn lock(recorder: &Mutex<Recorder>) -> MutexGuard<'_, Recorder> {
    recorder.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use inertia_scroll::ScrollState;
    use pretty_assertions::assert_eq;

    fn run(steps: &str) -> RunOutcome {
        let input = format!(r#"{{ "steps": [{steps}] }}"#);
        run_scenario(&input, &InertiaConfig::default(), RunOptions::default()).unwrap()
    }

    #[test]
    fn test_empty_scenario_passes() {
        let outcome = run("");
        assert!(!outcome.is_failed());
        let report = outcome.report();
        assert_eq!(report.elapsed_frames, 0);
        assert_eq!(report.final_offset, 0.0);
        assert_eq!(report.final_state, ScrollState::Idle);
    }

    #[test]
    fn test_wait_runs_frames_at_cadence() {
        let outcome = run(r#"{ "type": "wait", "ms": 100 }"#);
        let report = outcome.report();
        assert_eq!(report.elapsed_frames, 6);
        assert!((report.elapsed_ms - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_drag_is_reported() {
        let outcome = run(
            r#"
            { "type": "down", "pos": 0.0 },
            { "type": "move", "pos": -30.0, "after_ms": 16 },
            { "type": "assert_state", "state": "dragging" },
            { "type": "assert_offset", "min": 30.0, "max": 30.0 }
            "#,
        );
        assert!(!outcome.is_failed(), "{:?}", outcome.report());
        assert_eq!(outcome.report().scroll_events, 1);
    }

    #[test]
    fn test_failed_assertion_stops_the_run() {
        let outcome = run(
            r#"
            { "type": "set_pos", "offset": 200.0 },
            { "type": "assert_offset", "max": 100.0 },
            { "type": "set_pos", "offset": 0.0 }
            "#,
        );
        assert!(outcome.is_failed());
        let report = outcome.report();
        assert_eq!(report.failed_step_index, Some(1));
        assert_eq!(report.assertion.as_deref(), Some("assert_offset"));
        assert_eq!(report.final_offset, 200.0);
    }

    #[test]
    fn test_run_until_idle_budget() {
        let outcome = run(
            r#"
            { "type": "down", "pos": 0.0 },
            { "type": "move", "pos": -60.0, "after_ms": 40 },
            { "type": "up", "pos": -120.0, "after_ms": 40 },
            { "type": "run_until_idle", "max_frames": 3 }
            "#,
        );
        assert!(outcome.is_failed());
        assert_eq!(outcome.report().assertion.as_deref(), Some("run_until_idle"));
    }

    #[test]
    fn test_trace_records_offsets() {
        let input = r#"{ "steps": [
            { "type": "set_pos", "offset": 10.0 },
            { "type": "set_pos", "offset": 20.0 }
        ] }"#;
        let outcome = run_scenario(
            input,
            &InertiaConfig::default(),
            RunOptions { trace: true },
        )
        .unwrap();

        let trace = outcome.into_report().trace.unwrap();
        let offsets: Vec<f64> = trace.iter().map(|p| p.offset).collect();
        assert_eq!(offsets, vec![10.0, 20.0]);
    }

    #[test]
    fn test_initial_offset_is_clamped() {
        let mut config = InertiaConfig::default();
        config.viewport.initial_offset = 5000.0;
        let outcome = run_scenario(r#"{ "steps": [] }"#, &config, RunOptions::default()).unwrap();
        assert_eq!(outcome.report().final_offset, 900.0);
    }
}
