//! Scripted gesture scenarios

use anyhow::{Context, Result};
use inertia_scroll::ScrollState;
use serde::Deserialize;
use std::path::Path;

/// Sequence of simulator steps
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Load a scenario from JSON text.
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a scenario from file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// One scripted step.
///
/// Pointer steps take an optional `after_ms`: that much time passes (with
/// frames running) before the event is delivered.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioStep {
    Down {
        pos: f64,
        #[serde(default)]
        after_ms: f64,
    },
    Move {
        pos: f64,
        #[serde(default)]
        after_ms: f64,
    },
    Up {
        pos: f64,
        #[serde(default)]
        after_ms: f64,
    },
    Cancel {
        #[serde(default)]
        after_ms: f64,
    },
    SetPos {
        offset: f64,
    },
    Wait {
        ms: f64,
    },
    Tick {
        frames: u32,
    },
    RunUntilIdle {
        #[serde(default = "default_max_frames")]
        max_frames: u32,
    },
    AssertOffset {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    AssertState {
        state: ScrollState,
    },
}

fn default_max_frames() -> u32 {
    1000
}

impl ScenarioStep {
    /// Step name as written in scenario files
    pub fn kind(&self) -> &'static str {
        match self {
            ScenarioStep::Down { .. } => "down",
            ScenarioStep::Move { .. } => "move",
            ScenarioStep::Up { .. } => "up",
            ScenarioStep::Cancel { .. } => "cancel",
            ScenarioStep::SetPos { .. } => "set_pos",
            ScenarioStep::Wait { .. } => "wait",
            ScenarioStep::Tick { .. } => "tick",
            ScenarioStep::RunUntilIdle { .. } => "run_until_idle",
            ScenarioStep::AssertOffset { .. } => "assert_offset",
            ScenarioStep::AssertState { .. } => "assert_state",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_all_step_kinds() {
        let scenario = Scenario::from_json(
            r#"{ "steps": [
                { "type": "down", "pos": 0.0 },
                { "type": "move", "pos": -25.0, "after_ms": 50 },
                { "type": "up", "pos": -50.0, "after_ms": 50 },
                { "type": "cancel" },
                { "type": "set_pos", "offset": 10.0 },
                { "type": "wait", "ms": 100 },
                { "type": "tick", "frames": 3 },
                { "type": "run_until_idle" },
                { "type": "assert_offset", "min": 0.0, "max": 900.0 },
                { "type": "assert_state", "state": "idle" }
            ]}"#,
        )
        .unwrap();

        let kinds: Vec<_> = scenario.steps.iter().map(ScenarioStep::kind).collect();
        assert_eq!(
            kinds,
            vec![
                "down",
                "move",
                "up",
                "cancel",
                "set_pos",
                "wait",
                "tick",
                "run_until_idle",
                "assert_offset",
                "assert_state",
            ]
        );

        match &scenario.steps[1] {
            ScenarioStep::Move { pos, after_ms } => {
                assert_eq!(*pos, -25.0);
                assert_eq!(*after_ms, 50.0);
            }
            other => panic!("unexpected step {other:?}"),
        }
        match &scenario.steps[7] {
            ScenarioStep::RunUntilIdle { max_frames } => assert_eq!(*max_frames, 1000),
            other => panic!("unexpected step {other:?}"),
        }
    }

    #[test]
    fn test_state_names_are_snake_case() {
        let scenario = Scenario::from_json(
            r#"{ "steps": [{ "type": "assert_state", "state": "bounce_overshoot" }] }"#,
        )
        .unwrap();
        match &scenario.steps[0] {
            ScenarioStep::AssertState { state } => {
                assert_eq!(*state, ScrollState::BounceOvershoot)
            }
            other => panic!("unexpected step {other:?}"),
        }
    }

    #[test]
    fn test_unknown_step_rejected() {
        assert!(Scenario::from_json(r#"{ "steps": [{ "type": "fling" }] }"#).is_err());
        assert!(Scenario::from_json(r#"{ "steps": [{ "type": "move" }] }"#).is_err());
    }
}
