//! JSON exporter for offline replay.
//!
//! Exports one frame per processed event batch so a run can be stepped
//! through after the fact.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use wumpus_env::Coord;

/// A single frame of simulation data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimFrame {
    /// Virtual time in milliseconds
    pub time_ms: u64,

    /// Attempt number at the time of the frame
    pub attempt: u32,

    /// Explorer position
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Coord>,

    /// Belief grid, one glyph string per row (top first)
    pub belief: Vec<String>,

    /// Event descriptions emitted since the previous frame
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
}

/// Complete simulation export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Hidden map, one glyph string per row (top first)
    pub map: Vec<String>,

    /// Virtual duration in milliseconds
    pub duration_ms: u64,

    /// All frames
    pub frames: Vec<SimFrame>,

    /// Final outcome name
    pub outcome: String,

    /// Whether the outcome matched the scenario's expectation
    pub passed: bool,
}

impl SimExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64, map: Vec<String>) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            map,
            duration_ms: 0,
            frames: Vec::new(),
            outcome: String::new(),
            passed: false,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: SimFrame) {
        self.duration_ms = frame.time_ms;
        self.frames.push(frame);
    }

    /// Finalizes the export.
    pub fn finalize(&mut self, outcome: &str, passed: bool) {
        self.outcome = outcome.to_string();
        self.passed = passed;
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
