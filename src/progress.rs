//! Progress reporting for pipeline stages.
//!
//! Library code never prints. Callers pass a [`ProgressSink`] to observe
//! stage transitions; [`Silent`] discards them and [`LogProgress`] forwards
//! them to the `log` facade.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// A named pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    FilterAnnotations,
    ProjectColumns,
    CleanIdentities,
    Log2Transform,
    MedianNormalize,
    Impute,
    WelchTest,
    CorrectBh,
}

impl Stage {
    /// Get the descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FilterAnnotations => "filter_annotations",
            Self::ProjectColumns => "project_columns",
            Self::CleanIdentities => "clean_identities",
            Self::Log2Transform => "log2_transform",
            Self::MedianNormalize => "median_normalize",
            Self::Impute => "impute",
            Self::WelchTest => "welch_test",
            Self::CorrectBh => "correct_bh",
        }
    }
}

/// Receiver of stage completion events.
pub trait ProgressSink: Send + Sync {
    /// Called once when a stage has finished.
    fn stage_done(&self, stage: Stage, detail: &str);
}

/// Discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl ProgressSink for Silent {
    fn stage_done(&self, _stage: Stage, _detail: &str) {}
}

/// Forwards events to `log::info!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn stage_done(&self, stage: Stage, detail: &str) {
        log::info!("[{}] {}", stage.name(), detail);
    }
}

/// Records events in memory.
#[derive(Debug, Default)]
pub struct Recorder {
    events: Mutex<Vec<(Stage, String)>>,
}

impl Recorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages seen so far, in order.
    pub fn stages(&self) -> Vec<Stage> {
        self.events
            .lock()
            .map(|events| events.iter().map(|(s, _)| *s).collect())
            .unwrap_or_default()
    }

    /// All recorded events.
    pub fn events(&self) -> Vec<(Stage, String)> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl ProgressSink for Recorder {
    fn stage_done(&self, stage: Stage, detail: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push((stage, detail.to_string()));
        }
    }
}
