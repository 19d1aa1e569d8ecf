//! Analysis configuration and end-to-end runner.

use crate::data::{
    CleanMatrix, GroupAssignment, RawIntensityTable, ResultsTable, SampleMetadata, TableLayout,
};
use crate::error::{DaaError, Result};
use crate::pipeline::clean::{clean_with, CleanReport, PreprocessConfig};
use crate::pipeline::differential::{test_differential_with, TestConfig};
use crate::progress::{ProgressSink, Silent};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Analysis configuration for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Name of the analysis.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Column naming of the intensity table.
    pub layout: TableLayout,
    /// Condition label of the control group.
    pub control: String,
    /// Condition label of the treatment group.
    pub treatment: String,
    /// Preprocessing options.
    pub preprocess: PreprocessConfig,
    /// Testing options.
    pub test: TestConfig,
    /// Adjusted p-value threshold for regulation calls.
    pub alpha: f64,
    /// Absolute log2 fold change threshold for regulation calls.
    pub fc_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            name: "unnamed".to_string(),
            description: None,
            layout: TableLayout::default(),
            control: "control".to_string(),
            treatment: "treatment".to_string(),
            preprocess: PreprocessConfig::default(),
            test: TestConfig::default(),
            alpha: 0.05,
            fc_threshold: 1.0,
        }
    }
}

impl AnalysisConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_yaml(&fs::read_to_string(path)?)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(DaaError::from)
    }

    /// Example configuration for a MaxQuant export.
    pub fn example() -> Self {
        Self {
            name: "maxquant-two-group".to_string(),
            description: Some(
                "Welch t-test of treatment vs control on MaxQuant LFQ intensities".to_string(),
            ),
            ..Default::default()
        }
    }

    /// Check parameter ranges and group labels.
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(DaaError::InvalidParameter(format!(
                "alpha must be in (0, 1], got {}",
                self.alpha
            )));
        }
        if !(self.fc_threshold >= 0.0) {
            return Err(DaaError::InvalidParameter(format!(
                "fc_threshold must be non-negative, got {}",
                self.fc_threshold
            )));
        }
        if self.control == self.treatment {
            return Err(DaaError::InvalidParameter(format!(
                "control and treatment labels are both '{}'",
                self.control
            )));
        }
        Ok(())
    }
}

/// Everything an analysis run produces.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    /// Clean matrix handed to the testing engine.
    pub clean: CleanMatrix,
    /// Preprocessing report.
    pub report: CleanReport,
    /// Groups that were compared.
    pub groups: GroupAssignment,
    /// Per-protein results.
    pub results: ResultsTable,
}

/// Builder for configuring and running an analysis.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: AnalysisConfig,
}

impl Pipeline {
    /// Create a pipeline with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from a config.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Set the analysis name.
    pub fn name(mut self, name: &str) -> Self {
        self.config.name = name.to_string();
        self
    }

    /// Set the table layout.
    pub fn layout(mut self, layout: TableLayout) -> Self {
        self.config.layout = layout;
        self
    }

    /// Set the control and treatment condition labels.
    pub fn compare(mut self, control: &str, treatment: &str) -> Self {
        self.config.control = control.to_string();
        self.config.treatment = treatment.to_string();
        self
    }

    /// Ignore intensity columns without metadata.
    pub fn allow_unmapped_samples(mut self, allow: bool) -> Self {
        self.config.preprocess.allow_unmapped_samples = allow;
        self
    }

    /// Toggle parallel per-protein testing.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.test.parallel = parallel;
        self
    }

    /// Set regulation thresholds.
    pub fn thresholds(mut self, alpha: f64, fc_threshold: f64) -> Self {
        self.config.alpha = alpha;
        self.config.fc_threshold = fc_threshold;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run without progress reporting.
    pub fn run(&self, raw: &RawIntensityTable, metadata: &SampleMetadata) -> Result<AnalysisOutput> {
        self.run_with_progress(raw, metadata, &Silent)
    }

    /// Run preprocessing and differential testing.
    ///
    /// Groups are resolved before preprocessing, so an empty group fails
    /// without any numeric work.
    pub fn run_with_progress(
        &self,
        raw: &RawIntensityTable,
        metadata: &SampleMetadata,
        progress: &dyn ProgressSink,
    ) -> Result<AnalysisOutput> {
        self.config.validate()?;
        let groups =
            GroupAssignment::from_conditions(metadata, &self.config.control, &self.config.treatment)?;

        log::info!(
            "running '{}': {} ({} samples) vs {} ({} samples)",
            self.config.name,
            self.config.treatment,
            groups.treatment().len(),
            self.config.control,
            groups.control().len()
        );

        let cleaned = clean_with(raw, metadata, &self.config.preprocess, progress)?;
        let results = test_differential_with(&cleaned.matrix, &groups, &self.config.test, progress)?;

        Ok(AnalysisOutput {
            clean: cleaned.matrix,
            report: cleaned.report,
            groups,
            results,
        })
    }
}
