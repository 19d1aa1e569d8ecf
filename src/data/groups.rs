//! Two-group sample assignment for a differential comparison.

use crate::data::SampleMetadata;
use crate::error::{DaaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Control and treatment sample sets.
///
/// Both sets are non-empty, disjoint and list each sample once. Groups
/// with a single member are accepted; every row's test is then undefined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAssignment {
    control: Vec<String>,
    treatment: Vec<String>,
}

impl GroupAssignment {
    /// Create an assignment from explicit sample lists.
    pub fn new(control: Vec<String>, treatment: Vec<String>) -> Result<Self> {
        if control.is_empty() {
            return Err(DaaError::EmptyGroup("control".to_string()));
        }
        if treatment.is_empty() {
            return Err(DaaError::EmptyGroup("treatment".to_string()));
        }
        for (label, members) in [("control", &control), ("treatment", &treatment)] {
            if let Some(repeated) = first_repeated(members) {
                return Err(DaaError::InvalidParameter(format!(
                    "Sample '{}' listed more than once in {}",
                    repeated, label
                )));
            }
        }
        if let Some(shared) = control.iter().find(|s| treatment.contains(s)) {
            return Err(DaaError::InvalidParameter(format!(
                "Sample '{}' assigned to both control and treatment",
                shared
            )));
        }
        if control.len() < 2 || treatment.len() < 2 {
            log::warn!(
                "groups of size {} (control) and {} (treatment); Welch test needs at least two per group",
                control.len(),
                treatment.len()
            );
        }
        Ok(Self { control, treatment })
    }

    /// Resolve two condition labels through sample metadata.
    pub fn from_conditions(
        metadata: &SampleMetadata,
        control_label: &str,
        treatment_label: &str,
    ) -> Result<Self> {
        let control = metadata.samples_in(control_label);
        if control.is_empty() {
            return Err(DaaError::EmptyGroup(control_label.to_string()));
        }
        let treatment = metadata.samples_in(treatment_label);
        if treatment.is_empty() {
            return Err(DaaError::EmptyGroup(treatment_label.to_string()));
        }
        Self::new(control, treatment)
    }

    /// Control sample identifiers.
    pub fn control(&self) -> &[String] {
        &self.control
    }

    /// Treatment sample identifiers.
    pub fn treatment(&self) -> &[String] {
        &self.treatment
    }
}

fn first_repeated(members: &[String]) -> Option<&str> {
    let mut seen: HashSet<&str> = HashSet::new();
    for member in members {
        if !seen.insert(member.as_str()) {
            return Some(member.as_str());
        }
    }
    None
}
