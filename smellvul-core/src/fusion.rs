//! Smell/vulnerability data fusion
//!
//! Two join strategies with intentionally different key semantics:
//! - `scan`: walks a smell output directory, infers (project, version) from
//!   `<project>-<version>-...-overall.csv` names and counts vulnerabilities whose
//!   version starts with the smell version, matched by class name.
//! - `configured`: takes (project, vulnerability file) pairs from config and joins
//!   rows on exact (Name, Version) equality, merging all vulnerability columns.
//!
//! Global invariants enforced:
//! - Smell rows are never dropped; unmatched ones keep an empty vulnerability field
//! - Unmatched vulnerability rows are dropped and always reported as warnings
//! - A failure inside one project never stops the other projects, except for a
//!   malformed smell file name (`FusionError::MalformedFilename`)

pub mod configured;
pub mod scan;

use std::fmt;
use std::path::{Path, PathBuf};

/// Name of the directory fused tables are written to
pub const FUSION_DIR: &str = "smell&vul";

/// Directory for fused output under `root`
pub fn fusion_dir(root: &Path) -> PathBuf {
    root.join(FUSION_DIR)
}

/// Data inconsistency noticed while joining
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FusionWarning {
    /// Vulnerability row whose class has no smell row (dropped)
    UnmatchedVulnerability {
        project: String,
        version: String,
        class: String,
    },
}

impl fmt::Display for FusionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FusionWarning::UnmatchedVulnerability {
                project,
                version,
                class,
            } => write!(
                f,
                "{} not in {}-{} smell file, vulnerability dropped",
                class, project, version
            ),
        }
    }
}

/// A project (or project version) that produced no output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedProject {
    pub project: String,
    pub reason: String,
}

/// Outcome of one fusion run
#[derive(Debug, Clone, Default)]
pub struct FusionSummary {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<SkippedProject>,
    pub warnings: Vec<FusionWarning>,
}

impl FusionSummary {
    fn warn(&mut self, warning: FusionWarning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn skip(&mut self, project: &str, reason: String) {
        self.skipped.push(SkippedProject {
            project: project.to_string(),
            reason,
        });
    }

    /// Warnings mentioning a given class
    pub fn warnings_for_class(&self, class_name: &str) -> Vec<&FusionWarning> {
        self.warnings
            .iter()
            .filter(|w| match w {
                FusionWarning::UnmatchedVulnerability { class, .. } => class == class_name,
            })
            .collect()
    }
}
