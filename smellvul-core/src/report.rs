//! Smell report accumulation and output
//!
//! Global invariants enforced:
//! - Entries keep the order in which classes were processed
//! - The flagged set is ordered, so output is byte-for-byte identical across runs

use crate::metrics::MetricTriple;
use crate::table::{Row, Table};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Column names of the CSV smell report
pub const REPORT_COLUMNS: &[&str] = &["Name", "ATFD", "WMC", "TCC", "GodClass"];

/// Result for one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSmellReport {
    pub class: String,
    pub god_class: bool,
    pub metrics: MetricTriple,
}

/// Accumulated result of one analysis run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SmellReport {
    pub entries: Vec<ClassSmellReport>,
    pub god_classes: BTreeSet<String>,
}

impl SmellReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one class; flagged classes also join the God Class set
    pub fn record(&mut self, class: &str, metrics: MetricTriple, god_class: bool) {
        if god_class {
            self.god_classes.insert(class.to_string());
        }
        self.entries.push(ClassSmellReport {
            class: class.to_string(),
            god_class,
            metrics,
        });
    }

    pub fn god_class_count(&self) -> usize {
        self.god_classes.len()
    }

    pub fn is_god_class(&self, class: &str) -> bool {
        self.god_classes.contains(class)
    }

    /// Convert to a table that the fusion engine can consume
    pub fn to_table(&self) -> Table {
        let headers = REPORT_COLUMNS.iter().map(|c| c.to_string()).collect();
        let rows = self
            .entries
            .iter()
            .map(|entry| {
                let values = [
                    entry.class.clone(),
                    entry.metrics.atfd.to_string(),
                    entry.metrics.wmc.to_string(),
                    entry.metrics.tcc.to_string(),
                    entry.god_class.to_string(),
                ];
                REPORT_COLUMNS
                    .iter()
                    .map(|c| c.to_string())
                    .zip(values)
                    .collect::<Row>()
            })
            .collect();
        Table::new(headers, rows)
    }

    /// Write the report as CSV
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        self.to_table().write(path)
    }
}

/// Render the report as text output
pub fn render_text(report: &SmellReport) -> String {
    let mut output = String::new();

    for entry in &report.entries {
        output.push_str(&format!(
            "God Class = {}\tATFD = {}\tWMC = {}\tTCC = {}\t{}\n",
            entry.god_class, entry.metrics.atfd, entry.metrics.wmc, entry.metrics.tcc, entry.class
        ));
    }

    output.push_str(&format!(
        "God Classes (count = {}):\n",
        report.god_class_count()
    ));
    for class in &report.god_classes {
        output.push_str(&format!("  {}\n", class));
    }

    output
}

/// Render the report as JSON output
pub fn render_json(report: &SmellReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}
