//! smellvul core library - God Class detection and smell/vulnerability data fusion

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Analysis is strictly per-class; classes never influence each other
// - No global mutable state: the code model and the report are explicit values
// - No randomness, clocks, threads, or async
// - Deterministic traversal order must be explicit
// - Identical input yields byte-for-byte identical output

pub mod config;
pub mod error;
pub mod fusion;
pub mod metrics;
pub mod model;
pub mod report;
pub mod smell;
pub mod table;

pub use config::ResolvedConfig;
pub use error::FusionError;
pub use fusion::configured::{integrate_projects, VulnerabilitySource};
pub use fusion::scan::combine_vulnerabilities;
pub use fusion::FusionSummary;
pub use metrics::{extract_metrics, MetricTriple};
pub use model::{load_model, ClassEntity, CodeModel, ModelSnapshot};
pub use report::{render_json, render_text, SmellReport};
pub use smell::{is_god_class, is_god_class_with_thresholds, GodClassThresholds};

/// Analyze every class of a code model with default thresholds
pub fn analyze_model<M: CodeModel>(model: &M) -> SmellReport {
    analyze_model_with_thresholds(model, &GodClassThresholds::default())
}

/// Analyze every class of a code model with custom thresholds
pub fn analyze_model_with_thresholds<M: CodeModel>(
    model: &M,
    thresholds: &GodClassThresholds,
) -> SmellReport {
    let mut report = SmellReport::new();
    for class in model.classes() {
        let metrics = extract_metrics(class);
        let god_class = is_god_class_with_thresholds(&metrics, thresholds);
        report.record(class.long_name(), metrics, god_class);
    }
    report
}
