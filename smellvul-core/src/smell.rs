//! God Class classification
//!
//! A class is a God Class when it accesses a lot of foreign data, is very
//! complex, and has low cohesion, all three at once:
//! - ATFD > few (10)
//! - WMC >= very high (50)
//! - TCC < one third (0.33)
//!
//! Global invariants enforced:
//! - Pure and deterministic: the verdict depends only on the metric triple
//! - Conditions are combined with AND

use crate::metrics::MetricTriple;

/// Thresholds for the God Class rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GodClassThresholds {
    /// ATFD must be strictly greater than this
    pub atfd_few: usize,
    /// WMC must be at least this
    pub wmc_very_high: f64,
    /// TCC must be strictly less than this
    pub tcc_max: f64,
}

impl Default for GodClassThresholds {
    fn default() -> Self {
        GodClassThresholds {
            atfd_few: 10,
            wmc_very_high: 50.0,
            tcc_max: 0.33,
        }
    }
}

/// Classify with default thresholds
pub fn is_god_class(metrics: &MetricTriple) -> bool {
    is_god_class_with_thresholds(metrics, &GodClassThresholds::default())
}

/// Classify with custom thresholds
pub fn is_god_class_with_thresholds(
    metrics: &MetricTriple,
    thresholds: &GodClassThresholds,
) -> bool {
    metrics.atfd > thresholds.atfd_few
        && metrics.wmc >= thresholds.wmc_very_high
        && metrics.tcc < thresholds.tcc_max
}
