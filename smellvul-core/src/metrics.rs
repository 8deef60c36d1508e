//! Class metric extraction: ATFD, WMC, TCC
//!
//! Global invariants enforced:
//! - Deterministic metric calculation (method order is the model's declaration order)
//! - Unresolved/unknown references never contribute
//! - TCC is exactly 1.0 when a class has no method pairs

use crate::model::{ClassEntity, EntityKind, MethodEntity, Relation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Metric name holding the modified cyclomatic complexity sum of a class
pub const WMC_METRIC: &str = "SumCyclomaticModified";

/// TCC value for classes with fewer than two methods
pub const TCC_NO_PAIRS: f64 = 1.0;

/// The three God Class indicators for one class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricTriple {
    pub atfd: usize,
    pub wmc: f64,
    pub tcc: f64,
}

impl MetricTriple {
    pub fn new(atfd: usize, wmc: f64, tcc: f64) -> Self {
        MetricTriple { atfd, wmc, tcc }
    }
}

/// Extract all three metrics for a class
pub fn extract_metrics<C: ClassEntity>(class: &C) -> MetricTriple {
    MetricTriple {
        atfd: atfd(class),
        wmc: wmc(class),
        tcc: tcc(class),
    }
}

/// Access To Foreign Data
///
/// Counts every called, used or set method/variable whose long name does not
/// contain the class's long name. Each entity counts once per method that
/// references it, however many times or relations it is referenced under.
pub fn atfd<C: ClassEntity>(class: &C) -> usize {
    let class_name = class.long_name();
    class
        .defined_methods()
        .iter()
        .map(|method| {
            method
                .referenced_entities(
                    &[Relation::Call, Relation::Use, Relation::Set],
                    &[EntityKind::Method, EntityKind::Variable],
                )
                .into_iter()
                .filter(|name| !name.contains(class_name))
                .count()
        })
        .sum()
}

/// Weighted Method Count, read from the model's metric facility (0 if unavailable)
pub fn wmc<C: ClassEntity>(class: &C) -> f64 {
    class
        .metric(&[WMC_METRIC])
        .get(WMC_METRIC)
        .copied()
        .unwrap_or(0.0)
}

/// Tight Class Cohesion
///
/// TCC = cohesive pairs / method pairs, where a pair is cohesive if both methods
/// use or set at least one common attribute of the class.
pub fn tcc<C: ClassEntity>(class: &C) -> f64 {
    let class_name = class.long_name();
    let accessed: Vec<HashSet<&str>> = class
        .defined_methods()
        .iter()
        .map(attributes_accessed)
        .collect();

    let mut pairs = 0usize;
    let mut shared = 0usize;
    for (i, x) in accessed.iter().enumerate() {
        for y in &accessed[i + 1..] {
            pairs += 1;
            if x.intersection(y).any(|attr| attr.contains(class_name)) {
                shared += 1;
            }
        }
    }

    if pairs == 0 {
        TCC_NO_PAIRS
    } else {
        shared as f64 / pairs as f64
    }
}

/// Long names of variables a method uses or sets
fn attributes_accessed<M: MethodEntity>(method: &M) -> HashSet<&str> {
    method
        .referenced_entities(&[Relation::Use, Relation::Set], &[EntityKind::Variable])
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassRecord, MethodRecord, Reference};

    fn use_var(name: &str) -> Reference {
        Reference::new(name, Relation::Use, EntityKind::Variable)
    }

    fn set_var(name: &str) -> Reference {
        Reference::new(name, Relation::Set, EntityKind::Variable)
    }

    fn call(name: &str) -> Reference {
        Reference::new(name, Relation::Call, EntityKind::Method)
    }

    #[test]
    fn test_tcc_no_methods_is_one() {
        let class = ClassRecord::new("pkg.Empty", vec![]);
        assert_eq!(tcc(&class), 1.0);
    }

    #[test]
    fn test_tcc_single_method_is_one() {
        let class = ClassRecord::new(
            "pkg.One",
            vec![MethodRecord::new("pkg.One.f", vec![use_var("pkg.One.x")])],
        );
        assert_eq!(tcc(&class), 1.0);
    }

    #[test]
    fn test_tcc_counts_shared_own_attributes() {
        // f-g share pkg.A.x, g-h share pkg.A.y, f-h share nothing
        let class = ClassRecord::new(
            "pkg.A",
            vec![
                MethodRecord::new("pkg.A.f", vec![use_var("pkg.A.x")]),
                MethodRecord::new("pkg.A.g", vec![set_var("pkg.A.x"), use_var("pkg.A.y")]),
                MethodRecord::new("pkg.A.h", vec![use_var("pkg.A.y")]),
            ],
        );
        assert!((tcc(&class) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_tcc_ignores_shared_foreign_attributes() {
        let class = ClassRecord::new(
            "pkg.A",
            vec![
                MethodRecord::new("pkg.A.f", vec![use_var("other.Config.level")]),
                MethodRecord::new("pkg.A.g", vec![use_var("other.Config.level")]),
            ],
        );
        assert_eq!(tcc(&class), 0.0);
    }

    #[test]
    fn test_tcc_pair_counted_once_with_many_shared() {
        let class = ClassRecord::new(
            "pkg.A",
            vec![
                MethodRecord::new("pkg.A.f", vec![use_var("pkg.A.x"), use_var("pkg.A.y")]),
                MethodRecord::new("pkg.A.g", vec![use_var("pkg.A.x"), set_var("pkg.A.y")]),
            ],
        );
        assert_eq!(tcc(&class), 1.0);
    }

    #[test]
    fn test_tcc_ignores_calls() {
        let class = ClassRecord::new(
            "pkg.A",
            vec![
                MethodRecord::new("pkg.A.f", vec![call("pkg.A.helper")]),
                MethodRecord::new("pkg.A.g", vec![call("pkg.A.helper")]),
            ],
        );
        assert_eq!(tcc(&class), 0.0);
    }

    #[test]
    fn test_atfd_counts_foreign_references_only() {
        let class = ClassRecord::new(
            "pkg.A",
            vec![
                MethodRecord::new(
                    "pkg.A.f",
                    vec![use_var("pkg.A.x"), call("pkg.B.run"), use_var("pkg.C.flag")],
                ),
                MethodRecord::new("pkg.A.g", vec![set_var("pkg.B.state"), call("pkg.A.f")]),
            ],
        );
        assert_eq!(atfd(&class), 3);
    }

    #[test]
    fn test_atfd_counts_each_entity_once_per_method() {
        let class = ClassRecord::new(
            "pkg.A",
            vec![
                MethodRecord::new(
                    "pkg.A.f",
                    vec![
                        use_var("pkg.B.state"),
                        set_var("pkg.B.state"),
                        call("pkg.B.run"),
                        call("pkg.B.run"),
                    ],
                ),
                MethodRecord::new("pkg.A.g", vec![call("pkg.B.run")]),
            ],
        );
        assert_eq!(atfd(&class), 3);
    }

    #[test]
    fn test_atfd_skips_unresolved() {
        let mut unresolved = call("ext.Lib.go");
        unresolved.unresolved = true;
        let class = ClassRecord::new(
            "pkg.A",
            vec![MethodRecord::new("pkg.A.f", vec![unresolved, call("ext.Lib.stop")])],
        );
        assert_eq!(atfd(&class), 1);
    }

    #[test]
    fn test_atfd_order_insensitive() {
        let f = MethodRecord::new("pkg.A.f", vec![call("x.X.a"), use_var("pkg.A.v")]);
        let g = MethodRecord::new("pkg.A.g", vec![call("y.Y.b"), set_var("z.Z.c")]);
        let forward = ClassRecord::new("pkg.A", vec![f.clone(), g.clone()]);
        let reversed = ClassRecord::new("pkg.A", vec![g, f]);
        assert_eq!(atfd(&forward), atfd(&reversed));
        assert_eq!(atfd(&forward), 3);
    }

    #[test]
    fn test_wmc_reads_metric() {
        let class = ClassRecord::new("pkg.A", vec![]).with_metric(WMC_METRIC, 57.0);
        assert_eq!(wmc(&class), 57.0);
    }

    #[test]
    fn test_wmc_defaults_to_zero() {
        let mut class = ClassRecord::new("pkg.A", vec![]);
        assert_eq!(wmc(&class), 0.0);
        class.metrics.insert(WMC_METRIC.to_string(), None);
        assert_eq!(wmc(&class), 0.0);
    }

    #[test]
    fn test_extract_metrics() {
        let class = ClassRecord::new(
            "pkg.A",
            vec![
                MethodRecord::new("pkg.A.f", vec![use_var("pkg.A.x"), call("pkg.B.g")]),
                MethodRecord::new("pkg.A.g", vec![use_var("pkg.A.x")]),
            ],
        )
        .with_metric(WMC_METRIC, 4.0);
        let triple = extract_metrics(&class);
        assert_eq!(triple, MetricTriple::new(1, 4.0, 1.0));
    }
}
