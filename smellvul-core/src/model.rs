//! Code model interface
//!
//! The metric extractor never talks to an analysis tool directly. It sees the
//! code base through three narrow traits: a model yields classes, a class yields
//! its defined methods and precomputed metrics, a method yields the entities it
//! references together with the relation they were referenced under.
//!
//! `ModelSnapshot` is the one concrete adapter: a JSON export of the external
//! code model. Tests build it in memory.
//!
//! Global invariants enforced:
//! - Classes and methods are yielded in declaration order
//! - Unresolved and unknown references are never yielded

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

/// Relation under which a method references another entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Call,
    Use,
    Set,
}

/// Kind of a referenced entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Method,
    Variable,
}

/// A method defined on a class
pub trait MethodEntity {
    fn long_name(&self) -> &str;

    /// Distinct long names of resolved, known entities referenced under any of
    /// `relations` whose kind is one of `kinds`, in first-reference order.
    fn referenced_entities(&self, relations: &[Relation], kinds: &[EntityKind]) -> Vec<&str>;
}

/// A class entity; exclusively owns its methods for one analysis pass
pub trait ClassEntity {
    type Method: MethodEntity;

    fn long_name(&self) -> &str;

    /// Methods in declaration order
    fn defined_methods(&self) -> &[Self::Method];

    /// Look up precomputed metrics; names without a value are omitted
    fn metric(&self, names: &[&str]) -> HashMap<String, f64>;
}

/// An opened code model
pub trait CodeModel {
    type Class: ClassEntity;

    fn classes(&self) -> &[Self::Class];
}

/// Exported code model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSnapshot {
    #[serde(default)]
    pub classes: Vec<ClassRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassRecord {
    pub long_name: String,
    #[serde(default)]
    pub methods: Vec<MethodRecord>,
    /// Metric values keyed by tool metric name (e.g. `SumCyclomaticModified`).
    /// `null` means the tool has no value for this class.
    #[serde(default)]
    pub metrics: BTreeMap<String, Option<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodRecord {
    pub long_name: String,
    #[serde(default)]
    pub references: Vec<Reference>,
}

/// One reference from a method to another entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reference {
    pub long_name: String,
    pub relation: Relation,
    pub kind: EntityKind,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unresolved: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unknown: bool,
}

impl Reference {
    pub fn new(long_name: &str, relation: Relation, kind: EntityKind) -> Self {
        Reference {
            long_name: long_name.to_string(),
            relation,
            kind,
            unresolved: false,
            unknown: false,
        }
    }

    fn is_known(&self) -> bool {
        !self.unresolved && !self.unknown
    }
}

impl MethodRecord {
    pub fn new(long_name: &str, references: Vec<Reference>) -> Self {
        MethodRecord {
            long_name: long_name.to_string(),
            references,
        }
    }
}

impl ClassRecord {
    pub fn new(long_name: &str, methods: Vec<MethodRecord>) -> Self {
        ClassRecord {
            long_name: long_name.to_string(),
            methods,
            metrics: BTreeMap::new(),
        }
    }

    /// Builder-style metric setter
    pub fn with_metric(mut self, name: &str, value: f64) -> Self {
        self.metrics.insert(name.to_string(), Some(value));
        self
    }
}

impl MethodEntity for MethodRecord {
    fn long_name(&self) -> &str {
        &self.long_name
    }

    fn referenced_entities(&self, relations: &[Relation], kinds: &[EntityKind]) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.references
            .iter()
            .filter(|r| r.is_known())
            .filter(|r| relations.contains(&r.relation) && kinds.contains(&r.kind))
            .map(|r| r.long_name.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }
}

impl ClassEntity for ClassRecord {
    type Method = MethodRecord;

    fn long_name(&self) -> &str {
        &self.long_name
    }

    fn defined_methods(&self) -> &[MethodRecord] {
        &self.methods
    }

    fn metric(&self, names: &[&str]) -> HashMap<String, f64> {
        names
            .iter()
            .filter_map(|name| {
                self.metrics
                    .get(*name)
                    .copied()
                    .flatten()
                    .map(|v| (name.to_string(), v))
            })
            .collect()
    }
}

impl CodeModel for ModelSnapshot {
    type Class = ClassRecord;

    fn classes(&self) -> &[ClassRecord] {
        &self.classes
    }
}

impl ModelSnapshot {
    pub fn new(classes: Vec<ClassRecord>) -> Self {
        ModelSnapshot { classes }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to parse code model")
    }
}

/// Load an exported code model from disk
pub fn load_model(path: &Path) -> Result<ModelSnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read code model: {}", path.display()))?;
    ModelSnapshot::from_json(&content)
        .with_context(|| format!("invalid code model in: {}", path.display()))
}
