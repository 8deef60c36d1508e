//! Configured-paths fusion
//!
//! Each configured project has a vulnerability CSV; its smell CSV lives at
//! `<output_root>/smells/<project>.csv`. Rows are joined on exact
//! (`Name`, `Version`) equality and written to
//! `<output_root>/smell&vul/<project>.csv`.

use super::{fusion_dir, FusionSummary, FusionWarning};
use crate::table::{merge_headers, Row, Table};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Join key columns, present in both smell and vulnerability files
pub const NAME_COLUMN: &str = "Name";
pub const VERSION_COLUMN: &str = "Version";

/// Directory (under the output root) holding per-project smell files
pub const SMELLS_DIR: &str = "smells";

/// A configured (project, vulnerability file) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VulnerabilitySource {
    pub project: String,
    pub path: PathBuf,
}

/// Location of a project's smell file under `output_root`
pub fn smell_path(output_root: &Path, project: &str) -> PathBuf {
    output_root.join(SMELLS_DIR).join(format!("{}.csv", project))
}

fn row_key(row: &Row) -> (String, String) {
    (
        row.get(NAME_COLUMN).cloned().unwrap_or_default(),
        row.get(VERSION_COLUMN).cloned().unwrap_or_default(),
    )
}

/// Merge vulnerability columns into smell rows with the same (Name, Version)
///
/// Vulnerability values overwrite same-named smell values. Every smell row is
/// kept; a repeated smell key keeps its first position and the later row's
/// values. The header is the vulnerability columns followed by the smell
/// columns, each name kept at its first occurrence.
pub fn merge_vulnerabilities(
    smells: &Table,
    vulnerabilities: &Table,
    project: &str,
) -> (Table, Vec<FusionWarning>) {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut rows: Vec<Row> = Vec::new();
    for row in &smells.rows {
        let key = row_key(row);
        match index.get(&key) {
            Some(&i) => rows[i] = row.clone(),
            None => {
                index.insert(key, rows.len());
                rows.push(row.clone());
            }
        }
    }

    let mut warnings = Vec::new();
    for vul in &vulnerabilities.rows {
        let key = row_key(vul);
        match index.get(&key) {
            Some(&i) => {
                for (column, value) in vul {
                    rows[i].insert(column.clone(), value.clone());
                }
            }
            None => {
                let (class, version) = key;
                warnings.push(FusionWarning::UnmatchedVulnerability {
                    project: project.to_string(),
                    version,
                    class,
                });
            }
        }
    }

    let headers = merge_headers(&[&vulnerabilities.headers[..], &smells.headers[..]]);
    (Table::new(headers, rows), warnings)
}

/// Read both inputs for one project and merge them
pub fn merge_files(
    smell_path: &Path,
    vul_path: &Path,
    project: &str,
) -> Result<(Table, Vec<FusionWarning>)> {
    let smells = Table::read(smell_path)?;
    smells
        .require_columns(&[NAME_COLUMN, VERSION_COLUMN])
        .with_context(|| format!("invalid smell file: {}", smell_path.display()))?;
    let vulnerabilities = Table::read(vul_path)?;
    vulnerabilities
        .require_columns(&[NAME_COLUMN, VERSION_COLUMN])
        .with_context(|| format!("invalid vulnerability file: {}", vul_path.display()))?;

    Ok(merge_vulnerabilities(&smells, &vulnerabilities, project))
}

/// Fuse every configured project, in configuration order
///
/// # Errors
///
/// Only fails if the output directory cannot be created. Missing or invalid
/// inputs for a project are logged and that project is skipped.
pub fn integrate_projects(
    output_root: &Path,
    sources: &[VulnerabilitySource],
) -> Result<FusionSummary> {
    log::info!("Start integrating vulnerability data");
    let out_dir = fusion_dir(output_root);
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create directory: {}", out_dir.display()))?;

    let mut summary = FusionSummary::default();
    for source in sources {
        let project = source.project.as_str();
        let smell_path = smell_path(output_root, project);

        if !source.path.exists() {
            log::error!(
                "Vulnerability file for {} does not exist: {}",
                project,
                source.path.display()
            );
            summary.skip(
                project,
                format!("missing vulnerability file: {}", source.path.display()),
            );
            continue;
        }
        if !smell_path.exists() {
            log::error!(
                "Smell file for {} does not exist: {}",
                project,
                smell_path.display()
            );
            summary.skip(project, format!("missing smell file: {}", smell_path.display()));
            continue;
        }

        let out_path = out_dir.join(format!("{}.csv", project));
        let result = merge_files(&smell_path, &source.path, project)
            .and_then(|(table, warnings)| table.write(&out_path).map(|_| warnings));
        match result {
            Ok(warnings) => {
                for warning in warnings {
                    summary.warn(warning);
                }
                log::info!("Wrote {}", out_path.display());
                summary.written.push(out_path);
            }
            Err(e) => {
                log::error!("Failed to integrate {}: {:#}", project, e);
                summary.skip(project, format!("{:#}", e));
            }
        }
    }

    log::info!("Integrating vulnerability data done");
    Ok(summary)
}
