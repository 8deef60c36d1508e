//! Directory-scan fusion
//!
//! For every `<project>-<version>-...-overall.csv` below the smell directory,
//! counts the rows of `<vul_dir>/<project>.csv` whose `version` starts with
//! `<version>`, per class, and writes
//! `<smell_dir>/smell&vul/<project>-<version>.csv` with columns
//! `version`, the smell columns, `Vulnerability`.

use super::{fusion_dir, FusionSummary, FusionWarning};
use crate::error::FusionError;
use crate::table::{merge_headers, Row, Table};
use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Suffix of the per-version smell summary files
pub const OVERALL_SUFFIX: &str = "-overall.csv";

/// Smell file column holding the class name
pub const SMELL_NAME_COLUMN: &str = "Name";
/// Vulnerability file columns
pub const VUL_VERSION_COLUMN: &str = "version";
pub const VUL_CLASS_COLUMN: &str = "class";
/// Columns added to the output
pub const VERSION_COLUMN: &str = "version";
pub const VULNERABILITY_COLUMN: &str = "Vulnerability";

fn version_regex() -> &'static Regex {
    static VERSION_RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    VERSION_RE.get_or_init(|| Regex::new(r"\d+\.\d+\.\d+").unwrap())
}

/// A smell row stamped with its version and vulnerability count
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedSmell {
    pub row: Row,
    /// `None` when no vulnerability matched the class
    pub vulnerabilities: Option<usize>,
}

/// Recursively collect smell-overall files, sorted for deterministic order
pub fn find_smell_overalls(smell_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(smell_dir).sort_by_file_name() {
        let entry = entry
            .with_context(|| format!("failed to walk smell directory: {}", smell_dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if name.ends_with(OVERALL_SUFFIX) {
                files.push(entry.into_path());
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Extract (project, version) from a smell-overall file name
///
/// The version is the first `<digits>.<digits>.<digits>` token; the project is
/// everything before the first `-<version>-`.
pub fn parse_project_version(path: &Path) -> std::result::Result<(String, String), FusionError> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let version = version_regex()
        .find(&filename)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| FusionError::MalformedFilename {
            filename: filename.clone(),
        })?;

    let separator = format!("-{}-", version);
    let project = filename
        .split(separator.as_str())
        .next()
        .unwrap_or_default()
        .to_string();

    Ok((project, version))
}

/// Stamp smell rows with `version` and count matching vulnerabilities
///
/// Smell rows are keyed by `Name`; a repeated name keeps its first position and
/// takes the later row's values. A vulnerability matches when its `version`
/// starts with `version` and its `class` equals a smell `Name`.
pub fn count_vulnerabilities(
    smells: &Table,
    vulnerabilities: &Table,
    project: &str,
    version: &str,
) -> (Vec<VersionedSmell>, Vec<FusionWarning>) {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut stamped: Vec<VersionedSmell> = Vec::new();

    for row in &smells.rows {
        let name = row.get(SMELL_NAME_COLUMN).cloned().unwrap_or_default();
        let mut row = row.clone();
        row.insert(VERSION_COLUMN.to_string(), version.to_string());
        let entry = VersionedSmell {
            row,
            vulnerabilities: None,
        };
        match index.get(&name) {
            Some(&i) => stamped[i] = entry,
            None => {
                index.insert(name, stamped.len());
                stamped.push(entry);
            }
        }
    }

    let mut warnings = Vec::new();
    for vul in &vulnerabilities.rows {
        let vul_version = vul.get(VUL_VERSION_COLUMN).map(String::as_str).unwrap_or("");
        if !vul_version.starts_with(version) {
            continue;
        }
        let class = vul.get(VUL_CLASS_COLUMN).map(String::as_str).unwrap_or("");
        match index.get(class) {
            Some(&i) => {
                let count = stamped[i].vulnerabilities.get_or_insert(0);
                *count += 1;
            }
            None => warnings.push(FusionWarning::UnmatchedVulnerability {
                project: project.to_string(),
                version: version.to_string(),
                class: class.to_string(),
            }),
        }
    }

    (stamped, warnings)
}

/// Build the output table: `version` + smell columns + `Vulnerability`
pub fn to_output_table(smell_headers: &[String], smells: Vec<VersionedSmell>) -> Table {
    let leading = [VERSION_COLUMN.to_string()];
    let trailing = [VULNERABILITY_COLUMN.to_string()];
    let headers = merge_headers(&[&leading[..], smell_headers, &trailing[..]]);

    let rows = smells
        .into_iter()
        .map(|smell| {
            let mut row = smell.row;
            if let Some(count) = smell.vulnerabilities {
                row.insert(VULNERABILITY_COLUMN.to_string(), count.to_string());
            }
            row
        })
        .collect();

    Table::new(headers, rows)
}

/// Fuse one smell-overall file with its project's vulnerability file
pub fn combine_file(
    smell_path: &Path,
    vul_path: &Path,
    project: &str,
    version: &str,
) -> Result<(Table, Vec<FusionWarning>)> {
    let smells = Table::read(smell_path)?;
    smells
        .require_columns(&[SMELL_NAME_COLUMN])
        .with_context(|| format!("invalid smell file: {}", smell_path.display()))?;
    let vulnerabilities = Table::read(vul_path)?;
    vulnerabilities
        .require_columns(&[VUL_VERSION_COLUMN, VUL_CLASS_COLUMN])
        .with_context(|| format!("invalid vulnerability file: {}", vul_path.display()))?;

    let (stamped, warnings) = count_vulnerabilities(&smells, &vulnerabilities, project, version);
    Ok((to_output_table(&smells.headers, stamped), warnings))
}

/// Run the directory-scan fusion over `smell_dir`
///
/// # Errors
///
/// Fails on a smell-overall file name without a version token
/// (`FusionError::MalformedFilename`) or if the smell directory cannot be walked.
/// Missing or unreadable per-project inputs are logged and skipped.
pub fn combine_vulnerabilities(smell_dir: &Path, vul_dir: &Path) -> Result<FusionSummary> {
    log::info!("Start combining vulnerability data");
    let overalls = find_smell_overalls(smell_dir)?;
    let out_dir = fusion_dir(smell_dir);
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create directory: {}", out_dir.display()))?;

    let mut summary = FusionSummary::default();
    for smell_path in overalls {
        let (project, version) = parse_project_version(&smell_path)?;
        let label = format!("{}-{}", project, version);
        let vul_path = vul_dir.join(format!("{}.csv", project));
        let out_path = out_dir.join(format!("{}.csv", label));

        if !vul_path.exists() {
            log::warn!(
                "Vulnerability data file for {} does not exist: {}. Skip.",
                project,
                vul_path.display()
            );
            summary.skip(&label, format!("missing vulnerability file: {}", vul_path.display()));
            continue;
        }

        let result = combine_file(&smell_path, &vul_path, &project, &version)
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
                log::error!("Failed to combine {}: {:#}", label, e);
                summary.skip(&label, format!("{:#}", e));
            }
        }
    }

    log::info!("Combining vulnerability data done");
    Ok(summary)
}
