//! Configuration file support
//!
//! Loads `smellvul.config.json` from the project root (or an explicit path).
//! The file lists the vulnerability data of each project for the
//! configured-paths fusion and may override the God Class thresholds.
//!
//! All fields are optional. Relative paths are resolved against the directory
//! that contains the config file.

use crate::fusion::configured::VulnerabilitySource;
use crate::smell::GodClassThresholds;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Fixed, project-relative config file name
pub const CONFIG_FILE_NAME: &str = "smellvul.config.json";

/// Output root used when the config does not name one
pub const DEFAULT_OUTPUT_ROOT: &str = "output";

/// Configuration as written in the config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SmellVulConfig {
    /// Directory containing `smells/` and receiving `smell&vul/`
    #[serde(default)]
    pub output_root: Option<PathBuf>,

    /// Ordered (project, vulnerability file) pairs
    #[serde(default)]
    pub vulnerabilities: Vec<VulnerabilitySource>,

    /// God Class threshold overrides
    #[serde(default)]
    pub thresholds: Option<ThresholdConfig>,
}

/// God Class threshold overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdConfig {
    /// ATFD must exceed this (default: 10)
    pub atfd: Option<usize>,
    /// WMC must reach this (default: 50)
    pub wmc: Option<f64>,
    /// TCC must stay below this (default: 0.33)
    pub tcc: Option<f64>,
}

/// Configuration with defaults applied and paths made absolute
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub output_root: PathBuf,
    pub vulnerabilities: Vec<VulnerabilitySource>,
    pub thresholds: GodClassThresholds,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl SmellVulConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(ref t) = self.thresholds {
            if let Some(wmc) = t.wmc {
                if wmc < 0.0 {
                    anyhow::bail!("thresholds.wmc must be non-negative (got {})", wmc);
                }
            }
            if let Some(tcc) = t.tcc {
                if !(0.0..=1.0).contains(&tcc) {
                    anyhow::bail!("thresholds.tcc must be between 0 and 1 (got {})", tcc);
                }
            }
        }

        let mut seen = HashSet::new();
        for (i, source) in self.vulnerabilities.iter().enumerate() {
            let name = source.project.trim();
            if name.is_empty() {
                anyhow::bail!("vulnerabilities[{}].project must not be empty", i);
            }
            if name.contains('/') || name.contains('\\') {
                anyhow::bail!(
                    "vulnerabilities[{}].project must not contain path separators (got {})",
                    i,
                    source.project
                );
            }
            if !seen.insert(source.project.as_str()) {
                anyhow::bail!("duplicate project in vulnerabilities: {}", source.project);
            }
            if source.path.as_os_str().is_empty() {
                anyhow::bail!("vulnerabilities[{}].path must not be empty", i);
            }
        }

        Ok(())
    }

    /// Resolve config relative to `base_dir`
    pub fn resolve(&self, base_dir: &Path) -> Result<ResolvedConfig> {
        self.validate()?;

        let defaults = GodClassThresholds::default();
        let thresholds = match &self.thresholds {
            Some(t) => GodClassThresholds {
                atfd_few: t.atfd.unwrap_or(defaults.atfd_few),
                wmc_very_high: t.wmc.unwrap_or(defaults.wmc_very_high),
                tcc_max: t.tcc.unwrap_or(defaults.tcc_max),
            },
            None => defaults,
        };

        let output_root = base_dir.join(
            self.output_root
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_ROOT)),
        );

        let vulnerabilities = self
            .vulnerabilities
            .iter()
            .map(|source| VulnerabilitySource {
                project: source.project.clone(),
                path: base_dir.join(&source.path),
            })
            .collect();

        Ok(ResolvedConfig {
            output_root,
            vulnerabilities,
            thresholds,
            config_path: None,
        })
    }
}

/// Look for `smellvul.config.json` in the project root
pub fn discover_config(project_root: &Path) -> Result<Option<(SmellVulConfig, PathBuf)>> {
    let path = project_root.join(CONFIG_FILE_NAME);
    if path.exists() {
        let config = load_config_file(&path)?;
        return Ok(Some((config, path)));
    }
    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<SmellVulConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: SmellVulConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config for a project
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config in the project root.
/// Returns default config if nothing is found.
pub fn load_and_resolve(project_root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(project_root)? {
            Some((config, path)) => (config, Some(path)),
            None => (SmellVulConfig::default(), None),
        }
    };

    let base_dir = source_path
        .as_deref()
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(project_root)
        .to_path_buf();

    let mut resolved = config.resolve(&base_dir)?;
    resolved.config_path = source_path;
    Ok(resolved)
}
