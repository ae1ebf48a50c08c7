//! @ai:module:intent Configuration structs for log analysis and comparison
//! @ai:module:layer infrastructure
//! @ai:module:public_api AnalysisConfig, PathConfig, ComparisonConfig, LayoutConfig, expand_path
//! @ai:module:stateless true

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// @ai:intent Main configuration for the analysis tool
/// @ai:effects pure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub paths: PathConfig,
    #[serde(default)]
    pub comparison: ComparisonConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
}

/// @ai:intent Input and output locations
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathConfig {
    /// Root holding `reports/` and `csv/`; `~` and `$VAR` are expanded on use.
    #[serde(default = "default_results_dir")]
    pub results_dir: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

/// @ai:intent Baseline selection settings
/// @ai:effects pure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    #[serde(default)]
    pub reference_baseline: Option<String>,
}

/// @ai:intent Naming conventions of the reports directory tree
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_variant_suffix")]
    pub variant_suffix: String,
    #[serde(default = "default_canonical_output")]
    pub canonical_output: String,
    #[serde(default = "default_run_prefix")]
    pub run_prefix: String,
    #[serde(default = "default_reference_run")]
    pub reference_run: String,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            output_dir: default_output_dir(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            variant_suffix: default_variant_suffix(),
            canonical_output: default_canonical_output(),
            run_prefix: default_run_prefix(),
            reference_run: default_reference_run(),
        }
    }
}

fn default_results_dir() -> String {
    "results".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_variant_suffix() -> String {
    "_dpf".to_string()
}

fn default_canonical_output() -> String {
    "speccmds.stdout".to_string()
}

fn default_run_prefix() -> String {
    "run_".to_string()
}

fn default_reference_run() -> String {
    "ref".to_string()
}

impl AnalysisConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_config(path)?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// @ai:intent Load the benchsuite KEY=VALUE configuration format
    /// @ai:effects fs:read
    pub fn load_legacy(path: &Path) -> Result<Self> {
        let content = read_config(path)?;
        Ok(Self::from_legacy_str(&content))
    }

    /// @ai:intent Build configuration from KEY=VALUE lines
    /// @ai:effects pure
    /// @ai:edge_cases unknown keys and lines without '=' are ignored
    pub fn from_legacy_str(content: &str) -> Self {
        let mut config = Self::default();

        for line in content.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();

            match key.trim() {
                "REFERENCE_BASELINE" => {
                    config.comparison.reference_baseline =
                        (!value.is_empty()).then(|| value.to_string());
                }
                "RESULTS_DIR" if !value.is_empty() => {
                    config.paths.results_dir = value.to_string();
                }
                _ => {}
            }
        }

        config
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// @ai:intent Resolve the results root with home and environment expansion
    /// @ai:effects env:read
    pub fn results_dir(&self) -> PathBuf {
        expand_path(&self.paths.results_dir)
    }

    /// @ai:intent Directory holding the timestamped run directories
    /// @ai:effects env:read
    pub fn reports_dir(&self) -> PathBuf {
        self.results_dir().join("reports")
    }

    /// @ai:intent Configured baseline, treating an empty value as unset
    /// @ai:effects pure
    pub fn reference_baseline(&self) -> Option<&str> {
        self.comparison
            .reference_baseline
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// @ai:intent Expand a leading `~` and `$VAR` / `${VAR}` references
/// @ai:effects env:read
/// @ai:edge_cases unset variables are left verbatim
pub fn expand_path(raw: &str) -> PathBuf {
    let with_vars = expand_vars(raw, |name| std::env::var(name).ok());

    let expanded = match with_vars.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match std::env::var("HOME") {
            Ok(home) => format!("{home}{rest}"),
            Err(_) => with_vars,
        },
        _ => with_vars,
    };

    PathBuf::from(expanded)
}

fn expand_vars(raw: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            }
        } else {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], end)
        };

        match (name.is_empty(), lookup(name)) {
            (false, Some(value)) => out.push_str(&value),
            _ => out.push_str(&rest[pos..pos + 1 + consumed]),
        }
        rest = &after[consumed..];
    }

    out.push_str(rest);
    out
}
