//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/btb/btb.toml`
//! 3. Local config: `<project_dir>/.btb.toml` (directory of the document)
//! 4. Environment variables: `BTB_*` prefix, `__` between section and key

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::LayoutMetrics;

/// Extra kind sources loaded into every session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CatalogConfig {
    /// TOML files with `[[kinds]]` records
    pub kind_files: Vec<PathBuf>,
}

/// Source scanning settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScanConfig {
    /// File extensions considered when scanning a directory
    pub extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["cpp".into(), "hpp".into(), "h".into()],
        }
    }
}

/// Raw layout metrics (all optional to detect "not specified").
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLayout {
    pub node_width: Option<f64>,
    pub node_height: Option<f64>,
    pub level_height: Option<f64>,
    pub horizontal_spacing: Option<f64>,
    pub padding: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCatalog {
    pub kind_files: Option<Vec<PathBuf>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawScan {
    pub extensions: Option<Vec<String>>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSettings {
    pub layout: RawLayout,
    pub catalog: RawCatalog,
    pub scan: RawScan,
}

/// Unified configuration for btb.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Canvas geometry
    pub layout: LayoutMetrics,
    pub catalog: CatalogConfig,
    pub scan: ScanConfig,
}

/// Merge arrays with union semantics and negation support.
///
/// - Items from overlay are added to base
/// - Items prefixed with `!` remove the corresponding item from the result
/// - Duplicates are de-duplicated
///
/// # Examples
/// ```ignore
/// merge_array(&["a", "b"], &["c"])       // → ["a", "b", "c"]
/// merge_array(&["a", "b"], &["!a", "c"]) // → ["b", "c"]
/// ```
pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
    let mut result: HashSet<String> = base.iter().cloned().collect();

    for pattern in overlay {
        if let Some(negated) = pattern.strip_prefix('!') {
            result.remove(negated);
        } else {
            result.insert(pattern.clone());
        }
    }

    // Convert to sorted Vec for deterministic output
    let mut vec: Vec<String> = result.into_iter().collect();
    vec.sort();
    vec
}

impl RawLayout {
    fn apply(&self, base: &LayoutMetrics) -> LayoutMetrics {
        LayoutMetrics {
            node_width: self.node_width.unwrap_or(base.node_width),
            node_height: self.node_height.unwrap_or(base.node_height),
            level_height: self.level_height.unwrap_or(base.level_height),
            horizontal_spacing: self.horizontal_spacing.unwrap_or(base.horizontal_spacing),
            padding: self.padding.unwrap_or(base.padding),
        }
    }
}

/// Get the XDG config directory for btb.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "btb").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("btb.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".btb.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand `~`, `$VAR` and `${VAR}` in path-like fields.
    ///
    /// Paths that fail to expand (unset variable) are kept as written.
    fn expand_paths(&mut self) {
        for path in &mut self.catalog.kind_files {
            let raw = path.to_string_lossy().to_string();
            if let Ok(expanded) = shellexpand::full(&raw) {
                *path = PathBuf::from(expanded.as_ref());
            }
        }
    }

    /// Resolve relative kind files against `base`.
    pub fn kind_files_relative_to(&self, base: &Path) -> Vec<PathBuf> {
        self.catalog
            .kind_files
            .iter()
            .map(|p| if p.is_absolute() { p.clone() } else { base.join(p) })
            .collect()
    }

    /// Merge overlay config onto self (base) with union semantics for arrays.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            layout: overlay.layout.apply(&self.layout),
            catalog: CatalogConfig {
                kind_files: overlay
                    .catalog
                    .kind_files
                    .clone()
                    .unwrap_or_else(|| self.catalog.kind_files.clone()),
            },
            scan: ScanConfig {
                extensions: overlay
                    .scan
                    .extensions
                    .as_ref()
                    .map(|o| merge_array(&self.scan.extensions, o))
                    .unwrap_or_else(|| self.scan.extensions.clone()),
            },
        }
    }

    /// Apply global config onto defaults with REPLACE semantics for arrays.
    ///
    /// Defaults are just examples; the global config defines the real baseline.
    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            layout: global.layout.apply(&self.layout),
            catalog: CatalogConfig {
                kind_files: global
                    .catalog
                    .kind_files
                    .clone()
                    .unwrap_or_else(|| self.catalog.kind_files.clone()),
            },
            scan: ScanConfig {
                extensions: global
                    .scan
                    .extensions
                    .clone()
                    .unwrap_or_else(|| self.scan.extensions.clone()),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional project directory for local config
    ///
    /// # Array Merge Semantics
    /// - Defaults → Global: REPLACE
    /// - Global → Local: UNION with negation support (`scan.extensions`),
    ///   REPLACE for `catalog.kind_files`
    /// - Any → Env vars: REPLACE
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.apply_global(&raw);
            }
        }

        if let Some(project) = project_dir {
            let local_path = local_config_path(project);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current
            .layout
            .validate()
            .map_err(|message| ApplicationError::Config { message })?;

        Ok(current)
    }

    /// Apply BTB_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("BTB")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("scan.extensions")
                .with_list_parse_key("catalog.kind_files"),
        );

        let config = builder.build().map_err(config_err)?;

        let layout = &mut settings.layout;
        for (key, slot) in [
            ("layout.node_width", &mut layout.node_width),
            ("layout.node_height", &mut layout.node_height),
            ("layout.level_height", &mut layout.level_height),
            ("layout.horizontal_spacing", &mut layout.horizontal_spacing),
            ("layout.padding", &mut layout.padding),
        ] {
            if let Ok(val) = config.get_float(key) {
                *slot = val;
            }
        }
        if let Ok(val) = config.get::<Vec<String>>("scan.extensions") {
            settings.scan.extensions = val;
        }
        if let Ok(val) = config.get::<Vec<PathBuf>>("catalog.kind_files") {
            settings.catalog.kind_files = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# btb configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/btb/btb.toml   (defines your baseline)
#   Local:  <project_dir>/.btb.toml  (project-specific additions)
#   Env:    BTB_* environment variables, e.g. BTB_LAYOUT__NODE_WIDTH=300
#
# Use "!ext" in local config to REMOVE an inherited scan extension.

[layout]
# node_width = 250.0
# node_height = 60.0
# level_height = 100.0
# horizontal_spacing = 20.0
# padding = 80.0

[catalog]
# Extra leaf kinds, TOML files with [[kinds]] name/description records
# kind_files = ["~/bt/kinds.toml"]

[scan]
# Extensions considered when scanning a directory for Tick() nodes
# extensions = ["cpp", "hpp", "h"]
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
