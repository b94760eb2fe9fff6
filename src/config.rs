//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/orgchart/orgchart.toml`
//! 3. Local config: `<project_dir>/.orgchart.toml`
//! 4. Environment variables: `ORGCHART__<SECTION>__<KEY>`

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::services::Format;
use crate::application::ApplicationError;
use crate::domain::LayoutConfig;
use crate::util::path::expand_path;

/// Initial chart state and output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ChartSettings {
    /// Expand this many tiers when a snapshot carries no expanded-ids
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expand_depth: Option<usize>,
    /// Output format of `layout` and friends
    pub format: Format,
}

/// Raw layout config for intermediate parsing (`None` → inherit from base).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLayoutConfig {
    pub node_width: Option<f64>,
    pub node_height: Option<f64>,
    pub horizontal_gap: Option<f64>,
    pub row_height: Option<f64>,
    pub padding_top: Option<f64>,
    pub padding_left: Option<f64>,
    pub padding_right: Option<f64>,
    pub padding_bottom: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawChartSettings {
    pub expand_depth: Option<usize>,
    pub format: Option<Format>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_file: Option<PathBuf>,
    pub layout: RawLayoutConfig,
    pub chart: RawChartSettings,
}

/// Unified configuration for orgchart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    /// Snapshot used when a command gets no file argument
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
    pub chart: ChartSettings,
    pub layout: LayoutConfig,
}

/// Get the XDG config directory for orgchart.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "orgchart").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("orgchart.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn project_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".orgchart.toml")
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

impl LayoutConfig {
    fn merged(&self, raw: &RawLayoutConfig) -> Self {
        Self {
            node_width: raw.node_width.unwrap_or(self.node_width),
            node_height: raw.node_height.unwrap_or(self.node_height),
            horizontal_gap: raw.horizontal_gap.unwrap_or(self.horizontal_gap),
            row_height: raw.row_height.unwrap_or(self.row_height),
            padding_top: raw.padding_top.unwrap_or(self.padding_top),
            padding_left: raw.padding_left.unwrap_or(self.padding_left),
            padding_right: raw.padding_right.unwrap_or(self.padding_right),
            padding_bottom: raw.padding_bottom.unwrap_or(self.padding_bottom),
        }
    }
}

impl Settings {
    /// Merge overlay config onto self (base); overlay wins where it says something.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            data_file: overlay
                .data_file
                .clone()
                .or_else(|| self.data_file.clone()),
            chart: ChartSettings {
                expand_depth: overlay.chart.expand_depth.or(self.chart.expand_depth),
                format: overlay.chart.format.unwrap_or(self.chart.format),
            },
            layout: self.layout.merged(&overlay.layout),
        }
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(data_file) = &self.data_file {
            self.data_file = Some(expand_path(data_file));
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional project directory for local config
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(project) = project_dir {
            let local_path = project_config_path(project);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Load from a single explicit file on top of the defaults (no env, no XDG).
    pub fn load_file(path: &Path) -> Result<Self, ApplicationError> {
        let raw = load_raw_settings(path)?;
        let mut settings = Self::default().merge_with(&raw);
        settings.expand_paths();
        settings.validate()?;
        Ok(settings)
    }

    /// Apply ORGCHART__* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("ORGCHART")
                .prefix_separator("__")
                .separator("__"),
        );
        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("data_file") {
            settings.data_file = Some(PathBuf::from(val));
        }

        let layout = &mut settings.layout;
        for (key, field) in [
            ("layout.node_width", &mut layout.node_width),
            ("layout.node_height", &mut layout.node_height),
            ("layout.horizontal_gap", &mut layout.horizontal_gap),
            ("layout.row_height", &mut layout.row_height),
            ("layout.padding_top", &mut layout.padding_top),
            ("layout.padding_left", &mut layout.padding_left),
            ("layout.padding_right", &mut layout.padding_right),
            ("layout.padding_bottom", &mut layout.padding_bottom),
        ] {
            match config.get_float(key) {
                Ok(val) => *field = val,
                Err(ConfigError::NotFound(_)) => {}
                Err(e) => return Err(config_err(e)),
            }
        }

        match config.get_int("chart.expand_depth") {
            Ok(val) => {
                settings.chart.expand_depth =
                    Some(usize::try_from(val).map_err(|_| ApplicationError::Config {
                        message: format!("chart.expand_depth must not be negative: {val}"),
                    })?)
            }
            Err(ConfigError::NotFound(_)) => {}
            Err(e) => return Err(config_err(e)),
        }
        if let Ok(val) = config.get_string("chart.format") {
            settings.chart.format = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }

        Ok(settings)
    }

    /// Reject geometry the layout engine treats as a precondition violation.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let l = &self.layout;
        let invalid = |message: String| Err(ApplicationError::Config { message });
        if l.node_width <= 0.0 || l.node_height <= 0.0 {
            return invalid(format!(
                "layout node size must be positive, got {}x{}",
                l.node_width, l.node_height
            ));
        }
        if l.row_height <= 0.0 {
            return invalid(format!(
                "layout.row_height must be positive, got {}",
                l.row_height
            ));
        }
        let non_negative = [
            ("horizontal_gap", l.horizontal_gap),
            ("padding_top", l.padding_top),
            ("padding_left", l.padding_left),
            ("padding_right", l.padding_right),
            ("padding_bottom", l.padding_bottom),
        ];
        if let Some((name, value)) = non_negative.iter().find(|(_, v)| *v < 0.0) {
            return invalid(format!("layout.{name} must not be negative, got {value}"));
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# orgchart configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/orgchart/orgchart.toml
#   Local:  <project_dir>/.orgchart.toml
#   Env:    ORGCHART__<SECTION>__<KEY>, e.g. ORGCHART__LAYOUT__ROW_HEIGHT=200

# Snapshot used when no file is given (.json or .toml, ~ and $VAR expanded)
# data_file = "~/org/snapshot.json"

[chart]
# Tiers to expand when the snapshot has no expanded ids
# expand_depth = 1

# Output format: "json" or "toml"
# format = "json"

[layout]
# Node box size
# node_width = 220.0
# node_height = 90.0

# Space between sibling subtrees and beside same-level subordinates
# horizontal_gap = 40.0

# Vertical distance between level rows
# row_height = 160.0

# Canvas padding
# padding_top = 40.0
# padding_left = 40.0
# padding_right = 40.0
# padding_bottom = 40.0
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
