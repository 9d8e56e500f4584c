//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/schema-inspector/schema-inspector.toml`
//! 3. Environment variables: `SCHEMA_INSPECTOR_*` prefix
//! 4. Command line flags (applied by the CLI layer)

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::SchemaFormat;

const APP_NAME: &str = "schema-inspector";

/// Unified configuration for schema-inspector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Root URL of the inspection service
    pub server_url: String,
    /// Directory holding persisted UI state and the generated viewer page
    pub state_dir: PathBuf,
    /// Directory downloads are saved to
    pub download_dir: PathBuf,
    /// Format choices, in selector order (the selection is persisted by index)
    pub formats: Vec<String>,
    /// Server-relative path of the spec viewer bootstrap page
    pub viewer_page: String,
    /// CSS injected into the spec viewer
    pub viewer_style: String,
    /// Command used to open URLs and generated documents
    pub browser: String,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        // Try $BROWSER, fall back to the platform opener
        let browser = std::env::var("BROWSER").unwrap_or_else(|_| default_opener().into());

        Self {
            server_url: "http://127.0.0.1:8080/inspector".into(),
            state_dir: default_state_dir(),
            download_dir: PathBuf::from("."),
            formats: vec!["SWAGGER".into(), "HTML".into()],
            viewer_page: "swagger/editor/index.html".into(),
            viewer_style: ".topbar { display: none; } body { margin: 0; }".into(),
            browser,
            timeout_secs: 30,
        }
    }
}

/// Raw settings for intermediate parsing (`None` → not specified, keep base).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub server_url: Option<String>,
    pub state_dir: Option<PathBuf>,
    pub download_dir: Option<PathBuf>,
    pub formats: Option<Vec<String>>,
    pub viewer_page: Option<String>,
    pub viewer_style: Option<String>,
    pub browser: Option<String>,
    pub timeout_secs: Option<u64>,
}

fn default_opener() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    }
}

/// Default state directory (XDG data dir, else ~/.schema-inspector).
fn default_state_dir() -> PathBuf {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.schema-inspector"))
}

/// Get the XDG config directory for schema-inspector.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(format!("{APP_NAME}.toml")))
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

fn expand(value: &str) -> String {
    shellexpand::full(value)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

impl Settings {
    /// Key-value store file.
    pub fn state_file(&self) -> PathBuf {
        self.state_dir.join("state.json")
    }

    /// Generated spec viewer page.
    pub fn viewer_document(&self) -> PathBuf {
        self.state_dir.join("swagger-viewer.html")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Parsed format choices.
    pub fn schema_formats(&self) -> Result<Vec<SchemaFormat>, ApplicationError> {
        self.formats
            .iter()
            .map(|f| f.parse::<SchemaFormat>().map_err(ApplicationError::from))
            .collect()
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        self.state_dir = PathBuf::from(expand(&self.state_dir.to_string_lossy()));
        self.download_dir = PathBuf::from(expand(&self.download_dir.to_string_lossy()));
    }

    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            server_url: overlay
                .server_url
                .clone()
                .unwrap_or_else(|| self.server_url.clone()),
            state_dir: overlay
                .state_dir
                .clone()
                .unwrap_or_else(|| self.state_dir.clone()),
            download_dir: overlay
                .download_dir
                .clone()
                .unwrap_or_else(|| self.download_dir.clone()),
            formats: overlay
                .formats
                .clone()
                .unwrap_or_else(|| self.formats.clone()),
            viewer_page: overlay
                .viewer_page
                .clone()
                .unwrap_or_else(|| self.viewer_page.clone()),
            viewer_style: overlay
                .viewer_style
                .clone()
                .unwrap_or_else(|| self.viewer_style.clone()),
            browser: overlay
                .browser
                .clone()
                .unwrap_or_else(|| self.browser.clone()),
            timeout_secs: overlay.timeout_secs.unwrap_or(self.timeout_secs),
        }
    }

    /// Load settings with layered precedence from the XDG config location.
    pub fn load() -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref())
    }

    /// Load settings with an explicit global config file.
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. `config_file`, if it exists
    /// 3. Environment variables: `SCHEMA_INSPECTOR_*` prefix
    pub fn load_from(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(path) = config_file {
            if path.exists() {
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;

        // Expand ~ and $VAR in path-like fields
        current.expand_paths();

        Ok(current)
    }

    /// Apply SCHEMA_INSPECTOR_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("SCHEMA_INSPECTOR")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("formats")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        let raw = RawSettings {
            server_url: config.get_string("server_url").ok(),
            state_dir: config.get_string("state_dir").ok().map(PathBuf::from),
            download_dir: config.get_string("download_dir").ok().map(PathBuf::from),
            formats: config.get::<Vec<String>>("formats").ok(),
            viewer_page: config.get_string("viewer_page").ok(),
            viewer_style: config.get_string("viewer_style").ok(),
            browser: config.get_string("browser").ok(),
            timeout_secs: config.get_int("timeout_secs").ok().map(|v| v.max(0) as u64),
        };

        Ok(settings.merge_with(&raw))
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# schema-inspector configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/schema-inspector/schema-inspector.toml
#   Env:    SCHEMA_INSPECTOR_* environment variables (explicit overrides)
#   Flags:  --server, --state-dir

# Root URL of the inspection service
# server_url = "http://127.0.0.1:8080/inspector"

# UI state (selected node, expanded nodes, format) and generated viewer page
# state_dir = "~/.local/share/schema-inspector"

# Where downloads are saved
# download_dir = "."

# Format choices; the selection is remembered by position, so keep the order stable
# formats = ["SWAGGER", "HTML"]

# Spec viewer bootstrap page, relative to server_url
# viewer_page = "swagger/editor/index.html"

# CSS injected into the spec viewer
# viewer_style = ".topbar { display: none; }"

# Command used to open URLs and generated pages (default: $BROWSER or xdg-open)
# browser = "firefox"

# timeout_secs = 30
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::load_from(None).expect("load defaults");
        assert!(!settings.server_url.is_empty());
        assert!(!settings.browser.is_empty());
        assert!(settings.state_file().ends_with("state.json"));
    }

    #[test]
    fn given_default_formats_when_parsed_then_swagger_first() {
        let formats = Settings::default().schema_formats().unwrap();
        assert_eq!(formats, vec![SchemaFormat::Swagger, SchemaFormat::Html]);
    }

    #[test]
    fn given_tilde_in_state_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            state_dir: PathBuf::from("~/.schema-inspector"),
            download_dir: PathBuf::from("${HOME}/Downloads"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let state = settings.state_dir.to_string_lossy();
        assert!(state.starts_with(&home), "state_dir: {}", state);
        assert!(!state.contains('~'));
        assert!(settings.download_dir.to_string_lossy().starts_with(&home));
    }

    #[test]
    fn given_partial_overlay_when_merging_then_keeps_unspecified() {
        let base = Settings::default();
        let overlay = RawSettings {
            server_url: Some("http://h:1/i".into()),
            formats: Some(vec!["HTML".into()]),
            ..RawSettings::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.server_url, "http://h:1/i");
        assert_eq!(merged.formats, vec!["HTML".to_string()]);
        assert_eq!(merged.viewer_page, base.viewer_page);
        assert_eq!(merged.timeout_secs, base.timeout_secs);
    }

    #[test]
    fn given_blank_format_when_parsing_then_config_error() {
        let settings = Settings {
            formats: vec!["SWAGGER".into(), " ".into()],
            ..Settings::default()
        };
        assert!(settings.schema_formats().is_err());
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.server_url.is_none());
    }
}
