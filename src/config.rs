//! Configuration management for the Petstore tooling
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (petstore.toml)
//! - Environment variables (PETSTORE__*)
//!
//! ## Example config file (petstore.toml):
//! ```toml
//! [client]
//! base_url = "https://petstore3.swagger.io/api/v3"
//!
//! [export]
//! target = "typescript"
//! output_format = "pretty"
//! indent = 2
//! include_descriptions = true
//!
//! [lint]
//! deny_warnings = false
//! allow = ["opaque-response"]
//! ```

use std::path::Path;

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::codegen::{RenderOptions, Target};
use crate::error::{Result, SchemaError};
use crate::lint::RegistryLinter;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PetstoreConfig {
    /// Request preparation settings
    #[serde(default)]
    pub client: ClientConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Linter settings
    #[serde(default)]
    pub lint: LintConfig,
}

/// Request preparation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL that endpoint paths are appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Default export target
    #[serde(default = "default_target")]
    pub target: Target,

    /// Output format for JSON targets (pretty or compact)
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Spaces per indentation level in TypeScript output
    #[serde(default = "default_indent")]
    pub indent: usize,

    /// Emit descriptions as doc comments / annotations
    #[serde(default = "default_true")]
    pub include_descriptions: bool,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

/// Linter configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LintConfig {
    /// Treat warnings as failures
    #[serde(default)]
    pub deny_warnings: bool,

    /// Lint codes that are never reported
    #[serde(default)]
    pub allow: Vec<String>,
}

// Default value functions
fn default_base_url() -> String {
    "https://petstore3.swagger.io/api/v3".to_string()
}

fn default_target() -> Target {
    Target::TypeScript
}

fn default_indent() -> usize {
    2
}

fn default_true() -> bool {
    true
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            output_format: OutputFormat::Pretty,
            indent: default_indent(),
            include_descriptions: true,
        }
    }
}

impl ExportConfig {
    /// Rendering options for the exporters
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            indent: self.indent,
            descriptions: self.include_descriptions,
            compact: self.output_format == OutputFormat::Compact,
        }
    }
}

impl LintConfig {
    /// A linter with the configured codes suppressed
    pub fn linter(&self) -> RegistryLinter {
        RegistryLinter::new().allow(self.allow.iter().cloned())
    }
}

impl PetstoreConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, layering an explicit file over the default locations
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = ["petstore.toml", ".petstore.toml", "config/petstore.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(project_dirs) = directories::ProjectDirs::from("io", "swagger", "petstore") {
            let xdg_config = project_dirs.config_dir().join("petstore.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // PETSTORE__EXPORT__INDENT=4, PETSTORE__LINT__ALLOW=a,b
        builder = builder.add_source(
            Environment::with_prefix("PETSTORE")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("lint.allow"),
        );

        let config = builder.build()?;
        let loaded: Self = config.try_deserialize()?;
        tracing::debug!(base_url = %loaded.client.base_url, export_target = %loaded.export.target, "configuration loaded");
        Ok(loaded)
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Parsed base URL
    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.client.base_url)?;
        if url.cannot_be_a_base() {
            return Err(SchemaError::InvalidBaseUrl(self.client.base_url.clone()));
        }
        Ok(url)
    }
}
