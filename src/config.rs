use crate::client::DEFAULT_API_BASE;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default)]
    pub allow_pdf: bool,

    #[serde(default)]
    pub include_content: bool,

    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,

    #[serde(default = "default_ocr_command")]
    pub ocr_command: String,

    #[serde(default = "default_ocr_languages")]
    pub ocr_languages: String,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_max_suggestions() -> usize {
    5
}

fn default_ocr_command() -> String {
    "tesseract".to_string()
}

fn default_ocr_languages() -> String {
    "eng".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            allow_pdf: false,
            include_content: false,
            max_suggestions: 5,
            ocr_command: default_ocr_command(),
            ocr_languages: default_ocr_languages(),
        }
    }
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(api_base: Option<String>, allow_pdf: bool, include_content: bool) -> Result<Self> {
        let mut config = Self::default();

        // Load global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global_config = Self::from_file(&global_path)?;
                config = config.merge(global_config);
            }
        }

        // Load local config (overrides global)
        let local_path = PathBuf::from(".turbotext.toml");
        if local_path.exists() {
            let local_config = Self::from_file(&local_path)?;
            config = config.merge(local_config);
        }

        // Apply CLI overrides
        if let Some(base) = api_base {
            config.api_base = base;
        }
        if allow_pdf {
            config.allow_pdf = true;
        }
        if include_content {
            config.include_content = true;
        }

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn merge(mut self, other: Self) -> Self {
        // Merge logic: other's values override self's if they differ from defaults
        if other.api_base != DEFAULT_API_BASE {
            self.api_base = other.api_base;
        }
        if other.allow_pdf {
            self.allow_pdf = true;
        }
        if other.include_content {
            self.include_content = true;
        }
        if other.max_suggestions != default_max_suggestions() {
            self.max_suggestions = other.max_suggestions;
        }
        if other.ocr_command != default_ocr_command() {
            self.ocr_command = other.ocr_command;
        }
        if other.ocr_languages != default_ocr_languages() {
            self.ocr_languages = other.ocr_languages;
        }
        self
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "turbotext").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_base, "http://localhost:8000");
        assert_eq!(config.max_suggestions, 5);
        assert!(!config.allow_pdf);
        assert_eq!(config.ocr_command, "tesseract");
    }

    #[test]
    fn test_merge_configs() {
        let base = Config::default();
        let override_config = Config {
            api_base: "https://analysis.example.com".to_string(),
            allow_pdf: true,
            ..Default::default()
        };

        let merged = base.merge(override_config);
        assert_eq!(merged.api_base, "https://analysis.example.com");
        assert!(merged.allow_pdf);
        assert_eq!(merged.ocr_languages, "eng");
    }

    #[test]
    fn test_parse_config_file() {
        let parsed: Config = toml::from_str(
            r#"
            api_base = "https://api.internal:9000"
            max_suggestions = 3
            ocr_languages = "eng+deu"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.api_base, "https://api.internal:9000");
        assert_eq!(parsed.max_suggestions, 3);
        assert_eq!(parsed.ocr_languages, "eng+deu");
        assert!(!parsed.include_content);
    }
}
