use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable holding the Gemini API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generative model settings
    pub gemini: GeminiConfig,

    /// Caption retrieval settings
    pub transcript: TranscriptConfig,

    /// Download settings
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API key; `GEMINI_API_KEY` takes precedence
    pub api_key: Option<String>,

    /// Model identifier
    pub model: String,

    /// Base URL of the Generative Language API
    pub api_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    /// Caption language code
    pub language: String,

    /// Optional HTTP(S) proxy for YouTube requests
    pub proxy: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// TrueType font embedded in PDF exports
    pub font_path: PathBuf,

    /// Default directory for downloads
    pub output_dir: Option<PathBuf>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            proxy: None,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            font_path: PathBuf::from("NotoSans-Regular.ttf"),
            output_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from `path`, the usual locations, or defaults
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => Self::config_path().filter(|p| p.exists()),
        };

        let mut config = match config_path {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                let content = fs_err::read_to_string(&path)
                    .context("Failed to read config file")?;
                serde_yaml::from_str::<Config>(&content)
                    .context("Failed to parse config file")?
            }
            None => Self::default(),
        };

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.gemini.api_key = Some(key);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Option<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir().map(|dir| dir.join("youtube-summary").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.gemini.model.trim().is_empty() {
            anyhow::bail!("Gemini model must be configured");
        }

        let base = Url::parse(&self.gemini.api_base)
            .with_context(|| format!("Invalid Gemini API base URL: {}", self.gemini.api_base))?;
        if !matches!(base.scheme(), "http" | "https") {
            anyhow::bail!("Gemini API base URL must use HTTP or HTTPS protocol");
        }

        if self.transcript.language.trim().is_empty() {
            anyhow::bail!("Transcript language must be configured");
        }

        Ok(())
    }

    /// The API key, required before any summarizing can start
    pub fn require_api_key(&self) -> Result<&str> {
        self.gemini
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .with_context(|| {
                format!(
                    "Missing Gemini API key: set {} or gemini.api_key in the config file",
                    API_KEY_ENV
                )
            })
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Gemini Model: {}", self.gemini.model);
        println!("  Gemini API Base: {}", self.gemini.api_base);
        println!(
            "  Gemini API Key: {}",
            if self.require_api_key().is_ok() { "set" } else { "not set" }
        );
        println!("  Transcript Language: {}", self.transcript.language);
        if let Some(proxy) = &self.transcript.proxy {
            println!("  Proxy: {}", proxy);
        }
        println!("  PDF Font: {}", self.export.font_path.display());
        if let Some(dir) = &self.export.output_dir {
            println!("  Output Directory: {}", dir.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.transcript.language, "en");
        assert_eq!(config.export.font_path, PathBuf::from("NotoSans-Regular.ttf"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs_err::write(
            &path,
            "gemini:\n  model: gemini-2.5-pro\ntranscript:\n  proxy: http://127.0.0.1:8080\n",
        )
        .unwrap();

        let config = tokio_test::block_on(Config::load(Some(&path))).unwrap();
        assert_eq!(config.gemini.model, "gemini-2.5-pro");
        assert_eq!(config.transcript.language, "en");
        assert_eq!(config.transcript.proxy.as_deref(), Some("http://127.0.0.1:8080"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let mut config = Config::default();
        config.export.output_dir = Some(PathBuf::from("/tmp/summaries"));
        config.save(&path).unwrap();

        let loaded = tokio_test::block_on(Config::load(Some(&path))).unwrap();
        assert_eq!(loaded.export.output_dir, Some(PathBuf::from("/tmp/summaries")));
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = tokio_test::block_on(Config::load(Some(Path::new("/nonexistent/config.yaml"))));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_api_base() {
        let mut config = Config::default();
        config.gemini.api_base = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config.gemini.api_base = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_require_api_key() {
        let mut config = Config::default();
        assert!(config.require_api_key().is_err());

        config.gemini.api_key = Some("   ".to_string());
        assert!(config.require_api_key().is_err());

        config.gemini.api_key = Some("secret".to_string());
        assert_eq!(config.require_api_key().unwrap(), "secret");
    }
}
