use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use analysis::LlmConfig;
use gutenberg::GutenbergConfig;
use synth::SynthPolicy;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub mode: OperationMode,
    pub server: ServerConfig,
    pub gutenberg: GutenbergConfig,
    pub llm: LlmConfig,
    pub synth: SynthPolicy,
}

/// Which preset the configuration started from
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OperationMode {
    #[default]
    Standard, // Defaults throughout
    Fast,     // Short upstream timeouts, larger text cache
    Uncached, // Every submission downloads the text again
}

impl OperationMode {
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "standard" => Ok(Self::Standard),
            "fast" => Ok(Self::Fast),
            "uncached" => Ok(Self::Uncached),
            other => anyhow::bail!("Unknown BOOKGRAPH_MODE: {}", other),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// The JSON file named by `BOOKGRAPH_CONFIG`, or else the preset named by
    /// `BOOKGRAPH_MODE`, then individual environment overrides
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match lookup("BOOKGRAPH_CONFIG") {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => {
                let mode = lookup("BOOKGRAPH_MODE")
                    .map(|name| OperationMode::from_name(&name))
                    .transpose()?
                    .unwrap_or_default();
                Self::for_mode(mode)
            }
        };
        config.apply_overrides(lookup);
        Ok(config)
    }

    pub fn for_mode(mode: OperationMode) -> Self {
        match mode {
            OperationMode::Standard => Self::default(),
            OperationMode::Fast => Self::fast_mode(),
            OperationMode::Uncached => Self::uncached(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_json::from_str(&raw).with_context(|| format!("Invalid config file: {:?}", path))
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(bind_addr) = lookup("BOOKGRAPH_BIND") {
            self.server.bind_addr = bind_addr;
        }
        if let Some(mirror) = lookup("GUTENBERG_MIRROR") {
            self.gutenberg.mirror_base = mirror;
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(base_url) = lookup("OPENAI_BASE_URL") {
            self.llm.base_url = base_url;
        }
        if let Some(model) = lookup("OPENAI_MODEL") {
            self.llm.model = model;
        }
    }

    /// Short timeouts and a larger text cache
    pub fn fast_mode() -> Self {
        let mut config = Self::default();
        config.mode = OperationMode::Fast;
        config.gutenberg.request_timeout_secs = 10;
        config.gutenberg.cache_max_entries = 256;
        config.llm.request_timeout_secs = 20;
        config.llm.max_tokens = 200;
        config
    }

    /// No text caching, for runs against a local mirror that changes
    pub fn uncached() -> Self {
        let mut config = Self::default();
        config.mode = OperationMode::Uncached;
        config.gutenberg.cache_max_entries = 0;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("BOOKGRAPH_BIND", "127.0.0.1:8080"),
            ("OPENAI_API_KEY", "sk-test"),
            ("GUTENBERG_MIRROR", "http://mirror.local"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.gutenberg.mirror_base, "http://mirror.local");
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "synth": { "early_poll": 0.5 }, "gutenberg": { "cache_max_entries": 3 } }"#)
                .unwrap();

        assert_eq!(config.synth.early_poll, 0.5);
        assert_eq!(config.synth.sparse_poll, 0.65);
        assert_eq!(config.gutenberg.cache_max_entries, 3);
        assert_eq!(config.server.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_presets() {
        assert_eq!(AppConfig::uncached().gutenberg.cache_max_entries, 0);
        assert!(AppConfig::fast_mode().gutenberg.request_timeout_secs < AppConfig::default().gutenberg.request_timeout_secs);
    }

    fn load_from(env: &[(&str, &str)]) -> Result<AppConfig> {
        let env: HashMap<&str, &str> = env.iter().copied().collect();
        AppConfig::load_with(|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_mode_selects_preset() {
        let config = load_from(&[("BOOKGRAPH_MODE", "uncached")]).unwrap();
        assert_eq!(config.mode, OperationMode::Uncached);
        assert_eq!(config.gutenberg.cache_max_entries, 0);

        let config = load_from(&[("BOOKGRAPH_MODE", "Fast"), ("OPENAI_MODEL", "gpt-4o-mini")]).unwrap();
        assert_eq!(config.mode, OperationMode::Fast);
        assert_eq!(config.gutenberg.request_timeout_secs, 10);
        assert_eq!(config.llm.model, "gpt-4o-mini");

        let config = load_from(&[]).unwrap();
        assert_eq!(config.mode, OperationMode::Standard);
        assert_eq!(config.gutenberg.cache_max_entries, 64);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let err = load_from(&[("BOOKGRAPH_MODE", "turbo")]).unwrap_err();
        assert!(err.to_string().contains("turbo"));
    }

    #[test]
    fn test_config_file_takes_precedence_over_mode() {
        let path = std::env::temp_dir().join(format!("bookgraph-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "gutenberg": { "cache_max_entries": 5 } }"#).unwrap();

        let config = load_from(&[
            ("BOOKGRAPH_CONFIG", path.to_str().unwrap()),
            ("BOOKGRAPH_MODE", "uncached"),
        ])
        .unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.mode, OperationMode::Standard);
        assert_eq!(config.gutenberg.cache_max_entries, 5);
    }
}
