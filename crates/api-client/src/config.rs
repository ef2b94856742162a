use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Generation backend client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL, e.g. `http://127.0.0.1:5000`.
    pub base_url: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Default sampling steps sent when a request does not set its own.
    pub default_steps: Option<u32>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            // Generation runs are slow; give them plenty of room.
            timeout_secs: 600,
            default_steps: None,
        }
    }

    /// With per-request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// With default sampling steps.
    pub fn with_default_steps(mut self, steps: u32) -> Self {
        self.default_steps = Some(steps);
        self
    }

    /// Save configuration to JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load configuration from JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        Ok(config)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://127.0.0.1:5000")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builders() {
        let config = ClientConfig::new("http://localhost:5000")
            .with_timeout(120)
            .with_default_steps(20);
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.default_steps, Some(20));
    }

    #[test]
    fn test_config_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.json");
        let config = ClientConfig::new("http://10.0.0.2:5000").with_timeout(300);
        config.save(&path).unwrap();

        let loaded = ClientConfig::load(&path).unwrap();
        assert_eq!(loaded.base_url, "http://10.0.0.2:5000");
        assert_eq!(loaded.timeout_secs, 300);
        assert_eq!(loaded.default_steps, None);
    }
}
