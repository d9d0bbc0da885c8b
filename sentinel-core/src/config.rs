//! 配置管理

use crate::error::{SentinelError, SentinelResult};
use crate::types::{InvestigationConfig, LlmConfig, SentinelConfig, SimulatorConfig};

use std::path::Path;

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            base_url: None,
            temperature: 0.7,
            max_tokens: Some(2000),
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 1500,
            max_delay_ms: 2500,
            seed: None,
        }
    }
}

impl SimulatorConfig {
    /// Configuration with no artificial latency
    pub fn instant() -> Self {
        Self {
            min_delay_ms: 0,
            max_delay_ms: 0,
            seed: None,
        }
    }
}

impl Default for InvestigationConfig {
    fn default() -> Self {
        Self {
            subject_min_len: 2,
            subject_max_len: 50,
            min_findings_for_suggestions: 2,
            min_findings_for_summary: 3,
            event_buffer: 100,
        }
    }
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            simulator: SimulatorConfig::default(),
            investigation: InvestigationConfig::default(),
        }
    }
}

impl SentinelConfig {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> SentinelResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SentinelError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> SentinelResult<Self> {
        let config: SentinelConfig = toml::from_str(content).map_err(|e| SentinelError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> SentinelResult<()> {
        let content = self.to_toml_string()?;

        std::fs::write(path, content).map_err(|e| SentinelError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    pub fn to_toml_string(&self) -> SentinelResult<String> {
        toml::to_string_pretty(self).map_err(|e| SentinelError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config").with_operation("serialize_toml"),
        })
    }

    /// 验证配置
    pub fn validate(&self) -> SentinelResult<()> {
        if self.llm.provider.trim().is_empty() || self.llm.model.trim().is_empty() {
            return Err(SentinelError::Config {
                message: "LLM provider and model must be set".to_string(),
                source: None,
                context: crate::ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set llm.provider and llm.model"),
            });
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(SentinelError::Config {
                message: "LLM temperature must be between 0.0 and 2.0".to_string(),
                source: None,
                context: crate::ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set llm.temperature to a value in 0.0..=2.0"),
            });
        }

        if self.simulator.min_delay_ms > self.simulator.max_delay_ms {
            return Err(SentinelError::Config {
                message: "Simulator min_delay_ms must not exceed max_delay_ms".to_string(),
                source: None,
                context: crate::ErrorContext::new("config")
                    .with_operation("validate")
                    .with_metadata("min_delay_ms", &self.simulator.min_delay_ms.to_string())
                    .with_metadata("max_delay_ms", &self.simulator.max_delay_ms.to_string()),
            });
        }

        let investigation = &self.investigation;
        if investigation.subject_min_len == 0
            || investigation.subject_min_len > investigation.subject_max_len
        {
            return Err(SentinelError::Config {
                message: "Subject length bounds are invalid".to_string(),
                source: None,
                context: crate::ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion(
                        "Use 0 < investigation.subject_min_len <= investigation.subject_max_len",
                    ),
            });
        }

        if investigation.event_buffer == 0 {
            return Err(SentinelError::Config {
                message: "Event buffer must be greater than 0".to_string(),
                source: None,
                context: crate::ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set investigation.event_buffer to a positive value"),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SentinelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.investigation.subject_min_len, 2);
        assert_eq!(config.investigation.subject_max_len, 50);
    }

    #[test]
    fn toml_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sentinel.toml");

        let mut config = SentinelConfig::default();
        config.llm.provider = "ollama".to_string();
        config.simulator.seed = Some(7);
        config.save_to_file(&path).unwrap();

        let loaded = SentinelConfig::from_file(&path).unwrap();
        assert_eq!(loaded.llm.provider, "ollama");
        assert_eq!(loaded.simulator.seed, Some(7));
    }

    #[test]
    fn inverted_delay_bounds_are_rejected() {
        let mut config = SentinelConfig::default();
        config.simulator.min_delay_ms = 3000;
        config.simulator.max_delay_ms = 10;
        assert!(matches!(
            config.validate(),
            Err(SentinelError::Config { .. })
        ));
    }

    #[test]
    fn missing_file_reports_config_error() {
        let result = SentinelConfig::from_file("/definitely/not/here.toml");
        match result {
            Err(SentinelError::Config { context, .. }) => {
                assert_eq!(context.operation.as_deref(), Some("read_file"));
            }
            other => panic!("Expected config error, got {:?}", other.map(|_| ())),
        }
    }
}
