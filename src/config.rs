use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    /// Transaction flow timing and guard policy
    #[serde(default)]
    pub flow: FlowConfig,
    /// Hosted script backend endpoint
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Flow policy knobs
///
/// Defaults match the production wallet UI: 3 PIN attempts, 3 s forced
/// close on lockout, 5 s hold-to-confirm at 1% per 50 ms tick.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FlowConfig {
    pub pin_attempt_limit: u8,
    pub lockout_close_ms: u64,
    pub hold_duration_ms: u64,
    pub hold_tick_ms: u64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            pin_attempt_limit: 3,
            lockout_close_ms: 3_000,
            hold_duration_ms: 5_000,
            hold_tick_ms: 50,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BackendConfig {
    pub url: String,
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8787/api".to_string(),
            timeout_ms: 15_000,
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: "./logs".to_string(),
            log_file: "finpay.log".to_string(),
            use_json: false,
            rotation: "daily".to_string(),
            flow: FlowConfig::default(),
            backend: BackendConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_config_defaults() {
        let flow = FlowConfig::default();
        assert_eq!(flow.pin_attempt_limit, 3);
        assert_eq!(flow.lockout_close_ms, 3_000);
        assert_eq!(flow.hold_duration_ms, 5_000);
        assert_eq!(flow.hold_tick_ms, 50);
        // 100 ticks take the progress bar exactly to the deadline
        assert_eq!(flow.hold_duration_ms / flow.hold_tick_ms, 100);
    }

    #[test]
    fn test_parse_minimal_yaml() {
        let yaml = r#"
log_level: "debug"
log_dir: "./logs"
log_file: "finpay.log"
use_json: false
rotation: "never"
"#;
        let cfg: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.flow.pin_attempt_limit, 3);
        assert_eq!(cfg.backend.timeout_ms, 15_000);
    }
}
