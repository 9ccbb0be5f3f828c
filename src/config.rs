use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;

use crate::distancing::FootPointMode;
use crate::policy::PolicyKind;
use crate::processor::{FrameProcessor, MissingFramePolicy};

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Deserialize, Default)]
struct OverlayConfigFile {
    policy: Option<String>,
    distancing: Option<DistancingConfigFile>,
    batch: Option<BatchConfigFile>,
    log: Option<LogConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct DistancingConfigFile {
    foot_point: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct BatchConfigFile {
    missing_frame: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct LogConfigFile {
    filter: Option<String>,
}

/// Host-side settings for running the overlay policies.
///
/// Class ids, patch colors and the risk color law are compiled in and not
/// configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayConfig {
    pub policy: PolicyKind,
    pub foot_point: FootPointMode,
    pub missing_frame: MissingFramePolicy,
    pub log_filter: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::default(),
            foot_point: FootPointMode::default(),
            missing_frame: MissingFramePolicy::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl OverlayConfig {
    /// Load from `OVERLAY_CONFIG` (TOML or JSON) and apply env overrides.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("OVERLAY_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) if !path.trim().is_empty() => Some(read_config_file(Path::new(path))?),
            _ => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default())?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from an explicit path, then apply env overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut cfg = Self::from_file(read_config_file(path)?)?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn processor(&self) -> FrameProcessor {
        FrameProcessor::for_kind(self.policy, self.foot_point)
            .with_missing_frame_policy(self.missing_frame)
    }

    fn from_file(file: OverlayConfigFile) -> Result<Self> {
        let policy = match file.policy.as_deref() {
            Some(value) => value.parse::<PolicyKind>()?,
            None => PolicyKind::default(),
        };
        let foot_point = match file
            .distancing
            .as_ref()
            .and_then(|distancing| distancing.foot_point.as_deref())
        {
            Some(value) => value.parse::<FootPointMode>()?,
            None => FootPointMode::default(),
        };
        let missing_frame = match file
            .batch
            .as_ref()
            .and_then(|batch| batch.missing_frame.as_deref())
        {
            Some(value) => value.parse::<MissingFramePolicy>()?,
            None => MissingFramePolicy::default(),
        };
        let log_filter = file
            .log
            .and_then(|log| log.filter)
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        Ok(Self {
            policy,
            foot_point,
            missing_frame,
            log_filter,
        })
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(policy) = non_empty_env("OVERLAY_POLICY") {
            self.policy = policy
                .parse::<PolicyKind>()
                .map_err(|e| anyhow!("OVERLAY_POLICY: {}", e))?;
        }
        if let Some(mode) = non_empty_env("OVERLAY_FOOT_POINT") {
            self.foot_point = mode
                .parse::<FootPointMode>()
                .map_err(|e| anyhow!("OVERLAY_FOOT_POINT: {}", e))?;
        }
        if let Some(policy) = non_empty_env("OVERLAY_MISSING_FRAME") {
            self.missing_frame = policy
                .parse::<MissingFramePolicy>()
                .map_err(|e| anyhow!("OVERLAY_MISSING_FRAME: {}", e))?;
        }
        if let Some(filter) = non_empty_env("OVERLAY_LOG") {
            self.log_filter = filter;
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        self.log_filter = self.log_filter.trim().to_string();
        if self.log_filter.is_empty() {
            return Err(anyhow!("log filter must not be empty"));
        }
        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn read_config_file(path: &Path) -> Result<OverlayConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let cfg: OverlayConfigFile = if is_toml {
        toml::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}
