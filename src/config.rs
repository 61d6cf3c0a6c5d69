use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::edge::UnitWeights;
use crate::matchup::ShareWeights;
use crate::unit_metrics::OffenseUnit;

pub const FIRST_WEEK: u32 = 1;
pub const LAST_REGULAR_WEEK: u32 = 18;

const ENV_PREFIX: &str = "GRIDIRON_";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unit weight for {unit} must be finite and non-negative, got {value}")]
    UnitWeight { unit: &'static str, value: f64 },
    #[error("share `{name}` must lie in [0, 1], got {value}")]
    Share { name: &'static str, value: f64 },
    #[error("dep_strength must be finite and non-negative, got {0}")]
    DepStrength(f64),
    #[error("close margin must be finite and non-negative, got {0}")]
    CloseMargin(f64),
    #[error("week {0} is outside the regular season (1..=18)")]
    WeekOutOfRange(u32),
    #[error("environment override {key}={value:?} is not a number")]
    EnvOverride { key: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub unit_weights: UnitWeights,
    pub shares: ShareWeights,
    /// How strongly the OL edge discounts the passing game (typically 0..2).
    pub dep_strength: f64,
    /// Net edges within +/- this margin are called too close.
    pub close_margin: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            unit_weights: UnitWeights::default(),
            shares: ShareWeights::default(),
            dep_strength: 1.0,
            close_margin: 0.15,
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for unit in OffenseUnit::ALL {
            let value = self.unit_weights.get(unit);
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::UnitWeight {
                    unit: unit.label(),
                    value,
                });
            }
        }
        let shares = [
            ("qb_cov_share", self.shares.qb_cov_share),
            ("rb_run_share", self.shares.rb_run_share),
            ("te_covlb_share", self.shares.te_covlb_share),
            ("ol_pass_share", self.shares.ol_pass_share),
        ];
        for (name, value) in shares {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Share { name, value });
            }
        }
        if !self.dep_strength.is_finite() || self.dep_strength < 0.0 {
            return Err(ConfigError::DepStrength(self.dep_strength));
        }
        if !self.close_margin.is_finite() || self.close_margin < 0.0 {
            return Err(ConfigError::CloseMargin(self.close_margin));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read model config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parse model config {}", path.display()))
    }

    /// Defaults or `path`, then `GRIDIRON_*` environment overrides, validated.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(p) => Self::load(p)?,
            None => Self::default(),
        };
        let cfg = base.with_overrides(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let w = &mut self.unit_weights;
        let s = &mut self.shares;
        let slots: [(&str, &mut f64); 11] = [
            ("W_QB", &mut w.qb),
            ("W_RB", &mut w.rb),
            ("W_WR", &mut w.wr),
            ("W_TE", &mut w.te),
            ("W_OL", &mut w.ol),
            ("QB_COV_SHARE", &mut s.qb_cov_share),
            ("RB_RUN_SHARE", &mut s.rb_run_share),
            ("TE_COVLB_SHARE", &mut s.te_covlb_share),
            ("OL_PASS_SHARE", &mut s.ol_pass_share),
            ("DEP_STRENGTH", &mut self.dep_strength),
            ("CLOSE_MARGIN", &mut self.close_margin),
        ];
        for (suffix, slot) in slots {
            let key = format!("{ENV_PREFIX}{suffix}");
            let Some(raw) = lookup(&key) else { continue };
            if raw.trim().is_empty() {
                continue;
            }
            let parsed = raw.trim().parse::<f64>();
            *slot = parsed.map_err(|_| ConfigError::EnvOverride { key, value: raw })?;
        }
        Ok(self)
    }
}

pub fn validate_week(week: u32) -> Result<(), ConfigError> {
    if (FIRST_WEEK..=LAST_REGULAR_WEEK).contains(&week) {
        Ok(())
    } else {
        Err(ConfigError::WeekOutOfRange(week))
    }
}
