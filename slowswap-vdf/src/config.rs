// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{VdfError, VdfResult};
use crate::rsa_group::modulus::{RSAModulus, DEFAULT_MODULUS};

/// Default number of sequential squarings.
pub const DEFAULT_ITERATIONS: u64 = 1_000_000;

/// Default number of loop iterations between two cancellation checks and progress reports.
pub const DEFAULT_CHECKPOINT_INTERVAL: u64 = 10_000;

pub const MODULUS_ENV: &str = "SLOWSWAP_VDF_MODULUS";
pub const ITERATIONS_ENV: &str = "SLOWSWAP_VDF_ITERATIONS";
pub const CHECKPOINT_INTERVAL_ENV: &str = "SLOWSWAP_VDF_CHECKPOINT_INTERVAL";

/// Protocol constants and runtime tuning for a VDF run.
///
/// The modulus and the number of iterations must match what the on-chain verifier expects. The
/// checkpoint interval only affects cancellation latency and progress granularity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VdfConfig {
    pub modulus: RSAModulus,
    pub iterations: u64,
    pub checkpoint_interval: u64,
}

impl Default for VdfConfig {
    fn default() -> Self {
        Self {
            modulus: DEFAULT_MODULUS.clone(),
            iterations: DEFAULT_ITERATIONS,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
        }
    }
}

impl VdfConfig {
    pub fn new(modulus: RSAModulus, iterations: u64) -> Self {
        Self {
            modulus,
            iterations,
            ..Self::default()
        }
    }

    pub fn with_checkpoint_interval(mut self, checkpoint_interval: u64) -> Self {
        self.checkpoint_interval = checkpoint_interval;
        self
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> VdfResult<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .map_err(|e| VdfError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&data)
    }

    pub fn from_toml_str(data: &str) -> VdfResult<Self> {
        let config: Self =
            toml::from_str(data).map_err(|e| VdfError::Config(format!("toml parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Start from the defaults and override every value that is set in the environment.
    pub fn from_env() -> VdfResult<Self> {
        let mut config = Self::default();
        if let Ok(value) = std::env::var(MODULUS_ENV) {
            config.modulus = RSAModulus::from_str(&value)
                .map_err(|e| VdfError::Config(format!("{MODULUS_ENV}: {e}")))?;
        }
        if let Ok(value) = std::env::var(ITERATIONS_ENV) {
            config.iterations = parse_env(ITERATIONS_ENV, &value)?;
        }
        if let Ok(value) = std::env::var(CHECKPOINT_INTERVAL_ENV) {
            config.checkpoint_interval = parse_env(CHECKPOINT_INTERVAL_ENV, &value)?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> VdfResult<()> {
        if self.iterations == 0 {
            return Err(VdfError::Config("iterations must be positive".into()));
        }
        if self.checkpoint_interval == 0 {
            return Err(VdfError::Config(
                "checkpoint_interval must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn parse_env(name: &str, value: &str) -> VdfResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|e| VdfError::Config(format!("{name}: {e}")))
}
