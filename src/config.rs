use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{SimError, SimResult};
use crate::simulation::generator::DecodingParams;
use crate::vocabulary::TokenizeMode;

/// Session configuration, loadable from a TOML file. Every field has a
/// default so a missing file or empty table is a valid configuration; CLI
/// flags override individual values after loading.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Prefix-only correction instead of isle-based correction.
    pub prefix_mode: bool,
    /// Maximum number of newly generated tokens between isles per cycle.
    pub max_extra_tokens: usize,
    /// How raw corpus lines are split into tokens.
    pub tokenize: TokenizeMode,
    /// Emit running corpus ratios every this many sentences.
    pub report_every: usize,
    /// Opaque decoder knobs, forwarded to the generator untouched.
    pub decoding: DecodingParams,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            prefix_mode: false,
            max_extra_tokens: 5,
            tokenize: TokenizeMode::None,
            report_every: 50,
            decoding: DecodingParams::default(),
        }
    }
}

pub fn load_config_from_file(file_path: &Path) -> SimResult<SessionConfig> {
    let contents = fs::read_to_string(file_path).map_err(|e| {
        SimError::Config(format!("failed to read {}: {e}", file_path.display()))
    })?;
    let config: SessionConfig = toml::from_str(&contents).map_err(|e| {
        SimError::Config(format!("failed to parse {}: {e}", file_path.display()))
    })?;
    if config.report_every == 0 {
        return Err(SimError::Config(
            "report_every must be at least 1".to_string(),
        ));
    }
    Ok(config)
}
