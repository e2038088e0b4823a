//! Engine configuration with TOML file support.

use crate::error::ChefError;
use crate::schedule::EmissionSchedule;
use chef_types::{AccountId, Timestamp, TokenId};
use chef_utils::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a Chef engine and the host running it.
///
/// Loaded from a TOML file via [`ChefConfig::from_toml_file`] or built in code
/// with [`ChefConfig::new`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChefConfig {
    /// Account allowed to administer pools and drain the vault.
    pub owner: AccountId,

    /// Token the engine pays rewards in.
    pub reward_token: TokenId,

    /// Raw reward units emitted per second across all pools. Accepts an
    /// integer or a decimal string (`"2_543_768_819_127_813"`) for values
    /// beyond the TOML integer range.
    #[serde(with = "u128_string")]
    pub reward_per_second: u128,

    /// Unix seconds at which emission starts.
    pub start_time: u64,

    /// Length of the emission window. Unset means open-ended.
    #[serde(default)]
    pub emission_duration_secs: Option<u64>,

    /// Settle every pool on `add_pool`/`set_weight` regardless of the caller's flag.
    #[serde(default = "default_true")]
    pub always_mass_update: bool,

    /// Directory for the LMDB store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_true() -> bool {
    true
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./chef_data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ChefConfig {
    pub fn new(
        owner: AccountId,
        reward_token: TokenId,
        reward_per_second: u128,
        start_time: u64,
    ) -> Self {
        Self {
            owner,
            reward_token,
            reward_per_second,
            start_time,
            emission_duration_secs: None,
            always_mass_update: true,
            data_dir: default_data_dir(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }

    /// Load and validate configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ChefError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ChefError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ChefError> {
        let config: Self = toml::from_str(s).map_err(|e| ChefError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ChefError> {
        toml::to_string_pretty(self).map_err(|e| ChefError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ChefError> {
        // Deserialization bypasses the identifier checks, so repeat them here.
        self.owner
            .as_str()
            .parse::<AccountId>()
            .map_err(|e| ChefError::Config(format!("owner: {e}")))?;
        self.reward_token
            .as_str()
            .parse::<TokenId>()
            .map_err(|e| ChefError::Config(format!("reward_token: {e}")))?;
        if self.emission_duration_secs == Some(0) {
            return Err(ChefError::Config(
                "emission_duration_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn schedule(&self) -> EmissionSchedule {
        let start = Timestamp::new(self.start_time);
        match self.emission_duration_secs {
            Some(duration) => {
                EmissionSchedule::with_duration(self.reward_per_second, start, duration)
            }
            None => EmissionSchedule::new(self.reward_per_second, start),
        }
    }
}

mod u128_string {
    use serde::de::{self, Unexpected, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        deserializer.deserialize_any(U128Visitor)
    }

    struct U128Visitor;

    impl<'de> Visitor<'de> for U128Visitor {
        type Value = u128;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a non-negative integer or decimal string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
            Ok(u128::from(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
            u128::try_from(v).map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
            v.replace('_', "")
                .parse()
                .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
        }
    }
}
