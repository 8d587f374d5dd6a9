//! # Service Configuration
//!
//! Deployment settings for the club service. Every field has a default, so an
//! empty TOML document or an empty environment is a valid configuration.
//!
//! # Config File Format
//!
//! ```toml
//! club_collection = "0x00000000000000000000000000000000000c10b5"
//! custody_account = "0x0000000000000000000000000000000000c0ffee"
//! contract_owner = "0x000000000000000000000000000000000000a11c"
//! merkle_root = "0x0000000000000000000000000000000000000000000000000000000000000000"
//!
//! [defaults]
//! max_capacity = 30
//! min_duration_days = 30
//! owners_share = 4000
//! ```

use crate::domain::entities::{
    ClubParameters, DEFAULT_MAX_CAPACITY, DEFAULT_MIN_DURATION_DAYS, DEFAULT_OWNERS_SHARE,
    SHARE_SCALE,
};
use crate::domain::value_objects::{Address, Hash};
use crate::errors::ConfigError;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Parameters applied to every newly created club.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClubDefaults {
    /// Maximum concurrent members.
    pub max_capacity: u32,
    /// Minimum residency in days.
    pub min_duration_days: u64,
    /// Administrator share, scaled by 100.
    pub owners_share: u32,
}

impl Default for ClubDefaults {
    fn default() -> Self {
        Self {
            max_capacity: DEFAULT_MAX_CAPACITY,
            min_duration_days: DEFAULT_MIN_DURATION_DAYS,
            owners_share: DEFAULT_OWNERS_SHARE,
        }
    }
}

impl From<ClubDefaults> for ClubParameters {
    fn from(defaults: ClubDefaults) -> Self {
        Self {
            max_capacity: defaults.max_capacity,
            min_duration_days: defaults.min_duration_days,
            owners_share: defaults.owners_share,
        }
    }
}

/// Club service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClubServiceConfig {
    /// Collection the club identities are minted in.
    pub club_collection: Address,
    /// Account that holds accepted credentials.
    pub custody_account: Address,
    /// Account allowed to replace the allowlist root.
    pub contract_owner: Address,
    /// Allowlist root at start-up.
    pub initial_merkle_root: Hash,
    /// Parameters for new clubs.
    pub defaults: ClubDefaults,
}

impl Default for ClubServiceConfig {
    fn default() -> Self {
        Self {
            club_collection: Address::new(*b"nft-clubs/identities"),
            custody_account: Address::new(*b"nft-clubs/custody\0\0\0"),
            contract_owner: Address::ZERO,
            initial_merkle_root: Hash::ZERO,
            defaults: ClubDefaults::default(),
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    club_collection: Option<String>,
    custody_account: Option<String>,
    contract_owner: Option<String>,
    merkle_root: Option<String>,
    #[serde(default)]
    defaults: DefaultsFile,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct DefaultsFile {
    max_capacity: Option<u32>,
    min_duration_days: Option<u64>,
    owners_share: Option<u32>,
}

impl ClubServiceConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns error on malformed TOML, bad hex or out-of-range values.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let base = Self::default();

        let config = Self {
            club_collection: parse_address("club_collection", file.club_collection)?
                .unwrap_or(base.club_collection),
            custody_account: parse_address("custody_account", file.custody_account)?
                .unwrap_or(base.custody_account),
            contract_owner: parse_address("contract_owner", file.contract_owner)?
                .unwrap_or(base.contract_owner),
            initial_merkle_root: parse_hash("merkle_root", file.merkle_root)?
                .unwrap_or(base.initial_merkle_root),
            defaults: ClubDefaults {
                max_capacity: file
                    .defaults
                    .max_capacity
                    .unwrap_or(base.defaults.max_capacity),
                min_duration_days: file
                    .defaults
                    .min_duration_days
                    .unwrap_or(base.defaults.min_duration_days),
                owners_share: file
                    .defaults
                    .owners_share
                    .unwrap_or(base.defaults.owners_share),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CLUB_COLLECTION`: club identity collection (hex)
    /// - `CLUB_CUSTODY_ACCOUNT`: custody account (hex)
    /// - `CLUB_CONTRACT_OWNER`: root administrator (hex)
    /// - `CLUB_MERKLE_ROOT`: initial allowlist root (hex)
    /// - `CLUB_MAX_CAPACITY`, `CLUB_MIN_DURATION_DAYS`, `CLUB_OWNERS_SHARE`
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = Self::default();

        let config = Self {
            club_collection: parse_address("CLUB_COLLECTION", env::var("CLUB_COLLECTION").ok())?
                .unwrap_or(base.club_collection),
            custody_account: parse_address(
                "CLUB_CUSTODY_ACCOUNT",
                env::var("CLUB_CUSTODY_ACCOUNT").ok(),
            )?
            .unwrap_or(base.custody_account),
            contract_owner: parse_address(
                "CLUB_CONTRACT_OWNER",
                env::var("CLUB_CONTRACT_OWNER").ok(),
            )?
            .unwrap_or(base.contract_owner),
            initial_merkle_root: parse_hash("CLUB_MERKLE_ROOT", env::var("CLUB_MERKLE_ROOT").ok())?
                .unwrap_or(base.initial_merkle_root),
            defaults: ClubDefaults {
                max_capacity: parse_number("CLUB_MAX_CAPACITY")?
                    .unwrap_or(base.defaults.max_capacity),
                min_duration_days: parse_number("CLUB_MIN_DURATION_DAYS")?
                    .unwrap_or(base.defaults.min_duration_days),
                owners_share: parse_number("CLUB_OWNERS_SHARE")?
                    .unwrap_or(base.defaults.owners_share),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` for a zero capacity or a share above 100%.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.defaults.max_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.defaults.owners_share == 0 || self.defaults.owners_share > SHARE_SCALE {
            return Err(ConfigError::InvalidValue {
                field: "owners_share",
                reason: format!("must be in 1..={SHARE_SCALE}"),
            });
        }
        if self.club_collection == self.custody_account {
            return Err(ConfigError::InvalidValue {
                field: "custody_account",
                reason: "must differ from club_collection".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_address(field: &'static str, value: Option<String>) -> Result<Option<Address>, ConfigError> {
    value
        .map(|v| Address::from_hex(v.trim()).ok_or(ConfigError::InvalidHex { field, value: v }))
        .transpose()
}

fn parse_hash(field: &'static str, value: Option<String>) -> Result<Option<Hash>, ConfigError> {
    value
        .map(|v| Hash::from_hex(v.trim()).ok_or(ConfigError::InvalidHex { field, value: v }))
        .transpose()
}

fn parse_number<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                field: var,
                reason: format!("not a number: {raw}"),
            }),
        Err(_) => Ok(None),
    }
}

// =============================================================================
// TESTS
// =============================================================================
