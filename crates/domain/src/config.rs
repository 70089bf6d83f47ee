//! Environment-driven configuration structures shared by all binaries.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use num_bigint::BigUint;
use thiserror::Error;

use crate::model::{Address, AddressFormatError, RewardFormula};

const DEFAULT_INTERVAL_SECS: u64 = 60;
const DEFAULT_TICK_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RPC_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_DB_IDLE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// API-specific configuration (HTTP bind, CORS and body limits plus the
/// shared database).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    database_url: String,
    api_bind_address: String,
    api_unix_socket: Option<String>,
    cors_allowed_origins: Vec<String>,
    body_limit_bytes: usize,
}

impl ApiConfig {
    /// Loads only the environment variables required by the API surface.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        hydrate_env_file()?;

        let cors_allowed_origins = get_optional_var("API_CORS_ALLOWED_ORIGINS")
            .map(|value| split_list(&value))
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| vec!["*".to_string()]);
        if let Some(bad) = cors_allowed_origins
            .iter()
            .find(|origin| origin.as_str() != "*" && !is_valid_origin(origin))
        {
            return Err(ConfigError::InvalidOrigin { value: bad.clone() });
        }

        Ok(Self {
            database_url: get_required_var("DATABASE_URL")?,
            api_bind_address: get_required_var("API_BIND_ADDRESS")?,
            api_unix_socket: get_optional_var("API_UNIX_SOCKET"),
            cors_allowed_origins,
            body_limit_bytes: parse_optional("API_BODY_LIMIT_BYTES", DEFAULT_BODY_LIMIT_BYTES)?,
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn api_bind_address(&self) -> &str {
        &self.api_bind_address
    }

    pub fn api_unix_socket(&self) -> Option<&str> {
        self.api_unix_socket.as_deref()
    }

    pub fn cors_allowed_origins(&self) -> &[String] {
        &self.cors_allowed_origins
    }

    pub fn cors_allows_any_origin(&self) -> bool {
        self.cors_allowed_origins.iter().any(|origin| origin == "*")
    }

    pub fn body_limit_bytes(&self) -> usize {
        self.body_limit_bytes
    }
}

/// Settings for the supply job: chain endpoints, cadence and the database
/// pool it reads the reward aggregate from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    database_url: String,
    token_rpc_url: String,
    native_rpc_url: String,
    interval: Duration,
    tick_timeout: Duration,
    rpc_timeout: Duration,
    db_max_connections: u32,
    db_idle_timeout: Duration,
}

impl MonitorConfig {
    /// Loads configuration by hydrating `.env` (if present) and reading the
    /// process variables. Missing or malformed entries surface as
    /// `ConfigError` so binaries can respond gracefully.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        hydrate_env_file()?;

        let database_url = get_required_var("DATABASE_URL")?;
        let token_rpc_url = get_required_var("ETH_PROVIDER_URL")?;
        let native_rpc_url = get_required_var("AGORA_PROVIDER_URL")?;
        let interval_secs = parse_nonzero_secs("SUPPLY_INTERVAL_SECS", DEFAULT_INTERVAL_SECS)?;
        let tick_timeout_secs =
            parse_nonzero_secs("SUPPLY_TICK_TIMEOUT_SECS", DEFAULT_TICK_TIMEOUT_SECS)?;
        let rpc_timeout_secs = parse_nonzero_secs("RPC_TIMEOUT_SECS", DEFAULT_RPC_TIMEOUT_SECS)?;
        let db_max_connections: u32 =
            parse_optional("DATABASE_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;
        let db_idle_timeout_secs: u64 =
            parse_optional("DATABASE_IDLE_TIMEOUT_SECS", DEFAULT_DB_IDLE_TIMEOUT_SECS)?;

        Ok(Self {
            database_url,
            token_rpc_url,
            native_rpc_url,
            interval: Duration::from_secs(interval_secs),
            tick_timeout: Duration::from_secs(tick_timeout_secs),
            rpc_timeout: Duration::from_secs(rpc_timeout_secs),
            db_max_connections: db_max_connections.max(1),
            db_idle_timeout: Duration::from_secs(db_idle_timeout_secs),
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn token_rpc_url(&self) -> &str {
        &self.token_rpc_url
    }

    pub fn native_rpc_url(&self) -> &str {
        &self.native_rpc_url
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn tick_timeout(&self) -> Duration {
        self.tick_timeout
    }

    pub fn rpc_timeout(&self) -> Duration {
        self.rpc_timeout
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
    }

    pub fn db_idle_timeout(&self) -> Duration {
        self.db_idle_timeout
    }
}

/// Fixed inputs of the supply formula. Every field defaults to the mainnet
/// deployment and can be overridden through a `SUPPLY_*` variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplyLedger {
    pub initial_supply: BigUint,
    pub bridge_liquidity: BigUint,
    pub bridge_foundation_liquidity: BigUint,
    pub token_contract: Address,
    pub foundation: Address,
    pub marketing: Vec<Address>,
    pub bounty: Address,
    pub team: Address,
    pub burn: Address,
    /// Lives on the secondary network; read as a native balance.
    pub commons_budget: Address,
    pub auxiliary: Vec<Address>,
    pub locked_airdrop: Vec<Address>,
    pub reward_formula: RewardFormula,
    pub native_scale_exponent: u32,
    pub reward_scale_exponent: u32,
}

impl SupplyLedger {
    pub const INITIAL_SUPPLY: &'static str = "5421301301958463";
    pub const BRIDGE_LIQUIDITY: &'static str = "10000000000000";
    pub const BRIDGE_FOUNDATION_LIQUIDITY: &'static str = "400000000000000";
    pub const TOKEN_CONTRACT: &'static str = "0x746DdA2ea243400D5a63e0700F190aB79f06489e";
    pub const FOUNDATION: &'static str = "0x2529379ac2c209058adf4c28f2c963878ea5e7bd";
    pub const MARKETING: &'static [&'static str] = &[
        "0xb18ff7999757fe1e00ced454927b39812f3418aa",
        "0x4327bb17a6408d8ff94c7be88c20c521ad85d6d7",
    ];
    pub const BOUNTY: &'static str = "0x30e5794f87003b15a40827be2cc1c2ae4bc79435";
    pub const TEAM: &'static str = "0xabf16eafac1f269a97935b4e3f7e158b61ead3f3";
    pub const BURN: &'static str = "0x000000000000000000000000000000000000dead";
    pub const COMMONS_BUDGET: &'static str = "0x71D208bfd49375285301343C719e1EA087c87b43";
    pub const AUXILIARY: &'static [&'static str] = &["0x12eC499895590898FDf92CA71AcEcCfF33C257C0"];
    pub const LOCKED_AIRDROP: &'static [&'static str] = &[
        "0x2e650da344c6fa949962a139cbde6f411b369aba",
        "0x28fbb415dffc0c7540c4b6688e765cfec7ba24d8",
        "0x0252105a98fdf29d1fbe8cba619d4b8ec07d4c2c",
        "0x631302f2d5d7d41970186023e1a47a7a249fdc14",
        "0xf8c69c2b6731e0ab4072272613c0da9d2881bc4c",
        "0xc9a3b7810a9089716800ff3748ef02659b42b52c",
        "0xd02d41853ad45adce2efce07d5f0982091cf4c6f",
        "0xd62ad9fd3b34813ce5652f04551d6510d09bc75d",
        "0x82394244b86241ef776ccd9948cea0e5dd1f62f8",
        "0x02e5633f50d89854c6734cade0c9f1b0dc75ce5e",
    ];
    /// Secondary-network native balances carry 18 decimals; the token has 7.
    pub const NATIVE_SCALE_EXPONENT: u32 = 11;
    /// Validator balances are recorded with 9 decimals.
    pub const REWARD_SCALE_EXPONENT: u32 = 2;

    pub fn load_from_env() -> Result<Self, ConfigError> {
        hydrate_env_file()?;

        Ok(Self {
            initial_supply: amount_var("SUPPLY_INITIAL", Self::INITIAL_SUPPLY)?,
            bridge_liquidity: amount_var("SUPPLY_BRIDGE_LIQUIDITY", Self::BRIDGE_LIQUIDITY)?,
            bridge_foundation_liquidity: amount_var(
                "SUPPLY_BRIDGE_FOUNDATION_LIQUIDITY",
                Self::BRIDGE_FOUNDATION_LIQUIDITY,
            )?,
            token_contract: address_var("SUPPLY_TOKEN_CONTRACT", Self::TOKEN_CONTRACT)?,
            foundation: address_var("SUPPLY_FOUNDATION_ADDRESS", Self::FOUNDATION)?,
            marketing: address_list_var("SUPPLY_MARKETING_ADDRESSES", Self::MARKETING)?,
            bounty: address_var("SUPPLY_BOUNTY_ADDRESS", Self::BOUNTY)?,
            team: address_var("SUPPLY_TEAM_ADDRESS", Self::TEAM)?,
            burn: address_var("SUPPLY_BURN_ADDRESS", Self::BURN)?,
            commons_budget: address_var("SUPPLY_COMMONS_BUDGET_ADDRESS", Self::COMMONS_BUDGET)?,
            auxiliary: address_list_var("SUPPLY_AUXILIARY_ADDRESSES", Self::AUXILIARY)?,
            locked_airdrop: address_list_var(
                "SUPPLY_LOCKED_AIRDROP_ADDRESSES",
                Self::LOCKED_AIRDROP,
            )?,
            reward_formula: match get_optional_var("SUPPLY_REWARD_FORMULA") {
                Some(raw) => RewardFormula::from_str(&raw)
                    .map_err(|_| ConfigError::InvalidFormula { value: raw })?,
                None => RewardFormula::default(),
            },
            native_scale_exponent: parse_optional(
                "SUPPLY_NATIVE_SCALE_EXPONENT",
                Self::NATIVE_SCALE_EXPONENT,
            )?,
            reward_scale_exponent: parse_optional(
                "SUPPLY_REWARD_SCALE_EXPONENT",
                Self::REWARD_SCALE_EXPONENT,
            )?,
        })
    }

    /// Token-network addresses whose balance is read on every tick. The
    /// commons-budget address is read on the secondary network.
    pub fn token_address_count(&self) -> usize {
        4 + self.marketing.len() + self.auxiliary.len() + self.locked_airdrop.len()
    }
}

fn get_required_var(key: &'static str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(ConfigError::MissingVar { key })
            } else {
                Ok(trimmed.to_string())
            }
        }
        Err(_) => Err(ConfigError::MissingVar { key }),
    }
}

fn get_optional_var(key: &'static str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn parse_optional<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr<Err = std::num::ParseIntError>,
{
    match get_optional_var(key) {
        Some(raw) => raw
            .parse()
            .map_err(|source| ConfigError::InvalidNumber { key, source }),
        None => Ok(default),
    }
}

fn parse_nonzero_secs(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match parse_optional(key, default)? {
        0 => Err(ConfigError::OutOfRange { key }),
        secs => Ok(secs),
    }
}

fn amount_var(key: &'static str, default: &str) -> Result<BigUint, ConfigError> {
    let raw = get_optional_var(key).unwrap_or_else(|| default.to_string());
    BigUint::from_str(&raw).map_err(|_| ConfigError::InvalidAmount { key, value: raw })
}

fn address_var(key: &'static str, default: &str) -> Result<Address, ConfigError> {
    let raw = get_optional_var(key).unwrap_or_else(|| default.to_string());
    Address::parse(&raw).map_err(|source| ConfigError::InvalidAddress {
        key,
        value: raw,
        source,
    })
}

fn address_list_var(key: &'static str, defaults: &[&str]) -> Result<Vec<Address>, ConfigError> {
    // Set but empty means an empty list, not the default.
    let raw: Vec<String> = match env::var(key) {
        Ok(value) => split_list(&value),
        Err(_) => defaults.iter().map(|value| value.to_string()).collect(),
    };
    raw.into_iter()
        .map(|value| {
            Address::parse(&value).map_err(|source| ConfigError::InvalidAddress {
                key,
                value,
                source,
            })
        })
        .collect()
}

/// Accepts a serialized origin: `scheme://host[:port]`, nothing after the
/// authority.
fn is_valid_origin(origin: &str) -> bool {
    let Some((scheme, authority)) = origin.split_once("://") else {
        return false;
    };
    let scheme_ok = scheme
        .chars()
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (authority, None),
    };
    let host_ok = host.split('.').all(|label| {
        !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    let port_ok = port.map_or(true, |port| {
        !port.is_empty() && port.len() <= 5 && port.parse::<u16>().is_ok()
    });
    scheme_ok && host_ok && port_ok
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn hydrate_env_file() -> Result<(), ConfigError> {
    if env::var_os("BOA_SUPPLY_SKIP_DOTENV").is_some() {
        return Ok(());
    }
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(ConfigError::Dotenv { source: err }),
    }

    Ok(())
}

/// Errors emitted when `.env` hydration or environment parsing fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable `{key}`")]
    MissingVar { key: &'static str },
    #[error("invalid integer in `{key}`: {source}")]
    InvalidNumber {
        key: &'static str,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("`{key}` is out of range")]
    OutOfRange { key: &'static str },
    #[error("invalid amount `{value}` in `{key}`")]
    InvalidAmount { key: &'static str, value: String },
    #[error("invalid address `{value}` in `{key}`: {source}")]
    InvalidAddress {
        key: &'static str,
        value: String,
        #[source]
        source: AddressFormatError,
    },
    #[error("invalid CORS origin `{value}` (expected `scheme://host[:port]` or `*`)")]
    InvalidOrigin { value: String },
    #[error("unknown reward formula `{value}` (expected `balance_only` or `with_withdrawals`)")]
    InvalidFormula { value: String },
    #[error("failed to load .env file: {source}")]
    Dotenv {
        #[from]
        source: dotenvy::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_GUARD: Mutex<()> = Mutex::new(());

    const LEDGER_KEYS: &[&str] = &[
        "SUPPLY_INITIAL",
        "SUPPLY_BRIDGE_LIQUIDITY",
        "SUPPLY_BRIDGE_FOUNDATION_LIQUIDITY",
        "SUPPLY_TOKEN_CONTRACT",
        "SUPPLY_FOUNDATION_ADDRESS",
        "SUPPLY_MARKETING_ADDRESSES",
        "SUPPLY_BOUNTY_ADDRESS",
        "SUPPLY_TEAM_ADDRESS",
        "SUPPLY_BURN_ADDRESS",
        "SUPPLY_COMMONS_BUDGET_ADDRESS",
        "SUPPLY_AUXILIARY_ADDRESSES",
        "SUPPLY_LOCKED_AIRDROP_ADDRESSES",
        "SUPPLY_REWARD_FORMULA",
        "SUPPLY_NATIVE_SCALE_EXPONENT",
        "SUPPLY_REWARD_SCALE_EXPONENT",
    ];

    fn set_env() {
        std::env::set_var("BOA_SUPPLY_SKIP_DOTENV", "1");
        std::env::set_var("DATABASE_URL", "sqlite://test.db");
        std::env::set_var("API_BIND_ADDRESS", "127.0.0.1:8080");
        std::env::remove_var("API_UNIX_SOCKET");
        std::env::remove_var("API_CORS_ALLOWED_ORIGINS");
        std::env::remove_var("API_BODY_LIMIT_BYTES");
        std::env::set_var("ETH_PROVIDER_URL", "http://localhost:8545");
        std::env::set_var("AGORA_PROVIDER_URL", "http://localhost:2826");
        std::env::remove_var("SUPPLY_INTERVAL_SECS");
        std::env::remove_var("SUPPLY_TICK_TIMEOUT_SECS");
        std::env::remove_var("RPC_TIMEOUT_SECS");
        std::env::remove_var("DATABASE_MAX_CONNECTIONS");
        std::env::remove_var("DATABASE_IDLE_TIMEOUT_SECS");
        for key in LEDGER_KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn api_config_defaults_cors_and_body_limit() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();

        let config = ApiConfig::load_from_env().expect("api config loads");
        assert_eq!(config.database_url(), "sqlite://test.db");
        assert_eq!(config.api_bind_address(), "127.0.0.1:8080");
        assert!(config.cors_allows_any_origin());
        assert_eq!(config.body_limit_bytes(), 1024 * 1024);
    }

    #[test]
    fn api_config_reads_origin_list() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();
        std::env::set_var(
            "API_CORS_ALLOWED_ORIGINS",
            "https://scan.bosagora.org, https://boascan.io ,",
        );
        std::env::set_var("API_BODY_LIMIT_BYTES", "2048");

        let config = ApiConfig::load_from_env().expect("api config loads");
        assert_eq!(
            config.cors_allowed_origins(),
            &["https://scan.bosagora.org".to_string(), "https://boascan.io".to_string()]
        );
        assert!(!config.cors_allows_any_origin());
        assert_eq!(config.body_limit_bytes(), 2048);

        set_env();
    }

    #[test]
    fn api_config_rejects_malformed_origins() {
        let _guard = ENV_GUARD.lock().unwrap();
        for bad in [
            "http://a b",
            "scan.bosagora.org",
            "https://boascan.io/path",
            "https://",
            "https://boascan.io:port",
        ] {
            set_env();
            std::env::set_var("API_CORS_ALLOWED_ORIGINS", format!("https://ok.example,{bad}"));
            match ApiConfig::load_from_env().unwrap_err() {
                ConfigError::InvalidOrigin { value } => assert_eq!(value, bad),
                other => panic!("unexpected error for {bad}: {other}"),
            }
        }

        set_env();
        std::env::set_var(
            "API_CORS_ALLOWED_ORIGINS",
            "http://localhost:3000,https://scan.bosagora.org",
        );
        let config = ApiConfig::load_from_env().expect("valid origins load");
        assert_eq!(config.cors_allowed_origins().len(), 2);

        set_env();
    }

    #[test]
    fn required_env_vars_are_trimmed() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();
        std::env::set_var("DATABASE_URL", "  sqlite://trim.db  ");
        std::env::set_var("API_BIND_ADDRESS", " 127.0.0.1:8081 ");

        let config = ApiConfig::load_from_env().expect("config loads");
        assert_eq!(config.database_url(), "sqlite://trim.db");
        assert_eq!(config.api_bind_address(), "127.0.0.1:8081");

        set_env();
    }

    #[test]
    fn empty_required_env_var_is_treated_as_missing() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();
        std::env::set_var("ETH_PROVIDER_URL", "   ");

        let err = MonitorConfig::load_from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingVar {
                key: "ETH_PROVIDER_URL"
            }
        ));

        set_env();
    }

    #[test]
    fn monitor_config_applies_defaults() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();

        let config = MonitorConfig::load_from_env().expect("config loads");
        assert_eq!(config.token_rpc_url(), "http://localhost:8545");
        assert_eq!(config.native_rpc_url(), "http://localhost:2826");
        assert_eq!(config.interval(), Duration::from_secs(60));
        assert_eq!(config.tick_timeout(), Duration::from_secs(30));
        assert_eq!(config.db_max_connections(), 20);
        assert_eq!(config.db_idle_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn monitor_config_rejects_bad_numbers() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();
        std::env::set_var("SUPPLY_INTERVAL_SECS", "soon");
        assert!(matches!(
            MonitorConfig::load_from_env().unwrap_err(),
            ConfigError::InvalidNumber {
                key: "SUPPLY_INTERVAL_SECS",
                ..
            }
        ));

        std::env::set_var("SUPPLY_INTERVAL_SECS", "0");
        assert!(matches!(
            MonitorConfig::load_from_env().unwrap_err(),
            ConfigError::OutOfRange {
                key: "SUPPLY_INTERVAL_SECS"
            }
        ));

        set_env();
    }

    #[test]
    fn monitor_config_rejects_zero_timeouts() {
        let _guard = ENV_GUARD.lock().unwrap();
        for key in ["SUPPLY_TICK_TIMEOUT_SECS", "RPC_TIMEOUT_SECS"] {
            set_env();
            std::env::set_var(key, "0");
            match MonitorConfig::load_from_env().unwrap_err() {
                ConfigError::OutOfRange { key: rejected } => assert_eq!(rejected, key),
                other => panic!("unexpected error for {key}: {other}"),
            }
        }

        set_env();
        std::env::set_var("SUPPLY_TICK_TIMEOUT_SECS", "5");
        std::env::set_var("RPC_TIMEOUT_SECS", "2");
        let config = MonitorConfig::load_from_env().expect("config loads");
        assert_eq!(config.tick_timeout(), Duration::from_secs(5));
        assert_eq!(config.rpc_timeout(), Duration::from_secs(2));

        set_env();
    }

    #[test]
    fn ledger_defaults_to_mainnet_values() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();

        let ledger = SupplyLedger::load_from_env().expect("ledger loads");
        assert_eq!(ledger.initial_supply, BigUint::from(5_421_301_301_958_463u64));
        assert_eq!(ledger.marketing.len(), 2);
        assert_eq!(ledger.auxiliary.len(), 1);
        assert_eq!(ledger.locked_airdrop.len(), 10);
        assert_eq!(ledger.reward_formula, RewardFormula::WithWithdrawals);
        assert_eq!(ledger.native_scale_exponent, 11);
        assert_eq!(ledger.reward_scale_exponent, 2);
        assert_eq!(ledger.token_address_count(), 17);
        assert_eq!(
            ledger.commons_budget.as_str(),
            "0x71d208bfd49375285301343c719e1ea087c87b43"
        );
    }

    #[test]
    fn ledger_overrides_lists_and_formula() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();
        std::env::set_var(
            "SUPPLY_MARKETING_ADDRESSES",
            "0xb18ff7999757fe1e00ced454927b39812f3418aa",
        );
        std::env::set_var("SUPPLY_AUXILIARY_ADDRESSES", "");
        std::env::set_var("SUPPLY_REWARD_FORMULA", "balance_only");

        let ledger = SupplyLedger::load_from_env().expect("ledger loads");
        assert_eq!(ledger.marketing.len(), 1);
        assert!(ledger.auxiliary.is_empty());
        assert_eq!(ledger.reward_formula, RewardFormula::BalanceOnly);

        set_env();
    }

    #[test]
    fn ledger_rejects_malformed_entries() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();
        std::env::set_var("SUPPLY_LOCKED_AIRDROP_ADDRESSES", "0x1234");
        assert!(matches!(
            SupplyLedger::load_from_env().unwrap_err(),
            ConfigError::InvalidAddress {
                key: "SUPPLY_LOCKED_AIRDROP_ADDRESSES",
                ..
            }
        ));

        set_env();
        std::env::set_var("SUPPLY_REWARD_FORMULA", "legacy");
        assert!(matches!(
            SupplyLedger::load_from_env().unwrap_err(),
            ConfigError::InvalidFormula { .. }
        ));

        set_env();
        std::env::set_var("SUPPLY_INITIAL", "-5");
        assert!(matches!(
            SupplyLedger::load_from_env().unwrap_err(),
            ConfigError::InvalidAmount {
                key: "SUPPLY_INITIAL",
                ..
            }
        ));

        set_env();
    }
}
