//! Data structures and helpers shared across the API and monitor binaries.

mod amount;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use strum_macros::{AsRefStr, EnumString};
use thiserror::Error;

pub use amount::{format_units, rescale, rescale_signed, TOKEN_DECIMALS};

/// Length (in hex characters, without the `0x` prefix) of an account address.
pub const ADDRESS_HEX_LENGTH: usize = 40;

/// Errors emitted when a configured address fails validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressFormatError {
    #[error("address must start with `0x`")]
    MissingPrefix,
    #[error("address must be exactly {ADDRESS_HEX_LENGTH} hex characters after `0x`")]
    WrongLength,
    #[error("address contains non-hex characters")]
    NonHex,
}

/// Validates the `0x` + 40 hex-character account address contract.
pub fn validate_address(raw: &str) -> Result<(), AddressFormatError> {
    let body = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or(AddressFormatError::MissingPrefix)?;

    if body.len() != ADDRESS_HEX_LENGTH {
        return Err(AddressFormatError::WrongLength);
    }

    if !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AddressFormatError::NonHex);
    }

    Ok(())
}

/// Account address on an EVM-compatible network, canonicalized to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    text: String,
}

impl Address {
    pub fn parse(raw: &str) -> Result<Self, AddressFormatError> {
        let trimmed = raw.trim();
        validate_address(trimmed)?;
        let mut text = trimmed.to_owned();
        text.make_ascii_lowercase();
        Ok(Self { text })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Hex digits without the `0x` prefix.
    pub fn hex_body(&self) -> &str {
        &self.text[2..]
    }
}

impl FromStr for Address {
    type Err = AddressFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Which aggregate the reward reader runs against the validators table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum RewardFormula {
    /// `SUM(balance) - SUM(balanceactivation)`
    BalanceOnly,
    /// `(SUM(balance) + SUM(withdrawal)) - SUM(balanceactivation)`
    #[default]
    WithWithdrawals,
}

/// Point-in-time supply figures in the token's smallest unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplySnapshot {
    pub total_supply: BigUint,
    pub circulating_supply: BigUint,
    pub computed_at: DateTime<Utc>,
}

impl SupplySnapshot {
    pub fn new(total_supply: BigUint, circulating_supply: BigUint) -> Self {
        Self {
            total_supply,
            circulating_supply,
            computed_at: Utc::now(),
        }
    }

    pub fn total_display(&self) -> String {
        format_units(&self.total_supply, TOKEN_DECIMALS)
    }

    pub fn circulating_display(&self) -> String {
        format_units(&self.circulating_supply, TOKEN_DECIMALS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_validation_rejects_invalid_inputs() {
        assert_eq!(
            validate_address("2529379ac2c209058adf4c28f2c963878ea5e7bd"),
            Err(AddressFormatError::MissingPrefix)
        );
        assert_eq!(validate_address("0xdead"), Err(AddressFormatError::WrongLength));
        assert_eq!(
            validate_address("0xzz29379ac2c209058adf4c28f2c963878ea5e7bd"),
            Err(AddressFormatError::NonHex)
        );
        assert!(validate_address("0x2529379ac2c209058adf4c28f2c963878ea5e7bd").is_ok());
    }

    #[test]
    fn address_canonicalizes_case() {
        let address = Address::parse(" 0x71D208bfd49375285301343C719e1EA087c87b43 ").unwrap();
        assert_eq!(address.as_str(), "0x71d208bfd49375285301343c719e1ea087c87b43");
        assert_eq!(address.hex_body().len(), ADDRESS_HEX_LENGTH);
    }

    #[test]
    fn reward_formula_parses_snake_case() {
        assert_eq!(
            "with_withdrawals".parse::<RewardFormula>().unwrap(),
            RewardFormula::WithWithdrawals
        );
        assert_eq!(
            "balance_only".parse::<RewardFormula>().unwrap(),
            RewardFormula::BalanceOnly
        );
        assert!("both".parse::<RewardFormula>().is_err());
        assert_eq!(RewardFormula::BalanceOnly.as_ref(), "balance_only");
        assert_eq!(RewardFormula::default(), RewardFormula::WithWithdrawals);
    }

    #[test]
    fn snapshot_renders_seven_decimals() {
        let snapshot = SupplySnapshot::new(BigUint::from(54_213_013_019_584_630u64), BigUint::from(1013u32));
        assert_eq!(snapshot.total_display(), "5421301301.9584630");
        assert_eq!(snapshot.circulating_display(), "0.0001013");
    }
}
