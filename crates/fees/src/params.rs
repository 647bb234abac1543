//! Governance fee parameters.
//!
//! Parameters are the persisted, governance-editable description of a fee
//! policy; calculators are derived from them by the generator registered for
//! the message type.

use crate::calculator::{fixed_fee_calculator_gen, transfer_fee_calculator_gen};
use crate::registry::FeeCalculatorRegistry;
use crate::{Error, Result};
use chainfee_core::FeeDistributeType;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Genesis fees, in units of 1e-8 of the native token
pub mod defaults {
    pub const PROPOSE_FEE: i64 = 1_000_000_000;
    pub const DEPOSIT_FEE: i64 = 125_000;
    pub const LISTING_FEE: i64 = 200_000_000_000;
    pub const ISSUE_FEE: i64 = 100_000_000_000;
    pub const MINT_FEE: i64 = 20_000_000_000;
    pub const BURN_FEE: i64 = 100_000_000;
    pub const FREEZE_FEE: i64 = 1_000_000;
    pub const CREATE_VALIDATOR_FEE: i64 = 1_000_000_000;
    pub const REMOVE_VALIDATOR_FEE: i64 = 100_000_000;
    pub const TRANSFER_FEE: i64 = 62_500;
    pub const MULTI_TRANSFER_FEE: i64 = 50_000;
    pub const LOWER_LIMIT_AS_MULTI: i64 = 2;
}

/// Message type of the native transfer, priced by the transfer policy
pub const TRANSFER_MSG_TYPE: &str = "send";

/// Constant fee for one message type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedFeeParams {
    pub msg_type: String,
    pub fee: i64,
    pub fee_for: FeeDistributeType,
}

impl FixedFeeParams {
    pub fn new(msg_type: impl Into<String>, fee: i64, fee_for: FeeDistributeType) -> Self {
        Self {
            msg_type: msg_type.into(),
            fee,
            fee_for,
        }
    }
}

/// Transfer fee with a per-movement discount for multi-sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferFeeParams {
    pub fixed: FixedFeeParams,
    pub multi_transfer_fee: i64,
    pub lower_limit_as_multi: i64,
}

impl TransferFeeParams {
    pub fn new(fixed: FixedFeeParams, multi_transfer_fee: i64, lower_limit_as_multi: i64) -> Self {
        Self {
            fixed,
            multi_transfer_fee,
            lower_limit_as_multi,
        }
    }
}

/// A fee parameter bound to a message type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeeParam {
    Fixed(FixedFeeParams),
    Transfer(TransferFeeParams),
}

impl FeeParam {
    /// Message type the parameter prices
    pub fn msg_type(&self) -> &str {
        &self.fixed().msg_type
    }

    /// The flat part shared by every parameter kind
    pub fn fixed(&self) -> &FixedFeeParams {
        match self {
            FeeParam::Fixed(p) => p,
            FeeParam::Transfer(p) => &p.fixed,
        }
    }

    /// Validates the parameter.
    ///
    /// Non-positive flat fees are accepted on purpose: calculators degrade
    /// them to the free policy.
    pub fn check(&self) -> Result<()> {
        let msg_type = self.msg_type();
        let invalid = |reason: String| Error::InvalidFeeParam {
            msg_type: msg_type.to_string(),
            reason,
        };

        if msg_type.is_empty() || msg_type.chars().any(char::is_whitespace) {
            return Err(invalid("msg_type must be a non-empty identifier".to_string()));
        }

        if let FeeParam::Transfer(p) = self {
            if p.multi_transfer_fee > p.fixed.fee {
                return Err(invalid(format!(
                    "multi_transfer_fee({}) should not be bigger than fee({})",
                    p.multi_transfer_fee, p.fixed.fee
                )));
            }
            if p.lower_limit_as_multi <= 1 {
                return Err(invalid(format!(
                    "lower_limit_as_multi({}) should be > 1",
                    p.lower_limit_as_multi
                )));
            }
        }
        Ok(())
    }
}

impl From<FixedFeeParams> for FeeParam {
    fn from(p: FixedFeeParams) -> Self {
        FeeParam::Fixed(p)
    }
}

impl From<TransferFeeParams> for FeeParam {
    fn from(p: TransferFeeParams) -> Self {
        FeeParam::Transfer(p)
    }
}

/// Fee parameters a chain starts with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FeeGenesis {
    #[serde(default)]
    pub params: Vec<FeeParam>,
}

impl FeeGenesis {
    /// Parses a genesis from TOML (`[[params]]` tables tagged by `kind`).
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Parses a genesis from JSON.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads a genesis file, choosing the format by extension (`.json` or TOML).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_toml_str(&text),
        }
    }
}

/// The fee schedule a new chain starts with.
pub fn default_genesis() -> Vec<FeeParam> {
    use defaults::*;
    use FeeDistributeType::*;

    let fixed = |msg_type: &str, fee: i64, fee_for: FeeDistributeType| -> FeeParam {
        FixedFeeParams::new(msg_type, fee, fee_for).into()
    };
    vec![
        fixed("submit_proposal", PROPOSE_FEE, ForProposer),
        fixed("deposit", DEPOSIT_FEE, ForProposer),
        fixed("vote", 0, Free),
        fixed("create_validator", CREATE_VALIDATOR_FEE, ForProposer),
        fixed("remove_validator", REMOVE_VALIDATOR_FEE, ForProposer),
        fixed("dexList", LISTING_FEE, ForAll),
        fixed("orderNew", 0, Free),
        fixed("orderCancel", 0, Free),
        fixed("issueMsg", ISSUE_FEE, ForAll),
        fixed("mintMsg", MINT_FEE, ForAll),
        fixed("tokensBurn", BURN_FEE, ForProposer),
        fixed("tokensFreeze", FREEZE_FEE, ForProposer),
        TransferFeeParams::new(
            FixedFeeParams::new(TRANSFER_MSG_TYPE, TRANSFER_FEE, ForProposer),
            MULTI_TRANSFER_FEE,
            LOWER_LIMIT_AS_MULTI,
        )
        .into(),
    ]
}

/// Registers the generator of every message type in [`default_genesis`].
pub fn register_default_generators(registry: &mut FeeCalculatorRegistry, denom: &str) {
    register_generators_for(registry, &default_genesis(), denom);
}

/// Registers a generator matching the kind of each param whose message type
/// has none yet. Generators already registered are left alone.
pub fn register_generators_for(
    registry: &mut FeeCalculatorRegistry,
    params: &[FeeParam],
    denom: &str,
) {
    for param in params {
        if registry.get_generator(param.msg_type()).is_some() {
            continue;
        }
        let generator = match param {
            FeeParam::Transfer(_) => transfer_fee_calculator_gen(denom),
            FeeParam::Fixed(_) => fixed_fee_calculator_gen(denom),
        };
        registry.register_generator(param.msg_type(), generator);
    }
}
