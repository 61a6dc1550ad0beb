use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::asset::AssetId;
use crate::keys::Credential;

/// Base-currency units per ADA, for operator-facing display.
pub const LOVELACE_PER_ADA: u64 = 1_000_000;

/// The chain environment a run targets. Every address in the configuration
/// must carry the matching network tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    /// Case-insensitive parse of the configuration value.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Some(Self::Mainnet),
            "testnet" => Some(Self::Testnet),
            _ => None,
        }
    }

    /// Network id nibble embedded in address headers.
    pub const fn id(self) -> u8 {
        match self {
            Self::Testnet => 0,
            Self::Mainnet => 1,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recipient entry: where to send and how much of the asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutRequest {
    pub address: Address,
    pub quantity: u64,
}

/// The fully validated operation: everything the assembler needs to build,
/// sign, and submit exactly one transaction. Constructed once, never
/// mutated.
#[derive(Debug, Clone)]
pub struct TransactionPlan {
    pub network: Network,
    pub sender: Address,
    pub credential: Credential,
    pub asset: AssetId,
    pub payouts: Vec<PayoutRequest>,
    pub project_id: String,
}

/// One transaction output: a recipient, a base-currency amount, and at most
/// one attached native-asset bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    pub address: Address,
    pub coin: u64,
    pub asset: Option<(AssetId, u64)>,
}

/// Identifier of a submitted (or signed) transaction: blake2b-256 of the
/// transaction body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxId(pub [u8; 32]);

impl Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// A signed transaction ready for review and submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltTransaction {
    pub id: TxId,
    pub bytes: Vec<u8>,
    pub fee: u64,
    pub change_coin: u64,
}

/// Human-readable dump of a signed transaction, rendered by the console
/// before the final confirmation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReview {
    pub id: String,
    pub network: Network,
    pub fee: u64,
    pub size_bytes: usize,
    pub change_address: String,
    pub change_coin: u64,
    pub outputs: Vec<OutputReview>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputReview {
    pub address: String,
    pub coin: u64,
    pub asset_quantity: u64,
    pub asset: String,
}
