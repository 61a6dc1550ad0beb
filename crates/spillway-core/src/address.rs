//! Shelley address parsing per the CIP-19 binary layout.
//!
//! An address is bech32 text (`addr` / `addr_test` prefix) wrapping a header
//! byte and credential bytes. The header's high nibble is the address type,
//! the low nibble the network id. Only payment-capable types (0-7) are
//! accepted here; reward addresses cannot receive transaction outputs.

use std::fmt::{self, Display};

use bech32::{Bech32, Hrp};
use thiserror::Error;

use crate::types::Network;

/// Length of a payment or stake credential hash (blake2b-224).
pub const CREDENTIAL_LEN: usize = 28;

const HRP_MAINNET: &str = "addr";
const HRP_TESTNET: &str = "addr_test";

/// Base addresses carry header + payment credential + stake credential.
const BASE_ADDRESS_LEN: usize = 1 + 2 * CREDENTIAL_LEN;
/// Enterprise addresses carry header + payment credential only.
const ENTERPRISE_ADDRESS_LEN: usize = 1 + CREDENTIAL_LEN;

#[derive(Debug, Error)]
pub enum AddressError {
    #[error("{0}")]
    Bech32(String),

    #[error("unknown address prefix '{0}', expected addr or addr_test")]
    UnknownPrefix(String),

    #[error("stake addresses cannot receive payments")]
    StakeAddress,

    #[error("unsupported address type {0}")]
    UnsupportedType(u8),

    #[error("unknown network tag {0} in address header")]
    UnknownNetwork(u8),

    #[error("address prefix '{prefix}' does not match the network tag in the header")]
    PrefixMismatch { prefix: String },

    #[error("address payload is {0} bytes, too short for its type")]
    Truncated(usize),

    #[error("address payload is {got} bytes, expected {expected} for its type")]
    BadLength { got: usize, expected: usize },
}

/// The spending credential embedded in an address: hash of the key that may
/// spend from it, or hash of a governing script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentPart {
    Key([u8; CREDENTIAL_LEN]),
    Script([u8; CREDENTIAL_LEN]),
}

impl PaymentPart {
    pub const fn as_hash(&self) -> &[u8; CREDENTIAL_LEN] {
        match self {
            Self::Key(hash) | Self::Script(hash) => hash,
        }
    }
}

/// A parsed payment address: original text, raw bytes, and the decoded
/// header fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    bech32: String,
    bytes: Vec<u8>,
    network: Network,
    payment: PaymentPart,
}

impl Address {
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let (hrp, bytes) =
            bech32::decode(input.trim()).map_err(|err| AddressError::Bech32(err.to_string()))?;

        let prefix_network = match hrp.as_str() {
            HRP_MAINNET => Network::Mainnet,
            HRP_TESTNET => Network::Testnet,
            other => {
                if other.starts_with("stake") {
                    return Err(AddressError::StakeAddress);
                }
                return Err(AddressError::UnknownPrefix(other.to_string()));
            }
        };

        let header = *bytes.first().ok_or(AddressError::Truncated(0))?;
        let address_type = header >> 4;
        let network = match header & 0x0f {
            0 => Network::Testnet,
            1 => Network::Mainnet,
            tag => return Err(AddressError::UnknownNetwork(tag)),
        };
        if network != prefix_network {
            return Err(AddressError::PrefixMismatch {
                prefix: hrp.as_str().to_string(),
            });
        }

        match address_type {
            0..=3 if bytes.len() != BASE_ADDRESS_LEN => {
                return Err(AddressError::BadLength {
                    got: bytes.len(),
                    expected: BASE_ADDRESS_LEN,
                })
            }
            6 | 7 if bytes.len() != ENTERPRISE_ADDRESS_LEN => {
                return Err(AddressError::BadLength {
                    got: bytes.len(),
                    expected: ENTERPRISE_ADDRESS_LEN,
                })
            }
            4 | 5 if bytes.len() <= ENTERPRISE_ADDRESS_LEN => {
                return Err(AddressError::Truncated(bytes.len()))
            }
            0..=7 => {}
            14 | 15 => return Err(AddressError::StakeAddress),
            other => return Err(AddressError::UnsupportedType(other)),
        }

        let mut hash = [0u8; CREDENTIAL_LEN];
        hash.copy_from_slice(&bytes[1..1 + CREDENTIAL_LEN]);
        let payment = if address_type % 2 == 0 {
            PaymentPart::Key(hash)
        } else {
            PaymentPart::Script(hash)
        };

        Ok(Self {
            bech32: input.trim().to_string(),
            bytes,
            network,
            payment,
        })
    }

    /// Assemble an address from decoded parts: enterprise when `delegation`
    /// is absent, key-delegated base address otherwise.
    pub fn from_parts(
        network: Network,
        payment: PaymentPart,
        delegation: Option<[u8; CREDENTIAL_LEN]>,
    ) -> Self {
        let type_nibble: u8 = match (&payment, delegation.is_some()) {
            (PaymentPart::Key(_), true) => 0,
            (PaymentPart::Script(_), true) => 1,
            (PaymentPart::Key(_), false) => 6,
            (PaymentPart::Script(_), false) => 7,
        };

        let mut bytes = Vec::with_capacity(BASE_ADDRESS_LEN);
        bytes.push((type_nibble << 4) | network.id());
        bytes.extend_from_slice(payment.as_hash());
        if let Some(stake) = delegation {
            bytes.extend_from_slice(&stake);
        }

        let hrp = match network {
            Network::Mainnet => Hrp::parse(HRP_MAINNET),
            Network::Testnet => Hrp::parse(HRP_TESTNET),
        }
        .expect("static address prefixes are valid hrps");
        let bech32 = bech32::encode::<Bech32>(hrp, &bytes)
            .expect("assembled address payload is within bech32 limits");

        Self {
            bech32,
            bytes,
            network,
            payment,
        }
    }

    pub const fn network(&self) -> Network {
        self.network
    }

    pub const fn payment(&self) -> &PaymentPart {
        &self.payment
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_bech32(&self) -> &str {
        &self.bech32
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.bech32)
    }
}
