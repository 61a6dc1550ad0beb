//! Native-asset identifier parsing.

use std::fmt::{self, Display};

use thiserror::Error;

/// A policy identifier is the 224-bit hash of the asset's minting script.
pub const POLICY_ID_LEN: usize = 28;
/// Ledger-imposed ceiling on asset name length.
pub const MAX_ASSET_NAME_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("policy id must be {POLICY_ID_LEN} bytes, got {0}")]
    PolicyLength(usize),

    #[error("asset name must be at most {MAX_ASSET_NAME_LEN} bytes, got {0}")]
    NameLength(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PolicyId([u8; POLICY_ID_LEN]);

impl PolicyId {
    pub fn parse(input: &str) -> Result<Self, AssetError> {
        let raw = hex::decode(input.trim())?;
        let raw: [u8; POLICY_ID_LEN] = raw
            .try_into()
            .map_err(|raw: Vec<u8>| AssetError::PolicyLength(raw.len()))?;
        Ok(Self(raw))
    }

    pub const fn as_bytes(&self) -> &[u8; POLICY_ID_LEN] {
        &self.0
    }
}

impl Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetName(Vec<u8>);

impl AssetName {
    pub fn parse(input: &str) -> Result<Self, AssetError> {
        let raw = hex::decode(input.trim())?;
        if raw.len() > MAX_ASSET_NAME_LEN {
            return Err(AssetError::NameLength(raw.len()));
        }
        Ok(Self(raw))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

/// Full identifier of a native asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetId {
    pub policy: PolicyId,
    pub name: AssetName,
}

impl Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.policy, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::{AssetError, AssetName, PolicyId, MAX_ASSET_NAME_LEN};

    const POLICY_HEX: &str = "57fca08abbaddee36da742a839f7d83a7e1d2419f1507fcbf3916522";

    #[test]
    fn parses_well_formed_policy_id() {
        let policy = PolicyId::parse(POLICY_HEX).unwrap();
        assert_eq!(policy.to_string(), POLICY_HEX);
    }

    #[test]
    fn rejects_wrong_policy_lengths() {
        assert!(matches!(
            PolicyId::parse("abcd"),
            Err(AssetError::PolicyLength(2))
        ));
        let too_long = format!("{POLICY_HEX}ff");
        assert!(matches!(
            PolicyId::parse(&too_long),
            Err(AssetError::PolicyLength(29))
        ));
    }

    #[test]
    fn rejects_non_hex_policy() {
        assert!(matches!(
            PolicyId::parse("zz".repeat(28).as_str()),
            Err(AssetError::Hex(_))
        ));
    }

    #[test]
    fn parses_asset_names_including_empty() {
        // "TOKEN"
        let name = AssetName::parse("544f4b454e").unwrap();
        assert_eq!(name.as_bytes(), b"TOKEN");
        assert_eq!(name.to_string(), "544f4b454e");

        let empty = AssetName::parse("").unwrap();
        assert!(empty.as_bytes().is_empty());
    }

    #[test]
    fn rejects_oversized_asset_names() {
        let oversized = "ab".repeat(MAX_ASSET_NAME_LEN + 1);
        assert!(matches!(
            AssetName::parse(&oversized),
            Err(AssetError::NameLength(33))
        ));
    }
}
