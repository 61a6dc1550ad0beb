//! Schema pass over the operator's configuration document.
//!
//! One serde deserialization enforces presence and JSON types for every
//! field; anything missing or ill-typed fails here with serde's field-named
//! message. Domain checks (network tags, address well-formedness, credential
//! match) happen afterwards in `validate`.

use serde::Deserialize;

use crate::error::{Result, SpillwayError};

/// The raw document, exactly as configured. Field order mirrors the
/// validation order, so serde's first missing-field report names the
/// earliest absent field.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfig {
    pub network: String,
    pub signing_key: String,
    pub address: String,
    pub blockfrost_project_id: String,
    pub outputs: Vec<RawOutput>,
    pub asset: RawAsset,
}

/// Amounts are read as signed so that a negative entry survives the schema
/// pass and fails the semantic pass with a message naming the output.
#[derive(Debug, Clone, Deserialize)]
pub struct RawOutput {
    pub address: String,
    pub amount: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAsset {
    pub policy_id: String,
    pub asset_name: String,
}

pub fn parse_document(document: &str) -> Result<RawConfig> {
    serde_json::from_str(document).map_err(|err| SpillwayError::Config {
        message: err.to_string(),
    })
}
