//! Deterministic CBOR encoding of outputs and transactions.
//!
//! Outputs use the array form `[address, value]`, values the
//! `coin | [coin, {policy: {name: qty}}]` form, the body the
//! `{0: inputs, 1: outputs, 2: fee}` map, and the full transaction the
//! `[body, witness_set, true, null]` array. Asset maps are keyed through
//! `BTreeMap` so the byte stream is stable for a given input.

use std::collections::BTreeMap;
use std::convert::Infallible;

use minicbor::Encoder;

use crate::asset::{AssetName, PolicyId};
use crate::types::TxOutput;

type EncodeResult = Result<(), minicbor::encode::Error<Infallible>>;

/// A transaction input reference: producing transaction id and output
/// index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TxInputRef {
    pub hash: [u8; 32],
    pub index: u64,
}

/// An output's worth: base currency plus any native-asset bundles.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Value {
    pub coin: u64,
    pub assets: BTreeMap<PolicyId, BTreeMap<AssetName, u64>>,
}

impl Value {
    pub fn coin_only(coin: u64) -> Self {
        Self {
            coin,
            assets: BTreeMap::new(),
        }
    }

    pub fn from_output(output: &TxOutput) -> Self {
        let mut value = Self::coin_only(output.coin);
        if let Some((asset, quantity)) = &output.asset {
            value.add_asset(asset.policy, asset.name.clone(), *quantity);
        }
        value
    }

    pub fn add_asset(&mut self, policy: PolicyId, name: AssetName, quantity: u64) {
        let slot = self
            .assets
            .entry(policy)
            .or_default()
            .entry(name)
            .or_insert(0);
        *slot = slot.saturating_add(quantity);
    }

    pub fn asset_quantity(&self, policy: &PolicyId, name: &AssetName) -> u64 {
        self.assets
            .get(policy)
            .and_then(|names| names.get(name))
            .copied()
            .unwrap_or(0)
    }
}

/// Serialize one output, the unit the protocol-minimum rule is sized on.
pub fn encode_output(address: &[u8], value: &Value) -> Vec<u8> {
    let mut encoder = Encoder::new(Vec::new());
    write_output(&mut encoder, address, value).expect("encoding to a vec cannot fail");
    encoder.into_writer()
}

/// Serialize a transaction body; its blake2b-256 hash is both the signing
/// message and the transaction id.
pub fn encode_body(inputs: &[TxInputRef], outputs: &[(Vec<u8>, Value)], fee: u64) -> Vec<u8> {
    let mut encoder = Encoder::new(Vec::new());
    write_body(&mut encoder, inputs, outputs, fee).expect("encoding to a vec cannot fail");
    encoder.into_writer()
}

/// Serialize the complete signed transaction envelope.
pub fn encode_transaction(
    inputs: &[TxInputRef],
    outputs: &[(Vec<u8>, Value)],
    fee: u64,
    verification_key: &[u8; 32],
    signature: &[u8; 64],
) -> Vec<u8> {
    let mut encoder = Encoder::new(Vec::new());
    write_transaction(&mut encoder, inputs, outputs, fee, verification_key, signature)
        .expect("encoding to a vec cannot fail");
    encoder.into_writer()
}

fn write_value(encoder: &mut Encoder<Vec<u8>>, value: &Value) -> EncodeResult {
    if value.assets.is_empty() {
        encoder.u64(value.coin)?;
        return Ok(());
    }

    encoder.array(2)?.u64(value.coin)?;
    encoder.map(value.assets.len() as u64)?;
    for (policy, names) in &value.assets {
        encoder.bytes(policy.as_bytes())?;
        encoder.map(names.len() as u64)?;
        for (name, quantity) in names {
            encoder.bytes(name.as_bytes())?.u64(*quantity)?;
        }
    }
    Ok(())
}

fn write_output(encoder: &mut Encoder<Vec<u8>>, address: &[u8], value: &Value) -> EncodeResult {
    encoder.array(2)?.bytes(address)?;
    write_value(encoder, value)
}

fn write_body(
    encoder: &mut Encoder<Vec<u8>>,
    inputs: &[TxInputRef],
    outputs: &[(Vec<u8>, Value)],
    fee: u64,
) -> EncodeResult {
    encoder.map(3)?;

    encoder.u8(0)?.array(inputs.len() as u64)?;
    for input in inputs {
        encoder.array(2)?.bytes(&input.hash)?.u64(input.index)?;
    }

    encoder.u8(1)?.array(outputs.len() as u64)?;
    for (address, value) in outputs {
        write_output(encoder, address, value)?;
    }

    encoder.u8(2)?.u64(fee)?;
    Ok(())
}

fn write_transaction(
    encoder: &mut Encoder<Vec<u8>>,
    inputs: &[TxInputRef],
    outputs: &[(Vec<u8>, Value)],
    fee: u64,
    verification_key: &[u8; 32],
    signature: &[u8; 64],
) -> EncodeResult {
    encoder.array(4)?;
    write_body(encoder, inputs, outputs, fee)?;

    // Witness set with a single vkey witness.
    encoder.map(1)?.u8(0)?.array(1)?;
    encoder.array(2)?.bytes(verification_key)?.bytes(signature)?;

    encoder.bool(true)?;
    encoder.null()?;
    Ok(())
}
