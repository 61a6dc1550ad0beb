//! Blockfrost-backed chain state: protocol parameters, UTxO listing, and
//! transaction submission.
//!
//! Calls are blocking and carry no timeout; the whole tool is a
//! straight-line synchronous flow and a hung call hangs the run. Protocol
//! parameters are fetched once and cached for the rest of the run.

use std::cell::RefCell;

use serde::Deserialize;

use crate::address::Address;
use crate::asset::{AssetName, PolicyId};
use crate::builder::{min_coin_for_size, InputSource, ProtocolParameters, Utxo};
use crate::cbor::{self, TxInputRef, Value};
use crate::error::{Result, SpillwayError};
use crate::payout::ChainContext;
use crate::types::{BuiltTransaction, Network, TxId, TxOutput};

pub const MAINNET_BASE_URL: &str = "https://cardano-mainnet.blockfrost.io/api/v0";
pub const PREPROD_BASE_URL: &str = "https://cardano-preprod.blockfrost.io/api/v0";

const UTXO_PAGE_SIZE: usize = 100;
/// Length of the policy-id prefix in a Blockfrost asset unit string.
const UNIT_POLICY_HEX_LEN: usize = 56;

pub struct BlockfrostContext {
    base_url: String,
    project_id: String,
    client: reqwest::blocking::Client,
    parameters: RefCell<Option<ProtocolParameters>>,
}

impl BlockfrostContext {
    pub fn new(network: Network, project_id: &str) -> Self {
        let base_url = match network {
            Network::Mainnet => MAINNET_BASE_URL,
            Network::Testnet => PREPROD_BASE_URL,
        };
        Self {
            base_url: base_url.to_string(),
            project_id: project_id.to_string(),
            client: reqwest::blocking::Client::new(),
            parameters: RefCell::new(None),
        }
    }

    fn get(&self, path: &str) -> Result<(reqwest::StatusCode, String)> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("project_id", &self.project_id)
            .send()
            .map_err(SpillwayError::chain)?;
        let status = response.status();
        let body = response.text().map_err(SpillwayError::chain)?;
        Ok((status, body))
    }

    fn protocol_parameters(&self) -> Result<ProtocolParameters> {
        if let Some(params) = *self.parameters.borrow() {
            return Ok(params);
        }
        let (status, body) = self.get("/epochs/latest/parameters")?;
        if !status.is_success() {
            return Err(SpillwayError::chain(format!(
                "parameters query returned {status}: {body}"
            )));
        }
        let params = parameters_from_json(&body)?;
        *self.parameters.borrow_mut() = Some(params);
        Ok(params)
    }
}

impl InputSource for BlockfrostContext {
    fn utxos_at(&self, address: &Address) -> Result<Vec<Utxo>> {
        let mut utxos = Vec::new();
        let mut page = 1;
        loop {
            let path = format!(
                "/addresses/{}/utxos?count={UTXO_PAGE_SIZE}&page={page}",
                address.as_bech32()
            );
            let (status, body) = self.get(&path)?;
            // Blockfrost answers 404 for addresses the chain has never seen.
            if status == reqwest::StatusCode::NOT_FOUND {
                break;
            }
            if !status.is_success() {
                return Err(SpillwayError::chain(format!(
                    "utxo query returned {status}: {body}"
                )));
            }
            let batch = utxos_from_json(&body)?;
            let last_page = batch.len() < UTXO_PAGE_SIZE;
            utxos.extend(batch);
            if last_page {
                break;
            }
            page += 1;
        }
        Ok(utxos)
    }

    fn parameters(&self) -> Result<ProtocolParameters> {
        self.protocol_parameters()
    }
}

impl ChainContext for BlockfrostContext {
    fn min_required_coin(&self, output: &TxOutput) -> Result<u64> {
        let params = self.protocol_parameters()?;
        let encoded = cbor::encode_output(output.address.as_bytes(), &Value::from_output(output));
        Ok(min_coin_for_size(encoded.len(), &params))
    }

    fn submit(&self, tx: &BuiltTransaction) -> Result<TxId> {
        let url = format!("{}/tx/submit", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("project_id", &self.project_id)
            .header(reqwest::header::CONTENT_TYPE, "application/cbor")
            .body(tx.bytes.clone())
            .send()
            .map_err(SpillwayError::submission)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SpillwayError::submission(format!("{status}: {body}")));
        }
        Ok(tx.id)
    }
}

#[derive(Debug, Deserialize)]
struct RawParameters {
    #[serde(deserialize_with = "flexible_u64")]
    min_fee_a: u64,
    #[serde(deserialize_with = "flexible_u64")]
    min_fee_b: u64,
    #[serde(deserialize_with = "flexible_u64")]
    coins_per_utxo_size: u64,
}

#[derive(Debug, Deserialize)]
struct RawUtxo {
    tx_hash: String,
    output_index: u64,
    amount: Vec<RawAmount>,
}

#[derive(Debug, Deserialize)]
struct RawAmount {
    unit: String,
    quantity: String,
}

/// Blockfrost encodes some numeric parameters as JSON strings.
fn flexible_u64<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
    }
}

fn parameters_from_json(body: &str) -> Result<ProtocolParameters> {
    let raw: RawParameters = serde_json::from_str(body)
        .map_err(|err| SpillwayError::chain(format!("unexpected parameters response: {err}")))?;
    Ok(ProtocolParameters {
        min_fee_a: raw.min_fee_a,
        min_fee_b: raw.min_fee_b,
        coins_per_utxo_byte: raw.coins_per_utxo_size,
    })
}

fn utxos_from_json(body: &str) -> Result<Vec<Utxo>> {
    let raw: Vec<RawUtxo> = serde_json::from_str(body)
        .map_err(|err| SpillwayError::chain(format!("unexpected utxo response: {err}")))?;
    raw.into_iter().map(utxo_from_raw).collect()
}

fn utxo_from_raw(raw: RawUtxo) -> Result<Utxo> {
    let hash = hex::decode(&raw.tx_hash)
        .map_err(|err| SpillwayError::chain(format!("bad tx hash '{}': {err}", raw.tx_hash)))?;
    let hash: [u8; 32] = hash.try_into().map_err(|bytes: Vec<u8>| {
        SpillwayError::chain(format!("tx hash must be 32 bytes, got {}", bytes.len()))
    })?;

    let mut value = Value::default();
    for amount in raw.amount {
        let quantity: u64 = amount.quantity.parse().map_err(|err| {
            SpillwayError::chain(format!("bad quantity '{}': {err}", amount.quantity))
        })?;
        if amount.unit == "lovelace" {
            value.coin = value.coin.saturating_add(quantity);
            continue;
        }
        if amount.unit.len() < UNIT_POLICY_HEX_LEN {
            return Err(SpillwayError::chain(format!(
                "bad asset unit '{}'",
                amount.unit
            )));
        }
        let policy = PolicyId::parse(&amount.unit[..UNIT_POLICY_HEX_LEN])
            .map_err(|err| SpillwayError::chain(format!("bad asset unit '{}': {err}", amount.unit)))?;
        let name = AssetName::parse(&amount.unit[UNIT_POLICY_HEX_LEN..])
            .map_err(|err| SpillwayError::chain(format!("bad asset unit '{}': {err}", amount.unit)))?;
        value.add_asset(policy, name, quantity);
    }

    Ok(Utxo {
        input: TxInputRef {
            hash,
            index: raw.output_index,
        },
        value,
    })
}
