//! UTxO-backed implementation of the transaction-building capability.
//!
//! Selection is deterministic: every UTxO holding a requested asset is
//! taken first (asset coverage), then remaining coin comes largest-first.
//! Leftover coin and every unsent asset return to the change address.

use crate::address::Address;
use crate::cbor::{self, TxInputRef, Value};
use crate::error::{Result, SpillwayError};
use crate::keys::{blake2b_256, Credential};
use crate::payout::TransactionBuilder;
use crate::types::{BuiltTransaction, TxId, TxOutput};

/// Byte overhead the protocol adds to an output's serialized size before
/// applying the per-byte minimum-coin rule.
pub const MIN_COIN_SIZE_OVERHEAD: u64 = 160;

/// Coin reserved for the fee while selecting inputs; the exact fee is only
/// known once the draft is sized. Also serves as the change buffer.
const FEE_CEILING: u64 = 2_000_000;

/// The final body differs from the sizing draft by at most a few bytes of
/// integer width once the real fee and change are substituted; the fee is
/// computed as if the draft were this much larger so it stays at or above
/// the protocol minimum.
const FEE_SIZE_SLACK: u64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolParameters {
    pub min_fee_a: u64,
    pub min_fee_b: u64,
    pub coins_per_utxo_byte: u64,
}

/// Protocol-minimum coin for an output of the given serialized size.
pub fn min_coin_for_size(encoded_len: usize, params: &ProtocolParameters) -> u64 {
    (MIN_COIN_SIZE_OVERHEAD + encoded_len as u64) * params.coins_per_utxo_byte
}

/// One spendable output sitting at a funding address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    pub input: TxInputRef,
    pub value: Value,
}

/// Chain-state reads the builder depends on.
pub trait InputSource {
    fn utxos_at(&self, address: &Address) -> Result<Vec<Utxo>>;
    fn parameters(&self) -> Result<ProtocolParameters>;
}

pub struct UtxoBuilder<'a> {
    source: &'a dyn InputSource,
    input_addresses: Vec<Address>,
    outputs: Vec<TxOutput>,
}

impl<'a> UtxoBuilder<'a> {
    pub fn new(source: &'a dyn InputSource) -> Self {
        Self {
            source,
            input_addresses: Vec::new(),
            outputs: Vec::new(),
        }
    }
}

impl TransactionBuilder for UtxoBuilder<'_> {
    fn add_input_address(&mut self, address: &Address) {
        self.input_addresses.push(address.clone());
    }

    fn add_output(&mut self, output: TxOutput) {
        self.outputs.push(output);
    }

    fn build_and_sign(
        self: Box<Self>,
        credential: &Credential,
        change_address: &Address,
    ) -> Result<BuiltTransaction> {
        let params = self.source.parameters()?;
        let mut available = Vec::new();
        for address in &self.input_addresses {
            available.extend(self.source.utxos_at(address)?);
        }

        let blueprint = plan(&self.outputs, available, &params, change_address)?;

        let body = cbor::encode_body(&blueprint.inputs, &blueprint.outputs, blueprint.fee);
        let id = blake2b_256(&body);
        let signature = credential.sign(&id);
        let bytes = cbor::encode_transaction(
            &blueprint.inputs,
            &blueprint.outputs,
            blueprint.fee,
            credential.verification_key(),
            &signature,
        );

        Ok(BuiltTransaction {
            id: TxId(id),
            bytes,
            fee: blueprint.fee,
            change_coin: blueprint.change_coin,
        })
    }
}

/// Everything that determines the final byte stream, before signing.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Blueprint {
    inputs: Vec<TxInputRef>,
    outputs: Vec<(Vec<u8>, Value)>,
    fee: u64,
    change_coin: u64,
}

fn plan(
    outputs: &[TxOutput],
    mut available: Vec<Utxo>,
    params: &ProtocolParameters,
    change_address: &Address,
) -> Result<Blueprint> {
    if available.is_empty() {
        return Err(SpillwayError::build(
            "no spendable inputs at the funding address",
        ));
    }

    let mut required = Value::default();
    for output in outputs {
        required.coin = required
            .coin
            .checked_add(output.coin)
            .ok_or_else(|| SpillwayError::build("output coin total overflows"))?;
        if let Some((asset, quantity)) = &output.asset {
            required.add_asset(asset.policy, asset.name.clone(), *quantity);
        }
    }

    available.sort_by(|a, b| {
        b.value
            .coin
            .cmp(&a.value.coin)
            .then(a.input.cmp(&b.input))
    });

    // Asset coverage first: any UTxO holding a requested asset is spent.
    let mut used = vec![false; available.len()];
    let mut selected = Value::default();
    for (index, utxo) in available.iter().enumerate() {
        let holds_requested = required.assets.iter().any(|(policy, names)| {
            names
                .keys()
                .any(|name| utxo.value.asset_quantity(policy, name) > 0)
        });
        if holds_requested {
            used[index] = true;
            absorb(&mut selected, &utxo.value);
        }
    }
    for (policy, names) in &required.assets {
        for (name, need) in names {
            let have = selected.asset_quantity(policy, name);
            if have < *need {
                return Err(SpillwayError::build(format!(
                    "insufficient asset {policy}.{name}: need {need}, have {have}"
                )));
            }
        }
    }

    // Then coin, largest-first, with the fee ceiling as buffer.
    let coin_target = required
        .coin
        .checked_add(FEE_CEILING)
        .ok_or_else(|| SpillwayError::build("output coin total overflows"))?;
    for (index, utxo) in available.iter().enumerate() {
        if selected.coin >= coin_target {
            break;
        }
        if !used[index] {
            used[index] = true;
            absorb(&mut selected, &utxo.value);
        }
    }
    if selected.coin < coin_target {
        return Err(SpillwayError::build(format!(
            "insufficient funds: need {} lovelace plus fees, have {}",
            required.coin, selected.coin
        )));
    }

    let mut inputs: Vec<TxInputRef> = available
        .iter()
        .zip(&used)
        .filter(|(_, used)| **used)
        .map(|(utxo, _)| utxo.input)
        .collect();
    inputs.sort_unstable();

    let mut change_assets = selected.assets.clone();
    for (policy, names) in &required.assets {
        for (name, need) in names {
            if let Some(quantity) = change_assets
                .get_mut(policy)
                .and_then(|names| names.get_mut(name))
            {
                *quantity -= need;
            }
        }
    }
    for names in change_assets.values_mut() {
        names.retain(|_, quantity| *quantity > 0);
    }
    change_assets.retain(|_, names| !names.is_empty());

    let mut planned: Vec<(Vec<u8>, Value)> = outputs
        .iter()
        .map(|output| (output.address.as_bytes().to_vec(), Value::from_output(output)))
        .collect();

    // Size a draft with the ceiling fee to learn the real fee.
    let draft_change = Value {
        coin: selected.coin - required.coin - FEE_CEILING,
        assets: change_assets.clone(),
    };
    let mut draft = planned.clone();
    draft.push((change_address.as_bytes().to_vec(), draft_change));
    let draft_tx =
        cbor::encode_transaction(&inputs, &draft, FEE_CEILING, &[0u8; 32], &[0u8; 64]);
    let fee = params.min_fee_a * (draft_tx.len() as u64 + FEE_SIZE_SLACK) + params.min_fee_b;
    if fee > FEE_CEILING {
        return Err(SpillwayError::build(format!(
            "computed fee {fee} exceeds the selection ceiling {FEE_CEILING}; \
             split the payout into smaller batches"
        )));
    }

    let change_coin = selected.coin - required.coin - fee;
    let change_value = Value {
        coin: change_coin,
        assets: change_assets,
    };
    let change_encoded = cbor::encode_output(change_address.as_bytes(), &change_value);
    let change_min = min_coin_for_size(change_encoded.len(), params);
    if change_coin < change_min {
        return Err(SpillwayError::build(format!(
            "insufficient funds: change of {change_coin} lovelace is below the \
             protocol minimum {change_min} for the change output"
        )));
    }
    planned.push((change_address.as_bytes().to_vec(), change_value));

    Ok(Blueprint {
        inputs,
        outputs: planned,
        fee,
        change_coin,
    })
}

fn absorb(total: &mut Value, value: &Value) {
    total.coin = total.coin.saturating_add(value.coin);
    for (policy, names) in &value.assets {
        for (name, quantity) in names {
            total.add_asset(*policy, name.clone(), *quantity);
        }
    }
}
