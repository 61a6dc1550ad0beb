//! Transaction assembly: turn a validated plan into one signed, confirmed,
//! submitted transaction.

use crate::address::Address;
use crate::console::Console;
use crate::error::{Result, SpillwayError};
use crate::keys::Credential;
use crate::types::{
    BuiltTransaction, OutputReview, TransactionPlan, TransactionReview, TxId, TxOutput,
};

/// Placeholder coin used only to size-probe an output before querying the
/// protocol minimum. The minimum rule depends on the output's serialized
/// byte size, which includes the coin's own integer width, so the probe
/// must carry a realistic amount rather than zero.
pub const PLACEHOLDER_COIN: u64 = 2_000_000;

/// Chain-state capabilities the assembler consumes: the protocol-minimum
/// sizing rule and transaction submission.
pub trait ChainContext {
    fn min_required_coin(&self, output: &TxOutput) -> Result<u64>;
    fn submit(&self, tx: &BuiltTransaction) -> Result<TxId>;
}

/// Transaction construction capability. Input selection, fee computation,
/// change, and signing all live behind `build_and_sign`; no intermediate
/// transaction state is exposed.
pub trait TransactionBuilder {
    fn add_input_address(&mut self, address: &Address);
    fn add_output(&mut self, output: TxOutput);
    fn build_and_sign(
        self: Box<Self>,
        credential: &Credential,
        change_address: &Address,
    ) -> Result<BuiltTransaction>;
}

/// Build, sign, confirm, and submit the plan's transaction. Every error is
/// fatal to the run; a declined review aborts before any submission call.
pub fn execute(
    plan: &TransactionPlan,
    context: &dyn ChainContext,
    mut builder: Box<dyn TransactionBuilder + '_>,
    console: &mut dyn Console,
) -> Result<TxId> {
    builder.add_input_address(&plan.sender);
    console.info(&format!("funding from {}", plan.sender));

    console.progress("querying protocol minimums");
    let mut reviews = Vec::with_capacity(plan.payouts.len());
    for payout in &plan.payouts {
        let bundle = (plan.asset.clone(), payout.quantity);

        // Two passes on purpose: the provisional output exists only to
        // measure serialized size under a realistic coin width.
        let provisional = TxOutput {
            address: payout.address.clone(),
            coin: PLACEHOLDER_COIN,
            asset: Some(bundle.clone()),
        };
        let coin = context.min_required_coin(&provisional)?;

        let output = TxOutput {
            address: payout.address.clone(),
            coin,
            asset: Some(bundle),
        };
        reviews.push(OutputReview {
            address: output.address.to_string(),
            coin,
            asset_quantity: payout.quantity,
            asset: plan.asset.to_string(),
        });
        builder.add_output(output);
    }

    console.progress("building and signing");
    let tx = builder.build_and_sign(&plan.credential, &plan.sender)?;

    console.review_transaction(&TransactionReview {
        id: tx.id.to_string(),
        network: plan.network,
        fee: tx.fee,
        size_bytes: tx.bytes.len(),
        change_address: plan.sender.to_string(),
        change_coin: tx.change_coin,
        outputs: reviews,
    });
    if !console.confirm("Are you sure you want to submit the transaction above?")? {
        return Err(SpillwayError::cancelled("transaction not submitted"));
    }

    console.progress("submitting");
    context.submit(&tx)
}
