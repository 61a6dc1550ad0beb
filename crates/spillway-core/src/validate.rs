//! Fail-fast semantic validation of the configuration document.
//!
//! Checks run in a fixed order and the first violation aborts the run; no
//! partial plan ever escapes. The network confirmation prompt happens here,
//! before any key material is touched.

use crate::address::{Address, PaymentPart};
use crate::asset::{AssetId, AssetName, PolicyId};
use crate::config::{self, RawConfig};
use crate::console::Console;
use crate::error::{Result, SpillwayError};
use crate::keys::Credential;
use crate::types::{Network, PayoutRequest, TransactionPlan};

/// Validate the document and produce the plan, or fail with a diagnostic
/// naming the offending field.
pub fn validate_document(document: &str, console: &mut dyn Console) -> Result<TransactionPlan> {
    let raw = config::parse_document(document)?;
    validate_config(&raw, console)
}

fn validate_config(raw: &RawConfig, console: &mut dyn Console) -> Result<TransactionPlan> {
    let network = Network::parse(&raw.network).ok_or_else(|| {
        SpillwayError::config(format!(
            "network must be testnet or mainnet, got '{}'",
            raw.network
        ))
    })?;
    if !console.confirm(&format!("Selected {network}. Confirm"))? {
        return Err(SpillwayError::cancelled("network selection not confirmed"));
    }

    let credential = Credential::from_cbor_hex(&raw.signing_key)
        .map_err(|err| SpillwayError::parse("signing_key", err))?;

    let sender = Address::parse(&raw.address)
        .map_err(|err| SpillwayError::parse(format!("sender address '{}'", raw.address), err))?;
    if sender.network() != network {
        return Err(SpillwayError::NetworkMismatch {
            entity: format!("sender address {sender}"),
            expected: network,
            found: sender.network(),
        });
    }
    match sender.payment() {
        PaymentPart::Key(hash) if hash == credential.payment_hash() => {}
        _ => return Err(SpillwayError::CredentialMismatch),
    }

    if raw.blockfrost_project_id.trim().is_empty() {
        return Err(SpillwayError::config("blockfrost_project_id is empty"));
    }

    if raw.outputs.is_empty() {
        return Err(SpillwayError::config("outputs must not be empty"));
    }
    let mut payouts = Vec::with_capacity(raw.outputs.len());
    for (index, output) in raw.outputs.iter().enumerate() {
        if output.amount <= 0 {
            return Err(SpillwayError::config(format!(
                "outputs[{index}]: amount must be a positive integer, got {}",
                output.amount
            )));
        }
        let address = Address::parse(&output.address).map_err(|err| {
            SpillwayError::parse(format!("output address '{}'", output.address), err)
        })?;
        if address.network() != network {
            return Err(SpillwayError::NetworkMismatch {
                entity: format!("output address {address}"),
                expected: network,
                found: address.network(),
            });
        }
        payouts.push(PayoutRequest {
            address,
            quantity: output.amount as u64,
        });
    }

    let policy = PolicyId::parse(&raw.asset.policy_id)
        .map_err(|err| SpillwayError::parse("asset.policy_id", err))?;
    let name = AssetName::parse(&raw.asset.asset_name)
        .map_err(|err| SpillwayError::parse("asset.asset_name", err))?;

    Ok(TransactionPlan {
        network,
        sender,
        credential,
        asset: AssetId { policy, name },
        payouts,
        project_id: raw.blockfrost_project_id.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::validate_document;
    use crate::address::{Address, PaymentPart};
    use crate::console::Console;
    use crate::error::{Result, SpillwayError};
    use crate::keys::Credential;
    use crate::types::{Network, TransactionReview};

    const SEED_HEX: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";

    struct YesConsole {
        prompts: Vec<String>,
    }

    impl YesConsole {
        fn new() -> Self {
            Self {
                prompts: Vec::new(),
            }
        }
    }

    impl Console for YesConsole {
        fn info(&mut self, _line: &str) {}
        fn progress(&mut self, _message: &str) {}
        fn review_transaction(&mut self, _review: &TransactionReview) {}
        fn confirm(&mut self, prompt: &str) -> Result<bool> {
            self.prompts.push(prompt.to_string());
            Ok(true)
        }
    }

    struct NoConsole;

    impl Console for NoConsole {
        fn info(&mut self, _line: &str) {}
        fn progress(&mut self, _message: &str) {}
        fn review_transaction(&mut self, _review: &TransactionReview) {}
        fn confirm(&mut self, _prompt: &str) -> Result<bool> {
            Ok(false)
        }
    }

    fn signing_key() -> String {
        format!("5820{SEED_HEX}")
    }

    fn sender_for(network: Network) -> Address {
        let credential = Credential::from_cbor_hex(&signing_key()).unwrap();
        Address::from_parts(network, PaymentPart::Key(*credential.payment_hash()), None)
    }

    fn recipient_for(network: Network, seed: u8) -> Address {
        Address::from_parts(network, PaymentPart::Key([seed; 28]), None)
    }

    fn document(network: &str, outputs: serde_json::Value) -> String {
        serde_json::json!({
            "network": network,
            "signing_key": signing_key(),
            "address": sender_for(Network::parse(network).unwrap_or(Network::Testnet)).to_string(),
            "blockfrost_project_id": "preprodproject",
            "outputs": outputs,
            "asset": {
                "policy_id": "cd".repeat(28),
                "asset_name": "544f4b454e"
            }
        })
        .to_string()
    }

    #[test]
    fn accepts_a_fully_valid_testnet_document() {
        let doc = document(
            "testnet",
            serde_json::json!([
                {"address": recipient_for(Network::Testnet, 1).to_string(), "amount": 5},
                {"address": recipient_for(Network::Testnet, 2).to_string(), "amount": 7},
            ]),
        );
        let mut console = YesConsole::new();
        let plan = validate_document(&doc, &mut console).unwrap();

        assert_eq!(plan.network, Network::Testnet);
        assert_eq!(plan.payouts.len(), 2);
        assert_eq!(plan.payouts[0].quantity, 5);
        assert_eq!(plan.payouts[1].quantity, 7);
        assert_eq!(plan.project_id, "preprodproject");
        assert_eq!(console.prompts.len(), 1);
        assert!(console.prompts[0].contains("testnet"));
    }

    #[test]
    fn network_casing_is_tolerated_and_named_in_the_prompt() {
        let doc = document(
            "TestNet",
            serde_json::json!([
                {"address": recipient_for(Network::Testnet, 1).to_string(), "amount": 1},
            ]),
        );
        let mut console = YesConsole::new();
        assert!(validate_document(&doc, &mut console).is_ok());
        assert!(console.prompts[0].contains("testnet"));
    }

    #[test]
    fn unknown_network_is_a_config_error_before_any_prompt() {
        let doc = document("preview", serde_json::json!([]));
        let mut console = YesConsole::new();
        let err = validate_document(&doc, &mut console).unwrap_err();
        assert!(matches!(err, SpillwayError::Config { .. }));
        assert!(console.prompts.is_empty());
    }

    #[test]
    fn declined_network_prompt_cancels_the_run() {
        let doc = document(
            "testnet",
            serde_json::json!([
                {"address": recipient_for(Network::Testnet, 1).to_string(), "amount": 1},
            ]),
        );
        let err = validate_document(&doc, &mut NoConsole).unwrap_err();
        assert!(err.is_cancellation());
    }

    #[test]
    fn malformed_signing_key_is_a_parse_error() {
        let doc = document(
            "testnet",
            serde_json::json!([
                {"address": recipient_for(Network::Testnet, 1).to_string(), "amount": 1},
            ]),
        )
        .replace(&signing_key(), "not-hex");
        let err = validate_document(&doc, &mut YesConsole::new()).unwrap_err();
        match err {
            SpillwayError::Parse { what, .. } => assert_eq!(what, "signing_key"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn sender_on_the_wrong_network_is_a_mismatch() {
        let sender = sender_for(Network::Mainnet);
        let doc = serde_json::json!({
            "network": "testnet",
            "signing_key": signing_key(),
            "address": sender.to_string(),
            "blockfrost_project_id": "p",
            "outputs": [{"address": recipient_for(Network::Testnet, 1).to_string(), "amount": 1}],
            "asset": {"policy_id": "cd".repeat(28), "asset_name": ""}
        })
        .to_string();
        let err = validate_document(&doc, &mut YesConsole::new()).unwrap_err();
        match err {
            SpillwayError::NetworkMismatch {
                expected, found, ..
            } => {
                assert_eq!(expected, Network::Testnet);
                assert_eq!(found, Network::Mainnet);
            }
            other => panic!("expected network mismatch, got {other:?}"),
        }
    }

    #[test]
    fn foreign_sender_address_is_a_credential_mismatch() {
        let foreign = recipient_for(Network::Testnet, 9);
        let doc = serde_json::json!({
            "network": "testnet",
            "signing_key": signing_key(),
            "address": foreign.to_string(),
            "blockfrost_project_id": "p",
            "outputs": [{"address": recipient_for(Network::Testnet, 1).to_string(), "amount": 1}],
            "asset": {"policy_id": "cd".repeat(28), "asset_name": ""}
        })
        .to_string();
        let err = validate_document(&doc, &mut YesConsole::new()).unwrap_err();
        assert!(matches!(err, SpillwayError::CredentialMismatch));
    }

    #[test]
    fn empty_outputs_are_rejected() {
        let doc = document("testnet", serde_json::json!([]));
        let err = validate_document(&doc, &mut YesConsole::new()).unwrap_err();
        assert!(err.to_string().contains("outputs"));
    }

    #[test]
    fn non_positive_amounts_name_the_offending_output() {
        for bad in [0i64, -5] {
            let doc = document(
                "testnet",
                serde_json::json!([
                    {"address": recipient_for(Network::Testnet, 1).to_string(), "amount": 1},
                    {"address": recipient_for(Network::Testnet, 2).to_string(), "amount": bad},
                ]),
            );
            let err = validate_document(&doc, &mut YesConsole::new()).unwrap_err();
            let text = err.to_string();
            assert!(text.contains("outputs[1]"), "got: {text}");
        }
    }

    #[test]
    fn unparseable_output_address_names_the_address() {
        let doc = document(
            "testnet",
            serde_json::json!([{"address": "garbage", "amount": 1}]),
        );
        let err = validate_document(&doc, &mut YesConsole::new()).unwrap_err();
        assert!(err.to_string().contains("garbage"));
    }

    #[test]
    fn mainnet_recipient_under_testnet_selection_is_a_mismatch() {
        let doc = document(
            "testnet",
            serde_json::json!([
                {"address": recipient_for(Network::Mainnet, 1).to_string(), "amount": 5},
            ]),
        );
        let err = validate_document(&doc, &mut YesConsole::new()).unwrap_err();
        match err {
            SpillwayError::NetworkMismatch { entity, .. } => {
                assert!(entity.contains("output address"));
            }
            other => panic!("expected network mismatch, got {other:?}"),
        }
    }

    #[test]
    fn bad_asset_fields_surface_the_decoder_error() {
        let mut doc: serde_json::Value = serde_json::from_str(&document(
            "testnet",
            serde_json::json!([
                {"address": recipient_for(Network::Testnet, 1).to_string(), "amount": 1},
            ]),
        ))
        .unwrap();

        doc["asset"]["policy_id"] = serde_json::json!("abcd");
        let err = validate_document(&doc.to_string(), &mut YesConsole::new()).unwrap_err();
        match &err {
            SpillwayError::Parse { what, message } => {
                assert_eq!(what, "asset.policy_id");
                assert!(message.contains("28"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }

        doc["asset"]["policy_id"] = serde_json::json!("cd".repeat(28));
        doc["asset"]["asset_name"] = serde_json::json!("zz");
        let err = validate_document(&doc.to_string(), &mut YesConsole::new()).unwrap_err();
        assert!(matches!(err, SpillwayError::Parse { .. }));
    }
}
