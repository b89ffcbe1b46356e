//! Serde shapes of the lightningd hook and notification payloads we use.
use anyhow::{anyhow, Error};
use cln_rpc::primitives::{Amount, ShortChannelId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{
    gate::InterceptedHtlc,
    primitives::{PaymentHash, Preimage},
    registry::HtlcMeta,
    responder::HtlcResolution,
};

#[derive(Debug, Deserialize)]
pub struct Htlc {
    pub payment_hash: PaymentHash,
    pub cltv_expiry: u32,
    pub amount_msat: Option<Amount>,
    pub id: Option<u64>,
    pub short_channel_id: Option<ShortChannelId>,
}

#[derive(Debug, Deserialize)]
pub struct HtlcAcceptedRequest {
    pub htlc: Htlc,
}

impl From<Htlc> for InterceptedHtlc {
    fn from(htlc: Htlc) -> Self {
        InterceptedHtlc {
            payment_hash: htlc.payment_hash,
            cltv_expiry: htlc.cltv_expiry,
            meta: HtlcMeta {
                short_channel_id: htlc.short_channel_id.map(|scid| scid.to_string()),
                htlc_id: htlc.id,
                amount_msat: htlc.amount_msat.map(|amt| amt.msat()),
                arrival_height: None,
            },
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HtlcAcceptedResult {
    Continue,
    Fail,
    Resolve,
}

#[derive(Debug, Serialize)]
pub struct HtlcAcceptedResponse {
    pub result: HtlcAcceptedResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_key: Option<Preimage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,
}

impl From<HtlcResolution> for HtlcAcceptedResponse {
    fn from(resolution: HtlcResolution) -> Self {
        match resolution {
            HtlcResolution::Continue => Self {
                result: HtlcAcceptedResult::Continue,
                payment_key: None,
                failure_message: None,
            },
            HtlcResolution::Resolve { payment_key } => Self {
                result: HtlcAcceptedResult::Resolve,
                payment_key: Some(payment_key),
                failure_message: None,
            },
            HtlcResolution::Fail { failure_message } => Self {
                result: HtlcAcceptedResult::Fail,
                payment_key: None,
                failure_message: Some(failure_message),
            },
        }
    }
}

/// Reads the height out of a `block_added` notification. Older nodes wrap
/// the block in `block` instead of `block_added`.
pub fn parse_block_height(v: &Value) -> Result<u32, Error> {
    let block = if let Some(b) = v.get("block_added") {
        b
    } else if let Some(b) = v.get("block") {
        b
    } else {
        return Err(anyhow!("could not read block notification"));
    };
    let height = block
        .get("height")
        .and_then(|h| h.as_u64())
        .ok_or_else(|| anyhow!("could not find height for block"))?;
    u32::try_from(height).map_err(|_| anyhow!("block height {} out of range", height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_htlc_accepted_payload() {
        let v = json!({
            "onion": {
                "payload": "",
                "type": "tlv",
                "forward_msat": 1000,
                "outgoing_cltv_value": 150,
                "shared_secret": "00".repeat(32),
                "next_onion": "00"
            },
            "htlc": {
                "short_channel_id": "103x1x0",
                "id": 2,
                "amount_msat": 1000,
                "cltv_expiry": 150,
                "cltv_expiry_relative": 20,
                "payment_hash": "11".repeat(32)
            }
        });
        let req: HtlcAcceptedRequest = serde_json::from_value(v).unwrap();
        let htlc = InterceptedHtlc::from(req.htlc);
        assert_eq!(htlc.payment_hash, PaymentHash::from_byte_array([0x11; 32]));
        assert_eq!(htlc.cltv_expiry, 150);
        assert_eq!(htlc.meta.short_channel_id.as_deref(), Some("103x1x0"));
        assert_eq!(htlc.meta.htlc_id, Some(2));
        assert_eq!(htlc.meta.amount_msat, Some(1000));
    }

    #[test]
    fn rejects_payload_without_cltv() {
        let v = json!({"htlc": {"payment_hash": "11".repeat(32)}});
        assert!(serde_json::from_value::<HtlcAcceptedRequest>(v).is_err());
    }

    #[test]
    fn serializes_responses() {
        let preimage = Preimage::from_byte_array([0xab; 32]);
        let cases = vec![
            (HtlcResolution::Continue, json!({"result": "continue"})),
            (
                HtlcResolution::Resolve {
                    payment_key: preimage,
                },
                json!({"result": "resolve", "payment_key": "ab".repeat(32)}),
            ),
            (
                HtlcResolution::expired(),
                json!({"result": "fail", "failure_message": "2002"}),
            ),
        ];
        for (resolution, expected) in cases {
            let res = serde_json::to_value(HtlcAcceptedResponse::from(resolution)).unwrap();
            assert_eq!(res, expected);
        }
    }

    #[test]
    fn parses_block_height() {
        assert_eq!(
            parse_block_height(&json!({"block_added": {"hash": "00", "height": 812}})).unwrap(),
            812
        );
        assert_eq!(
            parse_block_height(&json!({"block": {"hash": "00", "height": 811}})).unwrap(),
            811
        );
        assert!(parse_block_height(&json!({"block_added": {"hash": "00"}})).is_err());
        assert!(parse_block_height(&json!({"height": 5})).is_err());
        assert!(parse_block_height(&json!({"block_added": {"height": u64::MAX}})).is_err());
    }
}
