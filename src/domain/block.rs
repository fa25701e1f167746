//! Block payloads delivered by the "new block" notification.
//!
//! The explorer pushes a `{ "block": { ... } }` envelope for every block it
//! connects. Field names follow the server's JSON exactly, which mixes
//! camelCase (`unixStamp`) with Go-style names (`TotalSent`, `Tx`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Block Components
// ============================================================================

/// A regular transaction, ticket or revocation inside a block payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxSummary {
    /// Transaction hash.
    #[serde(rename = "TxID")]
    pub tx_id: String,
    /// Total output value in DCR.
    #[serde(rename = "Total")]
    pub total: f64,
    /// Number of inputs.
    #[serde(rename = "VinCount")]
    pub vin_count: u32,
    /// Number of outputs.
    #[serde(rename = "VoutCount")]
    pub vout_count: u32,
    /// Whether this is the block reward transaction.
    #[serde(rename = "Coinbase")]
    pub coinbase: bool,
}

/// A stakeholder vote inside a block payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoteSummary {
    /// Vote transaction hash.
    #[serde(rename = "TxID")]
    pub tx_id: String,
    /// Total value in DCR.
    #[serde(rename = "Total")]
    pub total: f64,
    /// Whether the vote approves the previous block.
    #[serde(rename = "VoteValid")]
    pub vote_valid: bool,
}

/// Block subsidy split, in atoms.
///
/// Older servers report the treasury share as `dev`, newer ones as
/// `developer`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subsidy {
    /// Proof-of-work share.
    pub pow: i64,
    /// Proof-of-stake share.
    pub pos: i64,
    /// Project fund share.
    pub developer: i64,
    /// Legacy name of the project fund share.
    pub dev: i64,
}

impl Subsidy {
    /// Project fund share regardless of which field name the server used.
    #[must_use]
    pub const fn fund(&self) -> i64 {
        if self.developer != 0 {
            self.developer
        } else {
            self.dev
        }
    }

    /// Returns `true` when no share is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pow == 0 && self.pos == 0 && self.fund() == 0
    }
}

/// Block time as sent by the server: unix seconds or a preformatted string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockTime {
    /// Seconds since the unix epoch.
    Unix(i64),
    /// Already formatted by the server.
    Text(String),
}

impl Default for BlockTime {
    fn default() -> Self {
        Self::Unix(0)
    }
}

// ============================================================================
// Block Payload
// ============================================================================

/// The block record carried by a block-arrival event.
///
/// Every field defaults when missing; a malformed payload renders as empty
/// cells instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockPayload {
    /// Block height.
    pub height: u64,
    /// Block timestamp in unix seconds.
    #[serde(rename = "unixStamp")]
    pub unix_stamp: i64,
    /// Serialized size in bytes.
    pub size: u64,
    /// Total value sent in the block, in DCR.
    #[serde(rename = "TotalSent")]
    pub total_sent: f64,
    /// Block time.
    pub time: BlockTime,
    /// Regular transactions, including the coinbase.
    #[serde(rename = "Tx")]
    pub tx: Vec<TxSummary>,
    /// Votes included in the block.
    #[serde(rename = "Votes")]
    pub votes: Vec<VoteSummary>,
    /// Tickets purchased in the block.
    #[serde(rename = "Tickets")]
    pub tickets: Vec<TxSummary>,
    /// Revocations included in the block.
    #[serde(rename = "Revs")]
    pub revs: Vec<TxSummary>,
    /// Subsidy split; absent for blocks without a known subsidy.
    #[serde(rename = "Subsidy")]
    pub subsidy: Option<Subsidy>,
    /// Total transaction fees, in DCR.
    #[serde(rename = "MiningFee")]
    pub mining_fee: f64,
    /// The JSON the payload was decoded from.
    #[serde(skip)]
    pub raw: Value,
}

impl BlockPayload {
    /// Decode a block record, keeping the raw JSON for untyped columns.
    ///
    /// A record whose fields have the wrong JSON types decodes to the default
    /// payload; the raw value is still kept.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let mut payload = match serde_json::from_value::<Self>(value.clone()) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Malformed block payload, rendering defaults: {e}");
                Self::default()
            }
        };
        payload.raw = value;
        payload
    }

    /// Decode the `{ "block": { ... } }` envelope of a block-arrival event.
    ///
    /// Falls back to treating the value itself as the block record.
    #[must_use]
    pub fn from_event(event: &Value) -> Self {
        let block = event.get("block").unwrap_or(event);
        Self::from_value(block.clone())
    }

    /// Raw field lookup used for columns without a dedicated formatter.
    ///
    /// Strings are returned unquoted; missing fields give an empty string.
    #[must_use]
    pub fn raw_field(&self, name: &str) -> String {
        match self.raw.get(name) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Hash of the coinbase (reward) transaction, if the block carries one.
    #[must_use]
    pub fn reward_tx_id(&self) -> Option<&str> {
        self.tx
            .iter()
            .find(|tx| tx.coinbase)
            .map(|tx| tx.tx_id.as_str())
    }

    /// Regular transactions excluding the coinbase.
    pub fn regular_transactions(&self) -> impl Iterator<Item = &TxSummary> {
        self.tx.iter().filter(|tx| !tx.coinbase)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_event() -> Value {
        json!({
            "block": {
                "height": 812345,
                "unixStamp": 1_700_000_000,
                "size": 4096,
                "TotalSent": 1234.5678,
                "time": 1_700_000_000,
                "Tx": [
                    {"TxID": "cb", "Total": 12.0, "VinCount": 1, "VoutCount": 3, "Coinbase": true},
                    {"TxID": "t1", "Total": 5.5, "VinCount": 2, "VoutCount": 2}
                ],
                "Votes": [{"TxID": "v1", "Total": 150.0, "VoteValid": true}],
                "Tickets": [],
                "Revs": [],
                "Subsidy": {"pow": 100, "pos": 200, "dev": 50},
                "MiningFee": 0.002,
                "hash": "000000abc"
            }
        })
    }

    #[test]
    fn test_from_event_decodes_envelope() {
        let payload = BlockPayload::from_event(&sample_event());
        assert_eq!(payload.height, 812345);
        assert_eq!(payload.unix_stamp, 1_700_000_000);
        assert_eq!(payload.size, 4096);
        assert_eq!(payload.tx.len(), 2);
        assert_eq!(payload.votes.len(), 1);
        assert!(payload.votes[0].vote_valid);
        assert_eq!(payload.time, BlockTime::Unix(1_700_000_000));
    }

    #[test]
    fn test_subsidy_fund_prefers_developer() {
        let legacy = Subsidy {
            pow: 1,
            pos: 2,
            developer: 0,
            dev: 7,
        };
        assert_eq!(legacy.fund(), 7);

        let current = Subsidy {
            developer: 9,
            ..legacy
        };
        assert_eq!(current.fund(), 9);
        assert!(Subsidy::default().is_empty());
    }

    #[test]
    fn test_reward_and_regular_transactions() {
        let payload = BlockPayload::from_event(&sample_event());
        assert_eq!(payload.reward_tx_id(), Some("cb"));
        let regular: Vec<&str> = payload
            .regular_transactions()
            .map(|tx| tx.tx_id.as_str())
            .collect();
        assert_eq!(regular, vec!["t1"]);
    }

    #[test]
    fn test_raw_field_lookup() {
        let payload = BlockPayload::from_event(&sample_event());
        assert_eq!(payload.raw_field("hash"), "000000abc");
        assert_eq!(payload.raw_field("size"), "4096");
        assert_eq!(payload.raw_field("missing"), "");
    }

    #[test]
    fn test_missing_fields_default() {
        let payload = BlockPayload::from_value(json!({"height": 7}));
        assert_eq!(payload.height, 7);
        assert_eq!(payload.size, 0);
        assert!(payload.subsidy.is_none());
        assert!(payload.tx.is_empty());
    }

    #[test]
    fn test_wrong_types_fall_back_to_default() {
        let payload = BlockPayload::from_value(json!({"height": "not a number", "note": "x"}));
        assert_eq!(payload.height, 0);
        assert_eq!(payload.raw_field("note"), "x");
    }

    #[test]
    fn test_text_block_time() {
        let payload = BlockPayload::from_value(json!({"time": "2024-01-01 00:00:00"}));
        assert_eq!(
            payload.time,
            BlockTime::Text("2024-01-01 00:00:00".to_string())
        );
    }
}
