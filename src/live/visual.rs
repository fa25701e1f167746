//! Visual block description.
//!
//! A visual block shows a block as four bands: rewards, votes, tickets and
//! revocations, then regular transactions. Votes and tickets are padded with
//! empty slots so every block has the same shape; long ticket and
//! transaction lists are truncated with an overflow marker linking to the
//! block page.

use serde::{Deserialize, Serialize};

use crate::constants::{
    OVERFLOW_SHOWN, OVERFLOW_THRESHOLD, PAINT_PER_VOTE, TICKET_SLOTS, VOTE_SLOTS,
};
use crate::domain::{BlockPayload, TxSummary};
use crate::view::format::atoms_to_dcr;

// ============================================================================
// Slots
// ============================================================================

/// The band a slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// A vote.
    Vote,
    /// A ticket purchase.
    Ticket,
    /// A ticket revocation.
    Revocation,
    /// A regular transaction.
    Transaction,
}

impl SlotKind {
    /// Tooltip object name.
    #[must_use]
    pub const fn object(&self) -> &'static str {
        match self {
            Self::Vote => "Vote",
            Self::Ticket => "Ticket",
            Self::Revocation => "Revocation",
            Self::Transaction => "Transaction",
        }
    }
}

/// Tooltip metadata attached to a slot.
///
/// Amount fields are strings, matching the metadata the explorer embeds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipData {
    /// What the slot represents, e.g. `Ticket` or `PoW Reward`.
    pub object: String,
    /// Amount in DCR.
    #[serde(default)]
    pub total: String,
    /// Input count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
    /// Output count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vout: Option<String>,
    /// Vote validity, `true` or `false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_valid: Option<String>,
}

impl TooltipData {
    /// Parse embedded tooltip metadata.
    ///
    /// Returns `None` for anything that is not valid metadata; such slots
    /// keep no tooltip.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    /// Tooltip text, e.g. `Ticket / 12.5 DCR / 1 Inputs, 3 Outputs`.
    #[must_use]
    pub fn text(&self) -> String {
        let mut text = if self.object == "Vote" {
            let valid = self.vote_valid.as_deref() == Some("true");
            format!("Vote ({})", if valid { "Yes" } else { "No" })
        } else {
            format!("{} / {} DCR", self.object, self.total)
        };
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        if present(&self.vin) && present(&self.vout) {
            text.push_str(&format!(
                " / {} Inputs, {} Outputs",
                self.vin.as_deref().unwrap_or_default(),
                self.vout.as_deref().unwrap_or_default()
            ));
        }
        text
    }
}

/// Tooltip text for raw embedded metadata; malformed metadata is ignored.
#[must_use]
pub fn tooltip_text(raw: &str) -> Option<String> {
    TooltipData::parse(raw).map(|data| data.text())
}

/// One slot of a visual block band.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// A transaction, vote, ticket or revocation.
    Filled {
        /// Band of the slot.
        kind: SlotKind,
        /// Transaction hash.
        tx_id: String,
        /// Link to the transaction page.
        href: String,
        /// Tooltip metadata.
        tooltip: TooltipData,
        /// Relative width; only regular transactions grow with their value.
        grow: Option<u64>,
        /// Vote validity, for votes.
        vote_valid: Option<bool>,
    },
    /// Padding slot.
    Empty(SlotKind),
    /// Marker for entries cut from a long list.
    Overflow {
        /// Band of the marker.
        kind: SlotKind,
        /// Entries in the full list.
        total: usize,
        /// Entries not shown.
        hidden: usize,
        /// Link to the block page.
        href: String,
    },
}

impl Slot {
    fn transaction(kind: SlotKind, tx: &TxSummary, grow: bool) -> Self {
        Self::Filled {
            kind,
            tx_id: tx.tx_id.clone(),
            href: format!("/tx/{}", tx.tx_id),
            tooltip: TooltipData {
                object: kind.object().to_string(),
                total: tx.total.to_string(),
                vin: Some(tx.vin_count.to_string()),
                vout: Some(tx.vout_count.to_string()),
                vote_valid: None,
            },
            grow: grow.then(|| tx.total.round().max(0.0) as u64),
            vote_valid: None,
        }
    }

    /// Title shown for the slot.
    #[must_use]
    pub fn title(&self) -> String {
        match self {
            Self::Filled { tooltip, .. } => tooltip.text(),
            Self::Empty(SlotKind::Vote) => "Empty vote slot".to_string(),
            Self::Empty(_) => "Empty ticket slot".to_string(),
            Self::Overflow { kind, total, .. } => {
                let noun = match kind {
                    SlotKind::Ticket => "tickets",
                    _ => "transactions",
                };
                format!("Total of {total} {noun}")
            }
        }
    }

    /// Returns `true` for padding slots.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty(_))
    }
}

/// Cut `slots` to the shown count plus an overflow marker when too long.
fn truncate(mut slots: Vec<Slot>, kind: SlotKind, block_href: &str) -> Vec<Slot> {
    let total = slots.len();
    if total > OVERFLOW_THRESHOLD {
        slots.truncate(OVERFLOW_SHOWN);
        slots.push(Slot::Overflow {
            kind,
            total,
            hidden: total - OVERFLOW_SHOWN,
            href: block_href.to_string(),
        });
    }
    slots
}

// ============================================================================
// Rewards
// ============================================================================

/// Block rewards in DCR.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rewards {
    /// Proof-of-work reward.
    pub pow: f64,
    /// Proof-of-stake reward.
    pub pos: f64,
    /// Project fund (treasury) share.
    pub fund: f64,
}

/// The rewards band.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardsBand {
    /// Rewards, or `None` when the payload has no subsidy.
    pub rewards: Option<Rewards>,
    /// Transaction fees in DCR.
    pub fees: f64,
    /// How much of the reward is painted, in percent: 20 per vote.
    pub paint_percent: u32,
    /// Link to the coinbase transaction.
    pub reward_href: Option<String>,
}

impl RewardsBand {
    /// Tooltip metadata for each reward segment, in band order.
    #[must_use]
    pub fn tooltips(&self) -> Vec<TooltipData> {
        let entry = |object: &str, total: f64| TooltipData {
            object: object.to_string(),
            total: total.to_string(),
            ..TooltipData::default()
        };
        let mut tips = Vec::with_capacity(4);
        if let Some(r) = self.rewards {
            tips.push(entry("PoW Reward", r.pow));
            tips.push(entry("PoS Reward", r.pos));
            tips.push(entry("Project Fund", r.fund));
        }
        tips.push(entry("Tx Fees", self.fees));
        tips
    }
}

// ============================================================================
// Visual Block
// ============================================================================

/// Declarative description of one visual block.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualBlock {
    /// Block height.
    pub height: u64,
    /// Link to the block page.
    pub block_href: String,
    /// Rewards band.
    pub rewards: RewardsBand,
    /// Votes, padded to [`VOTE_SLOTS`].
    pub votes: Vec<Slot>,
    /// Tickets then revocations, padded to [`TICKET_SLOTS`].
    pub tickets: Vec<Slot>,
    /// Regular (non-coinbase) transactions.
    pub transactions: Vec<Slot>,
}

impl VisualBlock {
    /// Build the visual description of a block payload.
    #[must_use]
    pub fn from_payload(block: &BlockPayload) -> Self {
        let block_href = format!("/block/{}", block.height);

        let rewards = RewardsBand {
            rewards: block.subsidy.map(|s| Rewards {
                pow: atoms_to_dcr(s.pow as f64),
                pos: atoms_to_dcr(s.pos as f64),
                fund: atoms_to_dcr(s.fund() as f64),
            }),
            fees: block.mining_fee,
            paint_percent: block.votes.len() as u32 * PAINT_PER_VOTE,
            reward_href: block.reward_tx_id().map(|id| format!("/tx/{id}")),
        };

        let mut votes: Vec<Slot> = block
            .votes
            .iter()
            .map(|vote| Slot::Filled {
                kind: SlotKind::Vote,
                tx_id: vote.tx_id.clone(),
                href: format!("/tx/{}", vote.tx_id),
                tooltip: TooltipData {
                    object: SlotKind::Vote.object().to_string(),
                    total: vote.total.to_string(),
                    vote_valid: Some(vote.vote_valid.to_string()),
                    ..TooltipData::default()
                },
                grow: None,
                vote_valid: Some(vote.vote_valid),
            })
            .collect();
        while votes.len() < VOTE_SLOTS {
            votes.push(Slot::Empty(SlotKind::Vote));
        }

        let tickets: Vec<Slot> = block
            .tickets
            .iter()
            .map(|t| Slot::transaction(SlotKind::Ticket, t, false))
            .collect();
        let mut tickets = truncate(tickets, SlotKind::Ticket, &block_href);
        tickets.extend(
            block
                .revs
                .iter()
                .map(|r| Slot::transaction(SlotKind::Revocation, r, false)),
        );
        while tickets.len() < TICKET_SLOTS {
            tickets.push(Slot::Empty(SlotKind::Ticket));
        }

        let transactions: Vec<Slot> = block
            .regular_transactions()
            .map(|tx| Slot::transaction(SlotKind::Transaction, tx, true))
            .collect();
        let transactions = truncate(transactions, SlotKind::Transaction, &block_href);

        Self {
            height: block.height,
            block_href,
            rewards,
            votes,
            tickets,
            transactions,
        }
    }

    /// Title of the transaction band.
    #[must_use]
    pub fn transactions_title(&self) -> Option<&'static str> {
        self.transactions
            .is_empty()
            .then_some("No regular transaction in block")
    }

    /// Number of filled vote slots.
    #[must_use]
    pub fn vote_count(&self) -> usize {
        self.votes.iter().filter(|s| !s.is_empty()).count()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Subsidy, VoteSummary};

    fn tx(id: &str, total: f64, coinbase: bool) -> TxSummary {
        TxSummary {
            tx_id: id.to_string(),
            total,
            vin_count: 1,
            vout_count: 2,
            coinbase,
        }
    }

    fn block() -> BlockPayload {
        BlockPayload {
            height: 500,
            subsidy: Some(Subsidy {
                pow: 600_000_000,
                pos: 800_000_000,
                developer: 0,
                dev: 100_000_000,
            }),
            mining_fee: 0.0005,
            tx: vec![tx("cb", 15.0, true), tx("t1", 2.6, false)],
            votes: vec![
                VoteSummary {
                    tx_id: "v1".into(),
                    total: 1.0,
                    vote_valid: true,
                },
                VoteSummary {
                    tx_id: "v2".into(),
                    total: 1.0,
                    vote_valid: false,
                },
            ],
            tickets: vec![tx("k1", 100.0, false)],
            revs: vec![tx("r1", 99.0, false)],
            ..BlockPayload::default()
        }
    }

    #[test]
    fn test_rewards_in_dcr() {
        let visual = VisualBlock::from_payload(&block());
        let rewards = visual.rewards.rewards.unwrap();
        assert_eq!(rewards.pow, 6.0);
        assert_eq!(rewards.pos, 8.0);
        assert_eq!(rewards.fund, 1.0);
        assert_eq!(visual.rewards.paint_percent, 40);
        assert_eq!(visual.rewards.reward_href.as_deref(), Some("/tx/cb"));
        assert_eq!(visual.rewards.tooltips().len(), 4);
    }

    #[test]
    fn test_missing_subsidy_keeps_fee_segment() {
        let payload = BlockPayload {
            subsidy: None,
            ..block()
        };
        let band = VisualBlock::from_payload(&payload).rewards;
        assert!(band.rewards.is_none());
        let tips = band.tooltips();
        assert_eq!(tips.len(), 1);
        assert_eq!(tips[0].object, "Tx Fees");
    }

    #[test]
    fn test_padding() {
        let visual = VisualBlock::from_payload(&block());
        assert_eq!(visual.votes.len(), VOTE_SLOTS);
        assert_eq!(visual.vote_count(), 2);
        assert_eq!(visual.votes[4].title(), "Empty vote slot");

        assert_eq!(visual.tickets.len(), TICKET_SLOTS);
        assert!(matches!(
            visual.tickets[1],
            Slot::Filled {
                kind: SlotKind::Revocation,
                ..
            }
        ));
        assert_eq!(visual.tickets[19].title(), "Empty ticket slot");
    }

    #[test]
    fn test_coinbase_excluded_from_transactions() {
        let visual = VisualBlock::from_payload(&block());
        assert_eq!(visual.transactions.len(), 1);
        let Slot::Filled { tx_id, grow, .. } = &visual.transactions[0] else {
            panic!("expected a filled slot");
        };
        assert_eq!(tx_id, "t1");
        assert_eq!(*grow, Some(3));
        assert_eq!(visual.transactions_title(), None);
    }

    #[test]
    fn test_empty_block_title() {
        let payload = BlockPayload {
            tx: vec![tx("cb", 15.0, true)],
            ..block()
        };
        let visual = VisualBlock::from_payload(&payload);
        assert_eq!(
            visual.transactions_title(),
            Some("No regular transaction in block")
        );
    }

    #[test]
    fn test_long_lists_truncated() {
        let payload = BlockPayload {
            tx: (0..51).map(|i| tx(&format!("t{i}"), 1.0, false)).collect(),
            tickets: (0..60).map(|i| tx(&format!("k{i}"), 1.0, false)).collect(),
            ..block()
        };
        let visual = VisualBlock::from_payload(&payload);

        assert_eq!(visual.transactions.len(), OVERFLOW_SHOWN + 1);
        assert_eq!(
            visual.transactions.last(),
            Some(&Slot::Overflow {
                kind: SlotKind::Transaction,
                total: 51,
                hidden: 21,
                href: "/block/500".into(),
            })
        );
        // 30 tickets + marker + 1 revocation; already past the padding size.
        assert_eq!(visual.tickets.len(), OVERFLOW_SHOWN + 2);
        assert_eq!(visual.tickets[30].title(), "Total of 60 tickets");
    }

    #[test]
    fn test_exactly_fifty_not_truncated() {
        let payload = BlockPayload {
            tx: (0..50).map(|i| tx(&format!("t{i}"), 1.0, false)).collect(),
            ..block()
        };
        assert_eq!(VisualBlock::from_payload(&payload).transactions.len(), 50);
    }

    #[test]
    fn test_tooltip_text() {
        let cases = [
            (
                r#"{"object": "Ticket", "total": "12.5", "vout": "3", "vin": "1"}"#,
                Some("Ticket / 12.5 DCR / 1 Inputs, 3 Outputs"),
            ),
            (
                r#"{"object": "Vote", "total": "1", "voteValid": "true"}"#,
                Some("Vote (Yes)"),
            ),
            (
                r#"{"object": "Vote", "total": "1", "voteValid": "false"}"#,
                Some("Vote (No)"),
            ),
            (r#"{"object": "Tx Fees", "total": "0.1"}"#, Some("Tx Fees / 0.1 DCR")),
            ("not json", None),
            ("", None),
        ];
        for (raw, expected) in cases {
            assert_eq!(tooltip_text(raw).as_deref(), expected, "raw={raw}");
        }
    }

    #[test]
    fn test_tooltip_round_trips_through_json() {
        let visual = VisualBlock::from_payload(&block());
        let Slot::Filled { tooltip, .. } = &visual.tickets[0] else {
            panic!("expected a ticket");
        };
        let raw = serde_json::to_string(tooltip).unwrap();
        assert_eq!(TooltipData::parse(&raw).as_ref(), Some(tooltip));
    }
}
