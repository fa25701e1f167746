//! Finance report types.
//!
//! These mirror the JSON returned by `/api/finance-report/detail`. The
//! payload shape depends on the requested report type, so every collection
//! is optional and defaults to empty.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::error::ViewError;

// ============================================================================
// Report Type
// ============================================================================

/// The kind of detail report being viewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    /// A single calendar month.
    Month,
    /// A single calendar year.
    Year,
    /// All proposals of one domain.
    Domain,
    /// All proposals of one author.
    Owner,
    /// A single proposal.
    Proposal,
}

impl ReportType {
    /// All report types, in menu order.
    pub const ALL: [Self; 5] = [
        Self::Month,
        Self::Year,
        Self::Domain,
        Self::Owner,
        Self::Proposal,
    ];

    /// The query-string value for this type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Year => "year",
            Self::Domain => "domain",
            Self::Owner => "owner",
            Self::Proposal => "proposal",
        }
    }

    /// Returns `true` for the time-bucketed report types.
    #[must_use]
    pub const fn is_time_based(&self) -> bool {
        matches!(self, Self::Month | Self::Year)
    }

    /// Returns `true` for report types keyed by a `name` parameter.
    #[must_use]
    pub const fn is_named(&self) -> bool {
        matches!(self, Self::Domain | Self::Owner)
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ViewError::invalid_query("type", format!("unknown report type '{s}'")))
    }
}

// ============================================================================
// Time Bucket
// ============================================================================

/// A year or year/month bucket as used by the `time` query parameter.
///
/// The wire format is `YYYY` or `YYYY_M` with no zero padding on the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeBucket {
    /// A whole year.
    Year(i32),
    /// A single month (1-12) of a year.
    Month {
        /// Calendar year.
        year: i32,
        /// Calendar month, 1-based.
        month: u32,
    },
}

impl TimeBucket {
    /// The year this bucket falls in.
    #[must_use]
    pub const fn year(&self) -> i32 {
        match self {
            Self::Year(year) | Self::Month { year, .. } => *year,
        }
    }

    /// Parse a month label of the form `YYYY-MM` as found in report rows.
    ///
    /// Returns `None` when the label has no month part.
    #[must_use]
    pub fn from_month_label(label: &str) -> Option<Self> {
        let (year, month) = label.split_once('-')?;
        let year = year.trim().parse().ok()?;
        let month: u32 = month.trim().parse().ok()?;
        (1..=12).contains(&month).then_some(Self::Month { year, month })
    }

    /// Human-readable label, e.g. `March 2021` or `2021`.
    #[must_use]
    pub fn display_label(&self) -> String {
        match self {
            Self::Year(year) => year.to_string(),
            Self::Month { year, month } => NaiveDate::from_ymd_opt(*year, *month, 1)
                .map(|d| d.format("%B %Y").to_string())
                .unwrap_or_else(|| format!("{year}-{month}")),
        }
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year(year) => write!(f, "{year}"),
            Self::Month { year, month } => write!(f, "{year}_{month}"),
        }
    }
}

impl FromStr for TimeBucket {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ViewError::invalid_query("time", format!("expected YYYY or YYYY_M, got '{s}'"));
        let s = s.trim();
        match s.split_once('_') {
            None => s.parse().map(Self::Year).map_err(|_| invalid()),
            Some((year, month)) => {
                let year = year.parse().map_err(|_| invalid())?;
                let month: u32 = month.parse().map_err(|_| invalid())?;
                if !(1..=12).contains(&month) {
                    return Err(invalid());
                }
                Ok(Self::Month { year, month })
            }
        }
    }
}

// ============================================================================
// Summary Record
// ============================================================================

/// One proposal row of a financial report.
///
/// Domain, owner and proposal reports fill the budget and date fields;
/// month and year reports fill `spent_est` and `total_spent_dcr`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SummaryRecord {
    /// Proposal name.
    pub name: String,
    /// Proposal token.
    pub token: String,
    /// Proposal domain (e.g. `development`, `marketing`).
    pub domain: String,
    /// Proposal author.
    pub author: String,
    /// Approved budget in USD.
    pub budget: f64,
    /// Total spent so far in USD.
    pub total_spent: f64,
    /// Remaining budget in USD; negative when overspent.
    pub total_remaining: f64,
    /// Start date, `YYYY-MM-DD`.
    pub start: String,
    /// End date, `YYYY-MM-DD`.
    pub end: String,
    /// Estimated spend in the report period, USD.
    pub spent_est: f64,
    /// Spend in the report period, atoms.
    pub total_spent_dcr: f64,
    /// Expense attributed to the report period, USD.
    pub expense: f64,
}

impl SummaryRecord {
    /// Parsed start date.
    #[must_use]
    pub fn start_date(&self) -> Option<NaiveDate> {
        parse_report_date(&self.start)
    }

    /// Parsed end date.
    #[must_use]
    pub fn end_date(&self) -> Option<NaiveDate> {
        parse_report_date(&self.end)
    }

    /// Proposal length in whole days, rounded.
    ///
    /// Unparseable dates give `None`.
    #[must_use]
    pub fn length_in_days(&self) -> Option<i64> {
        let start = self.start_date()?;
        let end = self.end_date()?;
        Some((end - start).num_days().abs())
    }

    /// Estimated monthly average spend.
    ///
    /// Proposals shorter than 30 days report their whole budget.
    #[must_use]
    pub fn monthly_average(&self) -> f64 {
        match self.length_in_days() {
            Some(days) if days >= 30 => self.budget / days as f64 * 30.0,
            _ => self.budget,
        }
    }
}

/// Parse a report date, accepting `YYYY-MM-DD` or a full RFC 3339 timestamp.
#[must_use]
pub fn parse_report_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

// ============================================================================
// Report Payload
// ============================================================================

/// One month (or folded year) row of a spending table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MonthData {
    /// Month label `YYYY-MM`, or a year label after folding.
    pub month: String,
    /// Estimated expense in USD.
    pub expense: f64,
    /// Estimated expense in atoms.
    pub expense_dcr: f64,
    /// Actual treasury outflow in USD.
    pub actual_expense: f64,
    /// Actual treasury outflow in atoms.
    pub actual_expense_dcr: f64,
}

/// Treasury inflow/outflow totals for a period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreasurySummary {
    /// Incoming value in atoms.
    pub invalue: f64,
    /// Outgoing value in atoms.
    pub outvalue: f64,
    /// Incoming value in USD.
    #[serde(rename = "invalueUSD")]
    pub invalue_usd: f64,
    /// Outgoing value in USD.
    #[serde(rename = "outvalueUSD")]
    pub outvalue_usd: f64,
}

impl TreasurySummary {
    /// Returns `true` when there was no movement in either direction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.invalue <= 0.0 && self.outvalue <= 0.0
    }
}

/// Response of `/api/finance-report/detail`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportPayload {
    /// Monthly spending rows (domain and proposal reports).
    pub month_data: Vec<MonthData>,
    /// Monthly rows of a yearly report.
    pub monthly_result_data: Vec<MonthData>,
    /// Proposals of a domain or owner.
    pub proposal_infos: Vec<SummaryRecord>,
    /// Other proposals by the same owner (proposal report).
    pub other_proposal_infos: Vec<SummaryRecord>,
    /// The proposal itself (proposal report).
    pub proposal_info: Option<SummaryRecord>,
    /// Per-proposal spend in the period (month and year reports).
    pub report_detail: Vec<SummaryRecord>,
    /// All known domains, in navigation order.
    pub domain_list: Vec<String>,
    /// All known owners, in navigation order.
    pub owner_list: Vec<String>,
    /// All known proposal tokens, in navigation order.
    pub token_list: Vec<String>,
    /// Decentralized treasury totals.
    pub treasury_summary: TreasurySummary,
    /// Legacy (admin) treasury totals.
    pub legacy_summary: TreasurySummary,
    /// Total proposal spend in the period, USD.
    pub proposal_total: f64,
    /// Optional cache expiry chosen by the server.
    pub expiration: Option<DateTime<Utc>>,
}

impl ReportPayload {
    /// Decode a report, mapping JSON errors into [`ViewError::Parse`].
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not have the report shape.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ViewError> {
        Ok(serde_json::from_value(value)?)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("month", ReportType::Month)]
    #[case("year", ReportType::Year)]
    #[case("domain", ReportType::Domain)]
    #[case("owner", ReportType::Owner)]
    #[case("proposal", ReportType::Proposal)]
    fn test_report_type_round_trip(#[case] raw: &str, #[case] expected: ReportType) {
        assert_eq!(raw.parse::<ReportType>().unwrap(), expected);
        assert_eq!(expected.as_str(), raw);
    }

    #[test]
    fn test_report_type_rejects_unknown() {
        assert!("weekly".parse::<ReportType>().is_err());
        assert!("".parse::<ReportType>().is_err());
    }

    #[rstest]
    #[case("2021", TimeBucket::Year(2021))]
    #[case("2021_3", TimeBucket::Month { year: 2021, month: 3 })]
    #[case(" 2020_12 ", TimeBucket::Month { year: 2020, month: 12 })]
    fn test_time_bucket_parse(#[case] raw: &str, #[case] expected: TimeBucket) {
        assert_eq!(raw.parse::<TimeBucket>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("20x1")]
    #[case("2021_13")]
    #[case("2021_0")]
    #[case("2021_")]
    fn test_time_bucket_rejects(#[case] raw: &str) {
        assert!(raw.parse::<TimeBucket>().is_err());
    }

    #[test]
    fn test_time_bucket_display() {
        assert_eq!(TimeBucket::Year(2021).to_string(), "2021");
        assert_eq!(TimeBucket::Month { year: 2021, month: 3 }.to_string(), "2021_3");
        assert_eq!(
            TimeBucket::Month { year: 2021, month: 3 }.display_label(),
            "March 2021"
        );
    }

    #[test]
    fn test_time_bucket_from_month_label() {
        assert_eq!(
            TimeBucket::from_month_label("2021-03"),
            Some(TimeBucket::Month { year: 2021, month: 3 })
        );
        assert_eq!(TimeBucket::from_month_label("2021"), None);
        assert_eq!(TimeBucket::from_month_label("2021-13"), None);
    }

    #[test]
    fn test_summary_record_days_and_average() {
        let record = SummaryRecord {
            budget: 9000.0,
            start: "2021-01-01".to_string(),
            end: "2021-03-02".to_string(),
            ..Default::default()
        };
        assert_eq!(record.length_in_days(), Some(60));
        assert!((record.monthly_average() - 4500.0).abs() < 1e-9);

        let short = SummaryRecord {
            budget: 1000.0,
            start: "2021-01-01".to_string(),
            end: "2021-01-15".to_string(),
            ..Default::default()
        };
        assert_eq!(short.length_in_days(), Some(14));
        assert_eq!(short.monthly_average(), 1000.0);
    }

    #[test]
    fn test_summary_record_reversed_dates_use_absolute_length() {
        let record = SummaryRecord {
            start: "2021-02-01".to_string(),
            end: "2021-01-01".to_string(),
            ..Default::default()
        };
        assert_eq!(record.length_in_days(), Some(31));
    }

    #[test]
    fn test_parse_report_date_formats() {
        assert_eq!(
            parse_report_date("2021-02-01"),
            NaiveDate::from_ymd_opt(2021, 2, 1)
        );
        assert_eq!(
            parse_report_date("2021-02-01T10:00:00Z"),
            NaiveDate::from_ymd_opt(2021, 2, 1)
        );
        assert_eq!(parse_report_date("soon"), None);
    }

    #[test]
    fn test_report_payload_decodes_partial_shape() {
        let payload = ReportPayload::from_value(json!({
            "proposalInfos": [
                {"name": "A", "token": "aaa", "domain": "development", "author": "alice",
                 "budget": 100.0, "totalSpent": 40.0, "totalRemaining": 60.0,
                 "start": "2021-01-01", "end": "2021-06-01"}
            ],
            "domainList": ["development", "marketing"],
            "treasurySummary": {"invalue": 1.0, "outvalue": 2.0, "invalueUSD": 3.0, "outvalueUSD": 4.0},
            "expiration": "2030-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(payload.proposal_infos.len(), 1);
        assert_eq!(payload.proposal_infos[0].total_spent, 40.0);
        assert_eq!(payload.domain_list, vec!["development", "marketing"]);
        assert_eq!(payload.treasury_summary.outvalue_usd, 4.0);
        assert!(payload.expiration.is_some());
        assert!(payload.token_list.is_empty());
        assert!(payload.legacy_summary.is_empty());
    }

    #[test]
    fn test_report_payload_rejects_wrong_shape() {
        let result = ReportPayload::from_value(json!({"proposalInfos": "nope"}));
        assert!(matches!(result, Err(ViewError::Parse { .. })));
    }
}
