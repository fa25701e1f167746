//! Totals and breakdowns derived from a finance report.
//!
//! Amounts in atoms are converted to DCR here; USD amounts pass through.

use crate::constants::ATOMS_PER_DCR;

use super::report::{MonthData, ReportPayload, SummaryRecord, TimeBucket, TreasurySummary};

fn positive(value: f64) -> f64 {
    if value > 0.0 { value } else { 0.0 }
}

// ============================================================================
// Summary Totals
// ============================================================================

/// Budget, spend and remaining totals over summary records.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SummaryTotals {
    /// Sum of budgets.
    pub budget: f64,
    /// Sum of spend.
    pub spent: f64,
    /// Sum of positive remaining budgets; overspent proposals add nothing.
    pub remaining: f64,
}

/// Total the budget, spend and remaining columns.
#[must_use]
pub fn summary_totals(records: &[SummaryRecord]) -> SummaryTotals {
    records
        .iter()
        .fold(SummaryTotals::default(), |acc, r| SummaryTotals {
            budget: acc.budget + r.budget,
            spent: acc.spent + r.total_spent,
            remaining: acc.remaining + positive(r.total_remaining),
        })
}

// ============================================================================
// Yearly Totals
// ============================================================================

/// Fold monthly rows into yearly rows.
///
/// Rows whose label is not `YYYY-MM` are skipped. Years appear in the order
/// they are first seen; the folded rows carry the year as their label.
#[must_use]
pub fn yearly_totals(months: &[MonthData]) -> Vec<MonthData> {
    let mut years: Vec<MonthData> = Vec::new();
    for row in months {
        let Some((year, _)) = row.month.split_once('-') else {
            continue;
        };
        if row.month.split('-').count() != 2 {
            continue;
        }
        match years.iter_mut().find(|y| y.month == year) {
            Some(total) => {
                total.expense += row.expense;
                total.expense_dcr += row.expense_dcr;
            }
            None => years.push(MonthData {
                month: year.to_string(),
                expense: row.expense,
                expense_dcr: row.expense_dcr,
                ..MonthData::default()
            }),
        }
    }
    years
}

/// Convert a row label (`YYYY-MM` or `YYYY`) into a time bucket.
///
/// Month labels drop their zero padding: `2021-03` becomes `2021_3`.
#[must_use]
pub fn row_bucket(label: &str) -> Option<TimeBucket> {
    if label.contains('-') {
        TimeBucket::from_month_label(label)
    } else {
        label.trim().parse().ok().map(TimeBucket::Year)
    }
}

// ============================================================================
// Domain Spend
// ============================================================================

/// Estimated spend of one domain in the report period.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainSpend {
    /// Domain name.
    pub domain: String,
    /// Spend in DCR, as reported per proposal.
    pub dcr: f64,
    /// Spend in USD.
    pub usd: f64,
}

/// Per-domain spend over the report detail rows.
///
/// Negative per-proposal values count as zero, and domains with no spend
/// at all are left out. Domains appear in first-seen order.
#[must_use]
pub fn domain_spend(details: &[SummaryRecord]) -> Vec<DomainSpend> {
    let mut domains: Vec<DomainSpend> = Vec::new();
    for record in details {
        let dcr = positive(record.total_spent_dcr);
        let usd = positive(record.spent_est);
        match domains.iter_mut().find(|d| d.domain == record.domain) {
            Some(entry) => {
                entry.dcr += dcr;
                entry.usd += usd;
            }
            None => domains.push(DomainSpend {
                domain: record.domain.clone(),
                dcr,
                usd,
            }),
        }
    }
    domains.retain(|d| d.dcr != 0.0 || d.usd != 0.0);
    domains
}

// ============================================================================
// Treasury Rows
// ============================================================================

/// One row of the treasury movement table.
#[derive(Debug, Clone, PartialEq)]
pub struct TreasuryRow {
    /// Row label, e.g. `Decentralized Income`.
    pub label: &'static str,
    /// Amount in DCR.
    pub dcr: f64,
    /// Amount in USD.
    pub usd: f64,
}

/// Treasury inflow and outflow rows with a positive amount.
#[must_use]
pub fn treasury_rows(treasury: &TreasurySummary, legacy: &TreasurySummary) -> Vec<TreasuryRow> {
    [
        ("Decentralized Income", treasury.invalue, treasury.invalue_usd),
        ("Decentralized Outgoing", treasury.outvalue, treasury.outvalue_usd),
        ("Admin Income", legacy.invalue, legacy.invalue_usd),
        ("Admin Outgoing", legacy.outvalue, legacy.outvalue_usd),
    ]
    .into_iter()
    .filter(|(_, atoms, _)| *atoms > 0.0)
    .map(|(label, atoms, usd)| TreasuryRow {
        label,
        dcr: atoms / ATOMS_PER_DCR,
        usd,
    })
    .collect()
}

// ============================================================================
// Spend Comparison
// ============================================================================

/// Proposal spend compared with what actually left the treasuries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpendComparison {
    /// Estimated proposal spend, USD.
    pub proposal_usd: f64,
    /// Proposal spend, DCR.
    pub proposal_dcr: f64,
    /// Combined treasury outflow, USD.
    pub treasury_usd: f64,
    /// Combined treasury outflow, DCR.
    pub treasury_dcr: f64,
}

impl SpendComparison {
    /// Treasury outflow minus proposal spend, USD.
    #[must_use]
    pub fn delta_usd(&self) -> f64 {
        self.treasury_usd - self.proposal_usd
    }

    /// Treasury outflow minus proposal spend, DCR.
    #[must_use]
    pub fn delta_dcr(&self) -> f64 {
        self.treasury_dcr - self.proposal_dcr
    }

    /// `Missing` when proposals spent more than left the treasury,
    /// `Unaccounted` otherwise.
    #[must_use]
    pub fn delta_label(&self) -> &'static str {
        if self.delta_usd() < 0.0 {
            "Missing"
        } else {
            "Unaccounted"
        }
    }
}

/// Compare proposal spend with treasury outflow for a period report.
///
/// Returns `None` when the report has no detail rows or no positive spend.
#[must_use]
pub fn spend_comparison(report: &ReportPayload) -> Option<SpendComparison> {
    let (proposal_usd, proposal_dcr) = report
        .report_detail
        .iter()
        .fold((0.0, 0.0), |(usd, dcr), r| {
            (usd + positive(r.spent_est), dcr + positive(r.total_spent_dcr))
        });
    if proposal_usd <= 0.0 {
        return None;
    }
    let treasury_usd = report.treasury_summary.outvalue_usd + report.legacy_summary.outvalue_usd;
    let treasury_atoms = report.treasury_summary.outvalue + report.legacy_summary.outvalue;
    Some(SpendComparison {
        proposal_usd,
        proposal_dcr,
        treasury_usd,
        treasury_dcr: treasury_atoms / ATOMS_PER_DCR,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(domain: &str, spent_est: f64, dcr: f64) -> SummaryRecord {
        SummaryRecord {
            domain: domain.to_string(),
            spent_est,
            total_spent_dcr: dcr,
            ..SummaryRecord::default()
        }
    }

    fn month(label: &str, expense: f64, dcr: f64) -> MonthData {
        MonthData {
            month: label.to_string(),
            expense,
            expense_dcr: dcr,
            ..MonthData::default()
        }
    }

    #[test]
    fn test_summary_totals_ignore_overspend() {
        let records = [
            SummaryRecord {
                budget: 100.0,
                total_spent: 40.0,
                total_remaining: 60.0,
                ..SummaryRecord::default()
            },
            SummaryRecord {
                budget: 50.0,
                total_spent: 70.0,
                total_remaining: -20.0,
                ..SummaryRecord::default()
            },
        ];
        assert_eq!(
            summary_totals(&records),
            SummaryTotals {
                budget: 150.0,
                spent: 110.0,
                remaining: 60.0
            }
        );
    }

    #[test]
    fn test_yearly_totals_fold_in_first_seen_order() {
        let months = [
            month("2021-11", 10.0, 1.0),
            month("2021-12", 20.0, 2.0),
            month("2020-05", 5.0, 0.5),
            month("bogus", 99.0, 99.0),
            month("2021-01-01", 99.0, 99.0),
        ];
        let years = yearly_totals(&months);
        assert_eq!(years, vec![month("2021", 30.0, 3.0), month("2020", 5.0, 0.5)]);
    }

    #[test]
    fn test_row_bucket() {
        assert_eq!(
            row_bucket("2021-03"),
            Some(TimeBucket::Month { year: 2021, month: 3 })
        );
        assert_eq!(row_bucket("2021"), Some(TimeBucket::Year(2021)));
        assert_eq!(row_bucket("soon"), None);
    }

    #[test]
    fn test_domain_spend() {
        let details = [
            record("development", 100.0, 5.0),
            record("marketing", -10.0, -1.0),
            record("development", 50.0, 2.5),
            record("research", 0.0, 0.0),
        ];
        let spend = domain_spend(&details);
        assert_eq!(
            spend,
            vec![
                DomainSpend {
                    domain: "development".into(),
                    dcr: 7.5,
                    usd: 150.0
                },
            ]
        );
    }

    #[test]
    fn test_treasury_rows_skip_zero() {
        let treasury = TreasurySummary {
            invalue: 2e8,
            outvalue: 0.0,
            invalue_usd: 50.0,
            outvalue_usd: 0.0,
        };
        let legacy = TreasurySummary {
            invalue: 0.0,
            outvalue: 1.5e8,
            invalue_usd: 0.0,
            outvalue_usd: 30.0,
        };
        let rows = treasury_rows(&treasury, &legacy);
        let labels: Vec<&str> = rows.iter().map(|r| r.label).collect();
        assert_eq!(labels, vec!["Decentralized Income", "Admin Outgoing"]);
        assert_eq!(rows[1].dcr, 1.5);
        assert!(treasury_rows(&TreasurySummary::default(), &TreasurySummary::default()).is_empty());
    }

    #[test]
    fn test_spend_comparison() {
        let report = ReportPayload {
            report_detail: vec![record("a", 300.0, 3.0), record("b", -5.0, 1.0)],
            treasury_summary: TreasurySummary {
                outvalue: 2e8,
                outvalue_usd: 200.0,
                ..TreasurySummary::default()
            },
            legacy_summary: TreasurySummary {
                outvalue: 1e8,
                outvalue_usd: 50.0,
                ..TreasurySummary::default()
            },
            ..ReportPayload::default()
        };
        let cmp = spend_comparison(&report).unwrap();
        assert_eq!(cmp.proposal_usd, 300.0);
        assert_eq!(cmp.proposal_dcr, 4.0);
        assert_eq!(cmp.treasury_usd, 250.0);
        assert_eq!(cmp.treasury_dcr, 3.0);
        assert_eq!(cmp.delta_usd(), -50.0);
        assert_eq!(cmp.delta_label(), "Missing");

        assert!(spend_comparison(&ReportPayload::default()).is_none());
    }
}
