//! Finance detail report view.
//!
//! [`ReportView::build`] turns settings, the fetched report and the
//! navigation position into every section the report page shows. Sections
//! that do not apply to the report type, or have nothing to show, are
//! `None`.

use chrono::{DateTime, Datelike, Utc};

use crate::constants::{FINANCE_DETAIL_PATH, FINANCE_REPORT_PATH};
use crate::domain::aggregate::{
    domain_spend, row_bucket, spend_comparison, summary_totals, treasury_rows, yearly_totals,
};
use crate::domain::{MonthData, ReportPayload, ReportType, SummaryRecord, TimeBucket, ViewError};
use crate::pagination::Position;
use crate::query::FinanceSettings;
use crate::sort::{SortField, SortOrder, SortState};

use super::format::{atoms_to_dcr, capitalize, format_to_local_string, usd};

fn detail_href(report_type: &str, key: &str, value: &str) -> String {
    format!("{FINANCE_DETAIL_PATH}?type={report_type}&{key}={value}")
}

fn proposal_href(token: &str) -> String {
    detail_href("proposal", "token", token)
}

fn domain_href(domain: &str) -> String {
    detail_href("domain", "name", domain)
}

fn owner_href(author: &str) -> String {
    detail_href("owner", "name", author)
}

fn amount(value: f64) -> String {
    format_to_local_string(value, 2, 2)
}

/// USD when positive, `otherwise` when not.
fn usd_or(value: f64, otherwise: &str) -> String {
    if value > 0.0 {
        usd(value)
    } else {
        otherwise.to_string()
    }
}

// ============================================================================
// Top-Level View
// ============================================================================

/// What the finance detail page shows.
#[derive(Debug, Clone, PartialEq)]
pub enum FinanceView {
    /// Required parameters are missing or invalid; nothing is fetched.
    NoData {
        /// Why there is no report.
        reason: String,
    },
    /// A report page.
    Report(Box<ReportView>),
}

impl FinanceView {
    /// The report view, if any.
    #[must_use]
    pub fn report(&self) -> Option<&ReportView> {
        match self {
            Self::Report(view) => Some(view),
            Self::NoData { .. } => None,
        }
    }
}

/// One labelled line of the summary card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardLine {
    /// Label, e.g. `Total Budget`.
    pub label: String,
    /// Value text.
    pub value: String,
    /// Link target of the value.
    pub href: Option<String>,
}

impl CardLine {
    fn text(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
            href: None,
        }
    }

    fn link(label: &str, value: impl Into<String>, href: String) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
            href: Some(href),
        }
    }
}

/// Vote and discussion links of a proposal report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalLinks {
    /// Proposal vote page.
    pub vote: String,
    /// Proposal discussion on Politeia.
    pub discussion: String,
}

/// A sortable column header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortColumn {
    /// Field the column sorts by.
    pub field: SortField,
    /// Header text.
    pub title: String,
    /// The table is ordered by this column.
    pub active: bool,
    /// The arrow points down: this column is active and descending.
    pub descending: bool,
}

impl SortColumn {
    fn new(
        field: SortField,
        title: impl Into<String>,
        sort: &SortState,
        fallback: SortField,
    ) -> Self {
        let active = sort.is_active(field, fallback);
        Self {
            field,
            title: title.into(),
            active,
            descending: active && sort.order == SortOrder::Descending,
        }
    }
}

// ============================================================================
// Summary Table
// ============================================================================

/// A proposal row of the summary table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    /// Proposal name.
    pub name: String,
    /// Proposal report link.
    pub href: String,
    /// Proposal author.
    pub author: String,
    /// Author report link.
    pub author_href: String,
    /// Capitalized domain.
    pub domain: String,
    /// Domain report link.
    pub domain_href: String,
    /// Start date as reported.
    pub start: String,
    /// End date as reported.
    pub end: String,
    /// Budget, USD.
    pub budget: String,
    /// Length in days; empty when a date does not parse.
    pub days: String,
    /// Monthly average, USD.
    pub monthly_average: String,
    /// Spend, USD; empty when nothing was spent.
    pub spent: String,
    /// Remaining budget, USD; `-` when none remains.
    pub remaining: String,
    /// The proposal still has budget left.
    pub active: bool,
}

impl SummaryRow {
    fn from_record(record: &SummaryRecord) -> Self {
        Self {
            name: record.name.clone(),
            href: proposal_href(&record.token),
            author: record.author.clone(),
            author_href: owner_href(&record.author),
            domain: capitalize(&record.domain),
            domain_href: domain_href(&record.domain),
            start: record.start.clone(),
            end: record.end.clone(),
            budget: usd(record.budget),
            days: record
                .length_in_days()
                .map(|d| d.to_string())
                .unwrap_or_default(),
            monthly_average: usd(record.monthly_average()),
            spent: usd_or(record.total_spent, ""),
            remaining: usd_or(record.total_remaining, "-"),
            active: record.total_remaining > 0.0,
        }
    }
}

/// The proposal summary table of domain, owner and proposal reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryTable {
    /// Table title.
    pub title: String,
    /// The author column is shown.
    pub show_author: bool,
    /// The domain column is shown.
    pub show_domain: bool,
    /// Column headers.
    pub columns: Vec<SortColumn>,
    /// Rows, in sort order.
    pub rows: Vec<SummaryRow>,
    /// Total budget.
    pub total_budget: String,
    /// Total spend; `-` when nothing was spent.
    pub total_spent: String,
    /// Total remaining; `-` when none remains.
    pub total_remaining: String,
}

/// Summary tables order by start date until a column is chosen.
const SUMMARY_FALLBACK: SortField = SortField::StartDate;

/// Month and year proposal tables order by name until a column is chosen.
const PROPOSAL_FALLBACK: SortField = SortField::ProposalName;

impl SummaryTable {
    fn build(
        title: &str,
        records: &[SummaryRecord],
        show_author: bool,
        show_domain: bool,
        sort: &SortState,
    ) -> Self {
        let columns = SortField::ALL
            .into_iter()
            .filter(|f| show_domain || *f != SortField::Domain)
            .filter(|f| show_author || *f != SortField::Author)
            .map(|f| SortColumn::new(f, f.label(), sort, SUMMARY_FALLBACK))
            .collect();
        let rows = sort
            .sorted(records, SUMMARY_FALLBACK)
            .iter()
            .map(SummaryRow::from_record)
            .collect();
        let totals = summary_totals(records);
        Self {
            title: title.to_string(),
            show_author,
            show_domain,
            columns,
            rows,
            total_budget: usd(totals.budget),
            total_spent: usd_or(totals.spent, "-"),
            total_remaining: usd_or(totals.remaining, "-"),
        }
    }
}

// ============================================================================
// Month / Year Sections
// ============================================================================

/// A proposal row of a month or year report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalRow {
    /// Proposal name.
    pub name: String,
    /// Proposal report link.
    pub href: String,
    /// Capitalized domain.
    pub domain: String,
    /// Domain report link.
    pub domain_href: String,
    /// Spend in the period, USD; empty when none.
    pub spent: String,
}

/// Proposal spend of a month or year report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalTable {
    /// Column headers.
    pub columns: Vec<SortColumn>,
    /// Rows, in sort order.
    pub rows: Vec<ProposalRow>,
    /// Total spend; empty when none.
    pub total: String,
}

impl ProposalTable {
    fn build(report_type: ReportType, details: &[SummaryRecord], sort: &SortState) -> Option<Self> {
        if details.is_empty() {
            return None;
        }
        let spent_label = if report_type == ReportType::Year {
            "This Year (Est)"
        } else {
            "This Month (Est)"
        };
        let columns = vec![
            SortColumn::new(SortField::ProposalName, "Proposal Name", sort, PROPOSAL_FALLBACK),
            SortColumn::new(SortField::Domain, SortField::Domain.label(), sort, PROPOSAL_FALLBACK),
            SortColumn::new(SortField::Spent, spent_label, sort, PROPOSAL_FALLBACK),
        ];
        let rows = sort
            .sorted(details, PROPOSAL_FALLBACK)
            .iter()
            .map(|r| ProposalRow {
                name: r.name.clone(),
                href: proposal_href(&r.token),
                domain: capitalize(&r.domain),
                domain_href: domain_href(&r.domain),
                spent: usd_or(r.total_spent, ""),
            })
            .collect();
        let total: f64 = details.iter().map(|r| r.total_spent).sum();
        Some(Self {
            columns,
            rows,
            total: usd_or(total, ""),
        })
    }
}

/// Headline spend figures of a month or year report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendSummary {
    /// Total proposal expenditure, USD.
    pub expenditure: String,
    /// Proposal spend, `$X (Y DCR)`.
    pub proposal_spent: Option<String>,
    /// Treasury outflow, `$X (Y DCR)`.
    pub treasury_spent: Option<String>,
    /// Treasury outflow minus proposal spend, labelled missing or unaccounted.
    pub delta: Option<String>,
}

impl SpendSummary {
    fn build(report: &ReportPayload) -> Self {
        let comparison = spend_comparison(report);
        let pair = |usd_value: f64, dcr: f64| format!("{} ({} DCR)", usd(usd_value), amount(dcr));
        Self {
            expenditure: usd(report.proposal_total),
            proposal_spent: comparison.map(|c| pair(c.proposal_usd, c.proposal_dcr)),
            treasury_spent: comparison.map(|c| pair(c.treasury_usd, c.treasury_dcr)),
            delta: comparison.map(|c| {
                let sign = if c.delta_usd() < 0.0 { "-" } else { "" };
                format!(
                    "{sign}{} ({} DCR, {})",
                    usd(c.delta_usd().abs()),
                    amount(c.delta_dcr()),
                    c.delta_label()
                )
            }),
        }
    }
}

/// One domain of the domain spend table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSpendLine {
    /// Capitalized domain.
    pub domain: String,
    /// Domain report link.
    pub href: String,
    /// Spend in DCR; `-` when none.
    pub dcr: String,
    /// Spend in USD; `-` when none.
    pub usd: String,
}

/// Spend per domain in a month or year report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSpendView {
    /// Domains with spend.
    pub rows: Vec<DomainSpendLine>,
    /// Total DCR.
    pub total_dcr: String,
    /// Total USD.
    pub total_usd: String,
}

impl DomainSpendView {
    fn build(details: &[SummaryRecord]) -> Option<Self> {
        let spend = domain_spend(details);
        if spend.is_empty() {
            return None;
        }
        let dcr_text = |v: f64| if v > 0.0 { amount(v) } else { "-".to_string() };
        let total_dcr: f64 = spend.iter().map(|d| d.dcr).sum();
        let total_usd: f64 = spend.iter().map(|d| d.usd).sum();
        Some(Self {
            rows: spend
                .iter()
                .map(|d| DomainSpendLine {
                    domain: capitalize(&d.domain),
                    href: domain_href(&d.domain),
                    dcr: dcr_text(d.dcr),
                    usd: usd_or(d.usd, "-"),
                })
                .collect(),
            total_dcr: dcr_text(total_dcr),
            total_usd: usd_or(total_usd, "-"),
        })
    }
}

/// One row of the treasury table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreasuryLine {
    /// Movement label.
    pub label: String,
    /// Amount, `X.XXX DCR`.
    pub dcr: String,
    /// Amount, USD.
    pub usd: String,
}

/// Treasury inflow and outflow in a month or year report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreasuryView {
    /// Movements with a positive amount.
    pub rows: Vec<TreasuryLine>,
}

impl TreasuryView {
    fn build(report: &ReportPayload) -> Option<Self> {
        let rows: Vec<TreasuryLine> = treasury_rows(&report.treasury_summary, &report.legacy_summary)
            .into_iter()
            .map(|r| TreasuryLine {
                label: r.label.to_string(),
                dcr: format!("{} DCR", format_to_local_string(r.dcr, 3, 3)),
                usd: usd(r.usd),
            })
            .collect();
        (!rows.is_empty()).then_some(Self { rows })
    }
}

// ============================================================================
// Period Tables
// ============================================================================

/// One month or year of a period table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodRow {
    /// Period label as reported, `YYYY-MM` or `YYYY`.
    pub label: String,
    /// Link to the period's report.
    pub href: String,
    /// Estimated spend, USD; `-` when zero.
    pub usd: String,
    /// Estimated spend, DCR; `-` when zero.
    pub dcr: String,
    /// Actual spend, USD, for year reports.
    pub actual_usd: Option<String>,
    /// Actual spend, DCR, for year reports.
    pub actual_dcr: Option<String>,
    /// The period lies after the current month or year.
    pub is_future: bool,
}

/// Month-by-month or year-by-year spend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodTable {
    /// `Month` or `Year`.
    pub period: String,
    /// Actual spend columns are shown.
    pub show_actual: bool,
    /// Rows, in report order.
    pub rows: Vec<PeriodRow>,
}

impl PeriodTable {
    fn build(period: ReportType, rows: &[MonthData], show_actual: bool, now: DateTime<Utc>) -> Self {
        let nonzero_usd = |v: f64| if v != 0.0 { usd(v) } else { "-".to_string() };
        let nonzero_dcr = |v: f64| {
            if v != 0.0 {
                amount(atoms_to_dcr(v))
            } else {
                "-".to_string()
            }
        };
        let rows = rows
            .iter()
            .map(|row| {
                let bucket = row_bucket(&row.month);
                let time = bucket.map_or_else(|| row.month.clone(), |b| b.to_string());
                PeriodRow {
                    label: row.month.clone(),
                    href: detail_href(period.as_str(), "time", &time),
                    usd: nonzero_usd(row.expense),
                    dcr: nonzero_dcr(row.expense_dcr),
                    actual_usd: show_actual.then(|| nonzero_usd(row.actual_expense)),
                    actual_dcr: show_actual.then(|| nonzero_dcr(row.actual_expense_dcr)),
                    is_future: bucket.is_some_and(|b| is_future(b, now)),
                }
            })
            .collect();
        Self {
            period: capitalize(period.as_str()),
            show_actual,
            rows,
        }
    }
}

fn is_future(bucket: TimeBucket, now: DateTime<Utc>) -> bool {
    let year = now.year();
    match bucket {
        TimeBucket::Year(y) => y > year,
        TimeBucket::Month { year: y, month: m } => {
            i64::from(y) * 12 + i64::from(m) > i64::from(year) * 12 + i64::from(now.month())
        }
    }
}

// ============================================================================
// Report View
// ============================================================================

/// Everything a finance detail report page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportView {
    /// Report type.
    pub report_type: ReportType,
    /// Page title.
    pub title: String,
    /// Breadcrumb text of the current report.
    pub current: String,
    /// Link up to the report index.
    pub up_link: String,
    /// Year breadcrumb of month reports: text and link.
    pub year_breadcrumb: Option<(String, String)>,
    /// Prev/next state.
    pub navigation: Position,
    /// Summary card lines.
    pub summary_card: Vec<CardLine>,
    /// Vote and discussion links of proposal reports.
    pub proposal_links: Option<ProposalLinks>,
    /// Proposal summary table.
    pub summary_table: Option<SummaryTable>,
    /// Proposal spend table of month and year reports.
    pub proposal_table: Option<ProposalTable>,
    /// Headline spend of month and year reports.
    pub spend_summary: Option<SpendSummary>,
    /// Spend per domain.
    pub domain_spend: Option<DomainSpendView>,
    /// Treasury movements.
    pub treasury: Option<TreasuryView>,
    /// Monthly spend.
    pub monthly: Option<PeriodTable>,
    /// Yearly spend.
    pub yearly: Option<PeriodTable>,
}

impl ReportView {
    /// Build the report page.
    ///
    /// `report` is `None` when the server returned nothing; the header is
    /// still built but every data section is hidden.
    ///
    /// # Errors
    ///
    /// Returns the validation error of [`FinanceSettings::report_key`] when
    /// the settings do not name a report.
    pub fn build(
        settings: &FinanceSettings,
        report: Option<&ReportPayload>,
        navigation: Position,
        politeia_url: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, ViewError> {
        settings.report_key()?;
        let report_type = settings
            .report_type
            .ok_or_else(|| ViewError::invalid_query("type", "missing report type"))?;

        let mut view = Self::header(settings, report_type, report);
        view.navigation = navigation;

        if let Some(report) = report {
            if report_type.is_time_based() {
                view.fill_period_report(settings, report_type, report, now);
            } else {
                view.fill_named_report(settings, report_type, report, politeia_url, now);
            }
        }
        Ok(view)
    }

    fn header(
        settings: &FinanceSettings,
        report_type: ReportType,
        report: Option<&ReportPayload>,
    ) -> Self {
        let (current, title, up_link) = match report_type {
            ReportType::Domain => {
                let domain = capitalize(&settings.name);
                (
                    domain.clone(),
                    format!("Domain Detail Report - {domain}"),
                    format!("{FINANCE_REPORT_PATH}?pgroup=domains"),
                )
            }
            ReportType::Owner => (
                settings.name.clone(),
                format!("Author Detail Report - {}", settings.name),
                format!("{FINANCE_REPORT_PATH}?pgroup=authors"),
            ),
            ReportType::Proposal => {
                let name = report
                    .and_then(|r| r.proposal_info.as_ref())
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                (
                    name.clone(),
                    format!("Proposal Detail Report - {name}"),
                    FINANCE_REPORT_PATH.to_string(),
                )
            }
            ReportType::Month | ReportType::Year => {
                let label = settings
                    .time
                    .map(|t| t.display_label())
                    .unwrap_or_default();
                let kind = if report_type == ReportType::Year {
                    "Yearly"
                } else {
                    "Monthly"
                };
                (
                    label.clone(),
                    format!("{kind} Summary Report - {label}"),
                    FINANCE_REPORT_PATH.to_string(),
                )
            }
        };
        let year_breadcrumb = match settings.time {
            Some(TimeBucket::Month { year, .. }) if report_type == ReportType::Month => Some((
                year.to_string(),
                detail_href("year", "time", &year.to_string()),
            )),
            _ => None,
        };
        Self {
            report_type,
            title,
            current,
            up_link,
            year_breadcrumb,
            navigation: Position::disabled(),
            summary_card: Vec::new(),
            proposal_links: None,
            summary_table: None,
            proposal_table: None,
            spend_summary: None,
            domain_spend: None,
            treasury: None,
            monthly: None,
            yearly: None,
        }
    }

    fn fill_named_report(
        &mut self,
        settings: &FinanceSettings,
        report_type: ReportType,
        report: &ReportPayload,
        politeia_url: &str,
        now: DateTime<Utc>,
    ) {
        match report_type {
            ReportType::Domain | ReportType::Owner => {
                let totals = summary_totals(&report.proposal_infos);
                let spent_label = if report_type == ReportType::Owner {
                    "Total Received (Estimate)"
                } else {
                    "Total Spent (Estimate)"
                };
                self.summary_card = vec![
                    CardLine::text("Total Budget", usd(totals.budget)),
                    CardLine::text(spent_label, usd(totals.spent)),
                    CardLine::text("Total Remaining (Estimate)", usd(totals.remaining)),
                ];
                self.summary_table = Some(SummaryTable::build(
                    "Proposals",
                    &report.proposal_infos,
                    report_type != ReportType::Owner,
                    report_type != ReportType::Domain,
                    &settings.sort,
                ));
            }
            _ => {
                if let Some(info) = &report.proposal_info {
                    self.summary_card = proposal_card(info);
                }
                self.proposal_links = Some(ProposalLinks {
                    vote: format!("/proposal/{}", settings.token),
                    discussion: format!(
                        "{}/record/{}",
                        politeia_url.trim_end_matches('/'),
                        settings.token.chars().take(7).collect::<String>()
                    ),
                });
                if !report.other_proposal_infos.is_empty() {
                    self.summary_table = Some(SummaryTable::build(
                        "Proposals with the same owner",
                        &report.other_proposal_infos,
                        false,
                        true,
                        &settings.sort,
                    ));
                }
            }
        }

        if report_type != ReportType::Owner {
            self.monthly = Some(PeriodTable::build(
                ReportType::Month,
                &report.month_data,
                false,
                now,
            ));
            if report_type == ReportType::Domain {
                self.yearly = Some(PeriodTable::build(
                    ReportType::Year,
                    &yearly_totals(&report.month_data),
                    false,
                    now,
                ));
            }
        }
    }

    fn fill_period_report(
        &mut self,
        settings: &FinanceSettings,
        report_type: ReportType,
        report: &ReportPayload,
        now: DateTime<Utc>,
    ) {
        self.proposal_table = ProposalTable::build(report_type, &report.report_detail, &settings.sort);
        if report.proposal_total > 0.0 {
            self.spend_summary = Some(SpendSummary::build(report));
            self.domain_spend = DomainSpendView::build(&report.report_detail);
        }
        self.treasury = TreasuryView::build(report);
        if report_type == ReportType::Year && !report.monthly_result_data.is_empty() {
            self.monthly = Some(PeriodTable::build(
                ReportType::Month,
                &report.monthly_result_data,
                true,
                now,
            ));
        }
    }
}

fn proposal_card(info: &SummaryRecord) -> Vec<CardLine> {
    let remaining = if info.total_remaining == 0.0 {
        CardLine::text("Status", "Finished")
    } else {
        CardLine::text("Total Remaining (Est)", usd(info.total_remaining))
    };
    vec![
        CardLine::link("Owner", info.author.clone(), owner_href(&info.author)),
        CardLine::link("Domain", capitalize(&info.domain), domain_href(&info.domain)),
        CardLine::text("Start Date", info.start.clone()),
        CardLine::text("End Date", info.end.clone()),
        CardLine::text("Budget", usd(info.budget)),
        CardLine::text("Total Spent (Est)", usd(info.total_spent)),
        remaining,
    ]
}

// ============================================================================
// Tests
// ============================================================================
