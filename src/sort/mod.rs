//! Sorting of proposal summary records.
//!
//! Summary tables can be ordered by any of their columns. Clicking a column
//! header selects it as the sort field and flips the direction. Until a field
//! is chosen each table falls back to its own default column.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::domain::SummaryRecord;

// ============================================================================
// Sort Field
// ============================================================================

/// Column a summary table is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    /// Proposal name (`pname`).
    ProposalName,
    /// Author (`author`).
    Author,
    /// Domain, then proposal name (`domain`).
    Domain,
    /// Budget (`budget`).
    Budget,
    /// Total spent (`spent`).
    Spent,
    /// Total remaining (`remaining`).
    Remaining,
    /// Proposal length in days (`days`).
    Days,
    /// Estimated monthly average (`avg`).
    Average,
    /// Start date (`startdt`).
    StartDate,
    /// End date (`enddt`).
    EndDate,
}

impl SortField {
    /// Every field, in table column order.
    pub const ALL: [Self; 10] = [
        Self::ProposalName,
        Self::Domain,
        Self::Author,
        Self::StartDate,
        Self::EndDate,
        Self::Budget,
        Self::Days,
        Self::Average,
        Self::Spent,
        Self::Remaining,
    ];

    /// The `stype` query value for this field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ProposalName => "pname",
            Self::Author => "author",
            Self::Domain => "domain",
            Self::Budget => "budget",
            Self::Spent => "spent",
            Self::Remaining => "remaining",
            Self::Days => "days",
            Self::Average => "avg",
            Self::StartDate => "startdt",
            Self::EndDate => "enddt",
        }
    }

    /// Column header label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ProposalName => "Name",
            Self::Author => "Author",
            Self::Domain => "Domain",
            Self::Budget => "Budget",
            Self::Spent => "Total Spent (Est)",
            Self::Remaining => "Total Remaining (Est)",
            Self::Days => "Days",
            Self::Average => "Monthly Avg (Est)",
            Self::StartDate => "Start Date",
            Self::EndDate => "End Date",
        }
    }

    /// Ascending comparison of two records on this field.
    #[must_use]
    pub fn compare(&self, a: &SummaryRecord, b: &SummaryRecord) -> Ordering {
        match self {
            Self::ProposalName => a.name.cmp(&b.name),
            Self::Author => a.author.cmp(&b.author),
            Self::Domain => a.domain.cmp(&b.domain).then_with(|| a.name.cmp(&b.name)),
            Self::Budget => a.budget.total_cmp(&b.budget),
            Self::Spent => a.total_spent.total_cmp(&b.total_spent),
            Self::Remaining => a.total_remaining.total_cmp(&b.total_remaining),
            Self::Days => a.length_in_days().cmp(&b.length_in_days()),
            Self::Average => a.monthly_average().total_cmp(&b.monthly_average()),
            Self::StartDate => a.start_date().cmp(&b.start_date()),
            Self::EndDate => a.end_date().cmp(&b.end_date()),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = std::convert::Infallible;

    /// Unknown names order by start date, like the table's default branch.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .unwrap_or(Self::StartDate))
    }
}

// ============================================================================
// Sort Order
// ============================================================================

/// Direction of a summary table sort.
///
/// The query string carries `desc` and `esc`. `esc` stands in for
/// "ascending" on the server's links; it is kept as the wire label so
/// existing URLs keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    /// Larger values first (`desc`).
    #[default]
    Descending,
    /// Smaller values first (`esc`).
    Ascending,
}

impl SortOrder {
    /// The `order` query value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Descending => "desc",
            Self::Ascending => "esc",
        }
    }

    /// The opposite direction.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Descending => Self::Ascending,
            Self::Ascending => Self::Descending,
        }
    }

    /// Apply this direction to an ascending comparison.
    #[must_use]
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Descending => ordering.reverse(),
            Self::Ascending => ordering,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = std::convert::Infallible;

    /// Anything other than `desc` is the ascending marker.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == "desc" {
            Self::Descending
        } else {
            Self::Ascending
        })
    }
}

// ============================================================================
// Sort State
// ============================================================================

/// The active sort field and direction of a summary table.
///
/// `field` is `None` while no `stype` has been chosen; tables then order by
/// their own fallback column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    /// Field the table is ordered by, if one was chosen.
    pub field: Option<SortField>,
    /// Direction of the ordering.
    pub order: SortOrder,
}

impl SortState {
    /// Create a sort state with a chosen field.
    #[must_use]
    pub const fn new(field: SortField, order: SortOrder) -> Self {
        Self {
            field: Some(field),
            order,
        }
    }

    /// Create a sort state with no chosen field.
    #[must_use]
    pub const fn unset(order: SortOrder) -> Self {
        Self { field: None, order }
    }

    /// The chosen field, or `fallback` when none was chosen.
    #[must_use]
    pub const fn field_or(&self, fallback: SortField) -> SortField {
        match self.field {
            Some(field) => field,
            None => fallback,
        }
    }

    /// Select `field` and flip the direction.
    ///
    /// The direction flips on every call, whether or not the field changed.
    pub fn toggle(&mut self, field: SortField) {
        self.field = Some(field);
        self.order = self.order.toggled();
    }

    /// Returns `true` if the given column is the active one of a table whose
    /// fallback column is `fallback`.
    #[must_use]
    pub fn is_active(&self, field: SortField, fallback: SortField) -> bool {
        self.field_or(fallback) == field
    }

    /// Sort records in place. Ties keep their input order.
    pub fn sort(&self, records: &mut [SummaryRecord], fallback: SortField) {
        sort_summary(records, self.field_or(fallback), self.order);
    }

    /// Sorted copy of records, ordered as in [`SortState::sort`].
    #[must_use]
    pub fn sorted(&self, records: &[SummaryRecord], fallback: SortField) -> Vec<SummaryRecord> {
        sorted_summary(records, self.field_or(fallback), self.order)
    }
}

/// Stable sort of summary records by `field` in direction `order`.
pub fn sort_summary(records: &mut [SummaryRecord], field: SortField, order: SortOrder) {
    records.sort_by(|a, b| order.apply(field.compare(a, b)));
}

/// Sorted copy of summary records.
#[must_use]
pub fn sorted_summary(
    records: &[SummaryRecord],
    field: SortField,
    order: SortOrder,
) -> Vec<SummaryRecord> {
    let mut sorted = records.to_vec();
    sort_summary(&mut sorted, field, order);
    sorted
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(name: &str, start: &str) -> SummaryRecord {
        SummaryRecord {
            name: name.to_string(),
            start: start.to_string(),
            ..Default::default()
        }
    }

    fn full(name: &str, domain: &str, budget: f64, start: &str, end: &str) -> SummaryRecord {
        SummaryRecord {
            name: name.to_string(),
            domain: domain.to_string(),
            author: format!("{name}-author"),
            budget,
            total_spent: budget / 2.0,
            total_remaining: budget / 4.0,
            start: start.to_string(),
            end: end.to_string(),
            ..Default::default()
        }
    }

    fn names(records: &[SummaryRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_start_date_sort_and_toggle() {
        let records = vec![record("B", "2021-02-01"), record("A", "2021-01-01")];
        let mut state = SortState::new(SortField::StartDate, SortOrder::Descending);

        let desc = state.sorted(&records, SortField::ProposalName);
        assert_eq!(names(&desc), vec!["B", "A"]);

        state.toggle(SortField::StartDate);
        assert_eq!(state.order, SortOrder::Ascending);
        let asc = state.sorted(&records, SortField::ProposalName);
        assert_eq!(names(&asc), vec!["A", "B"]);
    }

    #[test]
    fn test_unset_field_uses_fallback() {
        let records = vec![record("Zeta", "2020-01-01"), record("Alpha", "2021-01-01")];
        let state = SortState::unset(SortOrder::Descending);

        assert_eq!(names(&state.sorted(&records, SortField::StartDate)), vec!["Alpha", "Zeta"]);
        assert_eq!(names(&state.sorted(&records, SortField::ProposalName)), vec!["Zeta", "Alpha"]);
        assert!(state.is_active(SortField::StartDate, SortField::StartDate));
        assert!(!state.is_active(SortField::ProposalName, SortField::StartDate));
    }

    #[test]
    fn test_toggle_flips_even_when_field_changes() {
        let mut state = SortState::default();
        assert_eq!(state.field, None);
        assert_eq!(state.order, SortOrder::Descending);

        state.toggle(SortField::Budget);
        assert_eq!(state, SortState::new(SortField::Budget, SortOrder::Ascending));

        state.toggle(SortField::Spent);
        assert_eq!(state, SortState::new(SortField::Spent, SortOrder::Descending));
    }

    #[test]
    fn test_domain_sort_breaks_ties_by_name() {
        let records = vec![
            full("b", "marketing", 1.0, "2021-01-01", "2021-02-01"),
            full("c", "development", 1.0, "2021-01-01", "2021-02-01"),
            full("a", "marketing", 1.0, "2021-01-01", "2021-02-01"),
        ];
        let asc = sorted_summary(&records, SortField::Domain, SortOrder::Ascending);
        assert_eq!(names(&asc), vec!["c", "a", "b"]);
        let desc = sorted_summary(&records, SortField::Domain, SortOrder::Descending);
        assert_eq!(names(&desc), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_name_sort_is_case_sensitive() {
        let records = vec![record("beta", ""), record("Alpha", ""), record("alpha", "")];
        let asc = sorted_summary(&records, SortField::ProposalName, SortOrder::Ascending);
        assert_eq!(names(&asc), vec!["Alpha", "alpha", "beta"]);
    }

    #[rstest]
    #[case(SortField::Budget, vec!["small", "mid", "large"])]
    #[case(SortField::Spent, vec!["small", "mid", "large"])]
    #[case(SortField::Remaining, vec!["small", "mid", "large"])]
    #[case(SortField::Days, vec!["small", "large", "mid"])]
    #[case(SortField::Average, vec!["small", "mid", "large"])]
    #[case(SortField::EndDate, vec!["small", "large", "mid"])]
    fn test_numeric_fields_ascending(#[case] field: SortField, #[case] expected: Vec<&str>) {
        let records = vec![
            full("large", "x", 30000.0, "2021-01-01", "2021-04-01"),
            full("small", "x", 1000.0, "2021-01-01", "2021-01-11"),
            full("mid", "x", 12000.0, "2021-01-01", "2021-07-01"),
        ];
        let asc = sorted_summary(&records, field, SortOrder::Ascending);
        assert_eq!(names(&asc), expected);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let records = vec![
            full("first", "x", 5.0, "2021-01-01", "2021-02-01"),
            full("second", "x", 5.0, "2021-01-01", "2021-02-01"),
            full("third", "x", 5.0, "2021-01-01", "2021-02-01"),
        ];
        for order in [SortOrder::Ascending, SortOrder::Descending] {
            let sorted = sorted_summary(&records, SortField::Budget, order);
            assert_eq!(names(&sorted), vec!["first", "second", "third"]);
        }
    }

    #[test]
    fn test_unparseable_dates_sort_first_ascending() {
        let records = vec![record("dated", "2021-01-01"), record("undated", "tbd")];
        let asc = sorted_summary(&records, SortField::StartDate, SortOrder::Ascending);
        assert_eq!(names(&asc), vec!["undated", "dated"]);
    }

    #[rstest]
    #[case("pname", SortField::ProposalName)]
    #[case("author", SortField::Author)]
    #[case("domain", SortField::Domain)]
    #[case("budget", SortField::Budget)]
    #[case("spent", SortField::Spent)]
    #[case("remaining", SortField::Remaining)]
    #[case("days", SortField::Days)]
    #[case("avg", SortField::Average)]
    #[case("startdt", SortField::StartDate)]
    #[case("enddt", SortField::EndDate)]
    #[case("whatever", SortField::StartDate)]
    fn test_sort_field_from_str(#[case] raw: &str, #[case] expected: SortField) {
        assert_eq!(raw.parse::<SortField>().unwrap(), expected);
    }

    #[rstest]
    #[case("desc", SortOrder::Descending)]
    #[case("esc", SortOrder::Ascending)]
    #[case("asc", SortOrder::Ascending)]
    fn test_sort_order_from_str(#[case] raw: &str, #[case] expected: SortOrder) {
        assert_eq!(raw.parse::<SortOrder>().unwrap(), expected);
    }
}
