//! Typed settings of the two explorer views.
//!
//! Each view declares its recognized query keys once. The typed settings are
//! read from and written back to the generic [`Params`] representation, so
//! the minimal-query and defaulting rules live only in [`ParamStore`].

use crate::domain::{ReportType, TimeBucket, ViewError};
use crate::sort::{SortField, SortOrder, SortState};

use super::params::{ParamSpec, ParamStore, ParamValue, Params, QueryMap, parse_query};

// ============================================================================
// Recognized Keys
// ============================================================================

/// Query key of the visual-blocks toggle.
pub const VSDISP: &str = "vsdisp";

/// Recognized keys of the block list view.
pub const BLOCK_LIST_PARAMS: &[ParamSpec] = &[ParamSpec::flag(VSDISP, false)];

/// Recognized keys of the finance detail view.
pub const FINANCE_PARAMS: &[ParamSpec] = &[
    ParamSpec::text("type", ""),
    ParamSpec::text("time", ""),
    ParamSpec::text("token", ""),
    ParamSpec::text("name", ""),
    ParamSpec::text("stype", ""),
    ParamSpec::text("order", "desc"),
];

fn text<'a>(params: &'a Params, key: &str) -> &'a str {
    params.get(key).and_then(ParamValue::as_text).unwrap_or("")
}

// ============================================================================
// Block List Settings
// ============================================================================

/// Settings of the live block list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockListSettings {
    /// Show the visual-blocks column instead of the tx/vote/ticket/rev counts.
    pub visual_blocks: bool,
}

impl BlockListSettings {
    /// The block list parameter store.
    pub const STORE: ParamStore = ParamStore::new(BLOCK_LIST_PARAMS);

    /// Read settings from a query string.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let params = Self::STORE.init(query);
        Self {
            visual_blocks: params
                .get(VSDISP)
                .and_then(ParamValue::as_flag)
                .unwrap_or(false),
        }
    }

    /// Settings as generic parameters.
    #[must_use]
    pub fn to_params(&self) -> Params {
        let mut params = Self::STORE.defaults();
        params.insert(VSDISP, ParamValue::Flag(self.visual_blocks));
        params
    }

    /// Merge these settings into an existing query.
    ///
    /// Keys the block list does not own (paging offsets and the like) are
    /// kept.
    #[must_use]
    pub fn merged_query(&self, existing: &str) -> QueryMap {
        Self::STORE.merge_into(&parse_query(existing), &self.to_params())
    }
}

// ============================================================================
// Finance Settings
// ============================================================================

/// Settings of the finance report detail view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FinanceSettings {
    /// Report type; `None` when absent or unrecognized.
    pub report_type: Option<ReportType>,
    /// Time bucket of month and year reports.
    pub time: Option<TimeBucket>,
    /// Proposal token of proposal reports.
    pub token: String,
    /// Domain or author name of domain and owner reports.
    pub name: String,
    /// Summary table sort.
    pub sort: SortState,
}

impl FinanceSettings {
    /// The finance parameter store.
    pub const STORE: ParamStore = ParamStore::new(FINANCE_PARAMS);

    /// Read settings from a query string.
    ///
    /// Values that fail to parse are treated as absent, which later makes
    /// [`FinanceSettings::report_key`] refuse to fetch.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let params = Self::STORE.init(query);

        let report_type = match text(&params, "type") {
            "" => None,
            raw => raw
                .parse::<ReportType>()
                .inspect_err(|e| tracing::warn!("Ignoring report type: {e}"))
                .ok(),
        };
        let time = match text(&params, "time") {
            "" => None,
            raw => raw
                .parse::<TimeBucket>()
                .inspect_err(|e| tracing::warn!("Ignoring report time: {e}"))
                .ok(),
        };
        let field = match text(&params, "stype") {
            "" => None,
            raw => raw.parse::<SortField>().ok(),
        };
        let order = text(&params, "order")
            .parse::<SortOrder>()
            .unwrap_or_default();

        Self {
            report_type,
            time,
            token: text(&params, "token").to_string(),
            name: text(&params, "name").to_string(),
            sort: SortState { field, order },
        }
    }

    /// Settings as generic parameters.
    #[must_use]
    pub fn to_params(&self) -> Params {
        let mut params = Self::STORE.defaults();
        params.insert(
            "type",
            ParamValue::from(self.report_type.map(|t| t.as_str()).unwrap_or_default()),
        );
        params.insert(
            "time",
            ParamValue::from(self.time.map(|t| t.to_string()).unwrap_or_default()),
        );
        params.insert("token", ParamValue::from(self.token.as_str()));
        params.insert("name", ParamValue::from(self.name.as_str()));
        params.insert(
            "stype",
            ParamValue::from(self.sort.field.map(|f| f.as_str()).unwrap_or_default()),
        );
        params.insert("order", ParamValue::from(self.sort.order.as_str()));
        params
    }

    /// The minimal query describing these settings.
    #[must_use]
    pub fn to_query(&self) -> QueryMap {
        Self::STORE.serialize(&self.to_params())
    }

    /// The key identifying the requested report, e.g. `("name", "marketing")`.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::InvalidQuery`] when the type is missing or the
    /// parameter the type requires is missing or malformed.
    pub fn report_key(&self) -> Result<(&'static str, String), ViewError> {
        let report_type = self
            .report_type
            .ok_or_else(|| ViewError::invalid_query("type", "missing report type"))?;

        match report_type {
            ReportType::Month | ReportType::Year => {
                let time = self
                    .time
                    .ok_or_else(|| ViewError::invalid_query("time", "missing report time"))?;
                let matches = match (report_type, time) {
                    (ReportType::Year, TimeBucket::Year(_)) => true,
                    (ReportType::Month, TimeBucket::Month { .. }) => true,
                    _ => false,
                };
                if !matches {
                    return Err(ViewError::invalid_query(
                        "time",
                        format!("'{time}' is not a {report_type}"),
                    ));
                }
                Ok(("time", time.to_string()))
            }
            ReportType::Domain | ReportType::Owner if self.name.is_empty() => {
                Err(ViewError::invalid_query("name", "missing name"))
            }
            ReportType::Domain | ReportType::Owner => Ok(("name", self.name.clone())),
            ReportType::Proposal if self.token.is_empty() => {
                Err(ViewError::invalid_query("token", "missing proposal token"))
            }
            ReportType::Proposal => Ok(("token", self.token.clone())),
        }
    }
}

// ============================================================================
// Navigation Links
// ============================================================================

/// Rewrite a navigation href so it carries the visual-blocks flag.
///
/// Turning the flag on appends `&vsdisp=true` when the link has no `vsdisp`
/// key, or flips an existing `vsdisp=false`. Turning it off strips
/// `vsdisp=true` from either `?vsdisp=true&...` or `...&vsdisp=true`. Empty
/// hrefs are left alone.
#[must_use]
pub fn rewrite_vsdisp_link(href: &str, visual_blocks: bool) -> String {
    if href.is_empty() {
        return String::new();
    }
    if visual_blocks {
        if !href.contains(VSDISP) {
            let sep = if href.contains('?') { '&' } else { '?' };
            return format!("{href}{sep}vsdisp=true");
        }
        if href.contains("vsdisp=false") {
            return href.replacen("vsdisp=false", "vsdisp=true", 1);
        }
    } else if href.contains("?vsdisp=true&") {
        return href.replacen("vsdisp=true&", "", 1);
    } else if href.contains("&vsdisp=true") {
        return href.replacen("&vsdisp=true", "", 1);
    }
    href.to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::params::encode_query;
    use insta::assert_snapshot;
    use rstest::rstest;

    #[rstest]
    #[case("", false)]
    #[case("vsdisp=true", true)]
    #[case("vsdisp=false", false)]
    #[case("vsdisp=yes", false)]
    fn test_block_list_from_query(#[case] query: &str, #[case] on: bool) {
        assert_eq!(BlockListSettings::from_query(query).visual_blocks, on);
    }

    #[test]
    fn test_block_list_merge_preserves_offset() {
        let on = BlockListSettings {
            visual_blocks: true,
        };
        assert_snapshot!(encode_query(&on.merged_query("offset=40&rows=20")), @"offset=40&rows=20&vsdisp=true");

        let off = BlockListSettings::default();
        assert_snapshot!(encode_query(&off.merged_query("offset=40&vsdisp=true")), @"offset=40");
    }

    #[test]
    fn test_finance_defaults() {
        let settings = FinanceSettings::from_query("");
        assert_eq!(settings.report_type, None);
        assert_eq!(settings.sort, SortState::unset(SortOrder::Descending));
        assert!(settings.to_query().is_empty());
    }

    #[test]
    fn test_finance_name_sort_survives_round_trip() {
        let mut settings = FinanceSettings::from_query("type=domain&name=marketing");
        assert_eq!(settings.sort.field, None);

        settings.sort = SortState::new(SortField::ProposalName, SortOrder::Descending);
        assert_snapshot!(encode_query(&settings.to_query()), @"type=domain&name=marketing&stype=pname");
        let reread = FinanceSettings::from_query("type=domain&name=marketing&stype=pname");
        assert_eq!(reread.sort.field, Some(SortField::ProposalName));
    }

    #[test]
    fn test_finance_round_trip() {
        let settings = FinanceSettings::from_query("type=month&time=2021_3&stype=budget&order=esc");
        assert_eq!(settings.report_type, Some(ReportType::Month));
        assert_eq!(settings.time, Some(TimeBucket::Month { year: 2021, month: 3 }));
        assert_eq!(settings.sort.order, SortOrder::Ascending);
        assert_snapshot!(encode_query(&settings.to_query()), @"type=month&time=2021_3&stype=budget&order=esc");
    }

    #[test]
    fn test_finance_unknown_type_is_absent() {
        let settings = FinanceSettings::from_query("type=galaxy&name=x");
        assert_eq!(settings.report_type, None);
        assert!(settings.report_key().is_err());
    }

    #[rstest]
    #[case("type=year&time=2021", Some(("time", "2021")))]
    #[case("type=month&time=2021_12", Some(("time", "2021_12")))]
    #[case("type=month&time=2021", None)]
    #[case("type=year", None)]
    #[case("type=domain&name=marketing", Some(("name", "marketing")))]
    #[case("type=owner", None)]
    #[case("type=proposal&token=abc123", Some(("token", "abc123")))]
    #[case("type=proposal", None)]
    #[case("type=proposal&name=x", None)]
    #[case("", None)]
    fn test_report_key(#[case] query: &str, #[case] expected: Option<(&str, &str)>) {
        let key = FinanceSettings::from_query(query).report_key().ok();
        let key = key.as_ref().map(|(k, v)| (*k, v.as_str()));
        assert_eq!(key, expected);
    }

    #[rstest]
    #[case("/blocks?offset=20", true, "/blocks?offset=20&vsdisp=true")]
    #[case("/blocks", true, "/blocks?vsdisp=true")]
    #[case("/blocks?offset=20&vsdisp=false", true, "/blocks?offset=20&vsdisp=true")]
    #[case("/blocks?offset=20&vsdisp=true", true, "/blocks?offset=20&vsdisp=true")]
    #[case("/blocks?vsdisp=true&offset=20", false, "/blocks?offset=20")]
    #[case("/blocks?offset=20&vsdisp=true", false, "/blocks?offset=20")]
    #[case("/blocks?vsdisp=true", false, "/blocks?vsdisp=true")]
    #[case("", true, "")]
    fn test_rewrite_vsdisp_link(#[case] href: &str, #[case] on: bool, #[case] expected: &str) {
        assert_eq!(rewrite_vsdisp_link(href, on), expected);
    }
}
