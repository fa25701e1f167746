//! Finance report detail controller.
//!
//! Settings come from the location's query string. Reports are fetched
//! through a [`ReportSource`], memoized in a [`ReportCache`] and guarded by a
//! [`RequestSequencer`] so a slow response cannot overwrite a newer one.
//!
//! A load can run in one call with [`FinanceDetailController::load`], or in
//! two halves ([`FinanceDetailController::begin_load`] and
//! [`FinanceDetailController::finish_load`]) when the fetch runs on another
//! task.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::cache::{
    Clock, Freshness, ReportCache, RequestSequencer, RequestTicket, StalePolicy, SystemClock,
};
use crate::client::ReportSource;
use crate::constants::{DEFAULT_CACHE_TTL_SECS, DEFAULT_POLITEIA_URL, FINANCE_DETAIL_ENDPOINT};
use crate::domain::{ReportPayload, ReportType, ViewError};
use crate::pagination::{NavigationIndex, Position, ReportRange};
use crate::query::{FinanceSettings, Location, encode_query};
use crate::sort::SortField;
use crate::view::{FinanceView, ReportView};

// ============================================================================
// Options
// ============================================================================

/// Tunables of a [`FinanceDetailController`].
#[derive(Debug, Clone)]
pub struct FinanceOptions {
    /// Cache lifetime of reports that carry no expiration of their own.
    pub cache_ttl: Duration,
    /// What to do with out-of-sequence responses.
    pub stale_policy: StalePolicy,
    /// Months and years that month/year navigation may visit.
    pub range: ReportRange,
    /// Proposal discussion site.
    pub politeia_url: String,
    /// Time source for cache expiry and future-period marking.
    pub clock: Arc<dyn Clock>,
}

impl Default for FinanceOptions {
    fn default() -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            stale_policy: StalePolicy::default(),
            range: ReportRange::through(clock.now()),
            politeia_url: DEFAULT_POLITEIA_URL.to_string(),
            clock,
        }
    }
}

// ============================================================================
// Load Steps
// ============================================================================

/// A fetch the controller is waiting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLoad {
    /// Sequence ticket of the request.
    pub ticket: RequestTicket,
    /// Report URL, also the cache key.
    pub url: String,
}

/// What [`FinanceDetailController::begin_load`] decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStep {
    /// The load finished without a fetch.
    Done(LoadOutcome),
    /// The caller must fetch `url` and hand the result to `finish_load`.
    Fetch(PendingLoad),
}

/// Result of a report load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The settings do not name a report; nothing was fetched.
    NoData,
    /// A report was applied.
    Loaded {
        /// The report came from the cache.
        cached: bool,
    },
    /// The server answered with nothing; the report sections are hidden.
    Empty,
    /// A newer request was issued meanwhile and the response was dropped.
    Discarded {
        /// Ticket of the dropped response.
        ticket: RequestTicket,
        /// Latest issued ticket.
        latest: RequestTicket,
    },
}

// ============================================================================
// Controller
// ============================================================================

/// Controller of the finance report detail view.
pub struct FinanceDetailController {
    source: Arc<dyn ReportSource>,
    location: Box<dyn Location>,
    settings: FinanceSettings,
    cache: ReportCache<ReportPayload>,
    sequencer: RequestSequencer,
    options: FinanceOptions,
    domains: NavigationIndex,
    owners: NavigationIndex,
    tokens: NavigationIndex,
    report: Option<ReportPayload>,
}

impl FinanceDetailController {
    /// Create a controller reading its settings from `location`.
    #[must_use]
    pub fn new(
        source: Arc<dyn ReportSource>,
        location: Box<dyn Location>,
        options: FinanceOptions,
    ) -> Self {
        let settings = FinanceSettings::from_query(&location.query());
        Self {
            source,
            location,
            settings,
            cache: ReportCache::with_clock(options.clock.clone()),
            sequencer: RequestSequencer::new(),
            options,
            domains: NavigationIndex::default(),
            owners: NavigationIndex::default(),
            tokens: NavigationIndex::default(),
            report: None,
        }
    }

    /// Re-read settings from the location and validate them.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::InvalidQuery`] when a required parameter is
    /// missing. The view then shows no data and [`Self::load`] will not
    /// fetch.
    pub fn init(&mut self) -> Result<(), ViewError> {
        self.settings = FinanceSettings::from_query(&self.location.query());
        self.report = None;
        self.settings
            .report_key()
            .map(|_| ())
            .inspect_err(|e| tracing::warn!("No finance report to show: {e}"))
    }

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> &FinanceSettings {
        &self.settings
    }

    /// The location the settings are written back to.
    #[must_use]
    pub fn location(&self) -> &dyn Location {
        self.location.as_ref()
    }

    /// The report source.
    #[must_use]
    pub fn source(&self) -> Arc<dyn ReportSource> {
        Arc::clone(&self.source)
    }

    /// The report currently shown.
    #[must_use]
    pub fn report(&self) -> Option<&ReportPayload> {
        self.report.as_ref()
    }

    /// API URL of the report the settings name.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::InvalidQuery`] when the settings do not name a
    /// report.
    pub fn report_url(&self) -> Result<String, ViewError> {
        let (key, value) = self.settings.report_key()?;
        let report_type = self
            .settings
            .report_type
            .ok_or_else(|| ViewError::invalid_query("type", "missing report type"))?;
        let query = vec![
            ("type".to_string(), report_type.as_str().to_string()),
            (key.to_string(), value),
        ];
        Ok(format!("{FINANCE_DETAIL_ENDPOINT}?{}", encode_query(&query)))
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Start a load: answer from the cache or issue a fetch ticket.
    ///
    /// Every call issues a ticket, so an older fetch still in flight becomes
    /// stale even when this load is answered from the cache.
    pub fn begin_load(&mut self) -> LoadStep {
        let url = match self.report_url() {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Not loading report: {e}");
                self.report = None;
                return LoadStep::Done(LoadOutcome::NoData);
            }
        };
        let ticket = self.sequencer.issue();
        if let Some(cached) = self.cache.get(&url).cloned() {
            tracing::debug!("Report cache hit for {url} ({ticket})");
            self.apply(cached);
            return LoadStep::Done(LoadOutcome::Loaded { cached: true });
        }
        LoadStep::Fetch(PendingLoad { ticket, url })
    }

    /// Finish a load with the fetch result.
    ///
    /// The payload is cached whether or not the request is still the latest.
    /// A stale response, failed or not, is then kept or dropped per the stale
    /// policy. A failure that is applied clears the shown report, since the
    /// settings may already name a different one.
    ///
    /// # Errors
    ///
    /// Returns the fetch error, or [`ViewError::Parse`] if the body is not a
    /// report.
    pub fn finish_load(
        &mut self,
        pending: PendingLoad,
        result: Result<Option<Value>, ViewError>,
    ) -> Result<LoadOutcome, ViewError> {
        let freshness = self.sequencer.freshness(pending.ticket);
        let discard = self.options.stale_policy == StalePolicy::Discard;

        let parsed = result.and_then(|body| body.map(ReportPayload::from_value).transpose());
        let payload = match parsed {
            Ok(payload) => payload,
            Err(e) => {
                if let Freshness::Stale { ticket, latest } = freshness
                    && discard
                {
                    tracing::warn!(
                        "Failed response {ticket} for {} superseded by {latest}: {e}",
                        pending.url
                    );
                    return Ok(LoadOutcome::Discarded { ticket, latest });
                }
                self.report = None;
                return Err(e);
            }
        };

        if let Some(payload) = &payload {
            match payload.expiration {
                Some(expires_at) => {
                    self.cache
                        .put_until(pending.url.clone(), payload.clone(), expires_at);
                }
                None => {
                    self.cache
                        .put(pending.url.clone(), payload.clone(), self.options.cache_ttl);
                }
            }
        }

        if let Freshness::Stale { ticket, latest } = freshness {
            tracing::warn!("Response {ticket} for {} arrived after {latest}", pending.url);
            if discard {
                return Ok(LoadOutcome::Discarded { ticket, latest });
            }
        }

        Ok(match payload {
            Some(payload) => {
                self.apply(payload);
                LoadOutcome::Loaded { cached: false }
            }
            None => {
                self.report = None;
                LoadOutcome::Empty
            }
        })
    }

    /// Load the report the settings name.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails or the body is not a report.
    pub async fn load(&mut self) -> Result<LoadOutcome, ViewError> {
        match self.begin_load() {
            LoadStep::Done(outcome) => Ok(outcome),
            LoadStep::Fetch(pending) => {
                let result = self.source.request_json(&pending.url).await;
                self.finish_load(pending, result)
            }
        }
    }

    fn apply(&mut self, report: ReportPayload) {
        match self.settings.report_type {
            Some(ReportType::Domain) => self.domains = NavigationIndex::new(&report.domain_list),
            Some(ReportType::Owner) => self.owners = NavigationIndex::new(&report.owner_list),
            Some(ReportType::Proposal) => self.tokens = NavigationIndex::new(&report.token_list),
            _ => {}
        }
        self.report = Some(report);
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Prev/next state of the current report.
    #[must_use]
    pub fn navigation(&self) -> Position {
        match self.settings.report_type {
            Some(ReportType::Domain) => self.domains.locate(&self.settings.name),
            Some(ReportType::Owner) => self.owners.locate(&self.settings.name),
            Some(ReportType::Proposal) => self.tokens.locate(&self.settings.token),
            Some(ReportType::Month | ReportType::Year) => self
                .settings
                .time
                .map_or_else(Position::disabled, |t| self.options.range.locate(t)),
            None => Position::disabled(),
        }
    }

    /// Move the settings one report back (`delta < 0`) or forward and write
    /// them to the location.
    ///
    /// Returns `false`, changing nothing, at either end of the list or range
    /// and when the current report is not in it.
    pub fn step_report(&mut self, delta: i32) -> bool {
        let Some(report_type) = self.settings.report_type else {
            return false;
        };
        if report_type.is_time_based() {
            let Some(next) = self
                .settings
                .time
                .and_then(|t| self.options.range.step(t, delta))
            else {
                return false;
            };
            self.settings.time = Some(next);
        } else {
            let position = self.navigation();
            let key = if delta < 0 {
                position.prev_key
            } else {
                position.next_key
            };
            let Some(key) = key else {
                return false;
            };
            if report_type == ReportType::Proposal {
                self.settings.token = key;
            } else {
                self.settings.name = key;
            }
        }
        self.location.replace(&self.settings.to_query());
        true
    }

    /// Show the previous report.
    ///
    /// Returns `None` when there is no previous report.
    ///
    /// # Errors
    ///
    /// Returns an error if loading the new report fails.
    pub async fn prev_report(&mut self) -> Result<Option<LoadOutcome>, ViewError> {
        if !self.step_report(-1) {
            return Ok(None);
        }
        self.load().await.map(Some)
    }

    /// Show the next report.
    ///
    /// Returns `None` when there is no next report.
    ///
    /// # Errors
    ///
    /// Returns an error if loading the new report fails.
    pub async fn next_report(&mut self) -> Result<Option<LoadOutcome>, ViewError> {
        if !self.step_report(1) {
            return Ok(None);
        }
        self.load().await.map(Some)
    }

    // ========================================================================
    // Sorting and View
    // ========================================================================

    /// Sort the summary tables by `field`, flipping the direction.
    ///
    /// Nothing is fetched; the new order is written to the location.
    pub fn sort_by(&mut self, field: SortField) {
        self.settings.sort.toggle(field);
        self.location.replace(&self.settings.to_query());
    }

    /// Build the view of the current state.
    #[must_use]
    pub fn view(&self) -> FinanceView {
        match ReportView::build(
            &self.settings,
            self.report.as_ref(),
            self.navigation(),
            &self.options.politeia_url,
            self.options.clock.now(),
        ) {
            Ok(view) => FinanceView::Report(Box::new(view)),
            Err(e) => FinanceView::NoData {
                reason: e.to_string(),
            },
        }
    }
}

impl std::fmt::Debug for FinanceDetailController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinanceDetailController")
            .field("location", &self.location)
            .field("settings", &self.settings)
            .field("cached", &self.cache.len())
            .field("latest", &self.sequencer.latest())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
