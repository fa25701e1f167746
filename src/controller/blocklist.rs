//! Live block list controller.

use std::sync::Arc;

use crate::cache::{Clock, SystemClock};
use crate::domain::BlockPayload;
use crate::live::{BlockTable, ColumnKind, TableUpdate};
use crate::query::{BlockListSettings, Location, rewrite_vsdisp_link};
use crate::view::BlockListView;

/// Style class of height links in the live table.
const HEIGHT_LINK_CLASS: &str = "fs18";

/// Controller of the live block list.
#[derive(Debug)]
pub struct BlockListController {
    settings: BlockListSettings,
    location: Box<dyn Location>,
    table: BlockTable,
    nav_links: Vec<String>,
    clock: Arc<dyn Clock>,
}

impl BlockListController {
    /// Create a controller on the wall clock.
    #[must_use]
    pub fn new(location: Box<dyn Location>) -> Self {
        Self::with_clock(location, Arc::new(SystemClock))
    }

    /// Create a controller that reads time from `clock`.
    #[must_use]
    pub fn with_clock(location: Box<dyn Location>, clock: Arc<dyn Clock>) -> Self {
        let settings = BlockListSettings::from_query(&location.query());
        Self {
            settings,
            location,
            table: BlockTable::default(),
            nav_links: Vec::new(),
            clock,
        }
    }

    /// Re-read settings from the location.
    pub fn init(&mut self) {
        self.settings = BlockListSettings::from_query(&self.location.query());
        tracing::debug!("Block list visual blocks: {}", self.settings.visual_blocks);
    }

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> BlockListSettings {
        self.settings
    }

    /// The location the settings are written back to.
    #[must_use]
    pub fn location(&self) -> &dyn Location {
        self.location.as_ref()
    }

    /// The block table.
    #[must_use]
    pub fn table(&self) -> &BlockTable {
        &self.table
    }

    /// Replace the table with rows built from `blocks` in the default layout.
    pub fn seed(&mut self, blocks: &[BlockPayload]) {
        self.table = BlockTable::seed(
            blocks,
            &ColumnKind::default_layout(),
            HEIGHT_LINK_CLASS,
            self.clock.now(),
        );
    }

    /// Replace the table.
    pub fn set_table(&mut self, table: BlockTable) {
        self.table = table;
    }

    /// Set the pagination links, rewritten for the current settings.
    pub fn set_nav_links<I, S>(&mut self, links: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let visual_blocks = self.settings.visual_blocks;
        self.nav_links = links
            .into_iter()
            .map(|href| rewrite_vsdisp_link(href.as_ref(), visual_blocks))
            .collect();
    }

    /// Pagination links.
    #[must_use]
    pub fn nav_links(&self) -> &[String] {
        &self.nav_links
    }

    /// Flip the visual-blocks setting and write it to the location and the
    /// pagination links. Returns the new setting.
    pub fn toggle_visual_blocks(&mut self) -> bool {
        self.settings.visual_blocks = !self.settings.visual_blocks;
        let query = self.settings.merged_query(&self.location.query());
        self.location.replace(&query);
        let visual_blocks = self.settings.visual_blocks;
        for link in &mut self.nav_links {
            *link = rewrite_vsdisp_link(link, visual_blocks);
        }
        visual_blocks
    }

    /// Apply a block-arrival event to the table.
    pub fn process_block(&mut self, block: &BlockPayload) -> TableUpdate {
        let update = self.table.apply(block, self.clock.now());
        tracing::debug!("Block {} -> {update:?}", block.height);
        update
    }

    /// Refresh the age column.
    pub fn tick(&mut self) {
        self.table.refresh_ages(self.clock.now());
    }

    /// Build the view of the current state.
    #[must_use]
    pub fn view(&self) -> BlockListView {
        BlockListView::build(&self.table, &self.settings, &self.nav_links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::live::CellContent;
    use crate::query::MemoryLocation;
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};
    use serde_json::json;
    use std::time::Duration;

    fn block(height: u64) -> BlockPayload {
        BlockPayload::from_value(json!({
            "height": height,
            "unixStamp": 1_700_000_000,
            "size": 2048,
            "tx": 3,
        }))
    }

    #[fixture]
    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(Utc.timestamp_opt(1_700_000_030, 0).unwrap()))
    }

    fn controller(query: &str, clock: Arc<ManualClock>) -> BlockListController {
        let mut ctrl = BlockListController::with_clock(
            Box::new(MemoryLocation::new("/blocks", query)),
            clock,
        );
        ctrl.seed(&[block(10), block(9), block(8)]);
        ctrl
    }

    #[rstest]
    fn test_toggle_keeps_foreign_keys(clock: Arc<ManualClock>) {
        let mut ctrl = controller("offset=20&rows=3", clock);
        ctrl.set_nav_links(["/blocks?offset=40&rows=3", "/blocks?vsdisp=false&offset=0"]);

        assert!(ctrl.toggle_visual_blocks());
        assert_eq!(ctrl.location().query(), "offset=20&rows=3&vsdisp=true");
        assert_eq!(
            ctrl.nav_links(),
            ["/blocks?offset=40&rows=3&vsdisp=true", "/blocks?vsdisp=true&offset=0"]
        );

        assert!(!ctrl.toggle_visual_blocks());
        assert_eq!(ctrl.location().query(), "offset=20&rows=3");
        assert_eq!(
            ctrl.nav_links(),
            ["/blocks?offset=40&rows=3", "/blocks?offset=0"]
        );
    }

    #[rstest]
    fn test_init_reads_flag(clock: Arc<ManualClock>) {
        let ctrl = controller("vsdisp=true", clock);
        assert!(ctrl.settings().visual_blocks);
        assert!(ctrl.view().show_description);
    }

    #[rstest]
    fn test_process_block_updates_view(clock: Arc<ManualClock>) {
        let mut ctrl = controller("", clock);
        assert_eq!(ctrl.process_block(&block(11)), TableUpdate::Advanced { evicted: 8 });
        assert_eq!(ctrl.process_block(&block(11)), TableUpdate::ReplacedTip);
        assert_eq!(ctrl.process_block(&block(13)), TableUpdate::Ignored);
        let heights: Vec<u64> = ctrl.view().rows.iter().map(|r| r.height).collect();
        assert_eq!(heights, vec![11, 10, 9]);
    }

    #[rstest]
    fn test_tick_refreshes_ages(clock: Arc<ManualClock>) {
        let mut ctrl = controller("", clock.clone());
        let age = |ctrl: &BlockListController| {
            ctrl.table()
                .rows()
                .next()
                .and_then(|r| r.cell(&ColumnKind::Age))
                .map(|c| c.content.clone())
        };
        assert_eq!(age(&ctrl), Some(CellContent::Text("30s".into())));
        clock.advance(Duration::from_secs(60));
        ctrl.tick();
        assert_eq!(age(&ctrl), Some(CellContent::Text("1m 30s".into())));
    }
}
