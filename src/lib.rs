//! dcrlens: a terminal viewer for a dcrdata explorer's live block list and
//! treasury finance reports.
//!
//! The library is layered bottom-up:
//!
//! - [`domain`] - Payload types and report aggregates
//! - [`query`], [`sort`], [`pagination`], [`cache`] - View settings and the
//!   state machines behind them
//! - [`client`] - The JSON source the controllers fetch through
//! - [`live`] - Block table, visual blocks and the block-arrival bus
//! - [`view`] - Declarative view descriptions
//! - [`controller`] - Per-screen controllers
//! - [`state`], [`commands`], [`ui`], [`tui`] - The terminal front-end

pub mod cache;
pub mod client;
pub mod commands;
pub mod constants;
pub mod controller;
pub mod domain;
pub mod live;
pub mod pagination;
pub mod query;
pub mod sort;
pub mod state;
pub mod theme;
pub mod tui;
pub mod ui;
pub mod view;
