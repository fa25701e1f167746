//! URL query state of the explorer views.
//!
//! # Module Organization
//!
//! - [`params`] - Generic recognized-key store with defaults
//! - [`settings`] - Typed block list and finance settings
//! - [`location`] - The location whose query is read and replaced

pub mod location;
pub mod params;
pub mod settings;

pub use location::{Location, MemoryLocation};
pub use params::{
    ParamKind, ParamSpec, ParamStore, ParamValue, Params, QueryMap, encode_query, parse_query,
};
pub use settings::{BlockListSettings, FinanceSettings, rewrite_vsdisp_link};
