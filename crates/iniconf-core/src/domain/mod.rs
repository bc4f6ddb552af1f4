//! Domain entities for iniconf.
//!
//! This module contains the in-memory model with no infrastructure
//! dependencies: nothing here touches files, clocks or threads, so every type
//! can be unit-tested in isolation.
//!
//! - [`value`] – [`value::ScalarValue`], the textual representation of one
//!   configuration value.
//! - [`store`] – [`store::OrderedStore`], the insertion-ordered map holding
//!   every entry.
//! - [`entry_id`] – joining and splitting of `section` / `key` identifiers.

pub mod entry_id;
pub(crate) mod numeric;
pub mod store;
pub mod value;
