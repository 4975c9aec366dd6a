#![forbid(unsafe_code)]

//! Containers: ordered map, keyed list, and container capability traits.
//!
//! # Role in FrankenTUI
//! `ftui-collections` holds the plain data structures that UI models are
//! built from. It has no notion of change notification; the observable
//! decorators in `ftui-observable` wrap anything implementing the
//! capability traits defined here.
//!
//! # Primary responsibilities
//! - **Capabilities**: [`Container`], [`PositionalContainer`],
//!   [`KeyedContainer`], implemented for `Vec`, `HashSet`, `BTreeSet` and
//!   the types below.
//! - **OrderedMap**: O(1) key lookup plus caller-controlled positional order.
//! - **KeyedList**: items keyed by a derived key, backed by [`OrderedMap`].
//! - **Adapters**: [`ReadOnly`] views and element-type [`Converted`] views.

pub mod capability;
pub mod convert;
pub mod error;
pub mod keyed_list;
pub mod ordered_map;
pub mod read_only;

pub use capability::{Container, KeyedContainer, PositionalContainer};
pub use convert::Converted;
pub use error::{CollectionError, Result};
pub use keyed_list::KeyedList;
pub use ordered_map::OrderedMap;
pub use read_only::ReadOnly;
