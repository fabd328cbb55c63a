#![forbid(unsafe_code)]

//! Observable values and collections.
//!
//! The model layer exposes every piece of mutable state through these types;
//! presenters subscribe to them and hold the returned [`Subscription`]
//! guards. Disposing a presenter is dropping its guards.

pub mod list;
pub mod observable;

pub use list::ObservableList;
pub use observable::{Observable, Subscription};
