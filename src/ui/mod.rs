//! Front-end state machines of the dashboard.
//!
//! Each machine is a plain value driven by explicit events and `Instant`s, so
//! the browser glue only forwards DOM events and timers. Nothing here performs
//! I/O itself; side effects go through small host traits.

pub mod debounce;
pub mod editor;
pub mod listing;
pub mod notifications;
pub mod session;
