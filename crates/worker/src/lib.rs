//! Task primitives shared by the revalidation crates.
//!
//! * [`spawn`]: spawns a task on the current tokio runtime, tagged with a
//!   [`TaskClass`] for observability.
//! * [`DebounceTimer`]: a re-armable one-shot timer whose arms carry a
//!   generation and a cancellation token, so stale fires can recognize
//!   themselves.

mod class;
mod debounce;
mod spawn;

pub use class::TaskClass;
pub use debounce::DebounceTimer;
pub use spawn::spawn;
