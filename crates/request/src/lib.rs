//! Request lifecycle and outcome sharing.
//!
//! A [`Request`] moves from `new` through `loading` to one terminal state.
//! [`track`] lets a request mirror the outcome of an equivalent one already in
//! flight, and [`RequestCache`] finds such equivalents by method, URL, params
//! and target.

mod cache;
mod error;
mod request;
mod state;
mod track;

pub use cache::{CacheConfig, CacheKey, RequestCache};
pub use error::{RequestError, Result};
pub use request::{Request, RequestEvent, RequestId, RequestSpec, Response, Settlement};
pub use state::RequestState;
pub use track::track;
