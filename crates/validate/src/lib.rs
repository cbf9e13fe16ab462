//! Form revalidation.
//!
//! A [`ValidationScheduler`] owns the revalidation state of one form. Each
//! trigger ([`ValidationScheduler::validate`], or a field event once
//! [`started`](ValidationScheduler::start)) is turned into solutions by the
//! [`SolutionResolver`], queued, debounced, batched with compatible
//! solutions and rendered through a [`RenderPipeline`] with options merged
//! by the [`OptionsMerger`].

mod config;
mod error;
mod merge;
pub mod protocol;
mod queue;
mod render;
mod resolver;
mod scheduler;
mod solution;

pub use config::{ConfigError, ValidateConfig};
pub use error::{Result, ValidateError, mute_uncritical_rejection};
pub use merge::OptionsMerger;
pub use queue::DirtyQueue;
pub use render::{GuardEvent, RenderError, RenderOptions, RenderPipeline, RenderResult, VALIDATE_EVENT};
pub use resolver::SolutionResolver;
pub use scheduler::{SchedulerPhase, ValidationScheduler};
pub use solution::{Deferred, Solution, SolutionOptions, ValidateOptions, ValidationHandle, ValidationOutcome};
