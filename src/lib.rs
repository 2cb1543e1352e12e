//! # Resultflow
//!
//! Branch-aware outcomes that carry metadata through a pipeline.
//!
//! An [`Outcome<S, F>`](Outcome) is either a success holding `S` or a failure
//! holding `F`, always paired with a [`Meta`] bag. Around it the crate offers:
//!
//! - **Chaining**: [`Outcome::then`] and [`Outcome::otherwise`] run steps on
//!   one branch, trapping raised errors into failures; [`Pipeline`] fuses a
//!   list of steps into one
//! - **Retrying**: [`retry::Retry`] with fixed or exponential delay, jitter,
//!   a continue predicate and an `on_retry` hook
//! - **Batching**: [`batch`] maps a function over keyed items per item,
//!   fail-fast or collecting every error
//! - **Resources**: [`bracket::bracket`] acquires, uses and always releases
//! - **Diagnostics**: [`Outcome::to_debug_view`] with sensitive-key redaction
//!   and string truncation via [`sanitize::Sanitizer`]
//!
//! ## Quick Example
//!
//! ```rust
//! use resultflow::{meta, Outcome, StepOutput};
//!
//! #[derive(Debug)]
//! struct Order { qty: u32, unit_cents: u32 }
//!
//! fn validate(order: Order, _meta: &resultflow::Meta) -> Result<StepOutput<Order, String>, String> {
//!     if order.qty == 0 {
//!         return Err("quantity must be positive".to_string());
//!     }
//!     Ok(StepOutput::Value(order))
//! }
//!
//! let total = Outcome::success_with(Order { qty: 3, unit_cents: 250 }, meta! { "request_id" => "r-42" })
//!     .then(validate)
//!     .then(|order, meta| Outcome::success_with(order.qty * order.unit_cents, meta.clone().with("priced", true)))
//!     .otherwise(|err, meta| Outcome::<u32, String>::failure_with(format!("checkout failed: {}", err), meta.clone()));
//!
//! assert_eq!(total.value(), Some(&750));
//! assert_eq!(total.meta().len(), 2);
//!
//! let rejected = Outcome::<_, String>::success(Order { qty: 0, unit_cents: 250 }).then(validate);
//! assert_eq!(rejected.meta().get("failed_step").and_then(|v| v.as_str()), Some("closure"));
//! ```
//!
//! ## Features
//!
//! - `tracing` (default): emit `tracing` events for trapped step errors,
//!   retries and failed resource release
//! - `serde`: serialize outcomes as `{ok, value, error, meta}` and load
//!   [`config::DebugConfig`] from any serde format
//! - `proptest`: `Arbitrary` for [`Outcome`]

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod batch;
pub mod bracket;
pub mod config;
pub mod debug;
pub mod error;
pub mod meta;
pub mod outcome;
pub mod pipeline;
pub mod retry;
pub mod sanitize;
pub mod step;
pub mod testing;

// Re-exports
pub use debug::{DebugView, ErrorMessage};
pub use error::{BoxError, FlowError};
pub use meta::{Key, Meta, Value};
pub use outcome::Outcome;
pub use pipeline::{Pipeline, FAILED_STEP_KEY};
pub use retry::{Retry, RetryEvent, RetryPolicy};
pub use step::{IntoStepOutput, Step, StepOutput, StepResult};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::batch::{map_all, map_collect_errors, map_items};
    pub use crate::bracket::bracket;
    pub use crate::config::DebugConfig;
    pub use crate::error::{BoxError, FlowError};
    pub use crate::meta::{Meta, Value};
    pub use crate::outcome::Outcome;
    pub use crate::pipeline::Pipeline;
    pub use crate::retry::Retry;
    pub use crate::step::{IntoStepOutput, Step, StepOutput};
}
