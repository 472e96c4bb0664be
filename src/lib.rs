//! Corral - bounded-concurrency asynchronous name resolution.
//!
//! Feed an arbitrary number of domain names in, set a parallelism cap,
//! and get every outcome reported through a handler while never holding
//! more than `parallelism` lookups in flight. The wire-level DNS work is
//! delegated to a pluggable [`channel::Channel`] backend; this crate owns
//! the work queue, the admission policy, the per-lookup state machine,
//! and the cooperative poll loop that ties them together on a single
//! thread.

pub mod channel;
pub mod error;
pub mod queue;
pub mod resolver;

mod poll;
mod request;

pub use channel::{AddressFamily, BackendGuard, BackendSlot, Channel, Completion, FdSet, ReadyFds};
pub use error::ResolveError;
pub use resolver::{DEFAULT_PARALLELISM, Resolution, Resolver};
