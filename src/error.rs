//! Error taxonomy for the resolver.

use std::io;

use thiserror::Error;

/// Errors surfaced by the resolver's own API.
///
/// A failed lookup is not an error: it is a normal outcome, reported once
/// through the completion handler as [`Resolution::Failed`] and never
/// retried.
///
/// [`Resolution::Failed`]: crate::resolver::Resolution::Failed
#[derive(Debug, Error)]
pub enum ResolveError {
    /// An empty domain name was passed to `enqueue`.
    #[error("domain name must not be empty")]
    EmptyDomain,

    /// `configure` was called with a parallelism of zero.
    #[error("parallelism must be at least 1")]
    ZeroParallelism,

    /// The resolution backend failed. Fatal to the run; no partial
    /// progress recovery is attempted.
    #[error("resolution channel failure: {0}")]
    Channel(#[from] io::Error),
}
