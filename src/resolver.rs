//! Resolver orchestration and the cooperative poll loop.
//!
//! The resolver owns a work queue of names and drives up to `parallelism`
//! lookups through a [`Channel`] at a time. One logical thread does all
//! the work: the only suspension point is the readiness/timeout wait in
//! the middle of [`Resolver::run_one_poll`], so the queue and the
//! in-flight counter need no locks, just a shared single-threaded core.

use std::cell::{Cell, RefCell};
use std::net::IpAddr;
use std::rc::Rc;

use tracing::{debug, error};

use crate::channel::{AddressFamily, Channel};
use crate::error::ResolveError;
use crate::poll;
use crate::queue::WorkQueue;
use crate::request::Request;

/// Concurrency cap used until `configure` says otherwise.
pub const DEFAULT_PARALLELISM: usize = 10;

/// Outcome of one lookup, handed to the completion handler exactly once
/// per submitted name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The name resolved; `addresses` is non-empty and keeps the
    /// backend's order.
    Resolved {
        domain: String,
        addresses: Vec<IpAddr>,
    },
    /// The lookup failed. NXDOMAIN, timeout, and network errors all land
    /// here; none of them is retried.
    Failed { domain: String },
}

impl Resolution {
    pub fn domain(&self) -> &str {
        match self {
            Resolution::Resolved { domain, .. } => domain,
            Resolution::Failed { domain } => domain,
        }
    }
}

/// Per-completion callback.
pub type Handler = Box<dyn FnMut(Resolution)>;

/// State shared between the resolver and its in-flight requests.
///
/// Everything here is touched only from the single control thread;
/// `RefCell` and `Cell` give the interior mutability the synchronous
/// completion callbacks need.
pub(crate) struct Shared<C> {
    pub(crate) channel: C,
    pub(crate) queue: RefCell<WorkQueue>,
    pub(crate) in_flight: Cell<usize>,
    pub(crate) family: Cell<AddressFamily>,
    pub(crate) handler: RefCell<Handler>,
}

/// Bounded-concurrency resolver over a pluggable channel.
pub struct Resolver<C: Channel + 'static> {
    shared: Rc<Shared<C>>,
    parallelism: usize,
}

impl<C: Channel + 'static> Resolver<C> {
    /// Create a resolver over `channel` with [`DEFAULT_PARALLELISM`] and
    /// a handler that discards outcomes.
    pub fn new(channel: C) -> Self {
        Self {
            shared: Rc::new(Shared {
                channel,
                queue: RefCell::new(WorkQueue::new()),
                in_flight: Cell::new(0),
                family: Cell::new(AddressFamily::V4),
                handler: RefCell::new(Box::new(|_| {})),
            }),
            parallelism: DEFAULT_PARALLELISM,
        }
    }

    /// Set the concurrency cap and the per-completion handler.
    pub fn configure(
        &mut self,
        parallelism: usize,
        handler: impl FnMut(Resolution) + 'static,
    ) -> Result<(), ResolveError> {
        if parallelism == 0 {
            return Err(ResolveError::ZeroParallelism);
        }
        self.parallelism = parallelism;
        *self.shared.handler.borrow_mut() = Box::new(handler);
        Ok(())
    }

    /// Address family requested for every lookup. Defaults to IPv4.
    pub fn set_family(&self, family: AddressFamily) {
        self.shared.family.set(family);
    }

    /// Queue a name for resolution. Empty names are rejected.
    pub fn enqueue(&self, name: &str) -> Result<(), ResolveError> {
        if name.is_empty() {
            return Err(ResolveError::EmptyDomain);
        }
        self.shared.queue.borrow_mut().push(name);
        Ok(())
    }

    /// Remove the first queued occurrence of `name`. Has no effect on a
    /// lookup already in flight; cancellation is queue-only.
    pub fn cancel(&self, name: &str) -> bool {
        self.shared.queue.borrow_mut().cancel(name)
    }

    /// Sort the queue. Must happen before resolution starts.
    pub fn sort(&self) {
        self.shared.queue.borrow_mut().sort();
    }

    /// Drop adjacent duplicate names. Callers that want duplicates
    /// resolved twice simply skip this.
    pub fn dedup(&self) {
        self.shared.queue.borrow_mut().dedup();
    }

    /// Number of lookups currently submitted and not yet completed.
    /// Never exceeds the configured parallelism.
    pub fn in_flight(&self) -> usize {
        self.shared.in_flight.get()
    }

    /// Number of names still waiting in the queue.
    pub fn queued(&self) -> usize {
        self.shared.queue.borrow().len()
    }

    /// One cooperative step of the event loop.
    ///
    /// Admits requests up to the cap, asks the channel what to watch,
    /// waits for readiness or timeout (the single `.await`), then lets
    /// the channel fire whatever completions are due. Returns `false`
    /// once the channel has nothing outstanding, which together with the
    /// admission pass means the queue is empty and no lookup is in
    /// flight.
    pub async fn run_one_poll(&mut self) -> Result<bool, ResolveError> {
        self.admit();

        let fds = match self.shared.channel.descriptors() {
            Ok(fds) => fds,
            Err(err) => {
                error!(%err, "channel readiness query failed");
                return Err(err.into());
            }
        };
        let timeout = self.shared.channel.timeout();

        if fds.is_empty() && timeout.is_none() {
            return Ok(false);
        }

        let ready = poll::wait_ready(&fds, timeout).await?;
        self.shared.channel.process(&ready);

        Ok(true)
    }

    /// Drive [`run_one_poll`] until nothing is left to do.
    ///
    /// [`run_one_poll`]: Resolver::run_one_poll
    pub async fn run_event_loop(&mut self) -> Result<(), ResolveError> {
        while self.run_one_poll().await? {}
        debug!("event loop drained");
        Ok(())
    }

    /// Start new requests while there is both queued work and headroom
    /// under the cap.
    fn admit(&self) {
        while self.shared.in_flight.get() < self.parallelism
            && !self.shared.queue.borrow().is_empty()
        {
            let request = Request::new(Rc::clone(&self.shared));
            if !request.lookup_next() {
                // Queue drained between the check and the pop; benign.
                break;
            }
        }
    }
}
