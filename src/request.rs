//! Per-lookup state machine.
//!
//! A request is one in-flight slot under the parallelism cap. It pulls a
//! name from the queue, submits it, and when the channel calls back it
//! reports the outcome and pulls the next name into the same slot,
//! recycling instead of allocating per lookup. When the queue is empty
//! the request retires by dropping itself.

use std::net::IpAddr;
use std::rc::Rc;

use tracing::{trace, warn};

use crate::channel::Channel;
use crate::resolver::{Resolution, Shared};

pub(crate) struct Request<C: Channel + 'static> {
    shared: Rc<Shared<C>>,
    domain: String,
}

impl<C: Channel + 'static> Request<C> {
    pub(crate) fn new(shared: Rc<Shared<C>>) -> Self {
        Self {
            shared,
            domain: String::new(),
        }
    }

    /// Pull the next queued name and submit it to the channel.
    ///
    /// Returns `false` when the queue yields nothing; the request retires
    /// (drops) and the caller knows not to keep spawning.
    pub(crate) fn lookup_next(mut self) -> bool {
        let next = self.shared.queue.borrow_mut().pop_next();
        let Some(name) = next else {
            return false;
        };

        self.domain = name;
        self.shared.in_flight.set(self.shared.in_flight.get() + 1);
        trace!(domain = %self.domain, in_flight = self.shared.in_flight.get(), "submitting lookup");

        let shared = Rc::clone(&self.shared);
        let name = self.domain.clone();
        let family = shared.family.get();
        shared
            .channel
            .submit(&name, family, Box::new(move |addresses| self.complete(addresses)));
        true
    }

    /// Completion path: report the outcome, free the slot, recycle.
    ///
    /// The handler runs before recycling, so it always observes exactly
    /// one finished domain at a time.
    fn complete(mut self, addresses: Option<Vec<IpAddr>>) {
        let domain = std::mem::take(&mut self.domain);
        let outcome = match addresses {
            Some(addresses) if !addresses.is_empty() => {
                trace!(domain = %domain, count = addresses.len(), "lookup resolved");
                Resolution::Resolved { domain, addresses }
            }
            _ => {
                warn!(domain = %domain, "lookup failed");
                Resolution::Failed { domain }
            }
        };

        (self.shared.handler.borrow_mut())(outcome);
        self.shared.in_flight.set(self.shared.in_flight.get() - 1);

        // Recycle this slot, or retire if the queue is empty.
        let _ = self.lookup_next();
    }
}
