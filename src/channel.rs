//! Contract for the non-blocking name-resolution backend.
//!
//! The resolver never speaks DNS itself. It hands names to a [`Channel`]
//! and gets called back with addresses once the backend's own retry and
//! timeout machinery is done with them. The channel exposes the classic
//! select-style surface: the descriptors it wants watched, how long the
//! caller may sleep, and a `process` entry point that fires due callbacks.

use std::io;
use std::net::IpAddr;
use std::os::fd::RawFd;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::Duration;

/// Address family requested for a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    V4,
    V6,
}

/// Completion handle for one in-flight lookup.
///
/// The backend invokes it exactly once, from inside [`Channel::process`],
/// with the resolved addresses or `None` on failure. Every failure mode
/// (NXDOMAIN, timeout, network error) collapses into `None`; an empty
/// address list counts as a failure too.
pub type Completion = Box<dyn FnOnce(Option<Vec<IpAddr>>)>;

/// Descriptors the backend wants monitored for readiness.
#[derive(Debug, Default, Clone)]
pub struct FdSet {
    pub read: Vec<RawFd>,
    pub write: Vec<RawFd>,
}

impl FdSet {
    pub fn is_empty(&self) -> bool {
        self.read.is_empty() && self.write.is_empty()
    }
}

/// Descriptors observed ready in one poll iteration.
///
/// May be empty: a timeout-only wakeup still calls [`Channel::process`]
/// so the backend can run its internal timers.
#[derive(Debug, Default, Clone)]
pub struct ReadyFds {
    pub read: Vec<RawFd>,
    pub write: Vec<RawFd>,
}

/// A non-blocking resolution backend.
///
/// Methods take `&self`: `process` fires completions that may reentrantly
/// call `submit` when a finished lookup picks up its next name, so
/// implementations own their interior mutability and must not hold a
/// borrow across a completion call.
pub trait Channel {
    /// Start an asynchronous lookup. The completion is invoked from a
    /// later `process` call, never from inside `submit`.
    fn submit(&self, name: &str, family: AddressFamily, completion: Completion);

    /// How long the caller may sleep before the backend needs a chance
    /// to run its timers. `None` when no timer is pending.
    fn timeout(&self) -> Option<Duration>;

    /// The descriptor sets to watch. Empty sets together with a `None`
    /// timeout mean the backend has nothing outstanding.
    ///
    /// A failure here is fatal to the run; it is never retried.
    fn descriptors(&self) -> io::Result<FdSet>;

    /// Handle the descriptors observed ready, synchronously firing zero
    /// or more due completions.
    fn process(&self, ready: &ReadyFds);
}

impl<C: Channel + ?Sized> Channel for Rc<C> {
    fn submit(&self, name: &str, family: AddressFamily, completion: Completion) {
        (**self).submit(name, family, completion)
    }

    fn timeout(&self) -> Option<Duration> {
        (**self).timeout()
    }

    fn descriptors(&self) -> io::Result<FdSet> {
        (**self).descriptors()
    }

    fn process(&self, ready: &ReadyFds) {
        (**self).process(ready)
    }
}

/// Process-wide init/teardown slot for a backend library.
///
/// c-ares style backends want a `library_init` before the first channel
/// and a `library_cleanup` after the last one. A channel implementation
/// declares one static slot and holds a [`BackendGuard`] for its whole
/// lifetime; the first live guard runs `init`, the last one dropped runs
/// `cleanup`, so several resolvers can coexist in one process.
pub struct BackendSlot {
    refs: Mutex<usize>,
    init: fn() -> io::Result<()>,
    cleanup: fn(),
}

impl BackendSlot {
    pub const fn new(init: fn() -> io::Result<()>, cleanup: fn()) -> Self {
        Self {
            refs: Mutex::new(0),
            init,
            cleanup,
        }
    }

    /// Take a reference on the backend, initializing it if this is the
    /// first live guard.
    pub fn acquire(&'static self) -> io::Result<BackendGuard> {
        let mut refs = self
            .refs
            .lock()
            .map_err(|_| io::Error::other("backend slot poisoned"))?;
        if *refs == 0 {
            (self.init)()?;
        }
        *refs += 1;
        Ok(BackendGuard { slot: self })
    }
}

/// Scoped reference to a [`BackendSlot`].
pub struct BackendGuard {
    slot: &'static BackendSlot,
}

impl Drop for BackendGuard {
    fn drop(&mut self) {
        let Ok(mut refs) = self.slot.refs.lock() else {
            return;
        };
        *refs -= 1;
        if *refs == 0 {
            (self.slot.cleanup)();
        }
    }
}
