//! Readiness wait for the channel's descriptor sets.
//!
//! This is the select() of the poll loop: register the channel's
//! descriptors with the runtime, wait for the first one to become ready
//! or for the channel's timeout to expire, and report what woke us.
//! Registrations live for one wait only; the channel's descriptor sets
//! can change between iterations.

use std::io;
use std::os::fd::{AsRawFd, RawFd};
use std::time::Duration;

use futures::future::select_all;
use tokio::io::Interest;
use tokio::io::unix::AsyncFd;

use crate::channel::{FdSet, ReadyFds};

/// Borrowed descriptor; the channel keeps ownership of the fd itself.
struct Fd(RawFd);

impl AsRawFd for Fd {
    fn as_raw_fd(&self) -> RawFd {
        self.0
    }
}

/// Wait until one of `fds` is ready or `timeout` expires.
///
/// An empty result means the timeout won; the caller still hands it to
/// the channel so backend timers get to run. Registration failures are
/// fatal, matching the rest of the channel error policy.
pub(crate) async fn wait_ready(fds: &FdSet, timeout: Option<Duration>) -> io::Result<ReadyFds> {
    let mut ready = ReadyFds::default();

    // One watcher per descriptor; a descriptor in both sets gets a
    // single registration with combined interest.
    let mut plan: Vec<(RawFd, Interest)> = Vec::with_capacity(fds.read.len() + fds.write.len());
    for &fd in &fds.read {
        plan.push((fd, Interest::READABLE));
    }
    for &fd in &fds.write {
        match plan.iter_mut().find(|(watched, _)| *watched == fd) {
            Some(entry) => entry.1 = entry.1 | Interest::WRITABLE,
            None => plan.push((fd, Interest::WRITABLE)),
        }
    }

    if plan.is_empty() {
        if let Some(timeout) = timeout {
            tokio::time::sleep(timeout).await;
        }
        return Ok(ready);
    }

    let watchers = plan
        .into_iter()
        .map(|(fd, interest)| Ok((fd, interest, AsyncFd::with_interest(Fd(fd), interest)?)))
        .collect::<io::Result<Vec<_>>>()?;

    let waits: Vec<_> = watchers
        .iter()
        .map(|(fd, interest, watcher)| {
            let (fd, interest) = (*fd, *interest);
            Box::pin(async move {
                let guard = watcher.ready(interest).await?;
                let readiness = guard.ready();
                io::Result::Ok((fd, readiness.is_readable(), readiness.is_writable()))
            })
        })
        .collect();
    let first_ready = select_all(waits);

    let woke = match timeout {
        Some(timeout) => {
            tokio::select! {
                (result, _, _) = first_ready => Some(result?),
                _ = tokio::time::sleep(timeout) => None,
            }
        }
        None => {
            let (result, _, _) = first_ready.await;
            Some(result?)
        }
    };

    if let Some((fd, readable, writable)) = woke {
        if readable {
            ready.read.push(fd);
        }
        if writable {
            ready.write.push(fd);
        }
    }

    Ok(ready)
}
