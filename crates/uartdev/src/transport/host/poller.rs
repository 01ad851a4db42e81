// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Polling thread that stands in for the UART interrupt on hosts.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};
use uartdev_buffer::atomic::{AtomicBool, Ordering};

use super::{CharDevice, HostError, HostTransport};
use crate::channel::SerialChannel;

type HostChannel<D> = SerialChannel<HostTransport<D>>;

/// Runs the bottom half of a host channel on a dedicated thread.
///
/// Each tick, while any pseudo-interrupt bit is set, the bottom half is
/// invoked until it makes no more progress. Between ticks the thread sleeps
/// for the poll interval. Dropping the service stops the thread.
pub struct PollingService<D: CharDevice + 'static> {
    channel: Arc<HostChannel<D>>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl<D: CharDevice + 'static> PollingService<D> {
    /// Start polling `channel` every `interval`.
    pub fn spawn(channel: Arc<HostChannel<D>>, interval: Duration) -> Result<Self, HostError> {
        let stop = Arc::new(AtomicBool::new(false));

        let worker_channel = Arc::clone(&channel);
        let worker_stop = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("uartdev-poll".into())
            .spawn(move || poll(&worker_channel, &worker_stop, interval))
            .map_err(HostError::Spawn)?;

        debug!(interval_ms = interval.as_millis(), "polling service started");
        Ok(Self {
            channel,
            stop,
            handle: Some(handle),
        })
    }

    /// The polled channel.
    #[must_use]
    pub fn channel(&self) -> &Arc<HostChannel<D>> {
        &self.channel
    }

    /// Whether the polling thread is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the thread and hand the channel back.
    #[must_use]
    pub fn stop(mut self) -> Arc<HostChannel<D>> {
        self.shutdown();
        Arc::clone(&self.channel)
    }

    fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.stop.store(true, Ordering::Release);
        handle.thread().unpark();
        if handle.join().is_err() {
            warn!("polling thread panicked");
        }
        debug!("polling service stopped");
    }
}

impl<D: CharDevice + 'static> Drop for PollingService<D> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn poll<D: CharDevice>(channel: &HostChannel<D>, stop: &AtomicBool, interval: Duration) {
    while !stop.load(Ordering::Acquire) {
        if channel.transport().interrupt().is_pending() {
            loop {
                let serviced = channel.bottom_half();
                if serviced.received == 0 && serviced.transmitted == 0 {
                    break;
                }
                if stop.load(Ordering::Acquire) {
                    return;
                }
            }
        }
        thread::park_timeout(interval);
    }
}
