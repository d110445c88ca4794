// SPDX-License-Identifier: GPL-3.0-only

//! Haptic feedback per key press.
//!
//! Desktop hardware rarely vibrates, so the pulse is delegated to feedbackd
//! (`org.sigxcpu.Feedback`), which maps the `button-pressed` event to
//! whatever the device supports. A pulse never blocks the UI thread and never
//! reports failure.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::StreamExt;
use futures::channel::mpsc;

use crate::app_settings;

/// Feedback event name for a key press.
const KEY_PRESS_EVENT: &str = "button-pressed";

/// Lets feedbackd use the event's own duration.
const DEFAULT_TIMEOUT: i32 = -1;

/// Best-effort feedback for a key press.
pub trait Haptics {
    fn pulse(&self);
}

/// Haptics that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn pulse(&self) {}
}

/// Counts pulses. Useful wherever a caller needs to observe feedback.
#[derive(Debug, Clone, Default)]
pub struct CountingHaptics {
    count: Arc<AtomicUsize>,
}

impl CountingHaptics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Haptics for CountingHaptics {
    fn pulse(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// feedbackd
// ============================================================================

#[zbus::proxy(
    interface = "org.sigxcpu.Feedback",
    default_service = "org.sigxcpu.Feedback",
    default_path = "/org/sigxcpu/Feedback"
)]
trait Feedback {
    async fn trigger_feedback(
        &self,
        app_id: &str,
        event: &str,
        hints: HashMap<&str, zbus::zvariant::Value<'_>>,
        timeout: i32,
    ) -> zbus::Result<u32>;
}

/// Sends pulses to feedbackd from a dedicated worker thread.
///
/// Pulses are queued on an unbounded channel. The worker connects to
/// feedbackd when a pulse arrives and no proxy is held, and drops the proxy
/// after a failed call, so a feedbackd started after the keyboard is picked
/// up by the next pulse. Pulses that find no feedbackd are discarded.
#[derive(Debug, Clone)]
pub struct FeedbackdHaptics {
    tx: mpsc::UnboundedSender<()>,
}

impl FeedbackdHaptics {
    /// Starts the worker thread.
    #[must_use]
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded::<()>();

        let spawned = std::thread::Builder::new()
            .name("platanitos-haptics".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        tracing::warn!("Haptics disabled, no runtime: {}", e);
                        return;
                    }
                };
                runtime.block_on(run_worker(rx));
            });

        if let Err(e) = spawned {
            tracing::warn!("Haptics disabled, worker thread failed: {}", e);
        }

        Self { tx }
    }
}

impl Haptics for FeedbackdHaptics {
    fn pulse(&self) {
        if self.tx.unbounded_send(()).is_err() {
            tracing::debug!("Haptics worker gone, pulse dropped");
        }
    }
}

async fn run_worker(mut rx: mpsc::UnboundedReceiver<()>) {
    let mut proxy: Option<FeedbackProxy<'static>> = None;

    while rx.next().await.is_some() {
        if proxy.is_none() {
            proxy = match connect().await {
                Ok(connected) => Some(connected),
                Err(e) => {
                    tracing::debug!("feedbackd unavailable, pulse dropped: {}", e);
                    None
                }
            };
        }
        let Some(current) = proxy.as_ref() else {
            continue;
        };
        if let Err(e) = current
            .trigger_feedback(app_settings::APP_ID, KEY_PRESS_EVENT, HashMap::new(), DEFAULT_TIMEOUT)
            .await
        {
            tracing::debug!("Haptic pulse failed, reconnecting on the next one: {}", e);
            proxy = None;
        }
    }
}

async fn connect() -> zbus::Result<FeedbackProxy<'static>> {
    let connection = zbus::Connection::session().await?;
    FeedbackProxy::new(&connection).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting_haptics() {
        let haptics = CountingHaptics::new();
        let observer = haptics.clone();

        haptics.pulse();
        haptics.pulse();
        assert_eq!(observer.count(), 2);
    }

    /// Test: Pulses never fail, even without a session bus
    #[test]
    fn test_feedbackd_pulse_is_fire_and_forget() {
        let haptics = FeedbackdHaptics::spawn();
        for _ in 0..10 {
            haptics.pulse();
        }
    }

    /// Test: The worker survives pulses after a failed connection
    #[tokio::test]
    async fn test_worker_keeps_draining_without_feedbackd() {
        let (tx, rx) = mpsc::unbounded::<()>();
        for _ in 0..3 {
            tx.unbounded_send(()).unwrap();
        }
        drop(tx);

        // Returns once the channel closes, whether or not feedbackd answered.
        tokio::time::timeout(std::time::Duration::from_secs(30), run_worker(rx))
            .await
            .unwrap();
    }

    #[test]
    fn test_no_haptics() {
        NoHaptics.pulse();
    }
}
