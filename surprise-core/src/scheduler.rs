//! Cancellable cue timers.
//!
//! Every scheduled cue is its own tokio task that sleeps and then sends a
//! [`CueEvent`] tagged with the scene epoch that scheduled it. Leaving a
//! scene aborts whatever is still sleeping; receivers also drop events
//! whose epoch no longer matches, which covers cues that were already
//! sent when the scene changed.
//!
//! Cues whose scaled delay is zero are sent on the spot, in offset order,
//! so they arrive in timeline order on any runtime flavor.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::timeline::{Cue, ScheduledCue};

/// A cue that has fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CueEvent {
    /// Epoch of the scene that scheduled the cue.
    pub epoch: u64,
    pub cue: Cue,
}

/// Runs cue timers and delivers fired cues over a channel.
#[derive(Debug)]
pub struct CueScheduler {
    tx: mpsc::UnboundedSender<CueEvent>,
    pending: Vec<JoinHandle<()>>,
    time_scale: f64,
}

impl CueScheduler {
    /// Create a scheduler and the receiver its cues arrive on.
    ///
    /// Every delay is multiplied by `time_scale`; `0.0` fires cues
    /// immediately. Negative or non-finite scales are treated as `0.0`.
    pub fn new(time_scale: f64) -> (Self, mpsc::UnboundedReceiver<CueEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let time_scale = if time_scale.is_finite() && time_scale > 0.0 {
            time_scale
        } else {
            0.0
        };
        (
            Self {
                tx,
                pending: Vec::new(),
                time_scale,
            },
            rx,
        )
    }

    /// Start timers for `cues` on behalf of the scene at `epoch`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self, epoch: u64, cues: impl IntoIterator<Item = ScheduledCue>) {
        self.pending.retain(|handle| !handle.is_finished());

        let mut cues: Vec<ScheduledCue> = cues.into_iter().collect();
        // Stable, so cues sharing an offset keep their timeline order.
        cues.sort_by_key(|scheduled| scheduled.after);

        for scheduled in cues {
            let delay = self.scaled(scheduled.after);
            let event = CueEvent {
                epoch,
                cue: scheduled.cue,
            };
            debug!(epoch, cue = ?scheduled.cue, ?delay, "scheduling cue");

            // The receiver only goes away with the session.
            if delay.is_zero() {
                let _ = self.tx.send(event);
                continue;
            }
            let tx = self.tx.clone();
            self.pending.push(tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = tx.send(event);
            }));
        }
    }

    /// `after` multiplied by the time scale, saturating instead of overflowing.
    fn scaled(&self, after: Duration) -> Duration {
        Duration::try_from_secs_f64(after.as_secs_f64() * self.time_scale).unwrap_or(Duration::MAX)
    }

    /// Abort every timer that has not fired yet. Returns how many were aborted.
    pub fn cancel_all(&mut self) -> usize {
        let mut cancelled = 0;
        for handle in self.pending.drain(..) {
            if !handle.is_finished() {
                handle.abort();
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            debug!(cancelled, "cancelled pending cues");
        }
        cancelled
    }

    /// Timers that have not fired yet.
    pub fn pending(&self) -> usize {
        self.pending.iter().filter(|h| !h.is_finished()).count()
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }
}

impl Drop for CueScheduler {
    fn drop(&mut self) {
        for handle in &self.pending {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneId;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_cues_fire_in_order() {
        let (mut scheduler, mut rx) = CueScheduler::new(1.0);
        scheduler.schedule(
            3,
            [
                ScheduledCue::new(Duration::from_millis(500), Cue::RevealPhotoError),
                ScheduledCue::new(Duration::from_millis(100), Cue::DropPhoto { index: 1 }),
            ],
        );

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(
            first,
            CueEvent {
                epoch: 3,
                cue: Cue::DropPhoto { index: 1 }
            }
        );
        assert_eq!(second.cue, Cue::RevealPhotoError);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_stops_pending_cues() {
        let (mut scheduler, mut rx) = CueScheduler::new(1.0);
        scheduler.schedule(
            1,
            [
                ScheduledCue::new(Duration::from_secs(1), Cue::RevealLoadError),
                ScheduledCue::new(Duration::from_secs(5), Cue::Advance(SceneId::IsItOver)),
            ],
        );
        assert_eq!(scheduler.pending(), 2);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(rx.recv().await.unwrap().cue, Cue::RevealLoadError);

        assert_eq!(scheduler.cancel_all(), 1);
        assert_eq!(scheduler.pending(), 0);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_time_scale_shrinks_delays() {
        let (mut scheduler, mut rx) = CueScheduler::new(0.5);
        scheduler.schedule(
            0,
            [ScheduledCue::new(Duration::from_secs(4), Cue::RevealLoadError)],
        );

        tokio::time::sleep(Duration::from_millis(1900)).await;
        assert!(rx.try_recv().is_err());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(rx.try_recv().unwrap().cue, Cue::RevealLoadError);
    }

    #[tokio::test]
    async fn test_zero_scale_fires_immediately() {
        let (mut scheduler, mut rx) = CueScheduler::new(0.0);
        scheduler.schedule(
            0,
            [ScheduledCue::new(Duration::from_secs(3600), Cue::RevealLoadError)],
        );
        assert_eq!(rx.recv().await.unwrap().cue, Cue::RevealLoadError);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_zero_scale_keeps_timeline_order_across_workers() {
        for _ in 0..50 {
            let (mut scheduler, mut rx) = CueScheduler::new(0.0);
            scheduler.schedule(
                0,
                [
                    ScheduledCue::new(Duration::from_secs(9), Cue::Advance(SceneId::IsItOver)),
                    ScheduledCue::new(Duration::from_secs(1), Cue::DropPhoto { index: 1 }),
                    ScheduledCue::new(Duration::from_secs(2), Cue::DropPhoto { index: 2 }),
                    ScheduledCue::new(Duration::from_secs(3), Cue::DropPhoto { index: 3 }),
                ],
            );
            assert_eq!(scheduler.pending(), 0);

            let mut order = Vec::new();
            while let Ok(event) = rx.try_recv() {
                order.push(event.cue);
            }
            assert_eq!(
                order,
                vec![
                    Cue::DropPhoto { index: 1 },
                    Cue::DropPhoto { index: 2 },
                    Cue::DropPhoto { index: 3 },
                    Cue::Advance(SceneId::IsItOver),
                ]
            );
        }
    }

    #[tokio::test]
    async fn test_huge_scale_saturates() {
        let (mut scheduler, mut rx) = CueScheduler::new(1e300);
        scheduler.schedule(
            0,
            [ScheduledCue::new(Duration::from_secs(2), Cue::RevealLoadError)],
        );
        assert_eq!(scheduler.pending(), 1);
        assert!(rx.try_recv().is_err());
        assert_eq!(scheduler.cancel_all(), 1);
    }

    #[test]
    fn test_invalid_scale_is_clamped() {
        assert_eq!(CueScheduler::new(-1.0).0.time_scale(), 0.0);
        assert_eq!(CueScheduler::new(f64::NAN).0.time_scale(), 0.0);
    }
}
