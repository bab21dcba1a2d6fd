//! Real-time driver
//!
//! Calls [`Session::tick`] from a tokio interval. Rendering, if any, happens
//! in the callback and only reads the session.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::session::Session;
use crate::types::ClockEvent;

/// Tick `session` every `interval` until `max_ticks` ticks have run or
/// `on_tick` breaks. Missed ticks are skipped rather than bunched up.
///
/// Returns the number of ticks run.
pub async fn drive<F>(session: &mut Session, interval: Duration, max_ticks: u64, mut on_tick: F) -> u64
where
    F: FnMut(&Session, &[ClockEvent]) -> ControlFlow<()>,
{
    info!(interval_ms = interval.as_millis() as u64, max_ticks, "Driver started");

    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick of an interval completes immediately
    ticker.tick().await;

    let mut ran = 0;
    while ran < max_ticks {
        ticker.tick().await;
        let events = session.tick();
        ran += 1;

        if on_tick(session, &events).is_break() {
            debug!(ticks = ran, "Driver stopped by callback");
            break;
        }
    }

    info!(ticks = ran, "Driver finished");
    ran
}

#[cfg(test)]
mod tests {
    use lanlab_core::{DeviceType, DeviceUpdate, Position};
    use tokio::time::Instant;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_runs_requested_ticks() {
        let mut session = Session::default();
        let interval = Duration::from_millis(16);
        let start = Instant::now();

        let ran = drive(&mut session, interval, 10, |_, _| ControlFlow::Continue(())).await;

        assert_eq!(ran, 10);
        assert_eq!(session.clock().tick(), 10);
        assert!(start.elapsed() >= interval * 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_callback_can_stop_on_arrival() {
        let mut session = Session::default();
        let pc = session.place_device(DeviceType::Pc, Position::default());
        let router = session.place_device(DeviceType::Router, Position::default());
        session.edit_device(pc, DeviceUpdate::ip("192.168.1.2"));
        session.edit_device(router, DeviceUpdate::ip("192.168.1.1"));
        session.begin_connect();
        session.click_device(pc);
        session.click_device(router);
        session.request_ping(pc, router).unwrap();

        let ran = drive(&mut session, Duration::from_millis(16), 1_000, |_, events| {
            if events.iter().any(|e| matches!(e, ClockEvent::Arrived { .. })) {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .await;

        assert_eq!(ran, 50);
        assert!(session.flags().ping_success);
    }
}
