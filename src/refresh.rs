//! Periodic full reload, independent of the simulation.

use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::error::RefreshError;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30 * 60);
const MIN_INTERVAL: Duration = Duration::from_nanos(1);

pub trait Reload {
    fn can_reload(&self) -> bool;
    fn reload(&self);
}

pub trait Scheduler {
    type Handle;

    fn schedule_repeating(&mut self, interval: Duration, task: Box<dyn FnMut()>) -> Self::Handle;
}

/// Schedules `target.reload()` every `interval` and returns the scheduler's handle untouched.
pub fn setup_auto_refresh<R, S>(
    target: &R,
    interval: Duration,
    scheduler: &mut S,
) -> Result<S::Handle, RefreshError>
where
    R: Reload + Clone + 'static,
    S: Scheduler,
{
    if !target.can_reload() {
        return Err(RefreshError::TargetUnavailable);
    }
    if interval.is_zero() {
        return Err(RefreshError::ZeroInterval);
    }
    let target = target.clone();
    Ok(scheduler.schedule_repeating(interval, Box::new(move || target.reload())))
}

/// Owner side of a reload request. The host polls it once per frame.
#[derive(Debug, Default)]
pub struct ReloadSignal {
    pending: Rc<Cell<bool>>,
}

impl ReloadSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> ReloadHandle {
        ReloadHandle {
            pending: Rc::downgrade(&self.pending),
        }
    }

    pub fn take(&self) -> bool {
        self.pending.replace(false)
    }
}

/// Reload target handed to schedulers. Dead once its signal is dropped.
#[derive(Debug, Clone)]
pub struct ReloadHandle {
    pending: Weak<Cell<bool>>,
}

impl Reload for ReloadHandle {
    fn can_reload(&self) -> bool {
        self.pending.strong_count() > 0
    }

    fn reload(&self) {
        if let Some(pending) = self.pending.upgrade() {
            pending.set(true);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

struct Timer {
    id: TimerId,
    interval: Duration,
    next_due: Duration,
    task: Box<dyn FnMut()>,
}

/// A polled scheduler driven by the host's elapsed wall time.
#[derive(Default)]
pub struct IntervalTimers {
    timers: Vec<Timer>,
    next_id: u64,
}

impl IntervalTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn cancel(&mut self, id: TimerId) {
        self.timers.retain(|timer| timer.id != id);
    }

    /// Runs every task whose deadline is at or before `elapsed`. Returns how many fired.
    pub fn fire_due(&mut self, elapsed: Duration) -> usize {
        let mut fired = 0;
        for timer in self.timers.iter_mut() {
            if elapsed >= timer.next_due {
                (timer.task)();
                fired += 1;
                // skip every deadline missed during a stall in one step
                let interval = timer.interval.as_nanos();
                let missed = (elapsed - timer.next_due).as_nanos() / interval + 1;
                timer.next_due += Duration::from_nanos((missed * interval) as u64);
            }
        }
        fired
    }
}

impl Scheduler for IntervalTimers {
    type Handle = TimerId;

    fn schedule_repeating(&mut self, interval: Duration, task: Box<dyn FnMut()>) -> TimerId {
        let interval = interval.max(MIN_INTERVAL);
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            interval,
            next_due: interval,
            task,
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct CountingTarget {
        reloads: Rc<Cell<u32>>,
    }

    impl Reload for CountingTarget {
        fn can_reload(&self) -> bool {
            true
        }

        fn reload(&self) {
            self.reloads.set(self.reloads.get() + 1);
        }
    }

    #[derive(Default)]
    struct FakeScheduler {
        task: Option<Box<dyn FnMut()>>,
        delay: Option<Duration>,
    }

    impl Scheduler for FakeScheduler {
        type Handle = u32;

        fn schedule_repeating(&mut self, interval: Duration, task: Box<dyn FnMut()>) -> u32 {
            self.delay = Some(interval);
            self.task = Some(task);
            1234
        }
    }

    #[test]
    fn schedules_reload_and_returns_handle() {
        let target = CountingTarget {
            reloads: Rc::new(Cell::new(0)),
        };
        let mut scheduler = FakeScheduler::default();
        let handle =
            setup_auto_refresh(&target, Duration::from_millis(1000), &mut scheduler).unwrap();

        assert_eq!(handle, 1234);
        assert_eq!(scheduler.delay, Some(Duration::from_millis(1000)));
        let mut task = scheduler.task.take().expect("scheduler should receive a task");
        task();
        assert_eq!(target.reloads.get(), 1);
    }

    #[test]
    fn dropped_signal_fails_fast() {
        let handle = ReloadSignal::new().handle();
        let mut scheduler = FakeScheduler::default();
        let err = setup_auto_refresh(&handle, DEFAULT_REFRESH_INTERVAL, &mut scheduler).unwrap_err();
        assert_eq!(err, RefreshError::TargetUnavailable);
        assert!(scheduler.task.is_none());
    }

    #[test]
    fn zero_interval_fails_fast() {
        let signal = ReloadSignal::new();
        let mut scheduler = FakeScheduler::default();
        let err = setup_auto_refresh(&signal.handle(), Duration::ZERO, &mut scheduler).unwrap_err();
        assert_eq!(err, RefreshError::ZeroInterval);
    }

    #[test]
    fn interval_timers_drive_the_signal() {
        let signal = ReloadSignal::new();
        let mut timers = IntervalTimers::new();
        let id = setup_auto_refresh(&signal.handle(), Duration::from_secs(10), &mut timers).unwrap();

        assert_eq!(timers.fire_due(Duration::from_secs(9)), 0);
        assert!(!signal.take());
        assert_eq!(timers.fire_due(Duration::from_secs(10)), 1);
        assert!(signal.take());
        assert!(!signal.take());

        // a long stall fires once, not once per missed interval
        assert_eq!(timers.fire_due(Duration::from_secs(45)), 1);
        assert_eq!(timers.fire_due(Duration::from_secs(49)), 0);
        assert_eq!(timers.fire_due(Duration::from_secs(50)), 1);

        timers.cancel(id);
        assert!(timers.is_empty());
        assert_eq!(timers.fire_due(Duration::from_secs(100)), 0);
    }

    #[test]
    fn zero_interval_timer_fires_once_per_poll() {
        let signal = ReloadSignal::new();
        let handle = signal.handle();
        let mut timers = IntervalTimers::new();
        timers.schedule_repeating(Duration::ZERO, Box::new(move || handle.reload()));

        assert_eq!(timers.fire_due(Duration::from_secs(1)), 1);
        assert!(signal.take());
        assert_eq!(timers.fire_due(Duration::from_secs(1)), 0);
        assert_eq!(timers.fire_due(Duration::from_secs(3600)), 1);
    }
}
