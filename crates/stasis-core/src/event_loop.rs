//! # Event loop
//!
//! Everything in Stasis runs on one thread. The host owns an [`EventLoop`]
//! and pumps it; components only ever *queue* work on it:
//!
//! - [`EventLoop::next_tick`] defers a task to the next scheduling quantum
//!   (after the current callback has finished and the host has settled).
//! - [`EventLoop::set_timeout`] arms a one-shot timer that fires once the
//!   clock reaches its deadline. The returned [`TimerId`] can be cleared.
//!
//! ```rust
//! use stasis_core::*;
//! use std::{cell::Cell, rc::Rc, time::Duration};
//!
//! let clock = ManualClock::default();
//! let ev = EventLoop::with_manual_clock(clock.clone());
//! let fired = Rc::new(Cell::new(false));
//!
//! let f = fired.clone();
//! ev.set_timeout(Duration::from_millis(100), move || f.set(true));
//! ev.run_until_idle().unwrap();
//! assert!(!fired.get());
//!
//! ev.advance(Duration::from_millis(100)).unwrap();
//! assert!(fired.get());
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};
use web_time::{Duration, Instant};

use crate::clock::{Clock, ManualClock, SystemClock};
use crate::error::EventLoopError;

new_key_type! {
    pub struct TimerId;
}

type Task = Box<dyn FnOnce()>;

struct Timer {
    deadline: Instant,
    seq: u64,
    task: Task,
}

#[derive(Default)]
struct LoopInner {
    ticks: VecDeque<Task>,
    timers: SlotMap<TimerId, Timer>,
    next_seq: u64,
    running: bool,
}

#[derive(Clone)]
pub struct EventLoop {
    inner: Rc<RefCell<LoopInner>>,
    clock: Rc<dyn Clock>,
    manual: Option<ManualClock>,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLoop {
    /// Loop driven by wall-clock time.
    pub fn new() -> Self {
        Self::with_clock(Rc::new(SystemClock))
    }

    pub fn with_clock(clock: Rc<dyn Clock>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(LoopInner::default())),
            clock,
            manual: None,
        }
    }

    /// Loop whose time only moves through [`EventLoop::advance`] (or the
    /// clock handle itself).
    pub fn with_manual_clock(clock: ManualClock) -> Self {
        let mut ev = Self::with_clock(Rc::new(clock.clone()));
        ev.manual = Some(clock);
        ev
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn next_tick(&self, f: impl FnOnce() + 'static) {
        self.inner.borrow_mut().ticks.push_back(Box::new(f));
    }

    pub fn set_timeout(&self, delay: Duration, f: impl FnOnce() + 'static) -> TimerId {
        let deadline = self.clock.now() + delay;
        let mut inner = self.inner.borrow_mut();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.timers.insert(Timer {
            deadline,
            seq,
            task: Box::new(f),
        })
    }

    /// False if the timer already fired or was cleared before.
    pub fn clear_timeout(&self, id: TimerId) -> bool {
        self.inner.borrow_mut().timers.remove(id).is_some()
    }

    pub fn pending_ticks(&self) -> usize {
        self.inner.borrow().ticks.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    /// Drains queued ticks, then fires due timers by deadline (FIFO on ties),
    /// draining ticks again after each one. Returns how many callbacks ran.
    pub fn run_until_idle(&self) -> Result<usize, EventLoopError> {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.running {
                return Err(EventLoopError::AlreadyRunning);
            }
            inner.running = true;
        }
        let _running = RunningGuard(&self.inner);

        let mut ran = self.drain_ticks();
        while let Some(timer) = self.take_due_timer() {
            (timer.task)();
            ran += 1;
            ran += self.drain_ticks();
        }
        log::trace!("event loop idle after {ran} callbacks");
        Ok(ran)
    }

    /// Moves the manual clock forward, then runs everything that became due.
    pub fn advance(&self, by: Duration) -> Result<usize, EventLoopError> {
        match &self.manual {
            Some(clock) => clock.advance(by),
            None => log::warn!("EventLoop::advance on a loop without a manual clock"),
        }
        self.run_until_idle()
    }

    fn drain_ticks(&self) -> usize {
        let mut ran = 0;
        loop {
            let task = self.inner.borrow_mut().ticks.pop_front();
            match task {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }

    fn take_due_timer(&self) -> Option<Timer> {
        let now = self.clock.now();
        let mut inner = self.inner.borrow_mut();
        let id = inner
            .timers
            .iter()
            .filter(|(_, t)| t.deadline <= now)
            .min_by_key(|(_, t)| (t.deadline, t.seq))
            .map(|(id, _)| id)?;
        inner.timers.remove(id)
    }
}

struct RunningGuard<'a>(&'a RefCell<LoopInner>);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.borrow_mut().running = false;
    }
}
