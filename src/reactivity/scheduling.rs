// ============================================================================
// ripple-streams - Scheduler
// The single serializing delivery context ("the main context")
// ============================================================================
//
// Every UI-facing delivery crosses this boundary: `deliver_on` posts events
// to the FIFO queue, debounce and the mocked services arm timers on the
// timer heap. The queue is drained cooperatively by whoever owns the loop
// (the UI shell, or a test), never by a background thread, so all
// UI-observable state is written from exactly one context.
//
// The clock is virtual: `advance` moves it forward and fires due timers in
// deadline order, draining the queue after each so deliveries interleave in
// time order. Suspension points are scheduled callbacks, never blocking
// waits.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use tracing::trace;

use crate::core::constants::MAX_DRAIN_COUNT;

type Task = Box<dyn FnOnce()>;

// =============================================================================
// TIMER ENTRIES
// =============================================================================

struct TimerEntry {
    deadline: Duration,
    seq: u64,
    cancelled: Rc<Cell<bool>>,
    task: Task,
}

// Min-ordering by (deadline, seq): BinaryHeap is a max-heap, so compare
// reversed. Ties fire in submission order.
impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Eq for TimerEntry {}

/// Cancellation handle for a scheduled timer.
///
/// Cancelling marks the heap entry dead; it is discarded, unexecuted, when
/// its deadline comes up. Cancelling an already-fired timer is a no-op.
pub struct TimerHandle {
    cancelled: Rc<Cell<bool>>,
}

impl TimerHandle {
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

// =============================================================================
// SCHEDULER
// =============================================================================

struct SchedulerCore {
    now: Cell<Duration>,
    queue: RefCell<VecDeque<Task>>,
    timers: RefCell<BinaryHeap<TimerEntry>>,
    next_seq: Cell<u64>,
    draining: Cell<bool>,
}

/// The main delivery context. Cheap to clone; all clones share one queue,
/// one timer heap, and one clock.
pub struct Scheduler {
    inner: Rc<SchedulerCore>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(SchedulerCore {
                now: Cell::new(Duration::ZERO),
                queue: RefCell::new(VecDeque::new()),
                timers: RefCell::new(BinaryHeap::new()),
                next_seq: Cell::new(0),
                draining: Cell::new(false),
            }),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.inner.now.get()
    }

    /// Append a task to the FIFO queue. It runs on the next drain.
    pub fn post(&self, task: impl FnOnce() + 'static) {
        self.inner.queue.borrow_mut().push_back(Box::new(task));
    }

    /// Arm a timer `delay` from now. The task runs when `advance` crosses
    /// its deadline, unless cancelled first.
    pub fn post_after(&self, delay: Duration, task: impl FnOnce() + 'static) -> TimerHandle {
        let cancelled = Rc::new(Cell::new(false));
        let seq = self.inner.next_seq.get();
        self.inner.next_seq.set(seq + 1);

        self.inner.timers.borrow_mut().push(TimerEntry {
            deadline: self.inner.now.get() + delay,
            seq,
            cancelled: cancelled.clone(),
            task: Box::new(task),
        });

        TimerHandle { cancelled }
    }

    /// Drain the queue until it is empty.
    ///
    /// Tasks may post further tasks; those run in the same drain. A task
    /// that keeps re-posting itself trips the drain guard.
    pub fn run_until_idle(&self) {
        if self.inner.draining.replace(true) {
            // Already draining further up the stack; the outer loop will
            // pick up anything we posted.
            return;
        }

        let mut drained: u32 = 0;
        loop {
            let task = self.inner.queue.borrow_mut().pop_front();
            let Some(task) = task else { break };

            drained += 1;
            if drained > MAX_DRAIN_COUNT {
                self.inner.draining.set(false);
                panic!(
                    "Maximum drain depth exceeded. This can happen when a task \
                     posted to the main context keeps posting follow-up tasks \
                     without ever going idle."
                );
            }

            task();
        }

        if drained > 0 {
            trace!(tasks = drained, "main context drained");
        }
        self.inner.draining.set(false);
    }

    /// Move the virtual clock forward by `duration`, firing due timers in
    /// deadline order and draining the queue after each, so queued
    /// deliveries and timer deliveries interleave in time order.
    pub fn advance(&self, duration: Duration) {
        let target = self.inner.now.get() + duration;
        self.run_until_idle();

        loop {
            let entry = self.pop_due(target);
            let Some(entry) = entry else { break };

            if entry.deadline > self.inner.now.get() {
                self.inner.now.set(entry.deadline);
            }
            trace!(at = ?entry.deadline, "timer fired");
            (entry.task)();
            self.run_until_idle();
        }

        self.inner.now.set(target);
        self.run_until_idle();
    }

    /// Pop the earliest live timer with deadline <= target, discarding
    /// cancelled entries along the way.
    fn pop_due(&self, target: Duration) -> Option<TimerEntry> {
        let mut timers = self.inner.timers.borrow_mut();
        while let Some(entry) = timers.peek() {
            if entry.cancelled.get() {
                timers.pop();
                continue;
            }
            if entry.deadline > target {
                return None;
            }
            return timers.pop();
        }
        None
    }

    /// Number of queued (not yet drained) tasks.
    pub fn pending_tasks(&self) -> usize {
        self.inner.queue.borrow().len()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Scheduler {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_is_fifo() {
        let scheduler = Scheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for tag in 0..3 {
            let order = order.clone();
            scheduler.post(move || order.borrow_mut().push(tag));
        }

        scheduler.run_until_idle();
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn tasks_posted_during_drain_run_in_the_same_drain() {
        let scheduler = Scheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        {
            let order = order.clone();
            let scheduler_clone = scheduler.clone();
            scheduler.post(move || {
                order.borrow_mut().push(1);
                let order = order.clone();
                scheduler_clone.post(move || order.borrow_mut().push(2));
            });
        }

        scheduler.run_until_idle();
        assert_eq!(*order.borrow(), vec![1, 2]);
    }

    #[test]
    fn timers_fire_in_deadline_order_with_fifo_ties() {
        let scheduler = Scheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let post = |delay_ms: u64, tag: &'static str| {
            let order = order.clone();
            scheduler.post_after(Duration::from_millis(delay_ms), move || {
                order.borrow_mut().push(tag)
            })
        };

        let _c = post(30, "c");
        let _a = post(10, "a");
        let _b1 = post(20, "b1");
        let _b2 = post(20, "b2");

        scheduler.advance(Duration::from_millis(50));
        assert_eq!(*order.borrow(), vec!["a", "b1", "b2", "c"]);
        assert_eq!(scheduler.now(), Duration::from_millis(50));
    }

    #[test]
    fn advance_only_fires_timers_within_the_window() {
        let scheduler = Scheduler::new();
        let fired = Rc::new(Cell::new(false));

        let _handle = scheduler.post_after(Duration::from_millis(100), {
            let fired = fired.clone();
            move || fired.set(true)
        });

        scheduler.advance(Duration::from_millis(99));
        assert!(!fired.get());

        scheduler.advance(Duration::from_millis(1));
        assert!(fired.get());
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let scheduler = Scheduler::new();
        let fired = Rc::new(Cell::new(false));

        let handle = scheduler.post_after(Duration::from_millis(10), {
            let fired = fired.clone();
            move || fired.set(true)
        });
        handle.cancel();

        scheduler.advance(Duration::from_millis(20));
        assert!(!fired.get());
        assert!(handle.is_cancelled());
    }

    #[test]
    fn timer_scheduled_by_a_timer_fires_in_the_same_advance_if_due() {
        let scheduler = Scheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        {
            let order = order.clone();
            let scheduler_clone = scheduler.clone();
            let _ = scheduler.post_after(Duration::from_millis(10), move || {
                order.borrow_mut().push("outer");
                let order = order.clone();
                let _ = scheduler_clone.post_after(Duration::from_millis(10), move || {
                    order.borrow_mut().push("inner")
                });
            });
        }

        scheduler.advance(Duration::from_millis(30));
        assert_eq!(*order.borrow(), vec!["outer", "inner"]);
    }

    #[test]
    #[should_panic(expected = "Maximum drain depth exceeded")]
    fn self_feeding_task_trips_the_drain_guard() {
        let scheduler = Scheduler::new();

        fn repost(scheduler: &Scheduler) {
            let again = scheduler.clone();
            scheduler.post(move || repost(&again));
        }

        repost(&scheduler);
        scheduler.run_until_idle();
    }
}
