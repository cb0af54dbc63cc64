//! Deferred tasks: a scheduler abstraction and a debounce helper.
//!
//! The keyboard navigation needs exactly one kind of asynchrony: "run this on
//! the next tick" (refocusing the tree container after an inline editor lost
//! focus). [`Scheduler`] models that as a delayed single-shot task that can be
//! cancelled. [`ManualScheduler`] runs tasks against a virtual clock so that
//! event loops and tests decide when time passes.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

/// Identifies a scheduled task so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

pub type Task = Box<dyn FnOnce()>;

/// Schedules single-shot tasks.
pub trait Scheduler {
    /// Runs `task` once, `delay` after now. `Duration::ZERO` means "next tick".
    fn schedule(&self, delay: Duration, task: Task) -> TimerId;

    /// Cancels a task that has not run yet. Unknown ids are ignored.
    fn cancel(&self, id: TimerId);
}

struct Pending {
    id: TimerId,
    due: Duration,
    task: Task,
}

/// A scheduler driven by explicit calls instead of a wall clock.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use std::time::Duration;
/// use treeaccess::scheduler::{ManualScheduler, Scheduler};
///
/// let scheduler = ManualScheduler::new();
/// let fired = Rc::new(Cell::new(false));
/// let f = fired.clone();
/// scheduler.schedule(Duration::from_millis(10), Box::new(move || f.set(true)));
///
/// scheduler.run_until_idle();
/// assert!(!fired.get());
/// scheduler.advance(Duration::from_millis(10));
/// assert!(fired.get());
/// ```
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<Duration>,
    next_id: Cell<u64>,
    queue: RefCell<Vec<Pending>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Runs every task that is due at the current time, including tasks that
    /// become due because a running task scheduled them with zero delay.
    /// Returns how many tasks ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.take_next_due() {
            task();
            ran += 1;
        }
        ran
    }

    /// Moves the clock forward by `by`, running due tasks in due-time order.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now.get() + by;
        let mut ran = 0;
        loop {
            let next_due = self
                .queue
                .borrow()
                .iter()
                .map(|p| p.due)
                .filter(|due| *due <= target)
                .min();
            match next_due {
                Some(due) => {
                    if due > self.now.get() {
                        self.now.set(due);
                    }
                    ran += self.run_until_idle();
                }
                None => break,
            }
        }
        self.now.set(target);
        ran
    }

    fn take_next_due(&self) -> Option<Task> {
        let mut queue = self.queue.borrow_mut();
        let now = self.now.get();
        // Earliest due first, then scheduling order.
        let index = queue
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= now)
            .min_by_key(|(_, p)| (p.due, p.id.0))
            .map(|(i, _)| i)?;
        Some(queue.remove(index).task)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.queue.borrow_mut().push(Pending {
            id,
            due: self.now.get() + delay,
            task,
        });
        id
    }

    fn cancel(&self, id: TimerId) {
        self.queue.borrow_mut().retain(|p| p.id != id);
    }
}

/// Collapses bursts of calls into one task that runs after a quiet period.
///
/// Only one task is ever pending. Scheduling again replaces it and restarts
/// the delay.
pub struct Debounce {
    scheduler: Rc<dyn Scheduler>,
    delay: Duration,
    pending: Rc<Cell<Option<TimerId>>>,
}

impl Debounce {
    pub fn new(scheduler: Rc<dyn Scheduler>, delay: Duration) -> Self {
        Self {
            scheduler,
            delay,
            pending: Rc::new(Cell::new(None)),
        }
    }

    pub fn schedule(&self, task: impl FnOnce() + 'static) {
        if let Some(id) = self.pending.take() {
            self.scheduler.cancel(id);
        }
        let pending = Rc::clone(&self.pending);
        let id = self.scheduler.schedule(
            self.delay,
            Box::new(move || {
                pending.set(None);
                task();
            }),
        );
        self.pending.set(Some(id));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }

    /// Cancels the pending task without running it.
    pub fn dispose(&self) {
        if let Some(id) = self.pending.take() {
            self.scheduler.cancel(id);
        }
    }
}

impl Drop for Debounce {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_delay_tasks_chain_within_one_run() {
        let scheduler = Rc::new(ManualScheduler::new());
        let log = Rc::new(RefCell::new(Vec::new()));

        let s = scheduler.clone();
        let l = log.clone();
        scheduler.schedule(
            Duration::ZERO,
            Box::new(move || {
                l.borrow_mut().push(1);
                let l2 = l.clone();
                s.schedule(Duration::ZERO, Box::new(move || l2.borrow_mut().push(2)));
            }),
        );

        assert_eq!(scheduler.run_until_idle(), 2);
        assert_eq!(*log.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_cancel_prevents_run() {
        let scheduler = ManualScheduler::new();
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        let id = scheduler.schedule(Duration::ZERO, Box::new(move || f.set(true)));
        scheduler.cancel(id);
        scheduler.run_until_idle();
        assert!(!fired.get());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_advance_runs_in_due_order() {
        let scheduler = ManualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (delay, tag) in [(30u64, "c"), (10, "a"), (20, "b")] {
            let l = log.clone();
            scheduler.schedule(
                Duration::from_millis(delay),
                Box::new(move || l.borrow_mut().push(tag)),
            );
        }
        scheduler.advance(Duration::from_millis(25));
        assert_eq!(*log.borrow(), vec!["a", "b"]);
        assert_eq!(scheduler.now(), Duration::from_millis(25));
        scheduler.advance(Duration::from_millis(5));
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_debounce_keeps_only_last() {
        let scheduler = Rc::new(ManualScheduler::new());
        let debounce = Debounce::new(scheduler.clone(), Duration::from_millis(100));
        let hits = Rc::new(RefCell::new(Vec::new()));

        for n in 0..3 {
            let h = hits.clone();
            debounce.schedule(move || h.borrow_mut().push(n));
            scheduler.advance(Duration::from_millis(50));
        }
        assert!(debounce.is_pending());
        scheduler.advance(Duration::from_millis(100));
        assert_eq!(*hits.borrow(), vec![2]);
        assert!(!debounce.is_pending());
    }

    #[test]
    fn test_debounce_dispose_cancels_and_is_idempotent() {
        let scheduler = Rc::new(ManualScheduler::new());
        let debounce = Debounce::new(scheduler.clone(), Duration::from_millis(10));
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        debounce.schedule(move || f.set(true));

        debounce.dispose();
        debounce.dispose();
        scheduler.advance(Duration::from_millis(50));
        assert!(!fired.get());
        assert_eq!(scheduler.pending(), 0);
    }
}
