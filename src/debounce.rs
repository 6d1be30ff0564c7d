use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

pub type Task = Box<dyn FnOnce()>;

/// One-shot timers. The page uses browser timeouts; tests drive a virtual
/// clock.
pub trait Scheduler {
    type Handle;

    /// Returns `None` when the timer could not be armed.
    fn schedule(&self, delay: Duration, task: Task) -> Option<Self::Handle>;
    fn cancel(&self, handle: Self::Handle);
}

impl<S: Scheduler + ?Sized> Scheduler for Rc<S> {
    type Handle = S::Handle;

    fn schedule(&self, delay: Duration, task: Task) -> Option<Self::Handle> {
        (**self).schedule(delay, task)
    }

    fn cancel(&self, handle: Self::Handle) {
        (**self).cancel(handle)
    }
}

/// Trailing-edge debouncer: each `call` cancels the pending task and arms a
/// new one, so only the last call of a burst runs.
pub struct Debouncer<S: Scheduler> {
    scheduler: S,
    wait: Duration,
    pending: Rc<RefCell<Option<S::Handle>>>,
}

impl<S: Scheduler> Debouncer<S> {
    pub fn new(scheduler: S, wait: Duration) -> Self {
        Self {
            scheduler,
            wait,
            pending: Rc::new(RefCell::new(None)),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.borrow().is_some()
    }

    pub fn call(&self, task: impl FnOnce() + 'static)
    where
        S::Handle: 'static,
    {
        self.cancel();
        let pending = Rc::clone(&self.pending);
        let handle = self.scheduler.schedule(
            self.wait,
            Box::new(move || {
                pending.borrow_mut().take();
                task();
            }),
        );
        if handle.is_none() {
            log::warn!("debounce timer could not be scheduled");
        }
        *self.pending.borrow_mut() = handle;
    }

    pub fn cancel(&self) {
        let previous = self.pending.borrow_mut().take();
        if let Some(handle) = previous {
            self.scheduler.cancel(handle);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{Scheduler, Task};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    struct Entry {
        id: u64,
        due: Duration,
        task: Task,
    }

    #[derive(Default)]
    struct Clock {
        now: Duration,
        next_id: u64,
        queue: Vec<Entry>,
    }

    /// Virtual clock; tasks run only inside `advance`.
    #[derive(Clone, Default)]
    pub(crate) struct ManualScheduler {
        clock: Rc<RefCell<Clock>>,
    }

    impl ManualScheduler {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn pending(&self) -> usize {
            self.clock.borrow().queue.len()
        }

        pub(crate) fn advance(&self, by: Duration) {
            let until = self.clock.borrow().now + by;
            loop {
                let next = {
                    let mut clock = self.clock.borrow_mut();
                    let earliest = clock
                        .queue
                        .iter()
                        .enumerate()
                        .filter(|(_, e)| e.due <= until)
                        .min_by_key(|(_, e)| (e.due, e.id))
                        .map(|(idx, _)| idx);
                    earliest.map(|idx| {
                        let entry = clock.queue.remove(idx);
                        clock.now = entry.due;
                        entry.task
                    })
                };
                match next {
                    Some(task) => task(),
                    None => break,
                }
            }
            self.clock.borrow_mut().now = until;
        }

        pub(crate) fn advance_ms(&self, ms: u64) {
            self.advance(Duration::from_millis(ms));
        }
    }

    impl Scheduler for ManualScheduler {
        type Handle = u64;

        fn schedule(&self, delay: Duration, task: Task) -> Option<u64> {
            let mut clock = self.clock.borrow_mut();
            let id = clock.next_id;
            clock.next_id += 1;
            let due = clock.now + delay;
            clock.queue.push(Entry { id, due, task });
            Some(id)
        }

        fn cancel(&self, handle: u64) {
            self.clock.borrow_mut().queue.retain(|e| e.id != handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ManualScheduler;
    use super::*;
    use std::cell::Cell;

    #[test]
    fn burst_runs_only_last_call() {
        let scheduler = ManualScheduler::new();
        let debouncer = Debouncer::new(scheduler.clone(), Duration::from_millis(300));
        let last = Rc::new(Cell::new(0));
        let runs = Rc::new(Cell::new(0));

        for i in 1..=5 {
            let (last, runs) = (Rc::clone(&last), Rc::clone(&runs));
            debouncer.call(move || {
                last.set(i);
                runs.set(runs.get() + 1);
            });
            scheduler.advance_ms(100);
        }
        assert_eq!(runs.get(), 0);
        assert!(debouncer.is_pending());

        scheduler.advance_ms(200);
        assert_eq!(runs.get(), 1);
        assert_eq!(last.get(), 5);
        assert!(!debouncer.is_pending());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn calls_after_quiescence_run_separately() {
        let scheduler = ManualScheduler::new();
        let debouncer = Debouncer::new(scheduler.clone(), Duration::from_millis(50));
        let runs = Rc::new(Cell::new(0));

        for _ in 0..3 {
            let runs = Rc::clone(&runs);
            debouncer.call(move || runs.set(runs.get() + 1));
            scheduler.advance_ms(50);
        }
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn cancel_drops_pending_task() {
        let scheduler = ManualScheduler::new();
        let debouncer = Debouncer::new(scheduler.clone(), Duration::from_millis(10));
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        debouncer.call(move || flag.set(true));
        debouncer.cancel();
        scheduler.advance_ms(100);
        assert!(!ran.get());
    }

    #[test]
    fn independent_debouncers_do_not_interfere() {
        let scheduler = ManualScheduler::new();
        let a = Debouncer::new(scheduler.clone(), Duration::from_millis(100));
        let b = Debouncer::new(scheduler.clone(), Duration::from_millis(100));
        let hits = Rc::new(Cell::new(0));
        for debouncer in [&a, &b] {
            let hits = Rc::clone(&hits);
            debouncer.call(move || hits.set(hits.get() + 1));
        }
        scheduler.advance_ms(100);
        assert_eq!(hits.get(), 2);
    }
}
