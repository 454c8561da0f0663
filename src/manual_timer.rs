use crate::Timer;
use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ManualHandle {
    due: u64,
    sequence: u64,
}

#[derive(Default)]
struct Queue {
    now: u64,
    lateness: u64,
    sequence: u64,
    entries: BTreeMap<(u64, u64), Box<dyn FnOnce()>>,
    delays: Vec<u64>,
}

/// Virtual-time host. Time only moves when `advance` is called, which makes tick schedules fully
/// deterministic. Clones share the same queue.
#[derive(Clone, Default)]
pub struct ManualTimer {
    queue: Rc<RefCell<Queue>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every callback scheduled from now on fires `lateness` milliseconds after its due time,
    /// like a host running under load.
    pub fn set_lateness(&self, lateness: u64) {
        self.queue.borrow_mut().lateness = lateness;
    }

    /// Moves time forward, firing due callbacks in order. Each callback observes `now()` equal to
    /// its own fire instant, and callbacks it schedules within the window fire too.
    pub fn advance(&self, duration: u64) {
        let target = self.queue.borrow().now + duration;
        loop {
            let entry = {
                let mut queue = self.queue.borrow_mut();
                let due = match queue.entries.keys().next() {
                    Some(&(due, _)) if due <= target => due,
                    _ => break,
                };
                queue.now = due;
                queue.entries.pop_first()
            };
            if let Some((_, callback)) = entry {
                callback();
            }
        }
        self.queue.borrow_mut().now = target;
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().entries.len()
    }

    /// Delays requested through `schedule_once`, oldest first.
    pub fn delays(&self) -> Vec<u64> {
        self.queue.borrow().delays.clone()
    }
}

impl Timer for ManualTimer {
    type Handle = ManualHandle;

    fn now(&self) -> u64 {
        self.queue.borrow().now
    }

    fn schedule_once(&self, delay: u64, callback: Box<dyn FnOnce()>) -> ManualHandle {
        let mut queue = self.queue.borrow_mut();
        let due = queue.now + delay + queue.lateness;
        let sequence = queue.sequence;
        queue.sequence += 1;
        queue.delays.push(delay);
        queue.entries.insert((due, sequence), callback);
        ManualHandle { due, sequence }
    }

    fn cancel(&self, handle: ManualHandle) {
        let callback = self.queue.borrow_mut().entries.remove(&(handle.due, handle.sequence));
        drop(callback);
    }
}

#[cfg(test)]
mod tests {
    use super::ManualTimer;
    use crate::Timer;
    use std::{cell::RefCell, rc::Rc};

    fn recorder(timer: &ManualTimer, fired: &Rc<RefCell<Vec<(&'static str, u64)>>>, name: &'static str) -> Box<dyn FnOnce()> {
        let timer = timer.clone();
        let fired = fired.clone();
        Box::new(move || fired.borrow_mut().push((name, timer.now())))
    }

    #[test]
    fn fires_in_due_order() {
        let timer = ManualTimer::new();
        let fired = Rc::new(RefCell::new(Vec::new()));
        timer.schedule_once(30, recorder(&timer, &fired, "c"));
        timer.schedule_once(10, recorder(&timer, &fired, "a"));
        timer.schedule_once(10, recorder(&timer, &fired, "b"));
        timer.advance(25);
        assert_eq!(*fired.borrow(), vec![("a", 10), ("b", 10)]);
        assert_eq!(timer.now(), 25);
        timer.advance(5);
        assert_eq!(fired.borrow().last(), Some(&("c", 30)));
        assert_eq!(timer.pending(), 0);
    }

    #[test]
    fn cancel() {
        let timer = ManualTimer::new();
        let fired = Rc::new(RefCell::new(Vec::new()));
        let handle = timer.schedule_once(10, recorder(&timer, &fired, "a"));
        timer.cancel(handle);
        timer.cancel(handle);
        timer.advance(100);
        assert!(fired.borrow().is_empty());
    }

    #[test]
    fn nested_schedules_fire_within_window() {
        let timer = ManualTimer::new();
        let fired = Rc::new(RefCell::new(Vec::new()));
        let inner = recorder(&timer, &fired, "inner");
        let nested = timer.clone();
        timer.schedule_once(10, Box::new(move || {
            nested.schedule_once(0, inner);
        }));
        timer.advance(10);
        assert_eq!(*fired.borrow(), vec![("inner", 10)]);
    }

    #[test]
    fn lateness() {
        let timer = ManualTimer::new();
        let fired = Rc::new(RefCell::new(Vec::new()));
        timer.set_lateness(7);
        timer.schedule_once(10, recorder(&timer, &fired, "a"));
        timer.advance(16);
        assert!(fired.borrow().is_empty());
        timer.advance(1);
        assert_eq!(*fired.borrow(), vec![("a", 17)]);
        assert_eq!(timer.delays(), vec![10]);
    }
}
