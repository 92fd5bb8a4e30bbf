//! The scheduling capability consumed by the reflow engine.
//!
//! The core never talks to wall-clock timers directly; the host supplies a
//! [`Scheduler`] (a browser shell wires this to `setTimeout` and
//! `requestAnimationFrame` equivalents, a desktop shell to its event loop).
//! [`VirtualScheduler`] is a manual-clock implementation used by tests and
//! headless hosts, which keeps debounce behaviour deterministic.

use std::cell::RefCell;

pub type ScheduledTask = Box<dyn FnOnce() + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

pub trait Scheduler {
    /// Monotonic milliseconds since an arbitrary origin.
    fn now_ms(&self) -> u64;

    fn after(&self, delay_ms: u64, task: ScheduledTask) -> TimerHandle;

    fn cancel(&self, handle: TimerHandle);

    /// Paint-cycle hook. Hosts without one degrade to a zero-delay timer.
    fn next_frame(&self, task: ScheduledTask) -> TimerHandle {
        self.after(0, task)
    }

    /// Idle-time hook with a timeout. Degrades to a zero-delay timer.
    fn when_idle(&self, _timeout_ms: u64, task: ScheduledTask) -> TimerHandle {
        self.after(0, task)
    }
}

struct PendingTask {
    id: u64,
    due_ms: u64,
    task: ScheduledTask,
}

struct VirtualState {
    now_ms: u64,
    next_id: u64,
    queue: Vec<PendingTask>,
}

/// Manual-clock scheduler: tasks fire in due-time order (FIFO among equal
/// deadlines) when the clock is advanced past them.
pub struct VirtualScheduler {
    state: RefCell<VirtualState>,
}

impl Default for VirtualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(VirtualState {
                now_ms: 0,
                next_id: 1,
                queue: Vec::new(),
            }),
        }
    }

    /// Move the clock forward, firing every task that comes due. Tasks may
    /// schedule further tasks; those fire too if they fall inside the window.
    pub fn advance_ms(&self, delta_ms: u64) {
        let target = self.state.borrow().now_ms + delta_ms;
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                let index = state
                    .queue
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due_ms <= target)
                    .min_by_key(|(_, t)| (t.due_ms, t.id))
                    .map(|(index, _)| index);
                match index {
                    Some(index) => {
                        let pending = state.queue.remove(index);
                        state.now_ms = state.now_ms.max(pending.due_ms);
                        Some(pending.task)
                    }
                    None => None,
                }
            };
            match next {
                Some(task) => task(),
                None => break,
            }
        }
        self.state.borrow_mut().now_ms = target;
    }

    /// Fire everything already due without moving the clock.
    pub fn run_pending(&self) {
        self.advance_ms(0);
    }

    pub fn pending_count(&self) -> usize {
        self.state.borrow().queue.len()
    }
}

impl Scheduler for VirtualScheduler {
    fn now_ms(&self) -> u64 {
        self.state.borrow().now_ms
    }

    fn after(&self, delay_ms: u64, task: ScheduledTask) -> TimerHandle {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        let due_ms = state.now_ms + delay_ms;
        state.queue.push(PendingTask { id, due_ms, task });
        TimerHandle(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        self.state
            .borrow_mut()
            .queue
            .retain(|pending| pending.id != handle.0);
    }
}
