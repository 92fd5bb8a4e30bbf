//! Typed event registries with drop-detaching subscriptions.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Handler<T> = Rc<dyn Fn(&T)>;

struct RegistryInner<T> {
    handlers: Vec<(u64, Handler<T>)>,
    next_id: u64,
}

/// An ordered handler list. Invocation order matches registration order;
/// emission works on a snapshot, so handlers registered while an event is
/// being delivered only see subsequent events.
pub(crate) struct Registry<T> {
    inner: Rc<RefCell<RegistryInner<T>>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(RegistryInner {
                handlers: Vec::new(),
                next_id: 1,
            })),
        }
    }
}

impl<T: 'static> Registry<T> {
    pub fn subscribe(&self, handler: impl Fn(&T) + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.handlers.push((id, Rc::new(handler)));

        let weak: Weak<RefCell<RegistryInner<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner
                        .borrow_mut()
                        .handlers
                        .retain(|(handler_id, _)| *handler_id != id);
                }
            })),
        }
    }

    pub fn snapshot(&self) -> Vec<Handler<T>> {
        self.inner
            .borrow()
            .handlers
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.inner.borrow_mut().handlers.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.borrow().handlers.len()
    }
}

/// Keeps a handler registered for as long as it is held; dropping it (or
/// calling [`Subscription::unsubscribe`]) detaches the handler.
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}
