use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::{Rc, Weak},
};

/// Handle returned by every `subscribe` call.
///
/// Dropping it, or calling [`Subscription::unsubscribe`], detaches the
/// listener. Views keep it in their state and let unmount drop it.
#[must_use = "dropping a Subscription detaches the listener immediately"]
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(dispose: impl FnOnce() + 'static) -> Self {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.dispose_now();
    }

    fn dispose_now(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.dispose.is_some())
            .finish()
    }
}

type Listener<T> = Rc<dyn Fn(&T)>;

struct Registry<T> {
    next_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
}

/// Ordered set of listeners for values of type `T`.
///
/// Cloning shares the same set.
pub struct ListenerRegistry<T> {
    inner: Rc<RefCell<Registry<T>>>,
}

impl<T: 'static> ListenerRegistry<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut registry = self.inner.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.push((id, Rc::new(listener)));
            id
        };

        let weak: Weak<RefCell<Registry<T>>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner
                    .borrow_mut()
                    .listeners
                    .retain(|(listener_id, _)| *listener_id != id);
            }
        })
    }

    /// Call every listener in subscription order.
    ///
    /// Listeners may subscribe or unsubscribe while being notified; changes
    /// take effect on the next call.
    pub fn notify(&self, value: &T) {
        let snapshot: Vec<Listener<T>> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(value);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for ListenerRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ListenerRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for ListenerRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.inner.borrow().listeners.len())
            .finish()
    }
}

/// Owned by a mounted view; ended when it unmounts.
///
/// Async work started by the view checks [`Liveness::is_alive`] before
/// writing any state, so a late resolution after navigation is dropped.
#[derive(Debug, Clone)]
pub struct Liveness(Rc<Cell<bool>>);

impl Liveness {
    #[must_use]
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.0.get()
    }

    pub fn end(&self) {
        self.0.set(false);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_subscription_detaches_listener() {
        let registry = ListenerRegistry::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        let subscription = registry.subscribe(move |value| sink.borrow_mut().push(*value));
        registry.notify(&1);
        drop(subscription);
        registry.notify(&2);

        assert_eq!(*seen.borrow(), vec![1]);
        assert!(registry.is_empty());
    }

    #[test]
    fn unsubscribe_only_removes_its_own_listener() {
        let registry = ListenerRegistry::<u32>::new();
        let count = Rc::new(Cell::new(0));

        let first = Rc::clone(&count);
        let keep = registry.subscribe(move |_| first.set(first.get() + 1));
        let second = Rc::clone(&count);
        let gone = registry.subscribe(move |_| second.set(second.get() + 10));

        gone.unsubscribe();
        registry.notify(&0);
        assert_eq!(count.get(), 1);
        assert_eq!(registry.len(), 1);
        drop(keep);
    }

    #[test]
    fn subscription_outliving_registry_is_harmless() {
        let registry = ListenerRegistry::<u32>::new();
        let subscription = registry.subscribe(|_| {});
        drop(registry);
        subscription.unsubscribe();
    }

    #[test]
    fn liveness_is_shared_between_clones() {
        let liveness = Liveness::new();
        let task_copy = liveness.clone();
        assert!(task_copy.is_alive());
        liveness.end();
        assert!(!task_copy.is_alive());
    }
}
