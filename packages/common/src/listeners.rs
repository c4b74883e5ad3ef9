//! # Listener Registry
//!
//! Ordered, synchronous callback lists with disposer handles.
//!
//! Listeners are invoked in subscription order. The registry snapshots its
//! callbacks before notifying, so a listener may unsubscribe itself (or
//! subscribe others) while being notified; such changes take effect on the
//! next notification.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Shared callback receiving a borrowed event
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<T: ?Sized> {
    next_id: u64,
    entries: Vec<(u64, Listener<T>)>,
}

/// Ordered list of listeners for events of type `T`
pub struct Listeners<T: ?Sized> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T: ?Sized + 'static> Listeners<T> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register `listener`; the returned handle removes it again
    pub fn add(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Unsubscribe {
        self.add_shared(Arc::new(listener))
    }

    pub fn add_shared(&self, listener: Listener<T>) -> Unsubscribe {
        let id = {
            let mut registry = self.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push((id, listener));
            id
        };

        let weak: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.registry);
        Unsubscribe::new(move || {
            if let Some(registry) = weak.upgrade() {
                registry
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .entries
                    .retain(|(entry_id, _)| *entry_id != id);
            }
        })
    }

    /// Invoke every listener with `event`, in subscription order
    pub fn notify(&self, event: &T) {
        let snapshot: Vec<Listener<T>> = self
            .lock()
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in snapshot {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry<T>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: ?Sized + 'static> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self
            .registry
            .lock()
            .map(|registry| registry.entries.len())
            .unwrap_or_default();
        f.debug_struct("Listeners").field("count", &count).finish()
    }
}

/// Disposer returned by [`Listeners::add`]
///
/// Dropping the handle does NOT remove the listener; call
/// [`Unsubscribe::unsubscribe`] to do that.
pub struct Unsubscribe {
    dispose: Box<dyn FnOnce() + Send + Sync>,
}

impl Unsubscribe {
    fn new(dispose: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            dispose: Box::new(dispose),
        }
    }

    /// Combine several handles into one that removes all of them
    pub fn all(handles: Vec<Unsubscribe>) -> Self {
        Self::new(move || {
            for handle in handles {
                handle.unsubscribe();
            }
        })
    }

    pub fn unsubscribe(self) {
        (self.dispose)();
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Unsubscribe")
    }
}
