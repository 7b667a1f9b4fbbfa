use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use tagwise_dom::DomTree;

use super::Event;

type Callback = Box<dyn FnMut(&str, &Event, &mut DomTree)>;
type Deferred = Box<dyn FnOnce(&mut DomTree)>;

struct Listener {
    id: u64,
    names: Vec<String>,
    once: bool,
    callback: Rc<RefCell<Callback>>,
}

impl Listener {
    fn matches(&self, event: &str) -> bool {
        self.names.iter().any(|name| name == "*" || name == event)
    }
}

#[derive(Default)]
struct Inner {
    listeners: Vec<Listener>,
    next_id: u64,
    deferred: VecDeque<Deferred>,
}

impl Inner {
    fn remove(&mut self, id: u64) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|listener| listener.id != id);
        self.listeners.len() != before
    }

    fn contains(&self, id: u64) -> bool {
        self.listeners.iter().any(|listener| listener.id == id)
    }
}

/// Synchronous publish/subscribe hub.
///
/// Listeners run in registration order. Cloning the handler yields another
/// handle to the same listener list, so callbacks can capture a clone and
/// subscribe or defer work from inside a delivery.
#[derive(Clone, Default)]
pub struct EventHandler {
    inner: Rc<RefCell<Inner>>,
}

/// Handle returned by [`EventHandler::on`] and [`EventHandler::once`].
#[derive(Debug, Clone)]
pub struct Subscription {
    handler: Weak<RefCell<Inner>>,
    id: u64,
}

impl Subscription {
    /// Remove the listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&self) -> bool {
        self.handler
            .upgrade()
            .is_some_and(|inner| inner.borrow_mut().remove(self.id))
    }
}

/// Non-owning handle to an [`EventHandler`].
///
/// Listeners that need to subscribe or defer from inside a delivery capture
/// one of these instead of a clone, so the handler is not kept alive by its
/// own listeners.
#[derive(Debug, Clone)]
pub struct WeakEventHandler {
    inner: Weak<RefCell<Inner>>,
}

impl WeakEventHandler {
    /// The handler, if it still exists.
    #[must_use]
    pub fn upgrade(&self) -> Option<EventHandler> {
        self.inner.upgrade().map(|inner| EventHandler { inner })
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("EventHandler")
            .field("listeners", &inner.listeners.len())
            .field("deferred", &inner.deferred.len())
            .finish()
    }
}

impl EventHandler {
    /// Create a handler without listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen to one or more comma-separated event names; `*` matches every
    /// event. The callback receives the event name, the payload and the tree.
    pub fn on(&self, names: &str, callback: impl FnMut(&str, &Event, &mut DomTree) + 'static) -> Subscription {
        self.register(names, false, Box::new(callback))
    }

    /// Like [`on`](Self::on), but the listener is removed before its first delivery.
    pub fn once(&self, names: &str, callback: impl FnMut(&str, &Event, &mut DomTree) + 'static) -> Subscription {
        self.register(names, true, Box::new(callback))
    }

    fn register(&self, names: &str, once: bool, callback: Callback) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push(Listener {
            id,
            names: names
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
            once,
            callback: Rc::new(RefCell::new(callback)),
        });
        Subscription {
            handler: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// A handle that does not keep the listener list alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakEventHandler {
        WeakEventHandler {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Queue `callback` to run once the current [`trigger`](Self::trigger)
    /// has delivered to every listener.
    pub fn defer(&self, callback: impl FnOnce(&mut DomTree) + 'static) {
        self.inner.borrow_mut().deferred.push_back(Box::new(callback));
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Deliver `event` to every matching listener, then drain the deferred queue.
    ///
    /// The set of listeners is fixed when delivery starts: listeners added
    /// during delivery first see the next event, and listeners removed during
    /// delivery are skipped.
    pub fn trigger(&self, event: &Event, tree: &mut DomTree) {
        let name = event.name();
        let matching: Vec<(u64, bool, Rc<RefCell<Callback>>)> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .filter(|listener| listener.matches(name))
            .map(|listener| (listener.id, listener.once, Rc::clone(&listener.callback)))
            .collect();

        for (id, once, callback) in matching {
            {
                let mut inner = self.inner.borrow_mut();
                if !inner.contains(id) {
                    continue;
                }
                if once {
                    let _ = inner.remove(id);
                }
            }
            match callback.try_borrow_mut() {
                Ok(mut callback) => (*callback)(name, event, tree),
                Err(_) => log::debug!(target: "tagwise::event", "skipping re-entrant delivery of {name}"),
            }
        }

        loop {
            let next = self.inner.borrow_mut().deferred.pop_front();
            let Some(deferred) = next else {
                break;
            };
            deferred(tree);
        }
    }
}
