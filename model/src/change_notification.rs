//! Ordered listener registry shared by tiles and the board.
//!
//! Each entry is `(target, data, handler)`. The target is the identity of the
//! object the listener was registered on; together with the handler's `Rc`
//! address it forms the key used by [`ChangeNotification::remove`]. The handler
//! is never compared by value.
//!
//! The registry is not reentrant: a handler invoked from
//! [`ChangeNotification::notify_all`] must not add or remove entries on the
//! list that is notifying it.

use std::rc::Rc;

use crate::error::{violation, Reason};

struct Listener<H: ?Sized, D> {
    target: usize,
    data: D,
    handler: Rc<H>,
}

pub struct ChangeNotification<H: ?Sized, D = ()> {
    // Allocated on first add, released again once the last entry goes away.
    listeners: Option<Vec<Listener<H, D>>>,
}

impl<H: ?Sized, D> Default for ChangeNotification<H, D> {
    fn default() -> Self {
        Self { listeners: None }
    }
}

impl<H: ?Sized, D> ChangeNotification<H, D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry. The same triple may be added more than once, every
    /// copy fires on its own.
    pub fn add(&mut self, target: usize, data: D, handler: Rc<H>) {
        self.listeners
            .get_or_insert_with(Vec::new)
            .push(Listener {
                target,
                data,
                handler,
            });
    }

    /// Removes the first entry registered for `target` with this exact handler
    /// and hands back its client data.
    pub fn remove(&mut self, target: usize, handler: &Rc<H>) -> D {
        let listeners = match self.listeners.as_mut() {
            Some(listeners) => listeners,
            None => violation(
                Reason::ArgumentOutOfRange,
                format_args!("no listeners registered (target {})", target),
            ),
        };
        let index = match listeners
            .iter()
            .position(|l| l.target == target && Rc::ptr_eq(&l.handler, handler))
        {
            Some(index) => index,
            None => violation(
                Reason::ArgumentOutOfRange,
                format_args!("listener not registered (target {})", target),
            ),
        };
        let listener = listeners.remove(index);
        if listeners.is_empty() {
            self.listeners = None;
        }
        listener.data
    }

    pub fn clear(&mut self) {
        self.clear_with(|_| {});
    }

    /// Drops every entry, last one first, passing each entry's data to `on_data`.
    pub fn clear_with<F>(&mut self, mut on_data: F)
    where
        F: FnMut(D),
    {
        if let Some(mut listeners) = self.listeners.take() {
            while let Some(listener) = listeners.pop() {
                on_data(listener.data);
            }
        }
    }

    /// Calls `dispatch(target, data, handler)` for every entry in the order
    /// they were added.
    pub fn notify_all<F>(&self, mut dispatch: F)
    where
        F: FnMut(usize, &D, &H),
    {
        if let Some(listeners) = &self.listeners {
            for listener in listeners {
                dispatch(listener.target, &listener.data, &*listener.handler);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_none()
    }
}
