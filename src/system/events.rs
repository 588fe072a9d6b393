//! Listener registry for the brewing machines
//! Synchronous, in-order delivery on the caller's stack

use heapless::Vec as OutputVec;
use log::warn;
use std::fmt::Debug;

/// Events that can be filtered by a coarse kind.
pub trait EventKind {
    type Kind: Copy + Eq + Debug;

    fn kind(&self) -> Self::Kind;
}

/// Handle returned by `on`; pass it to `off` to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback<E> = Box<dyn FnMut(&E)>;

struct Entry<E: EventKind> {
    id: ListenerId,
    kind: Option<E::Kind>,
    callback: Callback<E>,
}

/// Callback lists keyed by event kind.
///
/// Listeners are called in registration order. A listener must not reach
/// back into the machine that is emitting.
pub struct Listeners<E: EventKind> {
    entries: Vec<Entry<E>>,
    next_id: u64,
}

impl<E: EventKind> Default for Listeners<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<E: EventKind> Listeners<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one event kind
    pub fn on<F>(&mut self, kind: E::Kind, listener: F) -> ListenerId
    where
        F: FnMut(&E) + 'static,
    {
        self.insert(Some(kind), Box::new(listener))
    }

    /// Subscribe to every event
    pub fn on_any<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&E) + 'static,
    {
        self.insert(None, Box::new(listener))
    }

    /// Returns false when the id was not registered
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn emit(&mut self, event: &E) {
        let kind = event.kind();
        for entry in self.entries.iter_mut() {
            if entry.kind.map_or(true, |k| k == kind) {
                (entry.callback)(event);
            }
        }
    }

    pub fn emit_all<'a, I>(&mut self, events: I)
    where
        I: IntoIterator<Item = &'a E>,
        E: 'a,
    {
        for event in events {
            self.emit(event);
        }
    }

    fn insert(&mut self, kind: Option<E::Kind>, callback: Callback<E>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, kind, callback });
        id
    }
}

/// Append to a bounded output buffer, logging instead of panicking on overflow.
pub(crate) fn push_output<T: Debug, const N: usize>(outputs: &mut OutputVec<T, N>, event: T) {
    if let Err(dropped) = outputs.push(event) {
        warn!("Output buffer full ({} slots), dropping {:?}", N, dropped);
    }
}
