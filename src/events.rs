//! Listener registration.
//!
//! The engine reports lifecycle moments (index ready, search finished,
//! context finished) through registered callbacks rather than return values
//! alone, so a UI layer can subscribe once and render whenever results
//! arrive, including results produced on worker threads.

/// An ordered set of callbacks for one event kind.
///
/// Callbacks fire in registration order and receive the payload by
/// reference. `Send` is required so a sharded session can emit from its
/// dispatcher thread.
pub struct Listeners<T> {
    callbacks: Vec<Box<dyn Fn(&T) + Send>>,
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Listeners {
            callbacks: Vec::new(),
        }
    }
}

impl<T> Listeners<T> {
    pub fn subscribe(&mut self, callback: impl Fn(&T) + Send + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    pub fn emit(&self, payload: &T) {
        for callback in &self.callbacks {
            callback(payload);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl<T> std::fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.callbacks.len())
            .finish()
    }
}
