//! Thread-shared client
//!
//! The protocol allows one request in flight per connection, so sharing a
//! client means holding its lock for the whole write-read cycle.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{BoxedTransport, Client};
use crate::transport::Transport;

/// A client behind a mutex, cloneable across threads
pub struct SharedClient<T: Transport = BoxedTransport> {
    inner: Arc<Mutex<Client<T>>>,
}

impl<T: Transport> SharedClient<T> {
    pub fn new(client: Client<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(client)),
        }
    }

    /// Run `f` with exclusive use of the client
    ///
    /// Other threads block until `f` returns, so every call made inside it
    /// completes its full request/response cycle undisturbed.
    pub fn with<R>(&self, f: impl FnOnce(&mut Client<T>) -> R) -> R {
        let mut client = self.inner.lock();
        f(&mut client)
    }
}

impl<T: Transport> Clone for SharedClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
