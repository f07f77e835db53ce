// ============================================================================
// Shared Hosting
// Serialized access to one order book from many threads
// ============================================================================

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::OrderBook;
use crate::domain::{Matches, Order};
use crate::error::{EngineError, EngineResult};

/// Cloneable handle that serializes `add` calls behind a mutex.
///
/// Each call holds the lock for the whole admission, cascade included, so
/// callers observe the same sequential semantics as a plain [`OrderBook`].
#[derive(Clone)]
pub struct SharedOrderBook {
    inner: Arc<Mutex<OrderBook>>,
}

impl SharedOrderBook {
    pub fn new(book: OrderBook) -> Self {
        Self {
            inner: Arc::new(Mutex::new(book)),
        }
    }

    pub fn add(&self, order: Order) -> EngineResult<Matches> {
        self.inner.lock().add(order)
    }

    /// Run `f` with exclusive access, e.g. to read a consistent snapshot.
    pub fn with_book<R>(&self, f: impl FnOnce(&mut OrderBook) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn reset(&self) {
        self.inner.lock().reset();
    }
}

// ============================================================================
// Sequencer
// ============================================================================

struct Request {
    order: Order,
    reply: Sender<EngineResult<Matches>>,
}

/// Single-writer host: one worker thread owns the book and applies orders
/// in the order they arrive on the channel.
pub struct OrderSequencer {
    sender: Option<Sender<Request>>,
    worker: Option<JoinHandle<OrderBook>>,
}

impl OrderSequencer {
    pub fn spawn(book: OrderBook) -> Self {
        let (sender, receiver) = channel::unbounded::<Request>();
        let worker = thread::spawn(move || Self::run(book, receiver));
        Self {
            sender: Some(sender),
            worker: Some(worker),
        }
    }

    fn run(mut book: OrderBook, receiver: Receiver<Request>) -> OrderBook {
        tracing::debug!(instrument = %book.instrument(), "sequencer started");
        for Request { order, reply } in receiver.iter() {
            // The submitter may have gone away; the order still counts.
            let _ = reply.send(book.add(order));
        }
        tracing::debug!(instrument = %book.instrument(), "sequencer stopped");
        book
    }

    /// Queue an order and wait for its matches.
    pub fn submit(&self, order: Order) -> EngineResult<Matches> {
        let sender = self.sender.as_ref().ok_or(EngineError::SequencerClosed)?;
        let (reply, response) = channel::bounded(1);
        sender
            .send(Request { order, reply })
            .map_err(|_| EngineError::SequencerClosed)?;
        response.recv().map_err(|_| EngineError::SequencerClosed)?
    }

    /// Drain queued orders, stop the worker and hand the book back.
    pub fn shutdown(mut self) -> EngineResult<OrderBook> {
        self.sender.take();
        self.worker
            .take()
            .ok_or(EngineError::SequencerClosed)?
            .join()
            .map_err(|_| EngineError::SequencerClosed)
    }
}

impl Drop for OrderSequencer {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
