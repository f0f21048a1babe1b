//! Response processor chain
//!
//! Session layers offer each inbound response to the processors registered
//! for the request method, in registration order, until one claims it.
//! Processors decide by inspecting the original request carried in the
//! event (typically its Content-Type), so no processor needs its own table
//! of outstanding transactions.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::session::{Method, ResponseEvent};

/// Observer of inbound responses
pub trait ResponseProcessor: Send + Sync {
    /// Process a response
    ///
    /// Returns `true` if the event was handled and must not be offered to
    /// processors registered after this one.
    fn process_response(&self, event: &ResponseEvent) -> bool;

    /// Whether the processor still wants responses
    ///
    /// Inactive processors are pruned from a chain on the next registration.
    fn is_active(&self) -> bool {
        true
    }
}

/// Ordered processors per request method
#[derive(Default)]
pub struct ResponseProcessorChain {
    processors: RwLock<HashMap<Method, Vec<Arc<dyn ResponseProcessor>>>>,
}

impl fmt::Debug for ResponseProcessorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<String, usize> = self
            .processors
            .read()
            .iter()
            .map(|(method, list)| (method.to_string(), list.len()))
            .collect();
        f.debug_struct("ResponseProcessorChain")
            .field("processors", &counts)
            .finish()
    }
}

impl ResponseProcessorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a processor for `method`, dropping any that went inactive
    pub fn register(&self, method: Method, processor: Arc<dyn ResponseProcessor>) {
        let mut processors = self.processors.write();
        let list = processors.entry(method).or_default();
        list.retain(|p| p.is_active());
        list.push(processor);
    }

    /// Number of processors registered for `method`
    pub fn len(&self, method: &Method) -> usize {
        self.processors.read().get(method).map_or(0, Vec::len)
    }

    /// Offer `event` to the processors for `method` until one claims it
    ///
    /// Returns whether any processor claimed the event.
    pub fn dispatch(&self, method: &Method, event: &ResponseEvent) -> bool {
        // Snapshot so processors may register others without deadlocking
        let processors = match self.processors.read().get(method) {
            Some(list) => list.clone(),
            None => return false,
        };

        for processor in processors {
            if processor.process_response(event) {
                return true;
            }
        }

        trace!("No processor claimed {} response", method);
        false
    }
}
