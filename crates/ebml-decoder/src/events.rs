use std::collections::HashSet;
use std::mem;

use ebml_wire::Identifier;

use crate::callback::DecoderCallback;

/// One structural event, as recorded by [`EventCollector`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecoderEvent {
    /// An element's header has been read.
    Open(Identifier),

    /// The full content of the current leaf.
    Data(Vec<u8>),

    /// The innermost open element is complete.
    Close,
}

/// A [`DecoderCallback`] that records every event in order.
///
/// Containers are the identifiers given at construction; every other
/// element is a leaf.
#[derive(Clone, Debug, Default)]
pub struct EventCollector {
    containers: HashSet<Identifier>,
    events: Vec<DecoderEvent>,
}

impl EventCollector {
    pub fn new(containers: impl IntoIterator<Item = Identifier>) -> Self {
        Self {
            containers: containers.into_iter().collect(),
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn events(&self) -> &[DecoderEvent] {
        &self.events
    }

    /// Remove and return the events recorded so far.
    pub fn take_events(&mut self) -> Vec<DecoderEvent> {
        mem::take(&mut self.events)
    }

    #[must_use]
    pub fn into_events(self) -> Vec<DecoderEvent> {
        self.events
    }
}

impl DecoderCallback for EventCollector {
    fn is_container(&self, id: Identifier) -> bool {
        self.containers.contains(&id)
    }

    fn open_element(&mut self, id: Identifier) {
        self.events.push(DecoderEvent::Open(id));
    }

    fn deliver_content(&mut self, bytes: &[u8]) {
        self.events.push(DecoderEvent::Data(bytes.to_vec()));
    }

    fn close_element(&mut self) {
        self.events.push(DecoderEvent::Close);
    }
}
