use ebml_wire::Identifier;

/// Receiver of the structural events produced by a
/// [`StreamDecoder`](crate::StreamDecoder).
///
/// Events arrive synchronously, in document order, on the thread that
/// called `feed`. For a container holding one leaf:
///
/// ```text
///   is_container(container) -> true
///   open_element(container)
///     is_container(leaf) -> false
///     open_element(leaf)
///     deliver_content(leaf bytes)
///     close_element()
///   close_element()
/// ```
///
/// Elements still open when the stream stops are dropped without a
/// `close_element`.
pub trait DecoderCallback {
    /// Classify an element right after its size has been decoded.
    ///
    /// Called exactly once per element, before any of its content is
    /// processed. The decoder does not cache the answer; a consumer whose
    /// schema depends on ancestry tracks the open path itself through
    /// [`open_element`](Self::open_element) and
    /// [`close_element`](Self::close_element).
    fn is_container(&self, id: Identifier) -> bool;

    /// An element's identifier and size are known.
    fn open_element(&mut self, id: Identifier);

    /// The complete content of the current leaf, possibly empty.
    ///
    /// Fired exactly once per leaf, never in fragments.
    fn deliver_content(&mut self, bytes: &[u8]);

    /// The innermost open element has consumed its declared size.
    fn close_element(&mut self);
}

impl<C: DecoderCallback + ?Sized> DecoderCallback for &mut C {
    fn is_container(&self, id: Identifier) -> bool {
        (**self).is_container(id)
    }

    fn open_element(&mut self, id: Identifier) {
        (**self).open_element(id);
    }

    fn deliver_content(&mut self, bytes: &[u8]) {
        (**self).deliver_content(bytes);
    }

    fn close_element(&mut self) {
        (**self).close_element();
    }
}
