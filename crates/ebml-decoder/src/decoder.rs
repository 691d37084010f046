use ebml_wire::vint::{decode_masked, decode_raw};
use ebml_wire::{Identifier, WireError};
use log::{debug, trace};

use crate::callback::DecoderCallback;
use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::node::NodeStack;
use crate::pending::PendingBuffer;

/// What the next bytes of the stream are expected to be.
///
/// ```text
///   ReadingIdentifier → ReadingSize ─┬─ container → ReadingIdentifier
///          ↑                         └─ leaf      → ReadingContent
///          └────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DecodeState {
    ReadingIdentifier,
    ReadingSize,
    ReadingContent,
}

/// Push-based EBML decoder.
///
/// Bytes go in through [`feed`](Self::feed) in chunks of any size, down to
/// one byte at a time; events come out through the [`DecoderCallback`] as
/// soon as each element boundary is known. The events do not depend on
/// how the stream was chunked.
///
/// The decoder keeps only the path of open elements, the few bytes of an
/// unfinished identifier or size field, and the content of the current
/// leaf when that content spans several `feed` calls.
///
/// # Example
///
/// ```rust
/// use ebml_decoder::{DecoderEvent, EventCollector, Identifier, StreamDecoder};
///
/// // Container 0x1A45DFA3 holding the leaf 0x4286 = [0x01].
/// let stream = [0x1A, 0x45, 0xDF, 0xA3, 0x84, 0x42, 0x86, 0x81, 0x01];
///
/// let collector = EventCollector::new([Identifier(0x1A45_DFA3)]);
/// let mut decoder = StreamDecoder::new(collector);
/// for byte in stream {
///     decoder.feed(&[byte]).unwrap();
/// }
///
/// let events = decoder.finish().unwrap().into_events();
/// assert_eq!(events, vec![
///     DecoderEvent::Open(Identifier(0x1A45_DFA3)),
///     DecoderEvent::Open(Identifier(0x4286)),
///     DecoderEvent::Data(vec![0x01]),
///     DecoderEvent::Close,
///     DecoderEvent::Close,
/// ]);
/// ```
pub struct StreamDecoder<C> {
    callback: C,
    config: DecoderConfig,
    state: DecodeState,
    pending: PendingBuffer,
    nodes: NodeStack,
    /// Identifier of the element whose size is being read.
    current_id: Identifier,
    current_id_len: usize,
    /// Absolute offset of the next byte not yet assigned to a field or
    /// to content. Stashed pending bytes are not counted.
    offset: u64,
    poisoned: bool,
}

impl<C: DecoderCallback> StreamDecoder<C> {
    #[must_use]
    pub fn new(callback: C) -> Self {
        Self::with_config(callback, DecoderConfig::default())
    }

    #[must_use]
    pub fn with_config(callback: C, config: DecoderConfig) -> Self {
        let nodes = NodeStack::new(config.initial_depth_capacity, config.retained_buffer_capacity);
        Self {
            callback,
            config,
            state: DecodeState::ReadingIdentifier,
            pending: PendingBuffer::new(),
            nodes,
            current_id: Identifier::default(),
            current_id_len: 0,
            offset: 0,
            poisoned: false,
        }
    }

    /// Append `bytes` to the stream and decode as far as possible.
    ///
    /// Whatever cannot be interpreted yet is kept for the next call. An
    /// empty slice is a no-op.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::ElementOverrun`] if an element reaches past the end
    ///   of its parent container.
    /// - [`DecodeError::LeafTooLarge`] / [`DecodeError::DepthExceeded`]
    ///   when the corresponding [`DecoderConfig`] limit is set and crossed.
    /// - [`DecodeError::Poisoned`] if an earlier call failed and the
    ///   decoder has not been [`reset`](Self::reset).
    ///
    /// Events already delivered before an error stay delivered.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
        if self.poisoned {
            return Err(DecodeError::Poisoned);
        }
        if bytes.is_empty() {
            return Ok(());
        }

        let mut input = bytes;
        let result = self.drive(&mut input);
        if result.is_err() {
            self.poisoned = true;
        }
        result
    }

    /// Run the state machine until it needs more input.
    fn drive(&mut self, input: &mut &[u8]) -> Result<(), DecodeError> {
        loop {
            let advanced = match self.state {
                DecodeState::ReadingIdentifier | DecodeState::ReadingSize => self.read_field(input)?,
                DecodeState::ReadingContent => self.read_content(input),
            };
            if !advanced {
                debug_assert!(input.is_empty());
                return Ok(());
            }
        }
    }

    /// Read one identifier or size vint. Returns `false` once `input` has
    /// been stashed because the field is still incomplete.
    fn read_field(&mut self, input: &mut &[u8]) -> Result<bool, DecodeError> {
        let reading_id = self.state == DecodeState::ReadingIdentifier;
        let decode: fn(&[u8]) -> Result<(u64, usize), WireError> =
            if reading_id { decode_raw } else { decode_masked };

        let bytes = *input;
        let completed = self
            .pending
            .field_length(bytes)
            .and_then(|length| Some((length, self.pending.complete(bytes, length, decode)?)));
        let Some((length, (decoded, taken))) = completed else {
            self.pending.stash(bytes);
            *input = &[];
            return Ok(false);
        };

        let (value, _) = decoded?;
        *input = &bytes[taken..];
        self.offset += length as u64;

        if reading_id {
            self.current_id = Identifier(value);
            self.current_id_len = length;
            self.state = DecodeState::ReadingSize;
            trace!("identifier {} ({length} bytes) before offset {}", self.current_id, self.offset);
        } else {
            trace!("size {value} ({length} bytes) for {}", self.current_id);
            self.open(value)?;
        }
        Ok(true)
    }

    /// Push the element whose header was just completed.
    fn open(&mut self, size: u64) -> Result<(), DecodeError> {
        let id = self.current_id;
        let is_container = self.callback.is_container(id);
        let end = self.offset.saturating_add(size);

        if let Some(parent) = self.nodes.top()
            && end > parent.end()
        {
            return Err(DecodeError::ElementOverrun {
                id,
                end,
                parent_end: parent.end(),
            });
        }
        if let Some(limit) = self.config.max_depth
            && self.nodes.len() >= limit
        {
            return Err(DecodeError::DepthExceeded { id, limit });
        }
        if !is_container
            && let Some(limit) = self.config.max_leaf_size
            && size > limit
        {
            return Err(DecodeError::LeafTooLarge { id, size, limit });
        }

        self.nodes.push(id, size, self.offset, is_container);
        debug!(
            "open {id} size={size} container={is_container} depth={}",
            self.nodes.len()
        );
        self.callback.open_element(id);

        if is_container {
            self.state = DecodeState::ReadingIdentifier;
            self.close_finished();
        } else {
            self.state = DecodeState::ReadingContent;
        }
        Ok(())
    }

    /// Gather the current leaf's content. Returns `false` once `input` is
    /// exhausted before the content is complete.
    fn read_content(&mut self, input: &mut &[u8]) -> bool {
        let offset = self.offset;
        let Some(leaf) = self.nodes.top_mut() else {
            debug_assert!(false, "reading content without an open leaf");
            self.state = DecodeState::ReadingIdentifier;
            return true;
        };

        let bytes = *input;
        let remaining = leaf.end() - offset;
        let available = bytes.len() as u64;

        if leaf.consumed(offset) == 0 && available >= remaining {
            // The whole content is in this slice: no copy.
            #[allow(clippy::cast_possible_truncation)]
            let (content, rest) = bytes.split_at(remaining as usize);
            trace!("leaf {} delivered in place ({remaining} bytes)", leaf.id);
            self.callback.deliver_content(content);
            *input = rest;
            self.offset += remaining;
        } else {
            #[allow(clippy::cast_possible_truncation)]
            let take = remaining.min(available) as usize;
            leaf.buffer.extend_from_slice(&bytes[..take]);
            *input = &bytes[take..];
            self.offset += take as u64;
            if (take as u64) < remaining {
                trace!("leaf {} buffered {} of {} bytes", leaf.id, leaf.buffer.len(), leaf.size);
                return false;
            }
            self.callback.deliver_content(&leaf.buffer);
        }

        self.state = DecodeState::ReadingIdentifier;
        self.close_finished();
        true
    }

    /// Pop every element that has consumed its declared size, innermost
    /// first, firing `close_element` for each.
    fn close_finished(&mut self) {
        while self.nodes.top().is_some_and(|node| node.end() == self.offset) {
            if let Some(id) = self.nodes.pop() {
                debug!("close {id} at offset {}", self.offset);
            }
            self.callback.close_element();
        }
    }

    /// Identifier of the innermost open element.
    #[must_use]
    pub fn current_open_identifier(&self) -> Option<Identifier> {
        self.nodes.top().map(|node| node.id)
    }

    /// Declared content size of the innermost open element.
    #[must_use]
    pub fn current_open_size(&self) -> Option<u64> {
        self.nodes.top().map(|node| node.size)
    }

    /// Number of open elements.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.nodes.len()
    }

    /// Bytes held back because the field they start is incomplete.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Stream offset up to which bytes have been interpreted.
    ///
    /// `offset() + pending_len()` is the total number of bytes fed.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// True between top-level elements: nothing open, nothing partial.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state == DecodeState::ReadingIdentifier && self.nodes.is_empty() && self.pending.is_empty()
    }

    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn callback(&self) -> &C {
        &self.callback
    }

    pub fn callback_mut(&mut self) -> &mut C {
        &mut self.callback
    }

    /// Give up the callback regardless of the stream's state.
    pub fn into_callback(self) -> C {
        self.callback
    }

    /// Check that the stream stopped on an element boundary.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Truncated`] if elements are open or a header is half
    /// read.
    pub fn check_complete(&self) -> Result<(), DecodeError> {
        if self.is_idle() {
            return Ok(());
        }
        let header_bytes = if self.state == DecodeState::ReadingSize {
            self.current_id_len
        } else {
            0
        };
        Err(DecodeError::Truncated {
            open_elements: self.nodes.len(),
            pending_bytes: self.pending.len() + header_bytes,
        })
    }

    /// Declare the end of the stream and return the callback.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Truncated`] as for [`check_complete`](Self::check_complete).
    /// Use [`into_callback`](Self::into_callback) to recover the callback
    /// of a truncated stream.
    pub fn finish(self) -> Result<C, DecodeError> {
        if let Err(e) = self.check_complete() {
            debug!("finish on truncated stream: {e}");
            return Err(e);
        }
        Ok(self.callback)
    }

    /// Drop all decoding state so a new stream can be fed.
    ///
    /// Open elements are discarded without `close_element`. Clears the
    /// poisoned flag.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.pending.clear();
        self.state = DecodeState::ReadingIdentifier;
        self.current_id = Identifier::default();
        self.current_id_len = 0;
        self.offset = 0;
        self.poisoned = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{DecoderEvent, EventCollector};
    use ebml_encoder::EbmlEncoder;

    const ROOT: u64 = 0x1A45_DFA3;
    const HEADER: u64 = 0x4286;
    const CHILD: u64 = 0x4287;
    const EMPTY: u64 = 0x81;
    const NAME: u64 = 0x4288;

    fn collector() -> EventCollector {
        EventCollector::new([Identifier(ROOT), Identifier(HEADER)])
    }

    fn decode_whole(bytes: &[u8]) -> Vec<DecoderEvent> {
        let mut decoder = StreamDecoder::new(collector());
        decoder.feed(bytes).unwrap();
        decoder.finish().unwrap().into_events()
    }

    fn decode_bytewise(bytes: &[u8]) -> Vec<DecoderEvent> {
        let mut decoder = StreamDecoder::new(collector());
        for byte in bytes {
            decoder.feed(std::slice::from_ref(byte)).unwrap();
        }
        decoder.finish().unwrap().into_events()
    }

    /// root { header { child=[7], empty=[] }, name="eeg" }
    fn sample() -> Vec<u8> {
        EbmlEncoder::new()
            .open_container(ROOT)
            .open_container(HEADER)
            .add_unsigned(CHILD, 7)
            .add_binary(EMPTY, b"")
            .close_container()
            .add_string(NAME, "eeg")
            .close_container()
            .encode()
            .unwrap()
    }

    fn open(id: u64) -> DecoderEvent {
        DecoderEvent::Open(Identifier(id))
    }

    fn data(bytes: &[u8]) -> DecoderEvent {
        DecoderEvent::Data(bytes.to_vec())
    }

    #[test]
    fn nested_event_order() {
        assert_eq!(
            decode_whole(&sample()),
            vec![
                open(ROOT),
                open(HEADER),
                open(CHILD),
                data(&[7]),
                DecoderEvent::Close,
                open(EMPTY),
                data(&[]),
                DecoderEvent::Close,
                DecoderEvent::Close,
                open(NAME),
                data(b"eeg"),
                DecoderEvent::Close,
                DecoderEvent::Close,
            ]
        );
    }

    #[test]
    fn bytewise_matches_whole() {
        let bytes = sample();
        assert_eq!(decode_bytewise(&bytes), decode_whole(&bytes));
    }

    #[test]
    fn every_split_point_matches_whole() {
        let bytes = sample();
        let expected = decode_whole(&bytes);
        for split in 1..bytes.len() {
            let mut decoder = StreamDecoder::new(collector());
            decoder.feed(&bytes[..split]).unwrap();
            decoder.feed(&bytes[split..]).unwrap();
            assert_eq!(decoder.finish().unwrap().into_events(), expected, "split at {split}");
        }
    }

    #[test]
    fn empty_feed_is_noop() {
        let mut decoder = StreamDecoder::new(collector());
        decoder.feed(&[]).unwrap();
        assert!(decoder.is_idle());
        assert_eq!(decoder.offset(), 0);
        assert!(decoder.callback().events().is_empty());
    }

    #[test]
    fn zero_size_leaf_at_end_of_chunk() {
        // Leaf 0x81 with size 0, fed exactly up to its size byte.
        let mut decoder = StreamDecoder::new(collector());
        decoder.feed(&[0x81, 0x80]).unwrap();
        assert!(decoder.is_idle());
        assert_eq!(decoder.offset(), 2);
        assert_eq!(
            decoder.callback().events(),
            &[open(EMPTY), data(&[]), DecoderEvent::Close]
        );
    }

    #[test]
    fn zero_size_container_closes_immediately() {
        let mut decoder = StreamDecoder::new(collector());
        decoder.feed(&hex::decode("1A45DFA380").unwrap()).unwrap();
        assert!(decoder.is_idle());
        assert_eq!(
            decoder.callback().events(),
            &[open(ROOT), DecoderEvent::Close]
        );
    }

    #[test]
    fn partial_content_is_buffered() {
        let mut decoder = StreamDecoder::new(collector());
        decoder.feed(&[0x42, 0x88, 0x83, b'e']).unwrap();
        assert_eq!(decoder.current_open_identifier(), Some(Identifier(NAME)));
        assert_eq!(decoder.current_open_size(), Some(3));
        assert_eq!(decoder.callback().events(), &[open(NAME)]);

        decoder.feed(b"e").unwrap();
        assert_eq!(decoder.callback().events().len(), 1);

        decoder.feed(b"g").unwrap();
        assert_eq!(
            decoder.callback().events(),
            &[open(NAME), data(b"eeg"), DecoderEvent::Close]
        );
        assert_eq!(decoder.current_open_identifier(), None);
    }

    #[test]
    fn two_byte_lookahead_waits_for_second_byte() {
        // Leaf 0x81, size as a 9-byte vint holding 2, then "hi".
        let bytes = hex::decode("81008000000000000002").unwrap();
        let mut decoder = StreamDecoder::new(collector());
        decoder.feed(&bytes[..2]).unwrap();
        assert_eq!(decoder.pending_len(), 1);
        assert!(decoder.callback().events().is_empty());

        decoder.feed(&bytes[2..]).unwrap();
        decoder.feed(b"hi").unwrap();
        assert_eq!(
            decoder.finish().unwrap().into_events(),
            vec![open(EMPTY), data(b"hi"), DecoderEvent::Close]
        );
    }

    #[test]
    fn finish_reports_open_elements() {
        let bytes = sample();
        let mut decoder = StreamDecoder::new(collector());
        decoder.feed(&bytes[..bytes.len() - 1]).unwrap();
        assert!(matches!(
            decoder.finish(),
            Err(DecodeError::Truncated { open_elements: 2, pending_bytes: 0 })
        ));
    }

    #[test]
    fn finish_reports_half_read_header() {
        let mut decoder = StreamDecoder::new(collector());
        decoder.feed(&[0x42, 0x88, 0x40]).unwrap();
        assert!(matches!(
            decoder.check_complete(),
            Err(DecodeError::Truncated { open_elements: 0, pending_bytes: 3 })
        ));
    }

    #[test]
    fn truncated_elements_fire_no_close() {
        let bytes = sample();
        let mut decoder = StreamDecoder::new(collector());
        decoder.feed(&bytes[..6]).unwrap();
        let events = decoder.into_callback().into_events();
        assert!(!events.contains(&DecoderEvent::Close));
    }

    #[test]
    fn child_overrunning_parent_is_rejected() {
        // Container of size 2 holding a leaf that declares 5 bytes.
        let mut decoder = StreamDecoder::new(collector());
        let result = decoder.feed(&[0x1A, 0x45, 0xDF, 0xA3, 0x82, 0x81, 0x85]);
        assert!(matches!(
            result,
            Err(DecodeError::ElementOverrun { id: Identifier(0x81), end: 12, parent_end: 7 })
        ));
        assert!(matches!(decoder.feed(&[0x00]), Err(DecodeError::Poisoned)));

        decoder.reset();
        decoder.feed(&[0x81, 0x80]).unwrap();
        assert!(decoder.is_idle());
    }

    #[test]
    fn leaf_size_limit() {
        let config = DecoderConfig {
            max_leaf_size: Some(2),
            ..DecoderConfig::default()
        };
        let mut decoder = StreamDecoder::with_config(collector(), config);
        decoder.feed(&[0x81, 0x82, 1, 2]).unwrap();
        let result = decoder.feed(&[0x81, 0x83]);
        assert!(matches!(
            result,
            Err(DecodeError::LeafTooLarge { size: 3, limit: 2, .. })
        ));
    }

    #[test]
    fn depth_limit() {
        let config = DecoderConfig {
            max_depth: Some(1),
            ..DecoderConfig::default()
        };
        let mut decoder = StreamDecoder::with_config(collector(), config);
        let result = decoder.feed(&sample());
        assert!(matches!(
            result,
            Err(DecodeError::DepthExceeded { id: Identifier(HEADER), limit: 1 })
        ));
    }

    #[test]
    fn sibling_top_level_elements() {
        let mut bytes = vec![0x81, 0x81, 0x2A];
        bytes.extend_from_slice(&[0x42, 0x88, 0x80]);
        assert_eq!(
            decode_whole(&bytes),
            vec![
                open(EMPTY),
                data(&[0x2A]),
                DecoderEvent::Close,
                open(NAME),
                data(&[]),
                DecoderEvent::Close,
            ]
        );
    }
}
