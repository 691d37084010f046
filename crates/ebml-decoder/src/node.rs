use std::mem;

use ebml_wire::Identifier;

/// One open element on the path from the root to the current position.
///
/// Consumption is derived from the decoder's absolute offset rather than
/// counted per node, so completing a field never walks the stack.
#[derive(Debug)]
pub(crate) struct ElementNode {
    pub(crate) id: Identifier,

    /// Declared content size.
    pub(crate) size: u64,

    /// Absolute offset of the first content byte.
    pub(crate) content_start: u64,

    /// Content gathered across `feed` calls. Always empty for containers
    /// and for leaves delivered straight from the input slice.
    pub(crate) buffer: Vec<u8>,
}

impl ElementNode {
    /// Absolute offset one past the last content byte.
    pub(crate) fn end(&self) -> u64 {
        self.content_start.saturating_add(self.size)
    }

    pub(crate) fn consumed(&self, offset: u64) -> u64 {
        offset - self.content_start
    }
}

/// Stack of open elements.
///
/// Only a leaf buffers content and a leaf never has children, so at most
/// one buffer is in use at any time. The stack keeps that single buffer
/// around between leaves instead of allocating one per element.
#[derive(Debug)]
pub(crate) struct NodeStack {
    nodes: Vec<ElementNode>,
    spare: Vec<u8>,
    retained_capacity: usize,
}

impl NodeStack {
    pub(crate) fn new(depth_capacity: usize, retained_capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(depth_capacity),
            spare: Vec::new(),
            retained_capacity,
        }
    }

    pub(crate) fn push(&mut self, id: Identifier, size: u64, content_start: u64, is_container: bool) {
        let buffer = if is_container {
            Vec::new()
        } else {
            mem::take(&mut self.spare)
        };
        self.nodes.push(ElementNode {
            id,
            size,
            content_start,
            buffer,
        });
    }

    /// Remove the innermost node, keeping its buffer for the next leaf.
    pub(crate) fn pop(&mut self) -> Option<Identifier> {
        let node = self.nodes.pop()?;
        self.recycle(node.buffer);
        Some(node.id)
    }

    /// Drop every open node without reporting them.
    pub(crate) fn clear(&mut self) {
        while self.pop().is_some() {}
    }

    fn recycle(&mut self, mut buffer: Vec<u8>) {
        if buffer.capacity() == 0 || buffer.capacity() > self.retained_capacity {
            return;
        }
        buffer.clear();
        self.spare = buffer;
    }

    pub(crate) fn top(&self) -> Option<&ElementNode> {
        self.nodes.last()
    }

    pub(crate) fn top_mut(&mut self) -> Option<&mut ElementNode> {
        self.nodes.last_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
