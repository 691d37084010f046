//! Adapters that pull bytes from a reader and push them into a decoder.
//!
//! The decoder itself never performs I/O. These helpers are the thin
//! byte-sourcing layer for the common cases of a file, a socket, or any
//! other `Read` / `AsyncRead` source: read a chunk, `feed` it, repeat until
//! end of input.

use std::io::{ErrorKind, Read};

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::callback::DecoderCallback;
use crate::decoder::StreamDecoder;
use crate::error::DecodeError;

impl<C: DecoderCallback> StreamDecoder<C> {
    /// Feed everything `reader` yields, in chunks of
    /// [`DecoderConfig::read_chunk_size`](crate::DecoderConfig::read_chunk_size).
    ///
    /// Reaching end of input does not finish the decoder; call
    /// [`finish`](Self::finish) to check for truncation.
    ///
    /// # Returns
    ///
    /// The number of bytes read.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Io`] on a read failure, or any error from
    /// [`feed`](Self::feed).
    pub fn feed_reader<R: Read>(&mut self, mut reader: R) -> Result<u64, DecodeError> {
        let mut buf = vec![0u8; self.config().read_chunk_size.max(1)];
        let mut total = 0u64;
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => return Ok(total),
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(DecodeError::Io(e)),
            };
            self.feed(&buf[..n])?;
            total += n as u64;
        }
    }

    /// Asynchronous counterpart of [`feed_reader`](Self::feed_reader).
    ///
    /// Suspends only while waiting on `reader`; each chunk is decoded to
    /// completion before the next read is issued.
    ///
    /// # Errors
    ///
    /// Same as [`feed_reader`](Self::feed_reader).
    pub async fn feed_async_reader<R: AsyncRead + Unpin>(
        &mut self,
        mut reader: R,
    ) -> Result<u64, DecodeError> {
        let mut buf = vec![0u8; self.config().read_chunk_size.max(1)];
        let mut total = 0u64;
        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                return Ok(total);
            }
            self.feed(&buf[..n])?;
            total += n as u64;
        }
    }
}
