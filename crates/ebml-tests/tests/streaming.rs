//! Reader adapters: decoding straight from `Read` and `AsyncRead` sources.

use std::io::Cursor;

use ebml_decoder::{DecodeError, DecoderConfig, StreamDecoder};
use ebml_tests::{collector, decode_whole, signal_stream};
use tokio::io::AsyncWriteExt;

fn config(read_chunk_size: usize) -> DecoderConfig {
    DecoderConfig {
        read_chunk_size,
        ..DecoderConfig::default()
    }
}

#[test]
fn reader_with_various_chunk_sizes() {
    let bytes = signal_stream(4, 32);
    let whole = decode_whole(&bytes).unwrap();
    for chunk in [1, 7, 64, 8192] {
        let mut decoder = StreamDecoder::with_config(collector(), config(chunk));
        let read = decoder.feed_reader(Cursor::new(&bytes)).unwrap();
        assert_eq!(read, bytes.len() as u64);
        assert_eq!(decoder.finish().unwrap().into_events(), whole, "chunk {chunk}");
    }
}

#[test]
fn reader_can_be_resumed() {
    let bytes = signal_stream(2, 8);
    let (head, tail) = bytes.split_at(41);
    let mut decoder = StreamDecoder::new(collector());
    decoder.feed_reader(head).unwrap();
    assert!(decoder.check_complete().is_err());
    decoder.feed_reader(tail).unwrap();
    assert_eq!(decoder.finish().unwrap().into_events(), decode_whole(&bytes).unwrap());
}

#[tokio::test]
async fn async_pipe_delivers_events_while_writing() {
    let bytes = signal_stream(8, 16);
    let (mut writer, reader) = tokio::io::duplex(64);

    let producer = {
        let bytes = bytes.clone();
        tokio::spawn(async move {
            for chunk in bytes.chunks(50) {
                writer.write_all(chunk).await?;
            }
            writer.shutdown().await
        })
    };

    let mut decoder = StreamDecoder::with_config(collector(), config(33));
    let read = decoder.feed_async_reader(reader).await.unwrap();
    producer.await.unwrap().unwrap();

    assert_eq!(read, bytes.len() as u64);
    assert_eq!(decoder.finish().unwrap().into_events(), decode_whole(&bytes).unwrap());
}

#[tokio::test]
async fn async_reader_surfaces_decode_errors() {
    // Child declares 5 bytes inside a 1-byte parent.
    let bytes = vec![0x1A, 0x45, 0xDF, 0xA3, 0x81, 0x81, 0x85];
    let mut decoder = StreamDecoder::new(collector());
    let err = decoder.feed_async_reader(Cursor::new(bytes)).await.unwrap_err();
    assert!(matches!(err, DecodeError::ElementOverrun { .. }));
}
