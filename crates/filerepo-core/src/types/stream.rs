//! Byte stream type carrying upload content into the ingestion pipeline.

use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;
use futures::stream;

/// A byte stream type used for reading upload contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Build a [`ByteStream`] from an in-memory list of chunks.
pub fn byte_stream_from<I>(chunks: I) -> ByteStream
where
    I: IntoIterator<Item = Bytes>,
    I::IntoIter: Send + 'static,
{
    Box::pin(stream::iter(chunks.into_iter().map(Ok)))
}
