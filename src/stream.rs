/*! Streams connecting blocks.

Blocks are connected with streams. A block can have zero or more input
streams, and write to zero or more output streams.

A stream has exactly one writer and one reader. When the writer is dropped
the stream is closed, and the reader sees EOF once it's read everything.
When the reader is dropped, the writer can tell nobody is listening.
*/
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::circular_buffer::{Buffer, BufferReader, BufferWriter};
use crate::{Result, Sample};

/// Default stream size, in samples.
pub const DEFAULT_STREAM_SIZE: usize = 8192;

struct Inner<T> {
    circ: Buffer<T>,
    closed: AtomicBool,
    reader_gone: AtomicBool,
}

/// Something the scheduler can wait on.
pub trait StreamWait {
    /// True if the writing end is gone. There may still be data to read.
    fn closed(&self) -> bool;
}

/// Reading end of a stream.
pub struct ReadStream<T> {
    inner: Arc<Inner<T>>,
}

/// Writing end of a stream.
pub struct WriteStream<T> {
    inner: Arc<Inner<T>>,
}

/// Create a new stream with the default size.
pub fn new_stream<T: Sample>() -> (WriteStream<T>, ReadStream<T>) {
    new_stream_with_size(DEFAULT_STREAM_SIZE).unwrap() // unwrap: size is non-zero.
}

/// Create a new stream with room for `size` samples.
pub fn new_stream_with_size<T: Sample>(size: usize) -> Result<(WriteStream<T>, ReadStream<T>)> {
    let inner = Arc::new(Inner {
        circ: Buffer::new(size)?,
        closed: AtomicBool::new(false),
        reader_gone: AtomicBool::new(false),
    });
    Ok((
        WriteStream {
            inner: inner.clone(),
        },
        ReadStream { inner },
    ))
}

/// Create a new stream, already holding `data`.
pub fn streamp_from_slice<T: Sample>(data: &[T]) -> Result<(WriteStream<T>, ReadStream<T>)> {
    let (w, r) = new_stream_with_size(std::cmp::max(data.len(), DEFAULT_STREAM_SIZE))?;
    let mut o = w.write_buf()?;
    o.slice()[..data.len()].copy_from_slice(data);
    o.produce(data.len());
    Ok((w, r))
}

impl<T: Sample> ReadStream<T> {
    /// Return a read slice.
    ///
    /// The only reason for returning error should be if the stream lock
    /// is poisoned.
    pub fn read_buf(&self) -> Result<BufferReader<'_, T>> {
        self.inner.circ.read_buf()
    }

    /// True if the writer is gone and everything has been read.
    pub fn eof(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
            && self.inner.circ.available().map(|n| n == 0).unwrap_or(true)
    }
}

impl<T> Drop for ReadStream<T> {
    fn drop(&mut self) {
        self.inner.reader_gone.store(true, Ordering::SeqCst);
    }
}

impl<T> StreamWait for ReadStream<T> {
    fn closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }
}

impl<T: Sample> WriteStream<T> {
    /// Return a write slice.
    ///
    /// The only reason for returning error should be if the stream lock
    /// is poisoned.
    pub fn write_buf(&self) -> Result<BufferWriter<'_, T>> {
        self.inner.circ.write_buf()
    }

    /// True if the reading end has been dropped.
    pub fn reader_gone(&self) -> bool {
        self.inner.reader_gone.load(Ordering::SeqCst)
    }
}

impl<T> Drop for WriteStream<T> {
    fn drop(&mut self) {
        self.inner.closed.store(true, Ordering::SeqCst);
    }
}
