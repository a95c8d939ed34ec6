//! Sample buffer behind a stream.
//!
//! A fixed size buffer with a read position and a write position. Readers
//! get a slice of what has been written but not consumed. Writers get a
//! slice of free space, after unread samples have been moved to the front.
use std::sync::{Mutex, MutexGuard};

use log::trace;

use crate::{Error, Result, Sample};

struct State<T> {
    rpos: usize,
    wpos: usize,
    buf: Vec<T>,
}

/// Type aware buffer.
pub struct Buffer<T> {
    state: Mutex<State<T>>,
}

impl<T: Sample> Buffer<T> {
    /// Create a new Buffer, with room for `size` samples.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::msg("zero sized buffer"));
        }
        Ok(Self {
            state: Mutex::new(State {
                rpos: 0,
                wpos: 0,
                buf: vec![T::default(); size],
            }),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, State<T>>> {
        self.state
            .lock()
            .map_err(|_| Error::msg("buffer lock poisoned"))
    }

    /// Number of samples written but not yet consumed.
    pub fn available(&self) -> Result<usize> {
        let s = self.lock()?;
        Ok(s.wpos - s.rpos)
    }

    /// Get the read slice.
    ///
    /// The buffer stays locked until the reader is dropped or consumed.
    pub fn read_buf(&self) -> Result<BufferReader<'_, T>> {
        Ok(BufferReader { state: self.lock()? })
    }

    /// Get the write slice.
    ///
    /// The buffer stays locked until the writer is dropped or produced.
    pub fn write_buf(&self) -> Result<BufferWriter<'_, T>> {
        let mut state = self.lock()?;
        if state.rpos > 0 {
            let (r, w) = (state.rpos, state.wpos);
            trace!("Compacting buffer: moving {} samples", w - r);
            state.buf.copy_within(r..w, 0);
            state.wpos = w - r;
            state.rpos = 0;
        }
        Ok(BufferWriter { state })
    }
}

/// Read slice of a buffer.
pub struct BufferReader<'a, T> {
    state: MutexGuard<'a, State<T>>,
}

impl<T: Sample> BufferReader<'_, T> {
    /// Number of readable samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.wpos - self.state.rpos
    }

    /// True if there is nothing to read.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The readable samples.
    #[must_use]
    pub fn slice(&self) -> &[T] {
        &self.state.buf[self.state.rpos..self.state.wpos]
    }

    /// Consume samples, so they won't be read again.
    pub fn consume(mut self, n: usize) {
        assert!(
            n <= self.len(),
            "Consumed too much: {} > {}",
            n,
            self.len()
        );
        self.state.rpos += n;
        if self.state.rpos == self.state.wpos {
            self.state.rpos = 0;
            self.state.wpos = 0;
        }
    }
}

/// Write slice of a buffer.
pub struct BufferWriter<'a, T> {
    state: MutexGuard<'a, State<T>>,
}

impl<T: Sample> BufferWriter<'_, T> {
    /// Number of samples there's room for.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.buf.len() - self.state.wpos
    }

    /// True if there's no room to write, i.e. the buffer is full.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The writable space.
    #[must_use]
    pub fn slice(&mut self) -> &mut [T] {
        let w = self.state.wpos;
        &mut self.state.buf[w..]
    }

    /// Produce samples (commit writes).
    pub fn produce(mut self, n: usize) {
        assert!(
            n <= self.len(),
            "can't produce that much. {} < {}",
            self.len(),
            n
        );
        self.state.wpos += n;
    }
}
