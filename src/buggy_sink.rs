/*! A sink that sums its input, with a classic loop bug.

This is a port of a GNURadio block written to have something to debug. Its
work function was:

```c
double sum = 0.0;
for (int counter = 0; counter += noutput_items - 1; ++counter)
    sum += in[counter];
std::cout << sum << std::endl;
return noutput_items;
```

The loop condition is an assignment, not a comparison. With `n` items the
counter goes `n-1, 2n-1, 3n-1, ...`, and never becomes zero. So for `n > 1`
the loop leaves the input buffer after the first read, and keeps going until
it hits unmapped memory.

There are two variants, and which one you get is always chosen at
construction:

* [`BuggySink::new`]: sums exactly the first `n` samples, and reports short
  input as [`Error::OutOfRange`].
* [`BuggySink::new_faithful`]: runs the broken loop. Through
  [`Block::work`] it reads raw memory and will crash the process for any
  call with more than one sample available.

Both return `n` from a call, even though the block has no outputs. The
scheduler uses it as the number of input samples consumed.
*/
use std::io::Write;

use log::{debug, trace, warn};

use crate::block::{Block, BlockRet};
use crate::cout::format_double;
use crate::signature::{IoSignature, Signature};
use crate::stream::ReadStream;
use crate::view::{SampleView, Unchecked};
use crate::{Error, Float, Result};

/// Which loop the sink runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Sum the first `n` samples. Never reads outside them.
    Bounded,

    /// The loop as originally written.
    Faithful,
}

/// Indices read by `for (counter = 0; counter += n - 1; ++counter)`.
///
/// For `n` of zero or one, the indices of the first `n` samples. The broken
/// condition only kicks in above that. For `n >= 2` the iterator is endless,
/// apart from wrapping around after `usize::MAX`.
pub fn faithful_indices(n: usize) -> impl Iterator<Item = usize> {
    let stride = n.saturating_sub(1);
    let mut counter = 0usize;
    let mut first = true;
    std::iter::from_fn(move || {
        if n < 2 {
            if n == 1 && first {
                first = false;
                return Some(0);
            }
            return None;
        }
        counter = counter.wrapping_add(stride);
        if counter == 0 {
            return None;
        }
        let idx = counter;
        counter = counter.wrapping_add(1);
        Some(idx)
    })
}

/// Sum exactly the first `n` samples of the view.
pub fn bounded_sum<V: SampleView + ?Sized>(n: usize, view: &V) -> Result<f64> {
    if n > view.len() {
        return Err(Error::OutOfRange {
            requested: n,
            available: view.len(),
        });
    }
    let mut sum = 0.0f64;
    for index in 0..n {
        let v = view.read(index).ok_or(Error::Fault {
            index,
            len: view.len(),
        })?;
        sum += f64::from(v);
    }
    Ok(sum)
}

/// Sum the way the broken loop does.
///
/// Stops at the first read the view refuses, reporting it as
/// [`Error::Fault`]. An [`Unchecked`] view never refuses.
pub fn faithful_sum<V: SampleView + ?Sized>(n: usize, view: &V) -> Result<f64> {
    let mut sum = 0.0f64;
    for index in faithful_indices(n) {
        let Some(v) = view.read(index) else {
            return Err(Error::Fault {
                index,
                len: view.len(),
            });
        };
        sum += f64::from(v);
    }
    Ok(sum)
}

fn print_sum(out: &mut dyn Write, sum: f64) -> Result<()> {
    writeln!(out, "{}", format_double(sum))?;
    Ok(())
}

/// Sink that prints the sum of its input on every call.
pub struct BuggySink {
    src: ReadStream<Float>,
    out: Box<dyn Write + Send>,
    mode: Mode,
}

impl BuggySink {
    /// Create new sink that sums exactly the samples it's given.
    #[must_use]
    pub fn new(src: ReadStream<Float>) -> Self {
        Self {
            src,
            out: Box::new(std::io::stdout()),
            mode: Mode::Bounded,
        }
    }

    /// Create new sink that runs the broken loop.
    ///
    /// # Safety
    ///
    /// When run from [`Block::work`] with more than one sample available,
    /// the block reads past the end of its input buffer. That is undefined
    /// behaviour, and expected to crash the process. Only construct this to
    /// demonstrate exactly that, or when every call is known to see at most
    /// one sample.
    #[must_use]
    pub unsafe fn new_faithful(src: ReadStream<Float>) -> Self {
        warn!("BuggySink: running the broken loop. Expect out of bounds reads.");
        Self {
            src,
            out: Box::new(std::io::stdout()),
            mode: Mode::Faithful,
        }
    }

    /// Write sums to `w` instead of stdout.
    #[must_use]
    pub fn with_writer<W: Write + Send + 'static>(mut self, w: W) -> Self {
        self.out = Box::new(w);
        self
    }

    /// Return the mode this sink was constructed with.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Process `noutput_items` samples from a slice, and print the sum.
    ///
    /// Safe in both modes: out of range reads are refused and returned as
    /// [`Error::Fault`] (faithful) or [`Error::OutOfRange`] (bounded).
    pub fn process(&mut self, noutput_items: usize, input: &[Float]) -> Result<usize> {
        self.process_view(noutput_items, input)
    }

    /// Process `noutput_items` samples from any view, and print the sum.
    ///
    /// Returns `noutput_items`. Nothing is printed on error.
    pub fn process_view<V: SampleView + ?Sized>(
        &mut self,
        noutput_items: usize,
        view: &V,
    ) -> Result<usize> {
        let sum = match self.mode {
            Mode::Bounded => bounded_sum(noutput_items, view)?,
            Mode::Faithful => faithful_sum(noutput_items, view)?,
        };
        trace!("BuggySink: {noutput_items} items, sum {sum}");
        print_sum(&mut self.out, sum)?;
        Ok(noutput_items)
    }

    /// Read the byte at `addr`, widened to an int.
    ///
    /// # Safety
    ///
    /// Same as [`read_byte_at`](crate::peek::read_byte_at): `addr` must be
    /// a readable byte.
    #[must_use]
    pub unsafe fn get_address(&self, addr: usize) -> i32 {
        // SAFETY: upheld by caller.
        i32::from(unsafe { crate::peek::read_byte_at(addr) })
    }
}

impl Block for BuggySink {
    fn block_name(&self) -> &str {
        "BuggySink"
    }
    fn signature(&self) -> Signature {
        Signature {
            input: IoSignature::of::<Float>(1),
            output: IoSignature::empty(),
        }
    }
    fn work(&mut self) -> Result<BlockRet<'_>> {
        let i = self.src.read_buf()?;
        let n = i.len();
        if n == 0 {
            return Ok(BlockRet::WaitForStream(&self.src, 1));
        }
        let sum = match self.mode {
            Mode::Bounded => bounded_sum(n, i.slice())?,
            Mode::Faithful => {
                if n > 1 {
                    debug!("BuggySink: faithful loop with {n} items, reading out of bounds");
                }
                // SAFETY: Faithful mode is only set by new_faithful(), whose
                // caller accepted the out of range reads.
                let view = unsafe { Unchecked::new(i.slice()) };
                faithful_sum(n, &view)?
            }
        };
        print_sum(&mut self.out, sum)?;
        i.consume(n);
        Ok(BlockRet::Again)
    }
    fn eof(&mut self) -> bool {
        self.src.eof()
    }
}
