/*! A deliberately broken SDR sink block, and just enough of a streaming
framework to run it.

The interesting part is [`buggy_sink::BuggySink`]. It accepts one stream of
[`Float`] samples, has no outputs, and on every call to its work function
sums the samples it was given and prints the sum.

Its loop is the classic typo:

```c
for (int counter = 0; counter += noutput_items - 1; ++counter)
    sum += in[counter];
```

`+=` was meant to be `<`. For more than one input item the loop strides
through memory well past the end of the input buffer, until something
segfaults. That's the point: it's a target for practicing with debuggers,
sanitizers and fuzzers.

The block comes in two explicitly chosen variants:

* [`BuggySink::new`](buggy_sink::BuggySink::new) sums exactly the samples it
  was asked to, and reports short input as [`Error::OutOfRange`].
* [`BuggySink::new_faithful`](buggy_sink::BuggySink::new_faithful) runs the
  broken loop as written. It's `unsafe` to construct, because running it is
  undefined behaviour.

# Architecture overview

Like GNURadio, an application consists of blocks connected by
unidirectional streams. Signal flows from sources (no input streams) to
sinks (no output streams).

The graph the original QA test builds is:

```text
  [ VectorSource 0..10 ]
           ↓
      [ Head 1e6 ]
           ↓
     [ BuggySink ]
```

# Example

```
use debugme::blockchain;
use debugme::blocks::{BuggySink, Head, VectorSource};
use debugme::graph::{Graph, GraphRunner};

let mut g = Graph::new();
let prev = blockchain![
    g,
    prev,
    VectorSource::new((0..10).map(|x| x as debugme::Float).collect()),
    Head::new(prev, 1_000_000),
];
g.add(Box::new(BuggySink::new(prev)));
g.run()?;
# Ok::<(), anyhow::Error>(())
```
*/

pub mod buggy_sink;
pub mod head;
pub mod vector_source;

pub mod block;
pub mod blocks;
pub mod circular_buffer;
pub mod cout;
pub mod graph;
pub mod peek;
pub mod signature;
pub mod stream;
pub mod view;

/// Float type used for samples.
pub type Float = f32;

/// Error type for this crate.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// IO error, usually when writing the sum.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Asked to process more samples than were available.
    #[error("asked for {requested} samples, but only {available} available")]
    OutOfRange {
        /// Number of samples asked for.
        requested: usize,
        /// Number of samples in the input.
        available: usize,
    },

    /// A sample view refused to read past the end of its input.
    #[error("read of index {index} past end of {len} sample input")]
    Fault {
        /// Index that was read.
        index: usize,
        /// Number of valid samples.
        len: usize,
    },

    /// Bad stream signature.
    #[error("stream signature: {0}")]
    Signature(String),

    /// Error with added context.
    #[error("{msg}: {source}")]
    Wrap {
        /// Context.
        msg: String,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Plain message.
    #[error("{0}")]
    Msg(String),
}

impl Error {
    /// Create error from message.
    pub fn msg<S: Into<String>>(msg: S) -> Self {
        Self::Msg(msg.into())
    }

    /// Wrap an error with some context.
    pub fn wrap<E, S>(e: E, msg: S) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
        S: Into<String>,
    {
        Self::Wrap {
            msg: msg.into(),
            source: Box::new(e),
        }
    }
}

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Repeat between zero and infinite times.
#[derive(Debug)]
pub struct Repeat {
    repeater: Repeater,
    count: u64,
}

impl Repeat {
    /// Repeat finite number of times. 0 Means not even once. 1 is default.
    #[must_use]
    pub fn finite(n: u64) -> Self {
        Self {
            repeater: Repeater::Finite(n),
            count: 0,
        }
    }

    /// Repeat infinite number of times.
    #[must_use]
    pub fn infinite() -> Self {
        Self {
            repeater: Repeater::Infinite,
            count: 0,
        }
    }

    /// Register a repeat being done, and return true if we should continue.
    #[must_use]
    pub fn again(&mut self) -> bool {
        self.count += 1;
        match self.repeater {
            Repeater::Finite(n) => {
                let n = n.saturating_sub(1);
                self.repeater = Repeater::Finite(n);
                n > 0
            }
            Repeater::Infinite => true,
        }
    }

    /// Return true if repeating is done.
    #[must_use]
    pub fn done(&self) -> bool {
        match self.repeater {
            Repeater::Finite(n) => n == 0,
            Repeater::Infinite => false,
        }
    }

    /// Return how many repeats have fully completed.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl Default for Repeat {
    fn default() -> Self {
        Self::finite(1)
    }
}

#[derive(Debug)]
enum Repeater {
    Finite(u64),
    Infinite,
}

/// A trait all sample types must implement.
pub trait Sample: Copy + Default + Send + Sync + std::fmt::Debug + 'static {
    /// The serialized size of one sample.
    fn size() -> usize;

    /// Parse one sample.
    fn parse(data: &[u8]) -> Result<Self>;

    /// Serialize one sample.
    fn serialize(&self) -> Vec<u8>;
}

impl Sample for Float {
    fn size() -> usize {
        std::mem::size_of::<Self>()
    }
    fn parse(data: &[u8]) -> Result<Self> {
        let b: [u8; 4] = data
            .try_into()
            .map_err(|_| Error::msg(format!("Float is wrong size: {}", data.len())))?;
        Ok(Float::from_le_bytes(b))
    }
    fn serialize(&self) -> Vec<u8> {
        Float::to_le_bytes(*self).to_vec()
    }
}

impl Sample for u8 {
    fn size() -> usize {
        std::mem::size_of::<Self>()
    }
    fn parse(data: &[u8]) -> Result<Self> {
        match data {
            [b] => Ok(*b),
            _ => Err(Error::msg(format!("u8 is wrong size: {}", data.len()))),
        }
    }
    fn serialize(&self) -> Vec<u8> {
        vec![*self]
    }
}

/// Parse a byte buffer of serialized samples.
///
/// Trailing partial samples are an error.
pub fn parse_samples<T: Sample>(data: &[u8]) -> Result<Vec<T>> {
    let chunks = data.chunks_exact(T::size());
    if !chunks.remainder().is_empty() {
        return Err(Error::msg(format!(
            "{} trailing bytes after last whole sample",
            chunks.remainder().len()
        )));
    }
    chunks.map(T::parse).collect()
}

/// Parse verbosity like "info" or "debug", or a number, for stderrlog.
pub fn parse_verbosity(s: &str) -> std::result::Result<usize, String> {
    match s {
        "error" => Ok(0),
        "warn" => Ok(1),
        "info" => Ok(2),
        "debug" => Ok(3),
        "trace" => Ok(4),
        n => n
            .parse()
            .map_err(|_| format!("invalid verbosity level {n:?}")),
    }
}

/** Add a linear chain of blocks to a graph.

Every constructor returns `(block, output stream)`. The block is added to
the graph, and the output stream is bound to `prev` for the next
constructor. The last output stream is returned.

```
use debugme::blockchain;
use debugme::blocks::{Head, VectorSource};
use debugme::graph::Graph;
let mut g = Graph::new();
let prev = blockchain![
    g,
    prev,
    VectorSource::new(vec![1u8, 2, 3]),
    Head::new(prev, 2),
];
# let _ = prev;
```
*/
#[macro_export]
macro_rules! blockchain {
    ($g:ident, $prev:ident, $($cons:expr),* $(,)?) => {{
        $(
            let (block, $prev) = $cons;
            $crate::graph::GraphRunner::add(&mut $g, Box::new(block));
        )*
        $prev
    }};
}
