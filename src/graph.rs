/*! Graphs contain blocks connected by streams, and run them.
 */
use std::time::Instant;

use log::{debug, info, trace};

use crate::block::{Block, BlockRet};
use crate::{Error, Result};

/**
Abstraction over graph executors.
*/
pub trait GraphRunner {
    /// Add a block to the graph.
    fn add(&mut self, b: Box<dyn Block + Send>);

    /// Run the graph.
    ///
    /// Runs the graph until all the blocks are EOF, or until the graph is
    /// cancelled. A pass where no block makes progress is an error.
    fn run(&mut self) -> Result<()>;

    /// Return a string with stats about where time went.
    fn generate_stats(&self) -> Option<String>;

    /// Return a cancellation token, for asynchronously stopping the
    /// graph, for example if the user presses Ctrl-C.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use debugme::graph::GraphRunner;
    /// let mut g = debugme::graph::Graph::new();
    /// let cancel = g.cancel_token();
    /// ctrlc::set_handler(move || {
    ///     cancel.cancel();
    /// }).expect("failed to set Ctrl-C handler");
    /// g.run()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    fn cancel_token(&self) -> CancellationToken;
}

/**
A graph is a thing that runs blocks, letting them "talk to each other" via
streams.

Blocks are run in the order they were added, on the calling thread. A block
that reaches EOF is dropped, which closes its output streams so that
downstream blocks see EOF too. The order blocks are added in doesn't change
the result, only how many passes it takes.

# Example

```
use debugme::graph::{Graph, GraphRunner};
use debugme::blocks::{BuggySink, Head, VectorSource};
let (src, prev) = VectorSource::new(vec![1.0, 2.0, 3.0]);
let (head, prev) = Head::new(prev, 2);
let sink = BuggySink::new(prev);
let mut g = Graph::new();
g.add(Box::new(src));
g.add(Box::new(head));
g.add(Box::new(sink));
g.run()?;
# Ok::<(), anyhow::Error>(())
```
*/
pub struct Graph {
    spent_time: Option<std::time::Duration>,
    spent_cpu_time: Option<std::time::Duration>,
    blocks: Vec<Option<Box<dyn Block + Send>>>,
    names: Vec<String>,
    cancel_token: CancellationToken,
    times: Vec<std::time::Duration>,
    cpu_times: Vec<std::time::Duration>,
}

impl Graph {
    /// Create a new flowgraph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            spent_time: None,
            spent_cpu_time: None,
            blocks: Vec::new(),
            names: Vec::new(),
            times: Vec::new(),
            cpu_times: Vec::new(),
            cancel_token: CancellationToken::new(),
        }
    }
}

#[must_use]
pub(crate) fn get_cpu_time() -> std::time::Duration {
    use libc::{CLOCK_PROCESS_CPUTIME_ID, clock_gettime, timespec};
    // SAFETY: Zeroing out a timespec struct is just all zeroes.
    let mut ts: timespec = unsafe { std::mem::zeroed() };
    // SAFETY: Local variable written by C function.
    let rc = unsafe { clock_gettime(CLOCK_PROCESS_CPUTIME_ID, &mut ts) };
    if rc != 0 {
        panic!("clock_gettime()");
    }
    std::time::Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32)
}

impl GraphRunner for Graph {
    fn add(&mut self, b: Box<dyn Block + Send>) {
        debug!("Adding block {} ({})", b.block_name(), b.signature());
        self.names.push(b.block_name().to_owned());
        self.blocks.push(Some(b));
    }

    fn run(&mut self) -> Result<()> {
        let st = Instant::now();
        let start_run_cpu = get_cpu_time();
        self.times
            .resize(self.blocks.len(), std::time::Duration::default());
        self.cpu_times
            .resize(self.blocks.len(), std::time::Duration::default());
        loop {
            if self.cancel_token.is_canceled() {
                info!("Graph cancelled");
                break;
            }
            if self.blocks.iter().all(Option::is_none) {
                debug!("All blocks EOF");
                break;
            }
            let mut progress = false;
            for (n, slot) in self.blocks.iter_mut().enumerate() {
                let Some(b) = slot.as_mut() else {
                    continue;
                };
                let name = &self.names[n];
                let st = Instant::now();
                let st_cpu = get_cpu_time();
                let ret = b
                    .work()
                    .map_err(|e| Error::wrap(e, format!("in block {name}")))?;
                let eof = match ret {
                    BlockRet::Again => {
                        progress = true;
                        false
                    }
                    BlockRet::Noop => false,
                    BlockRet::WaitForStream(stream, _need) => {
                        let closed = stream.closed();
                        closed && b.eof()
                    }
                    BlockRet::EOF => true,
                };
                self.times[n] += st.elapsed();
                self.cpu_times[n] += get_cpu_time() - st_cpu;
                if eof {
                    info!("{name} EOF, exiting");
                    // Dropping the block closes its output streams.
                    *slot = None;
                    progress = true;
                }
            }
            if !progress {
                // Single threaded, so another pass would see the same thing.
                let stuck: Vec<&str> = self
                    .blocks
                    .iter()
                    .zip(&self.names)
                    .filter(|(b, _)| b.is_some())
                    .map(|(_, name)| name.as_str())
                    .collect();
                trace!("Stalled pass, blocks left: {stuck:?}");
                return Err(Error::msg(format!(
                    "graph stalled with blocks not at EOF: {}",
                    stuck.join(", ")
                )));
            }
        }
        self.spent_time = Some(st.elapsed());
        self.spent_cpu_time = Some(get_cpu_time() - start_run_cpu);
        if let Some(stats) = self.generate_stats() {
            for line in stats.split('\n') {
                if !line.is_empty() {
                    info!("{line}");
                }
            }
        }
        Ok(())
    }

    fn generate_stats(&self) -> Option<String> {
        let elapsed = self.spent_time?;
        let elapsed_cpu = self.spent_cpu_time?.as_secs_f64();
        let total = self
            .times
            .iter()
            .cloned()
            .sum::<std::time::Duration>()
            .as_secs_f64();
        let block_cpu = self
            .cpu_times
            .iter()
            .cloned()
            .sum::<std::time::Duration>()
            .as_secs_f64();
        let ml = self.names.iter().map(|n| n.len()).max()?;
        let ml = std::cmp::max(ml, "Elapsed seconds".len());
        let elapsed = elapsed.as_secs_f64();

        let dashes = "-".repeat(ml + 46) + "\n";
        let (secw, secd) = (10, 3);
        let (pw, pd) = (7, 2);

        let mut s: String = format!(
            "{:<width$}    Seconds  Percent    CPU sec     CPU%   Mul\n",
            "Block name",
            width = ml
        );
        s.push_str(&dashes);
        for (n, name) in self.names.iter().enumerate() {
            s.push_str(&format!(
                "{:<width$} {:secw$.secd$} {:>pw$.pd$}% {:secw$.secd$} {:>pw$.pd$}% {:5.1}\n",
                name,
                self.times[n].as_secs_f32(),
                100.0 * self.times[n].as_secs_f64() / total,
                self.cpu_times[n].as_secs_f32(),
                100.0 * self.cpu_times[n].as_secs_f64() / block_cpu,
                self.cpu_times[n].as_secs_f32() / self.times[n].as_secs_f32(),
                width = ml,
            ));
        }
        s.push_str(&dashes);
        s.push_str(&format!(
            "{:<width$} {total:secw$.secd$} {:>pw$.pd$}% {block_cpu:secw$.secd$} {:>pw$.pd$}% {:5.1}\n",
            "All blocks",
            100.0 * total / elapsed,
            100.0 * block_cpu / elapsed_cpu,
            block_cpu / elapsed,
            width = ml,
        ));
        s.push_str(&format!(
            "{:<width$} {elapsed:secw$.secd$} {:>pw$.pd$}% {:secw$.secd$} {:>pw$.pd$}% {:5.1}\n",
            "Elapsed seconds",
            100.0,
            elapsed_cpu,
            100.0,
            elapsed_cpu / elapsed,
            width = ml,
        ));
        Some(s)
    }

    fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

/** A handle to be able to stop the Graph. For example when the user
presses Ctrl-C.

```
use debugme::graph::CancellationToken;
use std::thread;

// Token normally extracted from graph.cancel_token().
let token = CancellationToken::new();

// Confirm it defaults to not cancelled.
assert!(!token.is_canceled());

// Start a thread that will cancel the token.
let tt = token.clone();
thread::spawn(move || {
   tt.cancel();
});

// This would normally be graph.run();
while !token.is_canceled() {}
```
*/
#[derive(Clone)]
pub struct CancellationToken {
    inner: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

impl CancellationToken {
    /// Create new cancellation token.
    #[must_use]
    pub fn new() -> Self {
        CancellationToken {
            inner: std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false)),
        }
    }

    /// Mark the token cancelled.
    pub fn cancel(&self) {
        self.inner.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    /// Check if the token is cancelled.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.inner.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
