//! Run the buggy sink in its QA graph:
//!
//! ```text
//! [ VectorSource 0..N ] -> [ Head ] -> [ BuggySink ]
//! ```
//!
//! With `--mode faithful` and more than one sample, expect a segfault.
use anyhow::Result;
use clap::Parser;
use log::{info, warn};

use debugme::blockchain;
use debugme::blocks::{BuggySink, Head, VectorSource};
use debugme::graph::{Graph, GraphRunner};
use debugme::{Float, Repeat, parse_samples, parse_verbosity};

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    /// Sum exactly the samples given.
    Bounded,
    /// The original broken loop. Reads out of bounds.
    Faithful,
}

#[derive(clap::Parser, Debug)]
#[command(version, about)]
struct Opt {
    /// Which sum loop to run.
    #[arg(long, value_enum, default_value = "bounded")]
    mode: ModeArg,

    /// Send samples 0, 1, 2, ... up to this count.
    #[arg(long, default_value = "10")]
    samples: usize,

    /// Send raw little endian f32 samples from this file instead.
    #[arg(short)]
    input: Option<std::path::PathBuf>,

    /// Stop after this many samples.
    #[arg(long, default_value = "1000000")]
    head: usize,

    /// Send the samples this many times. 0 means forever.
    #[arg(long, default_value = "1")]
    repeat: u64,

    #[arg(short, value_parser=parse_verbosity, default_value="info")]
    verbose: usize,
}

fn main() -> Result<()> {
    let opt = Opt::parse();
    stderrlog::new()
        .module(module_path!())
        .module("debugme")
        .quiet(false)
        .verbosity(opt.verbose)
        .timestamp(stderrlog::Timestamp::Second)
        .init()?;

    let data: Vec<Float> = match &opt.input {
        Some(path) => parse_samples(&std::fs::read(path)?)?,
        None => (0..opt.samples).map(|x| x as Float).collect(),
    };
    info!("Sending {} samples, head {}", data.len(), opt.head);
    let repeat = match opt.repeat {
        0 => Repeat::infinite(),
        n => Repeat::finite(n),
    };

    let mut g = Graph::new();
    let prev = blockchain![
        g,
        prev,
        VectorSource::builder(data).repeat(repeat).build(),
        Head::new(prev, opt.head),
    ];
    let sink = match opt.mode {
        ModeArg::Bounded => BuggySink::new(prev),
        ModeArg::Faithful => {
            warn!("Faithful mode: with more than one sample per call this process will crash");
            // SAFETY: it isn't. The user asked to watch it read out of
            // bounds.
            unsafe { BuggySink::new_faithful(prev) }
        }
    };
    g.add(Box::new(sink));

    let cancel = g.cancel_token();
    ctrlc::set_handler(move || {
        warn!("Got Ctrl-C");
        cancel.cancel();
    })?;
    g.run()?;
    Ok(())
}
