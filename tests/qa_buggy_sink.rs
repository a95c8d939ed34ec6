use std::io::Write;
use std::process::Command;
use std::sync::{Arc, Mutex};

use anyhow::Result;

use debugme::blocks::{BuggySink, Head, VectorSource};
use debugme::graph::{Graph, GraphRunner};
use debugme::view::Instrumented;
use debugme::{Error, Float, Sample};

#[derive(Clone, Default)]
struct Fake {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl Fake {
    fn text(&self) -> String {
        String::from_utf8(self.buf.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Fake {
    fn write(&mut self, b: &[u8]) -> std::io::Result<usize> {
        self.buf.lock().unwrap().write(b)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn qa_flowgraph() -> Result<()> {
    let fake = Fake::default();
    let mut g = Graph::new();
    let prev = debugme::blockchain![
        g,
        prev,
        VectorSource::new((0..10).map(|i| i as Float).collect()),
        Head::new(prev, 1_000_000),
    ];
    g.add(Box::new(BuggySink::new(prev).with_writer(fake.clone())));
    g.run()?;
    assert_eq!(fake.text(), "45\n");
    Ok(())
}

#[test]
fn faithful_out_of_bounds_is_observable() {
    let (_w, r) = debugme::stream::new_stream();
    // SAFETY: only process_view() with an instrumented view is called.
    let mut sink = unsafe { BuggySink::new_faithful(r) }.with_writer(Fake::default());
    let data: Vec<Float> = vec![10.0, 20.0, 30.0];
    let view = Instrumented::new(&data);
    let err = sink.process_view(2, &view).unwrap_err();
    assert!(matches![err, Error::Fault { index: 3, len: 3 }], "{err}");
    assert!(view.reads().iter().any(|&i| i > 1));
    assert_eq!(view.out_of_range(), vec![3]);
}

fn debugme_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_debugme"))
}

#[test]
fn cli_bounded() -> Result<()> {
    let out = debugme_bin().args(["-v", "error"]).output()?;
    assert!(out.status.success(), "{out:?}");
    assert_eq!(String::from_utf8(out.stdout)?, "45\n");
    Ok(())
}

#[test]
fn cli_faithful_single_sample() -> Result<()> {
    let out = debugme_bin()
        .args(["--mode", "faithful", "--samples", "1", "-v", "error"])
        .output()?;
    assert!(out.status.success(), "{out:?}");
    assert_eq!(String::from_utf8(out.stdout)?, "0\n");
    Ok(())
}

#[test]
fn cli_input_file() -> Result<()> {
    let mut f = tempfile::NamedTempFile::new()?;
    for v in [0.5 as Float, 0.25, 1e6] {
        f.write_all(&v.serialize())?;
    }
    f.flush()?;
    let out = debugme_bin()
        .args(["-v", "error", "-i"])
        .arg(f.path())
        .output()?;
    assert!(out.status.success(), "{out:?}");
    assert_eq!(String::from_utf8(out.stdout)?, "1e+06\n");
    Ok(())
}

// Reads out of bounds until the process dies. Undefined behaviour, so not
// run by default.
#[test]
#[ignore]
fn cli_faithful_crashes() -> Result<()> {
    let out = debugme_bin()
        .args(["--mode", "faithful", "-v", "error"])
        .output()?;
    assert!(!out.status.success(), "{out:?}");
    assert!(out.stdout.is_empty());
    Ok(())
}
