//! Generate values from a fixed vector.
use log::debug;

use crate::block::{Block, BlockRet};
use crate::signature::{IoSignature, Signature};
use crate::stream::{ReadStream, WriteStream, new_stream};
use crate::{Repeat, Result, Sample};

/// VectorSource builder.
pub struct VectorSourceBuilder<T> {
    data: Vec<T>,
    repeat: Repeat,
}

impl<T: Sample> VectorSourceBuilder<T> {
    /// Create new builder.
    #[must_use]
    pub fn new(data: Vec<T>) -> Self {
        Self {
            data,
            repeat: Repeat::default(),
        }
    }

    /// Set repeat status.
    #[must_use]
    pub fn repeat(mut self, r: Repeat) -> Self {
        self.repeat = r;
        self
    }

    /// Build the source.
    #[must_use]
    pub fn build(self) -> (VectorSource<T>, ReadStream<T>) {
        let (dst, out) = new_stream();
        (
            VectorSource {
                dst,
                data: self.data,
                repeat: self.repeat,
                pos: 0,
            },
            out,
        )
    }
}

/// Generate values from a fixed vector.
pub struct VectorSource<T> {
    dst: WriteStream<T>,
    data: Vec<T>,
    repeat: Repeat,
    pos: usize,
}

impl<T: Sample> VectorSource<T> {
    /// Create new Vector Source block, sending the data once.
    #[must_use]
    pub fn new(data: Vec<T>) -> (Self, ReadStream<T>) {
        VectorSourceBuilder::new(data).build()
    }

    /// Create a builder.
    #[must_use]
    pub fn builder(data: Vec<T>) -> VectorSourceBuilder<T> {
        VectorSourceBuilder::new(data)
    }
}

impl<T: Sample> Block for VectorSource<T> {
    fn block_name(&self) -> &str {
        "VectorSource"
    }
    fn signature(&self) -> Signature {
        Signature {
            input: IoSignature::empty(),
            output: IoSignature::of::<T>(1),
        }
    }
    fn work(&mut self) -> Result<BlockRet<'_>> {
        if self.data.is_empty() || self.repeat.done() || self.dst.reader_gone() {
            return Ok(BlockRet::EOF);
        }
        let mut o = self.dst.write_buf()?;
        let n = std::cmp::min(o.len(), self.data.len() - self.pos);
        if n == 0 {
            return Ok(BlockRet::Noop);
        }
        o.slice()[..n].copy_from_slice(&self.data[self.pos..(self.pos + n)]);
        o.produce(n);
        self.pos += n;
        if self.pos == self.data.len() {
            self.pos = 0;
            if !self.repeat.again() {
                debug!("VectorSource: sent {} repeats", self.repeat.count());
                return Ok(BlockRet::EOF);
            }
        }
        Ok(BlockRet::Again)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::stream::StreamWait;

    #[test]
    fn send_once() -> Result<()> {
        let (mut src, out) = VectorSource::new(vec![1u8, 2, 3]);
        let r = src.work()?;
        assert!(matches![r, BlockRet::EOF], "Got {r:?}");
        assert_eq!(out.read_buf()?.slice(), &[1, 2, 3]);
        drop(src);
        assert!(out.closed());
        Ok(())
    }

    #[test]
    fn repeat() -> Result<()> {
        let (mut src, out) = VectorSource::builder(vec![1u8, 2])
            .repeat(Repeat::finite(3))
            .build();
        assert!(matches![src.work()?, BlockRet::Again]);
        assert!(matches![src.work()?, BlockRet::Again]);
        assert!(matches![src.work()?, BlockRet::EOF]);
        assert!(matches![src.work()?, BlockRet::EOF]);
        assert_eq!(out.read_buf()?.slice(), &[1, 2, 1, 2, 1, 2]);
        Ok(())
    }

    #[test]
    fn no_repeat() -> Result<()> {
        let (mut src, out) = VectorSource::builder(vec![1u8, 2])
            .repeat(Repeat::finite(0))
            .build();
        assert!(matches![src.work()?, BlockRet::EOF]);
        assert!(out.read_buf()?.is_empty());
        Ok(())
    }

    #[test]
    fn empty() -> Result<()> {
        let (mut src, _out) = VectorSource::<u8>::new(vec![]);
        assert!(matches![src.work()?, BlockRet::EOF]);
        Ok(())
    }

    #[test]
    fn larger_than_stream() -> Result<()> {
        let data: Vec<u8> = (0..20_000).map(|x| (x % 256) as u8).collect();
        let (mut src, out) = VectorSource::new(data.clone());
        let mut got = Vec::new();
        loop {
            let r = src.work()?;
            let eof = matches![r, BlockRet::EOF];
            let i = out.read_buf()?;
            got.extend_from_slice(i.slice());
            let n = i.len();
            i.consume(n);
            if eof {
                break;
            }
        }
        assert_eq!(got, data);
        Ok(())
    }
}
