//! Pass through the first N samples, then EOF.
use log::debug;

use crate::block::{Block, BlockRet};
use crate::signature::{IoSignature, Signature};
use crate::stream::{ReadStream, WriteStream, new_stream};
use crate::{Result, Sample};

/// Pass through the first N samples, then EOF.
pub struct Head<T> {
    src: ReadStream<T>,
    dst: WriteStream<T>,
    left: usize,
}

impl<T: Sample> Head<T> {
    /// Create new Head block, letting `n` samples through.
    #[must_use]
    pub fn new(src: ReadStream<T>, n: usize) -> (Self, ReadStream<T>) {
        let (dst, out) = new_stream();
        (Self { src, dst, left: n }, out)
    }
}

impl<T: Sample> Block for Head<T> {
    fn block_name(&self) -> &str {
        "Head"
    }
    fn signature(&self) -> Signature {
        Signature {
            input: IoSignature::of::<T>(1),
            output: IoSignature::of::<T>(1),
        }
    }
    fn work(&mut self) -> Result<BlockRet<'_>> {
        if self.left == 0 || self.dst.reader_gone() {
            return Ok(BlockRet::EOF);
        }
        let i = self.src.read_buf()?;
        if i.is_empty() {
            return Ok(BlockRet::WaitForStream(&self.src, 1));
        }
        let mut o = self.dst.write_buf()?;
        let n = std::cmp::min(std::cmp::min(i.len(), o.len()), self.left);
        if n == 0 {
            return Ok(BlockRet::Noop);
        }
        o.slice()[..n].copy_from_slice(&i.slice()[..n]);
        o.produce(n);
        i.consume(n);
        self.left -= n;
        if self.left == 0 {
            debug!("Head: reached max");
            return Ok(BlockRet::EOF);
        }
        Ok(BlockRet::Again)
    }
    fn eof(&mut self) -> bool {
        self.left == 0 || self.src.eof()
    }
}
