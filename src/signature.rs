//! Stream signatures.
//!
//! A block declares how many input and output streams it takes, and how big
//! each item on them is. Same idea as `gr::io_signature`.
use crate::{Error, Result, Sample};

/// Number and item size of the streams on one side of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoSignature {
    min_streams: usize,
    max_streams: usize,
    item_size: usize,
}

impl IoSignature {
    /// Create a new signature.
    ///
    /// A side with streams must have a non-zero item size.
    pub fn new(min_streams: usize, max_streams: usize, item_size: usize) -> Result<Self> {
        if min_streams > max_streams {
            return Err(Error::Signature(format!(
                "min streams {min_streams} > max streams {max_streams}"
            )));
        }
        if max_streams > 0 && item_size == 0 {
            return Err(Error::Signature(
                "streams declared with zero item size".to_string(),
            ));
        }
        Ok(Self {
            min_streams,
            max_streams,
            item_size,
        })
    }

    /// Exactly `n` streams of sample type `T`.
    #[must_use]
    pub fn of<T: Sample>(n: usize) -> Self {
        Self {
            min_streams: n,
            max_streams: n,
            item_size: T::size(),
        }
    }

    /// No streams at all.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            min_streams: 0,
            max_streams: 0,
            item_size: 0,
        }
    }

    /// Minimum number of streams.
    #[must_use]
    pub fn min_streams(&self) -> usize {
        self.min_streams
    }

    /// Maximum number of streams.
    #[must_use]
    pub fn max_streams(&self) -> usize {
        self.max_streams
    }

    /// Size in bytes of one item.
    #[must_use]
    pub fn item_size(&self) -> usize {
        self.item_size
    }
}

impl std::fmt::Display for IoSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.max_streams == 0 {
            return write!(f, "none");
        }
        if self.min_streams == self.max_streams {
            write!(f, "{}", self.min_streams)?;
        } else {
            write!(f, "{}-{}", self.min_streams, self.max_streams)?;
        }
        write!(f, "x{} bytes", self.item_size)
    }
}

/// Input and output signature of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    /// Input streams.
    pub input: IoSignature,
    /// Output streams.
    pub output: IoSignature,
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "in: {}, out: {}", self.input, self.output)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::Float;

    #[test]
    fn float_signature() {
        let s = IoSignature::of::<Float>(1);
        assert_eq!(s.min_streams(), 1);
        assert_eq!(s.max_streams(), 1);
        assert_eq!(s.item_size(), 4);
        assert_eq!(s, IoSignature::new(1, 1, 4).unwrap());
        assert_eq!(s.to_string(), "1x4 bytes");
    }

    #[test]
    fn empty_signature() {
        let s = IoSignature::empty();
        assert_eq!(s.max_streams(), 0);
        assert_eq!(s, IoSignature::new(0, 0, 0).unwrap());
        assert_eq!(s.to_string(), "none");
    }

    #[test]
    fn bad_signatures() {
        assert!(IoSignature::new(2, 1, 4).is_err());
        assert!(IoSignature::new(1, 1, 0).is_err());
        assert_eq!(IoSignature::new(1, 3, 1).unwrap().to_string(), "1-3x1 bytes");
    }
}
