/*! Views over input samples.

The sink reads its input through a [`SampleView`], so that the same loop can
run against a plain slice (bounds checked), raw memory (not checked at all),
or an instrumented slice that records every index touched.
*/
use std::cell::RefCell;

use crate::Float;

/// Read access to a run of input samples.
pub trait SampleView {
    /// Number of valid samples.
    fn len(&self) -> usize;

    /// True if there are no valid samples.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the sample at `idx`.
    ///
    /// `None` means the view refused to read outside its valid range.
    fn read(&self, idx: usize) -> Option<Float>;
}

impl SampleView for [Float] {
    fn len(&self) -> usize {
        <[Float]>::len(self)
    }
    fn read(&self, idx: usize) -> Option<Float> {
        self.get(idx).copied()
    }
}

/// View that reads wherever it's told to, like a C pointer.
pub struct Unchecked<'a> {
    samples: &'a [Float],
}

impl<'a> Unchecked<'a> {
    /// Create an unchecked view over `samples`.
    ///
    /// # Safety
    ///
    /// Any [`read`](SampleView::read) past `samples.len()` is undefined
    /// behaviour. The caller either guarantees there will be none, or is
    /// deliberately demonstrating what happens when there are.
    #[must_use]
    pub unsafe fn new(samples: &'a [Float]) -> Self {
        Self { samples }
    }
}

impl SampleView for Unchecked<'_> {
    fn len(&self) -> usize {
        self.samples.len()
    }
    fn read(&self, idx: usize) -> Option<Float> {
        // SAFETY: constructing an Unchecked is unsafe, and the constructor
        // puts any out of range read on the caller.
        Some(unsafe { self.samples.as_ptr().wrapping_add(idx).read() })
    }
}

/// View for test harnesses: serves reads inside the slice, and records and
/// refuses reads outside it.
pub struct Instrumented<'a> {
    samples: &'a [Float],
    reads: RefCell<Vec<usize>>,
}

impl<'a> Instrumented<'a> {
    /// Create new instrumented view.
    #[must_use]
    pub fn new(samples: &'a [Float]) -> Self {
        Self {
            samples,
            reads: RefCell::new(Vec::new()),
        }
    }

    /// Every index read so far, in order. Including refused ones.
    #[must_use]
    pub fn reads(&self) -> Vec<usize> {
        self.reads.borrow().clone()
    }

    /// Indices read that were outside the valid range.
    #[must_use]
    pub fn out_of_range(&self) -> Vec<usize> {
        self.reads
            .borrow()
            .iter()
            .copied()
            .filter(|&i| i >= self.samples.len())
            .collect()
    }
}

impl SampleView for Instrumented<'_> {
    fn len(&self) -> usize {
        self.samples.len()
    }
    fn read(&self, idx: usize) -> Option<Float> {
        self.reads.borrow_mut().push(idx);
        self.samples.get(idx).copied()
    }
}
