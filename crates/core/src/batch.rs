//! Fixed-size batching over any iterator
//!
//! Batches are pulled from the source lazily, so unbounded sources work.

use crate::error::{Error, Result};

/// Iterator over `size`-element groups of an inner iterator
#[derive(Debug, Clone)]
pub struct Batches<I> {
    inner: I,
    size: usize,
}

impl<I: Iterator> Iterator for Batches<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch: Vec<I::Item> = self.inner.by_ref().take(self.size).collect();
        if batch.is_empty() { None } else { Some(batch) }
    }
}

/// Group `items` into batches of `size`; the final batch may be shorter
///
/// A size of zero is rejected before anything is pulled from `items`.
pub fn batchify<I: IntoIterator>(size: usize, items: I) -> Result<Batches<I::IntoIter>> {
    if size == 0 {
        return Err(Error::InvalidInput("Size must be 1 or greater".into()));
    }
    Ok(Batches {
        inner: items.into_iter(),
        size,
    })
}
