//! Marker-driven bucket listing
//!
//! [`KeyLister`] requests one page at a time and hands out its entries in
//! order. Each follow-up request uses the last key seen as its `marker`, so
//! at most one page is held in memory. The lister is forward-only.

use std::collections::VecDeque;

use futures::Stream;
use s3lib_core::{ObjectEntry, Result, Transport};

use crate::client::{ListOptions, S3Client};

/// Lazy walk over every key of a bucket
pub struct KeyLister<'a, T: Transport> {
    client: &'a mut S3Client<T>,
    bucket: String,
    options: ListOptions,
    buffer: VecDeque<ObjectEntry>,
    done: bool,
    pages: usize,
}

impl<'a, T: Transport> KeyLister<'a, T> {
    pub(crate) fn new(client: &'a mut S3Client<T>, bucket: String, options: ListOptions) -> Self {
        Self {
            client,
            bucket,
            options,
            buffer: VecDeque::new(),
            done: false,
            pages: 0,
        }
    }

    /// Number of listing requests issued so far
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Next entry, fetching another page when the current one is used up
    ///
    /// After an error the lister is exhausted.
    pub async fn next(&mut self) -> Result<Option<ObjectEntry>> {
        loop {
            if let Some(entry) = self.buffer.pop_front() {
                return Ok(Some(entry));
            }
            if self.done {
                return Ok(None);
            }
            if let Err(e) = self.fetch_page().await {
                self.done = true;
                return Err(e);
            }
        }
    }

    async fn fetch_page(&mut self) -> Result<()> {
        let page = self.client.list_bucket(&self.bucket, &self.options).await?;
        self.pages += 1;

        tracing::debug!(
            bucket = %self.bucket,
            page = self.pages,
            keys = page.entries.len(),
            truncated = page.truncated,
            "listed page"
        );

        let marker = self.options.marker.take();
        let fresh: Vec<ObjectEntry> = page
            .entries
            .into_iter()
            .filter(|entry| marker.as_deref() != Some(entry.key.as_str()))
            .collect();

        match fresh.last() {
            Some(last) => self.options.marker = Some(last.key.clone()),
            None if page.truncated => {
                // The marker cannot advance; asking again would loop forever
                tracing::warn!(
                    bucket = %self.bucket,
                    marker = ?marker,
                    "truncated listing page without new keys"
                );
                self.done = true;
            }
            None => {}
        }
        if !page.truncated {
            self.done = true;
        }

        self.buffer.extend(fresh);
        Ok(())
    }

    /// Collect just the key names
    pub async fn collect_keys(mut self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        while let Some(entry) = self.next().await? {
            keys.push(entry.key);
        }
        Ok(keys)
    }

    /// Adapt the lister into a [`Stream`]
    pub fn into_stream(self) -> impl Stream<Item = Result<ObjectEntry>> + 'a {
        futures::stream::unfold(self, |mut lister| async move {
            match lister.next().await {
                Ok(Some(entry)) => Some((Ok(entry), lister)),
                Ok(None) => None,
                Err(e) => Some((Err(e), lister)),
            }
        })
    }
}
