use futures::stream::{self, Stream, StreamExt};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

use crate::backend::{DocumentStream, FindRequest, SharedBackend};
use crate::error::BackendError;
use crate::models::EntityKind;

/// Forward-only, single-consumer pull over one backend cursor
///
/// Nothing is sent to the backend until the first [`next`](Self::next).
/// The cursor is released on exhaustion, when the limit is reached, on the
/// first error, on [`close`](Self::close) and on drop.
pub struct ResultIterator<T> {
    backend: SharedBackend,
    pending: Option<FindRequest>,
    cursor: Option<DocumentStream>,
    remaining: Option<u64>,
    closed: bool,
    entity: EntityKind,
    yielded: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> ResultIterator<T> {
    pub(crate) fn new(backend: SharedBackend, request: FindRequest, entity: EntityKind) -> Self {
        Self {
            backend,
            remaining: request.limit,
            pending: Some(request),
            cursor: None,
            closed: false,
            entity,
            yielded: 0,
            _marker: PhantomData,
        }
    }

    /// Pull the next document; `Ok(None)` once the sequence is finished
    pub async fn next(&mut self) -> Result<Option<T>, BackendError> {
        if self.closed || self.remaining == Some(0) {
            self.close();
            return Ok(None);
        }

        if let Some(request) = self.pending.take() {
            match self.backend.find(request).await {
                Ok(cursor) => self.cursor = Some(cursor),
                Err(err) => {
                    self.close();
                    return Err(err);
                },
            }
        }

        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(None);
        };
        match cursor.next().await {
            Some(Ok(document)) => match serde_json::from_value(document) {
                Ok(item) => {
                    self.yielded += 1;
                    if let Some(remaining) = self.remaining.as_mut() {
                        *remaining -= 1;
                    }
                    Ok(Some(item))
                },
                Err(err) => {
                    self.close();
                    Err(err.into())
                },
            },
            Some(Err(err)) => {
                self.close();
                Err(err)
            },
            None => {
                self.close();
                Ok(None)
            },
        }
    }

    /// Drain the remaining documents
    pub async fn collect_all(mut self) -> Result<Vec<T>, BackendError> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// Adapt into a [`Stream`] that ends after the first error
    pub fn into_stream(self) -> impl Stream<Item = Result<T, BackendError>> {
        stream::try_unfold(self, |mut iter| async move {
            Ok(iter.next().await?.map(|item| (item, iter)))
        })
    }
}

impl<T> ResultIterator<T> {
    /// Release the cursor; later pulls return `None`
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.pending = None;
            self.cursor = None;
            tracing::trace!(
                entity = %self.entity,
                backend = self.backend.name(),
                yielded = self.yielded,
                "Released cursor"
            );
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether the backend has been called yet
    pub fn is_dispatched(&self) -> bool {
        self.pending.is_none()
    }
}

impl<T> Drop for ResultIterator<T> {
    fn drop(&mut self) {
        self.close();
    }
}
