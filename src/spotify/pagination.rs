//! Concurrent retrieval of offset-paginated collections.
//!
//! The caller fetches the first page itself (it needs the `total` from it)
//! and hands the remaining offsets to [`fetch_remaining_pages`]. A fixed pool
//! of workers pulls offsets from a shared queue and reports every outcome on
//! a result channel. The collector drains that channel completely before
//! deciding anything, so no worker is ever left blocked on a send, and only
//! then sorts by offset. The returned order therefore never depends on which
//! request finished first.

use std::{collections::BTreeSet, future::Future, sync::Arc};

use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Upper bound on concurrent page requests per fetch.
pub const WORKER_COUNT: usize = 8;

struct PageResult<T> {
    offset: usize,
    outcome: Result<Vec<T>>,
}

/// Offsets after the first page: `page_size, 2 * page_size, ...` below `total`.
pub fn remaining_offsets(total: usize, page_size: usize) -> Vec<usize> {
    if page_size == 0 {
        return Vec::new();
    }
    (page_size..total).step_by(page_size).collect()
}

/// Workers spawned for `pending` offsets.
pub fn worker_count(pending: usize) -> usize {
    WORKER_COUNT.min(pending)
}

/// Fetches every page after the first and returns them in ascending offset
/// order, one `Vec` per page.
///
/// Fails fast: the first error to arrive (not the lowest offset) decides the
/// outcome and is returned as [`Error::Pagination`] tagged with its offset;
/// successful pages are discarded. Jobs picked up after `cancel` fires are
/// reported as cancelled without calling `fetch`, and a cancellation that
/// produced no page error is still reported as [`Error::Cancelled`].
pub async fn fetch_remaining_pages<T, F, Fut>(
    cancel: &CancellationToken,
    total: usize,
    page_size: usize,
    fetch: F,
) -> Result<Vec<Vec<T>>>
where
    T: Send + 'static,
    F: Fn(usize) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
{
    let offsets = remaining_offsets(total, page_size);
    if offsets.is_empty() {
        return Ok(Vec::new());
    }

    let workers = worker_count(offsets.len());
    debug!(total, page_size, pages = offsets.len(), workers, "Fetching remaining pages");

    let fetch = Arc::new(fetch);
    let (job_tx, job_rx) = mpsc::channel::<usize>(workers);
    let job_rx = Arc::new(Mutex::new(job_rx));
    let (result_tx, mut result_rx) = mpsc::channel::<PageResult<T>>(offsets.len());

    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let job_rx = Arc::clone(&job_rx);
        let result_tx = result_tx.clone();
        let fetch = Arc::clone(&fetch);
        let cancel = cancel.clone();

        handles.push(tokio::spawn(async move {
            loop {
                let next = job_rx.lock().await.recv().await;
                let Some(offset) = next else { break };

                let outcome = if cancel.is_cancelled() {
                    Err(Error::Cancelled)
                } else {
                    (*fetch)(offset).await
                };

                if result_tx.send(PageResult { offset, outcome }).await.is_err() {
                    break;
                }
            }
        }));
    }
    // Only the workers hold senders now; the stream ends when the last one exits.
    drop(result_tx);

    let mut pending: BTreeSet<usize> = offsets.iter().copied().collect();
    tokio::spawn(async move {
        for offset in offsets {
            if job_tx.send(offset).await.is_err() {
                break;
            }
        }
        drop(job_tx);

        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Page worker terminated abnormally");
            }
        }
    });

    let mut first_err: Option<Error> = None;
    let mut collected: Vec<(usize, Vec<T>)> = Vec::with_capacity(pending.len());
    while let Some(PageResult { offset, outcome }) = result_rx.recv().await {
        pending.remove(&offset);
        match outcome {
            Ok(items) => collected.push((offset, items)),
            Err(e) => {
                if first_err.is_none() {
                    warn!(offset, error = %e, "Page fetch failed");
                    first_err = Some(Error::Pagination {
                        offset,
                        source: Box::new(e),
                    });
                }
            }
        }
    }

    if first_err.is_none() {
        if let Some(&offset) = pending.first() {
            first_err = Some(Error::Pagination {
                offset,
                source: Box::new(Error::WorkerLost),
            });
        }
    }

    if first_err.is_none() && cancel.is_cancelled() {
        first_err = Some(Error::Cancelled);
    }

    if let Some(e) = first_err {
        return Err(e);
    }

    collected.sort_by_key(|(offset, _)| *offset);
    Ok(collected.into_iter().map(|(_, items)| items).collect())
}
