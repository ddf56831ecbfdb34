use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use thiserror::Error;
use tracing::debug;

use mandelzoom_core::{EscapeEvaluator, PlotGrid, Real};
use mandelzoom_render::{compute_escape_times_for, EscapeStats, RenderCancel};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

struct EscapeRequest<R> {
    id: u64,
    generation: u64,
    grid: PlotGrid<R>,
    evaluator: EscapeEvaluator,
}

/// A finished escape-time pass.
pub(crate) struct EscapeResponse<R> {
    pub(crate) id: u64,
    pub(crate) grid: PlotGrid<R>,
    pub(crate) stats: EscapeStats,
}

#[derive(Debug, Error)]
#[error("escape-time worker thread has stopped")]
pub(crate) struct WorkerGone;

// ---------------------------------------------------------------------------
// Worker handle
// ---------------------------------------------------------------------------

/// Runs escape-time passes on a background thread.
///
/// The grid travels to the worker with each request and comes back with the
/// response. Submitting or cancelling advances the shared [`RenderCancel`]
/// generation, so a pass that is running or still queued skips its remaining
/// chunks and its response is discarded.
pub(crate) struct EscapeWorker<R> {
    tx: mpsc::Sender<EscapeRequest<R>>,
    rx: mpsc::Receiver<EscapeResponse<R>>,
    cancel: Arc<RenderCancel>,
    next_id: u64,
    /// Id of the pass whose result is still wanted.
    in_flight: Option<u64>,
}

impl<R: Real> EscapeWorker<R> {
    pub(crate) fn spawn() -> Self {
        let (tx_req, rx_req) = mpsc::channel();
        let (tx_resp, rx_resp) = mpsc::channel();
        let cancel = Arc::new(RenderCancel::new());

        let cancel_clone = Arc::clone(&cancel);
        thread::spawn(move || {
            escape_worker(rx_req, tx_resp, cancel_clone);
        });

        Self {
            tx: tx_req,
            rx: rx_resp,
            cancel,
            next_id: 0,
            in_flight: None,
        }
    }

    /// Queue a pass over `grid`, superseding any pass still in flight.
    pub(crate) fn submit(
        &mut self,
        grid: PlotGrid<R>,
        evaluator: EscapeEvaluator,
    ) -> Result<u64, WorkerGone> {
        self.cancel.cancel();
        self.next_id += 1;
        let req = EscapeRequest {
            id: self.next_id,
            generation: self.cancel.generation(),
            grid,
            evaluator,
        };
        self.tx.send(req).map_err(|_| WorkerGone)?;
        self.in_flight = Some(self.next_id);
        debug!(id = self.next_id, "Escape-time pass queued");
        Ok(self.next_id)
    }

    /// Abandon the pass in flight, if any.
    pub(crate) fn cancel(&mut self) {
        self.cancel.cancel();
        if let Some(id) = self.in_flight.take() {
            debug!(id, "Escape-time pass cancelled");
        }
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The wanted pass's result, if it has arrived. Stale and cancelled
    /// results are dropped.
    pub(crate) fn poll(&mut self) -> Result<Option<EscapeResponse<R>>, WorkerGone> {
        loop {
            match self.rx.try_recv() {
                Ok(resp) => {
                    if Some(resp.id) == self.in_flight && !resp.stats.cancelled {
                        self.in_flight = None;
                        return Ok(Some(resp));
                    }
                    debug!(id = resp.id, "Discarding stale escape-time result");
                }
                Err(mpsc::TryRecvError::Empty) => return Ok(None),
                Err(mpsc::TryRecvError::Disconnected) => {
                    self.in_flight = None;
                    return Err(WorkerGone);
                }
            }
        }
    }

    /// `(done, total)` samples of the current pass.
    pub(crate) fn progress(&self) -> (usize, usize) {
        self.cancel.progress()
    }

    #[cfg(test)]
    pub(crate) fn generation(&self) -> u64 {
        self.cancel.generation()
    }
}

/// Keep only the newest of the queued requests.
fn drain_latest<R>(
    mut latest: EscapeRequest<R>,
    rx: &mpsc::Receiver<EscapeRequest<R>>,
) -> EscapeRequest<R> {
    while let Ok(newer) = rx.try_recv() {
        latest = newer;
    }
    latest
}

fn escape_worker<R: Real>(
    rx: mpsc::Receiver<EscapeRequest<R>>,
    tx: mpsc::Sender<EscapeResponse<R>>,
    cancel: Arc<RenderCancel>,
) {
    while let Ok(initial) = rx.recv() {
        let mut req = drain_latest(initial, &rx);
        let stats =
            compute_escape_times_for(&mut req.grid, req.evaluator, &cancel, req.generation);
        let resp = EscapeResponse {
            id: req.id,
            grid: req.grid,
            stats,
        };
        if tx.send(resp).is_err() {
            return;
        }
    }
}
