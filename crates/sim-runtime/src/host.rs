//! Background worker for season and prediction runs.
//!
//! A run executes on its own thread with its own league copy and reports
//! over a channel. The host keeps the receiving end and a cancel token; it
//! never shares mutable state with the worker.

use sim_core::{League, ScheduleEntry, SeasonConfig};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::warn;

use crate::cancel::CancelToken;
use crate::error::RunError;
use crate::prediction::{run_prediction, PredictionProgress, PredictionResult};
use crate::season::{simulate_season, SeasonProgress, SeasonResult};

#[derive(Debug, PartialEq)]
pub enum HostMessage<P, T> {
    /// Seed the run actually uses; the base seed for predictions.
    Started { seed: u64 },
    Progress(P),
    Completed(T),
    Failed(RunError),
    Aborted,
}

pub struct HostHandle<P, T> {
    receiver: Receiver<HostMessage<P, T>>,
    cancel: CancelToken,
    thread: Option<JoinHandle<()>>,
}

impl<P, T> HostHandle<P, T> {
    /// Blocking iterator over messages; ends once the worker finishes.
    pub fn messages(&self) -> mpsc::Iter<'_, HostMessage<P, T>> {
        self.receiver.iter()
    }

    pub fn try_message(&self) -> Option<HostMessage<P, T>> {
        self.receiver.try_recv().ok()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Drains the channel and returns the final outcome, discarding progress.
    pub fn wait(mut self) -> Result<T, RunError> {
        let mut outcome = None;
        for msg in self.receiver.iter() {
            match msg {
                HostMessage::Completed(t) => outcome = Some(Ok(t)),
                HostMessage::Failed(e) => outcome = Some(Err(e)),
                HostMessage::Aborted => outcome = Some(Err(RunError::Aborted)),
                HostMessage::Started { .. } | HostMessage::Progress(_) => {}
            }
        }
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                return Err(RunError::Worker("simulation thread panicked".into()));
            }
        }
        outcome.unwrap_or_else(|| Err(RunError::Worker("worker exited without a result".into())))
    }
}

fn spawn<P, T, F>(name: &str, seed: u64, job: F) -> Result<HostHandle<P, T>, RunError>
where
    P: Send + 'static,
    T: Send + 'static,
    F: FnOnce(&Sender<HostMessage<P, T>>, &CancelToken) -> Result<T, RunError> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let cancel = CancelToken::new();
    let worker_cancel = cancel.clone();
    let thread = thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            // Send failures mean the host dropped its handle; nothing to report to.
            let _ = tx.send(HostMessage::Started { seed });
            let msg = match job(&tx, &worker_cancel) {
                Ok(t) => HostMessage::Completed(t),
                Err(RunError::Aborted) => HostMessage::Aborted,
                Err(e) => {
                    warn!(error = %e, "run failed");
                    HostMessage::Failed(e)
                }
            };
            let _ = tx.send(msg);
        })
        .map_err(|e| RunError::Worker(e.to_string()))?;
    Ok(HostHandle {
        receiver: rx,
        cancel,
        thread: Some(thread),
    })
}

/// Starts a season on a worker thread. Without a seed one is drawn from
/// system entropy and reported in `Started`.
pub fn start_season(
    league: League,
    schedule: Vec<ScheduleEntry>,
    config: SeasonConfig,
    seed: Option<u64>,
) -> Result<HostHandle<SeasonProgress, SeasonResult>, RunError> {
    let seed = seed.unwrap_or_else(rand::random);
    spawn("season", seed, move |tx, cancel| {
        simulate_season(
            &league,
            &schedule,
            &config,
            seed,
            &mut |p| {
                let _ = tx.send(HostMessage::Progress(p.clone()));
            },
            cancel,
        )
    })
}

pub fn start_prediction(
    league: League,
    schedule: Vec<ScheduleEntry>,
    config: SeasonConfig,
    count: u32,
    base_seed: u64,
) -> Result<HostHandle<PredictionProgress, PredictionResult>, RunError> {
    spawn("prediction", base_seed, move |tx, cancel| {
        run_prediction(
            &league,
            &schedule,
            &config,
            count,
            base_seed,
            &mut |p| {
                let _ = tx.send(HostMessage::Progress(p.clone()));
            },
            cancel,
        )
    })
}
