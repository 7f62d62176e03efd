//! Background file loading with a single in-flight slot.

use crossbeam_channel::{Receiver, Sender};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use crate::{Error, Result};

/// What a finished load installed.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadInfo {
    pub name: String,
    pub channels: usize,
    pub frames: usize,
    pub sample_rate: f64,
    pub slices: usize,
}

/// Result of one background load, reported once.
#[derive(Debug)]
pub struct LoadOutcome {
    pub path: PathBuf,
    pub result: Result<LoadInfo>,
}

impl LoadOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Owns the loader thread and the channel its outcome comes back on.
///
/// The caller guards against overlapping loads; `spawn` joins whatever
/// thread is left from the previous load before starting a new one and
/// drops that load's outcome if nobody polled it.
pub(crate) struct Loader {
    thread: Option<JoinHandle<()>>,
    in_flight: Option<PathBuf>,
    outcome_tx: Sender<LoadOutcome>,
    outcome_rx: Receiver<LoadOutcome>,
}

impl Loader {
    pub(crate) fn new() -> Self {
        let (outcome_tx, outcome_rx) = crossbeam_channel::bounded(1);
        Self {
            thread: None,
            in_flight: None,
            outcome_tx,
            outcome_rx,
        }
    }

    /// Run `job` on a fresh named thread and report its result.
    pub(crate) fn spawn<F>(&mut self, path: PathBuf, job: F) -> Result<()>
    where
        F: FnOnce(&Path) -> Result<LoadInfo> + Send + 'static,
    {
        self.join();
        while self.outcome_rx.try_recv().is_ok() {}

        let tx = self.outcome_tx.clone();
        let thread_path = path.clone();
        let thread = std::thread::Builder::new()
            .name("padslicer-loader".into())
            .spawn(move || {
                let result = job(&thread_path);
                let _ = tx.send(LoadOutcome {
                    path: thread_path,
                    result,
                });
            })?;

        self.thread = Some(thread);
        self.in_flight = Some(path);
        Ok(())
    }

    /// Non-blocking check for a finished load.
    pub(crate) fn poll(&mut self) -> Option<LoadOutcome> {
        if let Ok(outcome) = self.outcome_rx.try_recv() {
            self.in_flight = None;
            return Some(outcome);
        }
        let finished = self.thread.as_ref().is_some_and(|t| t.is_finished());
        if finished {
            return self.finish();
        }
        None
    }

    /// Block until the in-flight load (if any) reports.
    pub(crate) fn wait(&mut self) -> Option<LoadOutcome> {
        self.finish()
    }

    fn finish(&mut self) -> Option<LoadOutcome> {
        let panicked = match self.thread.take() {
            Some(thread) => thread.join().is_err(),
            None => false,
        };
        if let Ok(outcome) = self.outcome_rx.try_recv() {
            self.in_flight = None;
            return Some(outcome);
        }
        let path = self.in_flight.take()?;
        panicked.then(|| LoadOutcome {
            path,
            result: Err(Error::LoaderPanicked),
        })
    }

    /// Join the loader thread without consuming its outcome.
    pub(crate) fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!("loader thread panicked");
            }
        }
    }
}

impl Drop for Loader {
    fn drop(&mut self) {
        self.join();
    }
}
