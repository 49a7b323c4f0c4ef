//! Background writer for the notes slot.
//!
//! # Responsibility
//! - Own the key-value store and apply slot writes off the caller's thread.
//! - Report each write's outcome on its own ticket.
//!
//! # Invariants
//! - Writes apply strictly in issue order; the last issued write wins.
//! - A failed write is logged and reported, never retried.
//! - Dropping the worker applies every queued write before returning.

use crate::repo::kv_repo::{KeyValueStore, RepoError};
use crate::repo::note_store::NoteCodecError;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

const WORKER_THREAD_NAME: &str = "jotpad-save";

/// Why a save did not reach storage.
#[derive(Debug)]
pub enum SaveError {
    /// The note list could not be serialized.
    Encode(NoteCodecError),
    /// The key-value backend failed the write.
    Storage(RepoError),
    /// The worker thread is gone; the write was never attempted.
    WorkerStopped,
}

impl Display for SaveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode notes: {err}"),
            Self::Storage(err) => write!(f, "failed to write notes: {err}"),
            Self::WorkerStopped => write!(f, "save worker is not running"),
        }
    }
}

impl Error for SaveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::WorkerStopped => None,
        }
    }
}

impl From<RepoError> for SaveError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

impl From<NoteCodecError> for SaveError {
    fn from(value: NoteCodecError) -> Self {
        Self::Encode(value)
    }
}

type SaveResult = Result<(), SaveError>;

enum Job {
    Write {
        seq: u64,
        key: String,
        payload: String,
        reply: Sender<SaveResult>,
    },
    Flush {
        reply: Sender<()>,
    },
}

/// Handle on one issued save.
///
/// Dropping the ticket does not cancel the write.
#[derive(Debug)]
pub struct SaveTicket {
    seq: u64,
    reply: Receiver<SaveResult>,
    outcome: Option<SaveResult>,
}

impl SaveTicket {
    fn pending(seq: u64) -> (Self, Sender<SaveResult>) {
        let (reply_tx, reply_rx) = mpsc::channel();
        let ticket = Self {
            seq,
            reply: reply_rx,
            outcome: None,
        };
        (ticket, reply_tx)
    }

    fn resolved(seq: u64, result: SaveResult) -> Self {
        let (ticket, reply) = Self::pending(seq);
        // Receiver is alive in `ticket`, so the send cannot fail.
        let _ = reply.send(result);
        ticket
    }

    /// Issue order of this save, starting at 1.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Blocks until the write completed and returns its outcome.
    pub fn wait(mut self) -> SaveResult {
        if let Some(outcome) = self.outcome.take() {
            return outcome;
        }
        self.reply.recv().unwrap_or(Err(SaveError::WorkerStopped))
    }

    /// Outcome if the write already completed, without blocking.
    pub fn try_result(&mut self) -> Option<&SaveResult> {
        if self.outcome.is_none() {
            match self.reply.try_recv() {
                Ok(result) => self.outcome = Some(result),
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    self.outcome = Some(Err(SaveError::WorkerStopped))
                }
            }
        }
        self.outcome.as_ref()
    }
}

/// Single background thread applying slot writes in FIFO order.
pub struct SaveWorker {
    jobs: Option<Sender<Job>>,
    thread: Option<JoinHandle<()>>,
    last_seq: u64,
}

impl SaveWorker {
    /// Moves `store` onto a new writer thread.
    ///
    /// When the thread cannot be spawned the worker still exists, but every
    /// save resolves to [`SaveError::WorkerStopped`].
    pub fn spawn<S>(store: S) -> Self
    where
        S: KeyValueStore + Send + 'static,
    {
        let (jobs_tx, jobs_rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || run_jobs(store, jobs_rx));

        match spawned {
            Ok(thread) => Self {
                jobs: Some(jobs_tx),
                thread: Some(thread),
                last_seq: 0,
            },
            Err(err) => {
                error!(
                    "event=save_worker_spawn module=store status=error error={err}"
                );
                Self {
                    jobs: None,
                    thread: None,
                    last_seq: 0,
                }
            }
        }
    }

    /// Queues `payload` to replace the value under `key`.
    pub fn submit(&mut self, key: &str, payload: String) -> SaveTicket {
        let seq = self.next_seq();
        let (ticket, reply) = SaveTicket::pending(seq);
        let job = Job::Write {
            seq,
            key: key.to_string(),
            payload,
            reply,
        };

        let Some(jobs) = self.jobs.as_ref() else {
            warn!("event=notes_save module=store status=error seq={seq} error_code=worker_stopped");
            return SaveTicket::resolved(seq, Err(SaveError::WorkerStopped));
        };
        if jobs.send(job).is_err() {
            warn!("event=notes_save module=store status=error seq={seq} error_code=worker_stopped");
            return SaveTicket::resolved(seq, Err(SaveError::WorkerStopped));
        }
        ticket
    }

    /// Records a save that failed before reaching the queue.
    pub fn reject(&mut self, err: SaveError) -> SaveTicket {
        let seq = self.next_seq();
        SaveTicket::resolved(seq, Err(err))
    }

    /// Blocks until every write queued so far has been applied.
    pub fn flush(&self) {
        let Some(jobs) = self.jobs.as_ref() else {
            return;
        };
        let (reply_tx, reply_rx) = mpsc::channel();
        if jobs.send(Job::Flush { reply: reply_tx }).is_ok() {
            let _ = reply_rx.recv();
        }
    }

    fn next_seq(&mut self) -> u64 {
        self.last_seq += 1;
        self.last_seq
    }
}

impl Drop for SaveWorker {
    fn drop(&mut self) {
        // Closing the queue lets the thread drain and exit.
        drop(self.jobs.take());
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("event=save_worker_join module=store status=error error_code=worker_panicked");
            }
        }
    }
}

fn run_jobs<S: KeyValueStore>(mut store: S, jobs: Receiver<Job>) {
    for job in jobs {
        match job {
            Job::Write {
                seq,
                key,
                payload,
                reply,
            } => {
                let started_at = Instant::now();
                let result = store.set_item(&key, &payload).map_err(SaveError::from);
                match &result {
                    Ok(()) => info!(
                        "event=notes_save module=store status=ok seq={seq} key={key} bytes={} duration_ms={}",
                        payload.len(),
                        started_at.elapsed().as_millis()
                    ),
                    Err(err) => error!(
                        "event=notes_save module=store status=error seq={seq} key={key} duration_ms={} error={err}",
                        started_at.elapsed().as_millis()
                    ),
                }
                // Nobody listening is fine; saves are fire-and-forget.
                let _ = reply.send(result);
            }
            Job::Flush { reply } => {
                let _ = reply.send(());
            }
        }
    }
}
