//! GitHub push webhook receiver.
//!
//! Push events are verified, queued, and scored by the detection engine
//! on a pool of worker tasks. Job status is available over HTTP.

pub mod handlers;
pub mod payload;
pub mod processor;
pub mod queue;
pub mod server;
pub mod signature;

use thiserror::Error;

pub use handlers::{router, AppState};
pub use payload::{PushAuthor, PushCommit, PushEvent};
pub use processor::DetectionJobProcessor;
pub use queue::{CommitVerdict, Job, JobProcessor, JobQueue, JobStatus};
pub use server::WebhookServer;

/// Webhook subsystem errors.
#[derive(Error, Debug)]
pub enum WebhookError {
    /// `start` called on a running queue.
    #[error("job queue already started")]
    AlreadyStarted,

    /// Queue operation on a queue that is not running.
    #[error("job queue is not running")]
    NotRunning,

    /// The bounded queue has no free slots.
    #[error("job queue is full")]
    QueueFull,

    /// The listener could not bind.
    #[error("failed to bind webhook server to {addr}")]
    Bind {
        /// Requested address
        addr: String,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },

    /// The server stopped with an I/O error.
    #[error("webhook server error")]
    Serve(#[source] std::io::Error),

    /// A job could not be processed.
    #[error("job processing failed: {0}")]
    Processing(String),
}
