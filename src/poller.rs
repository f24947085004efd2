//! The poll loop: fetch, validate, notify, sleep.
//!
//! [`poll_once`] fetches and interprets without side effects.
//! [`Poller::tick`] runs exactly one iteration without sleeping.
//! [`Poller::run`] repeats it every retry period until the shutdown signal
//! fires. A failed iteration is reported to chat and retried; nothing inside
//! the loop is fatal.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info};

use crate::api::HomeworkApi;
use crate::error::PollError;
use crate::homework::{check_response, current_date, parse_status};
use crate::notifier::Notifier;

/// Sent when the latest poll returned no submissions.
pub const NO_CHANGE_MESSAGE: &str = "Homework status has not changed.";

/// Successful result of one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The latest homework has a known status.
    StatusChanged {
        /// Message for the student.
        message: String,
        /// Server time to resume from, if the response carried one.
        current_date: Option<i64>,
    },
    /// `homeworks` was empty.
    NoNewSubmissions,
}

/// Chat text for an iteration result.
pub fn notification_text(result: &Result<PollOutcome, PollError>) -> String {
    match result {
        Ok(PollOutcome::StatusChanged { message, .. }) => message.clone(),
        Ok(PollOutcome::NoNewSubmissions) => NO_CHANGE_MESSAGE.to_owned(),
        Err(e) => format!("Program failure: {e}"),
    }
}

/// Fetch and interpret the latest homework from `from_date`.
///
/// Neither notifies nor touches any cursor.
///
/// # Errors
///
/// Returns the [`PollError`] of the first step that failed.
pub async fn poll_once(
    api: &dyn HomeworkApi,
    from_date: i64,
) -> Result<PollOutcome, PollError> {
    let response = api.fetch(from_date).await?;
    let Some(homework) = check_response(&response)? else {
        return Ok(PollOutcome::NoNewSubmissions);
    };
    let message = parse_status(homework)?;
    Ok(PollOutcome::StatusChanged {
        message,
        current_date: current_date(&response),
    })
}

/// Owns the poll cursor and drives iterations.
pub struct Poller {
    api: Arc<dyn HomeworkApi>,
    notifier: Arc<dyn Notifier>,
    retry_period: Duration,
    cursor: i64,
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("retry_period", &self.retry_period)
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

impl Poller {
    /// Create a poller starting at `cursor` (unix seconds).
    pub fn new(
        api: Arc<dyn HomeworkApi>,
        notifier: Arc<dyn Notifier>,
        retry_period: Duration,
        cursor: i64,
    ) -> Self {
        Self {
            api,
            notifier,
            retry_period,
            cursor,
        }
    }

    /// The `from_date` the next fetch will use.
    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    /// Run one full iteration: poll, notify, advance the cursor on success.
    ///
    /// Notification failures are logged and otherwise ignored. The result is
    /// returned for inspection only; it has already been reported.
    pub async fn tick(&mut self) -> Result<PollOutcome, PollError> {
        let result = poll_once(self.api.as_ref(), self.cursor).await;

        match &result {
            Ok(PollOutcome::StatusChanged { message, .. }) => {
                info!(from_date = self.cursor, message = %message, "homework status changed");
            }
            Ok(PollOutcome::NoNewSubmissions) => {
                info!(from_date = self.cursor, "no new submissions");
            }
            Err(e) => {
                error!(from_date = self.cursor, error = %e, "poll iteration failed");
            }
        }

        let text = notification_text(&result);
        match self.notifier.send(&text).await {
            Ok(()) => info!(message = %text, "notification sent"),
            Err(e) => error!(error = %e, message = %text, "failed to send notification"),
        }

        if let Ok(PollOutcome::StatusChanged { current_date, .. }) = &result {
            self.cursor = current_date.unwrap_or_else(|| chrono::Utc::now().timestamp());
        }

        result
    }

    /// Poll until `shutdown` becomes `true` or its sender is dropped.
    ///
    /// Sleeps the full retry period after every iteration, whatever its result.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            retry_secs = self.retry_period.as_secs(),
            from_date = self.cursor,
            "poll loop started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            // Already logged and reported to chat by `tick`.
            let _ = self.tick().await;

            if wait_or_shutdown(self.retry_period, &mut shutdown).await {
                break;
            }
        }

        info!("poll loop stopped");
    }
}

/// Sleep for `period`. Returns `true` early if shutdown was requested.
async fn wait_or_shutdown(period: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    let sleep = tokio::time::sleep(period);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            () = &mut sleep => return false,
            result = shutdown.changed() => {
                if result.is_err() || *shutdown.borrow() {
                    return true;
                }
            }
        }
    }
}
