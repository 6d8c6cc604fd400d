//! Best-effort publishing of ship's logs and galleries.
//!
//! The core emits `Event::LogEntry` and `Event::Gallery`; drivers hand each
//! envelope to [`dispatch`] once the tick has finished. Failures never reach
//! the simulation: [`RetryingPublisher`] retries a bounded number of times,
//! then logs and gives up.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use voyage_core::{Event, EventEnvelope};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("publisher io: {0}")]
    Io(#[from] std::io::Error),
    #[error("publisher unavailable: {0}")]
    Unavailable(String),
    #[error("post rejected: {0}")]
    Rejected(String),
}

impl PublishError {
    /// Rejections are final; everything else may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, PublishError::Rejected(_))
    }
}

pub trait Publisher {
    fn post_text(&mut self, title: &str, body: &str) -> Result<(), PublishError>;
    fn post_images(&mut self, title: &str, images: &[String]) -> Result<(), PublishError>;
}

/// Forwards log entries and galleries; every other event is ignored.
pub fn dispatch(
    publisher: &mut dyn Publisher,
    envelope: &EventEnvelope,
) -> Result<(), PublishError> {
    match &envelope.event {
        Event::LogEntry { author, title, body } => {
            publisher.post_text(title, &format!("{body}\n\n-- {author}"))
        }
        Event::Gallery { title, images } if !images.is_empty() => {
            publisher.post_images(title, images)
        }
        _ => Ok(()),
    }
}

/// Writes posts to the tracing log at info.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPublisher;

impl Publisher for TracingPublisher {
    fn post_text(&mut self, title: &str, body: &str) -> Result<(), PublishError> {
        tracing::info!(title, body, "ship's log");
        Ok(())
    }

    fn post_images(&mut self, title: &str, images: &[String]) -> Result<(), PublishError> {
        tracing::info!(title, count = images.len(), images = ?images, "gallery");
        Ok(())
    }
}

/// One `.shiplog` file per post, named by UTC timestamp.
#[derive(Debug)]
pub struct ShiplogPublisher {
    dir: PathBuf,
    sequence: u64,
}

impl ShiplogPublisher {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, PublishError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, sequence: 0 })
    }

    fn next_path(&mut self) -> PathBuf {
        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        self.sequence += 1;
        self.dir
            .join(format!("{timestamp}_{:04}.shiplog", self.sequence))
    }
}

impl Publisher for ShiplogPublisher {
    fn post_text(&mut self, title: &str, body: &str) -> Result<(), PublishError> {
        let path = self.next_path();
        fs::write(path, format!("{title}\n\n{body}\n"))?;
        Ok(())
    }

    fn post_images(&mut self, title: &str, images: &[String]) -> Result<(), PublishError> {
        let path = self.next_path();
        fs::write(path, format!("{title}\n\n{}\n", images.join("\n")))?;
        Ok(())
    }
}

/// Wraps a publisher with bounded retry and a fixed pause between attempts.
#[derive(Debug)]
pub struct RetryingPublisher<P> {
    inner: P,
    attempts: u32,
    backoff: Duration,
}

impl<P: Publisher> RetryingPublisher<P> {
    /// `attempts` counts the first try; zero is treated as one.
    pub fn new(inner: P, attempts: u32, backoff: Duration) -> Self {
        Self {
            inner,
            attempts: attempts.max(1),
            backoff,
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    fn with_retry(
        &mut self,
        title: &str,
        mut post: impl FnMut(&mut P) -> Result<(), PublishError>,
    ) -> Result<(), PublishError> {
        let mut attempt = 1;
        loop {
            match post(&mut self.inner) {
                Ok(()) => return Ok(()),
                Err(err) if err.is_retryable() && attempt < self.attempts => {
                    tracing::debug!(title, attempt, %err, "publish failed, retrying");
                    attempt += 1;
                    if !self.backoff.is_zero() {
                        std::thread::sleep(self.backoff);
                    }
                }
                Err(err) => {
                    tracing::warn!(title, attempt, %err, "publish failed, dropping post");
                    return Err(err);
                }
            }
        }
    }
}

impl<P: Publisher> Publisher for RetryingPublisher<P> {
    fn post_text(&mut self, title: &str, body: &str) -> Result<(), PublishError> {
        self.with_retry(title, |inner| inner.post_text(title, body))
    }

    fn post_images(&mut self, title: &str, images: &[String]) -> Result<(), PublishError> {
        self.with_retry(title, |inner| inner.post_images(title, images))
    }
}
