pub mod cadence;
pub mod lifecycle;
pub mod signal;

pub use cadence::Cadence;
pub use lifecycle::Reporter;
pub use signal::StopSignal;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Local};
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::Config;
use crate::domain::{Post, PostLimits};
use crate::errors::ReporterResult;
use crate::services::attachment_service::{self, AttachmentFetcher};
use crate::services::{Publisher, SelectionService};
use crate::sources::{Enricher, FeedSource};
use crate::storage::{HistoryCache, SharedHistory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Waiting,
    Publishing,
    Recording,
    Stopped,
}

/// Observable scheduler progress. Nothing reads it back to make decisions.
#[derive(Debug, Clone)]
pub struct SchedulerState {
    pub phase: Phase,
    pub pending_delay: Duration,
    pub next_wake: Option<DateTime<Local>>,
    pub published: u64,
    pub skipped: u64,
}

impl Default for SchedulerState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            pending_delay: Duration::ZERO,
            next_wake: None,
            published: 0,
            skipped: 0,
        }
    }
}

/// Shared view of a running scheduler's [`SchedulerState`].
#[derive(Debug, Clone, Default)]
pub struct SchedulerStatus {
    inner: Arc<Mutex<SchedulerState>>,
}

impl SchedulerStatus {
    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> SchedulerState {
        self.lock().clone()
    }

    fn update(&self, f: impl FnOnce(&mut SchedulerState)) {
        f(&mut self.lock());
    }
}

/// The external collaborators a scheduler drives.
pub struct Collaborators {
    pub source: Box<dyn FeedSource>,
    pub enricher: Box<dyn Enricher>,
    pub fetcher: Box<dyn AttachmentFetcher>,
    pub publisher: Box<dyn Publisher>,
}

#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub cadence: Cadence,
    pub max_tries: usize,
    pub retry_backoff: Duration,
    pub max_history_size: usize,
    pub post_limits: PostLimits,
    pub poster_name: String,
}

impl SchedulerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            cadence: config.cadence(),
            max_tries: config.general.max_tries,
            retry_backoff: config.retry_backoff(),
            max_history_size: config.general.max_history_size,
            post_limits: config.post_limits(),
            poster_name: config.destination.poster_name.clone(),
        }
    }
}

pub struct Scheduler {
    source: Box<dyn FeedSource>,
    selector: SelectionService,
    fetcher: Box<dyn AttachmentFetcher>,
    publisher: Box<dyn Publisher>,
    post_limits: PostLimits,
    poster_name: String,
    cadence: Cadence,
    history: SharedHistory,
    status: SchedulerStatus,
    rng: StdRng,
}

impl Scheduler {
    pub fn new(collaborators: Collaborators, settings: SchedulerSettings) -> ReporterResult<Self> {
        let history = HistoryCache::new(settings.max_history_size)?;

        Ok(Self {
            source: collaborators.source,
            selector: SelectionService::new(
                collaborators.enricher,
                settings.max_tries,
                settings.retry_backoff,
            ),
            fetcher: collaborators.fetcher,
            publisher: collaborators.publisher,
            post_limits: settings.post_limits,
            poster_name: settings.poster_name,
            cadence: settings.cadence,
            history: SharedHistory::new(history),
            status: SchedulerStatus::default(),
            rng: StdRng::from_entropy(),
        })
    }

    /// Replace the random source, e.g. with a seeded one.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn history(&self) -> SharedHistory {
        self.history.clone()
    }

    pub fn status(&self) -> SchedulerStatus {
        self.status.clone()
    }

    pub fn state(&self) -> SchedulerState {
        self.status.snapshot()
    }

    fn set_phase(&self, phase: Phase) {
        self.status.update(|s| s.phase = phase);
    }

    /// One Publishing + Recording pass. Returns the key that was recorded.
    pub fn run_cycle(&mut self) -> ReporterResult<String> {
        self.set_phase(Phase::Publishing);

        let candidates = self.source.list_candidates()?;
        let selection = self
            .selector
            .select(&candidates, &self.history, &mut self.rng)?;
        let item = &selection.item;
        info!("Selected article: {}", item);

        let attachments = attachment_service::fetch_all(
            self.fetcher.as_ref(),
            &item.attachments,
            &item.url,
            self.post_limits.max_files,
        )?;
        let post = Post::compose(item, attachments, &self.post_limits, &self.poster_name);
        self.publisher.publish(&post)?;

        self.set_phase(Phase::Recording);
        self.history.add(&selection.candidate.key);

        Ok(selection.candidate.key)
    }

    /// Record the upcoming wait. `next_wake` stays `None` when `delay` does
    /// not fit in a wall-clock date.
    fn schedule(&self, delay: Duration) -> Option<DateTime<Local>> {
        let next_wake = chrono::Duration::from_std(delay)
            .ok()
            .and_then(|delta| Local::now().checked_add_signed(delta));
        self.status.update(|s| {
            s.phase = Phase::Waiting;
            s.pending_delay = delay;
            s.next_wake = next_wake;
        });
        next_wake
    }

    /// Run cycles until `stop` fires. Only the wait between cycles observes
    /// the signal; a cycle in progress always runs to completion.
    pub fn run(&mut self, stop: &StopSignal) {
        let mut delay = self.cadence.next_delay(&mut self.rng);
        info!("First article scheduled: {}", describe_wake(self.schedule(delay), delay));

        loop {
            if stop.wait_timeout(delay) {
                break;
            }

            match self.run_cycle() {
                Ok(key) => {
                    info!("Published article: {}", key);
                    self.status.update(|s| s.published += 1);
                    delay = self.cadence.next_delay(&mut self.rng);
                }
                Err(e) => {
                    error!("Exception while publishing, skipping article: {}", e);
                    self.status.update(|s| s.skipped += 1);
                }
            }

            info!("Next article scheduled: {}", describe_wake(self.schedule(delay), delay));
        }

        self.set_phase(Phase::Stopped);
        info!("Scheduler stopped");
    }
}

fn describe_wake(next_wake: Option<DateTime<Local>>, delay: Duration) -> String {
    match next_wake {
        Some(at) => at.to_rfc2822(),
        None => format!("in {}s", delay.as_secs()),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use crate::domain::{Attachment, Candidate, DedupField, Post};
    use crate::errors::{ReporterError, ReporterResult};
    use crate::services::{AttachmentFetcher, Publisher};
    use crate::sources::FeedSource;

    pub fn candidate(key: &str) -> Candidate {
        Candidate::new(DedupField::Link, format!("Title {}", key), key.to_string())
            .unwrap()
            .with_summary(Some(format!("<p>Summary of {}</p>", key)))
            .with_media(vec![format!("{}/image.jpg", key)])
    }

    /// Feed that always returns the same entries and counts calls.
    pub struct FixedSource {
        pub candidates: Vec<Candidate>,
        pub calls: Arc<AtomicUsize>,
    }

    impl FixedSource {
        pub fn new(keys: &[&str]) -> Self {
            Self {
                candidates: keys.iter().map(|k| candidate(k)).collect(),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl FeedSource for FixedSource {
        fn list_candidates(&self) -> ReporterResult<Vec<Candidate>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.candidates.clone())
        }
    }

    pub struct StubFetcher;

    impl AttachmentFetcher for StubFetcher {
        fn fetch(&self, url: &str, _referer: &str) -> ReporterResult<Attachment> {
            Ok(Attachment {
                filename: format!("{}.jpeg", url.len()),
                bytes: url.as_bytes().to_vec(),
                content_type: "image/jpeg".to_string(),
            })
        }
    }

    /// Records posts; fails the first `failures` calls.
    pub struct RecordingPublisher {
        pub posts: Arc<Mutex<Vec<Post>>>,
        pub failures: AtomicUsize,
    }

    impl RecordingPublisher {
        pub fn new(failures: usize) -> Self {
            Self {
                posts: Arc::new(Mutex::new(Vec::new())),
                failures: AtomicUsize::new(failures),
            }
        }
    }

    impl Publisher for RecordingPublisher {
        fn publish(&self, post: &Post) -> ReporterResult<()> {
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(ReporterError::Publish("502 Bad Gateway".to_string()));
            }
            self.posts.lock().unwrap().push(post.clone());
            Ok(())
        }
    }
}
