use std::any::Any;
use std::thread::{self, JoinHandle};

use log::info;

use crate::errors::{ReporterError, ReporterResult};
use crate::scheduler::{Scheduler, SchedulerState, SchedulerStatus, StopSignal};
use crate::storage::{HistoryCache, SharedHistory};

/// Handle to a scheduler running on its own thread.
pub struct Reporter {
    handle: JoinHandle<()>,
    stop: StopSignal,
    history: SharedHistory,
    status: SchedulerStatus,
}

impl Reporter {
    /// Start `scheduler` on a background thread right away.
    pub fn spawn(mut scheduler: Scheduler) -> ReporterResult<Self> {
        let stop = StopSignal::new();
        let history = scheduler.history();
        let status = scheduler.status();

        let thread_stop = stop.clone();
        let handle = thread::Builder::new()
            .name("reporter-scheduler".to_string())
            .spawn(move || scheduler.run(&thread_stop))?;

        Ok(Self {
            handle,
            stop,
            history,
            status,
        })
    }

    /// Ask the scheduler to stop at its next wait. Does not interrupt a cycle
    /// that is already publishing.
    pub fn stop(&self) {
        info!("Stop requested");
        self.stop.stop();
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn history(&self) -> HistoryCache {
        self.history.snapshot()
    }

    pub fn state(&self) -> SchedulerState {
        self.status.snapshot()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the scheduler thread exits.
    pub fn join(self) -> ReporterResult<()> {
        self.handle
            .join()
            .map_err(|panic| ReporterError::Worker(panic_message(panic.as_ref())))
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Post, PostLimits};
    use crate::scheduler::testing::{FixedSource, RecordingPublisher, StubFetcher};
    use crate::scheduler::{Cadence, Collaborators, Phase, SchedulerSettings};
    use crate::services::Publisher;
    use crate::sources::EntryEnricher;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::Ordering;
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    /// Publisher that reports when a publish starts and then holds it until
    /// released.
    struct GatedPublisher {
        started: Mutex<Sender<()>>,
        release: Mutex<Receiver<()>>,
        posts: Arc<Mutex<Vec<Post>>>,
    }

    impl Publisher for GatedPublisher {
        fn publish(&self, post: &Post) -> ReporterResult<()> {
            let _ = self.started.lock().unwrap().send(());
            let _ = self.release.lock().unwrap().recv();
            self.posts.lock().unwrap().push(post.clone());
            Ok(())
        }
    }

    fn settings(cadence: Cadence, max_history_size: usize) -> SchedulerSettings {
        SchedulerSettings {
            cadence,
            max_tries: 10,
            retry_backoff: Duration::ZERO,
            max_history_size,
            post_limits: PostLimits {
                max_subject_len: 50,
                max_message_len: 1000,
                max_files: 4,
            },
            poster_name: String::new(),
        }
    }

    fn scheduler(
        source: FixedSource,
        publisher: RecordingPublisher,
        cadence: Cadence,
        max_history_size: usize,
    ) -> Scheduler {
        Scheduler::new(
            Collaborators {
                source: Box::new(source),
                enricher: Box::new(EntryEnricher::new()),
                fetcher: Box::new(StubFetcher),
                publisher: Box::new(publisher),
            },
            settings(cadence, max_history_size),
        )
        .unwrap()
        .with_rng(StdRng::seed_from_u64(5))
    }

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        condition()
    }

    #[test]
    fn test_stop_during_wait_skips_publishing() {
        init_logging();
        let source = FixedSource::new(&["a", "b"]);
        let calls = source.calls.clone();
        let publisher = RecordingPublisher::new(0);
        let posts = publisher.posts.clone();

        let reporter = Reporter::spawn(scheduler(
            source,
            publisher,
            Cadence::from_secs(60, 30),
            3,
        ))
        .unwrap();

        assert!(wait_until(Duration::from_secs(5), || reporter.state().phase == Phase::Waiting));

        let started = Instant::now();
        reporter.stop();
        assert!(wait_until(Duration::from_secs(5), || reporter.is_finished()));
        assert!(started.elapsed() < Duration::from_secs(5));

        assert_eq!(reporter.state().phase, Phase::Stopped);
        reporter.join().unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(posts.lock().unwrap().is_empty());
    }

    #[test]
    fn test_publishes_distinct_items_until_stopped() {
        init_logging();
        let publisher = RecordingPublisher::new(0);
        let posts = publisher.posts.clone();

        let reporter = Reporter::spawn(scheduler(
            FixedSource::new(&["a", "b", "c"]),
            publisher,
            Cadence::new(Duration::from_millis(5), Duration::from_millis(5)),
            3,
        ))
        .unwrap();

        assert!(wait_until(Duration::from_secs(10), || posts.lock().unwrap().len() >= 3));
        reporter.stop();
        assert!(wait_until(Duration::from_secs(5), || reporter.is_finished()));

        let history = reporter.history();
        reporter.join().unwrap();

        // with every item in history, nothing else can be published
        let posts = posts.lock().unwrap();
        assert_eq!(posts.len(), 3);

        let mut subjects: Vec<&str> = posts.iter().map(|p| p.subject.as_str()).collect();
        subjects.sort();
        assert_eq!(subjects, vec!["Title a", "Title b", "Title c"]);

        assert_eq!(history.len(), 3);
        assert!(history.has("a") && history.has("b") && history.has("c"));
    }

    #[test]
    fn test_failed_cycle_does_not_stop_scheduler() {
        init_logging();
        let publisher = RecordingPublisher::new(2);
        let posts = publisher.posts.clone();

        let reporter = Reporter::spawn(scheduler(
            FixedSource::new(&["a"]),
            publisher,
            Cadence::new(Duration::from_millis(5), Duration::ZERO),
            3,
        ))
        .unwrap();

        assert!(wait_until(Duration::from_secs(10), || !posts.lock().unwrap().is_empty()));
        reporter.stop();
        assert!(wait_until(Duration::from_secs(5), || reporter.is_finished()));

        let state = reporter.state();
        reporter.join().unwrap();

        assert!(state.skipped >= 2);
        assert_eq!(state.published, 1);
        assert_eq!(posts.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_stop_while_publishing_finishes_cycle() {
        init_logging();
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let posts = Arc::new(Mutex::new(Vec::new()));
        let publisher = GatedPublisher {
            started: Mutex::new(started_tx),
            release: Mutex::new(release_rx),
            posts: posts.clone(),
        };

        let source = FixedSource::new(&["a", "b"]);
        let calls = source.calls.clone();
        let scheduler = Scheduler::new(
            Collaborators {
                source: Box::new(source),
                enricher: Box::new(EntryEnricher::new()),
                fetcher: Box::new(StubFetcher),
                publisher: Box::new(publisher),
            },
            settings(Cadence::new(Duration::from_millis(5), Duration::ZERO), 3),
        )
        .unwrap()
        .with_rng(StdRng::seed_from_u64(5));

        let reporter = Reporter::spawn(scheduler).unwrap();

        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(reporter.state().phase, Phase::Publishing);
        reporter.stop();
        release_tx.send(()).unwrap();

        assert!(wait_until(Duration::from_secs(5), || reporter.is_finished()));
        let state = reporter.state();
        let history = reporter.history();
        reporter.join().unwrap();

        let posts = posts.lock().unwrap();
        assert_eq!(posts.len(), 1);
        let key = posts[0].subject.trim_start_matches("Title ");
        assert!(history.has(key));
        assert_eq!(history.len(), 1);

        assert_eq!(state.phase, Phase::Stopped);
        assert_eq!(state.published, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_cycles_keep_pending_delay() {
        init_logging();
        let publisher = RecordingPublisher::new(usize::MAX);

        let reporter = Reporter::spawn(scheduler(
            FixedSource::new(&["a"]),
            publisher,
            Cadence::new(Duration::from_millis(5), Duration::from_millis(50)),
            3,
        ))
        .unwrap();

        assert!(wait_until(Duration::from_secs(5), || reporter.state().phase == Phase::Waiting));
        let first = reporter.state().pending_delay;

        assert!(wait_until(Duration::from_secs(10), || reporter.state().skipped >= 3));
        reporter.stop();
        assert!(wait_until(Duration::from_secs(5), || reporter.is_finished()));

        let state = reporter.state();
        reporter.join().unwrap();

        assert_eq!(state.published, 0);
        assert!(state.skipped >= 3);
        assert_eq!(state.pending_delay, first);
    }

    #[test]
    fn test_stop_signal_clone_stops_reporter() {
        let reporter = Reporter::spawn(scheduler(
            FixedSource::new(&["a"]),
            RecordingPublisher::new(0),
            Cadence::from_secs(60, 0),
            1,
        ))
        .unwrap();

        let signal = reporter.stop_signal();
        thread::spawn(move || signal.stop()).join().unwrap();

        reporter.join().unwrap();
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");

        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");

        let boxed: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
