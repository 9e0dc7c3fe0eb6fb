//! Analysis polling state machine.
//!
//! ```text
//! Idle --start/resume--> Analyzing --non-empty--> Suggesting
//!                          |  ^                      |
//!                          |  +-- empty / not ready  |
//!                          |      / error            |
//!                          +--budget spent--> Exhausted
//! any state --cancel--> Idle
//! ```
//!
//! The poller owns at most one polling task. The whole snapshot lives in a
//! `watch` channel and every mutation from the task goes through
//! `send_if_modified`, which checks the task's generation before touching
//! anything. `cancel` bumps the generation, so a response that arrives after
//! cancellation is dropped instead of reviving the poll. In-flight requests
//! are left to finish.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info_span, Instrument};

use vibepoint_gateway::{AnalysisBackend, GatewayError};
use vibepoint_models::{AnalysisJob, AnalysisTarget, SuggestionsResponse, VideoId, VideoKind};

use crate::error::WorkflowResult;
use crate::logging::WorkflowLogger;
use crate::retry::{FailureTracker, PollPolicy};

/// Consecutive fetch errors logged before suppression kicks in.
const MAX_LOGGED_FAILURES: u32 = 3;

const EVENT_CAPACITY: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollState {
    #[default]
    Idle,
    Analyzing,
    /// Suggestions arrived, terminal
    Suggesting,
    /// Attempt or time budget spent, terminal
    Exhausted,
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PollState::Suggesting | PollState::Exhausted)
    }
}

/// How a poll ended.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    Suggested(SuggestionsResponse),
    TimedOut { attempts: u32, elapsed: Duration },
    Cancelled,
}

/// Observable poller state.
#[derive(Debug, Clone, Default)]
pub struct PollSnapshot {
    /// Bumped by every start, resume and cancel
    pub generation: u64,
    pub state: PollState,
    pub video_id: Option<VideoId>,
    pub attempts: u32,
    /// Attempts answered with an empty suggestion list
    pub empty: u32,
    /// Attempts answered with `PLACEMENT_NOT_FOUND`
    pub not_ready: u32,
    /// Attempts that failed for any other reason
    pub errors: u32,
    /// Set once per generation when it ends
    pub outcome: Option<PollOutcome>,
}

/// Why a transition happened.
#[derive(Debug, Clone)]
pub enum PollReason {
    Started,
    Resumed,
    Empty,
    NotReady,
    Error(String),
    Suggested(SuggestionsResponse),
    TimedOut,
    Cancelled,
}

/// One state transition, including self-transitions while analyzing.
#[derive(Debug, Clone)]
pub struct PollEvent {
    pub generation: u64,
    pub attempt: u32,
    pub from: PollState,
    pub to: PollState,
    pub reason: PollReason,
}

/// Result of a single fetch, classified before it touches shared state.
enum Step {
    Empty,
    NotReady,
    Error(String),
    Suggested(SuggestionsResponse),
}

impl Step {
    fn classify(result: Result<SuggestionsResponse, GatewayError>) -> Self {
        match result {
            Ok(resp) if resp.has_suggestions() => Step::Suggested(resp),
            Ok(_) => Step::Empty,
            Err(e) if e.is_not_ready() => Step::NotReady,
            Err(e) => Step::Error(e.to_string()),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Step::Empty => "empty",
            Step::NotReady => "not_ready",
            Step::Error(_) => "error",
            Step::Suggested(_) => "suggested",
        }
    }
}

/// Polls the backend for suggestions until they arrive, the budget runs out,
/// or the poll is cancelled.
pub struct AnalysisPoller {
    backend: Arc<dyn AnalysisBackend>,
    policy: PollPolicy,
    state: Arc<watch::Sender<PollSnapshot>>,
    events: broadcast::Sender<PollEvent>,
    task: Option<JoinHandle<()>>,
}

impl AnalysisPoller {
    pub fn new(backend: Arc<dyn AnalysisBackend>, policy: PollPolicy) -> Self {
        let (state, _) = watch::channel(PollSnapshot::default());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            backend,
            policy,
            state: Arc::new(state),
            events,
            task: None,
        }
    }

    /// Start an analysis and poll for its suggestions.
    ///
    /// A poll already running is cancelled before the analysis request goes
    /// out. If the request fails the poller stays `Idle` and the error is
    /// returned.
    pub async fn start(
        &mut self,
        target: &AnalysisTarget,
        kind: VideoKind,
    ) -> WorkflowResult<AnalysisJob> {
        if self.task.is_some() {
            self.cancel();
        }
        let job = self.backend.start_analysis(target, kind).await?;
        self.begin(job.video_id.clone(), PollReason::Started);
        Ok(job)
    }

    /// Poll an analysis that is already running, without a new analysis call.
    pub fn resume(&mut self, video_id: VideoId) {
        self.begin(video_id, PollReason::Resumed);
    }

    /// Stop polling and return to `Idle`. A response still in flight is
    /// discarded when it arrives.
    pub fn cancel(&mut self) {
        let mut transition = None;
        self.state.send_modify(|s| {
            let from = s.state;
            s.generation += 1;
            s.state = PollState::Idle;
            s.outcome = Some(PollOutcome::Cancelled);
            transition = Some((s.generation, s.attempts, from));
        });

        if let Some((generation, attempt, from)) = transition {
            if from != PollState::Idle {
                self.emit(PollEvent {
                    generation,
                    attempt,
                    from,
                    to: PollState::Idle,
                    reason: PollReason::Cancelled,
                });
            }
        }

        // The task sees the new generation and exits on its own
        self.task.take();
    }

    /// Current state.
    pub fn snapshot(&self) -> PollSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver that observes every snapshot change.
    pub fn subscribe(&self) -> watch::Receiver<PollSnapshot> {
        self.state.subscribe()
    }

    /// Stream of transitions. Subscribe before `start` to see all of them.
    pub fn events(&self) -> broadcast::Receiver<PollEvent> {
        self.events.subscribe()
    }

    /// Wait until the current generation ends.
    pub async fn wait_for_outcome(&self) -> PollOutcome {
        await_outcome(self.subscribe()).await
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    fn begin(&mut self, video_id: VideoId, reason: PollReason) {
        if self.task.is_some() {
            self.cancel();
        }

        let mut generation = 0;
        let mut from = PollState::Idle;
        self.state.send_modify(|s| {
            from = s.state;
            generation = s.generation + 1;
            *s = PollSnapshot {
                generation,
                state: PollState::Analyzing,
                video_id: Some(video_id.clone()),
                ..Default::default()
            };
        });

        self.emit(PollEvent {
            generation,
            attempt: 0,
            from,
            to: PollState::Analyzing,
            reason,
        });

        let run = PollRun {
            backend: Arc::clone(&self.backend),
            policy: self.policy.clone(),
            state: Arc::clone(&self.state),
            events: self.events.clone(),
            generation,
            video_id,
        };
        self.task = Some(tokio::spawn(run.run()));
    }

    fn emit(&self, event: PollEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

impl Drop for AnalysisPoller {
    fn drop(&mut self) {
        self.state.send_modify(|s| {
            s.generation += 1;
            s.state = PollState::Idle;
            s.outcome = Some(PollOutcome::Cancelled);
        });
    }
}

/// Resolve once the generation current at call time ends.
///
/// An idle poller with nothing running resolves to `Cancelled` right away.
pub async fn await_outcome(mut rx: watch::Receiver<PollSnapshot>) -> PollOutcome {
    let generation = rx.borrow().generation;
    let ended = rx
        .wait_for(|s| {
            s.generation != generation || s.outcome.is_some() || s.state == PollState::Idle
        })
        .await;

    match ended {
        Ok(s) if s.generation == generation => s.outcome.clone().unwrap_or(PollOutcome::Cancelled),
        _ => PollOutcome::Cancelled,
    }
}

/// Everything one polling task needs, owned.
struct PollRun {
    backend: Arc<dyn AnalysisBackend>,
    policy: PollPolicy,
    state: Arc<watch::Sender<PollSnapshot>>,
    events: broadcast::Sender<PollEvent>,
    generation: u64,
    video_id: VideoId,
}

impl PollRun {
    async fn run(self) {
        let logger = WorkflowLogger::poll(&self.video_id, self.generation);
        let span = logger.span();
        self.poll(logger).instrument(span).await
    }

    async fn poll(self, logger: WorkflowLogger) {
        let mut cancelled = self.state.subscribe();
        let generation = self.generation;
        let started = Instant::now();
        let mut tracker = FailureTracker::new(self.video_id.clone(), MAX_LOGGED_FAILURES);
        let mut attempt = 0u32;

        logger.poll_started(&self.policy);

        loop {
            let elapsed = started.elapsed();
            if self.policy.is_exhausted(attempt, elapsed) {
                self.exhaust(&logger, attempt, elapsed);
                return;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.policy.delay_for_attempt(attempt)) => {}
                _ = cancelled.wait_for(|s| s.generation != generation) => {
                    debug!(video_id = %self.video_id, generation, "Poll cancelled between attempts");
                    return;
                }
            }

            attempt += 1;
            let result = self
                .backend
                .fetch_suggestions(&self.video_id)
                .instrument(info_span!("poll_attempt", video_id = %self.video_id, attempt))
                .await;
            let step = Step::classify(result);

            let applied = self.state.send_if_modified(|s| {
                if s.generation != generation || s.state != PollState::Analyzing {
                    return false;
                }
                s.attempts = attempt;
                match &step {
                    Step::Empty => s.empty += 1,
                    Step::NotReady => s.not_ready += 1,
                    Step::Error(_) => s.errors += 1,
                    Step::Suggested(resp) => {
                        s.state = PollState::Suggesting;
                        s.outcome = Some(PollOutcome::Suggested(resp.clone()));
                    }
                }
                true
            });

            if !applied {
                debug!(
                    video_id = %self.video_id,
                    generation,
                    attempt,
                    "Discarding response for a cancelled poll"
                );
                return;
            }

            counter!("poll_attempts_total", "outcome" => step.label()).increment(1);

            match step {
                Step::Suggested(resp) => {
                    tracker.record_success(attempt);
                    logger.suggestions_ready(attempt, resp.suggested_ads.len());
                    self.emit(attempt, PollState::Suggesting, PollReason::Suggested(resp));
                    return;
                }
                Step::Empty => {
                    tracker.record_success(attempt);
                    logger.attempt_pending(attempt, "empty");
                    self.emit(attempt, PollState::Analyzing, PollReason::Empty);
                }
                Step::NotReady => {
                    tracker.record_success(attempt);
                    logger.attempt_pending(attempt, "not_ready");
                    self.emit(attempt, PollState::Analyzing, PollReason::NotReady);
                }
                Step::Error(message) => {
                    tracker.record_failure(attempt, &message);
                    self.emit(attempt, PollState::Analyzing, PollReason::Error(message));
                }
            }
        }
    }

    fn exhaust(&self, logger: &WorkflowLogger, attempts: u32, elapsed: Duration) {
        let generation = self.generation;
        let applied = self.state.send_if_modified(|s| {
            if s.generation != generation || s.state != PollState::Analyzing {
                return false;
            }
            s.state = PollState::Exhausted;
            s.outcome = Some(PollOutcome::TimedOut { attempts, elapsed });
            true
        });

        if applied {
            logger.gave_up(attempts, elapsed);
            self.emit(attempts, PollState::Exhausted, PollReason::TimedOut);
        }
    }

    fn emit(&self, attempt: u32, to: PollState, reason: PollReason) {
        let _ = self.events.send(PollEvent {
            generation: self.generation,
            attempt,
            from: PollState::Analyzing,
            to,
            reason,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Notify;
    use vibepoint_gateway::GatewayResult;
    use vibepoint_models::UploadTicket;

    /// Scripted reply for one fetch.
    enum Reply {
        Empty,
        NotReady,
        Fail,
        Ads(usize),
        /// Waits for `release` before answering with ads
        Gated(usize),
    }

    struct ScriptedBackend {
        replies: Mutex<VecDeque<Reply>>,
        calls: AtomicUsize,
        entered: Notify,
        release: Notify,
        fail_analysis: AtomicBool,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<Reply>) -> Arc<Self> {
            Arc::new(Self::build(replies, false))
        }

        fn failing_analysis() -> Arc<Self> {
            Arc::new(Self::build(vec![], true))
        }

        fn build(replies: Vec<Reply>, fail_analysis: bool) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
                entered: Notify::new(),
                release: Notify::new(),
                fail_analysis: AtomicBool::new(fail_analysis),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn response(ads: usize) -> SuggestionsResponse {
        let suggested: Vec<_> = (0..ads)
            .map(|i| json!({ "id": format!("ad-{}", i), "clips": [] }))
            .collect();
        serde_json::from_value(json!({
            "video_id": "vid-1",
            "suggested_ads": suggested,
            "placement_count": ads
        }))
        .unwrap()
    }

    #[async_trait]
    impl AnalysisBackend for ScriptedBackend {
        async fn request_upload(&self, _filename: &str) -> GatewayResult<UploadTicket> {
            Err(GatewayError::validation("not scripted"))
        }

        async fn start_analysis(
            &self,
            target: &AnalysisTarget,
            kind: VideoKind,
        ) -> GatewayResult<AnalysisJob> {
            if self.fail_analysis.load(Ordering::SeqCst) {
                return Err(GatewayError::from_http_status(500, "boom"));
            }
            let video_id = match target {
                AnalysisTarget::VideoId(id) => id.clone(),
                AnalysisTarget::Path(_) => VideoId::from("vid-1"),
            };
            Ok(AnalysisJob {
                job_id: Some("task-1".into()),
                video_id,
                kind,
            })
        }

        async fn fetch_suggestions(&self, _video_id: &VideoId) -> GatewayResult<SuggestionsResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = self.replies.lock().unwrap().pop_front().unwrap_or(Reply::Empty);
            match reply {
                Reply::Empty => Ok(response(0)),
                Reply::NotReady => Err(GatewayError::NotReady("pending".into())),
                Reply::Fail => Err(GatewayError::from_http_status(502, "bad gateway")),
                Reply::Ads(n) => Ok(response(n)),
                Reply::Gated(n) => {
                    self.entered.notify_one();
                    self.release.notified().await;
                    Ok(response(n))
                }
            }
        }
    }

    fn drain(rx: &mut broadcast::Receiver<PollEvent>) -> Vec<PollEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_empty_then_suggestions() {
        let backend = ScriptedBackend::new(vec![Reply::Empty, Reply::NotReady, Reply::Empty, Reply::Ads(2)]);
        let mut poller = AnalysisPoller::new(backend.clone(), PollPolicy::default());
        let mut events = poller.events();

        let job = poller
            .start(&AnalysisTarget::Path("upload/a.mp4".into()), VideoKind::Creator)
            .await
            .unwrap();
        assert_eq!(job.video_id.as_str(), "vid-1");
        assert_eq!(poller.snapshot().state, PollState::Analyzing);

        let outcome = poller.wait_for_outcome().await;
        match outcome {
            PollOutcome::Suggested(resp) => assert_eq!(resp.suggested_ads.len(), 2),
            other => panic!("expected suggestions, got {:?}", other),
        }

        let events = drain(&mut events);
        let path: Vec<_> = std::iter::once(events[0].from)
            .chain(events.iter().map(|e| e.to))
            .collect();
        assert_eq!(
            path,
            vec![
                PollState::Idle,
                PollState::Analyzing,
                PollState::Analyzing,
                PollState::Analyzing,
                PollState::Analyzing,
                PollState::Suggesting,
            ]
        );
        let emitted = events
            .iter()
            .filter(|e| matches!(e.reason, PollReason::Suggested(_)))
            .count();
        assert_eq!(emitted, 1);

        let snapshot = poller.snapshot();
        assert_eq!(snapshot.state, PollState::Suggesting);
        assert_eq!(snapshot.attempts, 4);
        assert_eq!(snapshot.empty, 2);
        assert_eq!(snapshot.not_ready, 1);
        assert_eq!(snapshot.errors, 0);

        // Terminal: no more fetches
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(backend.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_fetch_waits_one_interval() {
        let backend = ScriptedBackend::new(vec![Reply::Ads(1)]);
        let mut poller = AnalysisPoller::new(backend.clone(), PollPolicy::fixed(Duration::from_secs(10)));
        poller.resume(VideoId::from("vid-1"));

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert_eq!(backend.calls(), 0);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_are_counted_separately_and_polling_continues() {
        let backend = ScriptedBackend::new(vec![Reply::Fail, Reply::Fail, Reply::Empty, Reply::Ads(1)]);
        let mut poller = AnalysisPoller::new(backend.clone(), PollPolicy::default());
        poller.resume(VideoId::from("vid-1"));

        assert!(matches!(poller.wait_for_outcome().await, PollOutcome::Suggested(_)));
        let snapshot = poller.snapshot();
        assert_eq!(snapshot.errors, 2);
        assert_eq!(snapshot.empty, 1);
        assert_eq!(snapshot.attempts, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_between_attempts_stops_fetching() {
        let backend = ScriptedBackend::new(vec![Reply::Empty, Reply::Empty, Reply::Ads(1)]);
        let mut poller = AnalysisPoller::new(backend.clone(), PollPolicy::default());
        let mut rx = poller.subscribe();
        poller.resume(VideoId::from("vid-1"));

        rx.wait_for(|s| s.attempts == 2).await.unwrap();
        poller.cancel();

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(backend.calls(), 2);
        let snapshot = poller.snapshot();
        assert_eq!(snapshot.state, PollState::Idle);
        assert!(matches!(snapshot.outcome, Some(PollOutcome::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_after_cancel_is_discarded() {
        let backend = ScriptedBackend::new(vec![Reply::Empty, Reply::Empty, Reply::Gated(3)]);
        let mut poller = AnalysisPoller::new(backend.clone(), PollPolicy::default());
        let mut events = poller.events();
        poller.resume(VideoId::from("vid-1"));

        // Third fetch is in flight
        backend.entered.notified().await;
        let waiter = tokio::spawn(await_outcome(poller.subscribe()));
        poller.cancel();
        backend.release.notify_one();

        tokio::time::sleep(Duration::from_secs(60)).await;

        assert!(matches!(waiter.await.unwrap(), PollOutcome::Cancelled));
        let snapshot = poller.snapshot();
        assert_eq!(snapshot.state, PollState::Idle);
        assert_eq!(snapshot.attempts, 2);
        assert!(matches!(snapshot.outcome, Some(PollOutcome::Cancelled)));
        assert_eq!(backend.calls(), 3);

        let events = drain(&mut events);
        assert!(events.iter().all(|e| !matches!(e.reason, PollReason::Suggested(_))));
        assert!(matches!(events.last().map(|e| &e.reason), Some(PollReason::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_cap_times_out() {
        let backend = ScriptedBackend::new(vec![]);
        let policy = PollPolicy::fixed(Duration::from_secs(10)).with_max_attempts(3);
        let mut poller = AnalysisPoller::new(backend.clone(), policy);
        poller.resume(VideoId::from("vid-1"));

        match poller.wait_for_outcome().await {
            PollOutcome::TimedOut { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("expected timeout, got {:?}", other),
        }
        assert_eq!(poller.snapshot().state, PollState::Exhausted);
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_cap_times_out() {
        let backend = ScriptedBackend::new(vec![]);
        let policy = PollPolicy::fixed(Duration::from_secs(10)).with_max_elapsed(Duration::from_secs(35));
        let mut poller = AnalysisPoller::new(backend.clone(), policy);
        poller.resume(VideoId::from("vid-1"));

        assert!(matches!(
            poller.wait_for_outcome().await,
            PollOutcome::TimedOut { attempts: 4, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_replaces_active_poll() {
        let backend = ScriptedBackend::new(vec![Reply::Empty, Reply::Empty, Reply::Ads(1)]);
        let mut poller = AnalysisPoller::new(backend.clone(), PollPolicy::default());
        let mut rx = poller.subscribe();

        poller.resume(VideoId::from("vid-1"));
        rx.wait_for(|s| s.attempts == 1).await.unwrap();
        let first_generation = poller.snapshot().generation;

        poller.resume(VideoId::from("vid-2"));
        let snapshot = poller.snapshot();
        assert!(snapshot.generation > first_generation);
        assert_eq!(snapshot.attempts, 0);
        assert_eq!(snapshot.video_id, Some(VideoId::from("vid-2")));

        assert!(matches!(poller.wait_for_outcome().await, PollOutcome::Suggested(_)));
        assert_eq!(poller.snapshot().attempts, 2);
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_analysis_stays_idle() {
        let backend = ScriptedBackend::failing_analysis();
        let mut poller = AnalysisPoller::new(backend.clone(), PollPolicy::default());

        let err = poller
            .start(&AnalysisTarget::VideoId("vid-9".into()), VideoKind::Creator)
            .await
            .unwrap_err();
        assert!(!err.is_not_ready());
        assert_eq!(poller.snapshot().state, PollState::Idle);
        assert_eq!(poller.snapshot().generation, 0);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_cancels_running_poll_before_analysis_request() {
        let backend = ScriptedBackend::new(vec![]);
        let mut poller = AnalysisPoller::new(backend.clone(), PollPolicy::default());
        let mut rx = poller.subscribe();
        poller.resume(VideoId::from("vid-1"));
        rx.wait_for(|s| s.attempts == 1).await.unwrap();

        backend.fail_analysis.store(true, Ordering::SeqCst);
        let err = poller
            .start(&AnalysisTarget::VideoId("vid-2".into()), VideoKind::Creator)
            .await
            .unwrap_err();
        assert!(!err.is_not_ready());

        let snapshot = poller.snapshot();
        assert_eq!(snapshot.state, PollState::Idle);
        assert!(matches!(snapshot.outcome, Some(PollOutcome::Cancelled)));

        // The old poll does not outlive the analysis request
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_polling() {
        let backend = ScriptedBackend::new(vec![]);
        let mut poller = AnalysisPoller::new(backend.clone(), PollPolicy::default());
        poller.resume(VideoId::from("vid-1"));
        drop(poller);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(backend.calls(), 0);
    }
}
