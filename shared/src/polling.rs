use std::future::Future;
use std::time::Duration;

use crate::error::{ClientError, PollError};
use crate::models::{AnalysisResult, ResultPayload, UploadStatus};

pub const POLL_INTERVAL_MS: u64 = 2000;
pub const PROGRESS_TICK_MS: u32 = 400;
pub const PROGRESS_CAP: f64 = 90.0;
pub const PROGRESS_MAX_STEP: f64 = 10.0;
pub const COMPLETE_DELAY_MS: u32 = 500;

/// What a single result fetch produced.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    Ready(T),
    NotYetAvailable,
    Failed(ClientError),
}

/// Interprets a `GET /result/{id}` response that was not a 401.
pub fn classify_result_response(status: u16, body: &str) -> FetchOutcome<AnalysisResult> {
    match status {
        202 => FetchOutcome::NotYetAvailable,
        200..=299 => {
            let trimmed = body.trim();
            if trimmed.is_empty() || trimmed == "null" || trimmed == "{}" {
                return FetchOutcome::NotYetAvailable;
            }
            match serde_json::from_str::<ResultPayload>(trimmed) {
                Ok(payload) => match payload.into_ready() {
                    Ok(Some(result)) => FetchOutcome::Ready(result),
                    Ok(None) => FetchOutcome::NotYetAvailable,
                    Err(e) => FetchOutcome::Failed(e),
                },
                Err(e) => FetchOutcome::Failed(ClientError::Decode(e.to_string())),
            }
        }
        404 => match crate::error::extract_detail(body) {
            Some(detail) if detail.to_ascii_lowercase().contains("processing") => {
                FetchOutcome::NotYetAvailable
            }
            _ => FetchOutcome::Failed(ClientError::from_response(status, body)),
        },
        _ => FetchOutcome::Failed(ClientError::from_response(status, body)),
    }
}

impl<T> FetchOutcome<T> {
    /// Settles a not-ready result against the upload's own status.
    ///
    /// The backend answers "still processing" for uploads whose analysis
    /// failed, so only the upload record tells the two apart.
    pub fn settle(self, upload_status: Option<UploadStatus>) -> Self {
        match (self, upload_status) {
            (FetchOutcome::NotYetAvailable, Some(UploadStatus::Failed)) => {
                FetchOutcome::Failed(ClientError::AnalysisFailed)
            }
            (outcome, _) => outcome,
        }
    }

    pub fn is_not_ready(&self) -> bool {
        matches!(self, FetchOutcome::NotYetAvailable)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_backoff: Duration,
    pub max_attempts: u32,
    pub max_consecutive_failures: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(POLL_INTERVAL_MS),
            max_backoff: Duration::from_secs(16),
            max_attempts: 150,
            max_consecutive_failures: 5,
        }
    }
}

impl PollPolicy {
    /// Delay after the `failures`-th consecutive failure: interval, 2x, 4x ... capped.
    pub fn backoff(&self, failures: u32) -> Duration {
        let factor = 1u32.checked_shl(failures.saturating_sub(1)).unwrap_or(u32::MAX);
        self.interval
            .checked_mul(factor)
            .map_or(self.max_backoff, |d| d.min(self.max_backoff))
            .max(self.interval)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollState {
    Submitted,
    Polling { attempt: u32 },
    StillProcessing { attempt: u32, retry_in: Duration },
    TransportError { attempt: u32, reason: ClientError, retry_in: Duration },
    Ready,
    Displayed,
    TimedOut,
    Failed(PollError),
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PollState::Ready | PollState::Displayed | PollState::TimedOut | PollState::Failed(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollStep<T> {
    Retry(Duration),
    Ready(T),
    Stop(PollError),
}

/// Result-polling state machine; the async driver lives in [`poll_until_ready`].
#[derive(Debug, Clone)]
pub struct Poller {
    policy: PollPolicy,
    state: PollState,
    attempts: u32,
    consecutive_failures: u32,
}

impl Poller {
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            state: PollState::Submitted,
            attempts: 0,
            consecutive_failures: 0,
        }
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Delay before the first request. The backend rarely finishes instantly.
    pub fn first_delay(&self) -> Duration {
        self.policy.interval
    }

    /// Marks a request as in flight and returns its 1-based attempt number.
    pub fn begin_attempt(&mut self) -> Option<u32> {
        if self.state.is_terminal() {
            return None;
        }
        self.attempts += 1;
        self.state = PollState::Polling {
            attempt: self.attempts,
        };
        Some(self.attempts)
    }

    /// Feeds the outcome of the current attempt. `None` once a terminal state was reached.
    pub fn record<T>(&mut self, outcome: FetchOutcome<T>) -> Option<PollStep<T>> {
        if self.state.is_terminal() {
            return None;
        }
        let attempt = self.attempts;
        let step = match outcome {
            FetchOutcome::Ready(value) => {
                self.state = PollState::Ready;
                return Some(PollStep::Ready(value));
            }
            FetchOutcome::NotYetAvailable => {
                self.consecutive_failures = 0;
                let retry_in = self.policy.interval;
                self.state = PollState::StillProcessing { attempt, retry_in };
                PollStep::Retry(retry_in)
            }
            FetchOutcome::Failed(reason) if !reason.is_retryable() => {
                log::warn!("Result poll rejected on attempt {}: {}", attempt, reason);
                return Some(self.fail(PollError::Rejected(reason)));
            }
            FetchOutcome::Failed(reason) => {
                self.consecutive_failures += 1;
                if self.consecutive_failures >= self.policy.max_consecutive_failures {
                    log::warn!(
                        "Giving up after {} consecutive failures: {}",
                        self.consecutive_failures,
                        reason
                    );
                    return Some(self.fail(PollError::GaveUp(reason)));
                }
                let retry_in = self.policy.backoff(self.consecutive_failures);
                log::debug!("Result poll attempt {} failed ({}), retry in {:?}", attempt, reason, retry_in);
                self.state = PollState::TransportError {
                    attempt,
                    reason,
                    retry_in,
                };
                PollStep::Retry(retry_in)
            }
        };

        if attempt >= self.policy.max_attempts {
            log::warn!("Result polling timed out after {} attempts", attempt);
            self.state = PollState::TimedOut;
            return Some(PollStep::Stop(PollError::TimedOut { attempts: attempt }));
        }
        Some(step)
    }

    /// `Ready -> Displayed`. True only for the first call, so the view switches once.
    pub fn mark_displayed(&mut self) -> bool {
        if self.state == PollState::Ready {
            self.state = PollState::Displayed;
            true
        } else {
            false
        }
    }

    fn fail<T>(&mut self, error: PollError) -> PollStep<T> {
        self.state = PollState::Failed(error.clone());
        PollStep::Stop(error)
    }
}

/// Drives a [`Poller`]: wait, fetch, repeat until ready or a terminal error.
///
/// Requests are strictly sequential. `sleep` is injected so the browser can
/// use timers and tests can record the delays.
pub async fn poll_until_ready<T, F, Fut, S, SFut>(
    poller: &mut Poller,
    mut fetch: F,
    mut sleep: S,
) -> Result<T, PollError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = FetchOutcome<T>>,
    S: FnMut(Duration) -> SFut,
    SFut: Future<Output = ()>,
{
    let mut delay = poller.first_delay();
    loop {
        sleep(delay).await;
        let attempt = poller.begin_attempt().ok_or(PollError::AlreadyFinished)?;
        let outcome = fetch(attempt).await;
        match poller.record(outcome).ok_or(PollError::AlreadyFinished)? {
            PollStep::Retry(next) => delay = next,
            PollStep::Ready(value) => return Ok(value),
            PollStep::Stop(error) => return Err(error),
        }
    }
}

/// Purely cosmetic "processing" percentage; it has no link to backend progress.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CosmeticProgress {
    value: f64,
    complete: bool,
}

impl CosmeticProgress {
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn percent(&self) -> u8 {
        self.value.round().clamp(0.0, 100.0) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Advances by `step` (clamped to `[0, PROGRESS_MAX_STEP]`) without passing the cap.
    pub fn tick(&mut self, step: f64) {
        if self.complete || !step.is_finite() {
            return;
        }
        let step = step.clamp(0.0, PROGRESS_MAX_STEP);
        self.value = (self.value + step).min(PROGRESS_CAP).max(self.value);
    }

    pub fn complete(&mut self) {
        self.complete = true;
        self.value = 100.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::future::ready;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    fn result(label: &str) -> AnalysisResult {
        serde_json::from_value(serde_json::json!({
            "upload_id": "abc123",
            "overall_classification": label,
            "confidence_score": 0.87,
            "predictions": [{"label": "Scoliosis", "probability": 0.87, "description": "Lateral curvature"}],
            "heatmap_url": "/files/heatmaps/abc123.png"
        }))
        .unwrap()
    }

    struct Script {
        outcomes: RefCell<VecDeque<FetchOutcome<AnalysisResult>>>,
        requests: RefCell<Vec<u32>>,
        sleeps: RefCell<Vec<Duration>>,
    }

    impl Script {
        fn new(outcomes: Vec<FetchOutcome<AnalysisResult>>) -> Self {
            Self {
                outcomes: RefCell::new(outcomes.into()),
                requests: RefCell::new(Vec::new()),
                sleeps: RefCell::new(Vec::new()),
            }
        }

        fn run(&self, policy: PollPolicy) -> (Result<AnalysisResult, PollError>, Poller) {
            let mut poller = Poller::new(policy);
            let outcome = block_on(poll_until_ready(
                &mut poller,
                |attempt| {
                    self.requests.borrow_mut().push(attempt);
                    let next = self
                        .outcomes
                        .borrow_mut()
                        .pop_front()
                        .unwrap_or(FetchOutcome::NotYetAvailable);
                    ready(next)
                },
                |delay| {
                    self.sleeps.borrow_mut().push(delay);
                    ready(())
                },
            ));
            (outcome, poller)
        }
    }

    #[test]
    fn test_ready_on_fourth_attempt() {
        let expected = result("Abnormal - High Risk");
        let script = Script::new(vec![
            FetchOutcome::NotYetAvailable,
            FetchOutcome::NotYetAvailable,
            FetchOutcome::NotYetAvailable,
            FetchOutcome::Ready(expected.clone()),
        ]);
        let policy = PollPolicy::default();
        let (outcome, poller) = script.run(policy.clone());

        assert_eq!(outcome, Ok(expected));
        assert_eq!(script.requests.borrow().as_slice(), &[1, 2, 3, 4]);
        let sleeps = script.sleeps.borrow();
        assert_eq!(sleeps.len(), 4);
        assert!(sleeps.iter().all(|d| *d >= policy.interval));
        assert_eq!(poller.state(), &PollState::Ready);
    }

    #[test]
    fn test_transition_happens_once() {
        let script = Script::new(vec![FetchOutcome::Ready(result("Normal"))]);
        let (_, mut poller) = script.run(PollPolicy::default());

        assert!(poller.mark_displayed());
        assert!(!poller.mark_displayed());
        assert_eq!(poller.record(FetchOutcome::Ready(result("Normal"))), None);
        assert_eq!(poller.begin_attempt(), None);
        assert_eq!(poller.state(), &PollState::Displayed);
    }

    #[test]
    fn test_transport_errors_back_off() {
        let flaky = || FetchOutcome::Failed(ClientError::Transport("connection reset".into()));
        let script = Script::new(vec![flaky(), flaky(), flaky(), FetchOutcome::Ready(result("Normal"))]);
        let (outcome, _) = script.run(PollPolicy::default());

        assert!(outcome.is_ok());
        let sleeps: Vec<u64> = script.sleeps.borrow().iter().map(|d| d.as_millis() as u64).collect();
        assert_eq!(sleeps, vec![2000, 2000, 4000, 8000]);
    }

    #[test]
    fn test_gives_up_after_consecutive_failures() {
        let script = Script::new((0..10).map(|_| FetchOutcome::Failed(ClientError::Server(503))).collect());
        let (outcome, poller) = script.run(PollPolicy::default());

        assert_eq!(outcome, Err(PollError::GaveUp(ClientError::Server(503))));
        assert_eq!(script.requests.borrow().len(), 5);
        assert!(matches!(poller.state(), PollState::Failed(_)));
    }

    #[test]
    fn test_not_ready_resets_failure_streak() {
        let fail = || FetchOutcome::Failed(ClientError::Transport("offline".into()));
        let mut outcomes = vec![fail(), fail(), FetchOutcome::NotYetAvailable, fail(), fail()];
        outcomes.push(FetchOutcome::Ready(result("Normal")));
        let script = Script::new(outcomes);
        let policy = PollPolicy {
            max_consecutive_failures: 3,
            ..PollPolicy::default()
        };
        let (outcome, _) = script.run(policy);
        assert!(outcome.is_ok());
        assert_eq!(script.requests.borrow().len(), 6);
    }

    #[test]
    fn test_unauthorized_stops_immediately() {
        let script = Script::new(vec![FetchOutcome::Failed(ClientError::Unauthorized)]);
        let (outcome, _) = script.run(PollPolicy::default());
        assert_eq!(outcome, Err(PollError::Rejected(ClientError::Unauthorized)));
        assert_eq!(script.requests.borrow().len(), 1);
    }

    #[test]
    fn test_bounded_attempts() {
        let script = Script::new(Vec::new());
        let policy = PollPolicy {
            max_attempts: 7,
            ..PollPolicy::default()
        };
        let (outcome, poller) = script.run(policy);
        assert_eq!(outcome, Err(PollError::TimedOut { attempts: 7 }));
        assert_eq!(script.requests.borrow().len(), 7);
        assert_eq!(poller.state(), &PollState::TimedOut);
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = PollPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_millis(2000));
        assert_eq!(policy.backoff(4), Duration::from_millis(16000));
        assert_eq!(policy.backoff(40), Duration::from_millis(16000));
    }

    #[test]
    fn test_classify_result_responses() {
        assert_eq!(classify_result_response(202, ""), FetchOutcome::NotYetAvailable);
        assert_eq!(classify_result_response(200, "null"), FetchOutcome::NotYetAvailable);
        assert_eq!(
            classify_result_response(404, r#"{"detail":"Result not found. Analysis may still be processing."}"#),
            FetchOutcome::NotYetAvailable
        );
        assert!(matches!(
            classify_result_response(404, r#"{"detail":"Upload not found"}"#),
            FetchOutcome::Failed(ClientError::BackendRejected { status: 404, .. })
        ));
        assert!(matches!(
            classify_result_response(500, ""),
            FetchOutcome::Failed(ClientError::Server(500))
        ));
        assert!(matches!(
            classify_result_response(200, "{not json"),
            FetchOutcome::Failed(ClientError::Decode(_))
        ));

        let body = serde_json::json!({
            "result": result("Normal"),
            "upload_info": {"file_name": "a.png", "uploaded_at": "2026-01-01T00:00:00", "status": "done"}
        })
        .to_string();
        assert_eq!(classify_result_response(200, &body), FetchOutcome::Ready(result("Normal")));
    }

    #[test]
    fn test_failed_upload_is_terminal() {
        let body = serde_json::json!({
            "result": result("Normal"),
            "upload_info": {"file_name": "a.png", "uploaded_at": "2026-01-01T00:00:00", "status": "failed"}
        })
        .to_string();
        assert_eq!(
            classify_result_response(200, &body),
            FetchOutcome::Failed(ClientError::AnalysisFailed)
        );

        let processing = classify_result_response(
            404,
            r#"{"detail":"Result not found. Analysis may still be processing."}"#,
        );
        assert!(processing.is_not_ready());
        assert_eq!(
            processing.clone().settle(Some(UploadStatus::Failed)),
            FetchOutcome::Failed(ClientError::AnalysisFailed)
        );
        assert_eq!(processing.clone().settle(Some(UploadStatus::Processing)), FetchOutcome::NotYetAvailable);
        assert_eq!(processing.settle(None), FetchOutcome::NotYetAvailable);
        assert_eq!(
            FetchOutcome::Ready(result("Normal")).settle(Some(UploadStatus::Failed)),
            FetchOutcome::Ready(result("Normal"))
        );
    }

    #[test]
    fn test_failed_analysis_stops_polling() {
        let script = Script::new(vec![
            FetchOutcome::NotYetAvailable,
            FetchOutcome::NotYetAvailable.settle(Some(UploadStatus::Failed)),
            FetchOutcome::Ready(result("Normal")),
        ]);
        let (outcome, poller) = script.run(PollPolicy::default());

        assert_eq!(outcome, Err(PollError::Rejected(ClientError::AnalysisFailed)));
        assert_eq!(script.requests.borrow().as_slice(), &[1, 2]);
        assert_eq!(
            poller.state(),
            &PollState::Failed(PollError::Rejected(ClientError::AnalysisFailed))
        );
    }

    #[test]
    fn test_cosmetic_progress_caps_and_completes() {
        let mut progress = CosmeticProgress::default();
        let mut last = progress.value();
        for step in [9.9, 3.0, -5.0, 12.0, 9.0, 9.0, 9.0, 9.0, 9.0, 9.0, 9.0, 9.0, f64::NAN] {
            progress.tick(step);
            assert!(progress.value() >= last);
            assert!(progress.value() <= PROGRESS_CAP);
            last = progress.value();
        }
        assert_eq!(progress.value(), PROGRESS_CAP);
        assert!(!progress.is_complete());
        assert!(progress.percent() < 100);

        progress.complete();
        assert_eq!(progress.percent(), 100);
        progress.tick(5.0);
        assert_eq!(progress.value(), 100.0);
    }
}
