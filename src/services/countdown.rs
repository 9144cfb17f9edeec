//! Client-side exam timer.
//!
//! An [`ExamAttempt`] owns the answers recorded so far and a background task
//! that publishes the remaining time once per second. Whichever comes first,
//! a manual [`ExamAttempt::submit`] or the deadline, hands the answers to the
//! [`AnswerSink`] exactly once and closes the attempt.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep_until, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::services::exam::{AnswerSet, AnswerValue};

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    Manual,
    Deadline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CountdownError {
    #[error("attempt is already closed")]
    AttemptClosed,
}

/// Receives the final answer set of an attempt.
#[async_trait]
pub trait AnswerSink: Send + Sync + 'static {
    type Outcome: Send + 'static;

    async fn submit(&self, answers: AnswerSet, trigger: SubmitTrigger) -> Self::Outcome;
}

struct Shared<S> {
    /// `None` once the answers have been handed to the sink.
    answers: Mutex<Option<AnswerSet>>,
    sink: S,
}

impl<S: AnswerSink> Shared<S> {
    async fn close_and_submit(&self, trigger: SubmitTrigger) -> Option<S::Outcome> {
        let answers = self.answers.lock().await.take()?;
        tracing::info!(?trigger, answered = answers.len(), "Submitting exam attempt");
        Some(self.sink.submit(answers, trigger).await)
    }
}

pub struct ExamAttempt<S: AnswerSink> {
    shared: Arc<Shared<S>>,
    deadline: Instant,
    remaining: watch::Receiver<Duration>,
    cancel: CancellationToken,
    timer: Option<JoinHandle<Option<S::Outcome>>>,
}

impl<S: AnswerSink> ExamAttempt<S> {
    /// Starts the countdown. The deadline is fixed here and never recomputed.
    /// Must be called inside a Tokio runtime.
    pub fn start(duration: Duration, sink: S) -> Self {
        let deadline = Instant::now() + duration;
        let shared = Arc::new(Shared { answers: Mutex::new(Some(AnswerSet::new())), sink });
        let (remaining_tx, remaining) = watch::channel(duration);
        let cancel = CancellationToken::new();

        let timer = tokio::spawn(run_countdown(
            Arc::clone(&shared),
            deadline,
            remaining_tx,
            cancel.clone(),
        ));

        Self { shared, deadline, remaining, cancel, timer: Some(timer) }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Remaining time, refreshed every tick. Reaches zero at the deadline.
    pub fn remaining(&self) -> watch::Receiver<Duration> {
        self.remaining.clone()
    }

    pub async fn is_closed(&self) -> bool {
        self.shared.answers.lock().await.is_none()
    }

    pub async fn record_answer(
        &self,
        question_id: impl Into<String>,
        value: AnswerValue,
    ) -> Result<(), CountdownError> {
        let mut answers = self.shared.answers.lock().await;
        let answers = answers.as_mut().ok_or(CountdownError::AttemptClosed)?;
        answers.insert(question_id, value);
        Ok(())
    }

    /// Submits now and cancels the pending auto-submit.
    pub async fn submit(&self) -> Result<S::Outcome, CountdownError> {
        self.cancel.cancel();
        self.shared
            .close_and_submit(SubmitTrigger::Manual)
            .await
            .ok_or(CountdownError::AttemptClosed)
    }

    /// Waits for the timer task. Yields the sink's outcome when the deadline
    /// fired the submission, `None` when it was cancelled or already awaited.
    pub async fn auto_submitted(&mut self) -> Option<S::Outcome> {
        let timer = self.timer.take()?;
        match timer.await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(error = %err, "Countdown task join failed");
                None
            }
        }
    }
}

impl<S: AnswerSink> Drop for ExamAttempt<S> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_countdown<S: AnswerSink>(
    shared: Arc<Shared<S>>,
    deadline: Instant,
    remaining_tx: watch::Sender<Duration>,
    cancel: CancellationToken,
) -> Option<S::Outcome> {
    let mut ticker = interval(TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        remaining_tx.send_replace(remaining);
        if remaining.is_zero() {
            break;
        }

        tokio::select! {
            _ = cancel.cancelled() => return None,
            _ = sleep_until(deadline) => {}
            _ = ticker.tick() => {}
        }
    }

    if cancel.is_cancelled() {
        return None;
    }
    shared.close_and_submit(SubmitTrigger::Deadline).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    #[derive(Default, Clone)]
    struct RecordingSink {
        calls: Arc<StdMutex<Vec<(AnswerSet, SubmitTrigger)>>>,
    }

    impl RecordingSink {
        fn calls(&self) -> Vec<(AnswerSet, SubmitTrigger)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AnswerSink for RecordingSink {
        type Outcome = usize;

        async fn submit(&self, answers: AnswerSet, trigger: SubmitTrigger) -> usize {
            let count = answers.len();
            self.calls.lock().unwrap().push((answers, trigger));
            count
        }
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_submits_accumulated_answers_once() {
        let sink = RecordingSink::default();
        let mut attempt = ExamAttempt::start(Duration::from_secs(3), sink.clone());
        attempt.record_answer("q1", AnswerValue::Index(2)).await.unwrap();
        attempt.record_answer("q2", AnswerValue::Flag(true)).await.unwrap();

        assert_eq!(attempt.auto_submitted().await, Some(2));

        let calls = sink.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, SubmitTrigger::Deadline);
        assert_eq!(calls[0].0.get("q1"), Some(&AnswerValue::Index(2)));
        assert!(attempt.is_closed().await);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(sink.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_attempt_rejects_answers_and_submits() {
        let sink = RecordingSink::default();
        let mut attempt = ExamAttempt::start(Duration::from_secs(1), sink.clone());
        attempt.auto_submitted().await;

        assert_eq!(
            attempt.record_answer("q1", AnswerValue::Flag(false)).await,
            Err(CountdownError::AttemptClosed)
        );
        assert_eq!(attempt.submit().await, Err(CountdownError::AttemptClosed));
        assert_eq!(sink.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_submit_cancels_auto_submit() {
        let sink = RecordingSink::default();
        let mut attempt = ExamAttempt::start(Duration::from_secs(60), sink.clone());
        attempt.record_answer("q1", AnswerValue::Text("answer".into())).await.unwrap();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(attempt.submit().await, Ok(1));
        assert_eq!(attempt.submit().await, Err(CountdownError::AttemptClosed));

        assert_eq!(attempt.auto_submitted().await, None);
        tokio::time::sleep(Duration::from_secs(120)).await;

        let calls = sink.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, SubmitTrigger::Manual);
    }

    #[tokio::test(start_paused = true)]
    async fn remaining_time_ticks_down_to_zero() {
        let sink = RecordingSink::default();
        let mut attempt = ExamAttempt::start(Duration::from_secs(3), sink);
        let remaining = attempt.remaining();
        assert_eq!(attempt.deadline() - Instant::now(), Duration::from_secs(3));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(*remaining.borrow(), Duration::from_secs(2));

        attempt.auto_submitted().await;
        assert_eq!(*remaining.borrow(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_attempt_cancels_timer() {
        let sink = RecordingSink::default();
        let attempt = ExamAttempt::start(Duration::from_secs(2), sink.clone());
        attempt.record_answer("q1", AnswerValue::Index(0)).await.unwrap();
        drop(attempt);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(sink.calls().is_empty());
    }
}
