//! Referral batch orchestrator.
//!
//! Fans a batch out into one task per recipient. Each task runs
//! eligibility, record creation and email dispatch in order; the batch
//! resolves once every task has reached a terminal state.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use bridge_core::Referral;
use indexmap::IndexSet;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::batch::{BatchResult, RecipientFailure, SenderContext};
use crate::config::{DispatchFailurePolicy, ReferralConfig};
use crate::creator::ReferralRecordCreator;
use crate::dispatcher::EmailDispatcher;
use crate::eligibility::{Eligibility, EligibilityChecker};
use crate::ReferralError;

/// Record written by a pipeline, readable after the task is gone.
type CreatedSlot = Arc<OnceLock<Referral>>;

type PipelineTask = JoinHandle<Result<(), ReferralError>>;

/// Collaborators shared by every recipient pipeline.
struct Pipeline<E, C, D> {
    eligibility: E,
    creator: C,
    dispatcher: D,
    on_dispatch_failure: DispatchFailurePolicy,
}

impl<E, C, D> Pipeline<E, C, D>
where
    E: EligibilityChecker,
    C: ReferralRecordCreator,
    D: EmailDispatcher,
{
    /// Run one recipient. The created record is published to `created`
    /// before the invite is sent.
    async fn run(
        &self,
        sender: &SenderContext,
        candidate: &str,
        created: &OnceLock<Referral>,
    ) -> Result<(), ReferralError> {
        let verdict = self
            .eligibility
            .is_eligible(&sender.email, candidate)
            .await?;
        let recipient = match verdict {
            Eligibility::Eligible(recipient) => recipient,
            Eligibility::Ineligible(reason) => return Err(ReferralError::Ineligible { reason }),
        };

        let referral = self
            .creator
            .create_referral(&sender.marketing, &recipient)
            .await?;
        let referral = created.get_or_init(|| referral);

        if let Err(err) = self
            .dispatcher
            .send_email(&sender.email, &recipient, &sender.marketing)
            .await
        {
            self.reconcile(referral, "email failed").await;
            return Err(err);
        }
        Ok(())
    }

    /// Apply the dispatch failure policy to a record whose invite never went out.
    async fn reconcile(&self, referral: &Referral, cause: &'static str) {
        if self.on_dispatch_failure != DispatchFailurePolicy::Rollback {
            return;
        }
        if let Err(err) = self.creator.discard_referral(referral).await {
            tracing::warn!(
                referral = %referral.id,
                pair = %referral.pair(),
                cause,
                error = %err,
                "rollback did not complete"
            );
        }
    }
}

/// Sends referrals to many recipients, isolating each recipient's failure.
///
/// All operations are safe to call concurrently. Every batch gets its own
/// pool of `max_concurrency` permits, so a slow batch never holds back
/// another sender's recipients.
pub struct BatchOrchestrator<E, C, D> {
    pipeline: Arc<Pipeline<E, C, D>>,
    concurrency: usize,
    timeout: Option<Duration>,
}

impl<E, C, D> BatchOrchestrator<E, C, D>
where
    E: EligibilityChecker + 'static,
    C: ReferralRecordCreator + 'static,
    D: EmailDispatcher + 'static,
{
    /// Create an orchestrator over the given collaborators.
    #[must_use]
    pub fn new(eligibility: E, creator: C, dispatcher: D, config: &ReferralConfig) -> Self {
        Self {
            pipeline: Arc::new(Pipeline {
                eligibility,
                creator,
                dispatcher,
                on_dispatch_failure: config.on_dispatch_failure,
            }),
            concurrency: config.concurrency(),
            timeout: config.batch_timeout(),
        }
    }

    /// Run the referral pipeline for every recipient and report outcomes.
    ///
    /// Per-recipient errors never fail the call; they become `failures`
    /// entries. If a batch timeout is configured, recipients still running
    /// at the deadline are aborted and reported as `"timeout"`. A record
    /// already written for an aborted recipient is handled like a failed
    /// email, according to the dispatch failure policy.
    ///
    /// # Errors
    /// Returns [`ReferralError::Structural`] for an empty recipient list and
    /// [`ReferralError::Validation`] when the list names a recipient twice.
    pub async fn send_referral_batch(
        &self,
        sender: &SenderContext,
        recipients: Vec<String>,
    ) -> Result<BatchResult, ReferralError> {
        if recipients.is_empty() {
            return Err(ReferralError::Structural(
                "recipient list is empty".to_owned(),
            ));
        }
        let mut seen = IndexSet::with_capacity(recipients.len());
        for candidate in &recipients {
            if !seen.insert(candidate.trim().to_lowercase()) {
                return Err(ReferralError::Validation(format!(
                    "duplicate recipient '{candidate}' in batch"
                )));
            }
        }

        tracing::info!(
            sender = %sender.email,
            recipients = recipients.len(),
            "dispatching referral batch"
        );

        let deadline = self.timeout.map(|t| Instant::now() + t);
        let permits = Arc::new(Semaphore::new(self.concurrency));
        let sender = Arc::new(sender.clone());
        let tasks: Vec<(CreatedSlot, PipelineTask)> = recipients
            .iter()
            .map(|candidate| {
                let pipeline = Arc::clone(&self.pipeline);
                let permits = Arc::clone(&permits);
                let sender = Arc::clone(&sender);
                let created = CreatedSlot::default();
                let slot = Arc::clone(&created);
                let candidate = candidate.clone();
                let handle = tokio::spawn(async move {
                    let _permit = permits
                        .acquire_owned()
                        .await
                        .map_err(|_| ReferralError::Aborted)?;
                    pipeline.run(&sender, &candidate, &slot).await
                });
                (created, handle)
            })
            .collect();

        // One write-once slot per submitted recipient, in submission order.
        let mut outcomes = Vec::with_capacity(tasks.len());
        for (created, mut handle) in tasks {
            let joined = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, &mut handle).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        outcomes.push(self.expire(handle, &created).await);
                        continue;
                    }
                },
                None => handle.await,
            };
            outcomes.push(joined.unwrap_or_else(|join_err| {
                tracing::error!(error = %join_err, "recipient pipeline task failed");
                Err(ReferralError::Aborted)
            }));
        }

        let mut result = BatchResult::default();
        for (candidate, outcome) in recipients.into_iter().zip(outcomes) {
            match outcome {
                Ok(()) => result.successes.push(candidate),
                Err(err) => {
                    tracing::debug!(
                        recipient = %candidate,
                        error = %err,
                        code = err.code(),
                        "recipient failed"
                    );
                    result.failures.push(RecipientFailure::new(candidate, &err));
                }
            }
        }

        tracing::info!(
            sender = %sender.email,
            successes = result.successes.len(),
            failures = result.failures.len(),
            "referral batch complete"
        );
        Ok(result)
    }

    /// Abort a pipeline that missed the batch deadline.
    ///
    /// The task is joined after the abort so its record slot is final
    /// before it is read.
    async fn expire(
        &self,
        handle: PipelineTask,
        created: &OnceLock<Referral>,
    ) -> Result<(), ReferralError> {
        handle.abort();
        match handle.await {
            // Finished between the deadline and the abort.
            Ok(outcome) => outcome,
            Err(join_err) if join_err.is_cancelled() => {
                if let Some(referral) = created.get() {
                    tracing::warn!(
                        referral = %referral.id,
                        pair = %referral.pair(),
                        "referral recorded but invite not sent before deadline"
                    );
                    self.pipeline.reconcile(referral, "batch timeout").await;
                }
                Err(ReferralError::Timeout)
            }
            Err(join_err) => {
                tracing::error!(error = %join_err, "recipient pipeline task failed");
                Err(ReferralError::Aborted)
            }
        }
    }
}
