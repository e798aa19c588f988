//! Async task polling for the Ark batch protocol
//!
//! Video and 3D generation return a task handle instead of a result. The
//! poller sleeps a fixed 10 s between status queries until the task reaches
//! a terminal state or the attempt budget runs out. The fixed interval (no
//! backoff) matches the provider's rate expectations.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;

use crate::backends::ark;
use crate::client::Http;
use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};
use crate::request::CancelToken;

/// Fixed wait between status queries
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Attempt budget for one task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget {
    pub attempts: u32,
}

impl PollBudget {
    /// Video tasks: 120 polls, roughly 20 minutes
    pub const VIDEO: PollBudget = PollBudget { attempts: 120 };
    /// 3D tasks: 60 polls, roughly 10 minutes
    pub const MODEL3D: PollBudget = PollBudget { attempts: 60 };
}

/// Task lifecycle states as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
    Expired,
    Cancelled,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Expired | Self::Cancelled)
    }
}

/// Result payload of a finished task
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskContent {
    pub video_url: Option<String>,
    pub file_url: Option<String>,
    pub url: Option<String>,
}

/// Provider-side error details of a failed task
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskError {
    pub code: Option<String>,
    pub message: Option<String>,
}

/// One snapshot of a provider task
#[derive(Debug, Clone, Deserialize)]
pub struct AsyncTask {
    pub id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub content: Option<TaskContent>,
    #[serde(default)]
    pub error: Option<TaskError>,
}

impl AsyncTask {
    /// Result URL for a succeeded task, whichever field the payload carries
    pub fn result_url(&self) -> Option<String> {
        let content = self.content.as_ref()?;
        content
            .video_url
            .clone()
            .or_else(|| content.file_url.clone())
            .or_else(|| content.url.clone())
    }

    /// Map a terminal state to its outcome; `None` while still pending
    pub fn settle(&self) -> Option<Result<String>> {
        match self.status {
            TaskStatus::Queued | TaskStatus::Running => None,
            TaskStatus::Succeeded => Some(self.result_url().ok_or_else(|| {
                ProviderError::MalformedResponse(format!(
                    "task {} succeeded without a result URL",
                    self.id
                ))
            })),
            TaskStatus::Failed | TaskStatus::Cancelled => {
                let error = self.error.clone().unwrap_or_default();
                Some(Err(ProviderError::TaskFailed {
                    code: error.code.unwrap_or_else(|| "unknown".to_string()),
                    message: error
                        .message
                        .unwrap_or_else(|| "task failed without details".to_string()),
                }))
            }
            TaskStatus::Expired => Some(Err(ProviderError::TaskExpired)),
        }
    }
}

/// Poll a task source until terminal or out of budget
///
/// Cancellation is observed before each sleep; it never aborts a query
/// already in flight.
pub async fn poll_until<F, Fut>(mut fetch: F, budget: PollBudget, cancel: &CancelToken) -> Result<String>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<AsyncTask>>,
{
    for attempt in 1..=budget.attempts {
        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }
        tokio::time::sleep(POLL_INTERVAL).await;

        let task = fetch().await?;
        log::debug!("task {} poll {}: {:?}", task.id, attempt, task.status);
        if let Some(outcome) = task.settle() {
            return outcome;
        }
    }
    Err(ProviderError::TaskTimeout {
        attempts: budget.attempts,
    })
}

/// Poll an Ark task over HTTP until it settles
pub async fn wait_for_task(
    http: &Http,
    config: &ProviderConfig,
    task_id: &str,
    budget: PollBudget,
    cancel: &CancelToken,
) -> Result<String> {
    poll_until(
        || async move {
            let response = ark::fetch_task(http, config, task_id).await?;
            serde_json::from_value(response)
                .map_err(|e| ProviderError::MalformedResponse(format!("invalid task body: {}", e)))
        },
        budget,
        cancel,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn task(status: TaskStatus) -> AsyncTask {
        AsyncTask {
            id: "task-1".into(),
            status,
            content: None,
            error: None,
        }
    }

    #[test]
    fn test_status_deserializes_lowercase() {
        let task: AsyncTask = serde_json::from_value(serde_json::json!({
            "id": "t", "status": "succeeded",
            "content": { "video_url": "https://x/v.mp4" }
        }))
        .unwrap();
        assert_eq!(task.status, TaskStatus::Succeeded);
        assert_eq!(task.result_url().unwrap(), "https://x/v.mp4");
    }

    #[test]
    fn test_settle_pending() {
        assert!(task(TaskStatus::Queued).settle().is_none());
        assert!(task(TaskStatus::Running).settle().is_none());
    }

    #[test]
    fn test_settle_failed_carries_provider_code() {
        let mut failed = task(TaskStatus::Failed);
        failed.error = Some(TaskError {
            code: Some("OutputVideoSensitive".into()),
            message: Some("content policy".into()),
        });

        match failed.settle().unwrap() {
            Err(ProviderError::TaskFailed { code, message }) => {
                assert_eq!(code, "OutputVideoSensitive");
                assert_eq!(message, "content policy");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_settle_expired() {
        assert!(matches!(
            task(TaskStatus::Expired).settle().unwrap(),
            Err(ProviderError::TaskExpired)
        ));
    }

    #[test]
    fn test_settle_succeeded_without_url() {
        assert!(matches!(
            task(TaskStatus::Succeeded).settle().unwrap(),
            Err(ProviderError::MalformedResponse(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_succeeds_after_three_polls() {
        let polls = RefCell::new(0u32);
        let polls_ref = &polls;
        let result = poll_until(
            || async move {
                *polls_ref.borrow_mut() += 1;
                if *polls_ref.borrow() < 3 {
                    Ok(task(TaskStatus::Running))
                } else {
                    Ok(AsyncTask {
                        content: Some(TaskContent {
                            video_url: Some("https://x/v.mp4".into()),
                            ..Default::default()
                        }),
                        ..task(TaskStatus::Succeeded)
                    })
                }
            },
            PollBudget::VIDEO,
            &CancelToken::new(),
        )
        .await;

        assert_eq!(result.unwrap(), "https://x/v.mp4");
        assert_eq!(*polls.borrow(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_failed_surfaces_code() {
        let polls = RefCell::new(0u32);
        let polls_ref = &polls;
        let result = poll_until(
            || async move {
                *polls_ref.borrow_mut() += 1;
                if *polls_ref.borrow() < 3 {
                    Ok(task(TaskStatus::Running))
                } else {
                    Ok(AsyncTask {
                        error: Some(TaskError {
                            code: Some("InternalError".into()),
                            message: Some("boom".into()),
                        }),
                        ..task(TaskStatus::Failed)
                    })
                }
            },
            PollBudget::VIDEO,
            &CancelToken::new(),
        )
        .await;

        match result {
            Err(ProviderError::TaskFailed { code, .. }) => assert_eq!(code, "InternalError"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_exhausts_budget() {
        let result = poll_until(
            || async { Ok(task(TaskStatus::Running)) },
            PollBudget { attempts: 5 },
            &CancelToken::new(),
        )
        .await;

        assert!(matches!(
            result,
            Err(ProviderError::TaskTimeout { attempts: 5 })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_observes_cancellation() {
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = poll_until(
            || async { Ok(task(TaskStatus::Running)) },
            PollBudget::VIDEO,
            &cancel,
        )
        .await;

        assert!(matches!(result, Err(ProviderError::Cancelled)));
    }
}
