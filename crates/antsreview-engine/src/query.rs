//! Read-only accessors over task records
//!
//! Every accessor returns a snapshot taken under the task's lock. The query
//! surface, not the event stream, is authoritative for current state.

use antsreview_types::{Address, ContributionId, ReviewError, ReviewId, Result, TaskId};
use tracing::debug;

use crate::engine::ReviewEngine;
use crate::records::{Contribution, PeerReview, Task, TaskStatus};

impl ReviewEngine {
    /// Number of tasks ever issued
    pub async fn task_count(&self) -> usize {
        self.task_handles().await.len()
    }

    pub async fn get_task(&self, task_id: TaskId) -> Result<Task> {
        let handle = self.task_handle(task_id).await?;
        let task = handle.lock().await;
        Ok(task.clone())
    }

    /// Snapshot of every task, in id order
    pub async fn tasks(&self) -> Vec<Task> {
        let mut out = Vec::new();
        for handle in self.task_handles().await {
            out.push(handle.lock().await.clone());
        }
        out
    }

    pub async fn get_contribution(
        &self,
        task_id: TaskId,
        contribution_id: ContributionId,
    ) -> Result<Contribution> {
        let handle = self.task_handle(task_id).await?;
        let task = handle.lock().await;
        task.contribution(contribution_id)
            .cloned()
            .ok_or(ReviewError::ContributionNotFound {
                task_id,
                contribution_id,
            })
    }

    pub async fn get_review(&self, task_id: TaskId, review_id: ReviewId) -> Result<PeerReview> {
        let handle = self.task_handle(task_id).await?;
        let task = handle.lock().await;
        task.review(review_id)
            .cloned()
            .ok_or(ReviewError::ReviewNotFound { task_id, review_id })
    }

    pub async fn get_approver(&self, task_id: TaskId, index: usize) -> Result<Address> {
        let handle = self.task_handle(task_id).await?;
        let task = handle.lock().await;
        task.approvers
            .get(index)
            .cloned()
            .ok_or(ReviewError::ApproverNotFound { task_id, index })
    }

    pub async fn get_issuer(&self, task_id: TaskId, index: usize) -> Result<Address> {
        let handle = self.task_handle(task_id).await?;
        let task = handle.lock().await;
        task.issuers
            .get(index)
            .cloned()
            .ok_or(ReviewError::IssuerNotFound { task_id, index })
    }

    pub async fn contributions(&self, task_id: TaskId) -> Result<Vec<Contribution>> {
        let handle = self.task_handle(task_id).await?;
        let task = handle.lock().await;
        Ok(task.contributions.clone())
    }

    pub async fn reviews(&self, task_id: TaskId) -> Result<Vec<PeerReview>> {
        let handle = self.task_handle(task_id).await?;
        let task = handle.lock().await;
        Ok(task.reviews.clone())
    }

    /// Phase of the task at the engine's current time
    pub async fn task_status(&self, task_id: TaskId) -> Result<TaskStatus> {
        let handle = self.task_handle(task_id).await?;
        let task = handle.lock().await;
        let status = task.status(self.now());
        debug!(task_id = %task_id, status = ?status, "task status");
        Ok(status)
    }
}
