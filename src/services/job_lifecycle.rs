// src/services/job_lifecycle.rs
//
// Pure rules for editing a job: which columns change, which phase-entry dates
// get stamped, how the project manager moved and which tracked fields differ.
// Nothing here touches storage.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::job::{Job, JobChanges, JobStatus, JobUpdate};

/// How the project manager of a job moved during one edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PmAssignment {
    /// No PM in the request, or the same one. Carries the PM the job keeps.
    Unchanged(Option<Uuid>),
    NewlyAssigned(Uuid),
    Reassigned { from: Uuid, to: Uuid },
}

impl PmAssignment {
    pub fn classify(current: Option<Uuid>, proposed: Option<Uuid>) -> Self {
        match (current, proposed) {
            (None, Some(to)) => PmAssignment::NewlyAssigned(to),
            (Some(from), Some(to)) if from != to => PmAssignment::Reassigned { from, to },
            _ => PmAssignment::Unchanged(current),
        }
    }

    /// The PM that should now hear about the assignment, if any.
    pub fn assignee(&self) -> Option<Uuid> {
        match *self {
            PmAssignment::NewlyAssigned(to) | PmAssignment::Reassigned { to, .. } => Some(to),
            PmAssignment::Unchanged(_) => None,
        }
    }

    pub fn moved(&self) -> bool {
        self.assignee().is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LifecyclePlan {
    pub changes: JobChanges,
    pub pm: PmAssignment,
    /// Tracked fields that differ, in reporting order.
    pub changed_fields: Vec<&'static str>,
}

impl LifecyclePlan {
    /// Change list reported to admins, which also mentions PM moves.
    pub fn admin_changes(&self) -> Vec<&'static str> {
        let mut list = self.changed_fields.clone();
        if self.pm.moved() {
            list.push("project manager");
        }
        list
    }
}

/// Builds the column changes for `update` against the stored `job`.
pub fn plan_update(job: &Job, update: &JobUpdate, now: DateTime<Utc>) -> LifecyclePlan {
    let mut changes = JobChanges {
        job_name: update.job_name.clone(),
        customer_id: update.customer_id,
        status: update.status,
        current_phase: update.status.map(|s| s.phase()),
        priority: update.priority,
        estimator_id: update.estimator_id,
        drafter_id: update.drafter_id,
        project_manager_id: update.project_manager_id,
        estimate_due_date: update.estimate_due_date,
        quoted_amount: update.quoted_amount,
        notes: update.notes.clone(),
        tags: update.tags.clone(),
        ..JobChanges::default()
    };

    if let Some(status) = update.status {
        stamp_phase_entry(job, status, now, &mut changes);
    }

    LifecyclePlan {
        pm: PmAssignment::classify(job.project_manager_id, update.project_manager_id),
        changed_fields: changed_fields(job, update),
        changes,
    }
}

/// Sets the entry date of `status` when the job has never been there.
fn stamp_phase_entry(job: &Job, status: JobStatus, now: DateTime<Utc>, changes: &mut JobChanges) {
    match status {
        JobStatus::Estimation if job.estimate_date.is_none() => changes.estimate_date = Some(now),
        JobStatus::Drafting if job.draft_start_date.is_none() => changes.draft_start_date = Some(now),
        JobStatus::InProduction if job.production_start_date.is_none() => {
            changes.production_start_date = Some(now)
        }
        JobStatus::Delivered if job.delivery_date.is_none() => changes.delivery_date = Some(now),
        _ => {}
    }
}

// Blank names and notes and a zero amount count as "not changed".
fn changed_fields(job: &Job, update: &JobUpdate) -> Vec<&'static str> {
    let mut fields = Vec::new();

    if update
        .job_name
        .as_deref()
        .is_some_and(|n| !n.is_empty() && n != job.job_name)
    {
        fields.push("job name");
    }
    if update.status.is_some_and(|s| s != job.status) {
        fields.push("status");
    }
    if update.priority.is_some_and(|p| p != job.priority) {
        fields.push("priority");
    }
    if update
        .quoted_amount
        .is_some_and(|q| !q.is_zero() && q != job.quoted_amount)
    {
        fields.push("quoted amount");
    }
    if update
        .notes
        .as_deref()
        .is_some_and(|n| !n.is_empty() && Some(n) != job.notes.as_deref())
    {
        fields.push("notes");
    }

    fields
}

/// "a", "a and b", "a, b and c".
pub fn join_changes(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}
