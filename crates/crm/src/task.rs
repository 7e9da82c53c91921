use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use vakwerk_core::{AggregateId, DomainError, DomainResult, EmployeeId, Entity};
use vakwerk_parties::CustomerId;

/// Task identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub AggregateId);

impl TaskId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for TaskId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

/// A follow-up task on the CRM board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub customer_id: Option<CustomerId>,
    pub employee_id: Option<EmployeeId>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: NaiveDate,
    pub created_date: NaiveDate,
}

impl Task {
    pub fn new(
        id: TaskId,
        title: impl Into<String>,
        priority: TaskPriority,
        due_date: NaiveDate,
        created_date: NaiveDate,
    ) -> DomainResult<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::validation("task title is required"));
        }
        Ok(Self {
            id,
            title,
            description: String::new(),
            customer_id: None,
            employee_id: None,
            priority,
            status: TaskStatus::Todo,
            due_date,
            created_date,
        })
    }

    pub fn start(&mut self) -> DomainResult<()> {
        if self.status != TaskStatus::Todo {
            return Err(DomainError::invariant("only open tasks can be started"));
        }
        self.status = TaskStatus::InProgress;
        Ok(())
    }

    pub fn complete(&mut self) -> DomainResult<()> {
        if self.status == TaskStatus::Done {
            return Err(DomainError::validation("task is already done"));
        }
        self.status = TaskStatus::Done;
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.status != TaskStatus::Done
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_open() && self.due_date < today
    }
}

impl Entity for Task {
    type Id = TaskId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
