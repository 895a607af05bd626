use std::cmp::Reverse;

use ::entity::{
    sea_orm_active_enums::{TaskBoard, TaskPriority, TaskStatus},
    task,
};
use chrono::{NaiveDate, Utc};
use sea_orm::*;
use serde::{Deserialize, Serialize};

use crate::{access::validate_email, ServiceError};

#[derive(Debug, Clone, Deserialize)]
pub struct TaskInput {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<String>,
    pub due_on: Option<NaiveDate>,
}

impl TaskInput {
    fn validate(self) -> Result<Self, ServiceError> {
        let title = self.title.trim().to_owned();
        if title.is_empty() {
            return Err(ServiceError::validation("Task title is required"));
        }
        let assigned_to = self
            .assigned_to
            .filter(|email| !email.trim().is_empty())
            .map(|email| validate_email(&email))
            .transpose()?;

        Ok(Self {
            title,
            description: self
                .description
                .map(|d| d.trim().to_owned())
                .filter(|d| !d.is_empty()),
            assigned_to,
            ..self
        })
    }
}

/// Number of tasks per column of a board
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoardSummary {
    pub todo: u64,
    pub in_progress: u64,
    pub done: u64,
}

/// Open tasks first, then most urgent, then earliest due (undated last)
fn board_order(task: &task::Model) -> impl Ord {
    (
        task.status == TaskStatus::Done,
        Reverse(task.priority),
        task.due_on.is_none(),
        task.due_on,
        task.id,
    )
}

pub struct TaskQuery;

impl TaskQuery {
    pub async fn find_by_id(db: &DbConn, id: i32) -> Result<task::Model, ServiceError> {
        task::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Task", id))
    }

    pub async fn list_board(
        db: &DbConn,
        board: TaskBoard,
        status: Option<TaskStatus>,
    ) -> Result<Vec<task::Model>, ServiceError> {
        let mut query = task::Entity::find().filter(task::Column::Board.eq(board));
        if let Some(status) = status {
            query = query.filter(task::Column::Status.eq(status));
        }

        let mut tasks = query.all(db).await?;
        tasks.sort_by_key(board_order);

        Ok(tasks)
    }

    pub async fn board_summary(
        db: &DbConn,
        board: TaskBoard,
    ) -> Result<BoardSummary, ServiceError> {
        let count = |status: TaskStatus| {
            task::Entity::find()
                .filter(task::Column::Board.eq(board))
                .filter(task::Column::Status.eq(status))
                .count(db)
        };

        Ok(BoardSummary {
            todo: count(TaskStatus::Todo).await?,
            in_progress: count(TaskStatus::InProgress).await?,
            done: count(TaskStatus::Done).await?,
        })
    }
}

pub struct TaskMutation;

impl TaskMutation {
    #[tracing::instrument(skip(db, input))]
    pub async fn create(
        db: &DbConn,
        board: TaskBoard,
        input: TaskInput,
        created_by: &str,
    ) -> Result<task::Model, ServiceError> {
        let input = input.validate()?;

        Ok(task::ActiveModel {
            board: Set(board),
            title: Set(input.title),
            description: Set(input.description),
            status: Set(TaskStatus::Todo),
            priority: Set(input.priority.unwrap_or(TaskPriority::Normal)),
            assigned_to: Set(input.assigned_to),
            due_on: Set(input.due_on),
            created_by: Set(created_by.to_owned()),
            created_at: Set(Utc::now()),
            completed_at: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await?)
    }

    pub async fn update(
        db: &DbConn,
        id: i32,
        input: TaskInput,
    ) -> Result<task::Model, ServiceError> {
        let input = input.validate()?;
        let mut model: task::ActiveModel = TaskQuery::find_by_id(db, id).await?.into();

        model.title = Set(input.title);
        model.description = Set(input.description);
        if let Some(priority) = input.priority {
            model.priority = Set(priority);
        }
        model.assigned_to = Set(input.assigned_to);
        model.due_on = Set(input.due_on);

        Ok(model.update(db).await?)
    }

    /// Move a task to another column; `completed_at` tracks the `done` column
    pub async fn move_to(
        db: &DbConn,
        id: i32,
        status: TaskStatus,
    ) -> Result<task::Model, ServiceError> {
        let current = TaskQuery::find_by_id(db, id).await?;
        if current.status == status {
            return Ok(current);
        }

        let mut model: task::ActiveModel = current.into();
        model.status = Set(status);
        model.completed_at = Set((status == TaskStatus::Done).then(Utc::now));

        Ok(model.update(db).await?)
    }

    pub async fn delete(db: &DbConn, id: i32) -> Result<DeleteResult, ServiceError> {
        let res = task::Entity::delete_by_id(id).exec(db).await?;
        if res.rows_affected == 0 {
            return Err(ServiceError::NotFound("Task", id));
        }

        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn task(id: i32, status: TaskStatus, priority: TaskPriority, due: Option<&str>) -> task::Model {
        task::Model {
            id,
            board: TaskBoard::Kitchen,
            title: format!("task {id}"),
            description: None,
            status,
            priority,
            assigned_to: None,
            due_on: due.map(|d| d.parse().unwrap()),
            created_by: "chef@venue.test".to_owned(),
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn board_is_ordered_by_status_priority_and_due_date() {
        let mut tasks = vec![
            task(1, TaskStatus::Done, TaskPriority::Urgent, None),
            task(2, TaskStatus::Todo, TaskPriority::Normal, None),
            task(3, TaskStatus::Todo, TaskPriority::Normal, Some("2024-05-02")),
            task(4, TaskStatus::InProgress, TaskPriority::Urgent, None),
            task(5, TaskStatus::Todo, TaskPriority::Normal, Some("2024-05-01")),
        ];
        tasks.sort_by_key(board_order);

        assert_eq!(
            tasks.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![4, 5, 3, 2, 1]
        );
    }

    #[test]
    fn blank_title_is_rejected() {
        let input = TaskInput {
            title: " ".to_owned(),
            description: None,
            priority: None,
            assigned_to: None,
            due_on: None,
        };

        assert!(matches!(input.validate(), Err(ServiceError::Validation(_))));
    }
}
