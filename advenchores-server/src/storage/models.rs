use crate::storage::schema::{assignments, children, chores, rewards, sessions, users};
use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub parent_pin: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub parent_pin: i32,
}

/// A child record. `id == 0` marks a record that has not been saved yet.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = children)]
#[diesel(belongs_to(User, foreign_key = user_id))]
pub struct Child {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub job: String,
    pub points: i32,
    pub rewards: String,
}

impl Child {
    pub fn new(user_id: i32, name: impl Into<String>, job: impl Into<String>) -> Self {
        Self {
            id: 0,
            user_id,
            name: name.into(),
            job: job.into(),
            points: 0,
            rewards: String::new(),
        }
    }

    /// Appends a redeemed reward to the comma-separated history.
    pub fn push_reward(&mut self, description: &str) {
        if self.rewards.is_empty() {
            self.rewards = description.to_string();
        } else {
            self.rewards.push_str(", ");
            self.rewards.push_str(description);
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = children)]
pub struct NewChild<'a> {
    pub user_id: i32,
    pub name: &'a str,
    pub job: &'a str,
    pub points: i32,
    pub rewards: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = chores)]
#[diesel(belongs_to(User, foreign_key = user_id))]
pub struct Chore {
    pub id: i32,
    pub user_id: i32,
    pub description: String,
    pub points: i32,
    pub is_required: bool,
    pub due_date: Option<NaiveDate>,
}

impl Chore {
    pub fn new(user_id: i32, description: impl Into<String>, points: i32) -> Self {
        Self {
            id: 0,
            user_id,
            description: description.into(),
            points,
            is_required: false,
            due_date: None,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = chores)]
pub struct NewChore<'a> {
    pub user_id: i32,
    pub description: &'a str,
    pub points: i32,
    pub is_required: bool,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = rewards)]
#[diesel(belongs_to(User, foreign_key = user_id))]
pub struct Reward {
    pub id: i32,
    pub user_id: i32,
    pub description: String,
    pub point_cost: i32,
}

impl Reward {
    pub fn new(user_id: i32, description: impl Into<String>, point_cost: i32) -> Self {
        Self {
            id: 0,
            user_id,
            description: description.into(),
            point_cost,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = rewards)]
pub struct NewReward<'a> {
    pub user_id: i32,
    pub description: &'a str,
    pub point_cost: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = assignments)]
#[diesel(belongs_to(Child, foreign_key = child_id))]
#[diesel(belongs_to(Chore, foreign_key = chore_id))]
pub struct Assignment {
    pub id: i32,
    pub child_id: i32,
    pub chore_id: i32,
    pub is_completed: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = assignments)]
pub struct NewAssignment {
    pub child_id: i32,
    pub chore_id: i32,
    pub is_completed: bool,
}

/// An assignment joined with its child's name and a snapshot of the chore.
#[derive(Debug, Clone)]
pub struct AssignmentView {
    pub id: i32,
    pub child_id: i32,
    pub child_name: String,
    pub is_completed: bool,
    pub chore: Chore,
}

#[derive(Insertable)]
#[diesel(table_name = sessions)]
pub struct NewSession<'a> {
    pub jti: &'a str,
    pub user_id: i32,
}
