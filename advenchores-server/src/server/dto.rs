use advenchores_shared::api::{AssignmentDto, ChildDto, ChoreDto, RewardDto, UserDto};

use crate::storage::models::{AssignmentView, Child, Chore, Reward, User};

const DATE_FORMAT: &str = "%Y-%m-%d";

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        UserDto {
            id: u.id,
            username: u.username,
            email: u.email,
        }
    }
}

impl From<Child> for ChildDto {
    fn from(c: Child) -> Self {
        ChildDto {
            id: c.id,
            name: c.name,
            job: c.job,
            points: c.points,
            rewards: c.rewards,
        }
    }
}

impl From<Chore> for ChoreDto {
    fn from(c: Chore) -> Self {
        ChoreDto {
            id: c.id,
            description: c.description,
            points: c.points,
            is_required: c.is_required,
            due_date: c.due_date.map(|d| d.format(DATE_FORMAT).to_string()),
        }
    }
}

impl From<Reward> for RewardDto {
    fn from(r: Reward) -> Self {
        RewardDto {
            id: r.id,
            description: r.description,
            point_cost: r.point_cost,
        }
    }
}

impl From<AssignmentView> for AssignmentDto {
    fn from(a: AssignmentView) -> Self {
        AssignmentDto {
            id: a.id,
            child_id: a.child_id,
            child_name: a.child_name,
            is_completed: a.is_completed,
            chore: a.chore.into(),
        }
    }
}

pub(super) fn parse_date(text: &str) -> Option<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
}

pub(super) fn collect<T, D: From<T>>(items: Vec<T>) -> Vec<D> {
    items.into_iter().map(D::from).collect()
}
