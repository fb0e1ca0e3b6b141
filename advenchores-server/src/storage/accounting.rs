//! Points accounting: assigning chores, completing and paying them out, and
//! redeeming rewards. Every operation runs in a single `BEGIN IMMEDIATE`
//! transaction so concurrent writers against one child serialize on the
//! SQLite write lock.

use diesel::prelude::*;
use tracing::{debug, info};

use super::models::{Assignment, Child, NewAssignment};
use super::schema::{assignments, children};
use super::{StorageError, Store, load_assignment, load_child, load_chore, load_reward};

/// Result of paying out a completed assignment.
#[derive(Debug, Clone)]
pub struct Payout {
    pub child: Child,
    pub points_awarded: i32,
}

impl Store {
    pub async fn assign_chore(&self, child_id: i32, chore_id: i32) -> Result<Assignment, StorageError> {
        self.interact(move |conn| {
            conn.immediate_transaction(|conn| -> Result<Assignment, StorageError> {
                let child = load_child(conn, child_id)?;
                let chore = load_chore(conn, chore_id)?;
                let exists: bool = diesel::select(diesel::dsl::exists(
                    assignments::table
                        .filter(assignments::child_id.eq(child.id))
                        .filter(assignments::chore_id.eq(chore.id)),
                ))
                .get_result(conn)?;
                if exists {
                    return Err(StorageError::Conflict(format!(
                        "chore {} is already assigned to {}",
                        chore.id, child.name
                    )));
                }
                let assignment = diesel::insert_into(assignments::table)
                    .values(&NewAssignment {
                        child_id: child.id,
                        chore_id: chore.id,
                        is_completed: false,
                    })
                    .returning(Assignment::as_returning())
                    .get_result(conn)?;
                debug!(assignment_id = assignment.id, child_id, chore_id, "chore assigned");
                Ok(assignment)
            })
        })
        .await
    }

    /// Removes the assignment of `chore_id` to `child_id` without crediting points.
    pub async fn unassign_chore(&self, child_id: i32, chore_id: i32) -> Result<(), StorageError> {
        self.interact(move |conn| {
            conn.immediate_transaction(|conn| -> Result<(), StorageError> {
                load_child(conn, child_id)?;
                load_chore(conn, chore_id)?;
                let deleted = diesel::delete(
                    assignments::table
                        .filter(assignments::child_id.eq(child_id))
                        .filter(assignments::chore_id.eq(chore_id)),
                )
                .execute(conn)?;
                if deleted == 0 {
                    return Err(StorageError::NotFound(format!(
                        "assignment of chore {} to child {}",
                        chore_id, child_id
                    )));
                }
                debug!(child_id, chore_id, "chore unassigned");
                Ok(())
            })
        })
        .await
    }

    /// Marks the assignment as done. Points are credited later, on reward.
    pub async fn complete_assignment(&self, assignment_id: i32) -> Result<Assignment, StorageError> {
        self.set_completed(assignment_id, true).await
    }

    /// Clears the completion flag of an assignment.
    pub async fn uncomplete_assignment(
        &self,
        assignment_id: i32,
    ) -> Result<Assignment, StorageError> {
        self.set_completed(assignment_id, false).await
    }

    async fn set_completed(
        &self,
        assignment_id: i32,
        completed: bool,
    ) -> Result<Assignment, StorageError> {
        self.interact(move |conn| {
            conn.immediate_transaction(|conn| -> Result<Assignment, StorageError> {
                let mut assignment = load_assignment(conn, assignment_id)?;
                if completed && assignment.is_completed {
                    return Err(StorageError::Conflict(format!(
                        "assignment {} is already completed",
                        assignment_id
                    )));
                }
                diesel::update(assignments::table.find(assignment_id))
                    .set(assignments::is_completed.eq(completed))
                    .execute(conn)?;
                assignment.is_completed = completed;
                Ok(assignment)
            })
        })
        .await
    }

    /// Credits the chore's points to the child and removes the paid-out assignment.
    pub async fn reward_assignment(&self, assignment_id: i32) -> Result<Payout, StorageError> {
        self.interact(move |conn| {
            conn.immediate_transaction(|conn| -> Result<Payout, StorageError> {
                let assignment = load_assignment(conn, assignment_id)?;
                if !assignment.is_completed {
                    return Err(StorageError::Conflict(format!(
                        "assignment {} is not completed yet",
                        assignment_id
                    )));
                }
                let chore = load_chore(conn, assignment.chore_id)?;
                let mut child = load_child(conn, assignment.child_id)?;
                child.points = child.points.checked_add(chore.points).ok_or_else(|| {
                    StorageError::InvalidInput(format!(
                        "paying {} points would overflow the balance of {}",
                        chore.points, child.name
                    ))
                })?;
                diesel::update(children::table.find(child.id))
                    .set(children::points.eq(child.points))
                    .execute(conn)?;
                diesel::delete(assignments::table.find(assignment_id)).execute(conn)?;
                info!(
                    child_id = child.id,
                    assignment_id,
                    points = chore.points,
                    balance = child.points,
                    "assignment rewarded"
                );
                Ok(Payout {
                    child,
                    points_awarded: chore.points,
                })
            })
        })
        .await
    }

    /// Debits the reward's cost from the child and records the reward.
    pub async fn redeem_reward(&self, child_id: i32, reward_id: i32) -> Result<Child, StorageError> {
        self.interact(move |conn| {
            conn.immediate_transaction(|conn| -> Result<Child, StorageError> {
                let mut child = load_child(conn, child_id)?;
                let reward = load_reward(conn, reward_id)?;
                if child.points < reward.point_cost {
                    return Err(StorageError::Conflict(format!(
                        "not enough points: {} has {}, {} costs {}",
                        child.name, child.points, reward.description, reward.point_cost
                    )));
                }
                child.points -= reward.point_cost;
                child.push_reward(&reward.description);
                diesel::update(children::table.find(child.id))
                    .set((
                        children::points.eq(child.points),
                        children::rewards.eq(&child.rewards),
                    ))
                    .execute(conn)?;
                info!(
                    child_id,
                    reward_id,
                    cost = reward.point_cost,
                    balance = child.points,
                    "reward redeemed"
                );
                Ok(child)
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::{Chore, Reward};
    use crate::storage::tests::test_store;

    async fn seed(store: &Store, user_id: i32, points: i32) -> Child {
        let mut child = store
            .save_child(Child::new(user_id, "Alex", "Dishwasher"))
            .await
            .unwrap();
        if points != 0 {
            child.points = points;
            child = store.save_child(child).await.unwrap();
        }
        child
    }

    #[tokio::test]
    async fn assign_complete_reward_credits_points_once() {
        let (_dir, store, user) = test_store().await;
        let alex = seed(&store, user.id, 0).await;
        let dishes = store
            .save_chore(Chore::new(user.id, "Dishes", 10))
            .await
            .unwrap();

        let a = store.assign_chore(alex.id, dishes.id).await.unwrap();
        assert!(!a.is_completed);

        let done = store.complete_assignment(a.id).await.unwrap();
        assert!(done.is_completed);
        assert_eq!(store.get_child(alex.id).await.unwrap().points, 0);

        let payout = store.reward_assignment(a.id).await.unwrap();
        assert_eq!(payout.points_awarded, 10);
        assert_eq!(payout.child.points, 10);
        assert_eq!(store.get_child(alex.id).await.unwrap().points, 10);
        assert!(matches!(
            store.get_assignment(a.id).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn assigning_twice_conflicts() {
        let (_dir, store, user) = test_store().await;
        let alex = seed(&store, user.id, 0).await;
        let dishes = store
            .save_chore(Chore::new(user.id, "Dishes", 10))
            .await
            .unwrap();

        store.assign_chore(alex.id, dishes.id).await.unwrap();
        assert!(matches!(
            store.assign_chore(alex.id, dishes.id).await,
            Err(StorageError::Conflict(_))
        ));
        assert_eq!(store.list_assignments(user.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn assigning_unknown_entities_is_not_found() {
        let (_dir, store, user) = test_store().await;
        let alex = seed(&store, user.id, 0).await;
        assert!(matches!(
            store.assign_chore(alex.id, 77).await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            store.assign_chore(77, 1).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn completing_twice_conflicts() {
        let (_dir, store, user) = test_store().await;
        let alex = seed(&store, user.id, 0).await;
        let chore = store
            .save_chore(Chore::new(user.id, "Laundry", 4))
            .await
            .unwrap();
        let a = store.assign_chore(alex.id, chore.id).await.unwrap();

        store.complete_assignment(a.id).await.unwrap();
        assert!(matches!(
            store.complete_assignment(a.id).await,
            Err(StorageError::Conflict(_))
        ));

        let reopened = store.uncomplete_assignment(a.id).await.unwrap();
        assert!(!reopened.is_completed);
        store.complete_assignment(a.id).await.unwrap();
    }

    #[tokio::test]
    async fn rewarding_incomplete_assignment_conflicts() {
        let (_dir, store, user) = test_store().await;
        let alex = seed(&store, user.id, 3).await;
        let chore = store
            .save_chore(Chore::new(user.id, "Vacuum", 8))
            .await
            .unwrap();
        let a = store.assign_chore(alex.id, chore.id).await.unwrap();

        assert!(matches!(
            store.reward_assignment(a.id).await,
            Err(StorageError::Conflict(_))
        ));
        assert_eq!(store.get_child(alex.id).await.unwrap().points, 3);
        assert!(store.get_assignment(a.id).await.is_ok());
    }

    #[tokio::test]
    async fn payout_past_max_balance_is_rejected_and_rolled_back() {
        let (_dir, store, user) = test_store().await;
        let alex = seed(&store, user.id, i32::MAX).await;
        let chore = store
            .save_chore(Chore::new(user.id, "Garage", 10))
            .await
            .unwrap();
        let a = store.assign_chore(alex.id, chore.id).await.unwrap();
        store.complete_assignment(a.id).await.unwrap();

        assert!(matches!(
            store.reward_assignment(a.id).await,
            Err(StorageError::InvalidInput(_))
        ));
        assert_eq!(store.get_child(alex.id).await.unwrap().points, i32::MAX);
        assert!(store.get_assignment(a.id).await.unwrap().is_completed);
    }

    #[tokio::test]
    async fn redeem_debits_and_records_reward() {
        let (_dir, store, user) = test_store().await;
        let alex = seed(&store, user.id, 25).await;
        let sticker = store
            .save_reward(Reward::new(user.id, "Sticker", 5))
            .await
            .unwrap();
        let movie = store
            .save_reward(Reward::new(user.id, "Movie night", 15))
            .await
            .unwrap();

        let after = store.redeem_reward(alex.id, sticker.id).await.unwrap();
        assert_eq!(after.points, 20);
        assert_eq!(after.rewards, "Sticker");

        let after = store.redeem_reward(alex.id, movie.id).await.unwrap();
        assert_eq!(after.points, 5);
        assert_eq!(after.rewards, "Sticker, Movie night");
        assert_eq!(store.get_child(alex.id).await.unwrap(), after);
    }

    #[tokio::test]
    async fn redeem_without_enough_points_leaves_child_untouched() {
        let (_dir, store, user) = test_store().await;
        let alex = seed(&store, user.id, 5).await;
        let reward = store
            .save_reward(Reward::new(user.id, "Bike", 10))
            .await
            .unwrap();

        assert!(matches!(
            store.redeem_reward(alex.id, reward.id).await,
            Err(StorageError::Conflict(_))
        ));
        let unchanged = store.get_child(alex.id).await.unwrap();
        assert_eq!(unchanged.points, 5);
        assert_eq!(unchanged.rewards, "");
    }

    #[tokio::test]
    async fn concurrent_redemptions_never_overdraw() {
        let (_dir, store, user) = test_store().await;
        let alex = seed(&store, user.id, 10).await;
        let reward = store
            .save_reward(Reward::new(user.id, "Game", 10))
            .await
            .unwrap();

        let (a, b) = tokio::join!(
            store.redeem_reward(alex.id, reward.id),
            store.redeem_reward(alex.id, reward.id)
        );
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        assert_eq!(store.get_child(alex.id).await.unwrap().points, 0);
    }

    #[tokio::test]
    async fn unassign_and_delete_remove_without_credit() {
        let (_dir, store, user) = test_store().await;
        let alex = seed(&store, user.id, 0).await;
        let dishes = store
            .save_chore(Chore::new(user.id, "Dishes", 10))
            .await
            .unwrap();
        let trash = store
            .save_chore(Chore::new(user.id, "Trash", 2))
            .await
            .unwrap();

        store.assign_chore(alex.id, dishes.id).await.unwrap();
        let t = store.assign_chore(alex.id, trash.id).await.unwrap();
        store.complete_assignment(t.id).await.unwrap();

        store.unassign_chore(alex.id, dishes.id).await.unwrap();
        assert!(matches!(
            store.unassign_chore(alex.id, dishes.id).await,
            Err(StorageError::NotFound(_))
        ));
        store.delete_assignment(t.id).await.unwrap();

        assert!(store.list_assignments(user.id).await.unwrap().is_empty());
        assert_eq!(store.get_child(alex.id).await.unwrap().points, 0);
    }
}
