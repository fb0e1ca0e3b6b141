pub mod accounting;
pub mod models;
pub mod schema;

use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::DatabaseErrorKind;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use models::{
    Assignment, AssignmentView, Child, Chore, NewAssignment, NewChild, NewChore, NewReward,
    NewSession, NewUser, Reward, User,
};
use schema::{assignments, children, chores, rewards, sessions, users};
use tracing::{debug, trace};

/// Structured error type for all storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A Diesel ORM error (query failure, constraint violation, etc.)
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    /// Failed to acquire or build a connection from the pool.
    #[error("pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    /// A `spawn_blocking` task panicked or was cancelled.
    #[error("task error: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A database migration failed to apply.
    #[error("migration error: {0}")]
    Migration(String),

    /// The caller supplied invalid input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A lookup by identifier matched no row.
    #[error("{0} not found")]
    NotFound(String),

    /// The request contradicts current state (duplicate, insufficient points, ...).
    #[error("{0}")]
    Conflict(String),
}

impl StorageError {
    fn not_found(what: &str, id: impl std::fmt::Display) -> Self {
        StorageError::NotFound(format!("{} {}", what, id))
    }
}

/// Maps unique-constraint violations on user fields to a conflict.
fn user_conflict(e: diesel::result::Error) -> StorageError {
    match e {
        diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            StorageError::Conflict("username or email already registered".into())
        }
        other => StorageError::Database(other),
    }
}

type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub async fn connect_sqlite(path: &str) -> Result<Self, StorageError> {
        let url = path.to_string();
        let manager = ConnectionManager::<SqliteConnection>::new(url);
        let pool = Pool::builder().max_size(8).build(manager)?;

        // Run pending Diesel migrations on startup (auto-init empty DBs)
        {
            let pool_clone = pool.clone();
            tokio::task::spawn_blocking(move || -> Result<(), StorageError> {
                const MIGRATIONS: EmbeddedMigrations = embed_migrations!();
                let mut conn = pool_clone.get()?;
                configure_sqlite_conn(&mut conn)?;
                conn.run_pending_migrations(MIGRATIONS)
                    .map_err(|e| StorageError::Migration(e.to_string()))?;
                Ok(())
            })
            .await??;
        }

        Ok(Store { pool })
    }

    /// Runs `f` with a pooled, configured connection on the blocking thread pool.
    async fn interact<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T, StorageError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<T, StorageError> {
            let mut conn = pool.get()?;
            configure_sqlite_conn(&mut conn)?;
            f(&mut *conn)
        })
        .await?
    }

    // Users

    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        parent_pin: i32,
    ) -> Result<User, StorageError> {
        let username = username.to_string();
        let email = email.to_string();
        let password_hash = password_hash.to_string();
        self.interact(move |conn| {
            let new_user = NewUser {
                username: &username,
                email: &email,
                password_hash: &password_hash,
                parent_pin,
            };
            diesel::insert_into(users::table)
                .values(&new_user)
                .returning(User::as_returning())
                .get_result(conn)
                .map_err(user_conflict)
        })
        .await
    }

    pub async fn get_user(&self, user_id: i32) -> Result<User, StorageError> {
        self.interact(move |conn| load_user(conn, user_id)).await
    }

    pub async fn find_user_by_username(&self, name: &str) -> Result<Option<User>, StorageError> {
        let name = name.to_string();
        self.interact(move |conn| {
            Ok(users::table
                .filter(users::username.eq(&name))
                .select(User::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    pub async fn update_user_profile(
        &self,
        user_id: i32,
        username: &str,
        email: &str,
    ) -> Result<User, StorageError> {
        let username = username.to_string();
        let email = email.to_string();
        self.interact(move |conn| {
            let updated = diesel::update(users::table.find(user_id))
                .set((
                    users::username.eq(&username),
                    users::email.eq(&email),
                    users::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)
                .map_err(user_conflict)?;
            if updated == 0 {
                return Err(StorageError::not_found("user", user_id));
            }
            load_user(conn, user_id)
        })
        .await
    }

    pub async fn set_parent_pin(&self, user_id: i32, pin: i32) -> Result<(), StorageError> {
        self.interact(move |conn| {
            let updated = diesel::update(users::table.find(user_id))
                .set((
                    users::parent_pin.eq(pin),
                    users::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)?;
            if updated == 0 {
                return Err(StorageError::not_found("user", user_id));
            }
            Ok(())
        })
        .await
    }

    pub async fn set_parent_pin_by_username(
        &self,
        username: &str,
        pin: i32,
    ) -> Result<(), StorageError> {
        let name = username.to_string();
        self.interact(move |conn| {
            let updated = diesel::update(users::table.filter(users::username.eq(&name)))
                .set((
                    users::parent_pin.eq(pin),
                    users::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)?;
            if updated == 0 {
                return Err(StorageError::not_found("user", &name));
            }
            Ok(())
        })
        .await
    }

    // Children

    /// Inserts `child` when its id is 0, otherwise updates the row with the
    /// same id and owner.
    pub async fn save_child(&self, child: Child) -> Result<Child, StorageError> {
        self.interact(move |conn| {
            if child.id == 0 {
                let new_child = NewChild {
                    user_id: child.user_id,
                    name: &child.name,
                    job: &child.job,
                    points: child.points,
                    rewards: &child.rewards,
                };
                return Ok(diesel::insert_into(children::table)
                    .values(&new_child)
                    .returning(Child::as_returning())
                    .get_result(conn)?);
            }
            let updated = diesel::update(
                children::table
                    .filter(children::id.eq(child.id))
                    .filter(children::user_id.eq(child.user_id)),
            )
            .set((
                children::name.eq(&child.name),
                children::job.eq(&child.job),
                children::points.eq(child.points),
                children::rewards.eq(&child.rewards),
            ))
            .execute(conn)?;
            if updated == 0 {
                debug!(child_id = child.id, user_id = child.user_id, "save_child: no row updated");
                return Err(StorageError::not_found("child", child.id));
            }
            Ok(child)
        })
        .await
    }

    pub async fn get_child(&self, child_id: i32) -> Result<Child, StorageError> {
        self.interact(move |conn| load_child(conn, child_id)).await
    }

    pub async fn list_children(&self, owner: i32) -> Result<Vec<Child>, StorageError> {
        self.interact(move |conn| {
            Ok(children::table
                .filter(children::user_id.eq(owner))
                .order(children::id.asc())
                .select(Child::as_select())
                .load(conn)?)
        })
        .await
    }

    /// Deletes the child together with its assignments.
    pub async fn delete_child(&self, child_id: i32) -> Result<(), StorageError> {
        self.interact(move |conn| {
            conn.immediate_transaction(|conn| -> Result<(), StorageError> {
                let dropped =
                    diesel::delete(assignments::table.filter(assignments::child_id.eq(child_id)))
                        .execute(conn)?;
                let deleted = diesel::delete(children::table.find(child_id)).execute(conn)?;
                if deleted == 0 {
                    return Err(StorageError::not_found("child", child_id));
                }
                trace!(child_id, dropped_assignments = dropped, "delete_child");
                Ok(())
            })
        })
        .await
    }

    // Chores

    /// Inserts `chore` when its id is 0, otherwise updates the row with the
    /// same id and owner.
    pub async fn save_chore(&self, chore: Chore) -> Result<Chore, StorageError> {
        self.interact(move |conn| {
            if chore.id == 0 {
                let new_chore = NewChore {
                    user_id: chore.user_id,
                    description: &chore.description,
                    points: chore.points,
                    is_required: chore.is_required,
                    due_date: chore.due_date,
                };
                return Ok(diesel::insert_into(chores::table)
                    .values(&new_chore)
                    .returning(Chore::as_returning())
                    .get_result(conn)?);
            }
            let updated = diesel::update(
                chores::table
                    .filter(chores::id.eq(chore.id))
                    .filter(chores::user_id.eq(chore.user_id)),
            )
            .set((
                chores::description.eq(&chore.description),
                chores::points.eq(chore.points),
                chores::is_required.eq(chore.is_required),
                chores::due_date.eq(chore.due_date),
            ))
            .execute(conn)?;
            if updated == 0 {
                return Err(StorageError::not_found("chore", chore.id));
            }
            Ok(chore)
        })
        .await
    }

    pub async fn get_chore(&self, chore_id: i32) -> Result<Chore, StorageError> {
        self.interact(move |conn| load_chore(conn, chore_id)).await
    }

    pub async fn list_chores(&self, owner: i32) -> Result<Vec<Chore>, StorageError> {
        self.interact(move |conn| {
            Ok(chores::table
                .filter(chores::user_id.eq(owner))
                .order(chores::id.asc())
                .select(Chore::as_select())
                .load(conn)?)
        })
        .await
    }

    /// Chores of `owner` that no child currently has assigned.
    pub async fn list_unassigned_chores(&self, owner: i32) -> Result<Vec<Chore>, StorageError> {
        self.interact(move |conn| {
            Ok(chores::table
                .filter(chores::user_id.eq(owner))
                .filter(diesel::dsl::not(
                    chores::id.eq_any(assignments::table.select(assignments::chore_id)),
                ))
                .order(chores::id.asc())
                .select(Chore::as_select())
                .load(conn)?)
        })
        .await
    }

    /// Deletes the chore together with its assignments.
    pub async fn delete_chore(&self, chore_id: i32) -> Result<(), StorageError> {
        self.interact(move |conn| {
            conn.immediate_transaction(|conn| -> Result<(), StorageError> {
                diesel::delete(assignments::table.filter(assignments::chore_id.eq(chore_id)))
                    .execute(conn)?;
                let deleted = diesel::delete(chores::table.find(chore_id)).execute(conn)?;
                if deleted == 0 {
                    return Err(StorageError::not_found("chore", chore_id));
                }
                Ok(())
            })
        })
        .await
    }

    // Rewards

    /// Inserts `reward` when its id is 0, otherwise updates the row with the
    /// same id and owner.
    pub async fn save_reward(&self, reward: Reward) -> Result<Reward, StorageError> {
        self.interact(move |conn| {
            if reward.id == 0 {
                let new_reward = NewReward {
                    user_id: reward.user_id,
                    description: &reward.description,
                    point_cost: reward.point_cost,
                };
                return Ok(diesel::insert_into(rewards::table)
                    .values(&new_reward)
                    .returning(Reward::as_returning())
                    .get_result(conn)?);
            }
            let updated = diesel::update(
                rewards::table
                    .filter(rewards::id.eq(reward.id))
                    .filter(rewards::user_id.eq(reward.user_id)),
            )
            .set((
                rewards::description.eq(&reward.description),
                rewards::point_cost.eq(reward.point_cost),
            ))
            .execute(conn)?;
            if updated == 0 {
                return Err(StorageError::not_found("reward", reward.id));
            }
            Ok(reward)
        })
        .await
    }

    pub async fn get_reward(&self, reward_id: i32) -> Result<Reward, StorageError> {
        self.interact(move |conn| load_reward(conn, reward_id)).await
    }

    /// Rewards of `owner`, cheapest first.
    pub async fn list_rewards(&self, owner: i32) -> Result<Vec<Reward>, StorageError> {
        self.interact(move |conn| {
            Ok(rewards::table
                .filter(rewards::user_id.eq(owner))
                .order((rewards::point_cost.asc(), rewards::id.asc()))
                .select(Reward::as_select())
                .load(conn)?)
        })
        .await
    }

    pub async fn delete_reward(&self, reward_id: i32) -> Result<(), StorageError> {
        self.interact(move |conn| {
            let deleted = diesel::delete(rewards::table.find(reward_id)).execute(conn)?;
            if deleted == 0 {
                return Err(StorageError::not_found("reward", reward_id));
            }
            Ok(())
        })
        .await
    }

    // Assignments

    /// Inserts `assignment` when its id is 0, otherwise updates it by id.
    pub async fn save_assignment(&self, assignment: Assignment) -> Result<Assignment, StorageError> {
        self.interact(move |conn| {
            if assignment.id == 0 {
                return Ok(diesel::insert_into(assignments::table)
                    .values(&NewAssignment {
                        child_id: assignment.child_id,
                        chore_id: assignment.chore_id,
                        is_completed: assignment.is_completed,
                    })
                    .returning(Assignment::as_returning())
                    .get_result(conn)?);
            }
            let updated = diesel::update(assignments::table.find(assignment.id))
                .set((
                    assignments::child_id.eq(assignment.child_id),
                    assignments::chore_id.eq(assignment.chore_id),
                    assignments::is_completed.eq(assignment.is_completed),
                ))
                .execute(conn)?;
            if updated == 0 {
                return Err(StorageError::not_found("assignment", assignment.id));
            }
            Ok(assignment)
        })
        .await
    }

    pub async fn get_assignment(&self, assignment_id: i32) -> Result<Assignment, StorageError> {
        self.interact(move |conn| load_assignment(conn, assignment_id))
            .await
    }

    pub async fn get_assignment_view(
        &self,
        assignment_id: i32,
    ) -> Result<AssignmentView, StorageError> {
        self.interact(move |conn| {
            assignment_views()
                .filter(assignments::id.eq(assignment_id))
                .first::<AssignmentRow>(conn)
                .optional()?
                .map(into_view)
                .ok_or_else(|| StorageError::not_found("assignment", assignment_id))
        })
        .await
    }

    /// All assignments whose chore belongs to `owner`.
    pub async fn list_assignments(&self, owner: i32) -> Result<Vec<AssignmentView>, StorageError> {
        self.interact(move |conn| {
            let rows = assignment_views()
                .filter(chores::user_id.eq(owner))
                .order(assignments::id.asc())
                .load::<AssignmentRow>(conn)?;
            Ok(rows.into_iter().map(into_view).collect())
        })
        .await
    }

    pub async fn list_assignments_for_child(
        &self,
        child_id: i32,
    ) -> Result<Vec<AssignmentView>, StorageError> {
        self.interact(move |conn| {
            load_child(conn, child_id)?;
            let rows = assignment_views()
                .filter(assignments::child_id.eq(child_id))
                .order(assignments::id.asc())
                .load::<AssignmentRow>(conn)?;
            Ok(rows.into_iter().map(into_view).collect())
        })
        .await
    }

    pub async fn delete_assignment(&self, assignment_id: i32) -> Result<(), StorageError> {
        self.interact(move |conn| {
            let deleted = diesel::delete(assignments::table.find(assignment_id)).execute(conn)?;
            if deleted == 0 {
                return Err(StorageError::not_found("assignment", assignment_id));
            }
            Ok(())
        })
        .await
    }

    // Session helpers for JWT inactivity windows
    pub async fn create_session(&self, jti_: &str, user_id_: i32) -> Result<(), StorageError> {
        let j = jti_.to_string();
        self.interact(move |conn| {
            let new = NewSession {
                jti: &j,
                user_id: user_id_,
            };
            diesel::insert_into(sessions::table)
                .values(&new)
                .on_conflict_do_nothing()
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    pub async fn delete_session(&self, jti_: &str) -> Result<bool, StorageError> {
        let j = jti_.to_string();
        self.interact(move |conn| {
            let deleted =
                diesel::delete(sessions::table.filter(sessions::jti.eq(&j))).execute(conn)?;
            Ok(deleted > 0)
        })
        .await
    }

    /// Touch session atomically, but only if it hasn't expired.
    /// Returns `true` if the session was found and updated, `false` otherwise.
    pub async fn touch_session_with_cutoff(
        &self,
        jti_: &str,
        cutoff: chrono::NaiveDateTime,
    ) -> Result<bool, StorageError> {
        let j = jti_.to_string();
        self.interact(move |conn| {
            let now = Utc::now().naive_utc();
            let updated = diesel::update(
                sessions::table
                    .filter(sessions::jti.eq(&j))
                    .filter(sessions::last_used_at.ge(cutoff)),
            )
            .set(sessions::last_used_at.eq(now))
            .execute(conn)?;
            Ok(updated > 0)
        })
        .await
    }
}

type AssignmentRow = (i32, i32, String, bool, Chore);

#[allow(clippy::type_complexity)]
fn assignment_views() -> diesel::dsl::Select<
    diesel::dsl::InnerJoin<diesel::dsl::InnerJoin<assignments::table, children::table>, chores::table>,
    (
        assignments::id,
        assignments::child_id,
        children::name,
        assignments::is_completed,
        (
            chores::id,
            chores::user_id,
            chores::description,
            chores::points,
            chores::is_required,
            chores::due_date,
        ),
    ),
> {
    assignments::table
        .inner_join(children::table)
        .inner_join(chores::table)
        .select((
            assignments::id,
            assignments::child_id,
            children::name,
            assignments::is_completed,
            (
                chores::id,
                chores::user_id,
                chores::description,
                chores::points,
                chores::is_required,
                chores::due_date,
            ),
        ))
}

fn into_view((id, child_id, child_name, is_completed, chore): AssignmentRow) -> AssignmentView {
    AssignmentView {
        id,
        child_id,
        child_name,
        is_completed,
        chore,
    }
}

pub(crate) fn load_user(conn: &mut SqliteConnection, user_id: i32) -> Result<User, StorageError> {
    users::table
        .find(user_id)
        .select(User::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| StorageError::not_found("user", user_id))
}

pub(crate) fn load_child(conn: &mut SqliteConnection, child_id: i32) -> Result<Child, StorageError> {
    children::table
        .find(child_id)
        .select(Child::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| StorageError::not_found("child", child_id))
}

pub(crate) fn load_chore(conn: &mut SqliteConnection, chore_id: i32) -> Result<Chore, StorageError> {
    chores::table
        .find(chore_id)
        .select(Chore::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| StorageError::not_found("chore", chore_id))
}

pub(crate) fn load_reward(
    conn: &mut SqliteConnection,
    reward_id: i32,
) -> Result<Reward, StorageError> {
    rewards::table
        .find(reward_id)
        .select(Reward::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| StorageError::not_found("reward", reward_id))
}

pub(crate) fn load_assignment(
    conn: &mut SqliteConnection,
    assignment_id: i32,
) -> Result<Assignment, StorageError> {
    assignments::table
        .find(assignment_id)
        .select(Assignment::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| StorageError::not_found("assignment", assignment_id))
}

fn configure_sqlite_conn(conn: &mut SqliteConnection) -> Result<(), diesel::result::Error> {
    // Enable WAL for better read/write concurrency and set a busy timeout
    diesel::sql_query("PRAGMA journal_mode=WAL;").execute(conn)?;
    diesel::sql_query("PRAGMA synchronous=NORMAL;").execute(conn)?;
    diesel::sql_query("PRAGMA busy_timeout=5000;").execute(conn)?;
    diesel::sql_query("PRAGMA foreign_keys=ON;").execute(conn)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) async fn test_store() -> (tempfile::TempDir, Store, User) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let store = Store::connect_sqlite(path.to_str().unwrap()).await.unwrap();
        let user = store
            .create_user("parent", "parent@example.com", "hash", 1234)
            .await
            .unwrap();
        (dir, store, user)
    }

    #[tokio::test]
    async fn save_inserts_then_updates_child() {
        let (_dir, store, user) = test_store().await;
        let child = store
            .save_child(Child::new(user.id, "Alex", "Dishwasher"))
            .await
            .unwrap();
        assert_ne!(child.id, 0);
        assert_eq!(child.points, 0);
        assert_eq!(child.rewards, "");

        let mut edited = child.clone();
        edited.name = "Alexandra".into();
        edited.points = 3;
        store.save_child(edited).await.unwrap();

        let loaded = store.get_child(child.id).await.unwrap();
        assert_eq!(loaded.name, "Alexandra");
        assert_eq!(loaded.points, 3);
        assert_eq!(store.list_children(user.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_of_foreign_child_is_not_found() {
        let (_dir, store, user) = test_store().await;
        let child = store
            .save_child(Child::new(user.id, "Alex", ""))
            .await
            .unwrap();
        let mut foreign = child.clone();
        foreign.user_id = user.id + 100;
        foreign.name = "Mallory".into();
        assert!(matches!(
            store.save_child(foreign).await,
            Err(StorageError::NotFound(_))
        ));
        assert_eq!(store.get_child(child.id).await.unwrap().name, "Alex");
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let (_dir, store, _user) = test_store().await;
        assert!(matches!(
            store.get_child(42).await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            store.get_assignment_view(42).await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            store.list_assignments_for_child(42).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn save_assignment_inserts_then_updates() {
        let (_dir, store, user) = test_store().await;
        let child = store
            .save_child(Child::new(user.id, "Alex", ""))
            .await
            .unwrap();
        let chore = store
            .save_chore(Chore::new(user.id, "Dishes", 5))
            .await
            .unwrap();

        let inserted = store
            .save_assignment(Assignment {
                id: 0,
                child_id: child.id,
                chore_id: chore.id,
                is_completed: false,
                created_at: Utc::now().naive_utc(),
            })
            .await
            .unwrap();
        assert_ne!(inserted.id, 0);
        assert_eq!(store.get_assignment(inserted.id).await.unwrap(), inserted);

        let mut done = inserted.clone();
        done.is_completed = true;
        store.save_assignment(done).await.unwrap();
        let loaded = store.get_assignment(inserted.id).await.unwrap();
        assert!(loaded.is_completed);
        assert_eq!(loaded.child_id, child.id);
        assert_eq!(loaded.chore_id, chore.id);

        let mut missing = loaded;
        missing.id += 100;
        assert!(matches!(
            store.save_assignment(missing).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_of_foreign_or_missing_chore_and_reward_is_not_found() {
        let (_dir, store, user) = test_store().await;
        let chore = store
            .save_chore(Chore::new(user.id, "Dishes", 5))
            .await
            .unwrap();
        let reward = store
            .save_reward(Reward::new(user.id, "Sticker", 3))
            .await
            .unwrap();

        let mut foreign_chore = chore.clone();
        foreign_chore.user_id = user.id + 100;
        foreign_chore.points = 500;
        assert!(matches!(
            store.save_chore(foreign_chore).await,
            Err(StorageError::NotFound(_))
        ));
        let mut missing_chore = chore.clone();
        missing_chore.id += 100;
        assert!(matches!(
            store.save_chore(missing_chore).await,
            Err(StorageError::NotFound(_))
        ));
        assert_eq!(store.get_chore(chore.id).await.unwrap(), chore);

        let mut foreign_reward = reward.clone();
        foreign_reward.user_id = user.id + 100;
        foreign_reward.point_cost = 0;
        assert!(matches!(
            store.save_reward(foreign_reward).await,
            Err(StorageError::NotFound(_))
        ));
        let mut missing_reward = reward.clone();
        missing_reward.id += 100;
        assert!(matches!(
            store.save_reward(missing_reward).await,
            Err(StorageError::NotFound(_))
        ));
        assert_eq!(store.get_reward(reward.id).await.unwrap(), reward);
    }

    #[tokio::test]
    async fn deleting_unknown_ids_is_not_found() {
        let (_dir, store, _user) = test_store().await;
        assert!(matches!(
            store.delete_child(99).await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_chore(99).await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_reward(99).await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_assignment(99).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn deleting_child_drops_its_assignments() {
        let (_dir, store, user) = test_store().await;
        let child = store
            .save_child(Child::new(user.id, "Alex", ""))
            .await
            .unwrap();
        let chore = store
            .save_chore(Chore::new(user.id, "Dishes", 10))
            .await
            .unwrap();
        store.assign_chore(child.id, chore.id).await.unwrap();

        store.delete_child(child.id).await.unwrap();
        assert!(store.list_assignments(user.id).await.unwrap().is_empty());
        assert_eq!(store.list_unassigned_chores(user.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unassigned_chores_exclude_assigned_ones() {
        let (_dir, store, user) = test_store().await;
        let child = store
            .save_child(Child::new(user.id, "Alex", ""))
            .await
            .unwrap();
        let dishes = store
            .save_chore(Chore::new(user.id, "Dishes", 10))
            .await
            .unwrap();
        let laundry = store
            .save_chore(Chore::new(user.id, "Laundry", 5))
            .await
            .unwrap();
        store.assign_chore(child.id, dishes.id).await.unwrap();

        let free = store.list_unassigned_chores(user.id).await.unwrap();
        assert_eq!(free, vec![laundry]);

        let views = store.list_assignments_for_child(child.id).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].child_name, "Alex");
        assert_eq!(views[0].chore.description, "Dishes");
        assert!(!views[0].is_completed);
    }

    #[tokio::test]
    async fn rewards_listed_cheapest_first() {
        let (_dir, store, user) = test_store().await;
        for (desc, cost) in [("Movie", 30), ("Sticker", 5), ("Ice cream", 10)] {
            store
                .save_reward(Reward::new(user.id, desc, cost))
                .await
                .unwrap();
        }
        let costs: Vec<i32> = store
            .list_rewards(user.id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.point_cost)
            .collect();
        assert_eq!(costs, vec![5, 10, 30]);
    }

    #[tokio::test]
    async fn duplicate_username_is_conflict() {
        let (_dir, store, _user) = test_store().await;
        assert!(matches!(
            store
                .create_user("parent", "other@example.com", "hash", 1234)
                .await,
            Err(StorageError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn parent_pin_updates() {
        let (_dir, store, user) = test_store().await;
        assert_eq!(user.parent_pin, 1234);
        store.set_parent_pin(user.id, 4321).await.unwrap();
        assert_eq!(store.get_user(user.id).await.unwrap().parent_pin, 4321);
        store
            .set_parent_pin_by_username("parent", 1111)
            .await
            .unwrap();
        assert_eq!(store.get_user(user.id).await.unwrap().parent_pin, 1111);
        assert!(matches!(
            store.set_parent_pin_by_username("nobody", 1111).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn session_touch_respects_cutoff() {
        let (_dir, store, user) = test_store().await;
        store.create_session("jti-1", user.id).await.unwrap();
        let past = Utc::now().naive_utc() - chrono::Duration::days(1);
        let future = Utc::now().naive_utc() + chrono::Duration::days(1);
        assert!(store.touch_session_with_cutoff("jti-1", past).await.unwrap());
        assert!(!store.touch_session_with_cutoff("jti-1", future).await.unwrap());
        assert!(store.delete_session("jti-1").await.unwrap());
        assert!(!store.touch_session_with_cutoff("jti-1", past).await.unwrap());
    }
}
