//! PostgreSQL-backed `ProgressRepository` implementation.
//!
//! `record` runs the monotonic merge inside a transaction holding a row lock,
//! so two reports for the same lesson never interleave. A first report that
//! loses an insert race falls back to merging into the winner's row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ProgressRepository, ProgressRepositoryError};
use crate::domain::{LessonProgress, ProgressObservation, UserId, apply_report};

use super::diesel_error_mapping::repository_error_mappers;
use super::models::ProgressRow;
use super::pool::DbPool;
use super::schema::lesson_progress;

/// Diesel-backed implementation of the progress port.
#[derive(Clone)]
pub struct DieselProgressRepository {
    pool: DbPool,
}

impl DieselProgressRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

repository_error_mappers!(ProgressRepositoryError);

/// Failure inside the merge transaction.
#[derive(Debug)]
enum RecordError {
    Diesel(DieselError),
    Corrupt(String),
    Vanished,
}

impl From<DieselError> for RecordError {
    fn from(error: DieselError) -> Self {
        Self::Diesel(error)
    }
}

impl From<RecordError> for ProgressRepositoryError {
    fn from(error: RecordError) -> Self {
        match error {
            RecordError::Diesel(err) => map_diesel_error(err),
            RecordError::Corrupt(message) => Self::query(message),
            RecordError::Vanished => Self::query("progress row vanished during merge"),
        }
    }
}

async fn lock_row(
    conn: &mut AsyncPgConnection,
    user_id: Uuid,
    lesson_id: Uuid,
) -> Result<Option<LessonProgress>, RecordError> {
    let row = lesson_progress::table
        .find((user_id, lesson_id))
        .select(ProgressRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?;
    row.map(LessonProgress::try_from)
        .transpose()
        .map_err(RecordError::Corrupt)
}

/// The row another reporter inserted first; it must still be there.
fn conflicting_row(row: Option<LessonProgress>) -> Result<LessonProgress, RecordError> {
    row.ok_or(RecordError::Vanished)
}

fn ensure_written(affected: usize) -> Result<(), RecordError> {
    match affected {
        1 => Ok(()),
        _ => Err(RecordError::Vanished),
    }
}

#[async_trait]
impl ProgressRepository for DieselProgressRepository {
    async fn record(
        &self,
        user_id: &UserId,
        lesson_id: Uuid,
        observation: ProgressObservation,
        now: DateTime<Utc>,
    ) -> Result<LessonProgress, ProgressRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user = user_id.clone();
        let record = conn
            .transaction(|conn| {
                async move {
                    let user_uuid = *user.as_uuid();
                    let existing = match lock_row(conn, user_uuid, lesson_id).await? {
                        Some(stored) => stored,
                        None => {
                            let first =
                                apply_report(None, user.clone(), lesson_id, observation, now);
                            let inserted = diesel::insert_into(lesson_progress::table)
                                .values(ProgressRow::from(&first))
                                .on_conflict((
                                    lesson_progress::user_id,
                                    lesson_progress::lesson_id,
                                ))
                                .do_nothing()
                                .execute(conn)
                                .await?;
                            if inserted > 0 {
                                return Ok(first);
                            }
                            conflicting_row(lock_row(conn, user_uuid, lesson_id).await?)?
                        }
                    };

                    let merged = apply_report(Some(existing), user, lesson_id, observation, now);
                    let row = ProgressRow::from(&merged);
                    let affected =
                        diesel::update(lesson_progress::table.find((user_uuid, lesson_id)))
                            .set(&row)
                            .execute(conn)
                            .await?;
                    ensure_written(affected)?;
                    Ok::<_, RecordError>(merged)
                }
                .scope_boxed()
            })
            .await?;
        Ok(record)
    }

    async fn list_for_lessons(
        &self,
        user_id: &UserId,
        lesson_ids: &[Uuid],
    ) -> Result<Vec<LessonProgress>, ProgressRepositoryError> {
        if lesson_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ProgressRow> = lesson_progress::table
            .filter(lesson_progress::user_id.eq(*user_id.as_uuid()))
            .filter(lesson_progress::lesson_id.eq_any(lesson_ids.to_vec()))
            .select(ProgressRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|row| LessonProgress::try_from(row).map_err(ProgressRepositoryError::query))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn corrupt_rows_become_query_errors() {
        let error = ProgressRepositoryError::from(RecordError::Corrupt("bad status".to_owned()));
        assert_eq!(error, ProgressRepositoryError::query("bad status"));
    }

    #[rstest]
    fn a_conflicting_row_that_disappeared_is_an_error() {
        let error = conflicting_row(None).map(|_| ()).map_err(ProgressRepositoryError::from);
        assert_eq!(
            error,
            Err(ProgressRepositoryError::query("progress row vanished during merge"))
        );
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(2, false)]
    fn merges_must_update_exactly_one_row(#[case] affected: usize, #[case] ok: bool) {
        assert_eq!(ensure_written(affected).is_ok(), ok);
    }

    #[rstest]
    fn diesel_failures_keep_their_classification() {
        assert!(matches!(
            ProgressRepositoryError::from(RecordError::from(DieselError::BrokenTransactionManager)),
            ProgressRepositoryError::Connection { .. }
        ));
    }
}
