//! PostgreSQL-backed `TurnRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{TurnPersistenceError, TurnRepository};
use crate::domain::{Turn, TurnStatus, UserId};

use super::diesel_error_mapping::{
    DOCTOR_SLOT_CONSTRAINT, map_diesel_error, map_pool_error, violated_unique_constraint,
};
use super::models::TurnRow;
use super::pool::DbPool;
use super::schema::turns;

/// Diesel implementation of [`TurnRepository`].
#[derive(Clone)]
pub struct DieselTurnRepository {
    pool: DbPool,
}

impl DieselTurnRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(error: &diesel::result::Error) -> TurnPersistenceError {
    if violated_unique_constraint(error) == Some(DOCTOR_SLOT_CONSTRAINT) {
        return TurnPersistenceError::slot_taken();
    }
    map_diesel_error(
        error,
        TurnPersistenceError::query,
        TurnPersistenceError::connection,
    )
}

#[async_trait]
impl TurnRepository for DieselTurnRepository {
    async fn exists_active_for_doctor_at(
        &self,
        doctor_id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<bool, TurnPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, TurnPersistenceError::connection))?;
        diesel::select(diesel::dsl::exists(
            turns::table
                .filter(turns::doctor_id.eq(*doctor_id.as_uuid()))
                .filter(turns::scheduled_at.eq(at))
                .filter(turns::status.ne(TurnStatus::Cancelled.as_str())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(|err| map_error(&err))
    }

    async fn insert(&self, turn: &Turn) -> Result<(), TurnPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, TurnPersistenceError::connection))?;
        diesel::insert_into(turns::table)
            .values(TurnRow::from(turn))
            .execute(&mut conn)
            .await
            .map_err(|err| map_error(&err))?;
        Ok(())
    }

    async fn has_completed_turn_since(
        &self,
        patient_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<bool, TurnPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, TurnPersistenceError::connection))?;
        diesel::select(diesel::dsl::exists(
            turns::table
                .filter(turns::patient_id.eq(*patient_id.as_uuid()))
                .filter(turns::status.eq(TurnStatus::Completed.as_str()))
                .filter(turns::scheduled_at.ge(since)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(|err| map_error(&err))
    }
}
