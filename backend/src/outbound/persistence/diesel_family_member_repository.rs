//! PostgreSQL-backed `FamilyMemberRepository`.
//!
//! A violation of `family_members_dni_key` is reported as
//! [`FamilyMemberPersistenceError::DuplicateDni`] so the registry can answer
//! with the same conflict its pre-check produces.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{FamilyMemberPersistenceError, FamilyMemberRepository};
use crate::domain::{Dni, FamilyMember, FamilyMemberId, UserId};

use super::diesel_error_mapping::{
    FAMILY_DNI_CONSTRAINT, map_diesel_error, map_pool_error, violated_unique_constraint,
};
use super::models::{FamilyMemberRow, FamilyMemberUpdate, dni_column};
use super::pool::DbPool;
use super::schema::family_members;

type PooledPg<'a> = PooledConnection<'a, AsyncPgConnection>;

/// Diesel implementation of [`FamilyMemberRepository`].
#[derive(Clone)]
pub struct DieselFamilyMemberRepository {
    pool: DbPool,
}

impl DieselFamilyMemberRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn connection(&self) -> Result<PooledPg<'_>, FamilyMemberPersistenceError> {
        self.pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, FamilyMemberPersistenceError::connection))
    }
}

fn map_error(error: &diesel::result::Error) -> FamilyMemberPersistenceError {
    map_diesel_error(
        error,
        FamilyMemberPersistenceError::query,
        FamilyMemberPersistenceError::connection,
    )
}

fn map_write_error(error: &diesel::result::Error, dni: Dni) -> FamilyMemberPersistenceError {
    if violated_unique_constraint(error) == Some(FAMILY_DNI_CONSTRAINT) {
        return FamilyMemberPersistenceError::duplicate_dni(dni.value());
    }
    map_error(error)
}

fn decode(row: FamilyMemberRow) -> Result<FamilyMember, FamilyMemberPersistenceError> {
    let id = row.id;
    FamilyMember::try_from(row).map_err(|reason| {
        warn!(family_member_id = %id, %reason, "stored family member row is invalid");
        FamilyMemberPersistenceError::query(format!("invalid family member row: {reason}"))
    })
}

fn decode_all(
    rows: Vec<FamilyMemberRow>,
) -> Result<Vec<FamilyMember>, FamilyMemberPersistenceError> {
    rows.into_iter().map(decode).collect()
}

#[async_trait]
impl FamilyMemberRepository for DieselFamilyMemberRepository {
    async fn find_by_id(
        &self,
        id: &FamilyMemberId,
    ) -> Result<Option<FamilyMember>, FamilyMemberPersistenceError> {
        let mut conn = self.connection().await?;
        family_members::table
            .find(*id.as_uuid())
            .select(FamilyMemberRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_error(&err))?
            .map(decode)
            .transpose()
    }

    async fn exists_by_dni(&self, dni: Dni) -> Result<bool, FamilyMemberPersistenceError> {
        let mut conn = self.connection().await?;
        diesel::select(diesel::dsl::exists(
            family_members::table.filter(family_members::dni.eq(dni_column(dni))),
        ))
        .get_result(&mut conn)
        .await
        .map_err(|err| map_error(&err))
    }

    async fn list_by_holder(
        &self,
        holder_id: &UserId,
    ) -> Result<Vec<FamilyMember>, FamilyMemberPersistenceError> {
        let mut conn = self.connection().await?;
        let rows = family_members::table
            .filter(family_members::holder_id.eq(*holder_id.as_uuid()))
            .order((family_members::surname.asc(), family_members::name.asc()))
            .select(FamilyMemberRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_error(&err))?;
        decode_all(rows)
    }

    async fn list_by_holders(
        &self,
        holder_ids: &[UserId],
    ) -> Result<Vec<FamilyMember>, FamilyMemberPersistenceError> {
        let ids: Vec<Uuid> = holder_ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.connection().await?;
        let rows = family_members::table
            .filter(family_members::holder_id.eq_any(ids))
            .order((family_members::surname.asc(), family_members::name.asc()))
            .select(FamilyMemberRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_error(&err))?;
        decode_all(rows)
    }

    async fn insert(&self, member: &FamilyMember) -> Result<(), FamilyMemberPersistenceError> {
        let mut conn = self.connection().await?;
        diesel::insert_into(family_members::table)
            .values(FamilyMemberRow::from(member))
            .execute(&mut conn)
            .await
            .map_err(|err| map_write_error(&err, member.dni))?;
        Ok(())
    }

    async fn update(&self, member: &FamilyMember) -> Result<(), FamilyMemberPersistenceError> {
        let mut conn = self.connection().await?;
        let updated = diesel::update(family_members::table.find(*member.id.as_uuid()))
            .set(FamilyMemberUpdate::from(member))
            .execute(&mut conn)
            .await
            .map_err(|err| map_write_error(&err, member.dni))?;
        if updated == 0 {
            return Err(FamilyMemberPersistenceError::query(format!(
                "family member {} not found",
                member.id
            )));
        }
        Ok(())
    }
}
