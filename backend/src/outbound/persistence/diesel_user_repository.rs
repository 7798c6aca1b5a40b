//! PostgreSQL-backed `UserRepository`.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Dni, User, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{UserRow, dni_column};
use super::pool::DbPool;
use super::schema::users;

/// Diesel implementation of [`UserRepository`].
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

define_sql_function! {
    fn lower(value: Text) -> Text;
}

/// Users whose email matches `email` ignoring case.
fn by_email(email: &str) -> users::BoxedQuery<'static, Pg> {
    users::table
        .filter(lower(users::email).eq(email.to_lowercase()))
        .into_boxed()
}

fn map_error(error: &diesel::result::Error) -> UserPersistenceError {
    map_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn decode(row: UserRow) -> Result<User, UserPersistenceError> {
    let id = row.id;
    User::try_from(row).map_err(|reason| {
        warn!(user_id = %id, %reason, "stored user row is invalid");
        UserPersistenceError::query(format!("invalid user row: {reason}"))
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;
        users::table
            .find(*id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_error(&err))?
            .map(decode)
            .transpose()
    }

    async fn exists_by_dni(&self, dni: Dni) -> Result<bool, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;
        diesel::select(diesel::dsl::exists(
            users::table.filter(users::dni.eq(dni_column(dni))),
        ))
        .get_result(&mut conn)
        .await
        .map_err(|err| map_error(&err))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;
        by_email(email)
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_error(&err))?
            .map(decode)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::debug_query;
    use rstest::rstest;

    #[rstest]
    #[case("ana@example.com")]
    #[case("Ana@Example.COM")]
    fn email_lookup_lowers_both_sides(#[case] email: &str) {
        let sql = debug_query::<Pg, _>(&by_email(email)).to_string();
        assert!(sql.contains(r#"lower("users"."email") = $1"#), "{sql}");
        assert!(sql.contains(r#"["ana@example.com"]"#), "{sql}");
    }
}
