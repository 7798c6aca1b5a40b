//! Translation of driven-port failures into domain errors.
//!
//! Connection failures surface as `service_unavailable`, query failures as
//! `internal_error`. Constraint signals are mapped by the services that
//! understand them and never reach these helpers.

use crate::domain::Error;
use crate::domain::ports::{
    FamilyMemberPersistenceError, TurnPersistenceError, UserPersistenceError,
};

pub(crate) fn user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

pub(crate) fn family_error(error: FamilyMemberPersistenceError) -> Error {
    match error {
        FamilyMemberPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("family member repository unavailable: {message}"))
        }
        FamilyMemberPersistenceError::Query { message } => {
            Error::internal(format!("family member repository error: {message}"))
        }
        FamilyMemberPersistenceError::DuplicateDni { dni } => {
            Error::internal(format!("unexpected duplicate DNI signal for {dni}"))
        }
    }
}

pub(crate) fn turn_error(error: TurnPersistenceError) -> Error {
    match error {
        TurnPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("turn repository unavailable: {message}"))
        }
        TurnPersistenceError::Query { message } => {
            Error::internal(format!("turn repository error: {message}"))
        }
        TurnPersistenceError::SlotTaken => Error::internal("unexpected slot conflict signal"),
    }
}
