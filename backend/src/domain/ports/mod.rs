//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod booking_side_effects;
mod family_member_repository;
mod family_members;
mod health_certificate_lookup;
mod turn_booking;
mod turn_repository;
mod user_repository;

#[cfg(test)]
pub use booking_side_effects::{MockBadgeEvaluationTrigger, MockBookingNotifier};
pub use booking_side_effects::{
    BadgeEvaluationError, BadgeEvaluationTrigger, BookingNotificationError, BookingNotifier,
};
#[cfg(test)]
pub use family_member_repository::MockFamilyMemberRepository;
pub use family_member_repository::{FamilyMemberPersistenceError, FamilyMemberRepository};
#[cfg(test)]
pub use family_members::{MockFamilyMembersCommand, MockFamilyMembersQuery};
pub use family_members::{FamilyMembersCommand, FamilyMembersQuery};
#[cfg(test)]
pub use health_certificate_lookup::MockHealthCertificateLookup;
pub use health_certificate_lookup::HealthCertificateLookup;
#[cfg(test)]
pub use turn_booking::MockTurnBookingCommand;
pub use turn_booking::{CreateTurnRequest, TurnBookingCommand};
#[cfg(test)]
pub use turn_repository::MockTurnRepository;
pub use turn_repository::{TurnPersistenceError, TurnRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
