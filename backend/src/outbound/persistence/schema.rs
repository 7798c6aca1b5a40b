//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match `backend/migrations` exactly; `diesel print-schema`
//! regenerates them from a live database.

diesel::table! {
    /// Registered accounts, owned by the identity system.
    users (id) {
        id -> Uuid,
        /// National identity number, unique.
        dni -> Int4,
        /// Lowercased login e-mail, unique.
        email -> Varchar,
        display_name -> Varchar,
        /// `DOCTOR`, `PATIENT` or `ADMIN`.
        role -> Varchar,
        /// `ACTIVE`, `PENDING` or `DISABLED`.
        status -> Varchar,
    }
}

diesel::table! {
    /// Family members registered by patient holders.
    family_members (id) {
        id -> Uuid,
        holder_id -> Uuid,
        name -> Varchar,
        surname -> Varchar,
        /// Unique through `family_members_dni_key`.
        dni -> Int4,
        birthdate -> Date,
        gender -> Varchar,
        relationship -> Varchar,
    }
}

diesel::table! {
    /// Booked appointments.
    ///
    /// `turns_doctor_active_slot_key` is a partial unique index over
    /// `(doctor_id, scheduled_at)` for rows whose status is not `CANCELLED`.
    turns (id) {
        id -> Uuid,
        doctor_id -> Uuid,
        patient_id -> Uuid,
        family_member_id -> Nullable<Uuid>,
        scheduled_at -> Timestamptz,
        motive -> Nullable<Varchar>,
        status -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(family_members -> users (holder_id));
diesel::joinable!(turns -> family_members (family_member_id));

diesel::allow_tables_to_appear_in_same_query!(users, family_members, turns);
