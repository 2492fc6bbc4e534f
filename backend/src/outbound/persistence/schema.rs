//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; regenerate with
//! `diesel print-schema` when the migrations change.

diesel::table! {
    /// Team registrations, one row per owner.
    ///
    /// `owner_id` carries a unique constraint: it is the natural key the
    /// upsert conflicts on.
    team_registrations (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Authenticated owner; unique across the table.
        owner_id -> Uuid,
        team_name -> Varchar,
        captain_name -> Varchar,
        contact_email -> Varchar,
        phone_number -> Varchar,
        age_range -> Varchar,
        soapbox_name -> Varchar,
        design_description -> Text,
        dimensions -> Varchar,
        brakes_steering -> Text,
        terms_accepted -> Bool,
        /// Blob-store key of the uploaded design file, if any.
        file_ref -> Nullable<Text>,
        /// Review status: `pending`, `approved`, or `rejected`.
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Team members, replaced wholesale on every save.
    team_members (id) {
        id -> Uuid,
        registration_id -> Uuid,
        /// Zero-based display order within the team.
        position -> Int4,
        name -> Varchar,
        age -> Int4,
    }
}

diesel::joinable!(team_members -> team_registrations (registration_id));
diesel::allow_tables_to_appear_in_same_query!(team_registrations, team_members);
