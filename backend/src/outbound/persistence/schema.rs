//! Diesel table definitions.
//!
//! Must match `backend/migrations` exactly; regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Accounts. `email` is stored normalised and is unique.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        /// Argon2id PHC string.
        password_hash -> Text,
        role -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    courses (id) {
        id -> Uuid,
        title -> Text,
        description -> Nullable<Text>,
        /// List price in minor units.
        price_minor -> Int8,
        thumbnail_url -> Nullable<Text>,
        is_free -> Bool,
        published -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    modules (id) {
        id -> Uuid,
        course_id -> Uuid,
        title -> Text,
        position -> Int4,
    }
}

diesel::table! {
    lessons (id) {
        id -> Uuid,
        module_id -> Uuid,
        title -> Text,
        description -> Nullable<Text>,
        video_id -> Text,
        duration_seconds -> Int4,
        position -> Int4,
    }
}

diesel::table! {
    /// One row per granted (user, course) pair.
    enrollments (user_id, course_id) {
        user_id -> Uuid,
        course_id -> Uuid,
        method -> Varchar,
        transaction_id -> Nullable<Text>,
        amount_minor -> Int8,
        enrolled_at -> Timestamptz,
    }
}

diesel::table! {
    lesson_progress (user_id, lesson_id) {
        user_id -> Uuid,
        lesson_id -> Uuid,
        last_watched_second -> Int4,
        progress_percent -> Int4,
        status -> Varchar,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Checkouts keyed by the server-minted provider reference.
    pending_payments (tx_ref) {
        tx_ref -> Uuid,
        user_id -> Uuid,
        course_id -> Uuid,
        amount_minor -> Int8,
        currency -> Varchar,
        created_at -> Timestamptz,
        confirmed_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(modules -> courses (course_id));
diesel::joinable!(lessons -> modules (module_id));
diesel::joinable!(enrollments -> users (user_id));
diesel::joinable!(enrollments -> courses (course_id));
diesel::joinable!(lesson_progress -> users (user_id));
diesel::joinable!(lesson_progress -> lessons (lesson_id));
diesel::joinable!(pending_payments -> users (user_id));
diesel::joinable!(pending_payments -> courses (course_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    courses,
    modules,
    lessons,
    enrollments,
    lesson_progress,
    pending_payments,
);
