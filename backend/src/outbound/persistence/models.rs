//! Internal Diesel row structs and their conversions to domain types.
//!
//! Rows never leave the persistence layer. Conversions that can fail (a
//! stored value the domain no longer accepts) return `Err(String)` so each
//! repository can wrap the message in its own query error.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::UserAccount;
use crate::domain::{
    Course, Email, Enrollment, Lesson, LessonProgress, Module, PasswordHash, PendingPayment, Price,
    ProgressStatus, Role, User, UserId, UserName,
};

use super::schema::{
    courses, enrollments, lesson_progress, lessons, modules, pending_payments, users,
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

impl UserRow {
    pub(crate) fn into_user(self) -> Result<User, String> {
        self.into_account().map(|account| account.user)
    }

    pub(crate) fn into_account(self) -> Result<UserAccount, String> {
        let name = UserName::new(self.name).map_err(|err| err.to_string())?;
        let email = Email::new(&self.email).map_err(|err| err.to_string())?;
        let role = self.role.parse::<Role>().map_err(|err| err.to_string())?;
        Ok(UserAccount {
            user: User::new(UserId::from_uuid(self.id), name, email, role),
            password_hash: PasswordHash::from_stored(self.password_hash),
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
}

impl<'a> From<&'a UserAccount> for NewUserRow<'a> {
    fn from(account: &'a UserAccount) -> Self {
        Self {
            id: *account.user.id().as_uuid(),
            name: account.user.name().as_ref(),
            email: account.user.email().as_ref(),
            password_hash: account.password_hash.as_str(),
            role: account.user.role().as_str(),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CourseRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price_minor: i64,
    pub thumbnail_url: Option<String>,
    pub is_free: bool,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CourseRow> for Course {
    type Error = String;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            title: row.title,
            description: row.description,
            price: price_from_db(row.price_minor)?,
            thumbnail_url: row.thumbnail_url,
            is_free: row.is_free,
            published: row.published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insert and full-replace changeset share one shape.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = courses)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CourseWrite<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub price_minor: i64,
    pub thumbnail_url: Option<&'a str>,
    pub is_free: bool,
    pub published: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = courses)]
pub(crate) struct NewCourseRow<'a> {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[diesel(embed)]
    pub fields: CourseWrite<'a>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = modules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ModuleRow {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub position: i32,
}

impl From<ModuleRow> for Module {
    fn from(row: ModuleRow) -> Self {
        Self {
            id: row.id,
            course_id: row.course_id,
            title: row.title,
            position: row.position,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = lessons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LessonRow {
    pub id: Uuid,
    pub module_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub video_id: String,
    pub duration_seconds: i32,
    pub position: i32,
}

impl From<LessonRow> for Lesson {
    fn from(row: LessonRow) -> Self {
        Self {
            id: row.id,
            module_id: row.module_id,
            title: row.title,
            description: row.description,
            video_id: row.video_id,
            duration_seconds: row.duration_seconds,
            position: row.position,
        }
    }
}

// ---------------------------------------------------------------------------
// Enrollments and progress
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = enrollments)]
pub(crate) struct NewEnrollmentRow<'a> {
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub method: &'a str,
    pub transaction_id: Option<&'a str>,
    pub amount_minor: i64,
    pub enrolled_at: DateTime<Utc>,
}

impl<'a> From<&'a Enrollment> for NewEnrollmentRow<'a> {
    fn from(enrollment: &'a Enrollment) -> Self {
        Self {
            user_id: *enrollment.user_id.as_uuid(),
            course_id: enrollment.course_id,
            method: enrollment.method.label(),
            transaction_id: enrollment.transaction_id.as_deref(),
            amount_minor: enrollment.amount.minor_units(),
            enrolled_at: enrollment.enrolled_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = lesson_progress)]
#[diesel(primary_key(user_id, lesson_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProgressRow {
    pub user_id: Uuid,
    pub lesson_id: Uuid,
    pub last_watched_second: i32,
    pub progress_percent: i32,
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProgressRow> for LessonProgress {
    type Error = String;

    fn try_from(row: ProgressRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::from_uuid(row.user_id),
            lesson_id: row.lesson_id,
            last_watched_second: row.last_watched_second,
            percent: row.progress_percent,
            status: row
                .status
                .parse::<ProgressStatus>()
                .map_err(|err| err.to_string())?,
            updated_at: row.updated_at,
        })
    }
}

impl From<&LessonProgress> for ProgressRow {
    fn from(progress: &LessonProgress) -> Self {
        Self {
            user_id: *progress.user_id.as_uuid(),
            lesson_id: progress.lesson_id,
            last_watched_second: progress.last_watched_second,
            progress_percent: progress.percent,
            status: progress.status.as_str().to_owned(),
            updated_at: progress.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Pending payments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = pending_payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PendingPaymentRow {
    pub tx_ref: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub amount_minor: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl TryFrom<PendingPaymentRow> for PendingPayment {
    type Error = String;

    fn try_from(row: PendingPaymentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            tx_ref: row.tx_ref,
            user_id: UserId::from_uuid(row.user_id),
            course_id: row.course_id,
            amount: price_from_db(row.amount_minor)?,
            currency: row.currency,
            created_at: row.created_at,
            confirmed_at: row.confirmed_at,
        })
    }
}

impl From<&PendingPayment> for PendingPaymentRow {
    fn from(pending: &PendingPayment) -> Self {
        Self {
            tx_ref: pending.tx_ref,
            user_id: *pending.user_id.as_uuid(),
            course_id: pending.course_id,
            amount_minor: pending.amount.minor_units(),
            currency: pending.currency.clone(),
            created_at: pending.created_at,
            confirmed_at: pending.confirmed_at,
        }
    }
}

fn price_from_db(minor: i64) -> Result<Price, String> {
    Price::from_minor_units(minor).map_err(|err| format!("stored amount {minor}: {err}"))
}
