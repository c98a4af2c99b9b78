//! Catalog model: courses, their ordered modules, and ordered lessons.
//!
//! Display order is append-only: a new module or lesson takes
//! `max(existing) + 1` within its parent and deletions leave gaps. Nothing in
//! the crate relies on order values being contiguous.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation failures for catalog authoring input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("price is required for paid courses")]
    MissingPrice,
    #[error("price must be a non-negative decimal with at most two fractional digits")]
    InvalidPrice,
    #[error("durationSeconds must not be negative")]
    NegativeDuration,
}

impl CatalogValidationError {
    /// JSON field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyField { field } => field,
            Self::MissingPrice | Self::InvalidPrice => "price",
            Self::NegativeDuration => "durationSeconds",
        }
    }
}

const MINOR_UNITS: i64 = 100;

/// Currency-agnostic amount held as integer minor units (two decimals).
///
/// Parsed from decimal text without touching floating point and rendered back
/// as a fixed two-decimal string.
///
/// # Examples
/// ```
/// use lms_backend::domain::Price;
///
/// let price: Price = "1500.5".parse().expect("valid price");
/// assert_eq!(price.minor_units(), 150_050);
/// assert_eq!(price.to_string(), "1500.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "PriceRepr", into = "String")]
pub struct Price(i64);

impl Price {
    pub const ZERO: Self = Self(0);

    /// Construct from minor units, rejecting negative amounts.
    pub fn from_minor_units(minor: i64) -> Result<Self, CatalogValidationError> {
        if minor < 0 {
            return Err(CatalogValidationError::InvalidPrice);
        }
        Ok(Self(minor))
    }

    pub fn minor_units(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / MINOR_UNITS, self.0 % MINOR_UNITS)
    }
}

impl std::str::FromStr for Price {
    type Err = CatalogValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let (whole, fraction) = raw.split_once('.').unwrap_or((raw, ""));
        let digits_only = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if whole.is_empty() || !digits_only(whole) || !digits_only(fraction) {
            return Err(CatalogValidationError::InvalidPrice);
        }
        // "1500.0" and "1500.00" are accepted; trailing zeros past two places are too.
        let fraction = fraction.trim_end_matches('0');
        if fraction.len() > 2 {
            return Err(CatalogValidationError::InvalidPrice);
        }
        let whole: i64 = whole
            .parse()
            .map_err(|_| CatalogValidationError::InvalidPrice)?;
        let cents: i64 = format!("{fraction:0<2}")
            .parse()
            .map_err(|_| CatalogValidationError::InvalidPrice)?;
        whole
            .checked_mul(MINOR_UNITS)
            .and_then(|minor| minor.checked_add(cents))
            .ok_or(CatalogValidationError::InvalidPrice)
            .and_then(Self::from_minor_units)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriceRepr {
    Text(String),
    Number(serde_json::Number),
}

impl TryFrom<PriceRepr> for Price {
    type Error = CatalogValidationError;

    fn try_from(value: PriceRepr) -> Result<Self, Self::Error> {
        match value {
            PriceRepr::Text(text) => text.parse(),
            PriceRepr::Number(number) => number.to_string().parse(),
        }
    }
}

impl From<Price> for String {
    fn from(value: Price) -> Self {
        value.to_string()
    }
}

/// A course as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Stored list price. See [`Course::effective_price`] for what is charged.
    pub price: Price,
    pub thumbnail_url: Option<String>,
    pub is_free: bool,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// Amount charged at checkout: zero for free courses regardless of the
    /// stored price.
    pub fn effective_price(&self) -> Price {
        if self.is_free { Price::ZERO } else { self.price }
    }
}

/// Listing entry for the public catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseSummary {
    pub course: Course,
    pub module_count: i64,
}

/// Ordered group of lessons inside a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub position: i32,
}

/// A single video lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    pub id: Uuid,
    pub module_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Identifier of the video at the external host.
    pub video_id: String,
    pub duration_seconds: i32,
    pub position: i32,
}

/// A module with its lessons in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOutline {
    pub module: Module,
    pub lessons: Vec<Lesson>,
}

/// A course with its modules and lessons in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseOutline {
    pub course: Course,
    pub modules: Vec<ModuleOutline>,
}

impl CourseOutline {
    /// All lessons, module by module, in display order.
    pub fn lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.modules.iter().flat_map(|module| module.lessons.iter())
    }

    /// Sort modules and their lessons by position, keeping gaps.
    pub fn sorted(mut self) -> Self {
        self.modules.sort_by_key(|outline| outline.module.position);
        for outline in &mut self.modules {
            outline.lessons.sort_by_key(|lesson| lesson.position);
        }
        self
    }
}

/// Compute the position for a new child given the current maximum.
///
/// # Examples
/// ```
/// use lms_backend::domain::next_position;
///
/// assert_eq!(next_position(None), 1);
/// assert_eq!(next_position(Some(4)), 5);
/// ```
pub fn next_position(current_max: Option<i32>) -> i32 {
    current_max.map_or(1, |max| max.saturating_add(1))
}

fn required_text(value: &str, field: &'static str) -> Result<String, CatalogValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CatalogValidationError::EmptyField { field });
    }
    Ok(trimmed.to_owned())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

/// Validated fields for creating or replacing a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDraft {
    pub title: String,
    pub description: Option<String>,
    pub price: Price,
    pub thumbnail_url: Option<String>,
    pub is_free: bool,
    pub published: bool,
}

impl CourseDraft {
    /// Validate authoring input.
    ///
    /// A price is mandatory unless the course is free; free courses without a
    /// price store zero. `published` defaults to true.
    pub fn try_new(
        title: &str,
        description: Option<String>,
        price: Option<Price>,
        thumbnail_url: Option<String>,
        is_free: bool,
        published: Option<bool>,
    ) -> Result<Self, CatalogValidationError> {
        let title = required_text(title, "title")?;
        let price = match (price, is_free) {
            (Some(price), _) => price,
            (None, true) => Price::ZERO,
            (None, false) => return Err(CatalogValidationError::MissingPrice),
        };
        Ok(Self {
            title,
            description: optional_text(description),
            price,
            thumbnail_url: optional_text(thumbnail_url),
            is_free,
            published: published.unwrap_or(true),
        })
    }
}

/// Validated fields for a new module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDraft {
    pub title: String,
}

impl ModuleDraft {
    pub fn try_new(title: &str) -> Result<Self, CatalogValidationError> {
        Ok(Self {
            title: required_text(title, "title")?,
        })
    }
}

/// Validated fields for a new lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonDraft {
    pub title: String,
    pub description: Option<String>,
    pub video_id: String,
    pub duration_seconds: i32,
}

impl LessonDraft {
    pub fn try_new(
        title: &str,
        description: Option<String>,
        video_id: &str,
        duration_seconds: i32,
    ) -> Result<Self, CatalogValidationError> {
        let title = required_text(title, "title")?;
        let video_id = required_text(video_id, "videoId")?;
        if duration_seconds < 0 {
            return Err(CatalogValidationError::NegativeDuration);
        }
        Ok(Self {
            title,
            description: optional_text(description),
            video_id,
            duration_seconds,
        })
    }
}

#[cfg(test)]
mod tests;
