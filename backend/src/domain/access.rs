//! Course access resolution.
//!
//! A course is playable by an authenticated user when it is free, when the
//! user holds an enrollment for it, or when the user's role bypasses
//! enrollment. Anonymous callers may browse metadata but never play.

use super::catalog::Course;
use super::user::{Capability, Role};

/// Who is asking, as far as access decisions are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    Authenticated { role: Role, enrolled: bool },
}

/// Outcome of resolving a viewer against a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseAccess {
    /// Lessons may be played (and their video ids disclosed).
    pub can_play: bool,
    /// The viewer holds an enrollment for the course.
    pub is_enrolled: bool,
    /// The course metadata may be shown at all.
    pub can_view: bool,
}

impl CourseAccess {
    /// Resolve access for `viewer` on `course`.
    ///
    /// # Examples
    /// ```
    /// # use chrono::Utc;
    /// # use uuid::Uuid;
    /// use lms_backend::domain::{Course, CourseAccess, Price, Role, Viewer};
    ///
    /// # let now = Utc::now();
    /// let course = Course {
    ///     id: Uuid::new_v4(),
    ///     title: "Free intro".into(),
    ///     description: None,
    ///     price: Price::ZERO,
    ///     thumbnail_url: None,
    ///     is_free: true,
    ///     published: true,
    ///     created_at: now,
    ///     updated_at: now,
    /// };
    /// let student = Viewer::Authenticated { role: Role::Student, enrolled: false };
    /// assert!(CourseAccess::resolve(&course, student).can_play);
    /// assert!(!CourseAccess::resolve(&course, Viewer::Anonymous).can_play);
    /// ```
    pub fn resolve(course: &Course, viewer: Viewer) -> Self {
        match viewer {
            Viewer::Anonymous => Self {
                can_play: false,
                is_enrolled: false,
                can_view: course.published,
            },
            Viewer::Authenticated { role, enrolled } => {
                let bypass = role.can(Capability::BypassEnrollment);
                Self {
                    can_play: bypass || course.is_free || enrolled,
                    is_enrolled: enrolled,
                    can_view: bypass || course.published,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Price;
    use chrono::Utc;
    use rstest::rstest;
    use uuid::Uuid;

    fn course(is_free: bool, published: bool) -> Course {
        let now = Utc::now();
        Course {
            id: Uuid::new_v4(),
            title: "Course".to_owned(),
            description: None,
            price: Price::from_minor_units(150_000).expect("positive"),
            thumbnail_url: None,
            is_free,
            published,
            created_at: now,
            updated_at: now,
        }
    }

    const STUDENT: Viewer = Viewer::Authenticated {
        role: Role::Student,
        enrolled: false,
    };
    const ENROLLED_STUDENT: Viewer = Viewer::Authenticated {
        role: Role::Student,
        enrolled: true,
    };
    const ADMIN: Viewer = Viewer::Authenticated {
        role: Role::Admin,
        enrolled: false,
    };

    #[rstest]
    #[case(true, STUDENT, true)]
    #[case(false, STUDENT, false)]
    #[case(false, ENROLLED_STUDENT, true)]
    #[case(false, ADMIN, true)]
    #[case(true, Viewer::Anonymous, false)]
    #[case(false, Viewer::Anonymous, false)]
    fn playability(#[case] is_free: bool, #[case] viewer: Viewer, #[case] expected: bool) {
        let access = CourseAccess::resolve(&course(is_free, true), viewer);
        assert_eq!(access.can_play, expected);
    }

    #[rstest]
    #[case(Viewer::Anonymous, false)]
    #[case(STUDENT, false)]
    #[case(ENROLLED_STUDENT, false)]
    #[case(ADMIN, true)]
    fn unpublished_courses_are_visible_to_admins_only(
        #[case] viewer: Viewer,
        #[case] expected: bool,
    ) {
        let access = CourseAccess::resolve(&course(false, false), viewer);
        assert_eq!(access.can_view, expected);
    }

    #[rstest]
    fn enrollment_flag_is_reported_independently_of_price() {
        let access = CourseAccess::resolve(&course(true, true), ENROLLED_STUDENT);
        assert!(access.is_enrolled);
        assert!(access.can_play);
    }
}
