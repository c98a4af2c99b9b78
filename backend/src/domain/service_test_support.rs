//! Shared builders for domain service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use uuid::Uuid;

use crate::domain::{
    Course, CourseOutline, Email, Lesson, Module, ModuleOutline, Price, Role, User, UserId,
    UserName,
};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

pub(crate) fn user_with_role(role: Role) -> User {
    let (name, email) = match role {
        Role::Student => ("Aluno Teste", "aluno@teste.com"),
        Role::Admin => ("Admin Teste", "admin@teste.com"),
    };
    User::new(
        UserId::random(),
        UserName::new(name).expect("fixture name"),
        Email::new(email).expect("fixture email"),
        role,
    )
}

pub(crate) fn course(is_free: bool, published: bool) -> Course {
    Course {
        id: Uuid::new_v4(),
        title: "Excel do zero".to_owned(),
        description: Some("Planilhas para o dia a dia".to_owned()),
        price: if is_free {
            Price::ZERO
        } else {
            "1500".parse().expect("fixture price")
        },
        thumbnail_url: None,
        is_free,
        published,
        created_at: fixture_timestamp(),
        updated_at: fixture_timestamp(),
    }
}

/// An outline with one module per entry in `lessons_per_module`.
pub(crate) fn outline(course: Course, lessons_per_module: &[i32]) -> CourseOutline {
    let modules = lessons_per_module
        .iter()
        .zip(1..)
        .map(|(count, position)| {
            let module = Module {
                id: Uuid::new_v4(),
                course_id: course.id,
                title: format!("Módulo {position}"),
                position,
            };
            let lessons = (1..=*count)
                .map(|lesson_position| Lesson {
                    id: Uuid::new_v4(),
                    module_id: module.id,
                    title: format!("Aula {lesson_position}"),
                    description: None,
                    video_id: format!("vimeo-{position}-{lesson_position}"),
                    duration_seconds: 600,
                    position: lesson_position,
                })
                .collect();
            ModuleOutline { module, lessons }
        })
        .collect();
    CourseOutline { course, modules }
}
