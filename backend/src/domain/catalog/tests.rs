//! Tests for catalog values and authoring validation.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};
use serde_json::json;

#[rstest]
#[case("1500", 150_000)]
#[case("1500.5", 150_050)]
#[case("1500.50", 150_050)]
#[case("0.99", 99)]
#[case("  42.10 ", 4_210)]
#[case("7.500", 750)]
#[case("0", 0)]
fn parses_decimal_prices(#[case] raw: &str, #[case] minor: i64) {
    let price: Price = raw.parse().expect("valid price");
    assert_eq!(price.minor_units(), minor);
}

#[rstest]
#[case("")]
#[case("-1")]
#[case("1.234")]
#[case("abc")]
#[case(".50")]
#[case("1e3")]
#[case("99999999999999999999")]
fn rejects_malformed_prices(#[case] raw: &str) {
    assert_eq!(raw.parse::<Price>(), Err(CatalogValidationError::InvalidPrice));
}

#[rstest]
fn prices_render_with_two_decimals() {
    assert_eq!(Price::ZERO.to_string(), "0.00");
    assert_eq!(
        Price::from_minor_units(150_005).expect("positive").to_string(),
        "1500.05"
    );
}

#[rstest]
fn prices_deserialise_from_numbers_and_strings() {
    let from_number: Price = serde_json::from_value(json!(1500.5)).expect("number");
    let from_integer: Price = serde_json::from_value(json!(200)).expect("integer");
    let from_text: Price = serde_json::from_value(json!("1500.50")).expect("text");
    assert_eq!(from_number, from_text);
    assert_eq!(from_integer.minor_units(), 20_000);
    assert_eq!(serde_json::to_value(from_text).expect("serialise"), json!("1500.50"));
}

#[rstest]
fn negative_numbers_fail_to_deserialise() {
    assert!(serde_json::from_value::<Price>(json!(-3)).is_err());
}

#[fixture]
fn paid_course() -> Course {
    let now = Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).single().expect("valid timestamp");
    Course {
        id: Uuid::new_v4(),
        title: "Rust para iniciantes".to_owned(),
        description: None,
        price: "1500".parse().expect("price"),
        thumbnail_url: None,
        is_free: false,
        published: true,
        created_at: now,
        updated_at: now,
    }
}

#[rstest]
fn free_courses_charge_nothing_regardless_of_stored_price(paid_course: Course) {
    assert_eq!(paid_course.effective_price().minor_units(), 150_000);
    let free = Course {
        is_free: true,
        ..paid_course
    };
    assert_eq!(free.effective_price(), Price::ZERO);
}

#[rstest]
fn paid_course_drafts_require_a_price() {
    let result = CourseDraft::try_new("Curso", None, None, None, false, None);
    assert_eq!(result, Err(CatalogValidationError::MissingPrice));
}

#[rstest]
fn free_course_drafts_default_price_and_publish() {
    let draft = CourseDraft::try_new("  Curso grátis ", Some("  ".to_owned()), None, None, true, None)
        .expect("free course without price");
    assert_eq!(draft.title, "Curso grátis");
    assert_eq!(draft.price, Price::ZERO);
    assert!(draft.published);
    assert!(draft.description.is_none());
}

#[rstest]
fn course_drafts_respect_explicit_publish_flag() {
    let draft = CourseDraft::try_new("Curso", None, Some(Price::ZERO), None, false, Some(false))
        .expect("valid draft");
    assert!(!draft.published);
}

#[rstest]
#[case("", "vimeo-1", 60, "title")]
#[case("Aula 1", " ", 60, "videoId")]
#[case("Aula 1", "vimeo-1", -1, "durationSeconds")]
fn lesson_drafts_validate_fields(
    #[case] title: &str,
    #[case] video_id: &str,
    #[case] duration: i32,
    #[case] field: &str,
) {
    let err = LessonDraft::try_new(title, None, video_id, duration).expect_err("invalid lesson");
    assert_eq!(err.field(), field);
}

#[rstest]
fn module_drafts_require_a_title() {
    assert_eq!(
        ModuleDraft::try_new("   "),
        Err(CatalogValidationError::EmptyField { field: "title" })
    );
}

#[rstest]
#[case(None, 1)]
#[case(Some(1), 2)]
#[case(Some(7), 8)]
fn next_position_appends_after_the_maximum(#[case] max: Option<i32>, #[case] expected: i32) {
    assert_eq!(next_position(max), expected);
}

#[rstest]
fn sorted_outlines_keep_gaps(paid_course: Course) {
    let course_id = paid_course.id;
    let module = |position: i32| Module {
        id: Uuid::new_v4(),
        course_id,
        title: format!("Módulo {position}"),
        position,
    };
    let lesson = |module_id: Uuid, position: i32| Lesson {
        id: Uuid::new_v4(),
        module_id,
        title: format!("Aula {position}"),
        description: None,
        video_id: format!("video-{position}"),
        duration_seconds: 300,
        position,
    };
    let second = module(3);
    let first = module(1);
    let outline = CourseOutline {
        course: paid_course,
        modules: vec![
            ModuleOutline {
                lessons: vec![lesson(second.id, 4), lesson(second.id, 2)],
                module: second,
            },
            ModuleOutline {
                lessons: vec![lesson(first.id, 1)],
                module: first,
            },
        ],
    }
    .sorted();

    let positions: Vec<(i32, i32)> = outline
        .modules
        .iter()
        .flat_map(|m| m.lessons.iter().map(|l| (m.module.position, l.position)))
        .collect();
    assert_eq!(positions, vec![(1, 1), (3, 2), (3, 4)]);
    assert_eq!(outline.lessons().count(), 3);
}
