//! Demo fixtures, seeded through the normal command path.
//!
//! Fixture emails are stable (`admin@example.com`, `student@example.com`, …)
//! so the login scenarios work out of the box.

use chrono::{Duration, Utc};

use campus_auth::{
    Account, AccountCommand, DeactivateAccount, RegisterAccount, Role,
};
use campus_catalog::{
    AddLesson, AddModule, Course, CourseCommand, CourseId, CourseLevel, CreateCourse, LessonId,
    LessonKind, ModuleId, PublishCourse,
};
use campus_core::{AggregateId, ProfileId};
use campus_enrollment::{Enroll, Enrollment, EnrollmentCommand, EnrollmentId, RecordProgress};
use campus_infra::command_dispatcher::DispatchError;
use campus_materials::{Material, MaterialCommand, MaterialId, UploadMaterial};
use campus_scheduling::{
    CreateScheduleEvent, ScheduleEvent, ScheduleEventCommand, ScheduleEventId, ScheduleEventKind,
};

use crate::app::services::AppServices;

fn dispatch_err(e: DispatchError) -> anyhow::Error {
    anyhow::anyhow!("seed dispatch failed: {e:?}")
}

pub fn seed_demo_data(services: &AppServices) -> anyhow::Result<()> {
    let admin = register(services, "admin@example.com", "Admin User", Role::Admin, true)?;
    let student = register(services, "student@example.com", "Student User", Role::Student, true)?;
    let maria = register(
        services,
        "maria.gonzalez@example.com",
        "Maria Gonzalez",
        Role::Instructor,
        true,
    )?;
    let carlos = register(
        services,
        "carlos.rodriguez@example.com",
        "Carlos Rodriguez",
        Role::Instructor,
        true,
    )?;
    // One deactivated student so the status filter has something to show.
    register(
        services,
        "lucia.fernandez@example.com",
        "Lucia Fernandez",
        Role::Student,
        false,
    )?;
    let _ = admin;

    let (web, web_modules) = seed_course(
        services,
        maria,
        "Maria Gonzalez",
        "Introduction to Web Programming",
        "Learn the fundamentals of HTML, CSS and JavaScript to build interactive sites.",
        CourseLevel::Beginner,
        6,
        &[
            (
                "HTML Fundamentals",
                &[
                    ("Basic HTML structure", LessonKind::Video, Some(10), "https://example.com/video1.mp4"),
                    ("Semantic tags", LessonKind::Document, None, "Document content about semantic tags."),
                ][..],
            ),
            (
                "Basic CSS",
                &[("Selectors and properties", LessonKind::Video, Some(12), "https://example.com/video2.mp4")][..],
            ),
        ],
        true,
    )?;

    let (ux, _) = seed_course(
        services,
        carlos,
        "Carlos Rodriguez",
        "Advanced UX/UI Design",
        "Learn to build intuitive interfaces and outstanding user experiences.",
        CourseLevel::Advanced,
        8,
        &[(
            "UX Design Principles",
            &[("User research", LessonKind::Video, Some(15), "https://example.com/video3.mp4")][..],
        )],
        true,
    )?;

    let (marketing, _) = seed_course(
        services,
        maria,
        "Maria Gonzalez",
        "Digital Marketing",
        "Effective strategies to promote your business in the digital world.",
        CourseLevel::Intermediate,
        4,
        &[(
            "Basic SEO",
            &[("On-page optimization", LessonKind::Document, None, "Content about on-page optimization.")][..],
        )],
        true,
    )?;

    // Draft course: stays unpublished so students never see it.
    seed_course(
        services,
        carlos,
        "Carlos Rodriguez",
        "Mobile App Development",
        "Build native apps for iOS and Android with cross-platform tooling.",
        CourseLevel::Advanced,
        10,
        &[(
            "Framework Fundamentals",
            &[("Core components", LessonKind::Video, Some(18), "https://example.com/video4.mp4")][..],
        )],
        false,
    )?;

    enroll(services, student, web, 45)?;
    enroll(services, student, marketing, 20)?;

    seed_event(services, web, "Final project due", ScheduleEventKind::Deadline, 9, None)?;
    seed_event(
        services,
        web,
        "Live class: Advanced JavaScript",
        ScheduleEventKind::LiveClass,
        12,
        Some(90),
    )?;
    seed_event(services, ux, "Webinar: UX/UI trends", ScheduleEventKind::Webinar, 16, Some(60))?;
    seed_event(services, web, "Quiz: HTML fundamentals", ScheduleEventKind::Quiz, 19, None)?;

    seed_material(
        services,
        maria,
        web,
        web_modules[0],
        "Lecture slides",
        "Week one slides.",
        "slides-week-1.pdf",
    )?;
    seed_material(
        services,
        maria,
        web,
        web_modules[0],
        "Reading list",
        "Recommended articles for the first module.",
        "reading-list.pdf",
    )?;

    tracing::info!("seeded demo fixtures");
    Ok(())
}

fn register(
    services: &AppServices,
    email: &str,
    display_name: &str,
    role: Role,
    active: bool,
) -> anyhow::Result<ProfileId> {
    let profile_id = ProfileId::new();
    let aggregate_id = AggregateId::from(profile_id);

    services
        .dispatch::<Account>(
            aggregate_id,
            "auth.account",
            AccountCommand::Register(RegisterAccount {
                profile_id,
                email: email.to_string(),
                display_name: display_name.to_string(),
                role,
                avatar_url: None,
                occurred_at: Utc::now(),
            }),
            |id| Account::empty(ProfileId::from(id)),
        )
        .map_err(dispatch_err)?;

    if !active {
        services
            .dispatch::<Account>(
                aggregate_id,
                "auth.account",
                AccountCommand::Deactivate(DeactivateAccount {
                    profile_id,
                    occurred_at: Utc::now(),
                }),
                |id| Account::empty(ProfileId::from(id)),
            )
            .map_err(dispatch_err)?;
    }

    Ok(profile_id)
}

type LessonSpec<'a> = (&'a str, LessonKind, Option<u32>, &'a str);

#[allow(clippy::too_many_arguments)]
fn seed_course(
    services: &AppServices,
    instructor_id: ProfileId,
    instructor_name: &str,
    title: &str,
    description: &str,
    level: CourseLevel,
    duration_weeks: u32,
    modules: &[(&str, &[LessonSpec<'_>])],
    publish: bool,
) -> anyhow::Result<(CourseId, Vec<ModuleId>)> {
    let aggregate_id = AggregateId::new();
    let course_id = CourseId::new(aggregate_id);
    let mut module_ids = Vec::with_capacity(modules.len());

    services
        .dispatch::<Course>(
            aggregate_id,
            "catalog.course",
            CourseCommand::Create(CreateCourse {
                course_id,
                title: title.to_string(),
                description: description.to_string(),
                instructor_id,
                instructor_name: instructor_name.to_string(),
                level,
                duration_weeks,
                occurred_at: Utc::now(),
            }),
            |id| Course::empty(CourseId::new(id)),
        )
        .map_err(dispatch_err)?;

    for (module_title, lessons) in modules {
        let module_id = ModuleId::new();
        module_ids.push(module_id);
        services
            .dispatch::<Course>(
                aggregate_id,
                "catalog.course",
                CourseCommand::AddModule(AddModule {
                    course_id,
                    module_id,
                    title: module_title.to_string(),
                    occurred_at: Utc::now(),
                }),
                |id| Course::empty(CourseId::new(id)),
            )
            .map_err(dispatch_err)?;

        for (lesson_title, kind, duration_minutes, content) in *lessons {
            services
                .dispatch::<Course>(
                    aggregate_id,
                    "catalog.course",
                    CourseCommand::AddLesson(AddLesson {
                        course_id,
                        module_id,
                        lesson_id: LessonId::new(),
                        title: lesson_title.to_string(),
                        kind: *kind,
                        duration_minutes: *duration_minutes,
                        content: content.to_string(),
                        occurred_at: Utc::now(),
                    }),
                    |id| Course::empty(CourseId::new(id)),
                )
                .map_err(dispatch_err)?;
        }
    }

    if publish {
        services
            .dispatch::<Course>(
                aggregate_id,
                "catalog.course",
                CourseCommand::Publish(PublishCourse {
                    course_id,
                    occurred_at: Utc::now(),
                }),
                |id| Course::empty(CourseId::new(id)),
            )
            .map_err(dispatch_err)?;
    }

    Ok((course_id, module_ids))
}

fn enroll(
    services: &AppServices,
    student_id: ProfileId,
    course_id: CourseId,
    progress: u8,
) -> anyhow::Result<()> {
    let aggregate_id = AggregateId::new();
    let enrollment_id = EnrollmentId::new(aggregate_id);

    services
        .dispatch::<Enrollment>(
            aggregate_id,
            "enrollment.enrollment",
            EnrollmentCommand::Enroll(Enroll {
                enrollment_id,
                student_id,
                course_id,
                occurred_at: Utc::now() - Duration::days(30),
            }),
            |id| Enrollment::empty(EnrollmentId::new(id)),
        )
        .map_err(dispatch_err)?;

    if progress > 0 {
        services
            .dispatch::<Enrollment>(
                aggregate_id,
                "enrollment.enrollment",
                EnrollmentCommand::RecordProgress(RecordProgress {
                    enrollment_id,
                    progress,
                    occurred_at: Utc::now() - Duration::days(7),
                }),
                |id| Enrollment::empty(EnrollmentId::new(id)),
            )
            .map_err(dispatch_err)?;
    }

    Ok(())
}

fn seed_event(
    services: &AppServices,
    course_id: CourseId,
    title: &str,
    kind: ScheduleEventKind,
    in_days: i64,
    duration_minutes: Option<u32>,
) -> anyhow::Result<()> {
    let aggregate_id = AggregateId::new();

    services
        .dispatch::<ScheduleEvent>(
            aggregate_id,
            "scheduling.event",
            ScheduleEventCommand::Create(CreateScheduleEvent {
                event_id: ScheduleEventId::new(aggregate_id),
                course_id,
                title: title.to_string(),
                kind,
                starts_at: Utc::now() + Duration::days(in_days),
                duration_minutes,
                occurred_at: Utc::now(),
            }),
            |id| ScheduleEvent::empty(ScheduleEventId::new(id)),
        )
        .map_err(dispatch_err)?;

    Ok(())
}

fn seed_material(
    services: &AppServices,
    uploaded_by: ProfileId,
    course_id: CourseId,
    module_id: ModuleId,
    title: &str,
    description: &str,
    file_name: &str,
) -> anyhow::Result<()> {
    let aggregate_id = AggregateId::new();

    services
        .dispatch::<Material>(
            aggregate_id,
            "materials.material",
            MaterialCommand::Upload(UploadMaterial {
                material_id: MaterialId::new(aggregate_id),
                course_id,
                module_id,
                lesson_id: None,
                title: title.to_string(),
                description: description.to_string(),
                kind: LessonKind::Document,
                file_name: file_name.to_string(),
                uploaded_by,
                occurred_at: Utc::now(),
            }),
            |id| Material::empty(MaterialId::new(id)),
        )
        .map_err(dispatch_err)?;

    Ok(())
}
