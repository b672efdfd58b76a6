use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;

use campus_auth::Role;
use campus_core::AggregateId;
use campus_infra::projections::ScheduleEventReadModel;
use campus_scheduling::{
    CreateScheduleEvent, ScheduleEvent, ScheduleEventCommand, ScheduleEventId,
};

use crate::app::routes::courses::parse_course_id;
use crate::app::routes::staff_only;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::SessionContext;

pub fn router() -> Router {
    staff_only(Router::new().route("/", get(list_events).post(create_event)))
}

/// `GET /calendar` — full calendar (admin) or own courses (instructor).
pub async fn list_events(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Query(query): Query<dto::CalendarQuery>,
) -> axum::response::Response {
    let events = services.schedule.list_between(query.from, query.to);

    let events: Vec<_> = match ctx.role() {
        Role::Admin => events,
        Role::Instructor => {
            let own: HashSet<_> = services
                .courses
                .list()
                .into_iter()
                .filter(|c| c.instructor_id == ctx.profile_id())
                .map(|c| c.course_id)
                .collect();
            events.into_iter().filter(|e| own.contains(&e.course_id)).collect()
        }
        Role::Student => return errors::forbidden_response(),
    };

    (StatusCode::OK, Json(events_collection(&services, events))).into_response()
}

/// `GET /my-calendar` — events for the session's enrolled courses.
pub async fn my_calendar(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Query(query): Query<dto::CalendarQuery>,
) -> axum::response::Response {
    let events = services.schedule.list_between(query.from, query.to);

    let visible: Vec<_> = match ctx.role() {
        Role::Admin => events,
        Role::Instructor => {
            let own: HashSet<_> = services
                .courses
                .list()
                .into_iter()
                .filter(|c| c.instructor_id == ctx.profile_id())
                .map(|c| c.course_id)
                .collect();
            events.into_iter().filter(|e| own.contains(&e.course_id)).collect()
        }
        Role::Student => {
            let enrolled: HashSet<_> = services
                .enrollments
                .list_for_student(ctx.profile_id())
                .into_iter()
                .map(|e| e.course_id)
                .collect();
            events
                .into_iter()
                .filter(|e| enrolled.contains(&e.course_id))
                .collect()
        }
    };

    (StatusCode::OK, Json(events_collection(&services, visible))).into_response()
}

/// `POST /calendar`.
pub async fn create_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Json(body): Json<dto::CreateScheduleEventRequest>,
) -> axum::response::Response {
    let course_id = match parse_course_id(&body.course_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let Some(course) = services.courses.get(&course_id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "course not found");
    };

    let allowed = match ctx.role() {
        Role::Admin => true,
        Role::Instructor => course.instructor_id == ctx.profile_id(),
        Role::Student => false,
    };
    if !allowed {
        return errors::forbidden_response();
    }

    let kind = match errors::parse_event_kind(&body.kind) {
        Ok(kind) => kind,
        Err(resp) => return resp,
    };

    let aggregate_id = AggregateId::new();

    let cmd = ScheduleEventCommand::Create(CreateScheduleEvent {
        event_id: ScheduleEventId::new(aggregate_id),
        course_id,
        title: body.title,
        kind,
        starts_at: body.starts_at,
        duration_minutes: body.duration_minutes,
        occurred_at: Utc::now(),
    });

    match services.dispatch::<ScheduleEvent>(aggregate_id, "scheduling.event", cmd, |id| {
        ScheduleEvent::empty(ScheduleEventId::new(id))
    }) {
        Ok(_) => {
            services
                .notices
                .push_info(ctx.profile_id(), "Event scheduled", None);
            (
                StatusCode::CREATED,
                Json(serde_json::json!({"id": aggregate_id.to_string()})),
            )
                .into_response()
        }
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

/// Attach course titles so calendar entries render without extra lookups.
fn events_collection(
    services: &AppServices,
    events: Vec<ScheduleEventReadModel>,
) -> serde_json::Value {
    let titles: HashMap<_, _> = services
        .courses
        .list()
        .into_iter()
        .map(|c| (c.course_id, c.title))
        .collect();

    let items = events
        .iter()
        .map(|e| {
            let mut value = dto::schedule_event_to_json(e);
            value["course_title"] = titles
                .get(&e.course_id)
                .cloned()
                .map(serde_json::Value::String)
                .unwrap_or(serde_json::Value::Null);
            value
        })
        .collect();

    dto::collection(items)
}
