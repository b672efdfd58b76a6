//! Infrastructure wiring: store + bus + projections + session manager.

use std::convert::Infallible;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use serde_json::Value as JsonValue;
use tokio::sync::broadcast;
use tokio_stream::{StreamExt, wrappers::BroadcastStream};

use campus_auth::{ProfileDirectory, SessionManager, SessionStore};
use campus_catalog::CourseId;
use campus_core::{AggregateId, DomainError, ProfileId};
use campus_enrollment::EnrollmentId;
use campus_events::{EventBus, EventEnvelope, InMemoryEventBus};
use campus_infra::command_dispatcher::{CommandDispatcher, DispatchError};
use campus_infra::event_store::{InMemoryEventStore, StoredEvent};
use campus_infra::projections::{
    AccountReadModel, AccountsProjection, CourseReadModel, CoursesProjection, EnrollmentReadModel,
    EnrollmentsProjection, MaterialReadModel, MaterialsProjection, ScheduleEventReadModel,
    ScheduleProjection,
};
use campus_infra::read_model::InMemoryReadStore;
use campus_infra::session_store::{FileSessionStore, InMemorySessionStore};
use campus_materials::MaterialId;
use campus_scheduling::ScheduleEventId;

use crate::app::notices::NoticeBoard;
use crate::app::seed;

/// Realtime message broadcast via SSE.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RealtimeMessage {
    pub topic: String,
    pub payload: JsonValue,
}

type Bus = InMemoryEventBus<EventEnvelope<JsonValue>>;
type Dispatcher = CommandDispatcher<Arc<InMemoryEventStore>, Arc<Bus>>;
type Store<K, V> = Arc<InMemoryReadStore<K, V>>;

pub struct AppServices {
    dispatcher: Arc<Dispatcher>,
    pub accounts: Arc<AccountsProjection<Store<ProfileId, AccountReadModel>>>,
    pub courses: Arc<CoursesProjection<Store<CourseId, CourseReadModel>>>,
    pub enrollments: Arc<EnrollmentsProjection<Store<EnrollmentId, EnrollmentReadModel>>>,
    pub schedule: Arc<ScheduleProjection<Store<ScheduleEventId, ScheduleEventReadModel>>>,
    pub materials: Arc<MaterialsProjection<Store<MaterialId, MaterialReadModel>>>,
    pub sessions: Arc<SessionManager>,
    pub notices: NoticeBoard,
    realtime_tx: broadcast::Sender<RealtimeMessage>,
}

/// Build and wire all services, seed the demo fixtures, and start the
/// projection subscriber.
///
/// Seed events are applied to the projections synchronously, so read models
/// are fully populated before the first request is served. Runtime mutations
/// remain eventually consistent (projections catch up on a background
/// thread).
pub async fn build_services(state_dir: Option<&Path>) -> Arc<AppServices> {
    let store = Arc::new(InMemoryEventStore::new());
    let bus: Arc<Bus> = Arc::new(InMemoryEventBus::new());
    let dispatcher: Arc<Dispatcher> = Arc::new(CommandDispatcher::new(store, bus.clone()));

    let accounts: Arc<AccountsProjection<_>> =
        Arc::new(AccountsProjection::new(Arc::new(InMemoryReadStore::new())));
    let courses: Arc<CoursesProjection<_>> =
        Arc::new(CoursesProjection::new(Arc::new(InMemoryReadStore::new())));
    let enrollments: Arc<EnrollmentsProjection<_>> =
        Arc::new(EnrollmentsProjection::new(Arc::new(InMemoryReadStore::new())));
    let schedule: Arc<ScheduleProjection<_>> =
        Arc::new(ScheduleProjection::new(Arc::new(InMemoryReadStore::new())));
    let materials: Arc<MaterialsProjection<_>> =
        Arc::new(MaterialsProjection::new(Arc::new(InMemoryReadStore::new())));

    // The session record is persisted under a fixed key in the state
    // directory; without one, sessions live only as long as the process.
    let session_store: Arc<dyn SessionStore> = match state_dir {
        Some(dir) => Arc::new(FileSessionStore::new(dir)),
        None => Arc::new(InMemorySessionStore::new()),
    };
    let directory: Arc<dyn ProfileDirectory> = accounts.clone();
    let sessions = Arc::new(SessionManager::new(session_store, directory));

    // Realtime channel (SSE): lossy broadcast, no backpressure on the
    // command path.
    let (realtime_tx, _realtime_rx) = broadcast::channel::<RealtimeMessage>(256);

    let services = Arc::new(AppServices {
        dispatcher,
        accounts,
        courses,
        enrollments,
        schedule,
        materials,
        sessions,
        notices: NoticeBoard::new(),
        realtime_tx,
    });

    // Seed through the normal command path, draining the bus synchronously
    // so the directory is queryable before login is possible.
    let seed_sub = bus.subscribe();
    seed::seed_demo_data(&services).expect("failed to seed demo data");
    while let Ok(envelope) = seed_sub.try_recv() {
        services.apply_projections(&envelope);
    }
    drop(seed_sub);

    services.sessions.initialize();

    // Background subscriber: bus -> projections (post-seed events only).
    {
        let sub = bus.subscribe();
        let services = services.clone();
        tokio::task::spawn_blocking(move || {
            loop {
                match sub.recv() {
                    Ok(envelope) => {
                        services.apply_projections(&envelope);

                        let _ = services.realtime_tx.send(RealtimeMessage {
                            topic: format!("{}.projection_updated", envelope.aggregate_type()),
                            payload: serde_json::json!({
                                "aggregate_type": envelope.aggregate_type(),
                                "aggregate_id": envelope.aggregate_id().to_string(),
                                "sequence_number": envelope.sequence_number(),
                            }),
                        });
                    }
                    Err(_) => break,
                }
            }
        });
    }

    services
}

impl AppServices {
    pub fn realtime_tx(&self) -> &broadcast::Sender<RealtimeMessage> {
        &self.realtime_tx
    }

    pub fn dispatch<A>(
        &self,
        aggregate_id: AggregateId,
        aggregate_type: &str,
        command: A::Command,
        make_aggregate: impl FnOnce(AggregateId) -> A,
    ) -> Result<Vec<StoredEvent>, DispatchError>
    where
        A: campus_core::Aggregate<Error = DomainError>,
        A::Event: campus_events::Event + serde::Serialize + serde::de::DeserializeOwned,
    {
        self.dispatcher
            .dispatch::<A>(aggregate_id, aggregate_type, command, make_aggregate)
    }

    /// Route an envelope to the projection(s) that consume it.
    fn apply_projections(&self, envelope: &EventEnvelope<JsonValue>) {
        let applied = match envelope.aggregate_type() {
            "auth.account" => self.accounts.apply_envelope(envelope),
            "catalog.course" => self.courses.apply_envelope(envelope),
            "enrollment.enrollment" => self
                .enrollments
                .apply_envelope(envelope)
                // The catalog keeps the per-course enrolled counter.
                .and_then(|()| self.courses.apply_envelope(envelope)),
            "scheduling.event" => self.schedule.apply_envelope(envelope),
            "materials.material" => self.materials.apply_envelope(envelope),
            _ => Ok(()),
        };

        if let Err(e) = applied {
            tracing::warn!("projection apply failed: {e}");
        }
    }
}

/// Build an SSE stream of projection updates (used by `/stream`).
pub fn realtime_sse_stream(
    services: Arc<AppServices>,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = services.realtime_tx().subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(m) => {
            let data = serde_json::to_string(&m.payload).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default().event(m.topic).data(data)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
