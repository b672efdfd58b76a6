//! Benchmarks for the command dispatch pipeline (load → rehydrate → decide →
//! append → publish).

use std::sync::Arc;

use chrono::Utc;
use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::Value as JsonValue;

use campus_catalog::CourseId;
use campus_core::{AggregateId, ProfileId};
use campus_enrollment::{Enroll, Enrollment, EnrollmentCommand, EnrollmentId, RecordProgress};
use campus_events::{EventEnvelope, InMemoryEventBus};
use campus_infra::command_dispatcher::CommandDispatcher;
use campus_infra::event_store::InMemoryEventStore;

type Bus = InMemoryEventBus<EventEnvelope<JsonValue>>;

fn dispatcher() -> CommandDispatcher<Arc<InMemoryEventStore>, Arc<Bus>> {
    CommandDispatcher::new(Arc::new(InMemoryEventStore::new()), Arc::new(InMemoryEventBus::new()))
}

fn enroll(dispatcher: &CommandDispatcher<Arc<InMemoryEventStore>, Arc<Bus>>) -> AggregateId {
    let aggregate_id = AggregateId::new();
    dispatcher
        .dispatch::<Enrollment>(
            aggregate_id,
            "enrollment.enrollment",
            EnrollmentCommand::Enroll(Enroll {
                enrollment_id: EnrollmentId::new(aggregate_id),
                student_id: ProfileId::new(),
                course_id: CourseId::new(AggregateId::new()),
                occurred_at: Utc::now(),
            }),
            |id| Enrollment::empty(EnrollmentId::new(id)),
        )
        .unwrap();
    aggregate_id
}

fn bench_enroll(c: &mut Criterion) {
    let dispatcher = dispatcher();

    c.bench_function("dispatch_enroll_fresh_stream", |b| {
        b.iter(|| enroll(&dispatcher));
    });
}

fn bench_progress_on_long_stream(c: &mut Criterion) {
    let dispatcher = dispatcher();
    let aggregate_id = enroll(&dispatcher);

    // Grow the stream so rehydration has real work to do.
    for i in 0..100u8 {
        dispatcher
            .dispatch::<Enrollment>(
                aggregate_id,
                "enrollment.enrollment",
                EnrollmentCommand::RecordProgress(RecordProgress {
                    enrollment_id: EnrollmentId::new(aggregate_id),
                    progress: i,
                    occurred_at: Utc::now(),
                }),
                |id| Enrollment::empty(EnrollmentId::new(id)),
            )
            .unwrap();
    }

    c.bench_function("dispatch_progress_rehydrating_100_events", |b| {
        b.iter(|| {
            dispatcher
                .dispatch::<Enrollment>(
                    aggregate_id,
                    "enrollment.enrollment",
                    EnrollmentCommand::RecordProgress(RecordProgress {
                        enrollment_id: EnrollmentId::new(aggregate_id),
                        progress: 50,
                        occurred_at: Utc::now(),
                    }),
                    |id| Enrollment::empty(EnrollmentId::new(id)),
                )
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_enroll, bench_progress_on_long_stream);
criterion_main!(benches);
