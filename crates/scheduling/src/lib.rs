//! Calendar/scheduling domain module (event-sourced).

pub mod event;

pub use event::{
    CancelScheduleEvent, CreateScheduleEvent, ScheduleEvent, ScheduleEventCancelled,
    ScheduleEventCommand, ScheduleEventCreated, ScheduleEventEvent, ScheduleEventId,
    ScheduleEventKind,
};
