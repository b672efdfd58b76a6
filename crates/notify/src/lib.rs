//! `campus-notify` — transient UI feedback.
//!
//! A small queue of notices with at most one visible at a time. Dismissed
//! notices linger (closed) until a removal deadline passes, so a reader can
//! still observe the dismissal before the record disappears.

pub mod queue;

pub use queue::{Notice, NoticeId, NoticeKind, NoticeQueue, REMOVE_DELAY_SECS, VISIBLE_LIMIT};
