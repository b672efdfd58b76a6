//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values; two
/// value objects with the same values are the same value. Entities, in
/// contrast, are the same only when their identifiers match.
///
/// The trait requires `Clone + PartialEq + Debug` so values can be copied,
/// compared, and logged like primitives.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
