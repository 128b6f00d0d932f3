//! Opaque identifiers for stored records.

/// Fresh random id, used for events and exams alike.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
