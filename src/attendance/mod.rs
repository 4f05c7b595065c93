//! Attendance status derivation: zone-aware time extraction, the action
//! classifier with its lateness rule, and the monthly calendar builder.

pub mod calendar;
pub mod classify;
pub mod clock;
