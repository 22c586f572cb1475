//! Instrumentation wrappers.
//!
//! - [`FaultTolerant`] isolates per-row failures: they are recorded in the
//!   error ledger and replaced by a fallback value.
//! - [`Tracked`] wraps a whole transformation: it updates lineage and the
//!   transformation log on success, and records a global error before
//!   re-raising on failure.
//!
//! The two compose: a tracked transformation may apply fault-tolerant row
//! functions internally, and only failures escaping that isolation reach the
//! tracked wrapper.

mod fault_tolerant;
mod tracked;

pub use fault_tolerant::FaultTolerant;
pub use tracked::Tracked;
