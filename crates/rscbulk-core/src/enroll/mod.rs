// ── Enrollment stages ──
//
// prepare -> initiate -> aggregate codes -> monitor. Each stage works on
// `Enrollment` records owned by the caller.

pub mod initiate;
pub mod monitor;
pub mod prepare;
pub mod verify;

pub use initiate::{Initiation, enroll_all, initiate};
pub use monitor::{MonitorOutcome, monitor};
pub use prepare::prepare;
pub use verify::{aggregate_codes, verification_link};
