pub mod enrollment;
pub mod entry;
pub mod state;

pub use enrollment::Enrollment;
pub use entry::{DeviceEntry, NetworkSettings};
pub use state::{BindStatus, MonitorHandle, TaskState};
