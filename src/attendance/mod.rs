pub mod error;
pub mod policy;
pub mod service;

pub use error::AttendanceError;
pub use policy::AttendancePolicy;
pub use service::{AttendanceService, PunchIn, PunchOut};
