pub mod domain;
pub mod ports;

pub use domain::{is_numeric_code, CheckInKind, CheckInResult, CheckInStatus, Course};
pub use ports::{PortError, PortResult, PortalService};
