pub mod interpret;
pub mod jitter;
pub mod portal;

pub use jitter::Jitter;
pub use portal::PortalAdapter;
