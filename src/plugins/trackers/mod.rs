// Availability detection over fetched pages
pub mod availability;

pub use availability::{Availability, SizeDetector};
