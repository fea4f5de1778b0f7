pub mod traits;
pub mod trackers;
pub mod notifiers;

pub use notifiers::select_notifier;
pub use traits::{Notifier, PageSource};
