pub mod source;
pub mod notifier;

pub use source::{PageSource, FetchStrategy, SizeStatus};
pub use notifier::{Notifier, StockAlert, NotificationReceipt, Transport};
