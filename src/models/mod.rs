pub mod message;
pub mod page;
pub mod timestamp;

pub use message::{Message, Role};
pub use page::{MessagePage, NotificationBatch, OutgoingMessage};
pub use timestamp::Timestamp;
