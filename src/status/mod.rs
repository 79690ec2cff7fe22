//! Message status model and the status poller.

mod poller;
mod types;


pub use poller::{StatusPoller, StatusSource, WaitOptions};
pub use types::{MessageStatus, StatusResponse, StatusTarget};
