pub mod botapi;
pub mod error;
pub mod fetch;
pub mod sender;
pub mod types;

pub use botapi::BotApiSender;
pub use error::ChannelError;
pub use fetch::{HttpMediaFetcher, MediaFetcher};
pub use sender::{ChannelSender, SenderRegistry};
pub use types::OutboundMessage;
