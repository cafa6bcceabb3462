mod crew_fallback;
mod media_cleanup;
mod notify_operator;
mod outbound_reply;
mod process_media;

pub use crew_fallback::CrewFallbackHandler;
pub use media_cleanup::MediaCleanupHandler;
pub use notify_operator::NotifyOperatorHandler;
pub use outbound_reply::OutboundReplyHandler;
pub use process_media::ProcessMediaHandler;

use movebot_channels::ChannelError;
use movebot_queue::HandlerError;

/// Map a channel failure onto the queue's retry policy.
pub(crate) fn channel_error(e: ChannelError) -> HandlerError {
    if e.is_retryable() {
        HandlerError::transient(e)
    } else {
        HandlerError::permanent(e)
    }
}
