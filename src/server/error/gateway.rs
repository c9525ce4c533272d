use thiserror::Error;

/// Failures talking to the chat gateway while delivering notifications or
/// registering commands.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// No text channel in the guild accepts messages from the bot.
    #[error("No postable channel in guild {0}")]
    ChannelNotPostable(String),

    /// Outbound request did not complete within the dispatch timeout.
    #[error("Gateway request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Discord API error from Serenity.
    ///
    /// Boxed because `serenity::Error` is large.
    #[error(transparent)]
    Discord(#[from] Box<serenity::Error>),
}

impl From<serenity::Error> for GatewayError {
    fn from(err: serenity::Error) -> Self {
        GatewayError::Discord(Box::new(err))
    }
}
