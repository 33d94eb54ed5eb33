use thiserror::Error;

/// Internal issues with the codebase indicating unexpected behavior & possible bugs
#[derive(Error, Debug)]
pub enum InternalError {
    /// A reply call was made that the current reply state doesn't allow.
    ///
    /// Indicates a command handler acknowledged an interaction twice, which the
    /// platform rejects.
    #[error("Cannot {action} an interaction that is already {state}")]
    InvalidReplyTransition {
        /// The reply call that was attempted
        action: &'static str,
        /// The reply state at the time of the call
        state: &'static str,
    },
}
