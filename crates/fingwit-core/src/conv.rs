//! User-facing message channel

/// Channel for messages shown to the authenticating user
///
/// Hosts decide how the text is delivered: a PAM conversation, stderr, a
/// greeter surface. Diagnostics belong in the log, not here.
pub trait Conversation: Send + Sync {
    /// Show an informational prompt
    fn info(&self, message: &str);

    /// Show an error or failure message
    fn error(&self, message: &str);
}
