//! Declarative shorthands for building messages.

/// Builds a single [`crate::Message`] from a role shorthand.
///
/// ```rust
/// let message = gigachat::gc_msg!(user => "hello");
/// assert_eq!(message.role(), gigachat::Role::User);
/// ```
#[macro_export]
macro_rules! gc_msg {
    (system => $content:expr) => {
        $crate::Message::system($content)
    };
    (user => $content:expr) => {
        $crate::Message::user($content)
    };
    (assistant => $content:expr) => {
        $crate::Message::assistant($content)
    };
}

/// Builds a message vector from role shorthands.
///
/// ```rust
/// let messages = gigachat::gc_messages![
///     system => "You are concise.",
///     user => "Summarize the repo",
/// ];
/// assert_eq!(messages.len(), 2);
/// ```
#[macro_export]
macro_rules! gc_messages {
    ($($role:ident => $content:expr),+ $(,)?) => {
        vec![$($crate::gc_msg!($role => $content)),+]
    };
}
