use serde::{Deserialize, Serialize};
use std::fmt;

/// A message in a conversation, containing a role and text content.
///
/// Messages are the unit of exchange inside a workflow: the caller submits
/// one, every node consumes and produces them, and terminal nodes deposit
/// them into the run's results.
///
/// # Examples
///
/// ```
/// use heddle::message::Message;
///
/// let user_msg = Message::user("What is the weather?");
/// let assistant_msg = Message::assistant("It's sunny today!");
/// let system_msg = Message::system("You are a helpful assistant.");
///
/// assert!(user_msg.has_role(Message::USER));
/// ```
///
/// Messages implement `Serialize`/`Deserialize`:
///
/// ```
/// use heddle::message::Message;
///
/// let msg = Message::user("test");
/// let json = serde_json::to_string(&msg).unwrap();
/// let parsed: Message = serde_json::from_str(&json).unwrap();
/// assert_eq!(msg, parsed);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender (e.g., "user", "assistant", "system").
    pub role: String,
    /// The text content of the message.
    pub content: String,
}

/// Well-known message roles, with an escape hatch for custom ones.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
    System,
    Other(String),
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => Message::USER,
            Role::Assistant => Message::ASSISTANT,
            Role::System => Message::SYSTEM,
            Role::Other(s) => s,
        }
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s {
            Message::USER => Role::User,
            Message::ASSISTANT => Role::Assistant,
            Message::SYSTEM => Role::System,
            other => Role::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Message {
    /// User input message role.
    pub const USER: &'static str = "user";
    /// AI assistant response message role.
    pub const ASSISTANT: &'static str = "assistant";
    /// System prompt or instruction message role.
    pub const SYSTEM: &'static str = "system";

    /// Creates a new message with the specified role and content.
    #[must_use]
    pub fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
        }
    }

    /// Creates a message with a typed [`Role`].
    #[must_use]
    pub fn with_role(role: Role, content: &str) -> Self {
        Self::new(role.as_str(), content)
    }

    /// Creates a user message with the specified content.
    #[must_use]
    pub fn user(content: &str) -> Self {
        Self::new(Self::USER, content)
    }

    /// Creates an assistant message with the specified content.
    #[must_use]
    pub fn assistant(content: &str) -> Self {
        Self::new(Self::ASSISTANT, content)
    }

    /// Creates a system message with the specified content.
    #[must_use]
    pub fn system(content: &str) -> Self {
        Self::new(Self::SYSTEM, content)
    }

    /// Returns true if this message has the specified role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_construction() {
        let msg = Message::new("user", "hello");
        assert_eq!(msg.role, "user");
        assert_eq!(msg.content, "hello");
    }

    #[test]
    fn test_convenience_constructors() {
        assert!(Message::user("a").has_role(Message::USER));
        assert!(Message::assistant("b").has_role(Message::ASSISTANT));
        assert!(Message::system("c").has_role(Message::SYSTEM));
    }

    #[test]
    fn test_role_roundtrip() {
        assert_eq!(Role::from("user"), Role::User);
        assert_eq!(Role::from("assistant"), Role::Assistant);
        assert_eq!(Role::from("tool").as_str(), "tool");
        assert_eq!(
            Message::with_role(Role::Other("tool".into()), "x").role,
            "tool"
        );
    }

    #[test]
    fn test_serde_roundtrip() {
        let msg = Message::assistant("All done.");
        let ser = serde_json::to_string(&msg).expect("serialize");
        let de: Message = serde_json::from_str(&ser).expect("deserialize");
        assert_eq!(de, msg);
    }
}
