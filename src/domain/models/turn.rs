use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Author category of a conversation turn, as accepted by the remote model.
///
/// Only the exact label `"user"` maps to [`Role::User`]. Every other label
/// (`"assistant"`, `"bot"`, `""`, `null`, a missing field) is coerced to
/// [`Role::Model`] rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    User,
    #[default]
    Model,
}

impl Role {
    pub fn from_label(label: &str) -> Self {
        if label == "user" {
            Self::User
        } else {
            Self::Model
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label.as_deref().map(Role::from_label).unwrap_or_default())
    }
}

/// One entry in a conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    #[serde(default)]
    role: Role,
    #[serde(alias = "parts")]
    text: String,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text)
    }

    /// Build a turn from a free-form role label, applying [`Role::from_label`].
    pub fn from_label(role: &str, text: impl Into<String>) -> Self {
        Self::new(Role::from_label(role), text)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}
