/// Outbound reply to a chat message or interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    /// Message content.
    pub content: String,
    /// Only visible to the invoking user. Ignored for chat messages.
    pub ephemeral: bool,
    /// Autocomplete choices as `(name, value)` pairs. When present the reply is sent as
    /// an autocomplete result instead of a message.
    pub choices: Vec<(String, String)>,
}

impl Reply {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Marks the reply as ephemeral.
    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    /// Builds an autocomplete result.
    pub fn choices<I, N, V>(choices: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        Self {
            choices: choices
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn is_autocomplete(&self) -> bool {
        !self.choices.is_empty()
    }
}
