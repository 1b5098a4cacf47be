use serde::Serialize;
use std::fmt::{self, Debug, Display};

/// Extra context appended to a failed assertion.
///
/// Useful in large end-to-end tests where the assertion alone does not say
/// enough to debug the failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostScript {
    label: String,
    content: String,
}

impl PostScript {
    pub fn new(label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            label: label.into().trim().to_string(),
            content: content.into().trim().to_string(),
        }
    }

    /// Free-form annotation.
    pub fn annotation(content: impl Display) -> Self {
        Self::new("annotation", content.to_string())
    }

    /// One `key => value` line per pair.
    pub fn values<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Display,
        V: Debug,
    {
        let content = pairs
            .into_iter()
            .map(|(k, v)| format!("{} => {:?}", k, v))
            .collect::<Vec<_>>()
            .join("\n\t");
        Self::new("mapping", content)
    }

    /// `value` rendered as pretty JSON.
    pub fn json<T: Serialize + ?Sized>(label: impl Into<String>, value: &T) -> Self {
        let content = serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| format!("<unserializable: {}>", e))
            .replace('\n', "\n\t");
        Self::new(label, content)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl fmt::Display for PostScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "↪ PostScript | {} ↷", self.label)?;
        write!(f, "\t{}", self.content)
    }
}
