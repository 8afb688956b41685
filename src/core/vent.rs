/// Shown in place of a reply when the chat request fails.
pub const APOLOGY: &str = "My bad, I had an issue. Try again!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VentEntry {
    pub author: Author,
    pub text: String,
}

/// Append-only chat log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VentLog {
    entries: Vec<VentEntry>,
}

impl VentLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[VentEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.push(Author::User, text.into());
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.push(Author::Assistant, text.into());
    }

    /// Message texts in order.
    pub fn texts(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.text.as_str()).collect()
    }

    fn push(&mut self, author: Author, text: String) {
        self.entries.push(VentEntry { author, text });
    }
}
