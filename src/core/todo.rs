use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder label shown until the labeling service answers.
pub const LOADING_LABEL: &str = "Loading…";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Older stored documents carry no id; those items get a fresh one on load.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default = "loading_label")]
    pub label: String,
}

fn loading_label() -> String {
    LOADING_LABEL.to_string()
}

impl TodoItem {
    /// A fresh, unlabeled item.
    pub fn new(text: impl Into<String>) -> Self {
        Self::labeled(text, LOADING_LABEL)
    }

    pub fn labeled(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            completed: false,
            label: label.into(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.label == LOADING_LABEL
    }
}

/// Ordered to-do collection. Items are addressed by id, never by position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoList {
    items: Vec<TodoItem>,
}

impl TodoList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&TodoItem> {
        self.items.iter().find(|t| t.id == id)
    }

    /// Append an item and return its id.
    pub fn push(&mut self, item: TodoItem) -> Uuid {
        let id = item.id;
        self.items.push(item);
        id
    }

    /// Overwrite the label of `id`. Returns false when the item is gone.
    pub fn set_label(&mut self, id: Uuid, label: impl Into<String>) -> bool {
        self.modify(id, |t| t.label = label.into())
    }

    /// Flip completion of `id`. Returns false when the item is gone.
    pub fn toggle(&mut self, id: Uuid) -> bool {
        self.modify(id, |t| t.completed = !t.completed)
    }

    /// Resolve a display position (0-based) to the id currently shown there.
    pub fn id_at(&self, position: usize) -> Option<Uuid> {
        self.items.get(position).map(|t| t.id)
    }

    /// Replace the whole collection, e.g. with the copy loaded from remote storage.
    pub fn replace(&mut self, items: Vec<TodoItem>) {
        self.items = items;
    }

    fn modify(&mut self, id: Uuid, f: impl FnOnce(&mut TodoItem)) -> bool {
        match self.items.iter_mut().find(|t| t.id == id) {
            Some(item) => {
                f(item);
                true
            }
            None => false,
        }
    }
}
