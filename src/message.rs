use uuid::Uuid;

use crate::core::identity::UserIdentity;
use crate::core::todo::TodoItem;
use crate::sync::ChatReply;

#[derive(Debug, Clone)]
pub enum Message {
    // Vent column
    VentInputChanged(String),
    SubmitVent,
    ChatReplied(Result<ChatReply, String>),

    // To-do column
    TodoInputChanged(String),
    AddTodo,
    TodoLabeled(Uuid, Result<String, String>),
    ToggleTodo(Uuid),

    // Long-term column
    LongTermInputChanged(String),
    AddLongTermTask,

    // Account / persistence
    SignIn,
    SignedIn(Result<UserIdentity, String>),
    SignOut,
    SignedOut,
    /// Stored collection read for `uid`.
    TodosLoaded {
        uid: String,
        result: Result<Option<Vec<TodoItem>>, String>,
    },
    SyncFinished(Result<(), String>),
}

/// Side effects a transition asks the runtime to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SendChat(String),
    LabelTodo { id: Uuid, text: String },
    SignIn,
    /// Flush any pending write for `uid`, then end the session.
    SignOut { uid: String },
    LoadTodos { uid: String },
    /// (Re)arm the debounced write of the to-do collection.
    ScheduleSync,
}
