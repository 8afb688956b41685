use crate::config::AppConfig;
use crate::core::identity::UserIdentity;
use crate::core::todo::{TodoItem, TodoList};
use crate::core::vent::{APOLOGY, VentLog};
use crate::message::{Effect, Message};

/// State of the three-column board and the transitions that change it.
#[derive(Debug, Clone, Default)]
pub struct Board {
    persistence_enabled: bool,

    vent_input: String,
    vent_log: VentLog,

    todo_input: String,
    todos: TodoList,

    long_term_input: String,
    long_term_tasks: Vec<String>,

    identity: Option<UserIdentity>,
    signing_in: bool,
    signing_out: bool,
    sign_in_queued: bool,
}

impl Board {
    pub fn new(persistence_enabled: bool) -> Self {
        Self {
            persistence_enabled,
            ..Self::default()
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.persistence_enabled())
    }

    pub fn vent_input(&self) -> &str {
        &self.vent_input
    }

    pub fn vent_log(&self) -> &VentLog {
        &self.vent_log
    }

    pub fn todo_input(&self) -> &str {
        &self.todo_input
    }

    pub fn todos(&self) -> &TodoList {
        &self.todos
    }

    pub fn long_term_input(&self) -> &str {
        &self.long_term_input
    }

    pub fn long_term_tasks(&self) -> &[String] {
        &self.long_term_tasks
    }

    pub fn identity(&self) -> Option<&UserIdentity> {
        self.identity.as_ref()
    }

    pub fn persistence_enabled(&self) -> bool {
        self.persistence_enabled
    }

    pub fn update(&mut self, message: Message) -> Vec<Effect> {
        match message {
            Message::VentInputChanged(value) => {
                self.vent_input = value;
            }

            Message::SubmitVent => {
                let text = self.vent_input.trim().to_string();
                if !text.is_empty() {
                    self.vent_log.push_user(text.clone());
                    self.vent_input.clear();
                    return vec![Effect::SendChat(text)];
                }
            }

            Message::ChatReplied(Ok(reply)) => {
                self.vent_log.push_assistant(reply.response_text);
                if let Some(text) = reply.extracted_todo {
                    let mut effects = Vec::new();
                    let id = match reply.label {
                        Some(label) => self.todos.push(TodoItem::labeled(text, label)),
                        None => {
                            let id = self.todos.push(TodoItem::new(text.clone()));
                            effects.push(Effect::LabelTodo { id, text });
                            id
                        }
                    };
                    log::debug!("Chat extracted todo {}", id);
                    effects.extend(self.todos_changed());
                    return effects;
                }
            }

            Message::ChatReplied(Err(e)) => {
                log::warn!("Chat failed: {}", e);
                self.vent_log.push_assistant(APOLOGY);
            }

            Message::TodoInputChanged(value) => {
                self.todo_input = value;
            }

            Message::AddTodo => {
                let text = self.todo_input.trim().to_string();
                if !text.is_empty() {
                    let id = self.todos.push(TodoItem::new(text.clone()));
                    self.todo_input.clear();
                    let mut effects = vec![Effect::LabelTodo { id, text }];
                    effects.extend(self.todos_changed());
                    return effects;
                }
            }

            Message::TodoLabeled(id, Ok(label)) => {
                if self.todos.set_label(id, label) {
                    return self.todos_changed();
                }
                log::debug!("Dropping label for missing todo {}", id);
            }

            Message::TodoLabeled(id, Err(e)) => {
                log::warn!("Label generation failed for {}: {}", id, e);
            }

            Message::ToggleTodo(id) => {
                if self.todos.toggle(id) {
                    return self.todos_changed();
                }
            }

            Message::LongTermInputChanged(value) => {
                self.long_term_input = value;
            }

            Message::AddLongTermTask => {
                let text = self.long_term_input.trim().to_string();
                if !text.is_empty() {
                    self.long_term_tasks.push(text);
                    self.long_term_input.clear();
                }
            }

            Message::SignIn => {
                if !self.persistence_enabled {
                    log::warn!("Sign-in requested but persistence is disabled");
                } else if self.signing_out {
                    // Started once the departing session has ended.
                    self.sign_in_queued = true;
                } else if self.identity.is_none() && !self.signing_in {
                    self.signing_in = true;
                    return vec![Effect::SignIn];
                }
            }

            Message::SignedIn(Ok(identity)) => {
                self.signing_in = false;
                let uid = identity.uid.clone();
                self.identity = Some(identity);
                return vec![Effect::LoadTodos { uid }];
            }

            Message::SignedIn(Err(e)) => {
                self.signing_in = false;
                log::error!("Sign-in failed: {}", e);
            }

            // Sign-out leaves the to-do collection untouched.
            Message::SignOut => {
                if let Some(identity) = self.identity.take() {
                    self.signing_out = true;
                    return vec![Effect::SignOut { uid: identity.uid }];
                }
            }

            Message::SignedOut => {
                log::info!("Signed out");
                self.signing_out = false;
                if std::mem::take(&mut self.sign_in_queued) {
                    return self.update(Message::SignIn);
                }
            }

            Message::TodosLoaded { uid, result } => {
                if self.identity.as_ref().map(|i| i.uid.as_str()) != Some(uid.as_str()) {
                    log::debug!("Ignoring stored todos loaded for {} after its session ended", uid);
                    return Vec::new();
                }
                match result {
                    Ok(Some(todos)) => self.todos.replace(todos),
                    Ok(None) => {}
                    Err(e) => log::error!("Failed to load stored todos: {}", e),
                }
            }

            Message::SyncFinished(Ok(())) => {}

            Message::SyncFinished(Err(e)) => {
                log::error!("Failed to save todos: {}", e);
            }
        }
        Vec::new()
    }

    /// Uid to mirror the collection under, if mirroring applies right now.
    pub fn sync_target(&self) -> Option<&str> {
        if !self.persistence_enabled {
            return None;
        }
        self.identity.as_ref().map(|i| i.uid.as_str())
    }

    fn todos_changed(&self) -> Vec<Effect> {
        if self.sync_target().is_some() {
            vec![Effect::ScheduleSync]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::label::{LabelColor, label_color};
    use crate::core::todo::LOADING_LABEL;
    use crate::core::vent::Author;
    use crate::sync::ChatReply;

    fn signed_in_board() -> Board {
        let mut board = Board::new(true);
        board.update(Message::SignIn);
        board.update(Message::SignedIn(Ok(UserIdentity::new("u-1"))));
        board
    }

    fn add_todo(board: &mut Board, text: &str) -> Vec<Effect> {
        board.update(Message::TodoInputChanged(text.into()));
        board.update(Message::AddTodo)
    }

    #[test]
    fn vent_submit_appends_user_entry_first() {
        let mut board = Board::new(false);
        board.update(Message::VentInputChanged("add milk to list".into()));
        let effects = board.update(Message::SubmitVent);

        assert_eq!(effects, vec![Effect::SendChat("add milk to list".into())]);
        assert_eq!(board.vent_log().texts(), vec!["add milk to list"]);
        assert_eq!(board.vent_log().entries()[0].author, Author::User);
        assert_eq!(board.vent_input(), "");
    }

    #[test]
    fn blank_vent_is_ignored() {
        let mut board = Board::new(false);
        board.update(Message::VentInputChanged("   ".into()));
        assert!(board.update(Message::SubmitVent).is_empty());
        assert!(board.vent_log().is_empty());
        assert_eq!(board.vent_input(), "   ");
    }

    #[test]
    fn chat_reply_with_extracted_todo() {
        let mut board = Board::new(false);
        board.update(Message::VentInputChanged("add milk to list".into()));
        board.update(Message::SubmitVent);
        let effects = board.update(Message::ChatReplied(Ok(ChatReply {
            response_text: "Sure!".into(),
            extracted_todo: Some("buy milk".into()),
            label: Some("home".into()),
        })));

        assert!(effects.is_empty());
        assert_eq!(board.vent_log().texts(), vec!["add milk to list", "Sure!"]);
        let item = &board.todos().items()[0];
        assert_eq!(item.text, "buy milk");
        assert!(!item.completed);
        assert_eq!(item.label, "home");
    }

    #[test]
    fn extracted_todo_without_label_requests_one() {
        let mut board = Board::new(false);
        let effects = board.update(Message::ChatReplied(Ok(ChatReply {
            response_text: "Noted.".into(),
            extracted_todo: Some("file taxes".into()),
            label: None,
        })));

        let item = &board.todos().items()[0];
        assert_eq!(item.label, LOADING_LABEL);
        assert_eq!(
            effects,
            vec![Effect::LabelTodo {
                id: item.id,
                text: "file taxes".into()
            }]
        );
    }

    #[test]
    fn chat_failure_appends_apology_and_keeps_user_message() {
        let mut board = Board::new(false);
        board.update(Message::VentInputChanged("rough day".into()));
        board.update(Message::SubmitVent);
        board.update(Message::ChatReplied(Err("connection refused".into())));

        assert_eq!(board.vent_log().texts(), vec!["rough day", APOLOGY]);
        assert_eq!(board.vent_log().entries()[1].author, Author::Assistant);
        assert!(board.todos().is_empty());
    }

    #[test]
    fn add_todo_is_optimistic() {
        let mut board = Board::new(false);
        let effects = add_todo(&mut board, "call mom");

        let item = board.todos().items()[0].clone();
        assert_eq!(item.text, "call mom");
        assert!(!item.completed);
        assert_eq!(item.label, LOADING_LABEL);
        assert_eq!(board.todo_input(), "");
        assert_eq!(
            effects,
            vec![Effect::LabelTodo {
                id: item.id,
                text: "call mom".into()
            }]
        );

        board.update(Message::TodoLabeled(item.id, Ok("personal".into())));
        let item = &board.todos().items()[0];
        assert_eq!(item.label, "personal");
        assert_eq!(label_color(&item.label), LabelColor::Navy);
    }

    #[test]
    fn label_failure_leaves_placeholder() {
        let mut board = Board::new(false);
        add_todo(&mut board, "call mom");
        let id = board.todos().items()[0].id;

        assert!(board.update(Message::TodoLabeled(id, Err("timeout".into()))).is_empty());
        assert_eq!(board.todos().items()[0].label, LOADING_LABEL);
    }

    #[test]
    fn labels_land_on_their_own_items() {
        let mut board = Board::new(false);
        add_todo(&mut board, "first");
        add_todo(&mut board, "second");
        let first = board.todos().items()[0].id;
        let second = board.todos().items()[1].id;

        // responses arrive out of order
        board.update(Message::TodoLabeled(second, Ok("work".into())));
        board.update(Message::TodoLabeled(first, Ok("home".into())));

        assert_eq!(board.todos().get(first).unwrap().label, "home");
        assert_eq!(board.todos().get(second).unwrap().label, "work");
    }

    #[test]
    fn toggle_twice_restores_completion() {
        let mut board = Board::new(false);
        add_todo(&mut board, "stretch");
        let id = board.todos().items()[0].id;

        board.update(Message::ToggleTodo(id));
        assert!(board.todos().items()[0].completed);
        board.update(Message::ToggleTodo(id));
        assert!(!board.todos().items()[0].completed);
    }

    #[test]
    fn long_term_tasks_are_local() {
        let mut board = signed_in_board();
        board.update(Message::LongTermInputChanged("learn piano".into()));
        assert!(board.update(Message::AddLongTermTask).is_empty());
        board.update(Message::LongTermInputChanged("  ".into()));
        board.update(Message::AddLongTermTask);

        assert_eq!(board.long_term_tasks(), ["learn piano".to_string()]);
        assert_eq!(board.long_term_input(), "  ");
    }

    #[test]
    fn changes_schedule_sync_only_when_signed_in() {
        let mut board = Board::new(true);
        let effects = add_todo(&mut board, "offline");
        assert!(!effects.contains(&Effect::ScheduleSync));

        let mut board = signed_in_board();
        let effects = add_todo(&mut board, "online");
        assert!(effects.contains(&Effect::ScheduleSync));

        let id = board.todos().items()[0].id;
        assert_eq!(board.update(Message::ToggleTodo(id)), vec![Effect::ScheduleSync]);
    }

    #[test]
    fn sign_in_requires_persistence() {
        let mut board = Board::new(false);
        assert!(board.update(Message::SignIn).is_empty());
        assert!(board.identity().is_none());
    }

    #[test]
    fn sign_in_is_not_repeated_while_pending() {
        let mut board = Board::new(true);
        assert_eq!(board.update(Message::SignIn), vec![Effect::SignIn]);
        assert!(board.update(Message::SignIn).is_empty());

        let effects = board.update(Message::SignedIn(Ok(UserIdentity::new("u-1"))));
        assert_eq!(effects, vec![Effect::LoadTodos { uid: "u-1".into() }]);
        assert!(board.update(Message::SignIn).is_empty());
    }

    #[test]
    fn stored_todos_replace_local_collection() {
        let mut board = Board::new(true);
        add_todo(&mut board, "local");
        let stale = board.todos().items()[0].id;

        board.update(Message::SignIn);
        board.update(Message::SignedIn(Ok(UserIdentity::new("u-1"))));
        board.update(Message::TodosLoaded {
            uid: "u-1".into(),
            result: Ok(Some(vec![TodoItem::labeled("stored", "work")])),
        });

        assert_eq!(board.todos().len(), 1);
        assert_eq!(board.todos().items()[0].text, "stored");

        // the label request for the replaced item finds nothing to patch
        assert!(board.update(Message::TodoLabeled(stale, Ok("home".into()))).is_empty());
    }

    #[test]
    fn absent_document_keeps_local_collection() {
        let mut board = Board::new(true);
        add_todo(&mut board, "local");
        board.update(Message::SignIn);
        board.update(Message::SignedIn(Ok(UserIdentity::new("u-1"))));
        board.update(Message::TodosLoaded {
            uid: "u-1".into(),
            result: Ok(None),
        });
        assert_eq!(board.todos().items()[0].text, "local");
    }

    #[test]
    fn sign_out_keeps_todos() {
        let mut board = signed_in_board();
        add_todo(&mut board, "still here");

        assert_eq!(
            board.update(Message::SignOut),
            vec![Effect::SignOut { uid: "u-1".into() }]
        );
        assert!(board.identity().is_none());
        assert_eq!(board.todos().len(), 1);
        assert!(board.update(Message::SignOut).is_empty());
    }

    #[test]
    fn todos_loaded_for_another_user_are_dropped() {
        let mut board = signed_in_board();
        board.update(Message::SignOut);
        board.update(Message::SignedOut);
        board.update(Message::SignIn);
        board.update(Message::SignedIn(Ok(UserIdentity::new("bob"))));
        add_todo(&mut board, "bob's");

        let effects = board.update(Message::TodosLoaded {
            uid: "u-1".into(),
            result: Ok(Some(vec![TodoItem::labeled("alice's", "work")])),
        });
        assert!(effects.is_empty());
        assert_eq!(board.todos().len(), 1);
        assert_eq!(board.todos().items()[0].text, "bob's");

        // nothing applies while signed out either
        board.update(Message::SignOut);
        board.update(Message::TodosLoaded {
            uid: "bob".into(),
            result: Ok(Some(Vec::new())),
        });
        assert_eq!(board.todos().len(), 1);
    }

    #[test]
    fn sign_in_waits_for_sign_out_to_finish() {
        let mut board = signed_in_board();
        board.update(Message::SignOut);

        assert!(board.update(Message::SignIn).is_empty());
        assert!(board.update(Message::SignIn).is_empty());
        assert_eq!(board.update(Message::SignedOut), vec![Effect::SignIn]);
        assert!(board.update(Message::SignIn).is_empty());

        board.update(Message::SignedIn(Ok(UserIdentity::new("u-1"))));
        assert_eq!(board.identity().unwrap().uid, "u-1");
    }

    #[test]
    fn sign_out_without_queued_sign_in_stays_out() {
        let mut board = signed_in_board();
        board.update(Message::SignOut);
        assert!(board.update(Message::SignedOut).is_empty());
        assert!(board.identity().is_none());
    }
}
