use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::application::Board;
use crate::message::{Effect, Message};
use crate::sync::{PersistenceBridge, TaskIntelligence};

async fn sync_timer(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Single event loop that owns the board and runs the effects it asks for.
///
/// Every spawned effect reports back with exactly one `Message` on an internal
/// channel, so all board mutations still happen on the loop itself.
///
/// At most one debounced write runs at a time. A timer that fires while one
/// is running marks the collection dirty, and the next write starts when the
/// running one reports back.
pub struct Runtime {
    board: Board,
    intelligence: Arc<dyn TaskIntelligence>,
    bridge: Option<Arc<PersistenceBridge>>,
    debounce: Duration,
    tx: mpsc::UnboundedSender<Message>,
    rx: mpsc::UnboundedReceiver<Message>,
    in_flight: usize,
    sync_deadline: Option<Instant>,
    sync_in_flight: bool,
    sync_dirty: bool,
    sync_task: Option<JoinHandle<()>>,
}

impl Runtime {
    pub fn new(
        board: Board,
        intelligence: Arc<dyn TaskIntelligence>,
        bridge: Option<Arc<PersistenceBridge>>,
        debounce: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            board,
            intelligence,
            bridge,
            debounce,
            tx,
            rx,
            in_flight: 0,
            sync_deadline: None,
            sync_in_flight: false,
            sync_dirty: false,
            sync_task: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Number of requests still waiting for a response.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn sync_pending(&self) -> bool {
        self.sync_deadline.is_some()
    }

    /// Whether a debounced write is running right now.
    pub fn sync_in_flight(&self) -> bool {
        self.sync_in_flight
    }

    /// Pick up a cached session, if any, and load its stored todos.
    pub fn restore_session(&mut self) {
        let restored = self.bridge.as_ref().and_then(|b| b.restore_session());
        if let Some(identity) = restored {
            if self.board.persistence_enabled() {
                self.dispatch(Message::SignedIn(Ok(identity)));
            }
        }
    }

    /// Apply one event and start whatever it asks for.
    pub fn dispatch(&mut self, message: Message) {
        for effect in self.board.update(message) {
            self.perform(effect);
        }
    }

    fn perform(&mut self, effect: Effect) {
        match effect {
            Effect::SendChat(text) => {
                let svc = self.intelligence.clone();
                self.spawn(async move {
                    Message::ChatReplied(svc.chat(&text).await.map_err(|e| e.to_string()))
                });
            }

            Effect::LabelTodo { id, text } => {
                let svc = self.intelligence.clone();
                self.spawn(async move {
                    Message::TodoLabeled(id, svc.label(&text).await.map_err(|e| e.to_string()))
                });
            }

            Effect::SignIn => match self.bridge.clone() {
                Some(bridge) => {
                    self.spawn(async move {
                        Message::SignedIn(bridge.sign_in().await.map_err(|e| e.to_string()))
                    });
                }
                None => self.dispatch(Message::SignedIn(Err(
                    "persistence is not available".to_string(),
                ))),
            },

            Effect::SignOut { uid } => {
                let Some(bridge) = self.bridge.clone() else {
                    self.dispatch(Message::SignedOut);
                    return;
                };
                // A sign-in racing the flush must not find the departing session.
                bridge.clear_session();

                let armed = self.sync_deadline.take().is_some();
                let dirty = std::mem::take(&mut self.sync_dirty);
                let pending = (armed || dirty).then(|| self.board.todos().items().to_vec());
                let running = if pending.is_some() { self.sync_task.take() } else { None };
                self.spawn(async move {
                    if let Some(todos) = pending {
                        // The final snapshot must land after any write still running.
                        if let Some(running) = running {
                            let _ = running.await;
                        }
                        if let Err(e) = bridge.save_todos(&uid, &todos).await {
                            log::error!("Failed to save todos before sign-out: {}", e);
                        }
                    }
                    bridge.end_provider_session().await;
                    Message::SignedOut
                });
            }

            Effect::LoadTodos { uid } => {
                if let Some(bridge) = self.bridge.clone() {
                    self.spawn(async move {
                        let result = bridge.load_todos(&uid).await.map_err(|e| e.to_string());
                        Message::TodosLoaded { uid, result }
                    });
                }
            }

            Effect::ScheduleSync => {
                self.sync_deadline = Some(Instant::now() + self.debounce);
            }
        }
    }

    fn spawn<F>(&mut self, fut: F) -> JoinHandle<()>
    where
        F: Future<Output = Message> + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(fut.await);
        })
    }

    /// Write the current collection now, replacing any armed timer.
    fn start_sync(&mut self) {
        self.sync_deadline = None;
        if self.sync_in_flight {
            self.sync_dirty = true;
            return;
        }
        let (Some(bridge), Some(uid)) = (self.bridge.clone(), self.board.sync_target()) else {
            return;
        };
        let uid = uid.to_string();
        let todos = self.board.todos().items().to_vec();
        self.sync_in_flight = true;
        let task = self.spawn(async move {
            Message::SyncFinished(bridge.save_todos(&uid, &todos).await.map_err(|e| e.to_string()))
        });
        self.sync_task = Some(task);
    }

    fn complete(&mut self, message: Message) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let sync_done = matches!(message, Message::SyncFinished(_));
        self.dispatch(message);
        if sync_done {
            self.sync_in_flight = false;
            self.sync_task = None;
            if std::mem::take(&mut self.sync_dirty) {
                self.start_sync();
            }
        }
    }

    /// Wait for one completion or the sync timer. Returns false when idle.
    pub async fn step(&mut self) -> bool {
        if self.in_flight == 0 && self.sync_deadline.is_none() {
            return false;
        }
        let deadline = self.sync_deadline;
        tokio::select! {
            Some(message) = self.rx.recv() => self.complete(message),
            _ = sync_timer(deadline) => self.start_sync(),
        }
        true
    }

    /// Run until nothing is in flight and no write is pending.
    pub async fn settle(&mut self) {
        while self.step().await {}
    }

    /// Interactive loop: feeds `input` into the board and calls `render` after
    /// every change. Returns once `input` closes.
    pub async fn run(
        mut self,
        mut input: mpsc::UnboundedReceiver<Message>,
        mut render: impl FnMut(&Board),
    ) {
        render(&self.board);
        loop {
            let deadline = self.sync_deadline;
            tokio::select! {
                next = input.recv() => match next {
                    Some(message) => self.dispatch(message),
                    None => break,
                },
                Some(message) = self.rx.recv() => self.complete(message),
                _ = sync_timer(deadline) => self.start_sync(),
            }
            render(&self.board);
        }
        self.shutdown().await;
    }

    /// Let a running write finish and perform a pending one before exit.
    /// Other in-flight requests are abandoned.
    pub async fn shutdown(mut self) {
        if let Some(running) = self.sync_task.take() {
            let _ = running.await;
        }
        let armed = self.sync_deadline.take().is_some();
        let dirty = std::mem::take(&mut self.sync_dirty);
        if !(armed || dirty) {
            return;
        }
        if let (Some(bridge), Some(uid)) = (&self.bridge, self.board.sync_target()) {
            match bridge.save_todos(uid, self.board.todos().items()).await {
                Ok(()) => log::info!("Flushed pending todos on exit"),
                Err(e) => log::error!("Failed to save todos on exit: {}", e),
            }
        }
    }
}
