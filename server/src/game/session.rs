//! One async task per live game.
//! ✔ single writer: every intent for a game goes through its task's inbox
//! ✔ consistent concurrent reads through a `watch` of the latest state
//! ✔ seats survive reconnects; extra clients watch read-only
//! ✔ idle shutdown once nobody has been connected for the grace period

use crate::{
    config::Settings,
    game::{
        error::RuleError,
        logic::{GameState, Intent},
        selection::{Highlights, PendingSelection},
        types::{Phase, PlayerId},
    },
    protocol::{ClientMsg, Seat, ServerMsg},
};
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::{
    sync::{broadcast, mpsc, oneshot, watch},
    time::{timeout, Duration},
};
use uuid::Uuid;

const EVENT_BUFFER: usize = 128;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchErr {
    #[error("session {0} is not running")]
    UnknownGame(Uuid),
    #[error("session limit of {0} reached")]
    TooManySessions(usize),
    #[error("session channel closed")]
    ChannelClosed,
}

/// Everything readers may look at, published after each command.
#[derive(Debug, Clone)]
pub struct SessionView {
    pub game: GameState,
    pub seated: usize,
    pub connected: usize,
    pub started: bool,
}

impl SessionView {
    fn fresh() -> Self {
        SessionView {
            game: GameState::new(),
            seated: 0,
            connected: 0,
            started: false,
        }
    }
}

/// Listing row for `GET /api/games`.
#[derive(Debug, Serialize, Clone)]
pub struct SessionSummary {
    pub game_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub seated: usize,
    pub connected: usize,
    pub phase: Phase,
}

enum Command {
    Join {
        client_id: Uuid,
        reply: oneshot::Sender<Seat>,
    },
    Leave {
        client_id: Uuid,
    },
    Client {
        client_id: Uuid,
        msg: ClientMsg,
        reply: oneshot::Sender<Vec<ServerMsg>>,
    },
}

/// Cheap, cloneable way to talk to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    game_id: Uuid,
    created_at: DateTime<Utc>,
    tx: mpsc::Sender<Command>,
    view: watch::Receiver<Arc<SessionView>>,
    events: broadcast::Sender<ServerMsg>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Join { client_id, .. } => write!(f, "Join({client_id})"),
            Command::Leave { client_id } => write!(f, "Leave({client_id})"),
            Command::Client { client_id, msg, .. } => write!(f, "Client({client_id}, {msg:?})"),
        }
    }
}

impl SessionHandle {
    pub fn game_id(&self) -> Uuid {
        self.game_id
    }

    /// Latest published state. Never observes a half-applied intent.
    pub fn view(&self) -> Arc<SessionView> {
        self.view.borrow().clone()
    }

    /// Public events (state updates, game start/over) from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerMsg> {
        self.events.subscribe()
    }

    pub fn summary(&self) -> SessionSummary {
        let view = self.view();
        SessionSummary {
            game_id: self.game_id,
            created_at: self.created_at,
            seated: view.seated,
            connected: view.connected,
            phase: view.game.phase(),
        }
    }

    pub async fn join(&self, client_id: Uuid) -> Result<Seat, DispatchErr> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Join { client_id, reply }).await?;
        rx.await.map_err(|_| DispatchErr::ChannelClosed)
    }

    pub async fn leave(&self, client_id: Uuid) -> Result<(), DispatchErr> {
        self.send(Command::Leave { client_id }).await
    }

    /// Hands a client frame to the session. The returned messages are for
    /// that client alone; public effects arrive through [`Self::subscribe`].
    pub async fn submit(&self, client_id: Uuid, msg: ClientMsg) -> Result<Vec<ServerMsg>, DispatchErr> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Client {
            client_id,
            msg,
            reply,
        })
        .await?;
        rx.await.map_err(|_| DispatchErr::ChannelClosed)
    }

    async fn send(&self, cmd: Command) -> Result<(), DispatchErr> {
        self.tx
            .send(cmd)
            .await
            .map_err(|_| DispatchErr::ChannelClosed)
    }
}

/// Index of live sessions. Each game is its own actor; the registry only
/// routes to them.
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<Uuid, SessionHandle>>,
    channel_capacity: usize,
    max_sessions: usize,
    idle_grace: Duration,
}

impl SessionRegistry {
    pub fn new(channel_capacity: usize, max_sessions: usize, idle_grace: Duration) -> Self {
        SessionRegistry {
            sessions: Arc::new(DashMap::new()),
            channel_capacity: channel_capacity.max(1),
            max_sessions,
            idle_grace,
        }
    }

    pub fn from_settings(s: &Settings) -> Self {
        Self::new(
            s.session_channel_capacity,
            s.max_sessions,
            Duration::from_secs(s.session_idle_grace),
        )
    }

    pub fn get(&self, game_id: Uuid) -> Option<SessionHandle> {
        self.sessions.get(&game_id).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn list(&self) -> Vec<SessionSummary> {
        let mut rows: Vec<_> = self.sessions.iter().map(|e| e.value().summary()).collect();
        rows.sort_by_key(|r| r.created_at);
        rows
    }

    /// Starts a brand-new game under a fresh id.
    pub fn create(&self) -> Result<SessionHandle, DispatchErr> {
        self.get_or_spawn(Uuid::new_v4())
    }

    /// Returns the running session for `game_id`, spawning it if needed.
    pub fn get_or_spawn(&self, game_id: Uuid) -> Result<SessionHandle, DispatchErr> {
        // Fast path - already running
        if let Some(handle) = self.get(game_id) {
            return Ok(handle);
        }
        if self.sessions.len() >= self.max_sessions {
            return Err(DispatchErr::TooManySessions(self.max_sessions));
        }
        let handle = match self.sessions.entry(game_id) {
            Entry::Occupied(e) => e.get().clone(),
            Entry::Vacant(v) => v.insert(self.spawn(game_id)).value().clone(),
        };
        Ok(handle)
    }

    fn spawn(&self, game_id: Uuid) -> SessionHandle {
        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let (view_tx, view_rx) = watch::channel(Arc::new(SessionView::fresh()));
        let session = Session::new(game_id, events.clone(), view_tx);

        let sessions = self.sessions.clone();
        let grace = self.idle_grace;
        tokio::spawn(async move {
            run(session, rx, grace).await;
            // final cleanup
            sessions.remove(&game_id);
        });
        log::info!("Session {game_id} started");

        SessionHandle {
            game_id,
            created_at: Utc::now(),
            tx,
            view: view_rx,
            events,
        }
    }
}

async fn run(mut session: Session, mut rx: mpsc::Receiver<Command>, grace: Duration) {
    loop {
        let next = if session.connected.is_empty() {
            match timeout(grace, rx.recv()).await {
                Ok(cmd) => cmd,
                Err(_) => {
                    log::info!("Session {} idle for {grace:?}, shutting down", session.game_id);
                    break;
                }
            }
        } else {
            rx.recv().await
        };
        let Some(cmd) = next else { break };
        session.handle(cmd);
    }
}

/// Actor-owned state. Only the session task ever touches it.
struct Session {
    game_id: Uuid,
    game: GameState,
    seats: [Option<Uuid>; 2],
    connected: HashMap<Uuid, usize>, // client id → open sockets
    selections: [Option<PendingSelection>; 2],
    started: bool,
    events: broadcast::Sender<ServerMsg>,
    view: watch::Sender<Arc<SessionView>>,
}

impl Session {
    fn new(
        game_id: Uuid,
        events: broadcast::Sender<ServerMsg>,
        view: watch::Sender<Arc<SessionView>>,
    ) -> Self {
        Session {
            game_id,
            game: GameState::new(),
            seats: [None, None],
            connected: HashMap::new(),
            selections: [None, None],
            started: false,
            events,
            view,
        }
    }

    /// Publishes the current state to readers. Called before any reply so a
    /// client that gets an answer never reads an older view.
    fn refresh_view(&self) {
        self.view.send_replace(Arc::new(SessionView {
            game: self.game.clone(),
            seated: self.seats.iter().flatten().count(),
            connected: self.connected.len(),
            started: self.started,
        }));
    }

    fn seat_of(&self, client_id: Uuid) -> Seat {
        match self.seats.iter().position(|s| *s == Some(client_id)) {
            Some(0) => Seat::Player(PlayerId::One),
            Some(_) => Seat::Player(PlayerId::Two),
            None => Seat::Observer,
        }
    }

    fn publish(&self, msg: ServerMsg) {
        // No subscribers is fine; state is still readable through the view.
        let _ = self.events.send(msg);
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Join { client_id, reply } => {
                let seat = self.join(client_id);
                self.refresh_view();
                let _ = reply.send(seat);
            }
            Command::Leave { client_id } => {
                self.leave(client_id);
                self.refresh_view();
            }
            Command::Client {
                client_id,
                msg,
                reply,
            } => {
                let out = self.client(client_id, msg);
                self.refresh_view();
                let _ = reply.send(out);
            }
        }
    }

    fn join(&mut self, client_id: Uuid) -> Seat {
        let mut seat = self.seat_of(client_id);
        if seat == Seat::Observer {
            if let Some(free) = self.seats.iter().position(Option::is_none) {
                self.seats[free] = Some(client_id);
                seat = self.seat_of(client_id);
            }
        }
        *self.connected.entry(client_id).or_insert(0) += 1;
        log::info!("Session {}: client {client_id} joined as {seat:?}", self.game_id);

        if !self.started && self.seats.iter().all(Option::is_some) {
            self.started = true;
            self.publish(ServerMsg::GameStart {
                game_id: self.game_id,
            });
            self.publish(self.state_msg());
        }
        seat
    }

    fn leave(&mut self, client_id: Uuid) {
        if let Some(n) = self.connected.get_mut(&client_id) {
            *n -= 1;
            if *n == 0 {
                self.connected.remove(&client_id);
                if let Some(p) = self.seat_of(client_id).player() {
                    self.selections[p.index()] = None;
                }
                log::info!("Session {}: client {client_id} left", self.game_id);
            }
        }
    }

    fn client(&mut self, client_id: Uuid, msg: ClientMsg) -> Vec<ServerMsg> {
        let Some(player) = self.seat_of(client_id).player() else {
            return match msg {
                ClientMsg::Cancel => Vec::new(),
                _ => vec![ServerMsg::Error {
                    message: "observers cannot act".into(),
                }],
            };
        };

        match msg {
            ClientMsg::Act { intent } => self.act(player, &intent),
            ClientMsg::Select { pos } => {
                match PendingSelection::select(&self.game, player, pos) {
                    Ok(sel) => {
                        self.selections[player.index()] = Some(sel);
                        vec![ServerMsg::Highlights {
                            game_id: self.game_id,
                            selected: Some(pos),
                            highlights: Highlights::for_cell(&self.game, pos),
                        }]
                    }
                    Err(e) => vec![ServerMsg::rejected(self.game_id, e)],
                }
            }
            ClientMsg::Target { mode, target } => {
                match self.selections[player.index()].take() {
                    Some(sel) if sel.is_current(&self.game) => {
                        self.act(player, &sel.resolve(mode, target))
                    }
                    Some(_) => vec![ServerMsg::Error {
                        message: "selected piece is gone; select again".into(),
                    }],
                    None => vec![ServerMsg::Error {
                        message: "nothing selected".into(),
                    }],
                }
            }
            ClientMsg::Cancel => {
                self.selections[player.index()] = None;
                vec![ServerMsg::Highlights {
                    game_id: self.game_id,
                    selected: None,
                    highlights: Highlights::default(),
                }]
            }
            ClientMsg::Reset => {
                if !self.game.phase().is_resolved() {
                    return vec![ServerMsg::Error {
                        message: "game still in progress".into(),
                    }];
                }
                self.game = GameState::new();
                self.selections = [None, None];
                log::info!("Session {}: reset by {player}", self.game_id);
                self.publish(self.state_msg());
                Vec::new()
            }
        }
    }

    fn act(&mut self, player: PlayerId, intent: &Intent) -> Vec<ServerMsg> {
        match self.game.apply(player, intent) {
            Ok(snapshot) => {
                self.selections[player.index()] = None;
                self.publish(ServerMsg::State {
                    game_id: self.game_id,
                    snapshot,
                });
                if let Some(winner) = self.game.winner() {
                    log::info!("Session {}: {winner} wins", self.game_id);
                    self.publish(ServerMsg::GameOver {
                        game_id: self.game_id,
                        winner,
                    });
                }
                Vec::new()
            }
            Err(reason) => {
                log::debug!("Session {}: {player} {intent:?} rejected: {reason}", self.game_id);
                vec![self.rejection(reason)]
            }
        }
    }

    fn rejection(&self, reason: RuleError) -> ServerMsg {
        ServerMsg::rejected(self.game_id, reason)
    }

    fn state_msg(&self) -> ServerMsg {
        ServerMsg::State {
            game_id: self.game_id,
            snapshot: self.game.snapshot(),
        }
    }
}
