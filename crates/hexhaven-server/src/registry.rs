//! In-process session registry.
//!
//! Each command runs validation, mutation, snapshot and placement
//! computation while holding the session's map entry exclusively, so two
//! commands for the same game never interleave. Teardown removes a session
//! only if it is still empty at the moment of removal.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use hexhaven_core::{
    ChatMessage, GameAction, GameError, GameEvent, GameSnapshot, PlayerId, RulesConfig, Session,
    SessionId, SessionSummary, ValidPlacements,
};
use rand::Rng;
use thiserror::Error;
use tracing::info;

const ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ID_LEN: usize = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Game not found")]
    GameNotFound,

    #[error("Not in a game")]
    NotInGame,

    #[error("Already in a game")]
    AlreadyInGame,

    #[error(transparent)]
    Game(#[from] GameError),
}

/// Everything to broadcast after a successful command, captured inside the
/// same critical section as the command itself.
#[derive(Debug, Clone)]
pub struct Update {
    pub game_id: SessionId,
    /// Seated players at the time of the command
    pub members: Vec<PlayerId>,
    pub snapshot: GameSnapshot,
    /// Who acts next and where they may build
    pub placements: Option<(PlayerId, ValidPlacements)>,
    pub events: Vec<GameEvent>,
}

impl Update {
    fn capture(session: &Session, events: Vec<GameEvent>) -> Self {
        Self {
            game_id: session.id.clone(),
            members: session.players.iter().map(|p| p.id).collect(),
            snapshot: session.snapshot(),
            placements: session.pending_placements(),
            events,
        }
    }
}

fn generate_id<R: Rng>(rng: &mut R) -> SessionId {
    (0..ID_LEN)
        .map(|_| ID_CHARSET[rng.gen_range(0..ID_CHARSET.len())] as char)
        .collect()
}

/// All live sessions and who sits where
pub struct Registry {
    sessions: DashMap<SessionId, Session>,
    /// Player to the game they are seated in
    memberships: DashMap<PlayerId, SessionId>,
    rules: RulesConfig,
}

impl Registry {
    pub fn new(rules: RulesConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            memberships: DashMap::new(),
            rules,
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// The game a player is seated in
    pub fn game_of(&self, player: PlayerId) -> Option<SessionId> {
        self.memberships.get(&player).map(|id| id.value().clone())
    }

    fn ensure_free(&self, player: PlayerId) -> Result<(), RegistryError> {
        if self.memberships.contains_key(&player) {
            return Err(RegistryError::AlreadyInGame);
        }
        Ok(())
    }

    /// Open a new game with `player` in the first seat
    pub fn create_game(&self, player: PlayerId, name: String) -> Result<Update, RegistryError> {
        self.ensure_free(player)?;
        let mut rng = rand::thread_rng();
        loop {
            let id = generate_id(&mut rng);
            if let Entry::Vacant(slot) = self.sessions.entry(id.clone()) {
                let mut session = Session::new(id.clone(), self.rules.clone());
                session.add_player(player, name)?;
                let update = Update::capture(&session, Vec::new());
                slot.insert(session);
                self.memberships.insert(player, id.clone());
                info!(game = %id, %player, "game created");
                return Ok(update);
            }
        }
    }

    pub fn join_game(
        &self,
        player: PlayerId,
        game_id: &str,
        name: String,
    ) -> Result<Update, RegistryError> {
        self.ensure_free(player)?;
        let mut session = self
            .sessions
            .get_mut(game_id)
            .ok_or(RegistryError::GameNotFound)?;
        session.add_player(player, name)?;
        self.memberships.insert(player, session.id.clone());
        Ok(Update::capture(&session, Vec::new()))
    }

    fn with_session<T>(
        &self,
        player: PlayerId,
        command: impl FnOnce(&mut Session) -> Result<T, GameError>,
    ) -> Result<(T, Update), RegistryError> {
        let game_id = self.game_of(player).ok_or(RegistryError::NotInGame)?;
        let mut session = self
            .sessions
            .get_mut(&game_id)
            .ok_or(RegistryError::GameNotFound)?;
        let output = command(&mut session)?;
        Ok((output, Update::capture(&session, Vec::new())))
    }

    pub fn start_game(&self, player: PlayerId) -> Result<Update, RegistryError> {
        let ((), update) = self.with_session(player, |s| s.start(player))?;
        info!(game = %update.game_id, players = update.members.len(), "game started");
        Ok(update)
    }

    /// Run an in-game command
    pub fn apply(&self, player: PlayerId, action: GameAction) -> Result<Update, RegistryError> {
        let (events, mut update) = self.with_session(player, |s| s.apply_action(player, action))?;
        update.events = events;
        Ok(update)
    }

    /// Post a chat line; returns the recipients and the stored message
    pub fn chat(
        &self,
        player: PlayerId,
        message: String,
    ) -> Result<(Vec<PlayerId>, ChatMessage), RegistryError> {
        let (chat, update) = self.with_session(player, |s| s.post_chat(player, message))?;
        Ok((update.members, chat))
    }

    /// Unseat a player. Returns the state of the game they left, or None if
    /// it was torn down because nobody is left.
    pub fn leave(&self, player: PlayerId) -> Result<Option<Update>, RegistryError> {
        let (_, game_id) = self
            .memberships
            .remove(&player)
            .ok_or(RegistryError::NotInGame)?;

        let update = {
            let mut session = self
                .sessions
                .get_mut(&game_id)
                .ok_or(RegistryError::GameNotFound)?;
            session.remove_player(player)?;
            Update::capture(&session, Vec::new())
        };

        if self
            .sessions
            .remove_if(&game_id, |_, session| session.is_empty())
            .is_some()
        {
            info!(game = %game_id, "game closed");
            return Ok(None);
        }
        Ok(Some(update))
    }

    /// Summaries of every live game
    pub fn list_games(&self) -> Vec<SessionSummary> {
        let mut games: Vec<SessionSummary> =
            self.sessions.iter().map(|s| s.summary()).collect();
        games.sort_by(|a, b| a.id.cmp(&b.id));
        games
    }
}
