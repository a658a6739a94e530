//! GameSession - the active board plus change notification.
//!
//! A session is an ordinary value owned by the application and passed to
//! whatever needs it; nothing here is global. Notification is explicit:
//! callers mutate the board through [`GameSession::current_board_mut`]
//! and then call [`GameSession::notify`]. Replacing the board
//! ([`set_current_board`](GameSession::set_current_board),
//! [`new_board`](GameSession::new_board), loading) notifies on its own.
//!
//! Observers get a shared view of the board and cannot reach the session
//! while they run. An observer that wants to change the board posts a
//! [`BoardCommand`] through a sender from
//! [`command_sender`](GameSession::command_sender); queued commands are
//! applied by [`process_pending`](GameSession::process_pending) on the
//! next idle tick, so a change can never re-enter a running fan-out.

use std::fmt;
use std::io::{Read, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

use jeopardy_models::Board;
use jeopardy_persistence::PersistenceGateway;
use tracing::{debug, error, info, warn};

use crate::error::{ObserverFailure, Result, SessionError};

/// What an observer returns; errors are logged and reported after the
/// fan-out completes.
pub type ObserverResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

type Observer = Box<dyn FnMut(Option<&Board>) -> ObserverResult>;

/// Handle returned by [`GameSession::register_observer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer-{}", self.0)
    }
}

/// Whether a board is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoBoard,
    HasBoard,
}

/// Summary sent to channel subscribers after every notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardChanged {
    /// Increases by one per notification.
    pub revision: u64,
    /// `None` when no board is open.
    pub board_name: Option<String>,
    pub width: usize,
    pub height: usize,
    pub players: usize,
}

impl BoardChanged {
    fn describe(revision: u64, board: Option<&Board>) -> Self {
        Self {
            revision,
            board_name: board.map(|b| b.name.clone()),
            width: board.map_or(0, Board::width),
            height: board.map_or(0, Board::height),
            players: board.map_or(0, |b| b.players().len()),
        }
    }
}

/// A change requested for the next call to
/// [`GameSession::process_pending`].
pub enum BoardCommand {
    /// Replace the board with a fresh, empty one.
    NewBoard(String),
    /// Replace the board wholesale.
    Replace(Board),
    /// Close the board.
    Close,
    /// Edit the open board in place; skipped when no board is open.
    Edit(Box<dyn FnOnce(&mut Board) + Send>),
    /// Notify observers without changing anything.
    Notify,
}

impl fmt::Debug for BoardCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NewBoard(name) => f.debug_tuple("NewBoard").field(name).finish(),
            Self::Replace(board) => f.debug_tuple("Replace").field(&board.name).finish(),
            Self::Close => f.write_str("Close"),
            Self::Edit(_) => f.write_str("Edit(..)"),
            Self::Notify => f.write_str("Notify"),
        }
    }
}

/// Holds the currently open board and the parties watching it.
pub struct GameSession {
    board: Option<Board>,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
    subscribers: Vec<Sender<BoardChanged>>,
    commands_tx: Sender<BoardCommand>,
    commands_rx: Receiver<BoardCommand>,
    revision: u64,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("board", &self.board.as_ref().map(|b| &b.name))
            .field("observers", &self.observers.len())
            .field("subscribers", &self.subscribers.len())
            .field("revision", &self.revision)
            .finish()
    }
}

impl GameSession {
    /// Creates a session with no board open.
    pub fn new() -> Self {
        let (commands_tx, commands_rx) = mpsc::channel();
        Self {
            board: None,
            observers: Vec::new(),
            next_observer: 0,
            subscribers: Vec::new(),
            commands_tx,
            commands_rx,
            revision: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        match self.board {
            Some(_) => SessionState::HasBoard,
            None => SessionState::NoBoard,
        }
    }

    /// Number of notifications sent so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The live board, not a copy.
    pub fn current_board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    /// Mutable access to the live board. Call [`notify`](Self::notify)
    /// afterwards if the change should be observed.
    pub fn current_board_mut(&mut self) -> Option<&mut Board> {
        self.board.as_mut()
    }

    /// Replaces the board and notifies observers.
    pub fn set_current_board(&mut self, board: Board) -> Result<()> {
        info!(board = %board.name, "Opened board");
        self.board = Some(board);
        self.notify()
    }

    /// Opens a fresh, empty board with the given name.
    pub fn new_board(&mut self, name: impl Into<String>) -> Result<()> {
        self.set_current_board(Board::new(name))
    }

    /// Closes the open board, if any, and notifies observers.
    ///
    /// Returns the board that was open.
    pub fn close_board(&mut self) -> Result<Option<Board>> {
        let closed = self.board.take();
        if let Some(board) = &closed {
            info!(board = %board.name, "Closed board");
        }
        self.notify()?;
        Ok(closed)
    }

    /// Applies `edit` to the open board, then notifies.
    ///
    /// Does nothing and returns `Ok(None)` when no board is open.
    pub fn update<R>(&mut self, edit: impl FnOnce(&mut Board) -> R) -> Result<Option<R>> {
        let Some(board) = self.board.as_mut() else {
            return Ok(None);
        };
        let out = edit(board);
        self.notify()?;
        Ok(Some(out))
    }

    /// Registers a callback run on every notification.
    pub fn register_observer<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(Option<&Board>) -> ObserverResult + 'static,
    {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        debug!(observer = %id, "Registered board observer");
        id
    }

    /// Removes an observer. Returns false if it was not registered.
    pub fn unregister_observer(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer, _)| *observer != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Subscribes to change summaries over a channel.
    ///
    /// Dropped receivers are pruned on the next notification.
    pub fn subscribe(&mut self) -> Receiver<BoardChanged> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Runs every observer in registration order with the current board.
    ///
    /// A failing or panicking observer does not stop the rest. Failures
    /// are logged and returned together as
    /// [`SessionError::ObserversFailed`].
    pub fn notify(&mut self) -> Result<()> {
        self.revision += 1;
        let board = self.board.as_ref();
        let mut failures = Vec::new();

        for (id, observer) in self.observers.iter_mut() {
            match panic::catch_unwind(AssertUnwindSafe(|| observer(board))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(observer = %id, error = %e, "Board observer failed");
                    failures.push(ObserverFailure {
                        observer: *id,
                        message: e.to_string(),
                    });
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!(observer = %id, panic = %message, "Board observer panicked");
                    failures.push(ObserverFailure {
                        observer: *id,
                        message: format!("panicked: {}", message),
                    });
                }
            }
        }

        let summary = BoardChanged::describe(self.revision, board);
        self.subscribers
            .retain(|tx| tx.send(summary.clone()).is_ok());

        debug!(
            revision = self.revision,
            observers = self.observers.len(),
            failed = failures.len(),
            "Notified board observers"
        );

        if failures.is_empty() {
            Ok(())
        } else {
            Err(SessionError::ObserversFailed(failures))
        }
    }

    /// Sender for queuing changes, usable from inside observers.
    pub fn command_sender(&self) -> Sender<BoardCommand> {
        self.commands_tx.clone()
    }

    /// Applies the commands queued so far, each followed by a notification.
    ///
    /// Commands queued while these run wait for the next call, so an
    /// observer that always queues a command cannot loop forever. Stops at
    /// the first failure; the commands after it are dropped. Returns how
    /// many commands were applied.
    pub fn process_pending(&mut self) -> Result<usize> {
        let pending: Vec<BoardCommand> = self.commands_rx.try_iter().collect();
        let mut applied = 0;

        for command in pending {
            debug!(command = ?command, "Applying queued board command");
            match command {
                BoardCommand::NewBoard(name) => self.new_board(name)?,
                BoardCommand::Replace(board) => self.set_current_board(board)?,
                BoardCommand::Close => {
                    self.close_board()?;
                }
                BoardCommand::Edit(edit) => {
                    self.update(edit)?;
                }
                BoardCommand::Notify => self.notify()?,
            }
            applied += 1;
        }

        Ok(applied)
    }

    /// Reads a board from `source` and opens it.
    ///
    /// The open board is left alone if the document cannot be decoded.
    pub fn load_board<R: Read>(&mut self, gateway: &PersistenceGateway, source: R) -> Result<()> {
        let mut board = Board::default();
        gateway.load(source, &mut board)?;
        self.set_current_board(board)
    }

    /// Writes the open board to `sink`.
    pub fn save_board<W: Write>(&self, gateway: &PersistenceGateway, sink: W) -> Result<()> {
        let board = self.board.as_ref().ok_or(SessionError::NoBoard)?;
        gateway.save(sink, board)?;
        Ok(())
    }

    /// Loads and opens the board file at `path`.
    pub fn load_board_from_path(
        &mut self,
        gateway: &PersistenceGateway,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let board: Board = gateway.load_from_path(path)?;
        self.set_current_board(board)
    }

    /// Saves the open board atomically, adding the `.jpdy` extension if
    /// missing. Returns the path written.
    pub fn save_board_to_path(
        &self,
        gateway: &PersistenceGateway,
        path: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let board = self.board.as_ref().ok_or(SessionError::NoBoard)?;
        let path = gateway.save_to_path(path, board)?;
        info!(board = %board.name, path = %path.display(), "Saved board");
        Ok(path)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jeopardy_models::{Category, Player, Question};
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::rc::Rc;
    use tempfile::tempdir;

    type Log = Rc<RefCell<Vec<String>>>;

    fn recording_observer(
        log: &Log,
        tag: &'static str,
    ) -> impl FnMut(Option<&Board>) -> ObserverResult {
        let log = Rc::clone(log);
        move |board| {
            let name = board.map_or("<none>".to_string(), |b| b.name.clone());
            log.borrow_mut().push(format!("{}:{}", tag, name));
            Ok(())
        }
    }

    #[test]
    fn test_new_session_has_no_board() {
        let session = GameSession::new();
        assert_eq!(session.state(), SessionState::NoBoard);
        assert!(session.current_board().is_none());
        assert_eq!(session.revision(), 0);
    }

    #[test]
    fn test_set_current_board_notifies_each_observer_once_in_order() {
        let log: Log = Rc::default();
        let mut session = GameSession::new();
        session.register_observer(recording_observer(&log, "first"));
        session.register_observer(recording_observer(&log, "second"));
        session.register_observer(recording_observer(&log, "third"));

        session.set_current_board(Board::new("Round 1")).unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["first:Round 1", "second:Round 1", "third:Round 1"]
        );
        assert_eq!(session.state(), SessionState::HasBoard);
    }

    #[test]
    fn test_new_board_replaces_existing() {
        let mut session = GameSession::new();
        session.new_board("Old").unwrap();
        session
            .current_board_mut()
            .unwrap()
            .add_categories([Category::new("A")]);

        session.new_board("New").unwrap();

        let board = session.current_board().unwrap();
        assert_eq!(board.name, "New");
        assert_eq!(board.width(), 0);
    }

    #[test]
    fn test_notify_passes_absent_board() {
        let log: Log = Rc::default();
        let mut session = GameSession::new();
        session.register_observer(recording_observer(&log, "o"));

        session.notify().unwrap();

        assert_eq!(*log.borrow(), vec!["o:<none>"]);
    }

    #[test]
    fn test_mutation_is_not_observed_until_notify() {
        let log: Log = Rc::default();
        let mut session = GameSession::new();
        session.new_board("b").unwrap();
        session.register_observer(recording_observer(&log, "o"));

        session.current_board_mut().unwrap().name = "renamed".to_string();
        assert!(log.borrow().is_empty());

        session.notify().unwrap();
        assert_eq!(*log.borrow(), vec!["o:renamed"]);
    }

    #[test]
    fn test_failing_and_panicking_observers_do_not_block_others() {
        let log: Log = Rc::default();
        let mut session = GameSession::new();
        let failing = session.register_observer(|_| Err("render failed".into()));
        let panicking = session.register_observer(|_| panic!("boom"));
        session.register_observer(recording_observer(&log, "last"));

        let err = session.new_board("b").unwrap_err();

        assert_eq!(*log.borrow(), vec!["last:b"]);
        match err {
            SessionError::ObserversFailed(failures) => {
                assert_eq!(failures.len(), 2);
                assert_eq!(failures[0].observer, failing);
                assert_eq!(failures[0].message, "render failed");
                assert_eq!(failures[1].observer, panicking);
                assert_eq!(failures[1].message, "panicked: boom");
            }
            other => panic!("unexpected error: {other}"),
        }
        // The board was still replaced.
        assert_eq!(session.current_board().unwrap().name, "b");
    }

    #[test]
    fn test_unregister_observer() {
        let log: Log = Rc::default();
        let mut session = GameSession::new();
        let id = session.register_observer(recording_observer(&log, "gone"));
        session.register_observer(recording_observer(&log, "kept"));

        assert!(session.unregister_observer(id));
        assert!(!session.unregister_observer(id));
        assert_eq!(session.observer_count(), 1);

        session.notify().unwrap();
        assert_eq!(*log.borrow(), vec!["kept:<none>"]);
    }

    #[test]
    fn test_close_board_returns_to_no_board() {
        let log: Log = Rc::default();
        let mut session = GameSession::new();
        session.new_board("b").unwrap();
        session.register_observer(recording_observer(&log, "o"));

        let closed = session.close_board().unwrap();

        assert_eq!(closed.unwrap().name, "b");
        assert_eq!(session.state(), SessionState::NoBoard);
        assert_eq!(*log.borrow(), vec!["o:<none>"]);
    }

    #[test]
    fn test_update_notifies_only_with_board() {
        let log: Log = Rc::default();
        let mut session = GameSession::new();
        session.register_observer(recording_observer(&log, "o"));

        assert_eq!(session.update(|b| b.width()).unwrap(), None);
        assert!(log.borrow().is_empty());

        session.new_board("b").unwrap();
        let result = session.update(|b| b.swap_categories(0, 1)).unwrap();
        assert!(result.unwrap().is_err());
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_subscribers_receive_summaries() {
        let mut session = GameSession::new();
        let rx = session.subscribe();
        let dropped = session.subscribe();
        drop(dropped);

        let mut board = Board::new("Round 1");
        let mut science = Category::new("Science");
        science.add_questions([Question::new("p", "a", 100), Question::new("p", "a", 200)]);
        board.add_categories([science]);
        board.add_players([Player::new("Joey")]);
        session.set_current_board(board).unwrap();

        let summary = rx.try_recv().unwrap();
        assert_eq!(
            summary,
            BoardChanged {
                revision: 1,
                board_name: Some("Round 1".to_string()),
                width: 1,
                height: 3,
                players: 1,
            }
        );
        assert_eq!(session.subscribers.len(), 1);
    }

    #[test]
    fn test_observer_queued_commands_run_on_next_tick() {
        let mut session = GameSession::new();
        let sender = session.command_sender();
        let seen: Log = Rc::default();
        let seen_in_observer = Rc::clone(&seen);

        // Re-queues a rename on every notification.
        session.register_observer(move |board| {
            if let Some(board) = board {
                seen_in_observer.borrow_mut().push(board.name.clone());
                let next = format!("{}+", board.name);
                sender
                    .send(BoardCommand::Edit(Box::new(move |b: &mut Board| b.name = next)))
                    .map_err(|e| e.to_string())?;
            }
            Ok(())
        });

        session.new_board("b").unwrap();
        assert_eq!(session.current_board().unwrap().name, "b");

        assert_eq!(session.process_pending().unwrap(), 1);
        assert_eq!(session.current_board().unwrap().name, "b+");

        assert_eq!(session.process_pending().unwrap(), 1);
        assert_eq!(*seen.borrow(), vec!["b", "b+", "b++"]);
    }

    #[test]
    fn test_process_pending_applies_in_order() {
        let mut session = GameSession::new();
        let sender = session.command_sender();
        sender.send(BoardCommand::NewBoard("first".into())).unwrap();
        sender.send(BoardCommand::Replace(Board::new("second"))).unwrap();
        sender.send(BoardCommand::Notify).unwrap();
        sender.send(BoardCommand::Close).unwrap();
        sender
            .send(BoardCommand::Edit(Box::new(|b: &mut Board| {
                b.name = "never".into();
            })))
            .unwrap();

        assert_eq!(session.process_pending().unwrap(), 5);
        assert_eq!(session.state(), SessionState::NoBoard);
        assert_eq!(session.revision(), 4);
        assert_eq!(session.process_pending().unwrap(), 0);
    }

    #[test]
    fn test_stream_round_trip() {
        let gateway = PersistenceGateway::new();
        let mut session = GameSession::new();
        session.new_board("Round 1").unwrap();
        session
            .current_board_mut()
            .unwrap()
            .add_players([Player::new("Joey")]);

        let mut buf = Vec::new();
        session.save_board(&gateway, &mut buf).unwrap();

        let mut other = GameSession::new();
        other.load_board(&gateway, Cursor::new(buf)).unwrap();
        assert_eq!(other.current_board(), session.current_board());
    }

    #[test]
    fn test_failed_load_keeps_open_board() {
        let gateway = PersistenceGateway::new();
        let mut session = GameSession::new();
        session.new_board("keep").unwrap();

        let err = session
            .load_board(&gateway, Cursor::new(b"not json".to_vec()))
            .unwrap_err();

        assert!(matches!(err, SessionError::Persistence(_)));
        assert_eq!(session.current_board().unwrap().name, "keep");
        assert_eq!(session.revision(), 1);
    }

    #[test]
    fn test_save_without_board() {
        let gateway = PersistenceGateway::new();
        let session = GameSession::new();
        let err = session.save_board(&gateway, Vec::new()).unwrap_err();
        assert!(matches!(err, SessionError::NoBoard));
    }

    #[test]
    fn test_path_round_trip() {
        let dir = tempdir().unwrap();
        let gateway = PersistenceGateway::new();
        let mut session = GameSession::new();
        session.new_board("Round 1").unwrap();

        let path = session
            .save_board_to_path(&gateway, dir.path().join("round1"))
            .unwrap();
        assert_eq!(path.extension().unwrap(), "jpdy");

        let mut other = GameSession::new();
        other.load_board_from_path(&gateway, &path).unwrap();
        assert_eq!(other.current_board().unwrap().name, "Round 1");
    }
}
