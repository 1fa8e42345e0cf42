use tokio::sync::watch;

use crate::models::BoardStatus;

#[derive(Clone)]
pub struct AppState {
    /// Latest board status, written by the board runner
    pub board: watch::Receiver<BoardStatus>,
}

impl AppState {
    pub fn new(board: watch::Receiver<BoardStatus>) -> Self {
        Self { board }
    }

    /// A copy of the current status with expired events dropped.
    pub fn current(&self) -> BoardStatus {
        let mut status = self.board.borrow().clone();
        if let Some(view) = status.view.as_mut() {
            view.prune_expired(chrono::Utc::now());
        }
        status
    }
}
