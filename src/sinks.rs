use crate::board::{CellId, CELL_COUNT};

/// Passive display the session writes to
pub trait ViewSink {
    fn set_cell_active(&mut self, cell: CellId, active: bool);
    fn set_score(&mut self, score: u32);
    fn set_time_left(&mut self, seconds: i32);
    /// Lives arrive pre-formatted, e.g. "x3"
    fn set_lives(&mut self, lives: &str);
}

/// End-of-game message channel. The front-end decides how to block on it.
pub trait Notifier {
    fn notify(&mut self, message: &str);
}

/// View model rendered by the ui module
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardView {
    pub active: [bool; CELL_COUNT],
    pub score: String,
    pub time_left: String,
    pub lives: String,
}

impl BoardView {
    pub fn is_active(&self, cell: CellId) -> bool {
        self.active[cell.index()]
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|a| **a).count()
    }
}

impl ViewSink for BoardView {
    fn set_cell_active(&mut self, cell: CellId, active: bool) {
        self.active[cell.index()] = active;
    }

    fn set_score(&mut self, score: u32) {
        self.score = score.to_string();
    }

    fn set_time_left(&mut self, seconds: i32) {
        self.time_left = seconds.to_string();
    }

    fn set_lives(&mut self, lives: &str) {
        self.lives = lives.to_string();
    }
}

/// Holds the last notification until the front-end picks it up.
/// Every message is also kept in `history` so repeated notifications are observable.
#[derive(Debug, Clone, Default)]
pub struct PendingNotice {
    pending: Option<String>,
    pub history: Vec<String>,
}

impl PendingNotice {
    pub fn take(&mut self) -> Option<String> {
        self.pending.take()
    }

    pub fn peek(&self) -> Option<&str> {
        self.pending.as_deref()
    }
}

impl Notifier for PendingNotice {
    fn notify(&mut self, message: &str) {
        self.pending = Some(message.to_string());
        self.history.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_view_tracks_markers() {
        let mut view = BoardView::default();
        let c = CellId::from_index(2).unwrap();
        view.set_cell_active(c, true);
        assert!(view.is_active(c));
        assert_eq!(view.active_count(), 1);
        view.set_cell_active(c, false);
        assert_eq!(view.active_count(), 0);
    }

    #[test]
    fn board_view_text_fields() {
        let mut view = BoardView::default();
        view.set_score(12);
        view.set_time_left(-1);
        view.set_lives("x2");
        assert_eq!(view.score, "12");
        assert_eq!(view.time_left, "-1");
        assert_eq!(view.lives, "x2");
    }

    #[test]
    fn pending_notice_take_clears() {
        let mut n = PendingNotice::default();
        n.notify("bye");
        assert_eq!(n.peek(), Some("bye"));
        assert_eq!(n.take().as_deref(), Some("bye"));
        assert!(n.take().is_none());
        assert_eq!(n.history, vec!["bye".to_string()]);
    }
}
