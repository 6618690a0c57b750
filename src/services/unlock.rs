use std::time::Instant;

use crate::config::{PULLS_TO_UNLOCK, PULL_COOLDOWN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockState {
    /// Only the newest batch is visible.
    Locked,
    /// Counting top-edge pulls.
    Unlocking { pulls: u8 },
    /// Full history is visible and pages backward on demand.
    Unlocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullAction {
    Ignored,
    Counted,
    Unlock,
    LoadOlder,
}

/// Gate over full history: repeated pulls at the top edge unlock it.
///
/// A pull only counts when it is the first one or arrives at least
/// `PULL_COOLDOWN` after the previous counted pull, so one long gesture is
/// not taken for several. There is no way back to `Locked`.
#[derive(Debug)]
pub struct PullToUnlock {
    state: UnlockState,
    last_pull: Option<Instant>,
    exhausted: bool,
}

impl Default for PullToUnlock {
    fn default() -> Self {
        Self::new()
    }
}

impl PullToUnlock {
    pub fn new() -> Self {
        Self {
            state: UnlockState::Locked,
            last_pull: None,
            exhausted: false,
        }
    }

    pub fn state(&self) -> UnlockState {
        self.state
    }

    pub fn is_unlocked(&self) -> bool {
        self.state == UnlockState::Unlocked
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// History has no older pages left; further pulls do nothing.
    pub fn mark_exhausted(&mut self) {
        self.exhausted = true;
    }

    pub fn on_top_reached(&mut self, now: Instant) -> PullAction {
        if let Some(last) = self.last_pull {
            if now.saturating_duration_since(last) < PULL_COOLDOWN {
                return PullAction::Ignored;
            }
        }
        self.last_pull = Some(now);

        match self.state {
            UnlockState::Locked => self.count_pull(0),
            UnlockState::Unlocking { pulls } => self.count_pull(pulls),
            UnlockState::Unlocked if self.is_exhausted() => PullAction::Ignored,
            UnlockState::Unlocked => PullAction::LoadOlder,
        }
    }

    fn count_pull(&mut self, pulls: u8) -> PullAction {
        let pulls = pulls + 1;
        if pulls >= PULLS_TO_UNLOCK {
            tracing::info!("Full history unlocked");
            self.state = UnlockState::Unlocked;
            PullAction::Unlock
        } else {
            self.state = UnlockState::Unlocking { pulls };
            PullAction::Counted
        }
    }
}
