/// Lifecycle of a single upload or download call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPhase {
    Idle,
    /// Start message sent, waiting for the server to accept.
    Announced,
    Transferring,
    Completed,
    /// Stopped by the user.
    Aborted,
    Failed,
}

impl TransferPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted | Self::Failed)
    }
}

/// Byte accounting for one transfer.
///
/// `transferred` only grows and never passes `file_size`.
#[derive(Debug, Clone)]
pub struct TransferState {
    file_size: i64,
    transferred: i64,
    phase: TransferPhase,
}

impl TransferState {
    pub fn new(file_size: i64) -> Self {
        Self {
            file_size,
            transferred: 0,
            phase: TransferPhase::Idle,
        }
    }

    pub fn announce(&mut self) {
        self.phase = TransferPhase::Announced;
    }

    pub fn begin(&mut self) {
        self.phase = TransferPhase::Transferring;
    }

    /// Adds `bytes` and returns the new cumulative count, or `None` if that
    /// would overrun the announced size.
    pub fn advance(&mut self, bytes: usize) -> Option<i64> {
        let next = self.transferred.checked_add(bytes as i64)?;
        if next > self.file_size {
            return None;
        }
        self.transferred = next;
        Some(next)
    }

    pub fn complete(&mut self) {
        self.phase = TransferPhase::Completed;
    }

    pub fn abort(&mut self) {
        self.phase = TransferPhase::Aborted;
    }

    pub fn fail(&mut self) {
        self.phase = TransferPhase::Failed;
    }

    pub fn phase(&self) -> TransferPhase {
        self.phase
    }

    pub fn file_size(&self) -> i64 {
        self.file_size
    }

    pub fn transferred(&self) -> i64 {
        self.transferred
    }

    /// `true` once every announced byte has moved.
    pub fn is_done(&self) -> bool {
        self.transferred == self.file_size
    }
}
