/// Recorder lifecycle state machine.
///
/// State transitions:
/// ```text
/// (build ok) → idle → recording → idle → released
///                ↑________________|         (terminal)
/// ```
///
/// `Released` accepts no further control calls; they are no-ops, never
/// faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
    Released,
}

impl RecorderState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    pub fn is_released(&self) -> bool {
        matches!(self, Self::Released)
    }
}

/// Player lifecycle state machine.
///
/// State transitions:
/// ```text
/// (build ok) → stopped → playing → stopped → released
///                 ↑________________|           (terminal)
/// ```
///
/// The `playing → stopped` edge is taken both by an external `stop()` and by
/// the playback worker when the file ends or cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Stopped,
    Playing,
    Released,
}

impl PlayerState {
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    pub fn is_released(&self) -> bool {
        matches!(self, Self::Released)
    }
}
