//! The two-valued signal every population follows

/// Which configuration the scene is heading toward.
///
/// The signal flips instantly; each population smooths the change with its
/// own progress driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeState {
    /// Scattered chaos cloud
    #[default]
    Dispersed,
    /// Assembled tree silhouette
    Assembled,
}

impl TreeState {
    /// Target value for a progress driver (0.0 dispersed, 1.0 assembled)
    pub fn target(self) -> f32 {
        match self {
            TreeState::Dispersed => 0.0,
            TreeState::Assembled => 1.0,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TreeState::Dispersed => TreeState::Assembled,
            TreeState::Assembled => TreeState::Dispersed,
        }
    }

    pub fn is_assembled(self) -> bool {
        self == TreeState::Assembled
    }
}

impl From<bool> for TreeState {
    fn from(assembled: bool) -> Self {
        if assembled {
            TreeState::Assembled
        } else {
            TreeState::Dispersed
        }
    }
}

/// Everything a population needs to advance one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    pub state: TreeState,
    /// Seconds since the previous frame
    pub elapsed: f32,
    /// Seconds since the scene started (drives blink, breathing and spin)
    pub total_elapsed: f64,
}

impl FrameInput {
    pub fn new(state: TreeState, elapsed: f32, total_elapsed: f64) -> Self {
        Self {
            state,
            elapsed,
            total_elapsed,
        }
    }
}
