//! Throttling directions and the live direction configuration.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

/// Which throttling axis a cycle iteration targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Enabled directions, as carried by `/automate` and `/settings` bodies.
/// Missing fields default to enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionSet {
    #[serde(default = "default_enabled")]
    pub up: bool,
    #[serde(default = "default_enabled")]
    pub down: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for DirectionSet {
    fn default() -> Self {
        Self::both()
    }
}

impl DirectionSet {
    pub fn both() -> Self {
        Self {
            up: true,
            down: true,
        }
    }

    pub fn none() -> Self {
        Self {
            up: false,
            down: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.up && !self.down
    }

    /// Enabled directions in cycle order, Up before Down.
    pub fn iter(&self) -> impl Iterator<Item = Direction> {
        let up = self.up.then_some(Direction::Up);
        let down = self.down.then_some(Direction::Down);
        up.into_iter().chain(down)
    }
}

/// Shared, mutable direction configuration. The cycling loop reads a fresh
/// snapshot at the start of every iteration, so `/settings` updates take
/// effect at the next iteration boundary rather than retroactively.
#[derive(Debug)]
pub struct DirectionConfig {
    up: AtomicBool,
    down: AtomicBool,
}

impl Default for DirectionConfig {
    fn default() -> Self {
        Self::new(DirectionSet::both())
    }
}

impl DirectionConfig {
    pub fn new(set: DirectionSet) -> Self {
        Self {
            up: AtomicBool::new(set.up),
            down: AtomicBool::new(set.down),
        }
    }

    pub fn store(&self, set: DirectionSet) {
        self.up.store(set.up, Ordering::SeqCst);
        self.down.store(set.down, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> DirectionSet {
        DirectionSet {
            up: self.up.load(Ordering::SeqCst),
            down: self.down.load(Ordering::SeqCst),
        }
    }
}
