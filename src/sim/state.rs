//! Session phase and ball selection
//!
//! The only transition in the game is `Selecting -> Playing`. Once playing,
//! the selection is locked for the rest of the session.

use serde::{Deserialize, Serialize};

use crate::catalog::BallCatalog;
use crate::engine::{BodyHandle, CameraHandle};
use crate::error::SessionError;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    /// Choosing a ball, nothing simulated yet
    #[default]
    Selecting,
    /// Marble spawned, physics running, input live
    Playing,
}

/// The player's ball choice
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    variant: Option<u32>,
    locked: bool,
}

impl Selection {
    /// Record `id` as the chosen variant.
    ///
    /// Choosing again before the session starts replaces the previous pick.
    pub fn select(&mut self, catalog: &BallCatalog, id: u32) -> Result<(), SessionError> {
        if self.locked {
            return Err(SessionError::AlreadyPlaying);
        }
        if !catalog.contains(id) {
            return Err(SessionError::InvalidVariant(id));
        }
        self.variant = Some(id);
        Ok(())
    }

    pub fn variant(&self) -> Option<u32> {
        self.variant
    }

    /// Freeze the selection; only valid with a variant chosen
    pub(crate) fn lock(&mut self) -> Result<u32, SessionError> {
        let id = self.variant.ok_or(SessionError::NoVariantSelected)?;
        self.locked = true;
        Ok(id)
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

/// Engine handles for a running session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayField {
    pub marble: BodyHandle,
    pub ground: BodyHandle,
    /// Sorted, so membership checks can binary search
    pub obstacles: Vec<BodyHandle>,
    pub free_camera: CameraHandle,
    pub follow_camera: CameraHandle,
}

impl PlayField {
    pub fn is_obstacle(&self, body: BodyHandle) -> bool {
        self.obstacles.binary_search(&body).is_ok()
    }
}

/// Engine objects created so far by an unfinished start.
///
/// Kept across a failed attempt so a retry picks up where it stopped
/// instead of spawning a second copy of the scene.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialField {
    pub physics: bool,
    pub ground: Option<BodyHandle>,
    pub marble: Option<BodyHandle>,
    /// In scene order, not sorted
    pub obstacles: Vec<BodyHandle>,
    pub free_camera: Option<CameraHandle>,
    pub follow_camera: Option<CameraHandle>,
    pub watching: bool,
}

impl PartialField {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Reuse the handle in `slot`, or create it and remember it
pub(crate) fn reuse_or_create<T: Copy, E>(
    slot: &mut Option<T>,
    create: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    if let Some(handle) = *slot {
        return Ok(handle);
    }
    let handle = create()?;
    *slot = Some(handle);
    Ok(handle)
}
