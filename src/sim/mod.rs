//! Session core
//!
//! All decision logic between the player and the scene engine lives here:
//! - Ball selection and the one-way `Selecting -> Playing` transition
//! - Arrow key -> marble movement
//! - Collision response policy
//!
//! No rendering, no physics integration; the engine is reached only through
//! [`crate::engine::Engine`].

pub mod collision;
pub mod input;
pub mod session;
pub mod state;

pub use collision::{CollisionPolicy, Motion};
pub use input::{Direction, InputEvent};
pub use session::SessionController;
pub use state::{PartialField, PlayField, Selection, SessionState};
