//! Session controller
//!
//! Owns the selection, the session phase and the engine handles of a running
//! game. The host loop owns the engine and lends it to each call, so there is
//! no global scene state and no re-entrant callbacks: contacts collected by
//! [`Engine::step`] are dispatched here, synchronously, in [`SessionController::tick`].

use crate::catalog::{BallCatalog, BallVariant};
use crate::engine::{BodyMaterial, Contact, Engine};
use crate::error::SessionError;
use crate::scene;
use crate::settings::{GameSettings, MovementMode};

use super::collision::Motion;
use super::input::InputEvent;
use super::state::{PartialField, PlayField, Selection, SessionState, reuse_or_create};

/// Selection screen -> play screen, plus input and collision handling
#[derive(Debug, Clone)]
pub struct SessionController {
    catalog: BallCatalog,
    settings: GameSettings,
    selection: Selection,
    state: SessionState,
    field: Option<PlayField>,
    /// Progress of a start that hasn't completed yet
    build: PartialField,
}

impl SessionController {
    pub fn new(catalog: BallCatalog, settings: GameSettings) -> Self {
        Self {
            catalog,
            settings,
            selection: Selection::default(),
            state: SessionState::Selecting,
            field: None,
            build: PartialField::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn catalog(&self) -> &BallCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Engine handles, present once playing
    pub fn play_field(&self) -> Option<&PlayField> {
        self.field.as_ref()
    }

    pub fn selected_variant(&self) -> Option<&BallVariant> {
        self.selection.variant().and_then(|id| self.catalog.get(id))
    }

    /// Pick a ball. Locked once the session has started.
    pub fn select(&mut self, variant_id: u32) -> Result<(), SessionError> {
        match self.selection.select(&self.catalog, variant_id) {
            Ok(()) => {
                if let Some(variant) = self.selected_variant() {
                    log::info!("Selected ball {} ({})", variant.id, variant.name);
                }
                Ok(())
            }
            Err(e) => {
                log::warn!("Selection of {} rejected: {}", variant_id, e);
                Err(e)
            }
        }
    }

    /// Build the play field and switch to `Playing`.
    ///
    /// State only changes once every engine call has succeeded; on error the
    /// session stays in `Selecting`. Objects the engine already created are
    /// kept and reused by the next attempt. Once the marble exists the
    /// selection is locked, since its skin can no longer change.
    pub fn start_session(&mut self, engine: &mut dyn Engine) -> Result<(), SessionError> {
        if self.state == SessionState::Playing {
            return Err(SessionError::AlreadyPlaying);
        }
        let variant = self
            .selected_variant()
            .ok_or(SessionError::NoVariantSelected)?
            .clone();
        if !self.build.is_empty() {
            log::info!("Resuming interrupted session start");
        }

        let settings = &self.settings;
        let build = &mut self.build;

        if !build.physics {
            engine.enable_physics(settings.gravity)?;
            build.physics = true;
        }

        let ground = reuse_or_create(&mut build.ground, || {
            engine.create_static_geometry(
                &scene::ground(),
                &BodyMaterial::fixed(settings.obstacle_restitution),
            )
        })?;

        let marble = reuse_or_create(&mut build.marble, || {
            engine.create_body(&scene::marble(settings, &variant))
        })?;
        self.selection.lock()?;

        let descs = scene::obstacles(settings.obstacle_restitution);
        for desc in descs.iter().skip(build.obstacles.len()) {
            let handle = engine.create_body(desc)?;
            build.obstacles.push(handle);
        }
        let mut obstacles = build.obstacles.clone();
        obstacles.sort();

        let free_camera = reuse_or_create(&mut build.free_camera, || {
            engine.attach_camera(&scene::free_camera())
        })?;
        let follow_camera = reuse_or_create(&mut build.follow_camera, || {
            engine.attach_camera(&scene::follow_camera(marble))
        })?;
        engine.set_active_camera(follow_camera)?;

        if !build.watching {
            engine.watch_contacts(marble, &obstacles)?;
            build.watching = true;
        }

        self.build = PartialField::default();
        self.field = Some(PlayField {
            marble,
            ground,
            obstacles,
            free_camera,
            follow_camera,
        });
        self.state = SessionState::Playing;

        log::info!(
            "Session started with ball {} ({}), {} obstacles",
            variant.id,
            variant.name,
            self.field.as_ref().map_or(0, |f| f.obstacles.len())
        );
        Ok(())
    }

    /// Apply one key press to the marble. Dropped unless playing.
    pub fn on_input(&mut self, engine: &mut dyn Engine, event: InputEvent) -> Result<(), SessionError> {
        let Some(field) = self.playing_field() else {
            log::debug!("Ignoring {:?} before session start", event.direction);
            return Ok(());
        };
        let marble = field.marble;
        let delta = event.direction.delta(self.settings.move_speed);
        let position = engine.position(marble)?;

        match self.settings.movement {
            MovementMode::Displace => engine.set_position(marble, position + delta)?,
            MovementMode::Impulse => engine.apply_impulse(marble, delta, position)?,
        }

        log::debug!("{:?} at {:.0}ms -> {:?}", event.direction, event.timestamp_ms, delta);
        Ok(())
    }

    /// Map a DOM key name and feed it to [`Self::on_input`]
    pub fn on_key(
        &mut self,
        engine: &mut dyn Engine,
        key: &str,
        timestamp_ms: f64,
    ) -> Result<(), SessionError> {
        match InputEvent::from_key(key, timestamp_ms) {
            Some(event) => self.on_input(engine, event),
            None => Ok(()),
        }
    }

    /// Respond to a contact reported by the engine.
    ///
    /// Returns the marble's motion after the response, or `None` when the
    /// contact is not marble-vs-obstacle (or the session isn't running).
    pub fn on_contact(
        &mut self,
        engine: &mut dyn Engine,
        contact: Contact,
    ) -> Result<Option<Motion>, SessionError> {
        let Some(field) = self.playing_field() else {
            return Ok(None);
        };
        if contact.body != field.marble || !field.is_obstacle(contact.other) {
            return Ok(None);
        }

        let after = self.settings.collision_policy.apply(engine, contact.body)?;
        log::debug!("Collision with {:?}, marble motion now {:?}", contact.other, after);
        Ok(Some(after))
    }

    /// Advance the engine one step and respond to the contacts it reports.
    ///
    /// Returns how many contacts triggered a response. Every contact is
    /// handled even if an earlier one fails; the first failure is returned
    /// after the rest are done.
    pub fn tick(&mut self, engine: &mut dyn Engine, dt: f32) -> Result<usize, SessionError> {
        let contacts = engine.step(dt);
        let mut responses = 0;
        let mut first_error = None;
        for contact in contacts {
            match self.on_contact(engine, contact) {
                Ok(Some(_)) => responses += 1,
                Ok(None) => {}
                Err(e) => {
                    log::warn!("Contact {:?} vs {:?} not handled: {}", contact.body, contact.other, e);
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(responses),
        }
    }

    fn playing_field(&self) -> Option<&PlayField> {
        match self.state {
            SessionState::Playing => self.field.as_ref(),
            SessionState::Selecting => None,
        }
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(BallCatalog::standard(), GameSettings::default())
    }
}
