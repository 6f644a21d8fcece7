//! Full session runs against the headless engine

use glam::Vec3;
use marble_roll::consts::SIM_DT;
use marble_roll::engine::{
    BodyDesc, BodyHandle, BodyMaterial, CameraHandle, CameraRig, Contact, Engine, StaticGeometry,
};
use marble_roll::{
    BallCatalog, CollisionPolicy, Direction, EngineError, GameSettings, HeadlessEngine,
    InputEvent, MovementMode, SessionController, SessionError, SessionState,
};

fn press(dir: Direction) -> InputEvent {
    InputEvent::new(dir, 0.0)
}

fn started(settings: GameSettings, variant: u32) -> (SessionController, HeadlessEngine) {
    let mut engine = HeadlessEngine::new();
    let mut session = SessionController::new(BallCatalog::standard(), settings);
    session.select(variant).unwrap();
    session.start_session(&mut engine).unwrap();
    (session, engine)
}

/// Headless engine that fails chosen calls a set number of times and can
/// inject extra contacts into the next step
struct FlakyEngine {
    inner: HeadlessEngine,
    watch_failures: u32,
    velocity_failures: u32,
    injected: Vec<Contact>,
}

impl FlakyEngine {
    fn new() -> Self {
        Self {
            inner: HeadlessEngine::new(),
            watch_failures: 0,
            velocity_failures: 0,
            injected: Vec::new(),
        }
    }
}

fn countdown(remaining: &mut u32, call: &str) -> Result<(), EngineError> {
    if *remaining > 0 {
        *remaining -= 1;
        return Err(EngineError::Rejected(format!("{} unavailable", call)));
    }
    Ok(())
}

impl Engine for FlakyEngine {
    fn enable_physics(&mut self, gravity: Vec3) -> Result<(), EngineError> {
        self.inner.enable_physics(gravity)
    }

    fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, EngineError> {
        self.inner.create_body(desc)
    }

    fn create_static_geometry(
        &mut self,
        geometry: &StaticGeometry,
        material: &BodyMaterial,
    ) -> Result<BodyHandle, EngineError> {
        self.inner.create_static_geometry(geometry, material)
    }

    fn position(&self, body: BodyHandle) -> Result<Vec3, EngineError> {
        self.inner.position(body)
    }

    fn set_position(&mut self, body: BodyHandle, position: Vec3) -> Result<(), EngineError> {
        self.inner.set_position(body, position)
    }

    fn linear_velocity(&self, body: BodyHandle) -> Option<Vec3> {
        self.inner.linear_velocity(body)
    }

    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec3) -> Result<(), EngineError> {
        countdown(&mut self.velocity_failures, "setLinearVelocity")?;
        self.inner.set_linear_velocity(body, velocity)
    }

    fn angular_velocity(&self, body: BodyHandle) -> Option<Vec3> {
        self.inner.angular_velocity(body)
    }

    fn set_angular_velocity(&mut self, body: BodyHandle, velocity: Vec3) -> Result<(), EngineError> {
        self.inner.set_angular_velocity(body, velocity)
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec3, point: Vec3) -> Result<(), EngineError> {
        self.inner.apply_impulse(body, impulse, point)
    }

    fn watch_contacts(&mut self, body: BodyHandle, against: &[BodyHandle]) -> Result<(), EngineError> {
        countdown(&mut self.watch_failures, "watchContacts")?;
        self.inner.watch_contacts(body, against)
    }

    fn step(&mut self, dt: f32) -> Vec<Contact> {
        let mut contacts = self.inner.step(dt);
        contacts.append(&mut self.injected);
        contacts
    }

    fn attach_camera(&mut self, rig: &CameraRig) -> Result<CameraHandle, EngineError> {
        self.inner.attach_camera(rig)
    }

    fn set_active_camera(&mut self, camera: CameraHandle) -> Result<(), EngineError> {
        self.inner.set_active_camera(camera)
    }
}

fn assert_vec_near(actual: Vec3, expected: Vec3) {
    assert!(
        (actual - expected).length() < 1e-5,
        "expected {:?}, got {:?}",
        expected,
        actual
    );
}

#[test]
fn test_every_variant_starts_exactly_once() {
    let catalog = BallCatalog::standard();
    for variant in catalog.iter() {
        let mut engine = HeadlessEngine::new();
        let mut session = SessionController::default();
        session.select(variant.id).unwrap();
        assert_eq!(session.start_session(&mut engine), Ok(()));
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(
            session.start_session(&mut engine),
            Err(SessionError::AlreadyPlaying)
        );
        assert_eq!(session.state(), SessionState::Playing);
    }
}

#[test]
fn test_start_without_selection() {
    let mut engine = HeadlessEngine::new();
    let mut session = SessionController::default();
    assert_eq!(
        session.start_session(&mut engine),
        Err(SessionError::NoVariantSelected)
    );
    assert_eq!(session.state(), SessionState::Selecting);
    assert!(!engine.physics_enabled());
    assert!(session.play_field().is_none());
}

#[test]
fn test_invalid_variant() {
    let mut session = SessionController::default();
    assert_eq!(session.select(6), Err(SessionError::InvalidVariant(6)));
    assert!(session.selected_variant().is_none());
}

#[test]
fn test_selection_locked_after_start() {
    let (mut session, _engine) = started(GameSettings::default(), 1);
    assert_eq!(session.select(4), Err(SessionError::AlreadyPlaying));
    assert_eq!(session.selected_variant().map(|v| v.id), Some(1));
}

#[test]
fn test_start_builds_scene() {
    let (session, engine) = started(GameSettings::default(), 0);
    let field = session.play_field().unwrap();

    assert_eq!(engine.gravity(), Some(Vec3::new(0.0, -9.81, 0.0)));
    // ground + marble + 3 obstacles
    assert_eq!(engine.body_count(), 5);
    assert_eq!(field.obstacles.len(), 3);
    assert_eq!(engine.find_body("marble"), Some(field.marble));
    assert_eq!(engine.find_body("ground"), Some(field.ground));
    assert_eq!(engine.position(field.marble).unwrap(), Vec3::new(0.0, 0.5, 0.0));

    assert_eq!(engine.active_camera(), Some(field.follow_camera));
    match engine.camera(field.follow_camera) {
        Some(CameraRig::Follow { target, .. }) => assert_eq!(*target, field.marble),
        other => panic!("expected follow camera, got {:?}", other),
    }
    assert!(matches!(
        engine.camera(field.free_camera),
        Some(CameraRig::Free { .. })
    ));
}

#[test]
fn test_input_before_start_is_dropped() {
    let mut engine = HeadlessEngine::new();
    let mut session = SessionController::default();
    session.select(0).unwrap();
    assert_eq!(session.on_input(&mut engine, press(Direction::Up)), Ok(()));

    session.start_session(&mut engine).unwrap();
    let marble = session.play_field().unwrap().marble;
    // Nothing was queued
    assert_eq!(engine.position(marble).unwrap(), Vec3::new(0.0, 0.5, 0.0));
}

#[test]
fn test_up_then_right() {
    let (mut session, mut engine) = started(GameSettings::default(), 0);
    let marble = session.play_field().unwrap().marble;

    session.on_input(&mut engine, press(Direction::Up)).unwrap();
    assert_vec_near(engine.position(marble).unwrap(), Vec3::new(0.0, 0.5, 0.2));

    session.on_input(&mut engine, press(Direction::Right)).unwrap();
    assert_vec_near(engine.position(marble).unwrap(), Vec3::new(0.2, 0.5, 0.2));
}

#[test]
fn test_scenario_variant_three() {
    let (mut session, mut engine) = started(GameSettings::default(), 3);
    let marble = session.play_field().unwrap().marble;
    let origin = engine.position(marble).unwrap();

    for dir in [Direction::Up, Direction::Up, Direction::Left] {
        session.on_input(&mut engine, press(dir)).unwrap();
    }
    let displacement = engine.position(marble).unwrap() - origin;
    assert_vec_near(displacement, Vec3::new(-0.2, 0.0, 0.4));
}

#[test]
fn test_keys_route_through_mapper() {
    let (mut session, mut engine) = started(GameSettings::default(), 0);
    let marble = session.play_field().unwrap().marble;

    session.on_key(&mut engine, "ArrowDown", 10.0).unwrap();
    session.on_key(&mut engine, "Escape", 20.0).unwrap();
    assert_vec_near(engine.position(marble).unwrap(), Vec3::new(0.0, 0.5, -0.2));
}

#[test]
fn test_impulse_movement_mode() {
    let settings = GameSettings {
        movement: MovementMode::Impulse,
        ..Default::default()
    };
    let (mut session, mut engine) = started(settings, 0);
    let marble = session.play_field().unwrap().marble;

    session.on_input(&mut engine, press(Direction::Right)).unwrap();
    // Position untouched until the engine steps; marble has mass 1
    assert_eq!(engine.position(marble).unwrap(), Vec3::new(0.0, 0.5, 0.0));
    assert_vec_near(engine.linear_velocity(marble).unwrap(), Vec3::new(0.2, 0.0, 0.0));
}

fn seed_motion(engine: &mut HeadlessEngine, session: &SessionController) {
    let marble = session.play_field().unwrap().marble;
    engine.set_linear_velocity(marble, Vec3::new(1.0, 0.0, 1.0)).unwrap();
    engine.set_angular_velocity(marble, Vec3::new(0.0, 2.0, 0.0)).unwrap();
}

fn first_obstacle_contact(session: &SessionController) -> Contact {
    let field = session.play_field().unwrap();
    Contact {
        body: field.marble,
        other: field.obstacles[0],
    }
}

#[test]
fn test_hard_stop_policy() {
    let (mut session, mut engine) = started(GameSettings::default(), 0);
    seed_motion(&mut engine, &session);
    let contact = first_obstacle_contact(&session);

    let after = session.on_contact(&mut engine, contact).unwrap();
    assert!(after.is_some());
    assert_eq!(engine.linear_velocity(contact.body), Some(Vec3::ZERO));
    assert_eq!(engine.angular_velocity(contact.body), Some(Vec3::ZERO));
}

#[test]
fn test_damped_policy() {
    let settings = GameSettings {
        collision_policy: CollisionPolicy::damped(),
        ..Default::default()
    };
    let (mut session, mut engine) = started(settings, 0);
    seed_motion(&mut engine, &session);
    let contact = first_obstacle_contact(&session);

    session.on_contact(&mut engine, contact).unwrap();
    assert_vec_near(
        engine.linear_velocity(contact.body).unwrap(),
        Vec3::new(0.5, 0.0, 0.5),
    );
    assert_vec_near(
        engine.angular_velocity(contact.body).unwrap(),
        Vec3::new(0.0, 0.6, 0.0),
    );
}

#[test]
fn test_missing_velocity_counts_as_zero() {
    let settings = GameSettings {
        collision_policy: CollisionPolicy::damped(),
        ..Default::default()
    };
    let (mut session, mut engine) = started(settings, 0);
    let contact = first_obstacle_contact(&session);
    assert_eq!(engine.linear_velocity(contact.body), None);

    session.on_contact(&mut engine, contact).unwrap();
    assert_eq!(engine.linear_velocity(contact.body), Some(Vec3::ZERO));
    assert_eq!(engine.angular_velocity(contact.body), Some(Vec3::ZERO));
}

#[test]
fn test_non_obstacle_contact_ignored() {
    let (mut session, mut engine) = started(GameSettings::default(), 0);
    seed_motion(&mut engine, &session);
    let field = session.play_field().unwrap().clone();

    let ground_contact = Contact {
        body: field.marble,
        other: field.ground,
    };
    assert_eq!(session.on_contact(&mut engine, ground_contact), Ok(None));
    assert_eq!(
        engine.linear_velocity(field.marble),
        Some(Vec3::new(1.0, 0.0, 1.0))
    );
}

#[test]
fn test_tick_dispatches_engine_contacts() {
    let (mut session, mut engine) = started(GameSettings::default(), 0);
    let marble = session.play_field().unwrap().marble;

    assert_eq!(session.tick(&mut engine, SIM_DT), Ok(0));

    // Roll into the red box at (2, 0.5, 2)
    engine.set_position(marble, Vec3::new(1.6, 0.5, 1.6)).unwrap();
    engine.set_linear_velocity(marble, Vec3::new(1.0, 0.0, 1.0)).unwrap();
    assert_eq!(session.tick(&mut engine, SIM_DT), Ok(1));
    assert_eq!(engine.linear_velocity(marble), Some(Vec3::ZERO));

    // Still touching, no new contact
    assert_eq!(session.tick(&mut engine, SIM_DT), Ok(0));
}

#[test]
fn test_lost_marble_is_engine_state_error() {
    let (mut session, mut engine) = started(GameSettings::default(), 0);
    let marble = session.play_field().unwrap().marble;
    engine.forget_body(marble);

    assert_eq!(
        session.on_input(&mut engine, press(Direction::Up)),
        Err(SessionError::EngineState(EngineError::UnknownBody(marble)))
    );
}

#[test]
fn test_retry_after_failed_start_reuses_scene() {
    let mut engine = FlakyEngine::new();
    engine.watch_failures = 1;
    let mut session = SessionController::default();
    session.select(5).unwrap();

    assert!(matches!(
        session.start_session(&mut engine),
        Err(SessionError::EngineState(EngineError::Rejected(_)))
    ));
    assert_eq!(session.state(), SessionState::Selecting);
    assert!(session.play_field().is_none());
    assert_eq!(engine.inner.body_count(), 5);
    assert_eq!(engine.inner.camera_count(), 2);
    // The marble already wears variant 5
    assert_eq!(session.select(1), Err(SessionError::AlreadyPlaying));

    assert_eq!(session.start_session(&mut engine), Ok(()));
    assert_eq!(session.state(), SessionState::Playing);
    let field = session.play_field().unwrap().clone();
    assert_eq!(engine.inner.body_count(), 5);
    assert_eq!(engine.inner.camera_count(), 2);
    assert_eq!(engine.inner.find_body("marble"), Some(field.marble));
    assert_eq!(field.obstacles.len(), 3);
    assert_eq!(engine.inner.active_camera(), Some(field.follow_camera));
    assert_eq!(session.selected_variant().map(|v| v.id), Some(5));

    // Contacts are watched after the retry
    engine.inner.set_position(field.marble, Vec3::new(1.6, 0.5, 1.6)).unwrap();
    engine.inner.set_linear_velocity(field.marble, Vec3::new(1.0, 0.0, 1.0)).unwrap();
    assert_eq!(session.tick(&mut engine, SIM_DT), Ok(1));
}

#[test]
fn test_tick_handles_every_contact_after_a_failure() {
    let mut engine = FlakyEngine::new();
    let mut session = SessionController::default();
    session.select(0).unwrap();
    session.start_session(&mut engine).unwrap();
    let field = session.play_field().unwrap().clone();
    engine.inner.set_linear_velocity(field.marble, Vec3::new(1.0, 0.0, 1.0)).unwrap();
    engine.inner.set_angular_velocity(field.marble, Vec3::new(0.0, 2.0, 0.0)).unwrap();

    engine.velocity_failures = 1;
    engine.injected = field
        .obstacles
        .iter()
        .take(2)
        .map(|&other| Contact {
            body: field.marble,
            other,
        })
        .collect();

    assert!(matches!(
        session.tick(&mut engine, SIM_DT),
        Err(SessionError::EngineState(EngineError::Rejected(_)))
    ));
    // The second contact still stopped the marble
    assert_eq!(engine.inner.linear_velocity(field.marble), Some(Vec3::ZERO));
    assert_eq!(engine.inner.angular_velocity(field.marble), Some(Vec3::ZERO));

    assert_eq!(session.tick(&mut engine, SIM_DT), Ok(0));
}
