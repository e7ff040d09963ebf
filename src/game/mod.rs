//! The frame loop: one [`Game::tick`] per display refresh.
//!
//! Every tick runs the same stages, in order:
//!
//! 1. pending commands are applied and, while input is enabled, the player reads its input;
//! 2. every entity is updated (and moved), each in isolation;
//! 3. every unordered pair of entities is checked for contact once, both members are notified;
//! 4. commands posted during the update and collision passes are applied;
//! 5. if the player has changed rooms, the active objects are swapped for the new room's.

use glam::DVec3;
use smallvec::SmallVec;
use tracing::{debug, info, trace, trace_span, warn};

use crate::constants::{FIRST_FRAME_DELTA_MS, SPAWN_SCAN_LIMIT, SPAWN_SCAN_STEP, STEP_FACTOR_PER_MS};
use crate::entity::{Collider, Ego, Entity, EntityId, FrameContext, Object};
use crate::error::{GameError, GameResult};
use crate::events::{command_channel, CommandQueue, CommandSender, GameCommand, GameEvent};
use crate::formatter;
use crate::input::DirectionalInput;
use crate::room::{Edge, RoomId, RoomSet, ScreenBounds};

pub struct Game {
    rooms: RoomSet,
    bounds: ScreenBounds,
    objects: Vec<Object>,
    room: RoomId,
    input_enabled: bool,
    commands: CommandSender,
    queue: CommandQueue,
    events: Vec<GameEvent>,
    last_time_ms: Option<f64>,
    time_ms: f64,
    delta_ms: f64,
    step_factor: f64,
    frame: u64,
}

impl Game {
    pub fn new(rooms: RoomSet) -> Self {
        Self::with_bounds(rooms, ScreenBounds::default())
    }

    pub fn with_bounds(rooms: RoomSet, bounds: ScreenBounds) -> Self {
        let (commands, queue) = command_channel();
        Self {
            rooms,
            bounds,
            objects: Vec::new(),
            room: 0,
            input_enabled: false,
            commands,
            queue,
            events: Vec::new(),
            last_time_ms: None,
            time_ms: 0.0,
            delta_ms: FIRST_FRAME_DELTA_MS,
            step_factor: FIRST_FRAME_DELTA_MS * STEP_FACTOR_PER_MS,
            frame: 0,
        }
    }

    /// A handle for posting commands to this loop.
    pub fn commands(&self) -> CommandSender {
        self.commands.clone()
    }

    pub fn rooms(&self) -> &RoomSet {
        &self.rooms
    }

    pub fn bounds(&self) -> &ScreenBounds {
        &self.bounds
    }

    /// The room currently in play, 0 before [`Game::start`].
    pub fn room(&self) -> RoomId {
        self.room
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn find(&self, id: EntityId) -> Option<&Object> {
        self.objects.iter().find(|object| object.id() == id)
    }

    pub fn find_mut(&mut self, id: EntityId) -> Option<&mut Object> {
        self.objects.iter_mut().find(|object| object.id() == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Object> {
        self.objects.iter().find(|object| object.sprite().name() == name)
    }

    pub fn ego(&self) -> Option<&Ego> {
        self.objects.iter().find_map(Object::as_ego)
    }

    pub fn ego_mut(&mut self) -> Option<&mut Ego> {
        self.objects.iter_mut().find_map(Object::as_ego_mut)
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    /// Milliseconds between the last two ticks.
    pub fn delta_ms(&self) -> f64 {
        self.delta_ms
    }

    pub fn step_factor(&self) -> f64 {
        self.step_factor
    }

    /// Accumulated game time, in milliseconds.
    pub fn time_ms(&self) -> f64 {
        self.time_ms
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Takes every event produced since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Puts the player in play and enters its room.
    pub fn start(&mut self, ego: Ego) -> GameResult<()> {
        if self.ego().is_some() {
            return Err(GameError::InvalidState("a player is already in play".into()));
        }
        let room = ego.room();
        self.rooms.room(room)?;
        self.objects.push(Object::Ego(ego));
        self.enter_room(room)
    }

    /// Brings an object into play in the current room.
    pub fn add(&mut self, mut object: Object) -> EntityId {
        object.on_attach();
        let id = object.id();
        debug!(entity = %object.sprite().name(), %id, "Added");
        self.objects.push(object);
        id
    }

    /// Takes an object out of play for good and hands it back.
    ///
    /// An object created from a room declaration will not come back when the room is
    /// re-entered. Removing something that is not in play does nothing.
    pub fn remove(&mut self, id: EntityId) -> Option<Object> {
        let Some(index) = self.objects.iter().position(|object| object.id() == id) else {
            trace!(%id, "Remove ignored, not in play");
            return None;
        };
        let mut object = self.objects.remove(index);
        object.on_detach();
        if let Some(origin) = object.sprite().origin() {
            self.rooms.retire(origin);
        }
        debug!(entity = %object.sprite().name(), %id, "Removed");
        self.events.push(GameEvent::Removed(id));
        Some(object)
    }

    /// Runs one frame. `now_ms` is a monotonic timestamp in milliseconds.
    pub fn tick(&mut self, now_ms: f64, input: &dyn DirectionalInput) {
        self.frame += 1;
        formatter::record_frame(self.frame);
        let _tick = trace_span!("tick", frame = self.frame).entered();
        self.advance_clock(now_ms);

        self.apply_commands();
        if self.input_enabled {
            if let Some(ego) = self.ego_mut() {
                ego.process_user_input(input);
            }
        }
        self.update_objects();
        self.resolve_collisions();
        self.apply_commands();
        self.follow_ego();
    }

    fn advance_clock(&mut self, now_ms: f64) {
        self.delta_ms = match self.last_time_ms {
            Some(last) => (now_ms - last).max(0.0),
            None => FIRST_FRAME_DELTA_MS,
        };
        self.last_time_ms = Some(now_ms);
        self.time_ms += self.delta_ms;
        self.step_factor = self.delta_ms * STEP_FACTOR_PER_MS;
    }

    fn update_objects(&mut self) {
        for object in &mut self.objects {
            object.sprite_mut().begin_frame();
        }

        let ctx = FrameContext {
            step_factor: self.step_factor,
            delta_ms: self.delta_ms,
            edges_enabled: self.input_enabled,
            bounds: &self.bounds,
            rooms: &self.rooms,
        };
        for object in &mut self.objects {
            if let Err(e) = object.update(&ctx) {
                warn!(entity = %object.sprite().name(), error = %e, "Entity update failed");
            }
        }
    }

    /// Checks each unordered pair once, in insertion order.
    fn resolve_collisions(&mut self) {
        let len = self.objects.len();
        for i in 0..len {
            for j in (i + 1)..len {
                let (head, tail) = self.objects.split_at_mut(j);
                let (a, b) = (&mut head[i], &mut tail[0]);
                if a.touching(b.sprite()) {
                    trace!(a = %a.sprite().name(), b = %b.sprite().name(), "Contact");
                    a.hit(b.sprite());
                    b.hit(a.sprite());
                }
            }
        }
    }

    fn apply_commands(&mut self) {
        let commands: SmallVec<[GameCommand; 8]> = self.queue.drain().collect();
        for command in commands {
            match command {
                GameCommand::EnableInput => self.input_enabled = true,
                GameCommand::DisableInput => {
                    self.input_enabled = false;
                    if let Some(ego) = self.ego_mut() {
                        ego.stand_still();
                    }
                }
                GameCommand::Remove(id) => {
                    self.remove(id);
                }
                GameCommand::DismissSpeech(id) => {
                    if let Some(actor) = self.find_mut(id).and_then(Object::as_actor_mut) {
                        actor.dismiss_speech();
                    }
                }
                GameCommand::Notify(event) => self.events.push(event),
            }
        }
    }

    fn follow_ego(&mut self) {
        let Some(room) = self.ego().map(Ego::room) else {
            return;
        };
        if room == self.room {
            return;
        }
        if let Err(e) = self.enter_room(room) {
            warn!(from = self.room, to = room, error = %e, "Room change failed, staying put");
            let current = self.room;
            if let Some(ego) = self.ego_mut() {
                ego.abort_exit(current);
                ego.on_attach();
            }
            self.input_enabled = true;
        }
    }

    /// Swaps the active objects for those of room `to`.
    fn enter_room(&mut self, to: RoomId) -> GameResult<()> {
        let incoming = self.rooms.take_props(to, &self.commands)?;
        let from = self.room;
        if from != 0 {
            self.events.push(GameEvent::FadeOut { room: from });
        }
        self.input_enabled = false;

        let mut ego = None;
        for mut object in std::mem::take(&mut self.objects) {
            match object {
                Object::Ego(player) => ego = Some(player),
                _ => {
                    object.on_detach();
                    self.rooms.stash(object);
                }
            }
        }

        for mut object in incoming {
            object.on_attach();
            self.objects.push(object);
        }

        let mut travelling = false;
        if let Some(mut player) = ego {
            player.on_attach();
            clear_spawn(&self.objects, &self.bounds, &mut player);
            travelling = player.actor().is_travelling();
            self.objects.push(Object::Ego(player));
        }

        self.room = to;
        formatter::record_room(to);
        info!(from, to, objects = self.objects.len(), "Entered room");
        self.events.push(GameEvent::RoomEntered { from, to });
        self.events.push(GameEvent::FadeIn { room: to });
        if !travelling {
            self.input_enabled = true;
        }
        Ok(())
    }
}

/// Moves the player along the edge it entered from until the end of its walk-in is clear.
///
/// Candidates alternate either side of the original spot, moving further out each time.
fn clear_spawn(objects: &[Object], bounds: &ScreenBounds, ego: &mut Ego) {
    let sprite = ego.sprite();
    let radius = sprite.radius();
    let center = sprite.center();
    let target = ego
        .actor()
        .next_target()
        .map_or(center, |(x, z)| DVec3::new(x, center.y, z + radius));

    let along_z = matches!(ego.entering(), Some(Edge::West | Edge::East));
    let blocked = |offset: f64| {
        let mut candidate = target;
        if along_z {
            candidate.z += offset;
            if candidate.z - radius < bounds.horizon || candidate.z - radius > bounds.ground {
                return true;
            }
        } else {
            candidate.x += offset;
            if candidate.x - radius < 0.0 || candidate.x + radius > bounds.width {
                return true;
            }
        }
        let candidate = Collider::new(candidate, radius);
        objects.iter().any(|object| object.sprite().collider().touching(&candidate, 0.0))
    };

    if !blocked(0.0) {
        return;
    }
    let found = (1..=SPAWN_SCAN_LIMIT)
        .flat_map(|n| {
            let offset = n as f64 * SPAWN_SCAN_STEP;
            [offset, -offset]
        })
        .find(|offset| !blocked(*offset));

    match found {
        Some(offset) => {
            debug!(entity = %ego.sprite().name(), offset, along_z, "Spawn point blocked, shifted");
            let (dx, dz) = if along_z { (0.0, offset) } else { (offset, 0.0) };
            ego.nudge(dx, dz);
        }
        None => warn!(entity = %ego.sprite().name(), "No clear spawn point found"),
    }
}
