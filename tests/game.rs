use glam::DVec3;
use pretty_assertions::assert_eq;
use roomwalk::entity::{Actor, Direction, Ego, Entity, Object, Sprite};
use roomwalk::error::{GameError, RoomError};
use roomwalk::events::{GameCommand, GameEvent};
use roomwalk::game::Game;
use roomwalk::input::{DirectionalInput, Signals};
use roomwalk::room::{Edge, EdgeTable, PropRef, Room, RoomId, RoomSet};
use speculoos::prelude::*;

mod common;

const FRAME_MS: f64 = 1000.0 / 60.0;

const RIGHT: Signals = Signals {
    left: false,
    right: true,
    up: false,
    down: false,
};

const LEFT: Signals = Signals {
    left: true,
    right: false,
    up: false,
    down: false,
};

fn player(game: &Game, room: RoomId, x: f64, z: f64) -> Ego {
    let mut sprite = Sprite::new("ego", 50.0, 150.0);
    sprite.set_position(x, 0.0, z);
    Ego::new(Actor::new(sprite, game.commands()), room)
}

fn run(game: &mut Game, frames: usize, input: &dyn DirectionalInput) {
    for _ in 0..frames {
        let now = game.frame() as f64 * FRAME_MS;
        game.tick(now, input);
    }
}

/// Ticks until `done` holds, giving up after `limit` frames.
fn run_until(game: &mut Game, limit: usize, input: &dyn DirectionalInput, done: impl Fn(&Game) -> bool) -> bool {
    for _ in 0..limit {
        run(game, 1, input);
        if done(game) {
            return true;
        }
    }
    false
}

/// Room 1 holds a rock and leads east to room 2, which leads back west.
fn two_rooms() -> RoomSet {
    let mut rooms = RoomSet::new();
    rooms.add_room(
        Room::new("field")
            .with_edges(EdgeTable::from_rooms([0, 2, 0, 0]))
            .with_prop(common::scenery("rock", 50.0, 420.0, 600.0)),
    ).unwrap();
    rooms.add_room(Room::new("shore").with_edges(EdgeTable::from_rooms([1, 0, 0, 0]))).unwrap();
    rooms
}

fn ego_x(game: &Game) -> f64 {
    game.ego().map(|ego| ego.sprite().x()).unwrap()
}

#[test]
fn test_start_enters_the_room() {
    let mut game = Game::new(two_rooms());
    let ego = player(&game, 1, 100.0, 600.0);
    game.start(ego).unwrap();

    assert_eq!(game.room(), 1);
    assert_that(&game.input_enabled()).is_true();
    assert_eq!(game.objects().len(), 2);
    assert_that(&game.ego().unwrap().sprite().is_visible()).is_true();
    assert_that(&game.find_by_name("rock").unwrap().sprite().is_visible()).is_true();
    assert_eq!(
        game.drain_events(),
        vec![GameEvent::RoomEntered { from: 0, to: 1 }, GameEvent::FadeIn { room: 1 }]
    );
}

#[test]
fn test_start_twice_is_rejected() {
    let mut game = Game::new(two_rooms());
    let first = player(&game, 1, 100.0, 600.0);
    let second = player(&game, 2, 100.0, 600.0);
    game.start(first).unwrap();

    assert!(matches!(game.start(second), Err(GameError::InvalidState(_))));
    assert_eq!(game.room(), 1);
}

#[test]
fn test_start_in_unknown_room() {
    let mut game = Game::new(two_rooms());
    let ego = player(&game, 7, 100.0, 600.0);

    assert!(matches!(game.start(ego), Err(GameError::Room(RoomError::UnknownRoom(7)))));
    assert_that(&game.ego()).is_none();
}

#[test]
fn test_input_moves_the_player() {
    let mut game = Game::new(two_rooms());
    let ego = player(&game, 1, 100.0, 600.0);
    game.start(ego).unwrap();

    run(&mut game, 10, &RIGHT);
    assert_that(&ego_x(&game)).is_greater_than(100.0);
}

#[test]
fn test_disabled_input_is_ignored() {
    let mut game = Game::new(two_rooms());
    let ego = player(&game, 1, 100.0, 600.0);
    game.start(ego).unwrap();
    game.set_input_enabled(false);

    run(&mut game, 10, &RIGHT);
    assert_eq!(ego_x(&game), 100.0);
}

#[test]
fn test_clock_drives_step_factor() {
    let mut game = Game::new(two_rooms());
    let ego = player(&game, 1, 100.0, 600.0);
    game.start(ego).unwrap();

    game.tick(1000.0, &Signals::NONE);
    assert_eq!(game.delta_ms(), 16.0);
    assert!((game.step_factor() - 0.96).abs() < 1e-9);

    game.tick(1020.0, &Signals::NONE);
    assert_eq!(game.delta_ms(), 20.0);
    assert!((game.step_factor() - 1.2).abs() < 1e-9);
    assert_eq!(game.time_ms(), 36.0);
    assert_eq!(game.frame(), 2);
}

#[test]
fn test_walking_off_the_edge_changes_room() {
    let mut game = Game::new(two_rooms());
    let ego = player(&game, 1, 880.0, 400.0);
    game.start(ego).unwrap();
    game.drain_events();

    assert_that(&run_until(&mut game, 120, &RIGHT, |g| g.room() == 2)).is_true();
    assert_eq!(
        game.drain_events(),
        vec![
            GameEvent::FadeOut { room: 1 },
            GameEvent::RoomEntered { from: 1, to: 2 },
            GameEvent::FadeIn { room: 2 },
        ]
    );
    assert_that(&game.input_enabled()).is_false();
    assert_that(&game.find_by_name("rock")).is_none();

    let ego = game.ego().unwrap();
    assert_eq!(ego.room(), 2);
    assert_eq!(ego.entering(), Some(Edge::West));
    assert_eq!(ego.sprite().x(), -100.0);
    assert_that(&ego.sprite().is_visible()).is_true();

    // The walk in ends with input handed back.
    assert_that(&run_until(&mut game, 200, &Signals::NONE, Game::input_enabled)).is_true();
    let ego = game.ego().unwrap();
    assert_that(&ego.entering()).is_none();
    assert_that(&ego.sprite().x()).is_greater_than(0.0);
}

#[test]
fn test_props_are_cached_between_visits() {
    let mut game = Game::new(two_rooms());
    let ego = player(&game, 1, 100.0, 800.0);
    game.start(ego).unwrap();
    let rock = game.find_by_name("rock").map(Entity::id).unwrap();
    let origin = PropRef { room: 1, index: 0 };

    game.ego_mut().unwrap().set_room(2);
    run(&mut game, 1, &Signals::NONE);
    assert_eq!(game.room(), 2);
    assert_that(&game.rooms().prop(origin).unwrap().is_cached()).is_true();

    game.ego_mut().unwrap().set_room(1);
    run(&mut game, 1, &Signals::NONE);
    assert_eq!(game.room(), 1);
    assert_eq!(game.find_by_name("rock").map(Entity::id), Some(rock));
    assert_that(&game.rooms().prop(origin).unwrap().is_cached()).is_false();
}

#[test]
fn test_removed_prop_never_returns() {
    let mut game = Game::new(two_rooms());
    let ego = player(&game, 1, 100.0, 800.0);
    game.start(ego).unwrap();
    game.drain_events();
    let rock = game.find_by_name("rock").map(Entity::id).unwrap();

    game.commands().send(GameCommand::Remove(rock));
    run(&mut game, 1, &Signals::NONE);
    assert_that(&game.find(rock)).is_none();
    assert_eq!(game.drain_events(), vec![GameEvent::Removed(rock)]);
    assert_that(&game.rooms().prop(PropRef { room: 1, index: 0 }).unwrap().is_retired()).is_true();

    game.ego_mut().unwrap().set_room(2);
    run(&mut game, 1, &Signals::NONE);
    game.ego_mut().unwrap().set_room(1);
    run(&mut game, 1, &Signals::NONE);
    assert_eq!(game.room(), 1);
    assert_that(&game.find_by_name("rock")).is_none();

    assert_that(&game.remove(rock).is_none()).is_true();
}

#[test]
fn test_collisions_never_leave_overlap() {
    let mut game = Game::new(two_rooms());
    let ego = player(&game, 1, 300.0, 600.0);
    game.start(ego).unwrap();

    for _ in 0..90 {
        run(&mut game, 1, &RIGHT);
        let ego = game.ego().unwrap().sprite();
        let rock = game.find_by_name("rock").unwrap().sprite();
        assert_that(&ego.touching(rock)).is_false();
    }
    assert_that(&ego_x(&game)).is_greater_than(300.0);
    assert_that(&ego_x(&game)).is_less_than(370.0);
}

#[test]
fn test_both_members_of_a_contact_retreat() {
    let mut game = Game::new(common::rooms_with_edges([0, 0, 0, 0], 1));
    let mut west = Actor::new(common::placed("west", 50.0, 300.0, 500.0), game.commands());
    west.move_to(700.0, 500.0, None);
    let mut east = Actor::new(common::placed("east", 50.0, 500.0, 500.0), game.commands());
    east.move_to(100.0, 500.0, None);
    let west = game.add(Object::Actor(west));
    let east = game.add(Object::Actor(east));

    for _ in 0..120 {
        run(&mut game, 1, &Signals::NONE);
        let a = game.find(west).unwrap().sprite();
        let b = game.find(east).unwrap().sprite();
        assert_that(&a.touching(b)).is_false();
    }

    let west_x = game.find(west).unwrap().sprite().x();
    let east_x = game.find(east).unwrap().sprite().x();
    assert_that(&west_x).is_greater_than(300.0);
    assert_that(&east_x).is_less_than(500.0);
    assert_that(&(east_x - west_x)).is_less_than(60.0);
}

#[test]
fn test_each_pair_is_resolved_once() {
    let mut game = Game::new(common::rooms_with_edges([0, 0, 0, 0], 1));
    let mut cart = Sprite::new("cart", 50.0, 40.0);
    for x in [100.0, 110.0, 120.0] {
        cart.set_position(x, 0.0, 600.0);
    }
    cart.step_mut().set(3.0);
    cart.set_direction(Direction::RIGHT);
    let cart = game.add(Object::Prop(cart));
    let barrel = game.add(Object::Prop(common::placed("barrel", 50.0, 160.0, 600.0)));
    let chest = game.add(Object::Prop(common::placed("chest", 50.0, 150.0, 600.0)));

    run(&mut game, 1, &Signals::NONE);

    // The cart moved to 123 and touches both. Each contact rolls it back exactly once.
    let sprite = game.find(cart).unwrap().sprite();
    assert_eq!(sprite.x(), 110.0);
    assert_eq!(sprite.history_len(), 1);
    for still in [barrel, chest] {
        assert_eq!(game.find(still).unwrap().sprite().history_len(), 0);
    }
}

#[test]
fn test_speech_stops_the_player() {
    let mut game = Game::new(common::rooms_with_edges([0, 0, 0, 0], 1));
    let ego = player(&game, 1, 850.0, 600.0);
    game.start(ego).unwrap();
    let hermit = Actor::new(common::placed("hermit", 50.0, 100.0, 800.0), game.commands());
    let hermit = game.add(Object::Actor(hermit));

    run(&mut game, 10, &RIGHT);
    game.find_mut(hermit)
        .and_then(Object::as_actor_mut)
        .unwrap()
        .say("Mind the river.", 100.0, None);

    run(&mut game, 1, &RIGHT);
    assert_that(&game.input_enabled()).is_false();
    assert_that(&game.ego().unwrap().sprite().heading()).is_none();

    for _ in 0..200 {
        run(&mut game, 1, &RIGHT);
        assert_that(&(ego_x(&game) + 50.0)).is_less_than_or_equal_to(960.0);
    }
    assert_that(&game.input_enabled()).is_true();

    let stopped_at = ego_x(&game);
    run(&mut game, 30, &LEFT);
    assert_that(&ego_x(&game)).is_less_than(stopped_at);
}

#[test]
fn test_failed_room_change_restores_the_player() {
    let mut game = Game::new(common::rooms_with_edges([0, 0, 0, 0], 1));
    let ego = player(&game, 1, 400.0, 600.0);
    game.start(ego).unwrap();

    let ego = game.ego_mut().unwrap();
    ego.set_room(9);
    ego.enter_from(Edge::West);
    assert_eq!(ego.sprite().x(), -100.0);

    run(&mut game, 1, &Signals::NONE);
    assert_eq!(game.room(), 1);
    assert_that(&game.input_enabled()).is_true();
    let ego = game.ego().unwrap();
    assert_eq!(ego.room(), 1);
    assert_eq!(ego.sprite().position(), DVec3::new(400.0, 0.0, 600.0));
    assert_that(&ego.entering()).is_none();
    assert_that(&ego.actor().is_travelling()).is_false();

    run(&mut game, 10, &LEFT);
    assert_that(&ego_x(&game)).is_less_than(400.0);
}

#[test]
fn test_failed_room_change_keeps_others_running() {
    let mut game = Game::new(common::rooms_with_edges([0, 9, 0, 0], 1));
    let ego = player(&game, 1, 880.0, 400.0);
    game.start(ego).unwrap();

    let mut sprite = common::placed("heron", 50.0, 100.0, 700.0);
    sprite.set_solid(false);
    let mut heron = Actor::new(sprite, game.commands());
    heron.move_to(600.0, 700.0, None);
    let heron = game.add(Object::Actor(heron));

    run(&mut game, 60, &RIGHT);

    assert_eq!(game.room(), 1);
    assert_eq!(game.ego().unwrap().room(), 1);
    assert_that(&ego_x(&game)).is_less_than_or_equal_to(910.0);
    let heron_x = game.find(heron).unwrap().sprite().x();
    assert_that(&heron_x).is_greater_than(150.0);
}

#[test]
fn test_dismiss_speech_command() {
    let mut game = Game::new(two_rooms());
    let ego = player(&game, 1, 100.0, 800.0);
    game.start(ego).unwrap();
    game.drain_events();

    let hermit = Actor::new(common::placed("hermit", 50.0, 700.0, 800.0), game.commands());
    let hermit = game.add(Object::Actor(hermit));
    game.find_mut(hermit)
        .and_then(Object::as_actor_mut)
        .unwrap()
        .say("Hello", 100.0, None);

    game.commands().send(GameCommand::DismissSpeech(hermit));
    run(&mut game, 1, &Signals::NONE);

    assert_that(&game.find(hermit).and_then(Object::as_actor).unwrap().speech()).is_none();
    assert_that(&game.input_enabled()).is_true();
    let events = game.drain_events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], GameEvent::SpeechShown { entity, .. } if entity == hermit));
    assert_eq!(events[1], GameEvent::SpeechHidden { entity: hermit });
}

#[test]
fn test_blocked_entry_point_is_shifted() {
    let mut rooms = RoomSet::new();
    rooms.add_room(Room::new("field").with_edges(EdgeTable::from_rooms([0, 2, 0, 0]))).unwrap();
    rooms.add_room(Room::new("shore").with_prop(common::scenery("boulder", 60.0, 60.0, 690.0))).unwrap();
    let mut game = Game::new(rooms);
    let ego = player(&game, 1, 880.0, 700.0);
    game.start(ego).unwrap();

    assert_that(&run_until(&mut game, 120, &RIGHT, |g| g.room() == 2)).is_true();
    let ego = game.ego().unwrap();
    assert_eq!(ego.sprite().z(), 750.0);
    assert_eq!(ego.actor().next_target(), Some((100.0, 750.0)));
}
