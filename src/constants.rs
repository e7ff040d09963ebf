//! This module contains all the constants used by the runtime.

use std::time::Duration;

/// Target frame period for the headless runner (60 frames per second).
pub const LOOP_TIME: Duration = Duration::from_nanos((1_000_000_000.0 / 60.0) as u64);

/// Delta assumed for the very first frame, in milliseconds.
pub const FIRST_FRAME_DELTA_MS: f64 = 16.0;
/// Multiplier turning a frame delta (ms) into a step factor. 1.0 at roughly 60 Hz.
pub const STEP_FACTOR_PER_MS: f64 = 0.06;

/// Width of the room screen, in pixels.
pub const SCREEN_WIDTH: f64 = 960.0;
/// The z value of the horizon. Anything further away is off the walkable ground.
pub const HORIZON_Z: f64 = 350.0;
/// The z value of the front edge of the walkable ground.
pub const GROUND_Z: f64 = 985.0;

/// Step ramp, in pixels per frame at a step factor of 1.0.
///
/// | frame while moving | step used | step after |
/// |---|---|---|
/// | 1 | 0.5 (rounds to 1) | 1.0 |
/// | 2 | 1.0 | 1.5 |
/// | 3 | 1.5 (rounds to 2) | 2.0 |
/// | ... | ... | ... |
/// | 10+ | 5.0 | 5.0 |
pub const MAX_STEP: f64 = 5.0;
/// Amount the step grows by on every moving frame, and its initial value.
pub const STEP_INCREMENT: f64 = MAX_STEP / 10.0;
/// Step used after stopping or rolling back, for fine approaches to obstacles.
pub const RESET_STEP: f64 = 1.0;

/// Number of previous positions a sprite remembers.
pub const POSITION_HISTORY: usize = 5;

/// How close (in pixels) an actor must get to a waypoint to count as arrived.
pub const ARRIVAL_TOLERANCE: f64 = 20.0;
/// Length of the walk cycle, in frames.
pub const WALK_CYCLE_FRAMES: u8 = 30;

/// Horizontal distance an entity walks into a room after entering from a side.
pub const ENTRY_WALK_IN: f64 = 50.0;
/// The z an entity is placed at when entering from the front edge, and where it walks to.
pub const SOUTH_ENTRY_Z: (f64, f64) = (980.0, 975.0);
/// The z an entity is placed at when entering from the horizon, and where it walks to.
pub const NORTH_ENTRY_Z: (f64, f64) = (355.0, 360.0);
/// Distance between candidate spawn points when an entry point is blocked.
pub const SPAWN_SCAN_STEP: f64 = 10.0;
/// Maximum number of candidate spawn points tried on each side of a blocked entry point.
pub const SPAWN_SCAN_LIMIT: u32 = 30;

/// Milliseconds a speech bubble stays up for every ten characters of text.
pub const SPEECH_MS_PER_TEN_CHARS: f64 = 1500.0;
/// Delay between a speech bubble closing and its continuation running.
pub const SPEECH_CONTINUATION_DELAY_MS: f64 = 200.0;

/// Capacity of the flood fill work queue.
pub const FILL_QUEUE_CAPACITY: usize = 30_000;
/// Brightness under which a pixel is treated as part of a dark outline.
pub const OUTLINE_BRIGHTNESS: f64 = 70.0;
