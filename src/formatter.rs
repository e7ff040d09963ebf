//! Log line layout for the runner.
//!
//! Every line is prefixed with the wall clock, the frame the loop is on and the room in play:
//!
//! ```text
//! 12:04:55.01234 #01A3 r2  INFO tick{frame=419}: roomwalk::game: Entered room from=1 to=2
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU16, AtomicU64, Ordering};

use time::macros::format_description;
use time::{format_description::FormatItem, OffsetDateTime};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::registry::LookupSpan;

use crate::room::RoomId;

static FRAME: AtomicU64 = AtomicU64::new(0);
static ROOM: AtomicU16 = AtomicU16::new(0);

/// Frames are shown as four hex digits.
const FRAME_DISPLAY_MASK: u64 = 0xFFFF;

#[cfg(target_os = "emscripten")]
const TIMESTAMP_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second].[subsecond digits:3]");

#[cfg(not(target_os = "emscripten"))]
const TIMESTAMP_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second].[subsecond digits:5]");

/// Publishes the frame the loop is on. Called by [`crate::game::Game::tick`].
pub fn record_frame(frame: u64) {
    FRAME.store(frame, Ordering::Relaxed);
}

/// Publishes the room in play. Called whenever the loop enters a room.
pub fn record_room(room: RoomId) {
    ROOM.store(room, Ordering::Relaxed);
}

pub fn current_frame() -> u64 {
    FRAME.load(Ordering::Relaxed)
}

pub fn current_room() -> RoomId {
    ROOM.load(Ordering::Relaxed)
}

#[derive(Clone, Copy)]
enum Style {
    Dim,
    Bold,
    Level(Level),
}

impl Style {
    fn code(self) -> &'static str {
        match self {
            Style::Dim => "2",
            Style::Bold => "1",
            Style::Level(level) => match level {
                Level::TRACE => "35",
                Level::DEBUG => "34",
                Level::INFO => "32",
                Level::WARN => "33",
                _ => "31",
            },
        }
    }

    fn paint<T: fmt::Display>(self, ansi: bool, value: T) -> Painted<T> {
        Painted {
            style: self,
            ansi,
            value,
        }
    }
}

struct Painted<T> {
    style: Style,
    ansi: bool,
    value: T,
}

impl<T: fmt::Display> fmt::Display for Painted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ansi {
            write!(f, "\x1b[{}m{}\x1b[0m", self.style.code(), self.value)
        } else {
            self.value.fmt(f)
        }
    }
}

/// Five characters wide, like the stock formatter.
fn level_label(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "TRACE",
        Level::DEBUG => "DEBUG",
        Level::INFO => " INFO",
        Level::WARN => " WARN",
        _ => "ERROR",
    }
}

/// Event formatter carrying the frame and room prefix.
#[derive(Debug, Clone, Copy)]
pub struct FrameFormatter {
    clock: bool,
}

impl FrameFormatter {
    pub fn new() -> Self {
        Self { clock: true }
    }

    /// Leaves the wall clock out, for output that has to be reproducible.
    pub fn without_clock(self) -> Self {
        Self { clock: false }
    }
}

impl Default for FrameFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, N> FormatEvent<S, N> for FrameFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let meta = event.metadata();
        let ansi = writer.has_ansi_escapes();

        if self.clock {
            let now = OffsetDateTime::now_utc().format(&TIMESTAMP_FORMAT).map_err(|e| {
                eprintln!("Failed to format timestamp: {e}");
                fmt::Error
            })?;
            write!(writer, "{} ", Style::Dim.paint(ansi, now))?;
        }

        let frame = current_frame() & FRAME_DISPLAY_MASK;
        let room = current_room();
        write!(writer, "{} ", Style::Dim.paint(ansi, format_args!("#{frame:04X} r{room}")))?;
        write!(writer, "{} ", Style::Level(*meta.level()).paint(ansi, level_label(meta.level())))?;

        if let Some(scope) = ctx.event_scope() {
            let mut spans = 0;
            for span in scope.from_root() {
                write!(writer, "{}", Style::Bold.paint(ansi, span.metadata().name()))?;
                let extensions = span.extensions();
                if let Some(fields) = extensions.get::<FormattedFields<N>>().filter(|fields| !fields.is_empty()) {
                    write!(writer, "{}{fields}{}", Style::Bold.paint(ansi, "{"), Style::Bold.paint(ansi, "}"))?;
                }
                write!(writer, "{}", Style::Dim.paint(ansi, ":"))?;
                spans += 1;
            }
            if spans > 0 {
                writer.write_char(' ')?;
            }
        }

        write!(writer, "{} ", Style::Dim.paint(ansi, format_args!("{}:", meta.target())))?;
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
