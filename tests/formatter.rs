use std::io;
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use roomwalk::formatter::{self, FrameFormatter};
use speculoos::prelude::*;
use tracing::subscriber::with_default;

/// Collects everything written to it.
#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture(format: FrameFormatter, log: impl FnOnce()) -> String {
    let out = Capture::default();
    let writer = out.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .event_format(format)
        .with_writer(move || writer.clone())
        .finish();
    with_default(subscriber, log);

    let bytes = out.0.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

#[test]
fn test_prefix_carries_frame_and_room() {
    formatter::record_frame(0x1_01A3);
    formatter::record_room(2);
    assert_eq!(formatter::current_frame(), 0x1_01A3);
    assert_eq!(formatter::current_room(), 2);

    let output = capture(FrameFormatter::new().without_clock(), || {
        let _tick = tracing::info_span!("tick", frame = 419).entered();
        tracing::info!(to = 2, "Entered room");
    });

    assert_eq!(output, "#01A3 r2  INFO tick{frame=419}: formatter: Entered room to=2\n");
}

#[test]
fn test_clock_and_level_labels() {
    let output = capture(FrameFormatter::default(), || {
        tracing::warn!("Edge blocked");
        tracing::trace!("Rolled back");
    });

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in &lines {
        // HH:MM:SS.fffff
        assert_eq!(line.as_bytes()[2], b':');
        assert_eq!(line.as_bytes()[5], b':');
        assert_eq!(line.as_bytes()[8], b'.');
    }
    assert_that(&lines[0].ends_with(" WARN formatter: Edge blocked")).is_true();
    assert_that(&lines[1].ends_with("TRACE formatter: Rolled back")).is_true();
}
