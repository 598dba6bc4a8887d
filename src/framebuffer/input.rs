//! Keyboard Input
//!
//! Reads key events from a single evdev device (`/dev/input/event*`) and
//! exposes them as a blocking, pull-based iterator.

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};

use evdev::{Device, InputEvent, InputEventKind, Key};
use tracing::{debug, error, info};

use super::geometry::Direction;
use crate::error::InputError;

/// evdev key value for a release
pub const KEY_RELEASED: i32 = 0;
/// evdev key value for a press
pub const KEY_PRESSED: i32 = 1;
/// evdev key value for auto-repeat while held
pub const KEY_REPEAT: i32 = 2;

/// A device that delivers input events in batches
pub trait EventSource {
    /// Block until at least one batch is available and append it to `into`
    fn fetch(&mut self, into: &mut VecDeque<InputEvent>) -> io::Result<()>;
}

impl EventSource for Device {
    fn fetch(&mut self, into: &mut VecDeque<InputEvent>) -> io::Result<()> {
        into.extend(self.fetch_events()?);
        Ok(())
    }
}

/// What a failed read means for the event stream
#[derive(Debug)]
pub enum ReadFailure {
    /// Interrupted by a signal, read again
    Retry,
    /// The device went away, end the stream cleanly
    Disconnected,
    /// Anything else ends the stream with this error
    Fatal(io::Error),
}

/// Classify an error returned while fetching events
pub fn classify_read_error(e: io::Error) -> ReadFailure {
    if e.kind() == io::ErrorKind::Interrupted {
        ReadFailure::Retry
    } else if e.raw_os_error() == Some(libc::ENODEV) {
        ReadFailure::Disconnected
    } else {
        ReadFailure::Fatal(e)
    }
}

/// Blocking iterator over the events of one input device.
///
/// Ends when the device disappears (`ENODEV`). Any other read error is
/// yielded once and ends the stream.
pub struct KeyEvents<S = Device> {
    source: S,
    path: PathBuf,
    pending: VecDeque<InputEvent>,
    finished: bool,
}

impl KeyEvents<Device> {
    /// Open the input device at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref().to_path_buf();

        let device = Device::open(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::PermissionDenied {
                error!(
                    path = %path.display(),
                    "Permission denied on input device; run as root or join the 'input' group"
                );
            }
            InputError::Open {
                path: path.clone(),
                source,
            }
        })?;

        info!(
            path = %path.display(),
            name = device.name().unwrap_or("unknown"),
            "Opened input device"
        );

        Ok(Self::from_source(device, path))
    }
}

impl<S: EventSource> KeyEvents<S> {
    /// Wrap an already opened source; `path` is used in errors and logs
    pub fn from_source(source: S, path: impl Into<PathBuf>) -> Self {
        Self {
            source,
            path: path.into(),
            pending: VecDeque::new(),
            finished: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<S: EventSource> Iterator for KeyEvents<S> {
    type Item = Result<InputEvent, InputError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }
            if self.finished {
                return None;
            }

            let Err(e) = self.source.fetch(&mut self.pending) else {
                continue;
            };

            match classify_read_error(e) {
                ReadFailure::Retry => continue,
                ReadFailure::Disconnected => {
                    info!(path = %self.path.display(), "Input device disconnected");
                    self.finished = true;
                    return None;
                }
                ReadFailure::Fatal(source) => {
                    self.finished = true;
                    return Some(Err(InputError::Read {
                        path: self.path.clone(),
                        source,
                    }));
                }
            }
        }
    }
}

/// Direction for an event, if it should move the rectangle.
///
/// Only key presses and repeats of the four arrow keys qualify.
pub fn direction_for(event: &InputEvent) -> Option<Direction> {
    let InputEventKind::Key(key) = event.kind() else {
        return None;
    };

    match event.value() {
        KEY_PRESSED | KEY_REPEAT => {}
        _ => return None,
    }

    let direction = key_direction(key);
    if direction.is_none() {
        debug!(code = key.code(), "Ignoring unmapped key");
    }
    direction
}

fn key_direction(key: Key) -> Option<Direction> {
    match key {
        Key::KEY_UP => Some(Direction::Up),
        Key::KEY_DOWN => Some(Direction::Down),
        Key::KEY_LEFT => Some(Direction::Left),
        Key::KEY_RIGHT => Some(Direction::Right),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evdev::EventType;

    fn key(key: Key, value: i32) -> InputEvent {
        InputEvent::new(EventType::KEY, key.code(), value)
    }

    /// Replays fixed batches, then reports `ENODEV`
    struct Scripted {
        batches: VecDeque<io::Result<Vec<InputEvent>>>,
        fetches: usize,
    }

    impl Scripted {
        fn new(batches: Vec<io::Result<Vec<InputEvent>>>) -> Self {
            Self {
                batches: batches.into(),
                fetches: 0,
            }
        }
    }

    impl EventSource for Scripted {
        fn fetch(&mut self, into: &mut VecDeque<InputEvent>) -> io::Result<()> {
            self.fetches += 1;
            match self.batches.pop_front() {
                Some(batch) => {
                    into.extend(batch?);
                    Ok(())
                }
                None => Err(io::Error::from_raw_os_error(libc::ENODEV)),
            }
        }
    }

    #[test]
    fn test_classify_read_error() {
        assert!(matches!(
            classify_read_error(io::Error::from(io::ErrorKind::Interrupted)),
            ReadFailure::Retry
        ));
        assert!(matches!(
            classify_read_error(io::Error::from_raw_os_error(libc::EINTR)),
            ReadFailure::Retry
        ));
        assert!(matches!(
            classify_read_error(io::Error::from_raw_os_error(libc::ENODEV)),
            ReadFailure::Disconnected
        ));
        match classify_read_error(io::Error::from_raw_os_error(libc::EIO)) {
            ReadFailure::Fatal(e) => assert_eq!(e.raw_os_error(), Some(libc::EIO)),
            other => panic!("expected fatal, got {:?}", other),
        }
    }

    #[test]
    fn test_events_yielded_in_order_until_disconnect() {
        let source = Scripted::new(vec![
            Ok(vec![key(Key::KEY_UP, KEY_PRESSED), key(Key::KEY_UP, KEY_RELEASED)]),
            Ok(vec![]),
            Ok(vec![key(Key::KEY_LEFT, KEY_REPEAT)]),
        ]);
        let mut events = KeyEvents::from_source(source, "/dev/input/event2");

        let codes: Vec<(u16, i32)> = events
            .by_ref()
            .map(|e| e.map(|e| (e.code(), e.value())).unwrap())
            .collect();
        assert_eq!(
            codes,
            vec![
                (Key::KEY_UP.code(), KEY_PRESSED),
                (Key::KEY_UP.code(), KEY_RELEASED),
                (Key::KEY_LEFT.code(), KEY_REPEAT),
            ]
        );

        // Disconnect latches: the device is not read again
        assert!(events.next().is_none());
        assert_eq!(events.source.fetches, 4);
    }

    #[test]
    fn test_interrupted_read_is_retried() {
        let source = Scripted::new(vec![
            Err(io::Error::from(io::ErrorKind::Interrupted)),
            Ok(vec![key(Key::KEY_DOWN, KEY_PRESSED)]),
        ]);
        let mut events = KeyEvents::from_source(source, "/dev/input/event2");

        let event = events.next().unwrap().unwrap();
        assert_eq!(event.code(), Key::KEY_DOWN.code());
        assert!(events.next().is_none());
    }

    #[test]
    fn test_read_error_yielded_once_then_stream_ends() {
        let source = Scripted::new(vec![
            Err(io::Error::from_raw_os_error(libc::EIO)),
            Ok(vec![key(Key::KEY_DOWN, KEY_PRESSED)]),
        ]);
        let mut events = KeyEvents::from_source(source, "/dev/input/event2");

        let err = events.next().unwrap().unwrap_err();
        assert!(matches!(err, InputError::Read { .. }));
        assert!(err.to_string().contains("/dev/input/event2"));

        assert!(events.next().is_none());
        assert!(events.next().is_none());
        assert_eq!(events.source.fetches, 1);
        assert_eq!(events.path(), Path::new("/dev/input/event2"));
    }

    #[test]
    fn test_arrow_key_codes() {
        assert_eq!(Key::KEY_UP.code(), 103);
        assert_eq!(Key::KEY_LEFT.code(), 105);
        assert_eq!(Key::KEY_RIGHT.code(), 106);
        assert_eq!(Key::KEY_DOWN.code(), 108);
    }

    #[test]
    fn test_press_and_repeat_are_accepted() {
        assert_eq!(direction_for(&key(Key::KEY_UP, KEY_PRESSED)), Some(Direction::Up));
        assert_eq!(direction_for(&key(Key::KEY_DOWN, KEY_REPEAT)), Some(Direction::Down));
        assert_eq!(direction_for(&key(Key::KEY_LEFT, KEY_PRESSED)), Some(Direction::Left));
        assert_eq!(direction_for(&key(Key::KEY_RIGHT, KEY_REPEAT)), Some(Direction::Right));
    }

    #[test]
    fn test_release_is_ignored() {
        assert_eq!(direction_for(&key(Key::KEY_UP, KEY_RELEASED)), None);
    }

    #[test]
    fn test_unmapped_key_is_ignored() {
        assert_eq!(direction_for(&key(Key::KEY_A, KEY_PRESSED)), None);
        assert_eq!(direction_for(&key(Key::KEY_ENTER, KEY_REPEAT)), None);
    }

    #[test]
    fn test_non_key_events_are_ignored() {
        // EV_SYN report and an EV_MSC scancode carrying the same code as KEY_UP
        let syn = InputEvent::new(EventType::SYNCHRONIZATION, 0, 0);
        let msc = InputEvent::new(EventType::MISC, Key::KEY_UP.code(), KEY_PRESSED);
        assert_eq!(direction_for(&syn), None);
        assert_eq!(direction_for(&msc), None);
    }

    #[test]
    fn test_open_missing_device() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event42");
        let err = KeyEvents::open(&path).err().expect("open should fail");
        assert!(matches!(err, InputError::Open { .. }));
        assert!(err.to_string().contains("event42"));
    }
}
