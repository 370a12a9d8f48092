/// Host-neutral input events and key bindings
///
/// Hosts translate their native keyboard and mouse events into
/// [`InputEvent`]s and feed them to the viewer between frames.

use crate::camera::Direction;

/// Keys the viewer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    W,
    A,
    S,
    D,
    R,
    L,
    Q,
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    MousePress { x: i32, y: i32 },
    MouseMove { x: i32, y: i32 },
    MouseRelease { x: i32, y: i32 },
}

/// What a key does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Held-key movement
    Move(Direction),
    /// Return the camera to its home pose
    Reset,
    /// Log the camera pose
    LogPose,
    Quit,
}

/// Whether the host should keep running after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Fixed key map
pub fn binding(key: Key) -> Option<Action> {
    match key {
        Key::Left | Key::A => Some(Action::Move(Direction::Left)),
        Key::Right | Key::D => Some(Action::Move(Direction::Right)),
        Key::Up => Some(Action::Move(Direction::Up)),
        Key::Down => Some(Action::Move(Direction::Down)),
        Key::W => Some(Action::Move(Direction::Forward)),
        Key::S => Some(Action::Move(Direction::Backward)),
        Key::R => Some(Action::Reset),
        Key::L => Some(Action::LogPose),
        Key::Q | Key::Escape => Some(Action::Quit),
        Key::Other => None,
    }
}
