use crate::error::{CoreError, Result};

bitflags::bitflags! {
    #[repr(transparent)]
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct Controls: u8 {
        const LEFT  = 1 << 0;
        const RIGHT = 1 << 1;
        const JUMP  = 1 << 2;
    }
}

/// Physical keys the demo listens to, named by their DOM `KeyboardEvent.code`.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    ArrowLeft = 0,
    ArrowRight = 1,
    ArrowUp = 2,
    KeyA = 3,
    KeyD = 4,
    KeyW = 5,
    Space = 6,
}

impl Key {
    pub const ALL: [Key; 7] = [
        Key::ArrowLeft,
        Key::ArrowRight,
        Key::ArrowUp,
        Key::KeyA,
        Key::KeyD,
        Key::KeyW,
        Key::Space,
    ];

    pub fn from_code(code: &str) -> Option<Key> {
        Some(match code {
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "ArrowUp" => Key::ArrowUp,
            "KeyA" => Key::KeyA,
            "KeyD" => Key::KeyD,
            "KeyW" => Key::KeyW,
            "Space" => Key::Space,
            _ => return None,
        })
    }

    /// Numeric id used across the C ABI.
    pub fn from_index(i: u8) -> Option<Key> {
        Key::ALL.get(i as usize).copied()
    }

    pub fn code(self) -> &'static str {
        match self {
            Key::ArrowLeft => "ArrowLeft",
            Key::ArrowRight => "ArrowRight",
            Key::ArrowUp => "ArrowUp",
            Key::KeyA => "KeyA",
            Key::KeyD => "KeyD",
            Key::KeyW => "KeyW",
            Key::Space => "Space",
        }
    }

    pub fn control(self) -> Controls {
        match self {
            Key::ArrowLeft | Key::KeyA => Controls::LEFT,
            Key::ArrowRight | Key::KeyD => Controls::RIGHT,
            Key::ArrowUp | Key::KeyW | Key::Space => Controls::JUMP,
        }
    }

    #[inline]
    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Held-key state, written by key events and read once per tick.
#[derive(Copy, Clone, Debug, Default)]
pub struct InputTracker {
    held: u8,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key(&mut self, code: &str, pressed: bool) -> Result<()> {
        let key = Key::from_code(code).ok_or_else(|| CoreError::UnknownInputCode(code.to_owned()))?;
        self.set(key, pressed);
        Ok(())
    }

    pub fn set(&mut self, key: Key, pressed: bool) {
        if pressed {
            self.held |= key.bit();
        } else {
            self.held &= !key.bit();
        }
    }

    /// False for codes outside the key map.
    pub fn is_pressed(&self, code: &str) -> bool {
        Key::from_code(code).is_some_and(|k| self.held & k.bit() != 0)
    }

    /// A control is down while any key bound to it is held.
    pub fn controls(&self) -> Controls {
        Key::ALL
            .iter()
            .filter(|k| self.held & k.bit() != 0)
            .fold(Controls::empty(), |acc, k| acc | k.control())
    }

    pub fn is_down(&self, control: Controls) -> bool {
        self.controls().contains(control)
    }

    pub fn clear(&mut self) {
        self.held = 0;
    }
}
