//! # Core Enumerations
//!
//! Integer-coded enumerations shared with the emulation core. Each one is a
//! closed table: converting from an integer never fails and falls back to a
//! documented default when the value is unknown.

/// Two-state button value sent with every button event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonState {
    Released,
    Pressed,
}

impl ButtonState {
    /// Integer value understood by the core.
    #[must_use]
    pub fn value(self) -> i32 {
        match self {
            Self::Released => 0,
            Self::Pressed => 1,
        }
    }

    /// Unknown values read as [`ButtonState::Released`].
    #[must_use]
    pub fn from_value(value: i32) -> Self {
        match value {
            1 => Self::Pressed,
            _ => Self::Released,
        }
    }

    #[must_use]
    pub fn is_pressed(self) -> bool {
        self == Self::Pressed
    }
}

/// How a bound button should be labelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonName {
    Invalid,
    /// Label with the engine name instead of a button name
    Engine,
    /// Label with the raw value instead of a button name
    Value,
}

impl ButtonName {
    #[must_use]
    pub fn value(self) -> i32 {
        match self {
            Self::Invalid => 1,
            Self::Engine => 2,
            Self::Value => 3,
        }
    }

    /// Unknown values read as [`ButtonName::Invalid`].
    #[must_use]
    pub fn from_value(value: i32) -> Self {
        match value {
            2 => Self::Engine,
            3 => Self::Value,
            _ => Self::Invalid,
        }
    }
}

/// Emulated controller style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NpadStyleIndex {
    None,
    Fullkey,
    Handheld,
    HandheldNes,
    JoyconDual,
    JoyconLeft,
    JoyconRight,
    GameCube,
    Pokeball,
    Nes,
    Snes,
    N64,
    SegaGenesis,
    SystemExt,
    System,
}

impl NpadStyleIndex {
    /// All styles in table order; lookups return the first match.
    pub const ALL: [NpadStyleIndex; 15] = [
        Self::None,
        Self::Fullkey,
        Self::Handheld,
        Self::HandheldNes,
        Self::JoyconDual,
        Self::JoyconLeft,
        Self::JoyconRight,
        Self::GameCube,
        Self::Pokeball,
        Self::Nes,
        Self::Snes,
        Self::N64,
        Self::SegaGenesis,
        Self::SystemExt,
        Self::System,
    ];

    #[must_use]
    pub fn value(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Fullkey => 3,
            Self::Handheld | Self::HandheldNes => 4,
            Self::JoyconDual => 5,
            Self::JoyconLeft => 6,
            Self::JoyconRight => 7,
            Self::GameCube => 8,
            Self::Pokeball => 9,
            Self::Nes => 10,
            Self::Snes => 12,
            Self::N64 => 13,
            Self::SegaGenesis => 14,
            Self::SystemExt => 32,
            Self::System => 33,
        }
    }

    /// Unknown values read as [`NpadStyleIndex::None`]. `4` is shared by
    /// the handheld styles and resolves to [`NpadStyleIndex::Handheld`].
    #[must_use]
    pub fn from_value(value: i32) -> Self {
        Self::ALL
            .into_iter()
            .find(|style| style.value() == value)
            .unwrap_or(Self::None)
    }
}

/// Kind of content patch applied to a title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchType {
    Update,
    Dlc,
    Mod,
}

impl PatchType {
    #[must_use]
    pub fn value(self) -> i32 {
        match self {
            Self::Update => 0,
            Self::Dlc => 1,
            Self::Mod => 2,
        }
    }

    /// Unknown values read as [`PatchType::Update`].
    #[must_use]
    pub fn from_value(value: i32) -> Self {
        match value {
            1 => Self::Dlc,
            2 => Self::Mod,
            _ => Self::Update,
        }
    }
}

/// Analog trigger slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeTrigger {
    LTrigger,
    RTrigger,
}

impl NativeTrigger {
    #[must_use]
    pub fn value(self) -> i32 {
        match self {
            Self::LTrigger => 0,
            Self::RTrigger => 1,
        }
    }

    /// Unknown values read as [`NativeTrigger::LTrigger`].
    #[must_use]
    pub fn from_value(value: i32) -> Self {
        match value {
            1 => Self::RTrigger,
            _ => Self::LTrigger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_state_values() {
        assert_eq!(ButtonState::Released.value(), 0);
        assert_eq!(ButtonState::Pressed.value(), 1);
        assert_eq!(ButtonState::from_value(1), ButtonState::Pressed);
        assert_eq!(ButtonState::from_value(0), ButtonState::Released);
        assert_eq!(ButtonState::from_value(7), ButtonState::Released);
        assert!(ButtonState::Pressed.is_pressed());
    }

    #[test]
    fn test_button_name_fallback() {
        assert_eq!(ButtonName::from_value(2), ButtonName::Engine);
        assert_eq!(ButtonName::from_value(3), ButtonName::Value);
        assert_eq!(ButtonName::from_value(0), ButtonName::Invalid);
        assert_eq!(ButtonName::from_value(99), ButtonName::Invalid);
    }

    #[test]
    fn test_npad_style_round_trip() {
        for style in NpadStyleIndex::ALL {
            if style == NpadStyleIndex::HandheldNes {
                continue;
            }
            assert_eq!(NpadStyleIndex::from_value(style.value()), style);
        }
    }

    #[test]
    fn test_npad_style_shared_value_resolves_to_first() {
        assert_eq!(NpadStyleIndex::HandheldNes.value(), 4);
        assert_eq!(NpadStyleIndex::from_value(4), NpadStyleIndex::Handheld);
    }

    #[test]
    fn test_npad_style_unknown_values() {
        assert_eq!(NpadStyleIndex::from_value(1), NpadStyleIndex::None);
        assert_eq!(NpadStyleIndex::from_value(11), NpadStyleIndex::None);
        assert_eq!(NpadStyleIndex::from_value(-3), NpadStyleIndex::None);
    }

    #[test]
    fn test_patch_type_fallback() {
        assert_eq!(PatchType::from_value(1), PatchType::Dlc);
        assert_eq!(PatchType::from_value(2), PatchType::Mod);
        assert_eq!(PatchType::from_value(5), PatchType::Update);
        assert_eq!(PatchType::Mod.value(), 2);
    }

    #[test]
    fn test_native_trigger_values() {
        assert_eq!(NativeTrigger::RTrigger.value(), 1);
        assert_eq!(NativeTrigger::from_value(1), NativeTrigger::RTrigger);
        assert_eq!(NativeTrigger::from_value(4), NativeTrigger::LTrigger);
    }
}
