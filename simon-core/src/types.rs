//! Core data types for the memory game

/// One of the four game signals (button, tone and display position)
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "std", derive(Hash))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Slot {
    /// First button, leftmost display bar
    One,
    /// Second button
    Two,
    /// Third button
    Three,
    /// Fourth button, rightmost display bar
    Four,
}

impl Slot {
    /// All slots in scan order
    pub const ALL: [Slot; 4] = [Slot::One, Slot::Two, Slot::Three, Slot::Four];

    /// Zero-based index, as produced by the sequence generator
    pub const fn index(&self) -> u8 {
        match self {
            Slot::One => 0,
            Slot::Two => 1,
            Slot::Three => 2,
            Slot::Four => 3,
        }
    }

    /// Slot for a generator output; only the low two bits are significant
    pub const fn from_index(index: u8) -> Slot {
        match index & 0b11 {
            0 => Slot::One,
            1 => Slot::Two,
            2 => Slot::Three,
            _ => Slot::Four,
        }
    }

    /// Bit of this slot in a 4-bit button vector
    pub const fn mask(&self) -> u8 {
        1 << self.index()
    }
}

/// Mask of the significant bits in a button vector
pub const BUTTON_MASK: u8 = 0b1111;

/// Button vector with every line released (pull-up wiring, active low)
pub const BUTTONS_RELEASED: u8 = BUTTON_MASK;

/// Top-level gameplay stages
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum GameplayStage {
    /// New game: sequence length is reset
    Start = 0,
    /// Device plays the sequence back
    StartSequence = 1,
    /// Player reproduces the sequence
    Input = 2,
    /// Round won, sequence grows
    Success = 3,
    /// Round lost, score is shown and the game restarts
    Fail = 4,
}

impl GameplayStage {
    /// Raw value for publishing through a shared byte
    pub const fn as_raw(&self) -> u8 {
        *self as u8
    }

    /// Decode a published stage byte. Unknown values reset to `Start`.
    pub const fn from_raw(raw: u8) -> GameplayStage {
        match raw {
            1 => GameplayStage::StartSequence,
            2 => GameplayStage::Input,
            3 => GameplayStage::Success,
            4 => GameplayStage::Fail,
            _ => GameplayStage::Start,
        }
    }

    /// Returns true if player input is accepted in this stage
    pub const fn accepts_input(&self) -> bool {
        matches!(self, GameplayStage::Input)
    }
}

/// Button sub-machine state during the Input stage
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonSlot {
    /// Waiting for a press
    Idle,
    /// A press on the given slot is being judged and held
    Active(Slot),
}

/// Visual patterns shown by the display collaborator
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pattern {
    /// Round won
    Success,
    /// Round lost
    Fail,
    /// Two-digit number; a `None` tens digit is left blank
    Score { tens: Option<u8>, ones: u8 },
}

impl Pattern {
    /// Two-digit display of a number. Values above 99 show their last two digits.
    pub const fn score(value: u16) -> Pattern {
        let value = value % 100;
        let tens = (value / 10) as u8;
        Pattern::Score {
            tens: if tens == 0 { None } else { Some(tens) },
            ones: (value % 10) as u8,
        }
    }
}

/// Affine mapping from the analog control to the cadence delay:
/// `delay = (base + gain * reading) >> shift` ticks.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CadenceConfig {
    pub base: u32,
    pub gain: u32,
    pub shift: u8,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            base: 2000,
            gain: 55,
            shift: 3,
        }
    }
}

/// Configuration validation errors
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A zero seed locks the generator at zero forever
    ZeroSeed,
    /// Cadence shift must be below 32
    ShiftTooLarge,
    /// Tick and sampling periods must be non-zero
    ZeroPeriod,
    /// Sampling period must be a whole multiple of the tick period
    UnalignedSampling,
}

#[cfg(feature = "std")]
impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::ZeroSeed => write!(f, "Seed must be non-zero"),
            ConfigError::ShiftTooLarge => write!(f, "Cadence shift must be below 32"),
            ConfigError::ZeroPeriod => write!(f, "Tick and sampling periods must be non-zero"),
            ConfigError::UnalignedSampling => {
                write!(f, "Sampling period must be a multiple of the tick period")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Game configuration parameters
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GameConfig {
    /// Initial generator seed (must be non-zero)
    pub seed: u32,
    /// Playback cadence mapping
    pub cadence: CadenceConfig,
    /// Tick period in milliseconds
    pub tick_ms: u32,
    /// Button sampling period in milliseconds
    pub sample_interval_ms: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        crate::default_config()
    }
}

impl GameConfig {
    /// Create a new configuration with validation
    pub fn new(
        seed: u32,
        cadence: CadenceConfig,
        tick_ms: u32,
        sample_interval_ms: u32,
    ) -> Result<Self, ConfigError> {
        if seed == 0 {
            return Err(ConfigError::ZeroSeed);
        }
        if cadence.shift >= 32 {
            return Err(ConfigError::ShiftTooLarge);
        }
        if tick_ms == 0 || sample_interval_ms == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        if sample_interval_ms % tick_ms != 0 {
            return Err(ConfigError::UnalignedSampling);
        }

        Ok(Self {
            seed,
            cadence,
            tick_ms,
            sample_interval_ms,
        })
    }

    /// Number of ticks between two button samples
    pub fn sample_interval_ticks(&self) -> u32 {
        self.sample_interval_ms / self.tick_ms
    }
}
