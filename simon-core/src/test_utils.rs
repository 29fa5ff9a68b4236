//! Scenario drivers for exercising a [`GameFsm`] against a [`MockHal`]

use heapless::Vec;
use crate::fsm::GameFsm;
use crate::hal::mock::MockHal;
use crate::hal::{GameHal, HalError};
use crate::report::RoundOutcome;
use crate::sequence::SequenceGenerator;
use crate::types::{GameplayStage, Slot};

/// Longest sequence [`expected_sequence`] produces
pub const MAX_SCENARIO_LENGTH: usize = 64;

/// Ticks a line must be held for the debouncer to flip it, with margin.
///
/// A release right after a press flip needs four samples.
pub const SETTLE_TICKS: u32 = 25;

/// First `length` slots the generator yields from `seed`
pub fn expected_sequence(seed: u32, length: usize) -> Vec<Slot, MAX_SCENARIO_LENGTH> {
    let mut generator = SequenceGenerator::new(seed);
    (0..length.min(MAX_SCENARIO_LENGTH))
        .map(|_| generator.next_slot())
        .collect()
}

/// Step until the game reaches `stage`. Returns false if it did not within `max_steps`.
pub fn step_until<H: GameHal>(
    game: &mut GameFsm<'_>,
    hal: &mut H,
    stage: GameplayStage,
    max_steps: usize,
) -> Result<bool, HalError> {
    for _ in 0..max_steps {
        if game.stage() == stage {
            return Ok(true);
        }
        game.step(hal)?;
    }
    Ok(game.stage() == stage)
}

/// Press and release a hardware button, then wait out the hold time.
///
/// Returns the outcome if this input decided the round.
pub fn tap(
    game: &mut GameFsm<'_>,
    hal: &mut MockHal<'_>,
    slot: Slot,
) -> Result<Option<RoundOutcome>, HalError> {
    let hold = game.delay() >> 1;

    hal.press(slot);
    hal.advance(SETTLE_TICKS);
    let mut outcome = game.step(hal)?;

    hal.release(slot);
    hal.advance(SETTLE_TICKS);
    outcome = outcome.or(game.step(hal)?);

    hal.advance(hold);
    Ok(outcome.or(game.step(hal)?))
}

/// Inject a key over the serial link and run the input through to completion
pub fn type_key(
    game: &mut GameFsm<'_>,
    hal: &mut MockHal<'_>,
    byte: u8,
) -> Result<Option<RoundOutcome>, HalError> {
    let hold = game.delay() >> 1;

    hal.shared().on_serial_rx(byte);
    let mut outcome = game.step(hal)?;
    outcome = outcome.or(game.step(hal)?);

    hal.advance(hold);
    Ok(outcome.or(game.step(hal)?))
}

/// Let playback run, then tap `slots` until one decides the round.
///
/// Panics if playback does not hand over to the Input stage.
pub fn play_round(
    game: &mut GameFsm<'_>,
    hal: &mut MockHal<'_>,
    slots: &[Slot],
) -> Result<Option<RoundOutcome>, HalError> {
    assert!(
        step_until(game, hal, GameplayStage::Input, 16)?,
        "game stuck in {:?} before input",
        game.stage()
    );

    for slot in slots {
        if let Some(outcome) = tap(game, hal, *slot)? {
            return Ok(Some(outcome));
        }
    }
    Ok(None)
}
