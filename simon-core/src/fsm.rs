//! Gameplay state machine

use crate::cadence::PlaybackCadence;
use crate::dispatcher::InputDispatcher;
use crate::edge::{EdgeDetector, EdgeMasks};
use crate::hal::{GameHal, HalError, ToneDisplay};
use crate::report::RoundOutcome;
use crate::sequence::SequenceGenerator;
use crate::shared::SharedState;
use crate::types::{GameConfig, GameplayStage, Pattern};

/// Top-level game controller.
///
/// Call [`GameFsm::step`] once per main-loop iteration. Playback and the Success/Fail
/// displays busy-wait inside `step`; the Input stage never blocks.
pub struct GameFsm<'a> {
    shared: &'a SharedState,
    stage: GameplayStage,
    sequence_length: u16,
    generator: SequenceGenerator,
    cadence: PlaybackCadence,
    dispatcher: InputDispatcher,
    edges: EdgeDetector,
}

impl<'a> GameFsm<'a> {
    /// Create a game in the Start stage
    pub fn new(config: GameConfig, shared: &'a SharedState) -> Self {
        shared.publish_stage(GameplayStage::Start);
        Self {
            shared,
            stage: GameplayStage::Start,
            sequence_length: 1,
            generator: SequenceGenerator::new(config.seed),
            cadence: PlaybackCadence::new(config.cadence),
            dispatcher: InputDispatcher::new(),
            edges: EdgeDetector::new(),
        }
    }

    /// Run one main-loop iteration.
    ///
    /// Returns the outcome when a round was judged during this iteration.
    pub fn step<H: GameHal>(&mut self, hal: &mut H) -> Result<Option<RoundOutcome>, HalError> {
        let edges = self.edges.update(self.shared.buttons.state());

        match self.stage {
            GameplayStage::Start => {
                self.handle_start();
                Ok(None)
            }
            GameplayStage::StartSequence => {
                self.handle_start_sequence(hal)?;
                Ok(None)
            }
            GameplayStage::Input => self.handle_input(&edges, hal),
            GameplayStage::Success => {
                self.handle_success(hal)?;
                Ok(None)
            }
            GameplayStage::Fail => {
                self.handle_fail(hal)?;
                Ok(None)
            }
        }
    }

    fn handle_start(&mut self) {
        self.sequence_length = 1;
        self.dispatcher.reset();
        self.transition(GameplayStage::StartSequence);
    }

    fn handle_start_sequence<H: GameHal>(&mut self, hal: &mut H) -> Result<(), HalError> {
        let shared = self.shared;
        self.generator.rewind();

        // No conversion yet: try again next iteration
        if !self.cadence.recompute_delay(hal.analog()) {
            return Ok(());
        }

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "Playing {} steps, delay {} ticks",
            self.sequence_length,
            self.cadence.delay()
        );

        for _ in 0..self.sequence_length {
            let slot = self.generator.next_slot();
            hal.feedback().activate(slot)?;
            self.cadence.wait_half(&shared.ticks, hal);
            hal.feedback().deactivate()?;
            self.cadence.wait_half(&shared.ticks, hal);
        }

        // Player is judged against the same sequence
        self.generator.rewind();
        self.transition(GameplayStage::Input);
        Ok(())
    }

    fn handle_input<H: GameHal>(
        &mut self,
        edges: &EdgeMasks,
        hal: &mut H,
    ) -> Result<Option<RoundOutcome>, HalError> {
        let shared = self.shared;
        let hold = self.cadence.half_delay();

        self.dispatcher.poll(
            edges,
            &shared.keys,
            &mut self.generator,
            &shared.ticks,
            hold,
            hal.feedback(),
        )?;

        if !self.dispatcher.take_round_input() {
            return Ok(None);
        }

        let outcome = if !self.dispatcher.matched() {
            self.dispatcher.reset_round();
            self.transition(GameplayStage::Fail);
            RoundOutcome::GameOver {
                score: self.sequence_length.saturating_sub(1),
            }
        } else if self.dispatcher.input_count() == self.sequence_length {
            self.dispatcher.reset_count();
            self.transition(GameplayStage::Success);
            RoundOutcome::Success {
                score: self.sequence_length,
            }
        } else {
            return Ok(None);
        };

        #[cfg(feature = "defmt")]
        defmt::info!("Round over: {:?}", outcome);

        // The round is already decided; a lost transcript line does not undo it
        if let Err(_error) = outcome.write_to(hal.serial()) {
            #[cfg(feature = "defmt")]
            defmt::warn!("Transcript write failed: {:?}", _error);
        }
        Ok(Some(outcome))
    }

    fn handle_success<H: GameHal>(&mut self, hal: &mut H) -> Result<(), HalError> {
        let shared = self.shared;

        hal.feedback().show_pattern(Pattern::Success)?;
        self.cadence.wait_full(&shared.ticks, hal);
        hal.feedback().clear()?;

        self.sequence_length = self.sequence_length.saturating_add(1);
        self.transition(GameplayStage::StartSequence);
        Ok(())
    }

    fn handle_fail<H: GameHal>(&mut self, hal: &mut H) -> Result<(), HalError> {
        let shared = self.shared;

        hal.feedback().show_pattern(Pattern::Fail)?;
        self.cadence.wait_full(&shared.ticks, hal);
        hal.feedback().show_pattern(Pattern::score(self.sequence_length))?;
        self.cadence.wait_full(&shared.ticks, hal);
        hal.feedback().clear()?;
        self.cadence.wait_full(&shared.ticks, hal);

        // Next game continues where this one left off
        let _seed = self.generator.reseed_forward();

        #[cfg(feature = "defmt")]
        defmt::debug!("New seed {=u32:#x}", _seed);

        self.transition(GameplayStage::Start);
        Ok(())
    }

    fn transition(&mut self, next: GameplayStage) {
        #[cfg(feature = "defmt")]
        defmt::trace!("Stage {:?} -> {:?}", self.stage, next);

        self.stage = next;
        self.shared.publish_stage(next);
    }

    /// Restart from the Start stage, keeping the current seed
    pub fn reset(&mut self) {
        self.dispatcher.reset();
        self.transition(GameplayStage::Start);
    }

    pub fn stage(&self) -> GameplayStage {
        self.stage
    }

    pub fn sequence_length(&self) -> u16 {
        self.sequence_length
    }

    /// Seed the next playback starts from
    pub fn seed(&self) -> u32 {
        self.generator.seed()
    }

    /// Current cadence delay in ticks
    pub fn delay(&self) -> u32 {
        self.cadence.delay()
    }

    pub fn dispatcher(&self) -> &InputDispatcher {
        &self.dispatcher
    }
}
