//! Whole-game scenarios, including the board collaborators from the firmware crate

use simon_core::hal::mock::{FeedbackEvent, MockAnalog, MockHal};
use simon_core::sequence::DEFAULT_SEED;
use simon_core::test_utils::{expected_sequence, play_round, step_until, tap};
use simon_core::{
    CadenceConfig, GameConfig, GameFsm, GameHal, GameplayStage, Pattern, RoundOutcome,
    SharedState, Slot, ToneDisplay,
};
use simon_firmware::display::{slot_segments, SEG_LEFT_SELECT, SEG_OFF};
use simon_firmware::{BlockingSerial, BoardFeedback, DisplayBuffer, Tone, TonePort, UsartPort};

use crate::scenario::{InputMode, Scenario};

#[test]
fn test_five_rounds_then_mistake() {
    let report = Scenario::default().play(5).unwrap();

    let expected: Vec<RoundOutcome> = (1..=5)
        .map(|score| RoundOutcome::Success { score })
        .chain(Some(RoundOutcome::GameOver { score: 5 }))
        .collect();
    assert_eq!(report.outcomes, expected);
    assert_eq!(
        report.transcript,
        "SUCCESS\n1\nSUCCESS\n2\nSUCCESS\n3\nSUCCESS\n4\nSUCCESS\n5\nGAME OVER\n5\n"
    );
    assert_eq!(report.final_stage, GameplayStage::Start);
}

#[test]
fn test_immediate_mistake_scores_zero() {
    let report = Scenario::default().play(0).unwrap();
    assert_eq!(report.outcomes, vec![RoundOutcome::GameOver { score: 0 }]);
    assert_eq!(report.transcript, "GAME OVER\n0\n");
}

#[test]
fn test_keyboard_and_buttons_agree() {
    let buttons = Scenario::default().play(4).unwrap();
    let keyboard = Scenario::default()
        .with_input(InputMode::Keyboard)
        .play(4)
        .unwrap();

    assert_eq!(buttons.outcomes, keyboard.outcomes);
    assert_eq!(buttons.transcript, keyboard.transcript);
    assert_eq!(buttons.next_seed, keyboard.next_seed);
}

#[test]
fn test_next_game_uses_fresh_seed() {
    let report = Scenario::default().play(3).unwrap();
    assert_ne!(report.next_seed, DEFAULT_SEED);

    // Same seed after the same game, every time
    let again = Scenario::default().play(3).unwrap();
    assert_eq!(report.next_seed, again.next_seed);
}

#[test]
fn test_slower_cadence_takes_longer() {
    let fast = Scenario::default().play(3).unwrap();
    let slow = Scenario::default().with_reading(255).play(3).unwrap();
    assert_eq!(fast.outcomes, slow.outcomes);
    assert!(slow.ticks > fast.ticks);
}

#[test]
fn test_custom_seed_game() {
    let config = GameConfig::new(0x0BAD_5EED, CadenceConfig::default(), 1, 5).unwrap();
    let report = Scenario::new(config).play(6).unwrap();
    assert_eq!(report.outcomes.len(), 7);
    assert_eq!(
        report.outcomes.last(),
        Some(&RoundOutcome::GameOver { score: 6 })
    );
}

#[test]
fn test_second_game_replays_new_sequence() {
    let shared = SharedState::new();
    let mut hal = MockHal::new(&shared);
    let mut game = GameFsm::new(GameConfig::default(), &shared);

    // Lose the first game right away
    let wrong = Slot::from_index(expected_sequence(DEFAULT_SEED, 1)[0].index() + 1);
    play_round(&mut game, &mut hal, &[wrong]).unwrap();
    game.step(&mut hal).unwrap();
    assert_eq!(game.stage(), GameplayStage::Start);

    let seed = game.seed();
    hal.feedback.clear_events();
    let sequence = expected_sequence(seed, 1);
    let outcome = play_round(&mut game, &mut hal, &sequence).unwrap();

    assert_eq!(outcome, Some(RoundOutcome::Success { score: 1 }));
    assert_eq!(hal.feedback.activated_slots()[0], sequence[0]);
}

#[test]
fn test_fail_display_sequence() {
    let shared = SharedState::new();
    let mut hal = MockHal::new(&shared);
    let mut game = GameFsm::new(GameConfig::default(), &shared);
    let sequence = expected_sequence(DEFAULT_SEED, 13);

    for length in 1..=12 {
        assert!(step_until(&mut game, &mut hal, GameplayStage::Input, 16).unwrap());
        for slot in &sequence[..length] {
            tap(&mut game, &mut hal, *slot).unwrap();
        }
        game.step(&mut hal).unwrap();
    }

    assert!(step_until(&mut game, &mut hal, GameplayStage::Input, 16).unwrap());
    let wrong = Slot::from_index(sequence[0].index() + 2);
    assert_eq!(
        tap(&mut game, &mut hal, wrong).unwrap(),
        Some(RoundOutcome::GameOver { score: 12 })
    );

    hal.feedback.clear_events();
    game.step(&mut hal).unwrap();
    assert_eq!(
        hal.feedback.events(),
        &[
            FeedbackEvent::Show(Pattern::Fail),
            FeedbackEvent::Show(Pattern::Score {
                tens: Some(1),
                ones: 3
            }),
            FeedbackEvent::Clear,
        ]
    );
}

/// Board collaborators from the firmware crate around a scripted buzzer and UART
struct FirmwareHal<'a> {
    shared: &'a SharedState,
    feedback: BoardFeedback<'a, ScriptedTone>,
    analog: MockAnalog,
    serial: BlockingSerial<ScriptedUart>,
}

#[derive(Default)]
struct ScriptedTone {
    tones: Vec<Tone>,
}

impl TonePort for ScriptedTone {
    fn play(&mut self, tone: Tone) -> Result<(), simon_core::HalError> {
        self.tones.push(tone);
        Ok(())
    }

    fn silence(&mut self) -> Result<(), simon_core::HalError> {
        Ok(())
    }
}

#[derive(Default)]
struct ScriptedUart {
    sent: Vec<u8>,
}

impl UsartPort for ScriptedUart {
    fn tx_empty(&mut self) -> bool {
        true
    }

    fn write_data(&mut self, byte: u8) {
        self.sent.push(byte);
    }
}

impl<'a> GameHal for FirmwareHal<'a> {
    type Feedback = BoardFeedback<'a, ScriptedTone>;
    type Analog = MockAnalog;
    type Serial = BlockingSerial<ScriptedUart>;

    fn feedback(&mut self) -> &mut Self::Feedback {
        &mut self.feedback
    }

    fn analog(&mut self) -> &mut Self::Analog {
        &mut self.analog
    }

    fn serial(&mut self) -> &mut Self::Serial {
        &mut self.serial
    }

    fn relax(&mut self) {
        self.shared.on_tick();
    }
}

#[test]
fn test_game_on_board_collaborators() {
    let shared = SharedState::new();
    let display = DisplayBuffer::new();
    let mut hal = FirmwareHal {
        shared: &shared,
        feedback: BoardFeedback::new(ScriptedTone::default(), &display, &shared.keys),
        analog: MockAnalog::new(0),
        serial: BlockingSerial::new(ScriptedUart::default()),
    };
    let mut game = GameFsm::new(GameConfig::default(), &shared);

    while game.stage() != GameplayStage::Input {
        game.step(&mut hal).unwrap();
    }
    assert_eq!(
        hal.feedback.tone_port().tones,
        vec![Tone::for_slot(Slot::Three, 0)]
    );
    assert_eq!(display.bytes(), (SEG_OFF | SEG_LEFT_SELECT, SEG_OFF));

    // Pitch raised from the keyboard, then the right slot typed
    shared.on_serial_rx(b'k');
    shared.on_serial_rx(b'e');
    game.step(&mut hal).unwrap();
    let (left, right) = slot_segments(Slot::Three);
    assert_eq!(display.bytes(), (left | SEG_LEFT_SELECT, right));
    assert_eq!(
        hal.feedback.tone_port().tones.last(),
        Some(&Tone::for_slot(Slot::Three, 1))
    );

    let mut outcome = None;
    while outcome.is_none() {
        outcome = game.step(&mut hal).unwrap();
        hal.relax();
    }
    assert_eq!(outcome, Some(RoundOutcome::Success { score: 1 }));
    assert_eq!(hal.serial.port().sent, b"SUCCESS\n1\n");
}

#[test]
fn test_board_feedback_clear_is_idempotent() {
    let shared = SharedState::new();
    let display = DisplayBuffer::new();
    let mut feedback = BoardFeedback::new(ScriptedTone::default(), &display, &shared.keys);
    feedback.clear().unwrap();
    feedback.clear().unwrap();
    assert_eq!(display.bytes(), (SEG_OFF | SEG_LEFT_SELECT, SEG_OFF));
}
