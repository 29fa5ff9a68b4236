//! Property tests for the generator, debouncer, edge detector and keyboard

use proptest::prelude::*;
use simon_core::input::{MAX_OCTAVE, MIN_OCTAVE};
use simon_core::{
    advance, Debouncer, EdgeDetector, EdgeMasks, KeyInjector, Pattern, SequenceGenerator,
    BUTTONS_RELEASED, BUTTON_MASK,
};

proptest! {
    #[test]
    fn rewind_replays_sequence(seed in 1u32.., length in 1usize..64) {
        let mut generator = SequenceGenerator::new(seed);
        let first: Vec<_> = (0..length).map(|_| generator.next_slot()).collect();
        generator.rewind();
        let second: Vec<_> = (0..length).map(|_| generator.next_slot()).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn nonzero_state_stays_nonzero(seed in 1u32.., steps in 1usize..512) {
        let mut state = seed;
        for _ in 0..steps {
            let (next, step) = advance(state);
            prop_assert_ne!(next, 0);
            prop_assert!(step < 4);
            state = next;
        }
    }

    #[test]
    fn reseed_continues_from_current_state(seed in 1u32.., consumed in 0usize..32) {
        let mut generator = SequenceGenerator::new(seed);
        for _ in 0..consumed {
            generator.next_slot();
        }
        let expected = advance(generator.state()).0;
        prop_assert_eq!(generator.reseed_forward(), expected);
        prop_assert_eq!(generator.seed(), expected);
    }

    #[test]
    fn short_glitches_never_flip(glitches in prop::collection::vec((0u8..16, 1usize..=2), 0..64)) {
        let debouncer = Debouncer::new();
        for (mask, length) in glitches {
            for _ in 0..length {
                debouncer.sample(BUTTONS_RELEASED & !mask);
            }
            debouncer.sample(BUTTONS_RELEASED);
            prop_assert_eq!(debouncer.state(), BUTTONS_RELEASED);
        }
    }

    #[test]
    fn three_samples_flip_from_rest(mask in 0u8..16) {
        let debouncer = Debouncer::new();
        let held = BUTTONS_RELEASED & !mask;
        debouncer.sample(held);
        debouncer.sample(held);
        prop_assert_eq!(debouncer.state(), BUTTONS_RELEASED);
        debouncer.sample(held);
        prop_assert_eq!(debouncer.state(), held);
    }

    #[test]
    fn debounced_state_stays_in_mask(samples in prop::collection::vec(any::<u8>(), 0..128)) {
        let debouncer = Debouncer::new();
        for raw in samples {
            debouncer.sample(raw);
            prop_assert_eq!(debouncer.state() & !BUTTON_MASK, 0);
        }
    }

    #[test]
    fn edges_partition_changes(previous in 0u8..16, current in 0u8..16) {
        let edges = EdgeMasks::between(previous, current);
        prop_assert_eq!(edges.falling & edges.rising, 0);
        prop_assert_eq!(edges.falling | edges.rising, edges.changed);
        prop_assert_eq!(edges.changed, previous ^ current);
        prop_assert_eq!(edges.falling & current, 0);
        prop_assert_eq!(edges.rising & previous, 0);
    }

    #[test]
    fn detector_reports_each_change_once(samples in prop::collection::vec(0u8..16, 1..64)) {
        let mut detector = EdgeDetector::new();
        let mut previous = BUTTONS_RELEASED;
        for sample in samples {
            let edges = detector.update(sample);
            prop_assert_eq!(edges, EdgeMasks::between(previous, sample));
            prop_assert_eq!(detector.update(sample).changed, 0);
            previous = sample;
        }
    }

    #[test]
    fn octave_stays_bounded(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let keys = KeyInjector::new();
        for byte in bytes {
            keys.on_receive(byte, true);
            prop_assert!((MIN_OCTAVE..=MAX_OCTAVE).contains(&keys.octave()));
            prop_assert!(keys.pending().count_ones() <= 1);
        }
    }

    #[test]
    fn score_keeps_last_two_digits(value in any::<u16>()) {
        match Pattern::score(value) {
            Pattern::Score { tens, ones } => {
                let tens = tens.unwrap_or(0);
                prop_assert!(tens < 10 && ones < 10);
                prop_assert_eq!(u16::from(tens) * 10 + u16::from(ones), value % 100);
            }
            other => prop_assert!(false, "unexpected pattern {:?}", other),
        }
    }
}
