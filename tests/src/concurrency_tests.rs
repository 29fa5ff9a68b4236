//! Interrupt-style concurrency: ticks and serial bytes arrive from async tasks while
//! the engine busy-waits on a blocking thread

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use simon_core::hal::mock::{MockAnalog, MockSerial, MockToneDisplay};
use simon_core::{
    CadenceConfig, GameConfig, GameFsm, GameHal, GameplayStage, PlaybackCadence, RoundOutcome,
    SharedState,
};

/// Collaborators whose busy waits only yield; time comes from another thread
#[derive(Default)]
struct SpinHal {
    feedback: MockToneDisplay,
    analog: MockAnalog,
    serial: MockSerial,
}

impl GameHal for SpinHal {
    type Feedback = MockToneDisplay;
    type Analog = MockAnalog;
    type Serial = MockSerial;

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
        std::thread::yield_now();
    }
}

/// Tick the shared state until told to stop
fn spawn_ticker(shared: Arc<SharedState>, stop: Arc<AtomicBool>) -> tokio::task::JoinHandle<u32> {
    tokio::spawn(async move {
        let mut ticks = 0;
        while !stop.load(Ordering::Relaxed) {
            shared.on_tick();
            ticks += 1;
            tokio::task::yield_now().await;
        }
        ticks
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_busy_wait_returns_once_ticks_arrive() {
    let shared = Arc::new(SharedState::new());
    let stop = Arc::new(AtomicBool::new(false));
    let ticker = spawn_ticker(shared.clone(), stop.clone());

    let waiter = {
        let shared = shared.clone();
        tokio::task::spawn_blocking(move || {
            let mut hal = SpinHal::default();
            let mut cadence = PlaybackCadence::new(CadenceConfig::default());
            let start = shared.ticks.now();
            cadence.wait_full(&shared.ticks, &mut hal);
            shared.ticks.now().wrapping_sub(start)
        })
    };

    let waited = tokio::time::timeout(Duration::from_secs(10), waiter)
        .await
        .expect("busy wait never returned")
        .unwrap();
    stop.store(true, Ordering::Relaxed);
    ticker.await.unwrap();

    assert!(waited >= 250);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_serial_injection_wins_a_round() {
    let shared = Arc::new(SharedState::new());
    let stop = Arc::new(AtomicBool::new(false));
    let ticker = spawn_ticker(shared.clone(), stop.clone());

    let game = {
        let shared = shared.clone();
        tokio::task::spawn_blocking(move || {
            let mut hal = SpinHal::default();
            let mut game = GameFsm::new(GameConfig::default(), &shared);
            loop {
                if let Some(outcome) = game.step(&mut hal).unwrap() {
                    return (outcome, hal.serial.transcript().to_string());
                }
                std::thread::yield_now();
            }
        })
    };

    // Acts as the receive interrupt: bytes are ignored until the Input stage
    let injector = {
        let shared = shared.clone();
        tokio::spawn(async move {
            while shared.stage() != GameplayStage::Input {
                shared.on_serial_rx(b'3');
                tokio::task::yield_now().await;
            }
            shared.on_serial_rx(b'3');
        })
    };

    let (outcome, transcript) = tokio::time::timeout(Duration::from_secs(10), game)
        .await
        .expect("round never finished")
        .unwrap();
    injector.await.unwrap();
    stop.store(true, Ordering::Relaxed);
    let ticks = ticker.await.unwrap();

    assert_eq!(outcome, RoundOutcome::Success { score: 1 });
    assert_eq!(transcript, "SUCCESS\n1\n");
    assert!(ticks >= 250 + 125);
}
