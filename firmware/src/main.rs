#![no_std]
#![no_main]

// Logging support
#[cfg(feature = "defmt")]
use defmt::{debug, info, warn};
#[cfg(feature = "defmt")]
use defmt_rtt as _;
use panic_halt as _;

// No-op logging when defmt is not available
#[cfg(not(feature = "defmt"))]
macro_rules! info {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "defmt"))]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "defmt"))]
macro_rules! warn {
    ($($arg:tt)*) => {};
}

use core::cell::RefCell;
use core::convert::Infallible;
use critical_section::Mutex;
use embedded_hal::digital::{ErrorType, InputPin};
use riscv_rt::entry;
use simon_core::{ButtonPins, GameConfig, GameFsm, GameHal, SharedState};
use simon_firmware::clock::{self, HCLK_HZ};
use simon_firmware::{
    AdcPort, BlockingSerial, BoardFeedback, DisplayBuffer, OnDemandAdc, Tone, TonePort, UsartPort,
};

// Critical section implementation for RISC-V
struct RiscvCriticalSection;
critical_section::set_impl!(RiscvCriticalSection);

unsafe impl critical_section::Impl for RiscvCriticalSection {
    unsafe fn acquire() -> critical_section::RawRestoreState {
        let mstatus = riscv::register::mstatus::read();
        riscv::register::mstatus::clear_mie();
        mstatus.mie() as u8
    }

    unsafe fn release(was_enabled: critical_section::RawRestoreState) {
        if was_enabled != 0 {
            riscv::register::mstatus::set_mie();
        }
    }
}

// ========================================
// CH32V003 Register Map
// ========================================

const RCC_BASE: u32 = 0x4002_1000;
const GPIOC_BASE: u32 = 0x4001_1000;
const GPIOD_BASE: u32 = 0x4001_1400;
const TIM1_BASE: u32 = 0x4001_2C00;
const TIM2_BASE: u32 = 0x4000_0000;
const ADC1_BASE: u32 = 0x4001_2400;
const SPI1_BASE: u32 = 0x4001_3000;
const USART1_BASE: u32 = 0x4001_3800;
const PFIC_BASE: u32 = 0xE000_E000;
const STK_BASE: u32 = 0xE000_F000;

/// RCC
const RCC_APB2PCENR: u32 = 0x18;
const RCC_APB1PCENR: u32 = 0x1C;

/// GPIO
const GPIO_CFGLR: u32 = 0x00;
const GPIO_INDR: u32 = 0x08;
const GPIO_OUTDR: u32 = 0x0C;
const GPIO_BSHR: u32 = 0x10;

/// General and advanced timers
const TIM_CTLR1: u32 = 0x00;
const TIM_DMAINTENR: u32 = 0x0C;
const TIM_INTFR: u32 = 0x10;
const TIM_CHCTLR1: u32 = 0x18;
const TIM_CCER: u32 = 0x20;
const TIM_PSC: u32 = 0x28;
const TIM_ATRLR: u32 = 0x2C;
const TIM_CH1CVR: u32 = 0x34;
const TIM_BDTR: u32 = 0x44;

/// ADC
const ADC_STATR: u32 = 0x00;
const ADC_CTLR2: u32 = 0x08;
const ADC_SAMPTR2: u32 = 0x10;
const ADC_RSQR3: u32 = 0x34;
const ADC_RDATAR: u32 = 0x4C;

/// SPI
const SPI_CTLR1: u32 = 0x00;
const SPI_STATR: u32 = 0x08;
const SPI_DATAR: u32 = 0x0C;

/// USART
const USART_STATR: u32 = 0x00;
const USART_DATAR: u32 = 0x04;
const USART_BRR: u32 = 0x08;
const USART_CTLR1: u32 = 0x0C;

/// PFIC interrupt enable (IENR1 covers 0-31, IENR2 32-63)
const PFIC_IENR1: u32 = 0x100;
const PFIC_IENR2: u32 = 0x104;

/// SysTick
const STK_CTLR: u32 = 0x00;
const STK_SR: u32 = 0x04;
const STK_CMPLR: u32 = 0x10;

/// Interrupt numbers
const IRQ_SYSTICK: u32 = 12;
const IRQ_USART1: u32 = 32;
const IRQ_TIM2: u32 = 38;

// Pin assignments:
// PC1-PC4 = Buttons 1-4 (active low with pull-up)
// PC0     = Display latch
// PC5/PC6 = Display shift register SCK/MOSI (SPI1)
// PD2     = Buzzer (TIM1_CH1)
// PD4     = Cadence potentiometer (ADC channel 7)
// PD5/PD6 = USART1 TX/RX
const BUTTON_PINS: [u8; 4] = [1, 2, 3, 4];
const LATCH_PIN: u8 = 0;
const ADC_CHANNEL: u32 = 7;

#[inline(always)]
unsafe fn read_reg(addr: u32) -> u32 {
    core::ptr::read_volatile(addr as *const u32)
}

#[inline(always)]
unsafe fn write_reg(addr: u32, value: u32) {
    core::ptr::write_volatile(addr as *mut u32, value);
}

#[inline(always)]
unsafe fn modify_reg(addr: u32, f: impl FnOnce(u32) -> u32) {
    write_reg(addr, f(read_reg(addr)));
}

// ========================================
// Shared State
// ========================================

static SHARED: SharedState = SharedState::new();
static DISPLAY: DisplayBuffer = DisplayBuffer::new();
static BUTTONS: Mutex<RefCell<Option<ButtonPins<Ch32Input>>>> = Mutex::new(RefCell::new(None));

// ========================================
// Peripheral Ports
// ========================================

/// Pull-up input pin read straight from the port input register
struct Ch32Input {
    port: u32,
    pin: u8,
}

impl Ch32Input {
    const fn new(port: u32, pin: u8) -> Self {
        Self { port, pin }
    }
}

impl ErrorType for Ch32Input {
    type Error = Infallible;
}

impl InputPin for Ch32Input {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.is_low()?)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        let indr = unsafe { read_reg(self.port + GPIO_INDR) };
        Ok(indr & (1 << self.pin) == 0)
    }
}

/// TIM1 channel 1 PWM on the buzzer
struct Tim1Tone;

impl TonePort for Tim1Tone {
    fn play(&mut self, tone: Tone) -> Result<(), simon_core::HalError> {
        // 16-bit timer
        let reload = tone.period.min(0xFFFF);
        unsafe {
            write_reg(TIM1_BASE + TIM_ATRLR, reload);
            write_reg(TIM1_BASE + TIM_CH1CVR, tone.compare.min(reload));
        }
        Ok(())
    }

    fn silence(&mut self) -> Result<(), simon_core::HalError> {
        unsafe { write_reg(TIM1_BASE + TIM_CH1CVR, 0) };
        Ok(())
    }
}

/// ADC1, software trigger, single channel
struct Adc1;

impl AdcPort for Adc1 {
    fn start_conversion(&mut self) {
        unsafe { modify_reg(ADC1_BASE + ADC_CTLR2, |v| v | (1 << 22)) }; // SWSTART
    }

    fn conversion_done(&mut self) -> bool {
        unsafe { read_reg(ADC1_BASE + ADC_STATR) & (1 << 1) != 0 } // EOC
    }

    fn read_result(&mut self) -> u8 {
        // 10-bit result; reading clears EOC
        (unsafe { read_reg(ADC1_BASE + ADC_RDATAR) } >> 2) as u8
    }
}

/// USART1 transmitter
struct Usart1;

impl UsartPort for Usart1 {
    fn tx_empty(&mut self) -> bool {
        unsafe { read_reg(USART1_BASE + USART_STATR) & (1 << 7) != 0 } // TXE
    }

    fn write_data(&mut self, byte: u8) {
        unsafe { write_reg(USART1_BASE + USART_DATAR, byte as u32) };
    }
}

/// Collaborators handed to the engine
struct Board {
    feedback: BoardFeedback<'static, Tim1Tone>,
    analog: OnDemandAdc<Adc1>,
    serial: BlockingSerial<Usart1>,
}

impl Board {
    fn new() -> Self {
        Self {
            feedback: BoardFeedback::new(Tim1Tone, &DISPLAY, &SHARED.keys),
            analog: OnDemandAdc::new(Adc1),
            serial: BlockingSerial::new(Usart1),
        }
    }
}

impl GameHal for Board {
    type Feedback = BoardFeedback<'static, Tim1Tone>;
    type Analog = OnDemandAdc<Adc1>;
    type Serial = BlockingSerial<Usart1>;

    fn feedback(&mut self) -> &mut Self::Feedback {
        &mut self.feedback
    }

    fn analog(&mut self) -> &mut Self::Analog {
        &mut self.analog
    }

    fn serial(&mut self) -> &mut Self::Serial {
        &mut self.serial
    }
}

// ========================================
// Main Application
// ========================================

#[entry]
fn main() -> ! {
    let config = simon_core::default_config();
    hardware_init(&config);

    info!("Simon v{} on CH32V003", simon_core::VERSION);
    info!(
        "Seed {=u32:#x}, tick {}ms, sampling {}ms",
        config.seed,
        config.tick_ms,
        config.sample_interval_ms
    );

    let mut board = Board::new();
    let mut game = GameFsm::new(config, &SHARED);

    unsafe { riscv::interrupt::enable() };

    main_loop(&mut game, &mut board)
}

/// Cooperative main loop
fn main_loop(game: &mut GameFsm<'static>, board: &mut Board) -> ! {
    info!("Main loop started");

    loop {
        if let Err(_error) = game.step(board) {
            warn!("Step failed: {}", _error);
        }
    }
}

/// Hardware initialization wrapper
fn hardware_init(config: &GameConfig) {
    enable_peripheral_clocks();
    configure_gpio_pins();
    configure_buttons();
    configure_buzzer();
    configure_display();
    configure_adc();
    configure_usart();
    configure_sample_timer(config);
    configure_systick(config);

    info!("Hardware initialization complete");
}

/// Enable required peripheral clocks
fn enable_peripheral_clocks() {
    unsafe {
        // AFIO(0), GPIOC(4), GPIOD(5), ADC1(9), TIM1(11), SPI1(12), USART1(14)
        modify_reg(RCC_BASE + RCC_APB2PCENR, |v| {
            v | (1 << 0) | (1 << 4) | (1 << 5) | (1 << 9) | (1 << 11) | (1 << 12) | (1 << 14)
        });
        // TIM2(0)
        modify_reg(RCC_BASE + RCC_APB1PCENR, |v| v | 1);
    }
}

/// Set the 4-bit mode/config nibble of a pin
unsafe fn configure_pin(port: u32, pin: u8, nibble: u32) {
    let shift = pin as u32 * 4;
    modify_reg(port + GPIO_CFGLR, |v| (v & !(0xF << shift)) | (nibble << shift));
}

/// Configure GPIO pins for inputs and outputs
fn configure_gpio_pins() {
    const INPUT_PULL: u32 = 0x8;
    const INPUT_FLOATING: u32 = 0x4;
    const INPUT_ANALOG: u32 = 0x0;
    const OUTPUT_PP: u32 = 0x3;
    const OUTPUT_AF_PP: u32 = 0xB;

    unsafe {
        for pin in BUTTON_PINS {
            configure_pin(GPIOC_BASE, pin, INPUT_PULL);
            // Pull-up selected through the output register
            modify_reg(GPIOC_BASE + GPIO_OUTDR, |v| v | (1 << pin));
        }

        configure_pin(GPIOC_BASE, LATCH_PIN, OUTPUT_PP);
        configure_pin(GPIOC_BASE, 5, OUTPUT_AF_PP);
        configure_pin(GPIOC_BASE, 6, OUTPUT_AF_PP);

        configure_pin(GPIOD_BASE, 2, OUTPUT_AF_PP);
        configure_pin(GPIOD_BASE, 4, INPUT_ANALOG);
        configure_pin(GPIOD_BASE, 5, OUTPUT_AF_PP);
        configure_pin(GPIOD_BASE, 6, INPUT_FLOATING);
    }
}

/// Hand the button pins to the sampling interrupt
fn configure_buttons() {
    let pins = ButtonPins::new(BUTTON_PINS.map(|pin| Ch32Input::new(GPIOC_BASE, pin)));
    critical_section::with(|cs| {
        BUTTONS.borrow(cs).replace(Some(pins));
    });
}

/// TIM1 channel 1 PWM, silent until a tone is played
fn configure_buzzer() {
    unsafe {
        write_reg(TIM1_BASE + TIM_PSC, 7 - 1);
        write_reg(TIM1_BASE + TIM_ATRLR, 0xFFFF);
        write_reg(TIM1_BASE + TIM_CH1CVR, 0);
        // PWM mode 1, preload enable
        write_reg(TIM1_BASE + TIM_CHCTLR1, (0x6 << 4) | (1 << 3));
        write_reg(TIM1_BASE + TIM_CCER, 1);
        // Main output enable
        write_reg(TIM1_BASE + TIM_BDTR, 1 << 15);
        // ARPE, CEN
        write_reg(TIM1_BASE + TIM_CTLR1, (1 << 7) | 1);
    }
}

/// SPI1 master driving the display shift register
fn configure_display() {
    unsafe {
        // SSM, SSI, SPE, BR = /8, MSTR
        write_reg(
            SPI1_BASE + SPI_CTLR1,
            (1 << 9) | (1 << 8) | (1 << 6) | (0b010 << 3) | (1 << 2),
        );
        write_reg(GPIOC_BASE + GPIO_BSHR, 1 << LATCH_PIN);
    }
    DISPLAY.blank();
}

/// ADC1 single conversion on channel 7, software trigger
fn configure_adc() {
    unsafe {
        write_reg(ADC1_BASE + ADC_RSQR3, ADC_CHANNEL);
        // Longest sample time for channel 7
        modify_reg(ADC1_BASE + ADC_SAMPTR2, |v| v | (0b111 << (ADC_CHANNEL * 3)));
        // ADON, EXTSEL = SWSTART, EXTTRIG
        write_reg(ADC1_BASE + ADC_CTLR2, 1 | (0b111 << 17) | (1 << 20));
    }
}

/// USART1 at 9600 8N1 with receive interrupt
fn configure_usart() {
    unsafe {
        write_reg(USART1_BASE + USART_BRR, clock::usart_brr(HCLK_HZ, clock::BAUD_RATE));
        // UE, RXNEIE, TE, RE
        write_reg(USART1_BASE + USART_CTLR1, (1 << 13) | (1 << 5) | (1 << 3) | (1 << 2));
        enable_irq(IRQ_USART1);
    }
}

/// TIM2 update interrupt at the sampling period
fn configure_sample_timer(config: &GameConfig) {
    let period = clock::sample_timer(HCLK_HZ, config.sample_interval_ms);
    debug!("TIM2 psc {} reload {}", period.prescaler, period.reload);

    unsafe {
        write_reg(TIM2_BASE + TIM_PSC, period.prescaler as u32);
        write_reg(TIM2_BASE + TIM_ATRLR, period.reload as u32);
        write_reg(TIM2_BASE + TIM_DMAINTENR, 1); // UIE
        write_reg(TIM2_BASE + TIM_CTLR1, 1); // CEN
        enable_irq(IRQ_TIM2);
    }
}

/// SysTick at the tick period
fn configure_systick(config: &GameConfig) {
    unsafe {
        write_reg(STK_BASE + STK_CMPLR, clock::systick_compare(HCLK_HZ, config.tick_ms));
        write_reg(STK_BASE + STK_SR, 0);
        // STE, STIE, STCLK = HCLK, STRE
        write_reg(STK_BASE + STK_CTLR, 0xF);
        enable_irq(IRQ_SYSTICK);
    }
}

unsafe fn enable_irq(irq: u32) {
    let (reg, bit) = if irq < 32 {
        (PFIC_IENR1, irq)
    } else {
        (PFIC_IENR2, irq - 32)
    };
    write_reg(PFIC_BASE + reg, 1 << bit);
}

/// Shift out the next display byte and latch it
fn refresh_display() {
    unsafe {
        while read_reg(SPI1_BASE + SPI_STATR) & (1 << 1) == 0 {} // TXE
        write_reg(SPI1_BASE + SPI_DATAR, DISPLAY.next_byte() as u32);
        while read_reg(SPI1_BASE + SPI_STATR) & (1 << 7) != 0 {} // BSY

        write_reg(GPIOC_BASE + GPIO_BSHR, 1 << (LATCH_PIN + 16));
        write_reg(GPIOC_BASE + GPIO_BSHR, 1 << LATCH_PIN);
    }
}

// ========================================
// Interrupt Handlers
// ========================================

/// Tick interrupt
#[no_mangle]
extern "C" fn SysTick() {
    unsafe { write_reg(STK_BASE + STK_SR, 0) };
    SHARED.on_tick();
}

/// Sampling interrupt: debounce the buttons, refresh the display
#[no_mangle]
extern "C" fn TIM2_IRQHandler() {
    unsafe { modify_reg(TIM2_BASE + TIM_INTFR, |v| v & !1) };

    let raw = critical_section::with(|cs| {
        BUTTONS
            .borrow(cs)
            .borrow_mut()
            .as_mut()
            .and_then(|pins| pins.read_raw().ok())
    });
    if let Some(raw) = raw {
        SHARED.on_sample(raw);
    }

    refresh_display();
}

/// Serial receive interrupt: keyboard injection
#[no_mangle]
extern "C" fn USART1_IRQHandler() {
    let status = unsafe { read_reg(USART1_BASE + USART_STATR) };
    if status & (1 << 5) != 0 {
        // RXNE; reading the data register clears it
        let byte = unsafe { read_reg(USART1_BASE + USART_DATAR) } as u8;
        let _action = SHARED.on_serial_rx(byte);
        debug!("RX {=u8:#x}: {:?}", byte, _action);
    }
}
