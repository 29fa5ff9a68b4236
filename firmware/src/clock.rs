//! Timer reload values derived from the game configuration

/// Core clock after reset (HSI, PLL off)
pub const HCLK_HZ: u32 = 24_000_000;

/// Transcript baud rate
pub const BAUD_RATE: u32 = 9600;

/// Counter rate of the sampling timer
pub const SAMPLE_TIMER_HZ: u32 = 10_000;

/// Prescaler and auto-reload pair for a basic timer
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerPeriod {
    pub prescaler: u16,
    pub reload: u16,
}

/// SysTick compare value for one tick of `tick_ms`
pub const fn systick_compare(hclk: u32, tick_ms: u32) -> u32 {
    (hclk / 1000) * tick_ms - 1
}

/// TIM2 settings for the button sampling period
pub const fn sample_timer(hclk: u32, sample_interval_ms: u32) -> TimerPeriod {
    TimerPeriod {
        prescaler: (hclk / SAMPLE_TIMER_HZ - 1) as u16,
        reload: (sample_interval_ms * (SAMPLE_TIMER_HZ / 1000) - 1) as u16,
    }
}

/// USART baud rate register, rounded to nearest
pub const fn usart_brr(hclk: u32, baud: u32) -> u32 {
    (hclk + baud / 2) / baud
}
