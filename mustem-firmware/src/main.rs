//! MUSTEM - Sensor Board Firmware
//!
//! Main firmware binary for the RP2040 sensor board. Samples a microphone,
//! extracts loudness, pitch, band levels and beats per block, and drives:
//!
//! - the display board over a line-oriented serial link
//! - three vibration motors (bass, mid, treble)
//! - a telemetry line to the host

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::adc::{self, Adc};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::Pull;
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::{UART0, UART1};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Timer;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use mustem_core::config::HapticConfig;
use mustem_drivers::motor::{PwmVibration, VibrationConfig, VibrationMotor};

mod channels;
mod config;
mod mic;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});

/// Display link and host link speed
const BAUD_RATE: u32 = 115_200;

/// PWM wrap value: 125 MHz / 6250 = 20 kHz, above the audible range
const PWM_TOP: u16 = 6249;

/// Runs the sampler above the thread-mode tasks
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

// Static cells for UART buffers (must live forever)
// The display TX buffer holds most of a winding burst
static DISPLAY_TX_BUF: StaticCell<[u8; 1024]> = StaticCell::new();
static DISPLAY_RX_BUF: StaticCell<[u8; 16]> = StaticCell::new();
static HOST_TX_BUF: StaticCell<[u8; 128]> = StaticCell::new();
static HOST_RX_BUF: StaticCell<[u8; 16]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("MUSTEM firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load_config();

    // Microphone on GPIO26 (ADC0)
    let adc = Adc::new_blocking(p.ADC, adc::Config::default());
    let mic_channel = adc::Channel::new_pin(p.PIN_26, Pull::None);
    let mic = mic::MicInput::new(adc, mic_channel);

    // Display link on UART1 (GPIO8=TX, GPIO9=RX unused)
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = BAUD_RATE;

    let display_uart = Uart::new_blocking(p.UART1, p.PIN_8, p.PIN_9, uart_config);
    let display_uart = display_uart.into_buffered(
        Irqs,
        DISPLAY_TX_BUF.init([0u8; 1024]),
        DISPLAY_RX_BUF.init([0u8; 16]),
    );
    let (display_tx, _display_rx) = display_uart.split();

    // Host link on UART0 (GPIO0=TX, GPIO1=RX unused)
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = BAUD_RATE;

    let host_uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let host_uart = host_uart.into_buffered(
        Irqs,
        HOST_TX_BUF.init([0u8; 128]),
        HOST_RX_BUF.init([0u8; 16]),
    );
    let (host_tx, _host_rx) = host_uart.split();

    info!("UARTs initialized at {} baud", BAUD_RATE);

    // Vibration motors (GPIO2=bass, GPIO6=mid, GPIO10=treble)
    let mut pwm_config = PwmConfig::default();
    pwm_config.top = PWM_TOP;
    pwm_config.compare_a = 0;

    let motors = (
        vibration_motor(
            Pwm::new_output_a(p.PWM_SLICE1, p.PIN_2, pwm_config.clone()),
            &config.haptic,
        ),
        vibration_motor(
            Pwm::new_output_a(p.PWM_SLICE3, p.PIN_6, pwm_config.clone()),
            &config.haptic,
        ),
        vibration_motor(
            Pwm::new_output_a(p.PWM_SLICE5, p.PIN_10, pwm_config),
            &config.haptic,
        ),
    );

    // Spawn tasks
    spawner.spawn(tasks::display_tx_task(display_tx)).unwrap();
    spawner.spawn(tasks::telemetry_task(host_tx)).unwrap();
    spawner.spawn(tasks::analysis_task(config)).unwrap();

    // Sampler preempts analysis and the UART writers
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let high_spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    high_spawner
        .spawn(tasks::sampler_task(mic, config.sampling))
        .unwrap();

    match motors {
        (Some(bass), Some(mid), Some(treble)) => {
            spawner
                .spawn(tasks::haptic_task([bass, mid, treble]))
                .unwrap();
        }
        _ => error!("PWM outputs unavailable, haptics disabled"),
    }

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        Timer::after_secs(60).await;
        debug!(
            "Dropped blocks: {}",
            channels::DROPPED_BLOCKS.load(portable_atomic::Ordering::Relaxed)
        );
    }
}

/// Bind a vibration motor driver to channel A of a PWM slice
fn vibration_motor(pwm: Pwm<'static>, config: &HapticConfig) -> Option<tasks::Motor> {
    let (output, _) = pwm.split();
    let motor = VibrationMotor::new(VibrationConfig::from(config));
    Some(PwmVibration::new(motor, output?))
}
