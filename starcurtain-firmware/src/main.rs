//! Starcurtain - LED star-field firmware
//!
//! Main firmware binary for RP2040-based panel controllers. Drives five
//! WS2812 panels with drifting "stars" and takes live reconfiguration over
//! a UART text protocol.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Async, Channel, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{PIO0, PIO1, UART0};
use embassy_rp::pio::Pio;
use embassy_rp::pio_programs::ws2812::{PioWs2812, PioWs2812Program};
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUart, Config as UartConfig};
use embassy_time::{Instant, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use starcurtain_core::command::Registry;
use starcurtain_core::config::{parse_config, ShowConfig};
use starcurtain_core::Show;

use crate::drivers::{PanelStrips, LEDS_PER_PANEL, PANELS, PIXELS};
use crate::tasks::CurtainShow;

/// Embedded show settings (compiled into firmware)
/// Edit starcurtain.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../starcurtain.toml");

/// Host link baud rate
const BAUD_RATE: u32 = 115_200;

/// ADC samples mixed into the RNG seed
const SEED_SAMPLES: usize = 16;

mod channels;
mod drivers;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
    PIO1_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO1>;
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 1024]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

// The show is too large for a task stack
static SHOW: StaticCell<CurtainShow> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Starcurtain firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let settings = load_settings();

    // Seed the star field from ADC noise on the temperature sensor
    let mut adc = Adc::new(p.ADC, Irqs, embassy_rp::adc::Config::default());
    let mut sensor = Channel::new_temp_sensor(p.ADC_TEMP_SENSOR);
    let seed = entropy_seed(&mut adc, &mut sensor).await;
    debug!("RNG seed {=u64:x}", seed);

    let show = match Show::new(&settings, seed, Registry::standard()) {
        Ok(show) => show,
        Err(e) => {
            error!("Layout rejected: {:?}", e);
            error!("Using default configuration");
            unwrap!(Show::new(&ShowConfig::default(), seed, Registry::standard()))
        }
    };
    let show = SHOW.init(show);
    info!(
        "Show ready: {} panels, {} LEDs, {} stars",
        PANELS,
        PIXELS,
        show.stars().active()
    );

    // Host link on UART0 (GPIO0 TX, GPIO1 RX)
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = BAUD_RATE;

    let tx_buf = TX_BUF.init([0u8; 1024]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = BufferedUart::new(p.UART0, p.PIN_0, p.PIN_1, Irqs, tx_buf, rx_buf, uart_config);
    let (tx, rx) = uart.split();

    info!("UART initialized at {} baud", BAUD_RATE);

    // Panel data lines: PIO0 SM0-3 on GPIO2-5, PIO1 SM0 on GPIO6
    let Pio {
        common: mut common0,
        sm0: sm0_0,
        sm1: sm0_1,
        sm2: sm0_2,
        sm3: sm0_3,
        ..
    } = Pio::new(p.PIO0, Irqs);
    let Pio {
        common: mut common1,
        sm0: sm1_0,
        ..
    } = Pio::new(p.PIO1, Irqs);

    let program0 = PioWs2812Program::new(&mut common0);
    let program1 = PioWs2812Program::new(&mut common1);

    let strips = PanelStrips::new(
        PioWs2812::<_, 0, LEDS_PER_PANEL>::new(&mut common0, sm0_0, p.DMA_CH0, p.PIN_2, &program0),
        PioWs2812::<_, 1, LEDS_PER_PANEL>::new(&mut common0, sm0_1, p.DMA_CH1, p.PIN_3, &program0),
        PioWs2812::<_, 2, LEDS_PER_PANEL>::new(&mut common0, sm0_2, p.DMA_CH2, p.PIN_4, &program0),
        PioWs2812::<_, 3, LEDS_PER_PANEL>::new(&mut common0, sm0_3, p.DMA_CH3, p.PIN_5, &program0),
        PioWs2812::<_, 0, LEDS_PER_PANEL>::new(&mut common1, sm1_0, p.DMA_CH4, p.PIN_6, &program1),
    );

    info!("PIO WS2812 strips initialized");

    // Spawn tasks
    spawner.spawn(tasks::serial_rx_task(rx)).unwrap();
    spawner.spawn(tasks::serial_tx_task(tx)).unwrap();
    spawner.spawn(tasks::animation_task(show, strips)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Parse the embedded settings, falling back to defaults
///
/// The layout must also match the compiled panel geometry, since the strip
/// driver splits the frame by panel.
fn load_settings() -> ShowConfig {
    let settings = match parse_config(EMBEDDED_CONFIG) {
        Ok(settings) => settings,
        Err(e) => {
            error!(
                "Failed to parse embedded config at line {}: {:?}",
                e.line(),
                e
            );
            error!("Using default configuration");
            return ShowConfig::default();
        }
    };

    let layout = settings.layout;
    if layout.panels != PANELS || layout.pixels_per_panel() != LEDS_PER_PANEL {
        error!(
            "Configured layout {}x{}x{} does not match the {} x {} LED build",
            layout.panels,
            layout.width,
            layout.height,
            PANELS,
            LEDS_PER_PANEL
        );
        error!("Using default configuration");
        return ShowConfig::default();
    }

    info!("Parsed embedded configuration successfully");
    settings
}

/// Mix boot time with the noisy low bits of a few ADC samples
async fn entropy_seed(adc: &mut Adc<'_, Async>, sensor: &mut Channel<'_>) -> u64 {
    let mut seed = Instant::now().as_ticks();
    for _ in 0..SEED_SAMPLES {
        match adc.read(sensor).await {
            Ok(sample) => seed = seed.rotate_left(7) ^ sample as u64,
            Err(e) => warn!("ADC read failed: {:?}", e),
        }
        Timer::after_micros(50).await;
    }
    seed
}
