//! Animation task
//!
//! Sole owner of the [`Show`]. Each frame it drains queued commands,
//! advances effects and the idle cycle, renders the star field and writes it
//! to the panels, then sleeps out the rest of the frame period.

use defmt::*;
use embassy_time::{Duration, Instant, Timer};

use starcurtain_core::config::MAX_STARS;
use starcurtain_core::effects::IdlePhase;
use starcurtain_core::show::clamp_dt_ms;
use starcurtain_core::Show;
use starcurtain_protocol::{Command, MessageKind};

use crate::channels::{COMMAND_CHANNEL, RESPONSE_CHANNEL};
use crate::drivers::{PanelStrips, PIXELS};

/// The show as built for this board
pub type CurtainShow = Show<'static, MAX_STARS, PIXELS>;

/// Animation task - the control loop
#[embassy_executor::task]
pub async fn animation_task(show: &'static mut CurtainShow, mut strips: PanelStrips) {
    info!("Animation task started");

    let start = Instant::now();
    let mut last = start;
    let mut phase = show.idle_phase();

    loop {
        let frame_start = Instant::now();

        while let Ok(line) = COMMAND_CHANNEL.try_receive() {
            let response = show.handle_line(&line);
            log_response(&response);
            queue(&response);
        }

        let dt_ms = clamp_dt_ms(frame_start.duration_since(last).as_millis());
        last = frame_start;

        if let Some(note) = show.tick(start.elapsed().as_millis()) {
            info!("Effect finished: {}", note.command.as_str());
            queue(&note);
        }

        let now_phase = show.idle_phase();
        if now_phase != phase {
            log_phase(now_phase);
            phase = now_phase;
        }

        show.render(dt_ms);
        show.flush(&mut strips);
        strips.write().await;

        let period = Duration::from_millis(show.frame_ms() as u64);
        Timer::at(frame_start + period).await;
    }
}

/// Encode and hand a frame to the TX task, dropping it if the queue is full
fn queue(cmd: &Command) {
    match cmd.encode_to_string() {
        Ok(frame) => {
            if RESPONSE_CHANNEL.try_send(frame).is_err() {
                warn!("Response channel full, dropping {}", cmd.command.as_str());
            }
        }
        Err(e) => warn!("Failed to encode {}: {:?}", cmd.command.as_str(), e),
    }
}

fn log_response(response: &Command) {
    let status = response.param_or("status", "");
    match response.kind() {
        MessageKind::Error => warn!(
            "{} failed: {}",
            response.command.as_str(),
            response.param_or("message", "")
        ),
        _ => debug!(
            "{}:{} -> {}",
            response.msg_type.as_str(),
            response.command.as_str(),
            status
        ),
    }
}

fn log_phase(phase: IdlePhase) {
    match phase {
        IdlePhase::Waiting => info!("Idle cycle waiting"),
        IdlePhase::Buildup => info!("Display idle, starting buildup"),
        IdlePhase::Climax => info!("Idle climax"),
        IdlePhase::Rest => info!("Idle cycle resting"),
    }
}
