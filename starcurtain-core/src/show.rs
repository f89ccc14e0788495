//! The whole show: simulation, effects, idle cycle and command dispatch
//!
//! [`Show`] owns every piece of mutable state and is driven by one control
//! loop. Per frame the loop hands it any received command lines, calls
//! [`Show::tick`] with the current time, then [`Show::render`] and
//! [`Show::flush`].

use starcurtain_protocol::{parse, Command};

use crate::command::{Context, Registry};
use crate::config::{LayoutError, ShowConfig, SimConfig};
use crate::effects::{EffectEvent, Effects, IdleAction, IdleMonitor, IdlePhase, IdleSequencer};
use crate::render::FrameBuffer;
use crate::sim::Starfield;
use crate::traits::LedTransport;

/// Shortest frame step fed to the simulation
pub const MIN_DT_MS: u64 = 1;

/// Longest frame step fed to the simulation
pub const MAX_DT_MS: u64 = 100;

/// Recipient named in completion notifications
const NOTIFY_TARGET: &str = "host";

/// Clamp a measured frame interval to the range the simulation accepts
pub fn clamp_dt_ms(elapsed_ms: u64) -> u32 {
    elapsed_ms.clamp(MIN_DT_MS, MAX_DT_MS) as u32
}

pub struct Show<'h, const CAP: usize, const PIXELS: usize> {
    config: SimConfig,
    stars: Starfield<CAP>,
    effects: Effects<CAP>,
    frame: FrameBuffer<PIXELS>,
    idle: IdleMonitor,
    sequencer: IdleSequencer,
    registry: Registry<'h, CAP>,
    now_ms: u64,
}

impl<'h, const CAP: usize, const PIXELS: usize> Show<'h, CAP, PIXELS> {
    /// Build a show from loaded settings
    ///
    /// Fails when the panel layout does not cover exactly `PIXELS` LEDs.
    pub fn new(
        settings: &ShowConfig,
        seed: u64,
        registry: Registry<'h, CAP>,
    ) -> Result<Self, LayoutError> {
        settings.layout.validate(PIXELS)?;

        let mut stars = Starfield::new(settings.layout, seed);
        stars.seed(&settings.sim);
        stars.set_active(settings.initial_stars);

        Ok(Self {
            config: settings.sim,
            stars,
            effects: Effects::new(),
            frame: FrameBuffer::new(),
            idle: IdleMonitor::new(settings.idle.timeout_ms),
            sequencer: IdleSequencer::new(settings.idle),
            registry,
            now_ms: 0,
        })
    }

    /// Parse and dispatch one framed line, returning its response
    pub fn handle_line(&mut self, line: &str) -> Command {
        match parse(line) {
            Ok(cmd) => self.handle_command(&cmd),
            Err(e) => Command::error("parse", e.reason()),
        }
    }

    /// Dispatch one command, returning its response
    pub fn handle_command(&mut self, cmd: &Command) -> Command {
        let mut ctx = Context {
            config: &mut self.config,
            stars: &mut self.stars,
            effects: &mut self.effects,
            idle: &mut self.idle,
            idle_phase: self.sequencer.phase(),
            now_ms: self.now_ms,
        };
        self.registry.dispatch(cmd, &mut ctx)
    }

    /// Advance the clocks, effects and idle cycle to `now_ms`
    ///
    /// Returns the completion notification when an effect finishes.
    pub fn tick(&mut self, now_ms: u64) -> Option<Command> {
        let delta = now_ms.saturating_sub(self.now_ms).min(u32::MAX as u64) as u32;
        self.now_ms = now_ms;
        self.idle.update_time(delta);

        let event = self
            .effects
            .update(now_ms, &mut self.stars, &mut self.config);

        let action = self.sequencer.tick(
            now_ms,
            self.idle.is_idle(),
            self.effects.is_active(),
            event,
            self.stars.active(),
        );
        self.apply_idle_action(action);

        event.and_then(notification)
    }

    fn apply_idle_action(&mut self, action: IdleAction) {
        let started = match action {
            IdleAction::None => Ok(()),
            IdleAction::StartBuildup {
                duration_s,
                multiplier,
            } => self.effects.start_buildup(
                self.now_ms,
                duration_s,
                multiplier,
                &mut self.stars,
                &mut self.config,
            ),
            IdleAction::StartClimax { duration_s, boost } => self.effects.start_climax(
                self.now_ms,
                duration_s,
                boost,
                &mut self.stars,
                &mut self.config,
            ),
            IdleAction::Reset { stars } => {
                self.stars.set_active(stars);
                self.stars.reset_active(&self.config);
                Ok(())
            }
        };

        if started.is_err() {
            self.sequencer.rest(self.now_ms);
        }
    }

    /// Fade the previous frame and draw every star moved by `dt_ms`
    pub fn render(&mut self, dt_ms: u32) {
        self.frame.fade_all(self.config.fade);
        self.stars
            .advance(dt_ms as f32 / 1000.0, &self.config, &mut self.frame);
    }

    /// Push the frame to the LEDs
    pub fn flush<T: LedTransport>(&self, out: &mut T) {
        self.frame.flush(out);
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn stars(&self) -> &Starfield<CAP> {
        &self.stars
    }

    pub fn effects(&self) -> &Effects<CAP> {
        &self.effects
    }

    pub fn frame(&self) -> &FrameBuffer<PIXELS> {
        &self.frame
    }

    pub fn idle(&self) -> &IdleMonitor {
        &self.idle
    }

    pub fn idle_phase(&self) -> IdlePhase {
        self.sequencer.phase()
    }

    /// Target frame period
    pub fn frame_ms(&self) -> u32 {
        self.config.frame_ms
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }
}

/// `!!event:<name>:{to=host}##` for a finished effect
fn notification(event: EffectEvent) -> Option<Command> {
    let mut cmd = Command::new("event", event.notification()).ok()?;
    cmd.set_param("to", NOTIFY_TARGET).ok()?;
    Some(cmd)
}
