use crate::config::Settings;
use crate::gitlog::recent_commits;
use crate::heat::HeatField;
use crate::input::{spawn_reader, InputEvent};
use crate::palette::Palette;
use crate::render::{FireRenderer, Surface, Terminal};
use crate::ticker::Ticker;
use anyhow::Context;
use rand::{rngs::StdRng, SeedableRng};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LoopState {
    Running,
    /// The input reader is gone; finish this frame, then stop.
    Draining,
    Stopped,
}

/// Owns everything that changes from frame to frame. Only the render thread
/// touches it; the reader thread talks to it through `events` alone.
pub(crate) struct FrameLoop<S: Surface> {
    surface: S,
    events: Receiver<InputEvent>,
    field: HeatField,
    palette: Palette,
    renderer: FireRenderer,
    ticker: Option<Ticker>,
    settings: Settings,
    state: LoopState,
    frame: u64,
}

impl<S: Surface> FrameLoop<S> {
    pub(crate) fn new(
        surface: S,
        events: Receiver<InputEvent>,
        ticker: Option<Ticker>,
        settings: Settings,
        rng: StdRng,
    ) -> Self {
        let (cols, rows) = surface.size();
        Self {
            field: HeatField::new(cols as usize, rows as usize, rng),
            palette: settings.mode.palette(),
            renderer: FireRenderer::new(ticker.is_some()),
            ticker,
            surface,
            events,
            settings,
            state: LoopState::Running,
            frame: 0,
        }
    }

    pub(crate) fn state(&self) -> LoopState {
        self.state
    }

    pub(crate) fn frame(&self) -> u64 {
        self.frame
    }

    #[cfg(test)]
    pub(crate) fn surface(&self) -> &S {
        &self.surface
    }

    pub(crate) fn into_surface(self) -> S {
        self.surface
    }

    /// Take at most one queued event; never blocks.
    fn poll_input(&mut self) {
        match self.events.try_recv() {
            Ok(ev) => self.handle(ev),
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                log::info!("input closed, stopping after this frame");
                self.state = LoopState::Draining;
            }
        }
    }

    fn handle(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::Key => {
                log::info!("key pressed after {} frames", self.frame);
                self.state = LoopState::Stopped;
            }
            InputEvent::Resize(cols, rows) => {
                if cols == 0 || rows == 0 {
                    log::info!("resized to {cols}x{rows}, nothing left to draw");
                    self.state = LoopState::Stopped;
                    return;
                }
                log::debug!("resized to {cols}x{rows}");
                self.surface.resize(cols, rows);
                self.field.resize(cols as usize, rows as usize);
            }
        }
    }

    /// Simulate and draw one frame, without sleeping.
    pub(crate) fn step(&mut self) -> anyhow::Result<()> {
        if self.state == LoopState::Running {
            self.poll_input();
        }
        if self.state == LoopState::Stopped {
            return Ok(());
        }

        self.field.inject(self.field.sparks_per_frame());
        self.field.step();
        self.renderer
            .paint_field(&mut self.surface, &self.field, &self.palette);
        if let Some(ticker) = self.ticker.as_mut() {
            ticker.render(&mut self.surface);
            ticker.tick(self.frame);
        }
        self.surface.present()?;

        if self.state == LoopState::Draining {
            self.state = LoopState::Stopped;
        }
        self.frame += 1;
        Ok(())
    }

    /// Run until stopped, or for `max_frames` frames when given.
    pub(crate) fn run(&mut self, max_frames: Option<u64>) -> anyhow::Result<()> {
        while self.state != LoopState::Stopped {
            if max_frames.is_some_and(|n| self.frame >= n) {
                break;
            }
            self.step()?;
            if self.state != LoopState::Stopped {
                thread::sleep(self.settings.frame_delay);
            }
        }
        Ok(())
    }
}

pub(crate) fn run(settings: Settings) -> anyhow::Result<()> {
    let ticker = recent_commits(settings.max_commits, settings.git_dir.as_deref())
        .and_then(|text| Ticker::build(&text, settings.max_commits, settings.ticker_cadence));
    if ticker.is_none() {
        log::info!("no commit history, ticker disabled");
    }

    let mut term = Terminal::begin().context("initializing terminal")?;
    let (cols, rows) = term.size();
    if cols == 0 || rows == 0 {
        return term.end();
    }

    let events = spawn_reader();
    let mut frames = FrameLoop::new(term, events, ticker, settings, StdRng::from_entropy());
    let res = frames.run(None);
    log::info!("{:?} after {} frames", frames.state(), frames.frame());

    let mut term = frames.into_surface();
    // Always restore the terminal, even if a frame failed.
    let end = term.end();
    res.and(end)
}
