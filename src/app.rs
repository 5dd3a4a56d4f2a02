use crate::config::{load_settings, project_paths, Args, Settings, StoredSettings};
use crate::error::{CRITICAL_FAULT_MESSAGE, SETUP_FAULT_MESSAGE, TERMINAL_FAULT_MESSAGE};
use crate::input::{collect_input_nonblocking, map_event_to_action};
use crate::logging;
use crate::model::{GameState, MessageKind, Rules};
use crate::render::{draw_frame, Palette, Terminal};
use crate::sim::PlayerAction;
use anyhow::{anyhow, Context};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::time::{Duration, Instant};

pub(crate) struct App {
    /// As read from disk, written back on exit without CLI overrides.
    stored: StoredSettings,
    settings: Settings,
    rules: Rules,
    state: GameState,
    rng: StdRng,
    term: Terminal,
    should_quit: bool,
}

impl App {
    fn init(args: &Args) -> anyhow::Result<Self> {
        let paths = project_paths();
        let log_path = args
            .log_file
            .clone()
            .or_else(|| paths.as_ref().ok().map(|p| p.log_path.clone()));
        let logger = match &log_path {
            Some(path) => logging::init(path),
            None => Err(anyhow!("no place for a log file")),
        };
        if let Some(path) = &log_path {
            log::info!("starting, log at {}", path.display());
        }

        let settings_path = match &paths {
            Ok(p) => Some(p.settings_path.as_path()),
            Err(e) => {
                log::error!("data directory unavailable: {e:#}");
                None
            }
        };
        let (mut state, stored) = load_session(settings_path);
        if logger.is_err() {
            // Nowhere to log to; the feed is the only report left.
            setup_fault(&mut state);
        }

        let mut settings = stored.settings.clone();
        settings.apply_args(args);
        let rules = settings.rules();
        log::info!(
            "seed={} adopt_cost={} fps={}",
            settings.seed,
            rules.adopt_cost,
            settings.fps_cap
        );

        let rng = StdRng::seed_from_u64(settings.seed);
        let term = Terminal::begin().context(TERMINAL_FAULT_MESSAGE)?;

        Ok(Self {
            stored,
            settings,
            rules,
            state,
            rng,
            term,
            should_quit: false,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let fps = self.settings.fps_cap.clamp(10, 120);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);
        let palette = Palette::new(self.settings.enable_color);

        while !self.should_quit {
            let frame_start = Instant::now();
            self.term.resize_if_needed()?;

            for ev in collect_input_nonblocking(frame_dt)? {
                match map_event_to_action(self.state.scene, &ev) {
                    Some(PlayerAction::Quit) => {
                        self.should_quit = true;
                        break;
                    }
                    Some(action) => self.state.apply(action, &self.rules, &mut self.rng),
                    None => {}
                }
            }

            self.state.tick_animations();

            draw_frame(&mut self.term.cur, &self.state, self.rules.adopt_cost, &palette);
            self.term.present()?;

            spin_sleep(frame_dt, frame_start);
        }
        Ok(())
    }

    fn shutdown(&mut self) -> anyhow::Result<()> {
        self.term.end()?;
        self.stored.write_back()?;
        log::info!(
            "exiting with {} coins and {} flamingos",
            self.state.coins,
            self.state.birds.len()
        );
        Ok(())
    }
}

/// Reads the settings file and builds the starting session. Any failure is
/// a setup fault: the player is told, play starts from defaults, and the
/// unreadable file is never written back.
pub(crate) fn load_session(settings_path: Option<&Path>) -> (GameState, StoredSettings) {
    let mut state = GameState::new();
    let loaded = match settings_path {
        Some(path) => load_settings(path).map(|s| (s, path.to_path_buf())),
        None => Err(anyhow!("no settings location")),
    };
    let stored = match loaded {
        Ok((settings, path)) => StoredSettings {
            settings,
            path: Some(path),
        },
        Err(e) => {
            log::error!("setup failed, falling back to defaults: {e:#}");
            setup_fault(&mut state);
            StoredSettings {
                settings: Settings::default(),
                path: None,
            }
        }
    };
    (state, stored)
}

fn setup_fault(state: &mut GameState) {
    state.reset();
    state.push_message(MessageKind::Error, SETUP_FAULT_MESSAGE);
}

/// Combines the loop result with the terminal teardown. A failed loop is
/// reported to the player with the critical message, its cause chained below.
fn finish(res: anyhow::Result<()>, end: anyhow::Result<()>) -> anyhow::Result<()> {
    if let Err(e) = &res {
        log::error!("game loop failed: {e:#}");
    }
    res.context(CRITICAL_FAULT_MESSAGE).and(end)
}

pub(crate) fn run(args: &Args) -> anyhow::Result<()> {
    let mut app = App::init(args)?;
    let res = app.run();
    // Restore the terminal even when the loop failed.
    let end = app.shutdown();
    finish(res, end)
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, start: Instant) {
    let end = start + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
