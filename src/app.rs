use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{info, warn};

use crate::games::kart::KartGame;
use crate::games::reflex::ReflexGame;
use crate::games::Game;
use crate::motion::rig::{self, CaptureRig};
use crate::motion::smoother::{SignalSmoother, StrideMeter};
use crate::motion::{InputProfile, InputSnapshot, InputSource};
use crate::scores::HighScores;

const MAX_NAME_LEN: usize = 9;
/// Assumed frame time for the very first tick, before a delta exists.
const NOMINAL_TICK_MS: f32 = 16.0;
/// Clamp for delta time after a stall, so games never see a huge step.
const MAX_TICK_MS: f32 = 100.0;

#[derive(Clone, Copy, PartialEq)]
pub enum Tab {
    Home,
    Kart,
    Reflex,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Home, Tab::Kart, Tab::Reflex]
    }

    pub fn title(&self) -> &str {
        match self {
            Tab::Home => " Home ",
            Tab::Kart => " Kart ",
            Tab::Reflex => " Reflex ",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Home => 0,
            Tab::Kart => 1,
            Tab::Reflex => 2,
        }
    }
}

pub struct App {
    pub should_quit: bool,
    pub current_tab: Tab,
    pub selected_game: usize, // 0-1 for home screen game selection
    pub kart: KartGame,
    pub reflex: ReflexGame,
    pub high_scores: HighScores,
    pub show_high_scores: bool,
    // Name entry state
    pub entering_name: bool,
    pub name_buffer: String,
    pub name_game_idx: usize,
    pub name_score: u32,
    // Motion input pipeline. The app owns one context and threads it into
    // every update call; games never read capture state by name.
    pub source: InputSource,
    pub source_note: Option<String>,
    rig: Option<CaptureRig>,
    smoother: SignalSmoother,
    stride: StrideMeter,
    started_at: Instant,
    last_tick: Option<Instant>,
}

impl App {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            current_tab: Tab::Home,
            selected_game: 0,
            kart: KartGame::new(),
            reflex: ReflexGame::new(),
            high_scores: HighScores::load(),
            show_high_scores: false,
            entering_name: false,
            name_buffer: String::new(),
            name_game_idx: 0,
            name_score: 0,
            source: InputSource::Keyboard,
            source_note: None,
            rig: None,
            smoother: SignalSmoother::new(InputProfile::STEER.alpha),
            stride: StrideMeter::new(),
            started_at: Instant::now(),
            last_tick: None,
        }
    }

    /// Wire in an already-running capture rig and make it current. Device
    /// backends (and tests) enter the pipeline through here.
    pub fn attach_rig(&mut self, rig: CaptureRig) {
        self.rig = Some(rig);
        self.source = InputSource::Camera;
        self.source_note = None;
    }

    fn profile(&self) -> InputProfile {
        match self.current_tab {
            Tab::Home => InputProfile::STEER,
            Tab::Kart => self.kart.input_profile(),
            Tab::Reflex => self.reflex.input_profile(),
        }
    }

    fn tick_delta_ms(&mut self) -> f32 {
        let now = Instant::now();
        let dt = match self.last_tick {
            Some(prev) => (now - prev).as_secs_f32() * 1000.0,
            None => NOMINAL_TICK_MS,
        };
        self.last_tick = Some(now);
        dt.min(MAX_TICK_MS)
    }

    /// Assemble this tick's input snapshot from the current source.
    fn snapshot(&mut self, dt_ms: f32) -> InputSnapshot {
        let profile = self.profile();
        self.smoother.set_alpha(profile.alpha);

        let rig = match (self.source, self.rig.as_ref()) {
            (InputSource::Camera, Some(rig)) => rig,
            _ => return InputSnapshot::idle(dt_ms),
        };

        let signal = rig.latest_signal();
        let (swipe, spread) = rig.take_events();
        if signal.presence {
            self.smoother.update(signal.x);
        }
        let raw_throttle = if profile.stride_throttle && signal.presence {
            let now_ms = self.started_at.elapsed().as_secs_f64() * 1000.0;
            self.stride.observe(now_ms, signal.y)
        } else {
            0.0
        };
        self.smoother.update_throttle(raw_throttle);

        InputSnapshot {
            dt_ms,
            steer: self.smoother.steer(),
            throttle: self.smoother.throttle(),
            presence: signal.presence,
            confidence: signal.confidence,
            swipe,
            spread,
            source: InputSource::Camera,
        }
    }

    pub fn on_tick(&mut self) {
        let dt_ms = self.tick_delta_ms();
        // Don't update games while entering a name
        if self.entering_name {
            return;
        }

        let snapshot = self.snapshot(dt_ms);
        match self.current_tab {
            Tab::Home => {}
            Tab::Kart => self.kart.update(&snapshot),
            Tab::Reflex => self.reflex.update(&snapshot),
        }
        // Check for high scores when games end
        self.check_submit_scores();
    }

    fn check_submit_scores(&mut self) {
        let games: [(usize, bool, u32); 2] = [
            (0, self.kart.is_game_over(), self.kart.get_score()),
            (1, self.reflex.is_game_over(), self.reflex.get_score()),
        ];
        for (idx, game_over, score) in games {
            if game_over && score > 0 && !self.high_scores.was_submitted(idx) {
                if self.high_scores.qualifies(idx, score) {
                    // Prompt for name entry
                    self.entering_name = true;
                    self.name_buffer.clear();
                    self.name_game_idx = idx;
                    self.name_score = score;
                    self.high_scores.mark_submitted(idx);
                    return; // Only one at a time
                } else {
                    self.high_scores.mark_submitted(idx);
                }
            }
            if !game_over && self.high_scores.was_submitted(idx) {
                self.high_scores.clear_submitted(idx);
            }
        }
    }

    /// Explicit input-source switch. The camera path only becomes current
    /// when a rig actually exists; a denied or missing device leaves the
    /// keyboard current and posts a note instead of blocking.
    fn toggle_source(&mut self) {
        match self.source {
            InputSource::Camera => {
                if let Some(mut rig) = self.rig.take() {
                    rig.stop();
                }
                self.source = InputSource::Keyboard;
                self.source_note = Some("camera stopped; keyboard input".into());
                self.smoother.reset();
                self.stride.reset();
            }
            InputSource::Keyboard => {
                if self.rig.is_some() {
                    self.source = InputSource::Camera;
                    self.source_note = None;
                    return;
                }
                match rig::open_default() {
                    Ok(rig) => {
                        info!("camera capture started");
                        self.attach_rig(rig);
                    }
                    Err(err) => {
                        warn!("camera unavailable: {err}; continuing with keyboard input");
                        self.source_note =
                            Some(format!("camera unavailable ({err}); keyboard input"));
                    }
                }
            }
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        // Ctrl+C always quits
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        // If entering a name, intercept all input
        if self.entering_name {
            self.handle_name_input(key);
            return;
        }

        // Global keys
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                if matches!(self.current_tab, Tab::Home) {
                    self.should_quit = true;
                    return;
                }
            }
            KeyCode::Char('v') | KeyCode::Char('V') => {
                self.toggle_source();
                return;
            }
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.prev_tab();
                } else {
                    self.next_tab();
                }
                return;
            }
            KeyCode::BackTab => {
                self.prev_tab();
                return;
            }
            KeyCode::Esc => {
                if !matches!(self.current_tab, Tab::Home) {
                    self.current_tab = Tab::Home;
                    return;
                }
            }
            _ => {}
        }

        // Home screen shortcuts and navigation
        if matches!(self.current_tab, Tab::Home) && key.modifiers.is_empty() {
            match key.code {
                KeyCode::Char('1') => {
                    self.current_tab = Tab::Kart;
                    return;
                }
                KeyCode::Char('2') => {
                    self.current_tab = Tab::Reflex;
                    return;
                }
                KeyCode::Char('h') | KeyCode::Char('H') => {
                    self.show_high_scores = !self.show_high_scores;
                    return;
                }
                KeyCode::Left | KeyCode::Right => {
                    self.selected_game = (self.selected_game + 1) % 2;
                    return;
                }
                KeyCode::Enter => {
                    self.current_tab = match self.selected_game {
                        0 => Tab::Kart,
                        _ => Tab::Reflex,
                    };
                    return;
                }
                _ => {}
            }
        }

        // Forward to active game
        match self.current_tab {
            Tab::Home => {}
            Tab::Kart => self.kart.handle_input(key),
            Tab::Reflex => self.reflex.handle_input(key),
        }
    }

    fn handle_name_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                // Submit the score with the entered name
                let name = if self.name_buffer.is_empty() {
                    "???".to_string()
                } else {
                    self.name_buffer.clone()
                };
                self.high_scores
                    .submit(self.name_game_idx, &name, self.name_score);
                self.entering_name = false;
                self.name_buffer.clear();
            }
            KeyCode::Backspace => {
                self.name_buffer.pop();
            }
            KeyCode::Esc => {
                // Cancel — submit with default name
                self.high_scores
                    .submit(self.name_game_idx, "???", self.name_score);
                self.entering_name = false;
                self.name_buffer.clear();
            }
            KeyCode::Char(c) => {
                // Only allow printable ASCII characters, up to MAX_NAME_LEN
                if self.name_buffer.chars().count() < MAX_NAME_LEN && c.is_ascii_graphic() {
                    self.name_buffer.push(c.to_ascii_uppercase());
                }
            }
            _ => {}
        }
    }

    fn next_tab(&mut self) {
        let tabs = Tab::all();
        let idx = self.current_tab.index();
        self.current_tab = tabs[(idx + 1) % tabs.len()];
    }

    fn prev_tab(&mut self) {
        let tabs = Tab::all();
        let idx = self.current_tab.index();
        self.current_tab = tabs[(idx + tabs.len() - 1) % tabs.len()];
    }
}
