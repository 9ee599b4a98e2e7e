use crossterm::event::{KeyCode, KeyEvent};
use rand::Rng;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::games::Game;
use crate::motion::{InputProfile, InputSnapshot};

const KART_WIDTH: usize = 4;
const KART_ROWS: usize = 2;
const STARTING_LIVES: u32 = 3;
/// Columns per second at full steer deflection.
const STEER_SPEED: f32 = 28.0;
/// Columns a keyboard tap nudges the kart.
const KEY_STEP: f32 = 2.0;
/// Post-collision grace period.
const INVULN_MS: f32 = 1000.0;

/// Which smoothing/speed personality the session runs with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KartMode {
    /// Steering-heavy cruising.
    Cruise,
    /// Throttle comes from running in place (or mashing ↑).
    Sprint,
    /// Slow drift.
    Zen,
}

impl KartMode {
    fn label(&self) -> &'static str {
        match self {
            Self::Cruise => "Cruise",
            Self::Sprint => "Sprint",
            Self::Zen => "Zen",
        }
    }

    /// Base scroll speed in rows per second.
    fn base_speed(&self) -> f32 {
        match self {
            Self::Cruise => 9.0,
            Self::Sprint => 12.0,
            Self::Zen => 5.0,
        }
    }

    fn profile(&self) -> InputProfile {
        match self {
            Self::Cruise => InputProfile::STEER,
            Self::Sprint => InputProfile::RUN,
            Self::Zen => InputProfile::ZEN,
        }
    }
}

#[derive(Clone)]
struct Obstacle {
    x: f32,
    y: f32,
    width: usize,
}

pub struct KartGame {
    mode: KartMode,
    kart_x: f32,
    obstacles: Vec<Obstacle>,
    score: u32,
    score_carry: f32,
    high_score: u32,
    lives: u32,
    invuln_ms: f32,
    /// Keyboard throttle built up by ↑ taps, decaying each tick.
    key_throttle: f32,
    game_over: bool,
    started: bool,
    paused: bool,
    tick: u64,
    scroll: f32,
    next_spawn_row: f32,
    // Dynamic dimensions (updated each render)
    field_width: usize,
    field_height: usize,
}

impl KartGame {
    pub fn new() -> Self {
        Self {
            mode: KartMode::Cruise,
            kart_x: 35.0,
            obstacles: Vec::new(),
            score: 0,
            score_carry: 0.0,
            high_score: 0,
            lives: STARTING_LIVES,
            invuln_ms: 0.0,
            key_throttle: 0.0,
            game_over: false,
            started: false,
            paused: false,
            tick: 0,
            scroll: 0.0,
            next_spawn_row: 14.0,
            field_width: 70,
            field_height: 20,
        }
    }

    fn spawn_obstacle(&mut self) {
        let mut rng = rand::thread_rng();
        let width = rng.gen_range(3..=6);
        let max_x = self.field_width.saturating_sub(width + 2).max(2);
        let x = rng.gen_range(2..=max_x) as f32;
        self.obstacles.push(Obstacle { x, y: 0.0, width });
        // Gaps shrink a little as the score climbs.
        let gap = (14.0 - (self.score as f32 / 120.0)).max(7.0);
        self.next_spawn_row = self.scroll + rng.gen_range(gap * 0.7..gap * 1.3);
    }

    fn kart_hits(&self, obs: &Obstacle) -> bool {
        let kart_top = self.field_height.saturating_sub(KART_ROWS + 1) as f32;
        let kart_left = self.kart_x;
        let kart_right = self.kart_x + KART_WIDTH as f32;
        let obs_bottom = obs.y + 1.0;
        // AABB against the kart's footprint at the bottom of the field.
        obs.x < kart_right
            && obs.x + obs.width as f32 > kart_left
            && obs_bottom > kart_top
            && obs.y < (kart_top + KART_ROWS as f32)
    }

    fn apply_collision(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.invuln_ms = INVULN_MS;
        if self.lives == 0 {
            self.game_over = true;
            if self.score > self.high_score {
                self.high_score = self.score;
            }
        }
    }

    fn effective_throttle(&self, input: &InputSnapshot) -> f32 {
        match self.mode {
            // Cruise and Zen roll at base speed; only Sprint is
            // throttle-driven.
            KartMode::Cruise | KartMode::Zen => 1.0,
            KartMode::Sprint => input.throttle.max(self.key_throttle),
        }
    }

    fn render_field(&self, width: usize, height: usize) -> Vec<Line<'static>> {
        let mut grid: Vec<Vec<(char, Style)>> = vec![vec![(' ', Style::default()); width]; height];

        // Road edges and scrolling center dashes.
        let offset = self.scroll as usize;
        for y in 0..height {
            grid[y][0] = ('║', Style::default().fg(Color::Rgb(110, 110, 130)));
            if width > 1 {
                grid[y][width - 1] = ('║', Style::default().fg(Color::Rgb(110, 110, 130)));
            }
            let mid = width / 2;
            if (y + offset) % 4 < 2 && mid > 0 && mid < width {
                grid[y][mid] = ('┆', Style::default().fg(Color::Rgb(70, 70, 90)));
            }
        }

        // Obstacles.
        for obs in &self.obstacles {
            let oy = obs.y as i32;
            if oy < 0 || oy as usize >= height {
                continue;
            }
            for dx in 0..obs.width {
                let x = obs.x as i32 + dx as i32;
                if x > 0 && (x as usize) < width.saturating_sub(1) {
                    let ch = if dx == 0 {
                        '▐'
                    } else if dx == obs.width - 1 {
                        '▌'
                    } else {
                        '█'
                    };
                    grid[oy as usize][x as usize] =
                        (ch, Style::default().fg(Color::Rgb(230, 110, 70)));
                }
            }
        }

        // Kart, blinking while invulnerable.
        let blink_off = self.invuln_ms > 0.0 && self.tick % 8 < 4;
        if !blink_off {
            let kart_top = height.saturating_sub(KART_ROWS + 1);
            let rows = [
                [('▗', false), ('▄', true), ('▄', true), ('▖', false)],
                [('▐', true), ('█', true), ('█', true), ('▌', true)],
            ];
            for (dy, row) in rows.iter().enumerate() {
                let y = kart_top + dy;
                if y >= height {
                    continue;
                }
                for (dx, &(ch, bright)) in row.iter().enumerate() {
                    let x = self.kart_x as i32 + dx as i32;
                    if x > 0 && (x as usize) < width.saturating_sub(1) {
                        let color = if bright {
                            Color::Rgb(120, 220, 255)
                        } else {
                            Color::Rgb(70, 140, 170)
                        };
                        grid[y][x as usize] = (
                            ch,
                            Style::default().fg(color).add_modifier(Modifier::BOLD),
                        );
                    }
                }
            }
        }

        grid.into_iter()
            .map(|row| {
                let spans: Vec<Span<'static>> = row
                    .into_iter()
                    .map(|(ch, style)| Span::styled(String::from(ch), style))
                    .collect();
                Line::from(spans)
            })
            .collect()
    }

    #[cfg(test)]
    fn with_field(width: usize, height: usize) -> Self {
        let mut game = Self::new();
        game.field_width = width;
        game.field_height = height;
        game.started = true;
        game
    }
}

impl Game for KartGame {
    fn update(&mut self, input: &InputSnapshot) {
        if self.game_over || self.paused {
            return;
        }
        if !self.started {
            if input.spread {
                self.started = true;
            }
            return;
        }

        self.tick += 1;
        let dt_s = input.dt_ms / 1000.0;

        if self.invuln_ms > 0.0 {
            self.invuln_ms = (self.invuln_ms - input.dt_ms).max(0.0);
        }
        self.key_throttle *= 0.98;

        // Steering: positive steer is a leftward lean in the mirrored
        // camera view, so it drives the kart left.
        if input.presence {
            self.kart_x -= input.steer * STEER_SPEED * dt_s;
        }
        let max_x = (self.field_width.saturating_sub(KART_WIDTH + 1)) as f32;
        self.kart_x = self.kart_x.clamp(1.0, max_x.max(1.0));

        let throttle = self.effective_throttle(input);
        let speed = self.mode.base_speed() * (0.4 + 0.6 * throttle);
        let advance = speed * dt_s;
        self.scroll += advance;

        // Distance scored, scaled up so it reads like an arcade counter.
        self.score_carry += advance * 3.0;
        if self.score_carry >= 1.0 {
            self.score += self.score_carry as u32;
            self.score_carry -= self.score_carry.floor();
        }

        for obs in &mut self.obstacles {
            obs.y += advance;
        }
        let height = self.field_height as f32;
        self.obstacles.retain(|obs| obs.y < height + 2.0);

        if self.scroll >= self.next_spawn_row {
            self.spawn_obstacle();
        }

        if self.invuln_ms <= 0.0 {
            let hit = self
                .obstacles
                .iter()
                .position(|obs| self.kart_hits(obs));
            if let Some(idx) = hit {
                self.obstacles.remove(idx);
                self.apply_collision();
            }
        }
    }

    fn handle_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('r') | KeyCode::Char('R') => self.reset(),
            KeyCode::Char('p') | KeyCode::Char('P') => {
                if !self.game_over && self.started {
                    self.paused = !self.paused;
                }
            }
            _ => {
                if self.game_over {
                    if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                        self.reset();
                    }
                    return;
                }
                if !self.started {
                    match key.code {
                        KeyCode::Char(' ') | KeyCode::Enter => self.started = true,
                        KeyCode::Char('1') => self.mode = KartMode::Cruise,
                        KeyCode::Char('2') => self.mode = KartMode::Sprint,
                        KeyCode::Char('3') => self.mode = KartMode::Zen,
                        _ => {}
                    }
                    return;
                }
                if self.paused {
                    return;
                }
                match key.code {
                    KeyCode::Left => self.kart_x -= KEY_STEP,
                    KeyCode::Right => self.kart_x += KEY_STEP,
                    KeyCode::Up => {
                        self.key_throttle = (self.key_throttle + 0.3).min(1.0);
                    }
                    _ => {}
                }
            }
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(255, 160, 60)))
            .title(" 🏎 Kart ")
            .title_style(
                Style::default()
                    .fg(Color::Rgb(255, 180, 90))
                    .add_modifier(Modifier::BOLD),
            );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Status bar
                Constraint::Min(8),    // Road
                Constraint::Length(1), // Help
            ])
            .split(inner);

        self.field_width = chunks[1].width as usize;
        self.field_height = chunks[1].height as usize;

        let hearts = "♥ ".repeat(self.lives as usize);
        let status = Line::from(vec![
            Span::styled(
                format!(" Score: {:05} ", self.score),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("Lives: {hearts}"),
                Style::default().fg(Color::Rgb(255, 90, 90)),
            ),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("🏆 High: {:05} ", self.high_score),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("Mode: {} ", self.mode.label()),
                Style::default().fg(Color::Green),
            ),
        ]);
        frame.render_widget(Paragraph::new(status), chunks[0]);

        if self.field_width > 0 && self.field_height > 0 {
            let lines = self.render_field(self.field_width, self.field_height);
            frame.render_widget(Paragraph::new(lines), chunks[1]);
        }

        let help = if self.game_over {
            Line::from(vec![
                Span::styled(
                    " 💀 GAME OVER! ",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("Score: {} │ ", self.score),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(
                    "Press ENTER to restart, Esc for menu",
                    Style::default().fg(Color::Gray),
                ),
            ])
        } else if !self.started {
            Line::from(vec![
                Span::styled(
                    " ▶ SPACE to start ",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(
                        "│ 1 Cruise  2 Sprint  3 Zen (now: {}) │ lean or ←/→ to steer",
                        self.mode.label()
                    ),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        } else if self.paused {
            Line::from(Span::styled(
                " ⏸ PAUSED - Press P to resume ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ))
        } else {
            Line::from(vec![
                Span::styled(" ←/→ Steer ", Style::default().fg(Color::DarkGray)),
                Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
                Span::styled("↑ Run ", Style::default().fg(Color::DarkGray)),
                Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
                Span::styled("P Pause ", Style::default().fg(Color::DarkGray)),
                Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
                Span::styled("R Restart ", Style::default().fg(Color::DarkGray)),
                Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
                Span::styled("Esc Menu", Style::default().fg(Color::DarkGray)),
            ])
        };
        frame.render_widget(Paragraph::new(help), chunks[2]);
    }

    fn reset(&mut self) {
        let hs = self.high_score;
        let mode = self.mode;
        let (fw, fh) = (self.field_width, self.field_height);
        *self = KartGame::new();
        self.high_score = hs;
        self.mode = mode;
        self.field_width = fw;
        self.field_height = fh;
        self.kart_x = (fw / 2) as f32;
    }

    fn get_score(&self) -> u32 {
        self.score
    }

    fn is_game_over(&self) -> bool {
        self.game_over
    }

    fn input_profile(&self) -> InputProfile {
        self.mode.profile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::{InputSource, STEER_RANGE};

    const TICK_MS: f32 = 16.0;

    fn steering_snapshot(steer: f32) -> InputSnapshot {
        let mut snapshot = InputSnapshot::idle(TICK_MS);
        snapshot.steer = steer;
        snapshot.presence = true;
        snapshot.confidence = 1.0;
        snapshot.source = InputSource::Camera;
        snapshot
    }

    #[test]
    fn leftward_lean_steers_left() {
        let mut game = KartGame::with_field(70, 20);
        let start = game.kart_x;
        for _ in 0..10 {
            game.update(&steering_snapshot(STEER_RANGE));
        }
        assert!(game.kart_x < start);
    }

    #[test]
    fn steering_clamps_to_the_road() {
        let mut game = KartGame::with_field(70, 20);
        for _ in 0..2000 {
            game.update(&steering_snapshot(-STEER_RANGE));
        }
        assert!(game.kart_x <= (70 - KART_WIDTH - 1) as f32);
        for _ in 0..2000 {
            game.update(&steering_snapshot(STEER_RANGE));
        }
        assert!(game.kart_x >= 1.0);
    }

    #[test]
    fn absent_signal_leaves_the_kart_in_place() {
        let mut game = KartGame::with_field(70, 20);
        let start = game.kart_x;
        for _ in 0..10 {
            game.update(&InputSnapshot::idle(TICK_MS));
        }
        assert_eq!(game.kart_x, start);
    }

    #[test]
    fn collision_costs_a_life_and_grants_grace() {
        let mut game = KartGame::with_field(70, 20);
        let kart_top = 20 - KART_ROWS - 1;
        game.obstacles.push(Obstacle {
            x: game.kart_x,
            y: kart_top as f32,
            width: 4,
        });
        game.update(&InputSnapshot::idle(TICK_MS));
        assert_eq!(game.lives, STARTING_LIVES - 1);
        assert!(game.invuln_ms > 0.0);
        assert!(!game.is_game_over());

        // A second overlapping obstacle during the grace period is free.
        game.obstacles.push(Obstacle {
            x: game.kart_x,
            y: kart_top as f32,
            width: 4,
        });
        game.update(&InputSnapshot::idle(TICK_MS));
        assert_eq!(game.lives, STARTING_LIVES - 1);
    }

    #[test]
    fn three_collisions_end_the_run() {
        let mut game = KartGame::with_field(70, 20);
        for _ in 0..3 {
            game.invuln_ms = 0.0;
            let kart_top = 20 - KART_ROWS - 1;
            game.obstacles.push(Obstacle {
                x: game.kart_x,
                y: kart_top as f32,
                width: 4,
            });
            game.update(&InputSnapshot::idle(TICK_MS));
        }
        assert!(game.is_game_over());
        assert_eq!(game.lives, 0);
    }

    #[test]
    fn obstacles_despawn_past_the_bottom() {
        let mut game = KartGame::with_field(70, 20);
        game.obstacles.push(Obstacle {
            x: 50.0,
            y: 23.0,
            width: 4,
        });
        game.update(&InputSnapshot::idle(TICK_MS));
        assert!(game.obstacles.iter().all(|o| o.y < 23.0));
    }

    #[test]
    fn sprint_speed_scales_with_throttle() {
        let mut idle_game = KartGame::with_field(70, 20);
        idle_game.mode = KartMode::Sprint;
        let mut running_game = KartGame::with_field(70, 20);
        running_game.mode = KartMode::Sprint;

        let mut running = InputSnapshot::idle(TICK_MS);
        running.throttle = 1.0;
        for _ in 0..50 {
            idle_game.update(&InputSnapshot::idle(TICK_MS));
            running_game.update(&running);
        }
        assert!(running_game.scroll > idle_game.scroll);
    }

    #[test]
    fn modes_declare_their_smoothing_presets() {
        let mut game = KartGame::new();
        assert_eq!(game.input_profile().alpha, 0.18);
        game.mode = KartMode::Sprint;
        assert_eq!(game.input_profile().alpha, 0.22);
        assert!(game.input_profile().stride_throttle);
        game.mode = KartMode::Zen;
        assert_eq!(game.input_profile().alpha, 0.06);
    }

    #[test]
    fn reset_keeps_high_score_and_mode() {
        let mut game = KartGame::with_field(70, 20);
        game.mode = KartMode::Zen;
        game.high_score = 500;
        game.score = 123;
        game.reset();
        assert_eq!(game.high_score, 500);
        assert_eq!(game.mode, KartMode::Zen);
        assert_eq!(game.get_score(), 0);
    }
}
