use crossterm::event::{KeyCode, KeyEvent};
use rand::Rng;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::games::Game;
use crate::motion::{InputProfile, InputSnapshot, InputSource, SwipeDirection};

const PROMPT_MS: f32 = 1000.0;
const RESPONSE_MS: f32 = 2000.0;
const RESOLVED_PAUSE_MS: f32 = 1200.0;
const STARTING_LIVES: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Win,
    Lose,
}

/// Phases advance strictly forward within a round; a new round replaces
/// the state wholesale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Prompt,
    Armed,
    Resolved(Outcome),
}

struct Round {
    phase: Phase,
    expected: SwipeDirection,
    /// Time spent in the current phase, in milliseconds.
    elapsed_ms: f32,
}

impl Round {
    fn new(expected: SwipeDirection) -> Self {
        Self {
            phase: Phase::Prompt,
            expected,
            elapsed_ms: 0.0,
        }
    }
}

fn random_direction() -> SwipeDirection {
    if rand::thread_rng().gen_bool(0.5) {
        SwipeDirection::Left
    } else {
        SwipeDirection::Right
    }
}

pub struct ReflexGame {
    round: Round,
    score: u32,
    lives: u32,
    high_score: u32,
    rounds_played: u32,
    game_over: bool,
    started: bool,
    paused: bool,
    /// Keyboard-mode stand-in for a swipe, consumed on the next tick.
    pending_key_swipe: Option<SwipeDirection>,
    last_source: InputSource,
}

impl ReflexGame {
    pub fn new() -> Self {
        Self {
            round: Round::new(random_direction()),
            score: 0,
            lives: STARTING_LIVES,
            high_score: 0,
            rounds_played: 0,
            game_over: false,
            started: false,
            paused: false,
            pending_key_swipe: None,
            last_source: InputSource::Keyboard,
        }
    }

    fn resolve(&mut self, outcome: Outcome) {
        self.round.phase = Phase::Resolved(outcome);
        self.round.elapsed_ms = 0.0;
        self.rounds_played += 1;
        match outcome {
            Outcome::Win => self.score += 1,
            Outcome::Lose => {
                self.lives = self.lives.saturating_sub(1);
                if self.lives == 0 {
                    self.game_over = true;
                    if self.score > self.high_score {
                        self.high_score = self.score;
                    }
                }
            }
        }
    }

    fn start(&mut self) {
        self.started = true;
        self.round = Round::new(random_direction());
    }

    #[cfg(test)]
    fn force_direction(&mut self, dir: SwipeDirection) {
        self.round.expected = dir;
    }

    #[cfg(test)]
    fn phase(&self) -> Phase {
        self.round.phase
    }
}

impl Game for ReflexGame {
    fn update(&mut self, input: &InputSnapshot) {
        self.last_source = input.source;
        if self.game_over || self.paused {
            return;
        }
        if !self.started {
            // Arms spread is the motion-mode start gesture.
            if input.spread {
                self.start();
            }
            return;
        }

        let swipe = input.swipe.or(self.pending_key_swipe.take());
        self.round.elapsed_ms += input.dt_ms;

        match self.round.phase {
            Phase::Prompt => {
                if self.round.elapsed_ms >= PROMPT_MS {
                    self.round.phase = Phase::Armed;
                    self.round.elapsed_ms = 0.0;
                }
            }
            Phase::Armed => {
                if swipe == Some(self.round.expected) {
                    self.resolve(Outcome::Win);
                } else if self.round.elapsed_ms >= RESPONSE_MS {
                    self.resolve(Outcome::Lose);
                }
            }
            Phase::Resolved(_) => {
                if self.round.elapsed_ms >= RESOLVED_PAUSE_MS {
                    self.round = Round::new(random_direction());
                }
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
                    if matches!(key.code, KeyCode::Char(' ') | KeyCode::Enter) {
                        self.start();
                    }
                    return;
                }
                if self.paused {
                    return;
                }
                match key.code {
                    KeyCode::Left => self.pending_key_swipe = Some(SwipeDirection::Left),
                    KeyCode::Right => self.pending_key_swipe = Some(SwipeDirection::Right),
                    _ => {}
                }
            }
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(80, 200, 255)))
            .title(" ⚡ Reflex ")
            .title_style(
                Style::default()
                    .fg(Color::Rgb(120, 220, 255))
                    .add_modifier(Modifier::BOLD),
            );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Status bar
                Constraint::Min(5),    // Round display
                Constraint::Length(1), // Help
            ])
            .split(inner);

        let hearts = "♥ ".repeat(self.lives as usize);
        let status = Line::from(vec![
            Span::styled(
                format!(" Score: {:03} ", self.score),
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
                format!("🏆 High: {:03} ", self.high_score),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("Round: {} ", self.rounds_played + 1),
                Style::default().fg(Color::Green),
            ),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("Input: {} ", self.last_source.label()),
                Style::default().fg(Color::Rgb(120, 120, 140)),
            ),
        ]);
        frame.render_widget(Paragraph::new(status), chunks[0]);

        let arrow = match self.round.expected {
            SwipeDirection::Left => "◀◀◀",
            SwipeDirection::Right => "▶▶▶",
        };
        let center: Vec<Line> = if !self.started {
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Swipe the way the arrow points, but only once it arms!",
                    Style::default().fg(Color::Rgb(160, 160, 180)),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Press SPACE (or spread your arms) to start",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )),
            ]
        } else {
            match self.round.phase {
                Phase::Prompt => vec![
                    Line::from(""),
                    Line::from(Span::styled(
                        format!("Get ready… {} {arrow}", self.round.expected.as_str()),
                        Style::default().fg(Color::Rgb(160, 160, 180)),
                    )),
                ],
                Phase::Armed => vec![
                    Line::from(""),
                    Line::from(Span::styled(
                        format!("{arrow}  GO {}  {arrow}", self.round.expected.as_str()),
                        Style::default()
                            .fg(Color::Rgb(90, 255, 120))
                            .add_modifier(Modifier::BOLD),
                    )),
                ],
                Phase::Resolved(Outcome::Win) => vec![
                    Line::from(""),
                    Line::from(Span::styled(
                        "✔ HIT!",
                        Style::default()
                            .fg(Color::Rgb(90, 255, 120))
                            .add_modifier(Modifier::BOLD),
                    )),
                ],
                Phase::Resolved(Outcome::Lose) => vec![
                    Line::from(""),
                    Line::from(Span::styled(
                        "✘ TOO SLOW",
                        Style::default()
                            .fg(Color::Rgb(255, 90, 90))
                            .add_modifier(Modifier::BOLD),
                    )),
                ],
            }
        };
        frame.render_widget(
            Paragraph::new(center).alignment(Alignment::Center),
            chunks[1],
        );

        let help = if self.game_over {
            Line::from(vec![
                Span::styled(
                    " 💀 GAME OVER! ",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("Final score: {} │ ", self.score),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(
                    "Press ENTER to restart, Esc for menu",
                    Style::default().fg(Color::Gray),
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
                Span::styled(" ←/→ Swipe ", Style::default().fg(Color::DarkGray)),
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
        *self = ReflexGame::new();
        self.high_score = hs;
    }

    fn get_score(&self) -> u32 {
        self.score
    }

    fn is_game_over(&self) -> bool {
        self.game_over
    }

    fn input_profile(&self) -> InputProfile {
        InputProfile::STEER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK_MS: f32 = 16.0;

    fn started_game(dir: SwipeDirection) -> ReflexGame {
        let mut game = ReflexGame::new();
        game.handle_input(KeyEvent::from(KeyCode::Char(' ')));
        game.force_direction(dir);
        game
    }

    fn tick(game: &mut ReflexGame, snapshot: InputSnapshot) {
        game.update(&snapshot);
    }

    /// Run quiet ticks until the round resolves, returning total elapsed ms.
    fn run_until_resolved(game: &mut ReflexGame) -> f32 {
        let mut elapsed = 0.0;
        for _ in 0..400 {
            tick(game, InputSnapshot::idle(TICK_MS));
            elapsed += TICK_MS;
            if matches!(game.phase(), Phase::Resolved(_)) {
                return elapsed;
            }
        }
        panic!("round never resolved");
    }

    #[test]
    fn quiet_round_loses_no_earlier_than_full_window() {
        let mut game = started_game(SwipeDirection::Right);
        let elapsed = run_until_resolved(&mut game);
        assert_eq!(game.phase(), Phase::Resolved(Outcome::Lose));
        assert!(
            elapsed >= PROMPT_MS + RESPONSE_MS,
            "resolved too early at {elapsed}ms"
        );
        assert_eq!(game.lives, STARTING_LIVES - 1);
    }

    #[test]
    fn matching_swipe_while_armed_wins() {
        let mut game = started_game(SwipeDirection::Right);
        // Sit through the prompt display.
        while game.phase() == Phase::Prompt {
            tick(&mut game, InputSnapshot::idle(TICK_MS));
        }
        assert_eq!(game.phase(), Phase::Armed);
        tick(
            &mut game,
            InputSnapshot::idle(TICK_MS).with_swipe(SwipeDirection::Right),
        );
        assert_eq!(game.phase(), Phase::Resolved(Outcome::Win));
        assert_eq!(game.get_score(), 1);
        assert_eq!(game.lives, STARTING_LIVES);
    }

    #[test]
    fn swipe_during_prompt_is_ignored() {
        let mut game = started_game(SwipeDirection::Right);
        tick(
            &mut game,
            InputSnapshot::idle(TICK_MS).with_swipe(SwipeDirection::Right),
        );
        assert_eq!(game.phase(), Phase::Prompt);
        assert_eq!(game.get_score(), 0);
    }

    #[test]
    fn wrong_direction_does_not_resolve() {
        let mut game = started_game(SwipeDirection::Left);
        while game.phase() == Phase::Prompt {
            tick(&mut game, InputSnapshot::idle(TICK_MS));
        }
        tick(
            &mut game,
            InputSnapshot::idle(TICK_MS).with_swipe(SwipeDirection::Right),
        );
        assert_eq!(game.phase(), Phase::Armed);
        assert_eq!(game.get_score(), 0);
    }

    #[test]
    fn phases_never_move_backward_within_a_round() {
        let mut game = started_game(SwipeDirection::Right);
        let mut rank = 0;
        for _ in 0..250 {
            tick(&mut game, InputSnapshot::idle(TICK_MS));
            let next = match game.phase() {
                Phase::Prompt => 0,
                Phase::Armed => 1,
                Phase::Resolved(_) => 2,
            };
            if next < rank {
                // A fresh round replaced the state; that is the only legal
                // way back to Prompt.
                assert_eq!(next, 0);
                assert!(game.rounds_played > 0);
            }
            rank = next;
        }
    }

    #[test]
    fn three_losses_end_the_session_with_score_intact() {
        let mut game = started_game(SwipeDirection::Right);

        // Bank one win first so the final score is distinguishable.
        while game.phase() == Phase::Prompt {
            tick(&mut game, InputSnapshot::idle(TICK_MS));
        }
        tick(
            &mut game,
            InputSnapshot::idle(TICK_MS).with_swipe(SwipeDirection::Right),
        );
        assert_eq!(game.get_score(), 1);

        // Let three consecutive rounds expire untouched.
        for _ in 0..3 {
            // Skip the resolved pause into the next round.
            while matches!(game.phase(), Phase::Resolved(_)) && !game.is_game_over() {
                tick(&mut game, InputSnapshot::idle(TICK_MS));
            }
            if game.is_game_over() {
                break;
            }
            run_until_resolved(&mut game);
        }

        assert!(game.is_game_over());
        assert_eq!(game.lives, 0);
        assert_eq!(game.get_score(), 1, "score must be untouched by losses");
    }

    #[test]
    fn keyboard_swipe_resolves_like_motion_swipe() {
        let mut game = started_game(SwipeDirection::Left);
        while game.phase() == Phase::Prompt {
            tick(&mut game, InputSnapshot::idle(TICK_MS));
        }
        game.handle_input(KeyEvent::from(KeyCode::Left));
        tick(&mut game, InputSnapshot::idle(TICK_MS));
        assert_eq!(game.phase(), Phase::Resolved(Outcome::Win));
    }

    #[test]
    fn spread_gesture_starts_the_session() {
        let mut game = ReflexGame::new();
        let mut snapshot = InputSnapshot::idle(TICK_MS);
        snapshot.spread = true;
        game.update(&snapshot);
        assert!(game.started);
    }
}
