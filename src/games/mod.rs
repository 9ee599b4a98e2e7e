pub mod kart;
pub mod reflex;

use crossterm::event::KeyEvent;
use ratatui::prelude::*;

use crate::motion::{InputProfile, InputSnapshot};

pub trait Game {
    /// Advance one tick. The snapshot carries elapsed time and the smoothed
    /// motion signal; in keyboard mode the signal fields are quiet and
    /// input arrives through `handle_input` instead.
    fn update(&mut self, input: &InputSnapshot);
    fn handle_input(&mut self, key: KeyEvent);
    fn render(&mut self, frame: &mut Frame, area: Rect);
    fn reset(&mut self);
    fn get_score(&self) -> u32;
    fn is_game_over(&self) -> bool;
    /// Smoothing parameters this game wants while it is the active tab.
    fn input_profile(&self) -> InputProfile;
}
