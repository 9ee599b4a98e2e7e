use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::App;
use crate::scores::GAME_NAMES;

const BANNER: &str = r#"
 ╔══════════════════════════════════════════════════════════════════╗
 ║  ███╗   ███╗ ██████╗ ████████╗██╗ ██████╗ ███╗   ██╗              ║
 ║  ████╗ ████║██╔═══██╗╚══██╔══╝██║██╔═══██╗████╗  ██║              ║
 ║  ██╔████╔██║██║   ██║   ██║   ██║██║   ██║██╔██╗ ██║              ║
 ║  ██║╚██╔╝██║██║   ██║   ██║   ██║██║   ██║██║╚██╗██║              ║
 ║  ██║ ╚═╝ ██║╚██████╔╝   ██║   ██║╚██████╔╝██║ ╚████║ CADE         ║
 ║  ╚═╝     ╚═╝ ╚═════╝    ╚═╝   ╚═╝ ╚═════╝ ╚═╝  ╚═══╝              ║
 ╚══════════════════════════════════════════════════════════════════╝"#;

struct GameTile {
    key: &'static str,
    icon: &'static str,
    name: &'static str,
    desc: &'static str,
    color: Color,
    border_color: Color,
}

const GAME_TILES: [GameTile; 2] = [
    GameTile {
        key: "1",
        icon: "🏎",
        name: "Kart",
        desc: "Lean to steer,\ndodge the blocks!",
        color: Color::Rgb(255, 180, 90),
        border_color: Color::Rgb(140, 80, 30),
    },
    GameTile {
        key: "2",
        icon: "⚡",
        name: "Reflex",
        desc: "Swipe the way\nthe arrow points!",
        color: Color::Rgb(120, 220, 255),
        border_color: Color::Rgb(50, 100, 140),
    },
];

fn render_game_tile(frame: &mut Frame, area: Rect, tile: &GameTile, selected: bool) {
    let border_color = if selected {
        Color::Rgb(255, 220, 80)
    } else {
        tile.border_color
    };
    let border_type = if selected {
        BorderType::Double
    } else {
        BorderType::Rounded
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    let name_color = if selected {
        Color::Rgb(255, 255, 255)
    } else {
        tile.color
    };
    lines.push(Line::from(vec![
        Span::styled(
            format!("[{}] ", tile.key),
            Style::default()
                .fg(Color::Rgb(255, 220, 80))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("{} ", tile.icon), Style::default()),
        Span::styled(
            tile.name,
            Style::default().fg(name_color).add_modifier(Modifier::BOLD),
        ),
    ]));

    for desc_line in tile.desc.split('\n') {
        lines.push(Line::from(Span::styled(
            desc_line,
            Style::default().fg(if selected {
                Color::Rgb(180, 180, 200)
            } else {
                Color::Rgb(120, 120, 140)
            }),
        )));
    }

    if selected {
        lines.push(Line::from(Span::styled(
            "▶ Enter to play",
            Style::default()
                .fg(Color::Rgb(255, 220, 80))
                .add_modifier(Modifier::BOLD),
        )));
    }

    let p = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(p, inner);
}

fn motion_help(app: &App) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  🎥 Motion input",
            Style::default()
                .fg(Color::Rgb(120, 220, 160))
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("    v                ", Style::default().fg(Color::Rgb(80, 200, 255))),
            Span::styled(
                "Toggle camera / keyboard input",
                Style::default().fg(Color::Rgb(140, 140, 140)),
            ),
        ]),
        Line::from(vec![
            Span::styled("    lean left/right  ", Style::default().fg(Color::Rgb(80, 200, 255))),
            Span::styled("Steer the kart", Style::default().fg(Color::Rgb(140, 140, 140))),
        ]),
        Line::from(vec![
            Span::styled("    run in place     ", Style::default().fg(Color::Rgb(80, 200, 255))),
            Span::styled(
                "Throttle in Sprint mode",
                Style::default().fg(Color::Rgb(140, 140, 140)),
            ),
        ]),
        Line::from(vec![
            Span::styled("    spread arms      ", Style::default().fg(Color::Rgb(80, 200, 255))),
            Span::styled("Start a game", Style::default().fg(Color::Rgb(140, 140, 140))),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("    Current source:  ", Style::default().fg(Color::Rgb(100, 100, 120))),
            Span::styled(
                app.source.label().to_string(),
                Style::default()
                    .fg(Color::Rgb(120, 220, 160))
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
    ];
    if let Some(note) = &app.source_note {
        lines.push(Line::from(Span::styled(
            format!("    {note}"),
            Style::default().fg(Color::Rgb(230, 160, 80)),
        )));
    }
    lines
}

fn high_score_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  🏆 High scores",
            Style::default()
                .fg(Color::Rgb(255, 220, 80))
                .add_modifier(Modifier::BOLD),
        )),
    ];
    for (idx, name) in GAME_NAMES.iter().enumerate() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {name}"),
            Style::default().fg(Color::Rgb(80, 200, 255)),
        )));
        for (rank, entry) in app.high_scores.top_scores(idx).iter().enumerate() {
            let text = if entry.score == 0 {
                format!("    {}. ---", rank + 1)
            } else {
                format!("    {}. {:<9} {:>6}", rank + 1, entry.name, entry.score)
            };
            lines.push(Line::from(Span::styled(
                text,
                Style::default().fg(Color::Rgb(160, 160, 180)),
            )));
        }
    }
    lines
}

pub fn render_home(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(10), // Banner
            Constraint::Length(7),  // Game tiles
            Constraint::Min(0),     // Help / scores
            Constraint::Length(1),  // Footer
        ])
        .split(area);

    let banner = Paragraph::new(BANNER)
        .style(Style::default().fg(Color::Rgb(120, 200, 255)))
        .alignment(Alignment::Center);
    frame.render_widget(banner, chunks[0]);

    let tile_row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
            Constraint::Percentage(20),
        ])
        .split(chunks[1]);
    for (idx, tile) in GAME_TILES.iter().enumerate() {
        render_game_tile(frame, tile_row[idx + 1], tile, app.selected_game == idx);
    }

    let info = if app.show_high_scores {
        high_score_lines(app)
    } else {
        motion_help(app)
    };
    frame.render_widget(Paragraph::new(info), chunks[2]);

    let footer = Line::from(vec![
        Span::styled(" ←/→ Select ", Style::default().fg(Color::DarkGray)),
        Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
        Span::styled("Enter Play ", Style::default().fg(Color::DarkGray)),
        Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
        Span::styled("H Scores ", Style::default().fg(Color::DarkGray)),
        Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
        Span::styled("V Input ", Style::default().fg(Color::DarkGray)),
        Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
        Span::styled("Q Quit", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(footer), chunks[3]);
}
