use std::collections::VecDeque;
use std::io::{self, Stdout};

use dungeon::{
    AttackEffect, EndCause, NetworkStats, RenderFrame, Renderer, Rgb, SessionEvent, SessionPhase,
};
use glam::IVec2;
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};

const LOG_CAPACITY: usize = 64;
const EFFECT_COLOR: Color = Color::Rgb(0xf1, 0xc4, 0x0f);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

pub struct TuiState {
    log: VecDeque<(LogLevel, String)>,
    pub network: NetworkStats,
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            log: VecDeque::with_capacity(LOG_CAPACITY),
            network: NetworkStats::default(),
        }
    }

    fn push(&mut self, level: LogLevel, message: String) {
        if self.log.len() == LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back((level, message));
    }

    pub fn log_info(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Info, message.into());
    }

    pub fn log_warn(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Warn, message.into());
    }

    pub fn log_error(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Error, message.into());
    }

    pub fn record(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::PhaseChanged(phase) => self.log_info(format!("Now {}", phase.name())),
            SessionEvent::PeerLost { was_authority: true } => {
                self.log_warn("Host left, enemies are frozen")
            }
            SessionEvent::PeerLost {
                was_authority: false,
            } => self.log_warn("Partner left"),
            SessionEvent::LocalPlayerDied => self.log_error("You died"),
            SessionEvent::InitRejected(e) => self.log_error(format!("Bad world from host: {}", e)),
            SessionEvent::EnemyKilled { boss: true, .. } => self.log_info("The boss is dead!"),
            SessionEvent::EnemyKilled { id, .. } => self.log_info(format!("Enemy {} slain", id)),
            SessionEvent::ItemPickedUp { healed, .. } => {
                self.log_info(format!("Healed {} hp", healed))
            }
        }
    }
}

/// Draws each simulation frame straight to the terminal.
pub struct TuiRenderer {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    state: TuiState,
    error: Option<io::Error>,
}

impl TuiRenderer {
    pub fn new(stdout: Stdout) -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new(CrosstermBackend::new(stdout))?,
            state: TuiState::new(),
            error: None,
        })
    }

    pub fn state_mut(&mut self) -> &mut TuiState {
        &mut self.state
    }

    pub fn backend_mut(&mut self) -> &mut CrosstermBackend<Stdout> {
        self.terminal.backend_mut()
    }

    /// Surfaces the first draw failure since the last call.
    pub fn take_error(&mut self) -> io::Result<()> {
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Renderer for TuiRenderer {
    fn draw(&mut self, game: &RenderFrame<'_>) {
        let state = &self.state;
        let result = self.terminal.draw(|frame| render(frame, state, game));
        if let Err(e) = result {
            self.error.get_or_insert(e);
        }
    }
}

pub fn render(frame: &mut Frame, state: &TuiState, game: &RenderFrame<'_>) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(34)])
        .split(frame.area());

    render_map(frame, columns[0], game);

    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(3),
            Constraint::Length(4),
        ])
        .split(columns[1]);

    render_status(frame, sidebar[0], game);
    render_health(frame, sidebar[1], game);
    render_network(frame, sidebar[2], &state.network);
    render_log(frame, sidebar[3], state);
    render_help(frame, sidebar[4]);
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Top-left grid cell of a viewport of `size` cells centred on `focus`.
fn viewport_origin(focus: IVec2, size: IVec2, grid: IVec2) -> IVec2 {
    let max = (grid - size).max(IVec2::ZERO);
    (focus - size / 2).clamp(IVec2::ZERO, max)
}

fn render_map(frame: &mut Frame, area: Rect, game: &RenderFrame<'_>) {
    let block = Block::default()
        .title(" Dungeon ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let Some(grid) = game.grid else {
        let waiting = match game.phase {
            SessionPhase::Setup => "Waiting for the other player...",
            SessionPhase::InitPending => "Receiving the dungeon...",
            _ => "No dungeon",
        };
        frame.render_widget(Paragraph::new(waiting).block(block), area);
        return;
    };

    let inner = block.inner(area);
    let size = IVec2::new(inner.width as i32, inner.height as i32);
    let grid_size = IVec2::new(grid.width() as i32, grid.height() as i32);
    let origin = viewport_origin(game.local_position, size, grid_size);
    let visible = size.min(grid_size);

    let mut cells: Vec<Vec<(char, Color, Option<Color>)>> = (0..visible.y)
        .map(|y| {
            (0..visible.x)
                .map(|x| {
                    let tile = grid.get(origin + IVec2::new(x, y));
                    (tile.glyph(), color(dungeon::render::tile_color(tile)), None)
                })
                .collect()
        })
        .collect();

    let cell_at = |pos: IVec2| {
        let local = pos - origin;
        let inside = local.x >= 0 && local.y >= 0 && local.x < visible.x && local.y < visible.y;
        inside.then(|| (local.y as usize, local.x as usize))
    };

    for sprite in &game.sprites {
        if let Some((y, x)) = cell_at(sprite.position) {
            let background = cells[y][x].2;
            cells[y][x] = (sprite.glyph, color(sprite.color), background);
        }
    }
    for AttackEffect { position, .. } in game.effects {
        if let Some((y, x)) = cell_at(*position) {
            cells[y][x].2 = Some(EFFECT_COLOR);
        }
    }

    let lines: Vec<Line> = cells
        .into_iter()
        .map(|row| {
            Line::from(
                row.into_iter()
                    .map(|(glyph, fg, bg)| {
                        let mut style = Style::default().fg(fg);
                        if let Some(bg) = bg {
                            style = style.bg(bg);
                        }
                        Span::styled(glyph.to_string(), style)
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status(frame: &mut Frame, area: Rect, game: &RenderFrame<'_>) {
    let block = Block::default()
        .title(" Session ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let phase_color = match game.phase {
        SessionPhase::Running => Color::Green,
        SessionPhase::Ended(EndCause::LocalDeath) => Color::Red,
        SessionPhase::Ended(EndCause::MalformedInit(_)) | SessionPhase::PeerLost { .. } => {
            Color::Yellow
        }
        _ => Color::Gray,
    };
    let lines = vec![
        Line::from(vec![
            Span::styled("Phase: ", Style::default().fg(Color::Gray)),
            Span::styled(game.phase.name(), Style::default().fg(phase_color)),
        ]),
        Line::from(vec![
            Span::styled("Role: ", Style::default().fg(Color::Gray)),
            Span::raw(if game.authority { "host" } else { "joiner" }),
        ]),
        Line::from(vec![
            Span::styled("Class: ", Style::default().fg(Color::Gray)),
            Span::raw(game.local_class.name()),
        ]),
        Line::from(vec![
            Span::styled("Tick: ", Style::default().fg(Color::Gray)),
            Span::raw(game.tick.to_string()),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_health(frame: &mut Frame, area: Rect, game: &RenderFrame<'_>) {
    let block = Block::default().title(" HP ").borders(Borders::ALL);
    let ratio = if game.local_max_hp > 0 {
        f64::from(game.local_hp.max(0)) / f64::from(game.local_max_hp)
    } else {
        0.0
    };
    let gauge_color = if ratio > 0.5 {
        Color::Green
    } else if ratio > 0.2 {
        Color::Yellow
    } else {
        Color::Red
    };
    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(gauge_color))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(format!("{}/{}", game.local_hp, game.local_max_hp));

    frame.render_widget(gauge, area);
}

fn render_network(frame: &mut Frame, area: Rect, net: &NetworkStats) {
    let block = Block::default()
        .title(" Network ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let lines = vec![
        Line::from(vec![
            Span::styled("Packets: ", Style::default().fg(Color::Gray)),
            Span::raw(format!("{} / {}", net.packets_sent, net.packets_received)),
        ]),
        Line::from(vec![
            Span::styled("Bytes: ", Style::default().fg(Color::Gray)),
            Span::raw(format!(
                "{} / {}",
                format_bytes(net.bytes_sent),
                format_bytes(net.bytes_received)
            )),
        ]),
        Line::from(vec![
            Span::styled("Dropped: ", Style::default().fg(Color::Gray)),
            Span::styled(
                net.packets_dropped.to_string(),
                Style::default().fg(if net.packets_dropped > 0 {
                    Color::Red
                } else {
                    Color::White
                }),
            ),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_log(frame: &mut Frame, area: Rect, state: &TuiState) {
    let block = Block::default().title(" Log ").borders(Borders::ALL);
    let rows = area.height.saturating_sub(2) as usize;
    let skip = state.log.len().saturating_sub(rows);

    let lines: Vec<Line> = state
        .log
        .iter()
        .skip(skip)
        .map(|(level, message)| {
            let style = match level {
                LogLevel::Info => Style::default().fg(Color::White),
                LogLevel::Warn => Style::default().fg(Color::Yellow),
                LogLevel::Error => Style::default().fg(Color::Red),
            };
            Line::from(Span::styled(message.as_str(), style))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" Controls ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let text = Paragraph::new("arrows/wasd move, z attack\nx skill, q quit")
        .block(block)
        .style(
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        );

    frame.render_widget(text, area);
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{}B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1}KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1}MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_follows_player_inside_bounds() {
        let grid = IVec2::new(50, 50);
        let size = IVec2::new(20, 10);

        assert_eq!(viewport_origin(IVec2::new(2, 2), size, grid), IVec2::ZERO);
        assert_eq!(
            viewport_origin(IVec2::new(25, 25), size, grid),
            IVec2::new(15, 20)
        );
        assert_eq!(
            viewport_origin(IVec2::new(49, 49), size, grid),
            IVec2::new(30, 40)
        );
    }

    #[test]
    fn viewport_larger_than_grid_pins_to_origin() {
        let origin = viewport_origin(IVec2::new(3, 3), IVec2::new(80, 60), IVec2::new(10, 10));
        assert_eq!(origin, IVec2::ZERO);
    }

    #[test]
    fn log_is_bounded() {
        let mut state = TuiState::new();
        for i in 0..(LOG_CAPACITY + 5) {
            state.log_info(format!("line {}", i));
        }
        assert_eq!(state.log.len(), LOG_CAPACITY);
        assert_eq!(state.log.front().unwrap().1, "line 5");
    }
}
