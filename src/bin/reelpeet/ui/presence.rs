//! Presence lanes widget - one gauge per Phrasing lane

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Gauge},
    Frame,
};

use reelpeet::{modules::phrasing::LANES, runtime::RackSnapshot};

const NAMES: [&str; LANES] = ["I", "II", "III", "IV"];

/// Render the four presence lanes, marking the one the presence keys move
pub fn render_presence(frame: &mut Frame, area: Rect, state: &RackSnapshot, focus: usize) {
    let block = Block::default().title(" Phrasing ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1); LANES])
        .split(inner);

    let out = &state.phrasing;
    for (i, row) in rows.iter().enumerate() {
        let volts = out.voltages[i];
        let color = match (out.enabled[i], out.targets[i]) {
            (false, _) => Color::DarkGray,
            (true, true) => Color::Green,
            (true, false) => Color::Blue,
        };
        let label = format!(
            "{}{:>3} {} p{:.0}% {:.2}V",
            if i == focus { ">" } else { " " },
            NAMES[i],
            if out.enabled[i] { "●" } else { "○" },
            state.knobs.presence[i] * 100.0,
            volts
        );
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(color))
            .ratio((volts / 5.0).clamp(0.0, 1.0) as f64)
            .label(label);
        frame.render_widget(gauge, *row);
    }
}
