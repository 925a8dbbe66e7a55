//! Sequencer widget - steps with playhead, tempo meter and run state per lane

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use reelpeet::{
    modules::reel_peet::{LANES, STEPS},
    runtime::RackSnapshot,
};

const NAMES: [&str; LANES] = ["A", "B"];
const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render both sequencer lanes side by side
pub fn render_sequencer(frame: &mut Frame, area: Rect, state: &RackSnapshot, focus: usize) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50); LANES])
        .split(area);

    for (lane, column) in columns.iter().enumerate() {
        render_lane(frame, *column, state, lane, lane == focus);
    }
}

fn render_lane(frame: &mut Frame, area: Rect, state: &RackSnapshot, lane: usize, focused: bool) {
    let out = state.reel_peet.lanes[lane];
    let title = format!(" Lane {}{} ", NAMES[lane], if focused { " *" } else { "" });
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused {
            Color::Cyan
        } else {
            Color::DarkGray
        }));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 4 {
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status
            Constraint::Length(1), // step values
            Constraint::Length(1), // step numbers / playhead
            Constraint::Length(1), // tempo meter
        ])
        .split(inner);

    let (status, color) = match (out.running, out.held) {
        (false, _) => ("■ stopped", Color::DarkGray),
        (true, false) => ("▶ running", Color::Green),
        (true, true) => ("⏸ held", Color::Yellow),
    };
    let status_line = Line::from(vec![
        Span::styled(format!("{status:<10}"), Style::default().fg(color)),
        Span::styled(
            format!("{:>5.1} BPM  len {:>2}  ", out.bpm, out.length),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("{:.2}V", out.pitch_cv),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(
            if out.trigger > 0.0 { "  ●" } else { "  ○" },
            Style::default().fg(Color::Red),
        ),
    ]);
    frame.render_widget(Paragraph::new(status_line), rows[0]);

    let sequence = &state.sequences[lane];
    let mut values = Vec::with_capacity(STEPS);
    let mut playhead = Vec::with_capacity(STEPS);
    for (i, &volts) in sequence.iter().enumerate() {
        let in_cycle = i < out.length;
        let current = out.running && i == out.step;
        let style = match (in_cycle, current) {
            (_, true) => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            (true, false) => Style::default().fg(Color::Cyan),
            (false, false) => Style::default().fg(Color::DarkGray),
        };
        let bar = BARS[((volts / 5.0) * BARS.len() as f32).clamp(0.0, BARS.len() as f32 - 1.0) as usize];
        values.push(Span::styled(format!("{bar} "), style));
        playhead.push(Span::styled(if current { "^ " } else { "  " }, style));
    }
    frame.render_widget(Paragraph::new(Line::from(values)), rows[1]);
    frame.render_widget(Paragraph::new(Line::from(playhead)), rows[2]);

    let meter = Gauge::default()
        .gauge_style(Style::default().fg(Color::LightBlue))
        .ratio(out.tempo_level.clamp(0.0, 1.0) as f64)
        .label(format!("tempo {:.0}%", out.tempo_level * 100.0));
    frame.render_widget(meter, rows[3]);
}
