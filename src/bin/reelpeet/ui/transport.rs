//! Transport bar widget - shows sample rate, elapsed time and queue health

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use reelpeet::runtime::RackSnapshot;

/// Render the transport bar
pub fn render_transport(frame: &mut Frame, area: Rect, state: &RackSnapshot) {
    let block = Block::default().title(" reelpeet ").borders(Borders::ALL);

    let elapsed = if state.sample_rate > 0.0 {
        state.frame as f64 / state.sample_rate as f64
    } else {
        0.0
    };
    let minutes = (elapsed / 60.0).floor();
    let seconds = elapsed - minutes * 60.0;

    let line = Line::from(vec![
        Span::styled(
            format!(" {:.1}kHz  ", state.sample_rate / 1000.0),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{:02.0}:{:04.1}  ", minutes, seconds),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("Density {:.0}%  Duration {:.0}%  ", state.knobs.density * 100.0, state.knobs.duration * 100.0),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(
            format!("dropped {}", state.dropped),
            Style::default().fg(if state.dropped > 0 {
                Color::Yellow
            } else {
                Color::DarkGray
            }),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
