//! TUI module for reelpeet
//!
//! Shows both modules' live state and maps keys to control messages.

mod presence;
mod sequencer;
mod transport;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use std::time::Duration;

use reelpeet::{
    config::{BPM, DENSITY, DURATION, LENGTH, PRESENCE},
    modules::{phrasing, reel_peet},
    runtime::{ControlMessage, RackHandle, RackSnapshot},
};

use presence::render_presence;
use sequencer::render_sequencer;
use transport::render_transport;

const KNOB_STEP: f32 = 0.05;
const BPM_STEP: f32 = 5.0;
const GATE_HIGH: f32 = 10.0;

/// UI application state
pub struct UiApp {
    handle: RackHandle,
    /// Latest snapshot from the audio thread
    current: RackSnapshot,
    /// Sequencer lane the tempo/length keys act on
    focus: usize,
    /// Presence lane the presence keys act on
    presence_focus: usize,
    /// Tempo CV patched from the keyboard, per lane
    tempo_cv: [Option<f32>; reel_peet::LANES],
    /// Run gate patched from the keyboard, per lane
    run_gate: [Option<f32>; reel_peet::LANES],
    should_quit: bool,
}

impl UiApp {
    pub fn new(handle: RackHandle) -> Self {
        Self {
            handle,
            current: RackSnapshot::default(),
            focus: 0,
            presence_focus: 0,
            tempo_cv: [None; reel_peet::LANES],
            run_gate: [None; reel_peet::LANES],
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.refresh();

            terminal.draw(|frame| self.render(frame))?;

            // Non-blocking, ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Pick up the newest snapshot from the audio thread
    fn refresh(&mut self) {
        if let Some(snapshot) = self.handle.latest() {
            self.current = *snapshot;
        }
    }

    fn send(&mut self, msg: ControlMessage) {
        if !self.handle.send(msg) {
            log::warn!("control queue full, dropped {:?}", msg);
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        let knobs = self.current.knobs;
        let focus = self.focus;
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(c @ '1'..='4') => {
                self.send(ControlMessage::ToggleLane(c as usize - '1' as usize));
            }
            KeyCode::Up => self.send(ControlMessage::SetDensity(DENSITY.clamp(knobs.density + KNOB_STEP))),
            KeyCode::Down => self.send(ControlMessage::SetDensity(DENSITY.clamp(knobs.density - KNOB_STEP))),
            KeyCode::Right => self.send(ControlMessage::SetDuration(DURATION.clamp(knobs.duration + KNOB_STEP))),
            KeyCode::Left => self.send(ControlMessage::SetDuration(DURATION.clamp(knobs.duration - KNOB_STEP))),
            KeyCode::Tab => self.focus = (self.focus + 1) % reel_peet::LANES,
            KeyCode::Char(' ') => self.send(ControlMessage::ToggleRun(focus)),
            KeyCode::Char('z') => self.send(ControlMessage::Randomize(focus)),
            KeyCode::Char('h') => self.send(ControlMessage::Hold(focus)),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.send(ControlMessage::SetBpm(focus, BPM.clamp(knobs.bpm[focus] + BPM_STEP)));
            }
            KeyCode::Char('-') => {
                self.send(ControlMessage::SetBpm(focus, BPM.clamp(knobs.bpm[focus] - BPM_STEP)));
            }
            KeyCode::Char(']') => {
                self.send(ControlMessage::SetLength(focus, LENGTH.clamp(knobs.length[focus] + 1.0)));
            }
            KeyCode::Char('[') => {
                self.send(ControlMessage::SetLength(focus, LENGTH.clamp(knobs.length[focus] - 1.0)));
            }
            KeyCode::Char('c') => {
                // Patch a mid-scale tempo CV, or unpatch it
                self.tempo_cv[focus] = match self.tempo_cv[focus] {
                    Some(_) => None,
                    None => Some(5.0),
                };
                self.send(ControlMessage::SetTempoCv(focus, self.tempo_cv[focus]));
            }
            KeyCode::Char('p') => self.presence_focus = (self.presence_focus + 1) % phrasing::LANES,
            KeyCode::Char('.') => {
                let lane = self.presence_focus;
                let value = PRESENCE[lane].clamp(knobs.presence[lane] + KNOB_STEP);
                self.send(ControlMessage::SetPresence(lane, value));
            }
            KeyCode::Char(',') => {
                let lane = self.presence_focus;
                let value = PRESENCE[lane].clamp(knobs.presence[lane] - KNOB_STEP);
                self.send(ControlMessage::SetPresence(lane, value));
            }
            KeyCode::Char('g') => {
                // Patch a high gate, or unpatch and fall back to the run button
                self.run_gate[focus] = match self.run_gate[focus] {
                    Some(_) => None,
                    None => Some(GATE_HIGH),
                };
                self.send(ControlMessage::SetRunGate(focus, self.run_gate[focus]));
            }
            KeyCode::Char('r') => self.send(ControlMessage::Reset),
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Length(8), // Presence lanes
                Constraint::Min(8),    // Sequencer lanes
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        render_transport(frame, chunks[0], &self.current);
        render_presence(frame, chunks[1], &self.current, self.presence_focus);
        render_sequencer(frame, chunks[2], &self.current, self.focus);

        let help = Paragraph::new(
            " [1-4] Lanes  [↑↓] Density  [←→] Duration  [P] Presence lane  [,/.] Presence  [Tab] Focus  [Space] Run  [Z] Rand  [H] Hold  [+/-] BPM  [[/]] Length  [C] Tempo CV  [G] Run gate  [R] Reset  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
