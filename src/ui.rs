/*
Copyright 2021 Google LLC

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

     https://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! The full-screen terminal UI: renders the latest `QueryResult`, captures
//! keystrokes, and submits a freshly parsed `Query` on (almost) every one.
//!
//! Grounded in `other_examples`'s `jiq` (`ratatui` render loop over a
//! `crossterm` raw-mode terminal, with a background worker waking the UI on
//! a fresh result) — the closest real-world analogue in the retrieval pack
//! to "keystroke submits a query to a background evaluator, redraw on
//! result". `Expr::matches`/the bus/`QueryResult` are this crate's own
//! core, not jiq's; only the event-loop shape is borrowed.
//!
//! Layout top-to-bottom (spec.md §6 "UI surface"):
//! 1. Result lines, newest at the bottom.
//! 2. A filler row.
//! 3. A separator.
//! 4. The input line: `"Query      :> "` + the live buffer.
//! 5. The status line: `"Displaying :> "` + the last query that produced a
//!    non-empty result.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Terminal;

use crate::bus::{BusSender, Msg};
use crate::query::Query;
use crate::query_service::SharedQueryResult;

const INPUT_PROMPT: &str = "Query      :> ";
const STATUS_PROMPT: &str = "Displaying :> ";
/// Rows reserved for the filler line, separator, input line, and status
/// line — everything above that is available to result lines.
const CHROME_ROWS: u16 = 4;

/// How many result lines a query should ask for given a terminal `height`,
/// leaving room for the chrome rows below the result area.
pub fn max_matches_for_height(height: u16) -> usize {
    height.saturating_sub(CHROME_ROWS).max(1) as usize
}

/// The tail of `lines` that fits in `capacity` rows, since the result pane
/// always shows the newest matches (`lines` is oldest-first, newest last).
fn visible_tail(lines: &[String], capacity: usize) -> &[String] {
    if lines.len() <= capacity {
        lines
    } else {
        &lines[lines.len() - capacity..]
    }
}

/// Mutable state the UI owns across the event loop: the live input buffer
/// and the monotone `seq` counter every `Query` carries.
struct InputState {
    buffer: String,
    seq: u64,
}

impl InputState {
    fn new() -> InputState {
        InputState {
            buffer: String::new(),
            seq: 0,
        }
    }

    /// Parse the current buffer and, if it parses, send a fresh `Query` with
    /// an incremented `seq`. Invalid input is silently dropped per spec.md
    /// §7 — the last-valid query stays active on the Query Service side.
    fn submit(&mut self, tx: &BusSender, max_matches: usize) {
        self.seq += 1;
        if let Some(query) = Query::parse(self.buffer.clone(), self.seq, max_matches) {
            // A full bus is a momentary backpressure condition (the Query
            // Service is busy merging a large partial index); blocking here
            // is the intended behavior rather than a bug to work around.
            let _ = tx.send(Msg::Query(query));
        }
    }
}

/// Run the interactive UI until the operator quits (`Esc`/`Ctrl+C`). Sets
/// `should_shutdown` before returning; the caller is responsible for
/// sending `StopSignal` on the bus and joining the Ingestor/Query Service
/// threads afterward (spec.md §5).
pub fn run(
    tx: BusSender,
    result: SharedQueryResult,
    should_shutdown: Arc<AtomicBool>,
    redraw_rx: crossbeam_channel::Receiver<()>,
) -> io::Result<()> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop(&mut terminal, tx, result, &should_shutdown, redraw_rx);

    crossterm::terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    should_shutdown.store(true, Ordering::Relaxed);
    run_result
}

fn event_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    tx: BusSender,
    result: SharedQueryResult,
    should_shutdown: &AtomicBool,
    redraw_rx: crossbeam_channel::Receiver<()>,
) -> io::Result<()> {
    let mut input = InputState::new();

    loop {
        let size = terminal.size()?;
        let max_matches = max_matches_for_height(size.height);

        terminal.draw(|f| {
            let area = f.area();
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Min(0),
                    Constraint::Length(1),
                    Constraint::Length(1),
                    Constraint::Length(1),
                    Constraint::Length(1),
                ])
                .split(area);

            let snapshot = result.read().expect("query result lock poisoned").clone();
            let capacity = chunks[0].height as usize;
            let visible = visible_tail(&snapshot.lines, capacity);
            let result_lines: Vec<Line> = visible.iter().map(|l| Line::from(l.as_str())).collect();
            f.render_widget(Paragraph::new(result_lines), chunks[0]);

            f.render_widget(Paragraph::new(""), chunks[1]);
            f.render_widget(
                Paragraph::new("─".repeat(area.width as usize)),
                chunks[2],
            );

            let input_line = Line::from(vec![
                Span::styled(INPUT_PROMPT, Style::default().fg(Color::Cyan)),
                Span::raw(input.buffer.as_str()),
            ]);
            f.render_widget(Paragraph::new(input_line), chunks[3]);

            let status_line = Line::from(vec![
                Span::styled(STATUS_PROMPT, Style::default().fg(Color::DarkGray)),
                Span::raw(snapshot.query.str.as_str()),
            ]);
            f.render_widget(Paragraph::new(status_line), chunks[4]);
        })?;

        if redraw_rx.try_recv().is_ok() {
            // Drain any extra ticks queued while we were drawing so a burst
            // of partial-index merges only costs one extra redraw, not one
            // per tick.
            while redraw_rx.try_recv().is_ok() {}
            continue;
        }

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }

        match event::read()? {
            Event::Key(key) => {
                let ctrl_c = key.code == KeyCode::Char('c')
                    && key.modifiers.contains(KeyModifiers::CONTROL);
                match key.code {
                    KeyCode::Esc => return Ok(()),
                    _ if ctrl_c => return Ok(()),
                    KeyCode::Enter => input.submit(&tx, max_matches),
                    KeyCode::Backspace => {
                        input.buffer.pop();
                        input.submit(&tx, max_matches);
                    }
                    KeyCode::Char(c) => {
                        input.buffer.push(c);
                        input.submit(&tx, max_matches);
                    }
                    _ => {}
                }
            }
            Event::Resize(_, _) => {}
            _ => {}
        }

        if should_shutdown.load(Ordering::Relaxed) {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_matches_leaves_room_for_chrome() {
        assert_eq!(max_matches_for_height(24), 20);
        assert_eq!(max_matches_for_height(1), 1);
        assert_eq!(max_matches_for_height(0), 1);
    }

    #[test]
    fn visible_tail_keeps_the_newest_lines() {
        let lines: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        let tail = visible_tail(&lines, 3);
        assert_eq!(tail, &["7", "8", "9"]);
    }

    #[test]
    fn visible_tail_returns_everything_when_it_fits() {
        let lines: Vec<String> = vec!["a".into(), "b".into()];
        let tail = visible_tail(&lines, 10);
        assert_eq!(tail, &["a", "b"]);
    }
}
