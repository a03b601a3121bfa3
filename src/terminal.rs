use std::io::{self, Stdout, Write};

use color_eyre::Result;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::execute;
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::console::{PresentationSink, Prompt, Reply};
use crate::event::{EventHandler, InputEvent};
use crate::sampling::LiveCharts;
use crate::table::Table;
use crate::ui;

/// Keeps the terminal in raw mode so Ctrl+C arrives as a key instead of a
/// signal. Restores cooked mode on drop.
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn enable() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Undoes everything the console may have done to the terminal. Safe to
/// call from a panic hook.
pub fn restore() {
    let _ = terminal::disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
}

/// Line editor over raw-mode key events.
pub struct TerminalPrompt {
    events: EventHandler,
    out: Stdout,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self {
            events: EventHandler::new(),
            out: io::stdout(),
        }
    }

    fn finish(&mut self, echo: &str, reply: Reply) -> Result<Reply> {
        write!(self.out, "{echo}\r\n")?;
        self.out.flush()?;
        Ok(reply)
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt for TerminalPrompt {
    async fn read_line(&mut self, prompt: &str) -> Result<Reply> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;

        let mut line = String::new();
        loop {
            let Some(input) = self.events.next().await else {
                return self.finish("", Reply::Closed);
            };
            match input {
                InputEvent::Char(c) => {
                    line.push(c);
                    write!(self.out, "{c}")?;
                }
                InputEvent::Backspace => {
                    if line.pop().is_some() {
                        write!(self.out, "\u{8} \u{8}")?;
                    }
                }
                InputEvent::Submit => return self.finish("", Reply::Line(line)),
                InputEvent::Cancel => return self.finish("^C", Reply::Cancelled),
                InputEvent::EndOfInput if line.is_empty() => {
                    return self.finish("", Reply::Closed);
                }
                InputEvent::EndOfInput => {}
            }
            self.out.flush()?;
        }
    }

    async fn wait_for_cancel(&mut self) {
        while let Some(input) = self.events.next().await {
            if matches!(
                input,
                InputEvent::Cancel | InputEvent::EndOfInput | InputEvent::Char('q')
            ) {
                return;
            }
        }
    }
}

/// Writes to stdout. Tables and notices are plain lines; charts take over
/// the alternate screen until [`PresentationSink::end_charts`].
pub struct TerminalSink {
    out: Stdout,
    charts: Option<Terminal<CrosstermBackend<Stdout>>>,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self {
            out: io::stdout(),
            charts: None,
        }
    }

    fn write_lines(&mut self, text: &str) -> Result<()> {
        // Raw mode does not translate "\n", so every line ends in "\r\n".
        for line in text.lines() {
            write!(self.out, "{line}\r\n")?;
        }
        self.out.flush()?;
        Ok(())
    }
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationSink for TerminalSink {
    fn notice(&mut self, text: &str) -> Result<()> {
        self.write_lines(text)
    }

    fn clear(&mut self) -> Result<()> {
        execute!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        Ok(())
    }

    fn render_table(&mut self, table: &Table) -> Result<()> {
        self.write_lines(&table.render())
    }

    fn begin_charts(&mut self) -> Result<()> {
        execute!(self.out, EnterAlternateScreen, Hide)?;
        let mut term = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        term.clear()?;
        self.charts = Some(term);
        Ok(())
    }

    fn redraw_charts(&mut self, charts: &LiveCharts) -> Result<()> {
        if let Some(term) = self.charts.as_mut() {
            term.draw(|frame| ui::draw(frame, charts))?;
        }
        Ok(())
    }

    fn end_charts(&mut self) -> Result<()> {
        self.charts = None;
        execute!(self.out, LeaveAlternateScreen, Show)?;
        Ok(())
    }
}
