//! Colored, line-oriented report output for terminals.
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;

/// Severity of a report line, mapped to a foreground color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Heading,
    Plain,
    Good,
    Warning,
    Error,
}

impl Tone {
    fn color(self) -> Color {
        match self {
            Tone::Heading => Color::Yellow,
            Tone::Plain => Color::Grey,
            Tone::Good => Color::Green,
            Tone::Warning => Color::DarkYellow,
            Tone::Error => Color::Red,
        }
    }
}

/// Queues styled lines onto a writer and flushes them together.
pub struct ReportWriter<'a, W: Write> {
    writer: &'a mut W,
    indent: usize,
}

impl<'a, W: Write> ReportWriter<'a, W> {
    pub fn new(writer: &'a mut W) -> Self {
        Self { writer, indent: 0 }
    }

    /// Write one line in `tone`, indented by the current level.
    pub fn line(&mut self, tone: Tone, text: &str) -> std::io::Result<&mut Self> {
        self.writer
            .queue(SetForegroundColor(tone.color()))?
            .queue(Print(format!("{:width$}{}", "", text, width = self.indent * 2)))?
            .queue(ResetColor)?
            .queue(Print('\n'))?;
        Ok(self)
    }

    pub fn heading(&mut self, text: &str) -> std::io::Result<&mut Self> {
        self.line(Tone::Heading, text)
    }

    pub fn indent(&mut self) -> &mut Self {
        self.indent += 1;
        self
    }

    pub fn outdent(&mut self) -> &mut Self {
        self.indent = self.indent.saturating_sub(1);
        self
    }

    pub fn finish(self) -> std::io::Result<()> {
        self.writer.flush()
    }
}
