//! Session controller - drives the line discipline from a keystroke stream
//!
//! The controller owns one [`LineDiscipline`] plus the two output sinks, maps
//! classified keys to discipline operations, decodes two-key meta sequences
//! through an explicit NORMAL / META-PENDING state machine, and keeps the
//! running line/word statistics.

use tracing::{debug, info, warn};

use crate::core::discipline::LineDiscipline;
use crate::sink::{FileSink, Printer};

/// A classified keystroke, the controller's input alphabet.
///
/// Produced from raw terminal events by `ui::KeyMapper`. `Meta` covers the
/// case where the terminal backend delivers Alt+char as a single event; it is
/// equivalent to an escape immediately followed by that character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Printable character (ASCII 0x20..=0x7E)
    Char(char),
    Backspace,
    Enter,
    Escape,
    /// Alt+char delivered atomically
    Meta(char),
    /// Reserved for future cursor movement
    Arrow,
}

/// What to do with a bare escape (no second key within the look-ahead tick).
///
/// The two typewriter revisions this emulates disagreed: one quit on bare
/// escape, the other ignored it. Configurable rather than picked silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BareEscape {
    #[default]
    Quit,
    Ignore,
}

/// Result of dispatching one key.
#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    Continue,
    /// Ring the terminal bell
    Bell,
    /// An escape arrived; poll once (non-blocking) and dispatch the result
    AwaitMeta,
    Quit,
}

/// Dispatch states. META_PENDING is entered only by an escape and exits
/// unconditionally after exactly one more dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DispatchState {
    Normal,
    MetaPending,
}

/// Cumulative session statistics, reset only at process start.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub line_count: u64,
    pub word_count: u64,
}

pub struct SessionController {
    discipline: LineDiscipline,
    state: DispatchState,
    stats: SessionStats,
    file: Option<FileSink>,
    printer: Printer,
    bare_escape: BareEscape,
    help_visible: bool,
}

impl SessionController {
    pub fn new(
        discipline: LineDiscipline,
        file: Option<FileSink>,
        printer: Printer,
        bare_escape: BareEscape,
    ) -> Self {
        Self {
            discipline,
            state: DispatchState::Normal,
            stats: SessionStats::default(),
            file,
            printer,
            bare_escape,
            help_visible: false,
        }
    }

    /// Dispatch one keystroke, or `None` when the meta look-ahead tick passed
    /// without a key. In the NORMAL state `None` is simply ignored.
    ///
    /// Returning [`Action::AwaitMeta`] asks the event loop to poll once
    /// non-blockingly and call `dispatch` again with whatever it found.
    pub fn dispatch(&mut self, key: Option<Key>) -> anyhow::Result<Action> {
        if self.state == DispatchState::MetaPending {
            // Exit META_PENDING unconditionally, whether or not a key arrived.
            self.state = DispatchState::Normal;
            return match key {
                Some(Key::Char(c)) => Ok(self.meta_command(c)),
                Some(_) => Ok(Action::Continue),
                None => match self.bare_escape {
                    BareEscape::Quit => {
                        info!("bare escape, quitting");
                        Ok(Action::Quit)
                    }
                    BareEscape::Ignore => Ok(Action::Continue),
                },
            };
        }

        let Some(key) = key else {
            return Ok(Action::Continue);
        };

        match key {
            Key::Char(ch) => {
                let pos = self.cursor();
                let outcome = self.discipline.insert_char(ch, pos);
                if let Some(line) = outcome.committed {
                    self.commit(line)?;
                }
                if outcome.bell {
                    return Ok(Action::Bell);
                }
                Ok(Action::Continue)
            }
            Key::Backspace => {
                let pos = self.cursor();
                self.discipline.backspace(pos);
                Ok(Action::Continue)
            }
            Key::Enter => {
                let line = self.discipline.carriage_return();
                self.commit(line)?;
                Ok(Action::Continue)
            }
            Key::Escape => {
                self.state = DispatchState::MetaPending;
                Ok(Action::AwaitMeta)
            }
            Key::Meta(c) => Ok(self.meta_command(c)),
            // Reserved: cursor movement is not committed behavior yet.
            Key::Arrow => Ok(Action::Continue),
        }
    }

    /// The fixed meta command table (escape or Alt prefix).
    fn meta_command(&mut self, c: char) -> Action {
        match c {
            'a' => {
                self.discipline.toggle_autoreturn();
                debug!(
                    autoreturn = self.discipline.settings().autoreturn,
                    "toggled autoreturn"
                );
            }
            'n' => {
                self.discipline.toggle_margin_release();
                debug!(
                    margin_release = self.discipline.settings().margin_release,
                    "toggled margin release"
                );
            }
            's' => {
                self.discipline.toggle_line_space();
                debug!(
                    spacing = self.discipline.current_spacing(),
                    "toggled line spacing"
                );
            }
            'h' => self.help_visible = !self.help_visible,
            'l' => {
                let col = self.cursor();
                self.discipline.set_left_margin(col);
            }
            'r' => {
                let col = self.cursor();
                self.discipline.set_right_margin(col);
            }
            'q' => {
                info!("quit command");
                return Action::Quit;
            }
            _ => {}
        }
        Action::Continue
    }

    /// Route a committed line to the sinks and update the statistics.
    ///
    /// File failure is fatal for the session (losing typed text is worse than
    /// stopping); printer failure is logged and skipped.
    fn commit(&mut self, line: String) -> anyhow::Result<()> {
        self.stats.line_count += 1;
        self.stats.word_count += line.split_whitespace().count() as u64;

        if let Some(file) = &self.file {
            file.append(&line)?;
        }
        if let Err(e) = self.printer.print_line(&line, self.discipline.current_spacing()) {
            warn!("printer write failed: {}", e);
        }

        debug!(
            lines = self.stats.line_count,
            words = self.stats.word_count,
            "committed line"
        );
        Ok(())
    }

    /// Current cursor column. Without in-line cursor movement the print head
    /// always sits at the end of the buffer.
    pub fn cursor(&self) -> usize {
        self.discipline.buffer_len()
    }

    pub fn discipline(&self) -> &LineDiscipline {
        &self.discipline
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn help_visible(&self) -> bool {
        self.help_visible
    }

    pub fn printer_attached(&self) -> bool {
        self.printer.is_attached()
    }

    /// Session file path, if file output is enabled.
    pub fn file_path(&self) -> Option<&std::path::Path> {
        self.file.as_ref().map(|f| f.path())
    }
}
