//! Line discipline - the typewriter's line-editing state machine
//!
//! This module owns the live line buffer and everything that governs it:
//! margins, the margin bell "hot zone", line spacing, margin release, and the
//! three-line history of committed lines. It performs no I/O; insert and
//! carriage return report their effects (bell, committed line) so the session
//! layer can route them to the sinks.

/// Line spacing multipliers cycled by `toggle_line_space`.
pub const SPACING_CHOICES: [f32; 3] = [1.0, 1.5, 2.0];

/// Tab-bar marker for a margin stop.
const STOP: char = '!';
/// Tab-bar marker for a neutral column.
const NEUTRAL: char = '.';

/// Typewriter settings, seeded from configuration.
///
/// `width` is fixed after construction. The margins are mutable and no
/// `left_margin < right_margin` ordering is enforced: crossed margins are a
/// permitted (if useless) state, and the capacity check keeps using
/// `right_margin` regardless.
#[derive(Debug, Clone)]
pub struct TypewriterSettings {
    /// Physical line capacity in columns (immutable)
    pub width: usize,
    /// Index into [`SPACING_CHOICES`]
    pub spacing_index: usize,
    /// Carriage-return automatically in the hot zone
    pub autoreturn: bool,
    /// Columns before the right margin where the bell zone begins
    pub margin_bell: usize,
    /// Temporary override allowing typing past the right margin
    pub margin_release: bool,
    pub left_margin: usize,
    pub right_margin: usize,
}

impl Default for TypewriterSettings {
    fn default() -> Self {
        Self {
            width: 80,
            spacing_index: 1,
            autoreturn: false,
            margin_bell: 8,
            margin_release: false,
            left_margin: 0,
            right_margin: 80,
        }
    }
}

/// The three most recently committed lines, newest first.
///
/// Fixed depth: a fourth commit evicts the oldest line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryChain {
    pub recent: String,
    pub second: String,
    pub third: String,
}

impl HistoryChain {
    /// Shift the chain down and put `line` in the most-recent slot.
    fn push(&mut self, line: String) {
        self.third = std::mem::take(&mut self.second);
        self.second = std::mem::take(&mut self.recent);
        self.recent = line;
    }
}

/// Effects of a single `insert_char` call.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    /// The margin bell should ring
    pub bell: bool,
    /// An autoreturn fired and committed this line
    pub committed: Option<String>,
}

/// The typewriter's line-editing state machine.
///
/// Owns the line buffer exclusively. Callers hold a single instance and pass
/// it into the session controller; there is no shared or static state.
pub struct LineDiscipline {
    settings: TypewriterSettings,
    /// Text on the current physical line, indexed by column
    buffer: Vec<char>,
    /// Length-`width` margin/tab bar, `!` at the margin stops
    tab_bar: Vec<char>,
    history: HistoryChain,
    /// Set once per line when the buffer enters the bell zone,
    /// cleared only by carriage return
    hot_zone: bool,
}

impl LineDiscipline {
    pub fn new(settings: TypewriterSettings) -> Self {
        let mut discipline = Self {
            tab_bar: vec![NEUTRAL; settings.width],
            buffer: Vec::new(),
            history: HistoryChain::default(),
            hot_zone: false,
            settings,
        };
        discipline.rebuild_tab_bar();
        discipline
    }

    /// Add a character to the buffer, honoring margins and the bell zone.
    ///
    /// `pos` is the insertion column; it is clamped to the buffer length.
    /// A character that does not fit is silently dropped (that is the
    /// typewriter hitting its stop, not an error).
    pub fn insert_char(&mut self, ch: char, pos: usize) -> InsertOutcome {
        let mut outcome = InsertOutcome::default();

        // Entering the hot zone rings the bell once per line.
        let bell_column = self.settings.right_margin.saturating_sub(self.settings.margin_bell);
        if self.buffer.len() == bell_column && !self.hot_zone {
            self.hot_zone = true;
            outcome.bell = true;
        }

        if (self.buffer.len() < self.settings.right_margin || self.settings.margin_release)
            && self.buffer.len() < self.settings.width - 1
        {
            let pos = pos.min(self.buffer.len());
            self.buffer.insert(pos, ch);
        }

        // A break character in the hot zone, or running out of line entirely,
        // either returns the carriage or warns the operator.
        let break_char = ch == ' ' || ch == '-';
        if (self.hot_zone && break_char) || self.at_capacity() {
            if self.settings.autoreturn {
                outcome.committed = Some(self.carriage_return());
            } else {
                outcome.bell = true;
            }
        }

        outcome
    }

    /// Delete the character at `pos - 1`, matching the insertion-point
    /// convention of `insert_char`. No-op on an empty buffer.
    pub fn backspace(&mut self, pos: usize) {
        if !self.buffer.is_empty() && pos >= 1 && pos <= self.buffer.len() {
            self.buffer.remove(pos - 1);
        }
    }

    /// Commit the current line.
    ///
    /// Flattens the buffer, pushes it into the history chain, re-seeds the
    /// buffer with left-margin spaces, and resets the hot-zone flag and
    /// margin release. There is no guard against an untouched buffer: an
    /// empty line commits like any other.
    pub fn carriage_return(&mut self) -> String {
        let committed: String = self.buffer.iter().collect();
        self.history.push(committed.clone());
        self.buffer.clear();
        self.buffer.extend(std::iter::repeat(' ').take(self.settings.left_margin));
        self.hot_zone = false;
        self.settings.margin_release = false;
        committed
    }

    /// Move the left margin stop to `column`. Ignored if out of [0, width).
    pub fn set_left_margin(&mut self, column: usize) {
        if column < self.settings.width {
            self.settings.left_margin = column;
            self.rebuild_tab_bar();
        }
    }

    /// Move the right margin stop to `column`. Ignored if out of [0, width).
    pub fn set_right_margin(&mut self, column: usize) {
        if column < self.settings.width {
            self.settings.right_margin = column;
            self.rebuild_tab_bar();
        }
    }

    /// Cycle line spacing through 1 / 1.5 / 2.
    pub fn toggle_line_space(&mut self) {
        self.settings.spacing_index = (self.settings.spacing_index + 1) % SPACING_CHOICES.len();
    }

    pub fn toggle_autoreturn(&mut self) {
        self.settings.autoreturn = !self.settings.autoreturn;
    }

    pub fn toggle_margin_release(&mut self) {
        self.settings.margin_release = !self.settings.margin_release;
    }

    /// Current line spacing multiplier.
    pub fn current_spacing(&self) -> f32 {
        SPACING_CHOICES[self.settings.spacing_index]
    }

    /// The current line flattened to a string.
    pub fn buffer_string(&self) -> String {
        self.buffer.iter().collect()
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// The margin/tab bar as a display string.
    pub fn tab_bar_string(&self) -> String {
        self.tab_bar.iter().collect()
    }

    pub fn history(&self) -> &HistoryChain {
        &self.history
    }

    pub fn settings(&self) -> &TypewriterSettings {
        &self.settings
    }

    /// Whether the buffer has entered the bell zone on this line.
    #[allow(dead_code)]
    pub fn in_hot_zone(&self) -> bool {
        self.hot_zone
    }

    /// No further character fits on this line.
    fn at_capacity(&self) -> bool {
        let limit = if self.settings.margin_release {
            self.settings.width - 1
        } else {
            self.settings.right_margin.min(self.settings.width - 1)
        };
        self.buffer.len() >= limit
    }

    /// Column of the right margin stop on the tab bar. The initial right
    /// margin sits at `width`, one past the last column, so its stop is
    /// drawn at `width - 1`.
    fn right_marker_col(&self) -> usize {
        if self.settings.right_margin >= self.settings.width {
            self.settings.width - 1
        } else {
            self.settings.right_margin
        }
    }

    /// Redraw both margin stops. Clearing and redrawing the whole bar keeps
    /// the stops consistent when the margins coincide or cross.
    fn rebuild_tab_bar(&mut self) {
        for slot in self.tab_bar.iter_mut() {
            *slot = NEUTRAL;
        }
        self.tab_bar[self.settings.left_margin] = STOP;
        let right = self.right_marker_col();
        self.tab_bar[right] = STOP;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(width: usize) -> LineDiscipline {
        LineDiscipline::new(TypewriterSettings {
            width,
            right_margin: width,
            ..TypewriterSettings::default()
        })
    }

    fn type_str(d: &mut LineDiscipline, text: &str) {
        for ch in text.chars() {
            let pos = d.buffer_len();
            d.insert_char(ch, pos);
        }
    }

    #[test]
    fn test_insert_appends_and_shifts() {
        let mut d = machine(80);
        type_str(&mut d, "hose");
        d.insert_char('u', 2);
        assert_eq!(d.buffer_string(), "house");
    }

    #[test]
    fn test_buffer_never_exceeds_width() {
        let mut d = machine(10);
        for _ in 0..50 {
            let pos = d.buffer_len();
            d.insert_char('x', pos);
        }
        assert!(d.buffer_len() <= 9);
    }

    #[test]
    fn test_buffer_respects_right_margin() {
        let mut d = machine(80);
        d.set_right_margin(20);
        for _ in 0..50 {
            let pos = d.buffer_len();
            d.insert_char('x', pos);
        }
        assert_eq!(d.buffer_len(), 20);
    }

    #[test]
    fn test_margin_release_allows_past_right_margin() {
        let mut d = machine(80);
        d.set_right_margin(20);
        d.toggle_margin_release();
        for _ in 0..100 {
            let pos = d.buffer_len();
            d.insert_char('x', pos);
        }
        assert!(d.buffer_len() > 20);
        assert!(d.buffer_len() <= 79);
    }

    #[test]
    fn test_hot_zone_bell_rings_once_per_line() {
        let mut d = machine(80);
        // Default margin_bell = 8, so the zone starts at column 72.
        let mut bells = 0;
        for _ in 0..73 {
            let pos = d.buffer_len();
            if d.insert_char('x', pos).bell {
                bells += 1;
            }
        }
        assert_eq!(bells, 1);
        assert!(d.in_hot_zone());

        // Backing out of the zone and re-entering does not re-trigger.
        d.backspace(d.buffer_len());
        d.backspace(d.buffer_len());
        assert!(!d.insert_char('x', d.buffer_len()).bell);
        // Back at the bell column with the flag already set.
        assert!(!d.insert_char('x', d.buffer_len()).bell);
    }

    #[test]
    fn test_hot_zone_resets_on_carriage_return() {
        let mut d = machine(80);
        for _ in 0..73 {
            let pos = d.buffer_len();
            d.insert_char('x', pos);
        }
        assert!(d.in_hot_zone());
        d.carriage_return();
        assert!(!d.in_hot_zone());
    }

    #[test]
    fn test_autoreturn_on_break_char_in_hot_zone() {
        let mut d = machine(80);
        d.toggle_autoreturn();
        for _ in 0..73 {
            let pos = d.buffer_len();
            d.insert_char('x', pos);
        }
        let outcome = d.insert_char(' ', d.buffer_len());
        let committed = outcome.committed.expect("autoreturn should commit");
        assert!(committed.starts_with("xxx"));
        assert_eq!(d.buffer_len(), 0);
    }

    #[test]
    fn test_bell_without_autoreturn_in_hot_zone() {
        let mut d = machine(80);
        for _ in 0..73 {
            let pos = d.buffer_len();
            d.insert_char('x', pos);
        }
        let outcome = d.insert_char(' ', d.buffer_len());
        assert!(outcome.bell);
        assert!(outcome.committed.is_none());
        assert!(d.buffer_len() > 0);
    }

    #[test]
    fn test_capacity_autoreturn_at_line_end() {
        let mut d = machine(30);
        d.toggle_autoreturn();
        let mut committed = None;
        for _ in 0..40 {
            let pos = d.buffer_len();
            let outcome = d.insert_char('x', pos);
            if outcome.committed.is_some() {
                committed = outcome.committed;
                break;
            }
        }
        let line = committed.expect("hitting capacity should autoreturn");
        assert_eq!(line.len(), 29);
    }

    #[test]
    fn test_backspace_removes_last_char() {
        let mut d = machine(80);
        type_str(&mut d, "hello");
        d.backspace(d.buffer_len());
        assert_eq!(d.buffer_string(), "hell");
    }

    #[test]
    fn test_backspace_on_empty_buffer_is_noop() {
        let mut d = machine(80);
        d.backspace(0);
        d.backspace(1);
        assert_eq!(d.buffer_len(), 0);
    }

    #[test]
    fn test_carriage_return_reseeds_left_margin() {
        let mut d = machine(80);
        d.set_left_margin(5);
        type_str(&mut d, "hi");
        d.carriage_return();
        assert_eq!(d.buffer_string(), "     ");
        assert_eq!(d.buffer_len(), 5);
    }

    #[test]
    fn test_carriage_return_resets_margin_release() {
        let mut d = machine(80);
        d.toggle_margin_release();
        assert!(d.settings().margin_release);
        d.carriage_return();
        assert!(!d.settings().margin_release);
    }

    #[test]
    fn test_history_chain_ripples() {
        let mut d = machine(80);
        for line in ["A", "B", "C"] {
            type_str(&mut d, line);
            d.carriage_return();
        }
        assert_eq!(d.history().recent, "C");
        assert_eq!(d.history().second, "B");
        assert_eq!(d.history().third, "A");

        type_str(&mut d, "D");
        d.carriage_return();
        assert_eq!(d.history().recent, "D");
        assert_eq!(d.history().second, "C");
        assert_eq!(d.history().third, "B");
    }

    #[test]
    fn test_double_carriage_return_on_untouched_buffer() {
        let mut d = machine(80);
        d.set_left_margin(3);
        let first = d.carriage_return();
        let second = d.carriage_return();
        assert_eq!(first, "");
        assert_eq!(second, "   ");
        assert_eq!(d.history().second, "");
        assert_eq!(d.history().recent, "   ");
    }

    #[test]
    fn test_toggle_line_space_has_period_three() {
        let mut d = machine(80);
        let start = d.settings().spacing_index;
        assert_eq!(d.current_spacing(), 1.5);
        d.toggle_line_space();
        assert_eq!(d.current_spacing(), 2.0);
        d.toggle_line_space();
        assert_eq!(d.current_spacing(), 1.0);
        d.toggle_line_space();
        assert_eq!(d.settings().spacing_index, start);
    }

    #[test]
    fn test_tab_bar_markers() {
        let d = machine(10);
        assert_eq!(d.tab_bar_string(), "!........!");
    }

    #[test]
    fn test_tab_bar_follows_margin_moves() {
        let mut d = machine(10);
        d.set_left_margin(2);
        d.set_right_margin(7);
        assert_eq!(d.tab_bar_string(), "..!....!..");
    }

    #[test]
    fn test_crossed_margins_do_not_crash() {
        let mut d = machine(80);
        d.set_left_margin(5);
        d.set_right_margin(5);
        for _ in 0..20 {
            let pos = d.buffer_len();
            d.insert_char('x', pos);
        }
        // Capacity is still governed by right_margin.
        assert_eq!(d.buffer_len(), 5);
        d.carriage_return();
        assert_eq!(d.buffer_len(), 5);
    }

    #[test]
    fn test_out_of_range_margin_is_ignored() {
        let mut d = machine(10);
        d.set_left_margin(10);
        d.set_right_margin(99);
        assert_eq!(d.settings().left_margin, 0);
        assert_eq!(d.settings().right_margin, 10);
    }

    #[test]
    fn test_overflow_drops_silently() {
        let mut d = machine(5);
        for _ in 0..10 {
            let pos = d.buffer_len();
            d.insert_char('x', pos);
        }
        assert_eq!(d.buffer_string(), "xxxx");
    }
}
