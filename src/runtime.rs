use std::cell::Cell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::debug;

use crate::capture::{Capture, TypedInput};

/// Where typed text comes from.
pub trait InputSource {
    /// Blocks until the first non-whitespace character arrives.
    /// Returns Ok(None) if input ends first.
    fn first_char(&mut self) -> io::Result<Option<char>>;

    /// Reads the remainder of the current line. The terminator is consumed
    /// but not returned.
    fn rest_of_line(&mut self) -> io::Result<String>;
}

/// Plain line-buffered input: pipes, files, tests.
pub struct ReaderSource<R: BufRead> {
    reader: R,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = match self.reader.fill_buf()?.first() {
            Some(&b) => b,
            None => return Ok(None),
        };
        self.reader.consume(1);
        Ok(Some(byte))
    }

    fn next_char(&mut self) -> io::Result<Option<char>> {
        let Some(lead) = self.next_byte()? else {
            return Ok(None);
        };

        let width = match lead.leading_ones() {
            0 => 1,
            n @ 2..=4 => n as usize,
            _ => return Err(invalid_utf8()),
        };

        let mut bytes = [lead, 0, 0, 0];
        for slot in bytes.iter_mut().take(width).skip(1) {
            *slot = self.next_byte()?.ok_or_else(invalid_utf8)?;
        }

        std::str::from_utf8(&bytes[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .map(Some)
            .ok_or_else(invalid_utf8)
    }
}

impl<R: BufRead> InputSource for ReaderSource<R> {
    fn first_char(&mut self) -> io::Result<Option<char>> {
        while let Some(c) = self.next_char()? {
            if !c.is_whitespace() {
                return Ok(Some(c));
            }
        }
        Ok(None)
    }

    fn rest_of_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        self.reader.read_line(&mut line)?;
        strip_terminator(&mut line);
        Ok(line)
    }
}

fn invalid_utf8() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, "input is not valid UTF-8")
}

fn strip_terminator(line: &mut String) {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
}

/// Raw key events for the interactive line reader.
pub trait KeySource {
    /// Blocks for the next key press. Ok(None) means no more keys will come.
    fn next_key(&mut self) -> io::Result<Option<KeyEvent>>;

    /// Hands the terminal back once the line is done.
    fn release(&mut self) {}
}

/// Production key source: crossterm events in raw mode.
///
/// Raw mode is entered on the first read and kept until `release`, so a
/// burst of keys (fast typing, paste) stays in crossterm's queue instead of
/// being split between two readers.
#[derive(Default)]
pub struct CrosstermKeys {
    raw: Option<RawModeGuard>,
}

impl CrosstermKeys {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeySource for CrosstermKeys {
    fn next_key(&mut self) -> io::Result<Option<KeyEvent>> {
        if self.raw.is_none() {
            self.raw = Some(RawModeGuard::enable()?);
        }
        loop {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Release {
                    return Ok(Some(key));
                }
            }
        }
    }

    fn release(&mut self) {
        self.raw = None;
    }
}

/// Test key source: replays a fixed sequence, then reports end of input.
#[derive(Debug, Default)]
pub struct ScriptedKeys {
    keys: VecDeque<KeyEvent>,
}

impl ScriptedKeys {
    pub fn new(keys: impl IntoIterator<Item = KeyEvent>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// Plain key presses for `text`, with `\n` sent as Enter.
    pub fn typing(text: &str) -> Self {
        Self::new(text.chars().map(|c| match c {
            '\n' => KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE),
            c => KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE),
        }))
    }
}

impl KeySource for ScriptedKeys {
    fn next_key(&mut self) -> io::Result<Option<KeyEvent>> {
        Ok(self.keys.pop_front())
    }
}

/// What a key means to the line reader
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LineKey {
    Char(char),
    Backspace,
    Enter,
    EndOfInput,
    Interrupt,
    Ignored,
}

impl From<&KeyEvent> for LineKey {
    fn from(key: &KeyEvent) -> Self {
        let chord = key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
        match key.code {
            KeyCode::Esc => LineKey::Interrupt,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                LineKey::Interrupt
            }
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                LineKey::EndOfInput
            }
            KeyCode::Char('j') if key.modifiers == KeyModifiers::CONTROL => LineKey::Enter,
            KeyCode::Char(_) if chord => LineKey::Ignored,
            KeyCode::Char(c) => LineKey::Char(c),
            KeyCode::Backspace => LineKey::Backspace,
            KeyCode::Enter => LineKey::Enter,
            _ => LineKey::Ignored,
        }
    }
}

fn interrupted() -> io::Error {
    io::Error::new(io::ErrorKind::Interrupted, "test aborted")
}

/// Interactive line reader on top of a key source. Every key of the line
/// goes through the same source, echoed to `echo` as it is typed.
pub struct KeyLineSource<K: KeySource, W: Write> {
    keys: K,
    echo: W,
    pending_echo: Option<char>,
}

/// The interactive source used on a real terminal
pub type TerminalSource = KeyLineSource<CrosstermKeys, io::Stdout>;

impl TerminalSource {
    pub fn terminal() -> Self {
        KeyLineSource::new(CrosstermKeys::new(), io::stdout())
    }
}

impl<K: KeySource, W: Write> KeyLineSource<K, W> {
    pub fn new(keys: K, echo: W) -> Self {
        Self {
            keys,
            echo,
            pending_echo: None,
        }
    }

    pub fn into_parts(self) -> (K, W) {
        (self.keys, self.echo)
    }

    fn next_line_key(&mut self) -> io::Result<LineKey> {
        Ok(match self.keys.next_key()? {
            Some(key) => LineKey::from(&key),
            None => LineKey::EndOfInput,
        })
    }

    fn read_line(&mut self) -> io::Result<String> {
        if let Some(c) = self.pending_echo.take() {
            write!(self.echo, "{c}")?;
            self.echo.flush()?;
        }

        let mut line = String::new();
        loop {
            match self.next_line_key()? {
                LineKey::Char(c) => {
                    line.push(c);
                    write!(self.echo, "{c}")?;
                }
                // the first char is already committed
                LineKey::Backspace => {
                    if line.pop().is_some() {
                        write!(self.echo, "\x08 \x08")?;
                    }
                }
                LineKey::Enter | LineKey::EndOfInput => break,
                LineKey::Interrupt => {
                    write!(self.echo, "\r\n")?;
                    return Err(interrupted());
                }
                LineKey::Ignored => continue,
            }
            self.echo.flush()?;
        }
        write!(self.echo, "\r\n")?;
        self.echo.flush()?;
        Ok(line)
    }
}

impl<K: KeySource, W: Write> InputSource for KeyLineSource<K, W> {
    fn first_char(&mut self) -> io::Result<Option<char>> {
        loop {
            match self.next_line_key() {
                Ok(LineKey::Char(c)) if !c.is_whitespace() => {
                    self.pending_echo = Some(c);
                    return Ok(Some(c));
                }
                Ok(LineKey::EndOfInput) => {
                    self.keys.release();
                    return Ok(None);
                }
                Ok(LineKey::Interrupt) => {
                    self.keys.release();
                    return Err(interrupted());
                }
                Ok(_) => {}
                Err(err) => {
                    self.keys.release();
                    return Err(err);
                }
            }
        }
    }

    fn rest_of_line(&mut self) -> io::Result<String> {
        let line = self.read_line();
        self.keys.release();
        line
    }
}

/// Restores cooked mode when dropped, even on error paths.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Time source for the capture window
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Test clock: every reading is `step` later than the previous one.
#[derive(Debug)]
pub struct StepClock {
    next: Cell<Instant>,
    step: Duration,
}

impl StepClock {
    pub fn new(step: Duration) -> Self {
        Self {
            next: Cell::new(Instant::now()),
            step,
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> Instant {
        let now = self.next.get();
        self.next.set(now + self.step);
        now
    }
}

/// Reads one timed line from an input source.
pub struct Runner<S: InputSource, C: Clock> {
    source: S,
    clock: C,
}

impl<S: InputSource, C: Clock> Runner<S, C> {
    pub fn new(source: S, clock: C) -> Self {
        Self { source, clock }
    }

    /// Starts the clock right after the first character and stops it right
    /// after the line terminator.
    pub fn capture(&mut self) -> io::Result<Capture> {
        let Some(first) = self.source.first_char()? else {
            debug!("input ended before the first character");
            return Ok(Capture::default());
        };
        let start = self.clock.now();
        let rest = self.source.rest_of_line()?;
        let end = self.clock.now();

        let capture = Capture {
            input: TypedInput {
                first: Some(first),
                rest,
            },
            elapsed: end.saturating_duration_since(start),
        };
        debug!(
            chars = capture.input.char_count(),
            elapsed_us = u64::try_from(capture.elapsed.as_micros()).unwrap_or(u64::MAX),
            "line captured"
        );
        Ok(capture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(text: &str) -> ReaderSource<Cursor<Vec<u8>>> {
        ReaderSource::new(Cursor::new(text.as_bytes().to_vec()))
    }

    #[test]
    fn first_char_skips_leading_whitespace() {
        let mut src = reader("  \n\t cat\n");
        assert_eq!(src.first_char().unwrap(), Some('c'));
        assert_eq!(src.rest_of_line().unwrap(), "at");
    }

    #[test]
    fn first_char_decodes_multibyte() {
        let mut src = reader("ñu\n");
        assert_eq!(src.first_char().unwrap(), Some('ñ'));
        assert_eq!(src.rest_of_line().unwrap(), "u");
    }

    #[test]
    fn crlf_terminator_is_stripped() {
        let mut src = reader("ab c\r\nnext\n");
        assert_eq!(src.first_char().unwrap(), Some('a'));
        assert_eq!(src.rest_of_line().unwrap(), "b c");
    }

    #[test]
    fn line_without_terminator_at_eof() {
        let mut src = reader("xyz");
        assert_eq!(src.first_char().unwrap(), Some('x'));
        assert_eq!(src.rest_of_line().unwrap(), "yz");
    }

    #[test]
    fn eof_before_any_char() {
        let mut src = reader(" \n\n");
        assert_eq!(src.first_char().unwrap(), None);
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let mut src = ReaderSource::new(Cursor::new(vec![0xff, b'a']));
        let err = src.first_char().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn truncated_multibyte_is_an_error() {
        let mut src = ReaderSource::new(Cursor::new(vec![0xc3]));
        assert!(src.first_char().is_err());
    }

    #[test]
    fn step_clock_advances_per_reading() {
        let clock = StepClock::new(Duration::from_millis(250));
        let a = clock.now();
        let b = clock.now();
        assert_eq!(b - a, Duration::from_millis(250));
    }

    #[test]
    fn capture_times_from_first_char_to_end_of_line() {
        let clock = StepClock::new(Duration::from_millis(1500));
        let mut runner = Runner::new(reader("the be to\n"), clock);
        let capture = runner.capture().unwrap();
        assert_eq!(capture.input, TypedInput::new('t', "he be to"));
        assert_eq!(capture.elapsed, Duration::from_millis(1500));
        assert_eq!(capture.elapsed_ms(), 1500);
    }

    #[test]
    fn capture_of_empty_input_is_empty() {
        let mut runner = Runner::new(reader(""), StepClock::new(Duration::from_secs(1)));
        let capture = runner.capture().unwrap();
        assert!(capture.input.is_empty());
        assert_eq!(capture.elapsed, Duration::ZERO);
    }

    #[test]
    fn capture_with_system_clock() {
        let mut runner = Runner::new(reader("go\n"), SystemClock);
        let capture = runner.capture().unwrap();
        assert_eq!(capture.input.text(), "go");
        assert!(capture.elapsed < Duration::from_secs(5));
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn ctrl(c: char) -> KeyEvent {
        press(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn keys(keys: ScriptedKeys) -> KeyLineSource<ScriptedKeys, Vec<u8>> {
        KeyLineSource::new(keys, Vec::new())
    }

    fn echoed(source: KeyLineSource<ScriptedKeys, Vec<u8>>) -> String {
        String::from_utf8(source.into_parts().1).unwrap()
    }

    #[test]
    fn burst_of_keys_is_captured_whole() {
        let mut runner = Runner::new(
            keys(ScriptedKeys::typing("hello world\n")),
            StepClock::new(Duration::from_millis(10)),
        );
        let capture = runner.capture().unwrap();
        assert_eq!(capture.input, TypedInput::new('h', "ello world"));
        assert_eq!(capture.elapsed, Duration::from_millis(10));
    }

    #[test]
    fn typed_line_is_echoed() {
        let mut src = keys(ScriptedKeys::typing("  hi\n"));
        assert_eq!(src.first_char().unwrap(), Some('h'));
        assert_eq!(src.rest_of_line().unwrap(), "i");
        assert_eq!(echoed(src), "hi\r\n");
    }

    #[test]
    fn keys_after_enter_stay_queued() {
        let mut src = keys(ScriptedKeys::typing("ab\ncd\n"));
        assert_eq!(src.first_char().unwrap(), Some('a'));
        assert_eq!(src.rest_of_line().unwrap(), "b");
        assert_eq!(src.first_char().unwrap(), Some('c'));
        assert_eq!(src.rest_of_line().unwrap(), "d");
    }

    #[test]
    fn ctrl_d_before_first_key_is_end_of_input() {
        let mut runner = Runner::new(
            keys(ScriptedKeys::new([ctrl('d'), press(KeyCode::Char('x'), KeyModifiers::NONE)])),
            StepClock::new(Duration::from_secs(1)),
        );
        let capture = runner.capture().unwrap();
        assert!(capture.input.is_empty());
        assert_eq!(capture.elapsed, Duration::ZERO);
    }

    #[test]
    fn ctrl_d_mid_line_ends_the_line() {
        let mut keys_in = ScriptedKeys::typing("ca");
        keys_in.keys.push_back(ctrl('d'));
        let mut src = keys(keys_in);
        assert_eq!(src.first_char().unwrap(), Some('c'));
        assert_eq!(src.rest_of_line().unwrap(), "a");
    }

    #[test]
    fn exhausted_keys_end_the_line() {
        let mut src = keys(ScriptedKeys::typing("cat"));
        assert_eq!(src.first_char().unwrap(), Some('c'));
        assert_eq!(src.rest_of_line().unwrap(), "at");
    }

    #[test]
    fn esc_and_ctrl_c_interrupt() {
        for abort in [press(KeyCode::Esc, KeyModifiers::NONE), ctrl('c')] {
            let mut runner = Runner::new(
                keys(ScriptedKeys::new([abort])),
                StepClock::new(Duration::from_secs(1)),
            );
            let err = runner.capture().unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::Interrupted);
        }
    }

    #[test]
    fn esc_mid_line_interrupts() {
        let mut keys_in = ScriptedKeys::typing("ca");
        keys_in.keys.push_back(press(KeyCode::Esc, KeyModifiers::NONE));
        let mut runner = Runner::new(keys(keys_in), StepClock::new(Duration::from_secs(1)));
        let err = runner.capture().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Interrupted);
    }

    #[test]
    fn control_and_alt_chords_are_ignored() {
        let mut src = keys(ScriptedKeys::new([
            ctrl('z'),
            press(KeyCode::Char('x'), KeyModifiers::ALT),
            press(KeyCode::Char('o'), KeyModifiers::NONE),
            ctrl('z'),
            press(KeyCode::Char('k'), KeyModifiers::CONTROL | KeyModifiers::ALT),
            press(KeyCode::Char('k'), KeyModifiers::NONE),
            press(KeyCode::Enter, KeyModifiers::NONE),
        ]));
        assert_eq!(src.first_char().unwrap(), Some('o'));
        assert_eq!(src.rest_of_line().unwrap(), "k");
    }

    #[test]
    fn shifted_chars_are_typed() {
        let mut src = keys(ScriptedKeys::new([
            press(KeyCode::Char('H'), KeyModifiers::SHIFT),
            press(KeyCode::Char('I'), KeyModifiers::SHIFT),
            press(KeyCode::Enter, KeyModifiers::NONE),
        ]));
        assert_eq!(src.first_char().unwrap(), Some('H'));
        assert_eq!(src.rest_of_line().unwrap(), "I");
    }

    #[test]
    fn backspace_edits_the_rest_of_the_line() {
        let mut src = keys(ScriptedKeys::new([
            press(KeyCode::Char('c'), KeyModifiers::NONE),
            press(KeyCode::Char('x'), KeyModifiers::NONE),
            press(KeyCode::Backspace, KeyModifiers::NONE),
            press(KeyCode::Backspace, KeyModifiers::NONE),
            press(KeyCode::Char('a'), KeyModifiers::NONE),
            press(KeyCode::Char('t'), KeyModifiers::NONE),
            press(KeyCode::Enter, KeyModifiers::NONE),
        ]));
        assert_eq!(src.first_char().unwrap(), Some('c'));
        assert_eq!(src.rest_of_line().unwrap(), "at");
        assert_eq!(echoed(src), "cx\x08 \x08at\r\n");
    }

    #[test]
    fn ctrl_j_is_a_line_feed() {
        let mut src = keys(ScriptedKeys::new([
            press(KeyCode::Char('o'), KeyModifiers::NONE),
            press(KeyCode::Char('k'), KeyModifiers::NONE),
            ctrl('j'),
            press(KeyCode::Char('x'), KeyModifiers::NONE),
        ]));
        assert_eq!(src.first_char().unwrap(), Some('o'));
        assert_eq!(src.rest_of_line().unwrap(), "k");
    }

    #[test]
    fn enter_before_first_key_is_skipped() {
        let mut src = keys(ScriptedKeys::typing("\n \nok\n"));
        assert_eq!(src.first_char().unwrap(), Some('o'));
        assert_eq!(src.rest_of_line().unwrap(), "k");
    }
}
