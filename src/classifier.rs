//! Byte-level state machine over logger output.
//!
//! A logger line looks like
//!
//! ```text
//!        00:00:34.596;I;$POSMVCC,5143,4943*5E
//! state: 1  2  3  4   5  6                 7  8
//! ```
//!
//! or is a bare `$...`/`!...` sentence. The machine looks at the previous
//! and the current byte only, so it can pick up the next line start inside
//! arbitrary garbage. Every byte is echoed unless the machine is out of
//! sync, and problems are reported inline with `#` markers so that
//! `grep -v '#'` leaves only clean sentences.

use std::fmt;
use std::io::{BufRead, Write};

use anyhow::Context;

use crate::checksum::Accumulator;
use crate::config::Config;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Waiting for a line start.
    #[default]
    Sync,
    Hour,
    Minute,
    Second,
    Millisecond,
    Channel,
    /// Expecting `$` or `!`.
    SentenceStart,
    Body,
    ChecksumDigits,
}

impl State {
    /// Numeric index as printed in trace lines.
    pub fn index(self) -> u8 {
        self as u8
    }

    fn echoes(self) -> bool {
        self != State::Sync
    }
}

/// The previous and the current input byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteCursor {
    pub previous: u8,
    pub current: u8,
}

impl Default for ByteCursor {
    // pretend the stream starts after a line break so the first line syncs
    fn default() -> Self {
        Self {
            previous: b'\n',
            current: b'\n',
        }
    }
}

impl ByteCursor {
    fn advance(&mut self, byte: u8) {
        self.previous = self.current;
        self.current = byte;
    }

    fn after_line_break(&self) -> bool {
        is_line_break(self.previous)
    }

    fn digit_then(&self, byte: u8) -> bool {
        self.previous.is_ascii_digit() && self.current == byte
    }
}

fn is_line_break(byte: u8) -> bool {
    byte == b'\n' || byte == b'\r'
}

fn is_sentence_start(byte: u8) -> bool {
    byte == b'$' || byte == b'!'
}

/// Token written into the stream in front of the byte that triggered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// No `$`/`!` after the channel tag.
    NoDollar,
    /// Sentence ended without a `*` checksum.
    MissingChecksum,
    /// Control byte or stray `$` inside a sentence body.
    Corrupted,
    /// Transmitted checksum did not match.
    ChecksumError { residual: u32 },
    /// Recomputed checksum, written in append mode instead of `##`.
    Appended(u32),
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::NoDollar => f.write_str("#nodollar#"),
            Marker::MissingChecksum => f.write_str("##"),
            Marker::Corrupted => f.write_str("###"),
            Marker::ChecksumError { residual } => {
                write!(f, " # checksum error, residual: {residual:02X}")
            }
            Marker::Appended(checksum) => write!(f, "*{checksum:02X}"),
        }
    }
}

/// Outcome of feeding one byte to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub state: State,
    pub marker: Option<Marker>,
    pub echo: bool,
}

/// Counters collected over one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub bytes: u64,
    pub sentences: u64,
    pub verified: u64,
    pub checksum_errors: u64,
    pub missing_checksums: u64,
    pub appended: u64,
    pub corrupted: u64,
    pub no_dollar: u64,
}

impl Stats {
    fn record(&mut self, marker: &Marker) {
        match marker {
            Marker::NoDollar => self.no_dollar += 1,
            Marker::MissingChecksum => self.missing_checksums += 1,
            Marker::Corrupted => self.corrupted += 1,
            Marker::ChecksumError { .. } => self.checksum_errors += 1,
            Marker::Appended(_) => self.appended += 1,
        }
    }

    /// Number of lines that carried some `#` marker.
    pub fn flagged(&self) -> u64 {
        self.checksum_errors + self.missing_checksums + self.corrupted + self.no_dollar
    }
}

#[derive(Debug, Default)]
pub struct Classifier {
    config: Config,
    state: State,
    cursor: ByteCursor,
    acc: Accumulator,
    stats: Stats,
}

impl Classifier {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn accumulator(&self) -> Accumulator {
        self.acc
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Advance the machine by one input byte.
    pub fn step(&mut self, byte: u8) -> Step {
        self.cursor.advance(byte);
        self.stats.bytes += 1;
        let cursor = self.cursor;
        let current = cursor.current;
        let mut marker = None;

        let state = self.state;
        self.state = match state {
            State::Sync => {
                if cursor.after_line_break() && current.is_ascii_digit() {
                    State::Hour
                } else if cursor.after_line_break() && is_sentence_start(current) {
                    // bare sentence, the start byte has just been consumed
                    self.begin_sentence()
                } else {
                    State::Sync
                }
            }
            State::Hour => {
                if cursor.digit_then(b':') {
                    State::Minute
                } else if current.is_ascii_digit() || cursor.after_line_break() {
                    State::Hour
                } else {
                    State::Sync
                }
            }
            State::Minute => Self::timestamp_field(cursor, b':', State::Minute, State::Second),
            State::Second => Self::timestamp_field(cursor, b'.', State::Second, State::Millisecond),
            State::Millisecond => {
                Self::timestamp_field(cursor, b';', State::Millisecond, State::Channel)
            }
            State::Channel => {
                if current.is_ascii_uppercase() {
                    State::Channel
                } else if current == b';' {
                    State::SentenceStart
                } else {
                    State::Sync
                }
            }
            State::SentenceStart => {
                if is_sentence_start(current) {
                    self.begin_sentence()
                } else {
                    marker = Some(Marker::NoDollar);
                    self.acc.reset();
                    State::Sync
                }
            }
            State::Body => {
                if current == b'*' {
                    State::ChecksumDigits
                } else if is_line_break(current) {
                    marker = Some(if self.config.append {
                        Marker::Appended(self.acc.value())
                    } else {
                        Marker::MissingChecksum
                    });
                    State::Hour
                } else if current < 0x20 || current == b'$' {
                    marker = Some(Marker::Corrupted);
                    self.acc.reset();
                    State::Sync
                } else {
                    self.acc.absorb(current);
                    State::Body
                }
            }
            State::ChecksumDigits => {
                if is_line_break(current) {
                    if self.acc.is_clear() {
                        self.stats.verified += 1;
                    } else {
                        marker = Some(Marker::ChecksumError {
                            residual: self.acc.residual(),
                        });
                    }
                    State::Hour
                } else {
                    self.acc.fold_digit(current);
                    State::ChecksumDigits
                }
            }
        };

        if let Some(marker) = &marker {
            self.stats.record(marker);
        }
        Step {
            state: self.state,
            marker,
            echo: self.state.echoes() && (0x0a..0x80).contains(&current),
        }
    }

    fn begin_sentence(&mut self) -> State {
        self.acc.reset();
        self.stats.sentences += 1;
        State::Body
    }

    // Shared shape of the minute, second and millisecond fields: digits
    // stay, a digit followed by the field terminator moves on.
    fn timestamp_field(cursor: ByteCursor, terminator: u8, stay: State, next: State) -> State {
        if cursor.digit_then(terminator) {
            next
        } else if cursor.current.is_ascii_digit() {
            stay
        } else {
            State::Sync
        }
    }

    /// Diagnostic line describing the machine after the last step.
    pub fn trace_line(&self) -> Vec<u8> {
        let ByteCursor { previous, current } = self.cursor;
        let state = self.state.index();
        let mut line = Vec::with_capacity(40);
        if current >= 0x20 {
            line.extend_from_slice(format!("  state: {state:2}   ").as_bytes());
            line.push(previous);
            line.extend_from_slice(b"  ");
            line.push(current);
            line.extend_from_slice(format!("      {:02x}\n", self.acc.low_byte()).as_bytes());
        } else {
            line.extend_from_slice(
                format!("  state: {state:2}  {previous:02x} {current:02x}\n").as_bytes(),
            );
        }
        line
    }

    /// Run the machine until `input` is exhausted.
    ///
    /// The annotated stream goes to `output`. Trace lines go to `trace`,
    /// and only when a debug level is configured.
    pub fn run<R, W, T>(&mut self, input: R, mut output: W, mut trace: T) -> anyhow::Result<Stats>
    where
        R: BufRead,
        W: Write,
        T: Write,
    {
        tracing::debug!(
            append = self.config.append,
            debug_level = self.config.debug_level,
            separator = ?self.config.separator,
            "classifier started"
        );
        for byte in input.bytes() {
            let byte = byte.context("reading input")?;
            let step = self.step(byte);
            if let Some(marker) = step.marker {
                write!(output, "{marker}").context("writing output")?;
            }
            if step.echo {
                output.write_all(&[byte]).context("writing output")?;
            }
            if self.config.tracing() {
                trace.write_all(&self.trace_line()).context("writing trace")?;
            }
        }
        output.flush().context("writing output")?;
        trace.flush().context("writing trace")?;
        tracing::debug!(stats = ?self.stats, "classifier finished");
        Ok(self.stats)
    }
}
