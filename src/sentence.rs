//! Line-level parser for a single logger line.
//!
//! This works on whole lines rather than on a byte stream, which makes it a
//! handy independent check on what the stream classifier produces.

/// `HH:MM:SS.mmm` prefix written by the logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub millis: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine<'a> {
    pub timestamp: Option<Timestamp>,
    /// Interface tag between the timestamp and the sentence, e.g. `I` or `B`.
    pub channel: Option<&'a str>,
    /// `$` for NMEA, `!` for AIS.
    pub start: char,
    pub body: &'a str,
    pub checksum: Option<u8>,
}

impl<'a> LogLine<'a> {
    pub fn parse(s: &'a str) -> anyhow::Result<Self> {
        use winnow::Parser;
        Self::parse_inner
            .parse(s)
            .map_err(|e| anyhow::format_err!("\n{e}"))
    }

    fn parse_inner(s: &mut &'a str) -> winnow::Result<Self> {
        // 00:00:34.597;I;$POSMACC,16644,-200,2024*46
        use winnow::{
            Parser,
            combinator::{opt, preceded, terminated},
            error::StrContext,
            token::{one_of, take_till, take_while},
        };
        let timestamp = opt(timestamp).parse_next(s)?;
        let channel = match timestamp {
            Some(_) => Some(
                terminated(take_while(0.., 'A'..='Z'), ';')
                    .context(StrContext::Label("channel"))
                    .parse_next(s)?,
            ),
            None => None,
        };
        let start = one_of(['$', '!'])
            .context(StrContext::Label("start"))
            .parse_next(s)?;
        let body = take_till(0.., ['*', '\r', '\n'])
            .context(StrContext::Label("body"))
            .parse_next(s)?;
        let checksum = opt(preceded(
            '*',
            take_while(2, |c: char| c.is_ascii_hexdigit())
                .try_map(|s| u8::from_str_radix(s, 16)),
        ))
        .context(StrContext::Label("checksum"))
        .parse_next(s)?;
        take_while(0.., ['\r', '\n']).parse_next(s)?;
        Ok(LogLine {
            timestamp,
            channel,
            start,
            body,
            checksum,
        })
    }

    /// XOR checksum recomputed over the body.
    pub fn computed(&self) -> u8 {
        crate::checksum::checksum(self.body.as_bytes())
    }

    /// `None` if the line carries no checksum.
    pub fn checksum_ok(&self) -> Option<bool> {
        self.checksum.map(|checksum| checksum == self.computed())
    }
}

fn timestamp(s: &mut &str) -> winnow::Result<Timestamp> {
    use winnow::{Parser, ascii::digit1, combinator::terminated};
    let hour: u8 = terminated(digit1, ':').parse_to().parse_next(s)?;
    let minute: u8 = terminated(digit1, ':').parse_to().parse_next(s)?;
    let second: u8 = terminated(digit1, '.').parse_to().parse_next(s)?;
    let millis: u16 = terminated(digit1, ';').parse_to().parse_next(s)?;
    Ok(Timestamp {
        hour,
        minute,
        second,
        millis,
    })
}
