//! HTML detection from a short input prefix.
//!
//! The prefix is read into memory and handed back in front of the rest of
//! the stream, so nothing the sniffer looks at is lost.

use std::io::{self, Chain, Cursor, Read};

/// Bytes inspected before deciding on a grammar.
pub const SNIFF_LEN: usize = 10;

/// Openings that mark a document as HTML, lowercase.
const HTML_TOKENS: [&[u8]; 4] = [b"<!doctype", b"<html", b"<head", b"<body"];

/// Characters of a cut-off token that must be visible after `<`.
const MIN_PARTIAL: usize = 2;

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// A reader that replays the sniffed prefix, then the rest of the input.
pub type Replay<R> = Chain<Cursor<Vec<u8>>, R>;

/// Result of sniffing an input stream.
pub struct Sniffed<R> {
    /// Whether the prefix looks like HTML.
    pub is_html: bool,
    /// The complete input, prefix included.
    pub reader: Replay<R>,
}

/// Read up to [`SNIFF_LEN`] bytes from `reader` and decide whether the input
/// is HTML.
///
/// A read error ends sniffing early and the decision is made on whatever
/// arrived, defaulting to XML. The error itself is not reported here; if it
/// persists, the next read of the returned stream sees it again.
#[must_use]
pub fn sniff<R: Read>(mut reader: R) -> Sniffed<R> {
    let mut prefix = vec![0; SNIFF_LEN];
    let mut filled = 0;
    let mut failed = false;
    while filled < SNIFF_LEN {
        match reader.read(&mut prefix[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => {
                log::debug!(target: "engine", "sniffing stopped by read error: {err}");
                failed = true;
                break;
            }
        }
    }
    prefix.truncate(filled);

    let is_html = !failed && looks_like_html(&prefix, filled == SNIFF_LEN);
    Sniffed {
        is_html,
        reader: Cursor::new(prefix).chain(reader),
    }
}

/// Decide on a prefix. `window_full` tells whether the prefix may have cut a
/// token short; a stream that simply ended there gets no partial credit.
#[must_use]
pub fn looks_like_html(prefix: &[u8], window_full: bool) -> bool {
    let prefix = prefix.strip_prefix(BOM).unwrap_or(prefix);
    let start = prefix
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(prefix.len());
    let visible = &prefix[start..];
    if visible.is_empty() {
        return false;
    }

    HTML_TOKENS.iter().any(|token| {
        if visible.len() >= token.len() {
            visible[..token.len()].eq_ignore_ascii_case(token)
        } else {
            window_full
                && visible.len() > MIN_PARTIAL
                && token[..visible.len()].eq_ignore_ascii_case(visible)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sniff_str(input: &str) -> (bool, String) {
        let Sniffed {
            is_html,
            mut reader,
        } = sniff(input.as_bytes());
        let mut replayed = String::new();
        let _ = reader.read_to_string(&mut replayed).unwrap();
        (is_html, replayed)
    }

    #[test]
    fn test_tokens_match_case_insensitively() {
        assert!(sniff_str("<!DOCTYPE html><p>").0);
        assert!(sniff_str("<HTML><body></body></HTML>").0);
        assert!(sniff_str("<head></head>").0);
        assert!(sniff_str("<Body>x</Body>").0);
    }

    #[test]
    fn test_leading_whitespace_is_skipped() {
        assert!(sniff_str("  \n<html>").0);
        assert!(sniff_str("\t<body>").0);
    }

    #[test]
    fn test_default_is_xml() {
        assert!(!sniff_str("<?xml version=\"1.0\"?><a/>").0);
        assert!(!sniff_str("<div><p>text</p></div>").0);
        assert!(!sniff_str("").0);
        assert!(!sniff_str("   ").0);
    }

    #[test]
    fn test_token_cut_by_window() {
        // Three spaces leave seven visible bytes of `<!doctype`.
        assert!(sniff_str("   <!doctype html>").0);
        // Eight spaces leave `<h`: only one character after `<`.
        assert!(!sniff_str("        <html>").0);
        // Seven spaces leave `<ht`.
        assert!(sniff_str("       <html>").0);
        // Not a prefix of any token.
        assert!(!sniff_str("       <hx>").0);
    }

    #[test]
    fn test_short_stream_gets_no_partial_match() {
        assert!(!looks_like_html(b"<htm", false));
        assert!(looks_like_html(b"<html", false));
    }

    #[test]
    fn test_prefix_is_replayed() {
        let input = "<root><child>text</child></root>";
        let (_, replayed) = sniff_str(input);
        assert_eq!(replayed, input);

        let (_, short) = sniff_str("<a/>");
        assert_eq!(short, "<a/>");
    }

    /// Hands out one byte per read and reports `Interrupted` in between.
    struct Trickle<'a> {
        data: &'a [u8],
        interrupt: bool,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            let Some((&first, rest)) = self.data.split_first() else {
                return Ok(0);
            };
            buf[0] = first;
            self.data = rest;
            Ok(1)
        }
    }

    #[test]
    fn test_short_reads_fill_the_window() {
        let Sniffed {
            is_html,
            mut reader,
        } = sniff(Trickle {
            data: b"<html><body>",
            interrupt: false,
        });
        assert!(is_html);
        let mut replayed = String::new();
        let _ = reader.read_to_string(&mut replayed).unwrap();
        assert_eq!(replayed, "<html><body>");
    }

    struct Failing;

    impl Read for Failing {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("device gone"))
        }
    }

    #[test]
    fn test_read_error_defaults_to_xml() {
        let sniffed = sniff(Failing);
        assert!(!sniffed.is_html);
    }
}
