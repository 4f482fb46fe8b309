//! Output sanitization for stripping terminal control sequences.

use vte::{Params, Parser, Perform};

/// Output sanitizer using a VTE parser.
pub struct OutputSanitizer;

impl OutputSanitizer {
    /// Strip ANSI escape codes from raw bytes.
    ///
    /// Returns UTF-8 text with control sequences removed. Newlines,
    /// carriage returns and tabs are kept.
    pub fn strip_ansi(input: &[u8]) -> String {
        // Plain output (the common case) needs no parser pass.
        if !input.iter().any(|b| b.is_ascii_control() && !matches!(b, b'\n' | b'\r' | b'\t')) {
            return String::from_utf8_lossy(input).into_owned();
        }

        let mut extractor = PlainTextExtractor::new();
        let mut parser = Parser::new();

        parser.advance(&mut extractor, input);

        extractor.into_string()
    }

    /// Remove any trailing `\n` and `\r` characters.
    pub fn trim_line_endings(input: &str) -> &str {
        input.trim_end_matches(['\n', '\r'])
    }
}

/// VTE performer that extracts plain text.
struct PlainTextExtractor {
    output: String,
}

impl PlainTextExtractor {
    fn new() -> Self {
        Self {
            output: String::new(),
        }
    }

    fn into_string(self) -> String {
        self.output
    }
}

impl Perform for PlainTextExtractor {
    fn print(&mut self, c: char) {
        self.output.push(c);
    }

    fn execute(&mut self, byte: u8) {
        if matches!(byte, b'\n' | b'\r' | b'\t') {
            self.output.push(byte as char);
        }
    }

    fn hook(&mut self, _params: &Params, _intermediates: &[u8], _ignore: bool, _action: char) {}

    fn put(&mut self, _byte: u8) {}

    fn unhook(&mut self) {}

    fn osc_dispatch(&mut self, _params: &[&[u8]], _bell_terminated: bool) {}

    fn csi_dispatch(
        &mut self,
        _params: &Params,
        _intermediates: &[u8],
        _ignore: bool,
        _action: char,
    ) {
        // Colors and cursor movement carry no listing data.
    }

    fn esc_dispatch(&mut self, _intermediates: &[u8], _ignore: bool, _byte: u8) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(OutputSanitizer::strip_ansi(b"hello world"), "hello world");
    }

    #[test]
    fn test_strip_color_codes() {
        let input = b"\x1b[1;34mDownload\x1b[0m";
        assert_eq!(OutputSanitizer::strip_ansi(input), "Download");
    }

    #[test]
    fn test_preserve_line_structure() {
        let input = b"line1\r\nline2\tcol\nline3";
        assert_eq!(OutputSanitizer::strip_ansi(input), "line1\r\nline2\tcol\nline3");
    }

    #[test]
    fn test_utf8_survives_parser() {
        let input = "\x1b[32mфото.jpg\x1b[0m 日本".as_bytes();
        assert_eq!(OutputSanitizer::strip_ansi(input), "фото.jpg 日本");
    }

    #[test]
    fn test_osc_title() {
        let input = b"\x1b]0;Window Title\x07actual content";
        assert_eq!(OutputSanitizer::strip_ansi(input), "actual content");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(OutputSanitizer::strip_ansi(b""), "");
    }

    #[test]
    fn test_trim_line_endings() {
        assert_eq!(OutputSanitizer::trim_line_endings("/sdcard\r\n\n"), "/sdcard");
        assert_eq!(OutputSanitizer::trim_line_endings("  spaced  \n"), "  spaced  ");
        assert_eq!(OutputSanitizer::trim_line_endings("\r\n"), "");
    }
}
