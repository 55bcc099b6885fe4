//! Text helpers for console output
//!
//! Received payloads are relayed untouched; these helpers only shape what the
//! operator sees in the log.

/// Strips a single trailing `\n` or `\r\n`.
pub fn trim_line_ending(bytes: &[u8]) -> &[u8] {
    match bytes.strip_suffix(b"\n") {
        Some(line) => line.strip_suffix(b"\r").unwrap_or(line),
        None => bytes,
    }
}

/// Renders a received payload as a single log line.
pub fn display_payload(bytes: &[u8]) -> String {
    String::from_utf8_lossy(trim_line_ending(bytes)).into_owned()
}
