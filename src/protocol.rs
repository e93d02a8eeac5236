//! HMT333 ASCII serial protocol
//!
//! The sensor is polled with plain ASCII commands and answers with one
//! line per request, e.g. `T= 12.3 'C`. This module holds the command
//! strings and classifies each response line before it reaches the parser.

/// Sent on connect, and again whenever the sensor echoes our commands
pub const ECHO_OFF: &[u8] = b"echo off\r\n";

/// Requests one temperature reading
pub const SEND: &[u8] = b"send\r\n";

/// Lines shorter than this carry no data
pub const MIN_LINE_LEN: usize = 4;

/// Marker every temperature line contains
pub const TEMPERATURE_MARKER: &str = "T=";

/// What a single response line means to the poll cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseLine<'a> {
    /// The sensor echoed our `send` command; echo must be switched off again
    EchoedCommand,
    /// The sensor confirmed `echo off`; nothing to do
    EchoConfirmed,
    /// Too short, or no temperature marker
    NoData,
    /// Candidate temperature line, handed to the parser
    Reading(&'a str),
}

impl<'a> ResponseLine<'a> {
    /// Short label used in log fields
    pub const fn as_str(&self) -> &'static str {
        match self {
            ResponseLine::EchoedCommand => "echoed-command",
            ResponseLine::EchoConfirmed => "echo-confirmed",
            ResponseLine::NoData => "no-data",
            ResponseLine::Reading(_) => "reading",
        }
    }
}

/// Classify one response line.
///
/// Checks run in a fixed order: length, echoed `send`, echo confirmation,
/// temperature marker.
pub fn classify(line: &str) -> ResponseLine<'_> {
    let line = line.trim();
    if line.len() < MIN_LINE_LEN {
        return ResponseLine::NoData;
    }

    let lower = line.to_ascii_lowercase();
    if lower.contains("send") {
        ResponseLine::EchoedCommand
    } else if lower.contains("echo") {
        ResponseLine::EchoConfirmed
    } else if line.contains(TEMPERATURE_MARKER) {
        ResponseLine::Reading(line)
    } else {
        ResponseLine::NoData
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_line_is_a_reading() {
        assert_eq!(classify("T= 12.3 'C\r\n"), ResponseLine::Reading("T= 12.3 'C"));
        assert_eq!(classify("T= -4.0 'C"), ResponseLine::Reading("T= -4.0 'C"));
    }

    #[test]
    fn echoed_send_requests_echo_off() {
        assert_eq!(classify("send\r\n"), ResponseLine::EchoedCommand);
        assert_eq!(classify("send T= 12.3 'C"), ResponseLine::EchoedCommand);
    }

    #[test]
    fn echo_confirmation_is_ignored() {
        assert_eq!(classify("Echo : OFF"), ResponseLine::EchoConfirmed);
        assert_eq!(classify("ECHO OFF"), ResponseLine::EchoConfirmed);
    }

    #[test]
    fn short_or_unmarked_lines_carry_no_data() {
        assert_eq!(classify(""), ResponseLine::NoData);
        assert_eq!(classify("\r\n"), ResponseLine::NoData);
        assert_eq!(classify("T="), ResponseLine::NoData);
        assert_eq!(classify("RH= 45.2 %RH"), ResponseLine::NoData);
    }

    #[test]
    fn labels_for_log_fields() {
        assert_eq!(classify("send").as_str(), "echoed-command");
        assert_eq!(classify("T= 1.0 'C").as_str(), "reading");
        assert_eq!(classify("").as_str(), "no-data");
    }
}
