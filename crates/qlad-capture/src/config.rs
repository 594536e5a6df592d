use std::path::PathBuf;

/// Where a capture reads from: standard input (libpcap's `-` savefile
/// convention) or a named path, which may be either an offline capture file
/// or a live interface name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureInput {
    Stdin,
    Path(PathBuf),
}

impl CaptureInput {
    pub fn from_cli_value(value: &str) -> Self {
        if value == "-" {
            CaptureInput::Stdin
        } else {
            CaptureInput::Path(PathBuf::from(value))
        }
    }
}

/// Validated capture parameters, built from the CLI's `--input-file`,
/// `--filter-queries`/`--filter-replies` flags.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub input: CaptureInput,
    pub filter: Option<String>,
    pub snaplen: i32,
    pub promiscuous: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            input: CaptureInput::Stdin,
            filter: None,
            snaplen: 65535,
            promiscuous: false,
        }
    }
}

/// The two BPF filter presets the CLI exposes directly (`--filter-queries`,
/// `--filter-replies`); mutually exclusive, validated by the caller.
pub const FILTER_QUERIES: &str = "udp and dst port 53";
pub const FILTER_REPLIES: &str = "udp and src port 53";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_parses_as_stdin() {
        assert_eq!(CaptureInput::from_cli_value("-"), CaptureInput::Stdin);
    }

    #[test]
    fn other_values_parse_as_a_path() {
        assert_eq!(
            CaptureInput::from_cli_value("capture.pcap"),
            CaptureInput::Path(PathBuf::from("capture.pcap"))
        );
    }
}
