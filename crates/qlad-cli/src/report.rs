use chrono::{DateTime, Utc};
use qlad_engine::DetectorResult;

/// Renders one detection tick's result in the `ctime`-style report format,
/// written directly to stdout.
pub fn print_report(result: &DetectorResult) {
    println!(
        "From: {}\nTo: {}\n\tfound anomalies ({} / {}) : {}",
        ctime(result.start_time),
        ctime(result.end_time),
        result.anomalous_ids.len(),
        result.total_identifiers,
        join_ids(&result.anomalous_ids),
    );
}

fn ctime(epoch_seconds: i64) -> String {
    DateTime::<Utc>::from_timestamp(epoch_seconds, 0)
        .map(|t| t.format("%a %b %e %H:%M:%S %Y").to_string())
        .unwrap_or_else(|| format!("<invalid timestamp {epoch_seconds}>"))
}

fn join_ids(ids: &[qlad_core::Identifier]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use qlad_core::Identifier;

    #[test]
    fn ctime_renders_a_fixed_unix_timestamp() {
        // 2021-01-01T00:00:00Z
        assert_eq!(ctime(1_609_459_200), "Fri Jan  1 00:00:00 2021");
    }

    #[test]
    fn join_ids_is_empty_for_no_anomalies() {
        assert_eq!(join_ids(&[]), "");
    }

    #[test]
    fn join_ids_comma_separates_identifiers() {
        let ids = vec![Identifier::IPv4(1), Identifier::IPv4(2)];
        assert_eq!(join_ids(&ids), "0.0.0.1, 0.0.0.2");
    }
}
