use crate::identifier::Identifier;

/// Identifier extraction, validity, and hash dispatch for one traffic
/// dimension (source IP, destination IP, or query name). Implemented by
/// zero-sized types in `qlad-policy`; kept here as a trait so
/// [`crate::flow_store::FlowStore`] and the engine can be generic over it
/// without depending on packet-parsing code.
///
/// `parse` returns `None` for anything that fails to parse as this policy's
/// packet shape (truncated header, wrong protocol, fragment, malformed DNS
/// question, ...) — a packet-parse-reject, silently dropped by the caller.
/// A `Some(id)` result may still be invalid per [`Identifier::is_valid`]
/// (an empty domain label); the caller checks both.
pub trait Policy: Send + Sync + 'static {
    /// Human-readable name, used in diagnostics.
    const NAME: &'static str;

    /// Extracts an identifier from an IP-layer packet payload.
    fn parse(data: &[u8]) -> Option<Identifier>;

    /// Hashes `id` using this policy's hash family, function `index`.
    fn hash(index: usize, id: &Identifier) -> u32;
}
