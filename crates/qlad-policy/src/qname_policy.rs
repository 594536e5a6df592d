use std::sync::OnceLock;

use qlad_core::{Identifier, Policy};
use qlad_hash::{HashFamily, VariableLengthHash};

use crate::dns::parse_query_name;
use crate::sld::sld;

const MAX_ITERATIONS: usize = 64;

fn name_table() -> &'static VariableLengthHash {
    static TABLE: OnceLock<VariableLengthHash> = OnceLock::new();
    TABLE.get_or_init(|| {
        VariableLengthHash::new(MAX_ITERATIONS, qlad_core::MAX_DOMAIN_LABEL_LEN, 32)
    })
}

/// Tracks traffic keyed by the second-level-domain-shaped suffix of the
/// first question name in a well-formed DNS query over UDP port 53.
pub struct QNamePolicy;

impl Policy for QNamePolicy {
    const NAME: &'static str = "qname";

    fn parse(data: &[u8]) -> Option<Identifier> {
        let name = parse_query_name(data)?;
        Some(Identifier::DomainLabel(sld(&name)))
    }

    fn hash(index: usize, id: &Identifier) -> u32 {
        match id {
            Identifier::DomainLabel(_) => name_table().hash(index, &id.hash_bytes()),
            Identifier::IPv4(_) | Identifier::IPv6(_) => {
                unreachable!("qname policy never produces IP identifiers")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_name(labels: &[&str]) -> Vec<u8> {
        let mut out = Vec::new();
        for label in labels {
            out.push(label.len() as u8);
            out.extend_from_slice(label.as_bytes());
        }
        out.push(0);
        out
    }

    fn build_query(qname: &[u8]) -> Vec<u8> {
        let mut dns = vec![0u8; 12];
        dns[4..6].copy_from_slice(&1u16.to_be_bytes());
        dns.extend_from_slice(qname);
        dns.extend_from_slice(&0u16.to_be_bytes());
        dns.extend_from_slice(&0u16.to_be_bytes());

        let mut udp = vec![0u8; 8];
        udp[2..4].copy_from_slice(&53u16.to_be_bytes());
        let udp_len = (8 + dns.len()) as u16;
        udp[4..6].copy_from_slice(&udp_len.to_be_bytes());
        udp.extend_from_slice(&dns);

        let mut packet = vec![0u8; 20];
        packet[0] = 0x45;
        let total_len = (20 + udp.len()) as u16;
        packet[2..4].copy_from_slice(&total_len.to_be_bytes());
        packet[9] = 17;
        packet.extend_from_slice(&udp);
        packet
    }

    #[test]
    fn extracts_sld_shaped_identifier() {
        let qname = encode_name(&["www", "example", "co", "uk"]);
        let packet = build_query(&qname);
        assert_eq!(
            QNamePolicy::parse(&packet),
            Some(Identifier::DomainLabel("co.uk.".to_string()))
        );
    }

    #[test]
    fn non_dns_packet_is_rejected() {
        assert_eq!(QNamePolicy::parse(&[0x45, 0, 0]), None);
    }

    #[test]
    fn hash_is_deterministic_per_index() {
        let id = Identifier::DomainLabel("example.com.".to_string());
        assert_eq!(QNamePolicy::hash(1, &id), QNamePolicy::hash(1, &id));
    }
}
