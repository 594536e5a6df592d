use qlad_core::MAX_DOMAIN_LABEL_LEN;

use crate::ip::parse_ip;

const NAMESERVER_PORT: u16 = 53;
const DNS_HEADER_LEN: usize = 12;
const INDIR_MASK: u8 = 0xc0;
const WEIRD_FLAGS_MASK: u16 = 0x6cf;
const OPCODE_QUERY: u16 = 0;

/// Parses the first DNS question name out of an IP-layer packet payload,
/// rejecting anything that is not a well-formed DNS query over UDP port 53:
/// fragments, non-UDP, wrong port, responses, non-`QUERY` opcodes, zero
/// questions, unusual flag bits, compressed/EDNS-bitlabel names, truncated
/// headers, or names over [`MAX_DOMAIN_LABEL_LEN`] bytes.
///
/// Returns the name as lowercase ASCII labels joined by `.` with a trailing
/// dot, e.g. `www.example.com.`.
pub fn parse_query_name(data: &[u8]) -> Option<String> {
    let ip = parse_ip(data)?;
    let udp = data.get(ip.udp_offset..)?;
    if udp.len() < 8 {
        return None;
    }
    let sport = u16::from_be_bytes([udp[0], udp[1]]);
    let dport = u16::from_be_bytes([udp[2], udp[3]]);
    if sport != NAMESERVER_PORT && dport != NAMESERVER_PORT {
        return None;
    }

    let dns = udp.get(8..)?;
    if dns.len() < DNS_HEADER_LEN {
        return None;
    }
    let flags = u16::from_be_bytes([dns[2], dns[3]]);
    let qdcount = u16::from_be_bytes([dns[4], dns[5]]);
    let qr = flags & 0x8000 != 0;
    let opcode = (flags >> 11) & 0x0f;
    if qr || opcode != OPCODE_QUERY || qdcount == 0 {
        return None; // not a query
    }
    if flags & WEIRD_FLAGS_MASK != 0 {
        return None; // weird query flags
    }

    parse_name(&dns[DNS_HEADER_LEN..])
}

fn parse_name(mut cp: &[u8]) -> Option<String> {
    let mut name = String::with_capacity(MAX_DOMAIN_LABEL_LEN);
    loop {
        let &l = cp.first()?;
        if l & INDIR_MASK != 0 {
            return None; // query name compression / EDNS bitlabel
        }
        cp = &cp[1..];
        if cp.len() < l as usize {
            return None; // query name truncated
        }
        for &byte in &cp[..l as usize] {
            name.push((byte as char).to_ascii_lowercase());
        }
        cp = &cp[l as usize..];
        if !(l == 0 && !name.is_empty()) {
            name.push('.');
        }
        if l == 0 {
            break;
        }
    }
    if name.len() > MAX_DOMAIN_LABEL_LEN {
        return None; // query name too long
    }
    Some(name)
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
        let mut dns = vec![0u8; DNS_HEADER_LEN];
        dns[4..6].copy_from_slice(&1u16.to_be_bytes()); // qdcount = 1
        dns.extend_from_slice(qname);
        dns.extend_from_slice(&0u16.to_be_bytes()); // qtype
        dns.extend_from_slice(&0u16.to_be_bytes()); // qclass

        let mut udp = vec![0u8; 8];
        udp[2..4].copy_from_slice(&53u16.to_be_bytes()); // dport = 53
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
    fn parses_simple_query_name() {
        let qname = encode_name(&["WWW", "Example", "com"]);
        let packet = build_query(&qname);
        assert_eq!(parse_query_name(&packet).unwrap(), "www.example.com.");
    }

    #[test]
    fn rejects_response_packets() {
        let qname = encode_name(&["example", "com"]);
        let mut packet = build_query(&qname);
        // set QR bit in the DNS flags field (IP 20 + UDP 8 + flags at +2)
        let flags_off = 20 + 8 + 2;
        packet[flags_off] |= 0x80;
        assert!(parse_query_name(&packet).is_none());
    }

    #[test]
    fn rejects_compressed_names() {
        let mut qname = vec![0xc0, 0x0c];
        qname.push(0);
        let packet = build_query(&qname);
        assert!(parse_query_name(&packet).is_none());
    }

    #[test]
    fn rejects_zero_questions() {
        let qname = encode_name(&["example", "com"]);
        let mut packet = build_query(&qname);
        let qdcount_off = 20 + 8 + 4;
        packet[qdcount_off..qdcount_off + 2].copy_from_slice(&0u16.to_be_bytes());
        assert!(parse_query_name(&packet).is_none());
    }
}
