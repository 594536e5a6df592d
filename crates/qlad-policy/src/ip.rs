/// A source or destination address as raw bytes, tagged by address family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawAddr {
    V4([u8; 4]),
    V6([u8; 16]),
}

impl RawAddr {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            RawAddr::V4(b) => b,
            RawAddr::V6(b) => b,
        }
    }
}

/// Result of parsing an IP header: both addresses and the byte offset in
/// `data` where the next-layer (UDP) payload begins.
pub struct IpParsed {
    pub src: RawAddr,
    pub dst: RawAddr,
    pub udp_offset: usize,
}

const IP_OFFMASK: u16 = 0x1fff;
const IP_MF: u16 = 0x2000;
const IPPROTO_UDP: u8 = 17;

const IPV6_HOPOPTS: u8 = 0;
const IPV6_ROUTING: u8 = 43;
const IPV6_FRAGMENT: u8 = 44;
const IPV6_AH: u8 = 51;
const IPV6_DSTOPTS: u8 = 60;

/// Minimal IP-header parse used by the source/destination IP policies:
/// just enough to read both addresses, with no transport-layer check.
/// Rejects truncated headers, unknown IP versions, and (for the sake of a
/// single shared parser) fragmented datagrams.
pub fn parse_addresses(data: &[u8]) -> Option<(RawAddr, RawAddr)> {
    parse_ip(data).map(|p| (p.src, p.dst))
}

/// Full IP-header parse used by the query-name policy: validates length,
/// version, and fragmentation, and locates the UDP payload.
pub fn parse_ip(data: &[u8]) -> Option<IpParsed> {
    let version = data.first()? >> 4;
    match version {
        4 => parse_ipv4(data),
        6 => parse_ipv6(data),
        _ => None, // unsupported IP version: packet-parse-reject, not a process abort
    }
}

fn parse_ipv4(data: &[u8]) -> Option<IpParsed> {
    if data.len() < 20 {
        return None;
    }
    let ihl = (data[0] & 0x0f) as usize;
    let hlen = ihl * 4;
    let total_len = u16::from_be_bytes([data[2], data[3]]) as usize;
    if hlen < 20 || total_len < hlen || data.len() < total_len {
        return None;
    }
    let off = u16::from_be_bytes([data[6], data[7]]);
    if (off & IP_OFFMASK) != 0 || (off & IP_MF) != 0 {
        return None; // fragmentation not supported
    }
    if data[9] != IPPROTO_UDP {
        return None;
    }
    let src = RawAddr::V4([data[12], data[13], data[14], data[15]]);
    let dst = RawAddr::V4([data[16], data[17], data[18], data[19]]);
    Some(IpParsed {
        src,
        dst,
        udp_offset: hlen,
    })
}

fn parse_ipv6(data: &[u8]) -> Option<IpParsed> {
    if data.len() < 40 {
        return None;
    }
    let payload_len = u16::from_be_bytes([data[4], data[5]]) as usize;
    if data.len() < 40 + payload_len {
        return None;
    }
    let mut src_bytes = [0u8; 16];
    src_bytes.copy_from_slice(&data[8..24]);
    let mut dst_bytes = [0u8; 16];
    dst_bytes.copy_from_slice(&data[24..40]);
    let src = RawAddr::V6(src_bytes);
    let dst = RawAddr::V6(dst_bytes);

    let mut next_header = data[6];
    let mut offset = 40usize;
    loop {
        match next_header {
            IPV6_HOPOPTS | IPV6_DSTOPTS | IPV6_ROUTING | IPV6_AH => {
                if data.len() < offset + 8 {
                    return None;
                }
                next_header = data[offset];
                let ext_len = data[offset + 1] as usize;
                offset += (ext_len + 1) * 8;
                if data.len() < offset {
                    return None;
                }
            }
            IPV6_FRAGMENT => return None, // fragmentation not supported
            IPPROTO_UDP => {
                return Some(IpParsed {
                    src,
                    dst,
                    udp_offset: offset,
                })
            }
            _ => return None, // not a UDP packet or unrecognized header
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_ipv4_udp(src: [u8; 4], dst: [u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut packet = vec![0u8; 20 + 8 + payload.len()];
        packet[0] = 0x45; // version 4, IHL 5
        let total_len = packet.len() as u16;
        packet[2..4].copy_from_slice(&total_len.to_be_bytes());
        packet[9] = IPPROTO_UDP;
        packet[12..16].copy_from_slice(&src);
        packet[16..20].copy_from_slice(&dst);
        packet[28..].copy_from_slice(payload);
        packet
    }

    #[test]
    fn parses_ipv4_addresses() {
        let packet = minimal_ipv4_udp([10, 0, 0, 1], [10, 0, 0, 2], b"hi");
        let (src, dst) = parse_addresses(&packet).unwrap();
        assert_eq!(src, RawAddr::V4([10, 0, 0, 1]));
        assert_eq!(dst, RawAddr::V4([10, 0, 0, 2]));
    }

    #[test]
    fn rejects_truncated_header() {
        assert!(parse_addresses(&[0x45, 0, 0]).is_none());
    }

    #[test]
    fn rejects_fragmented_datagram() {
        let mut packet = minimal_ipv4_udp([1, 1, 1, 1], [2, 2, 2, 2], b"hi");
        packet[6] = 0x20; // MF bit set
        assert!(parse_ip(&packet).is_none());
    }

    #[test]
    fn rejects_unknown_version() {
        let mut packet = minimal_ipv4_udp([1, 1, 1, 1], [2, 2, 2, 2], b"hi");
        packet[0] = 0x75; // version 7
        assert!(parse_ip(&packet).is_none());
    }
}
