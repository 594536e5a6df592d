use std::sync::OnceLock;

use qlad_core::{Identifier, Policy};
use qlad_hash::{FixedWidthHash, HashFamily};

use crate::ip::{parse_addresses, RawAddr};

/// Upper bound on the hash-function index any configured `--hash-count`
/// can request. Tables are built once, lazily, sized to this bound rather
/// than to the run's actual engine count, since the policy has no access
/// to `AppConfig` at the type level.
const MAX_ITERATIONS: usize = 64;

fn v4_table() -> &'static FixedWidthHash {
    static TABLE: OnceLock<FixedWidthHash> = OnceLock::new();
    TABLE.get_or_init(|| FixedWidthHash::new(MAX_ITERATIONS, 4))
}

fn v6_table() -> &'static FixedWidthHash {
    static TABLE: OnceLock<FixedWidthHash> = OnceLock::new();
    TABLE.get_or_init(|| FixedWidthHash::new(MAX_ITERATIONS, 16))
}

fn addr_identifier(addr: RawAddr) -> Identifier {
    match addr {
        RawAddr::V4(b) => Identifier::IPv4(u32::from_be_bytes(b)),
        RawAddr::V6(b) => Identifier::IPv6(b),
    }
}

fn hash_addr(index: usize, id: &Identifier) -> u32 {
    match id {
        Identifier::IPv4(_) => v4_table().hash(index, &id.hash_bytes()),
        Identifier::IPv6(_) => v6_table().hash(index, &id.hash_bytes()),
        Identifier::DomainLabel(_) => {
            unreachable!("IP policies never produce domain identifiers")
        }
    }
}

/// Tracks traffic keyed by source IP address. Does not look at the
/// transport layer at all: any IP/UDP datagram yields a source address,
/// matching the reference policy's lack of a port or DNS-shape check.
pub struct SrcIpPolicy;

impl Policy for SrcIpPolicy {
    const NAME: &'static str = "src-ip";

    fn parse(data: &[u8]) -> Option<Identifier> {
        let (src, _dst) = parse_addresses(data)?;
        Some(addr_identifier(src))
    }

    fn hash(index: usize, id: &Identifier) -> u32 {
        hash_addr(index, id)
    }
}

/// Tracks traffic keyed by destination IP address.
pub struct DstIpPolicy;

impl Policy for DstIpPolicy {
    const NAME: &'static str = "dst-ip";

    fn parse(data: &[u8]) -> Option<Identifier> {
        let (_src, dst) = parse_addresses(data)?;
        Some(addr_identifier(dst))
    }

    fn hash(index: usize, id: &Identifier) -> u32 {
        hash_addr(index, id)
    }
}
