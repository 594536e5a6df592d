//! Packet-parsing policies: the three traffic dimensions the pipeline can
//! track (source IP, destination IP, second-level-domain-shaped query
//! name), each wiring a parser from this crate to a hash family from
//! [`qlad_hash`] behind the [`qlad_core::Policy`] trait.

mod dns;
mod ip;
mod ip_policy;
mod qname_policy;
mod sld;

pub use ip_policy::{DstIpPolicy, SrcIpPolicy};
pub use qname_policy::QNamePolicy;
pub use sld::sld;
