use thiserror::Error;

/// Errors raised by capture-source setup and reads. Does not include
/// per-packet parse rejection, which is handled entirely inside
/// `qlad-policy`/`qlad-core` and never surfaces here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to open capture source: {0}")]
    Open(#[source] pcap::Error),

    #[error("invalid BPF filter {filter:?}: {source}")]
    Filter {
        filter: String,
        #[source]
        source: pcap::Error,
    },

    #[error("unrecognized datalink type {0}; cannot locate the IP header")]
    UnsupportedLinkType(i32),

    #[error("capture read failed: {0}")]
    Read(#[source] pcap::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
