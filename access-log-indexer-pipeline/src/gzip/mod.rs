//! Reconstruction of access log objects made of concatenated gzip members.
//!
//! Load balancers append independently compressed members to one object.
//! The scanner finds every position that looks like a member header and
//! the decompressor decodes each candidate on its own, keeping the ones
//! that turn out to be real members.

mod decompressor;
mod scanner;

pub use decompressor::{MemberFailure, MultiMemberDecompressor, ReconstructedStream};
pub use scanner::{GzipMemberScanner, MemberOffset, HEADER_CANDIDATE_LEN};
