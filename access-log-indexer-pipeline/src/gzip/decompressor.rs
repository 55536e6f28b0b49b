//! Decoding of every candidate member into one logical byte stream.

use std::io::{self, Cursor, Read};

use flate2::read::GzDecoder;
use tracing::{debug, instrument};

use super::scanner::{GzipMemberScanner, MemberOffset};

/// A candidate that did not decode as a gzip member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberFailure {
    pub offset: MemberOffset,
    pub reason: String,
}

/// Plaintext of all decoded members, in the order they appear in the object.
#[derive(Debug, Default)]
pub struct ReconstructedStream {
    data: Vec<u8>,
    members_found: usize,
    members_decoded: usize,
    failures: Vec<MemberFailure>,
}

impl ReconstructedStream {
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Header candidates reported by the scanner.
    pub fn members_found(&self) -> usize {
        self.members_found
    }

    /// Candidates that decoded successfully.
    pub fn members_decoded(&self) -> usize {
        self.members_decoded
    }

    /// Candidates that were skipped.
    pub fn members_skipped(&self) -> usize {
        self.failures.len()
    }

    pub fn failures(&self) -> &[MemberFailure] {
        &self.failures
    }

    /// A reader positioned at the start of the stream.
    pub fn into_reader(self) -> Cursor<Vec<u8>> {
        Cursor::new(self.data)
    }
}

/// Rebuilds the plaintext of an object made of concatenated gzip members.
pub struct MultiMemberDecompressor;

impl MultiMemberDecompressor {
    /// Decode every member candidate in `raw`.
    ///
    /// Candidates are decoded in ascending offset order and each successful
    /// member's plaintext is appended whole. A candidate that fails is
    /// recorded and skipped; anything it produced before failing is
    /// discarded.
    #[instrument(skip(raw), fields(raw_len = raw.len()))]
    pub fn decompress(raw: &[u8]) -> ReconstructedStream {
        let offsets = GzipMemberScanner::scan(raw);
        let mut stream = ReconstructedStream {
            members_found: offsets.len(),
            ..Default::default()
        };

        for offset in offsets {
            match Self::decode_member(&raw[offset..]) {
                Ok(plain) => {
                    stream.data.extend_from_slice(&plain);
                    stream.members_decoded += 1;
                }
                Err(e) => {
                    debug!(offset = offset, error = %e, "Skipping gzip member candidate");
                    stream.failures.push(MemberFailure {
                        offset,
                        reason: e.to_string(),
                    });
                }
            }
        }

        debug!(
            members_found = stream.members_found,
            members_decoded = stream.members_decoded,
            bytes = stream.data.len(),
            "Reconstructed multi-member stream"
        );
        stream
    }

    /// Buffer a forward-only reader into memory, then decode it.
    pub fn decompress_reader<R: Read>(mut reader: R) -> io::Result<ReconstructedStream> {
        let mut raw = Vec::new();
        reader.read_to_end(&mut raw)?;
        Ok(Self::decompress(&raw))
    }

    /// Decode the single member starting at the beginning of `member`.
    ///
    /// The decoder stops at the member's own trailer, so trailing bytes of
    /// later members are left alone.
    fn decode_member(member: &[u8]) -> io::Result<Vec<u8>> {
        let mut decoder = GzDecoder::new(member);
        let mut plain = Vec::new();
        decoder.read_to_end(&mut plain)?;
        Ok(plain)
    }
}
