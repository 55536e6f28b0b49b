//! Heuristic search for gzip member headers.

/// Byte position within the raw object where a member may start.
pub type MemberOffset = usize;

/// Number of bytes inspected at each position.
pub const HEADER_CANDIDATE_LEN: usize = 10;

const ID1: u8 = 0x1f;
const ID2: u8 = 0x8b;
const CM_DEFLATE: u8 = 0x08;
/// Only flag bits 0-4 are defined; 0x20 is a loose upper bound.
const MAX_FLAGS: u8 = 0x20;
/// Extra flags for deflate: unknown, maximum compression, fastest.
const DEFLATE_XFL: [u8; 3] = [0x00, 0x02, 0x04];

/// Finds candidate gzip member starts in a byte sequence.
///
/// The test looks at the fixed part of the header only, so it reports
/// false positives on arbitrary binary content. Callers must confirm each
/// candidate by decoding it.
pub struct GzipMemberScanner;

impl GzipMemberScanner {
    /// Whether the bytes at the start of `window` could be a member header.
    ///
    /// Fewer than [`HEADER_CANDIDATE_LEN`] bytes never qualify.
    pub fn is_header_candidate(window: &[u8]) -> bool {
        let Some(header) = window.get(..HEADER_CANDIDATE_LEN) else {
            return false;
        };

        header[0] == ID1
            && header[1] == ID2
            && header[2] == CM_DEFLATE
            && header[3] <= MAX_FLAGS
            && DEFLATE_XFL.contains(&header[8])
    }

    /// Every candidate offset in `data`, in ascending order.
    ///
    /// Each position is tested and the scan advances one byte at a time, so
    /// overlapping candidates are all reported. `data` is only read.
    pub fn scan(data: &[u8]) -> Vec<MemberOffset> {
        data.windows(HEADER_CANDIDATE_LEN)
            .enumerate()
            .filter(|(_, window)| Self::is_header_candidate(window))
            .map(|(offset, _)| offset)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const HEADER: [u8; 10] = [0x1f, 0x8b, 0x08, 0x00, 0, 0, 0, 0, 0x00, 0xff];

    fn gzip(data: &[u8], level: Compression) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), level);
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_header_candidate_rules() {
        assert!(GzipMemberScanner::is_header_candidate(&HEADER));

        let mut bad_magic = HEADER;
        bad_magic[1] = 0x8c;
        assert!(!GzipMemberScanner::is_header_candidate(&bad_magic));

        let mut bad_method = HEADER;
        bad_method[2] = 0x07;
        assert!(!GzipMemberScanner::is_header_candidate(&bad_method));

        let mut loose_flags = HEADER;
        loose_flags[3] = 0x20;
        assert!(GzipMemberScanner::is_header_candidate(&loose_flags));
        loose_flags[3] = 0x21;
        assert!(!GzipMemberScanner::is_header_candidate(&loose_flags));

        for xfl in [0x02, 0x04] {
            let mut header = HEADER;
            header[8] = xfl;
            assert!(GzipMemberScanner::is_header_candidate(&header));
        }
        let mut bad_xfl = HEADER;
        bad_xfl[8] = 0x01;
        assert!(!GzipMemberScanner::is_header_candidate(&bad_xfl));
    }

    #[test]
    fn test_short_input_is_not_a_candidate() {
        assert!(!GzipMemberScanner::is_header_candidate(&HEADER[..9]));
        assert!(GzipMemberScanner::scan(&HEADER[..9]).is_empty());
        assert!(GzipMemberScanner::scan(&[]).is_empty());
    }

    #[test]
    fn test_scan_finds_every_member_start() {
        let members = [
            gzip(b"first line\n", Compression::default()),
            gzip(b"second line\n", Compression::best()),
            gzip(b"third line\n", Compression::fast()),
        ];

        let mut blob = Vec::new();
        let mut expected = Vec::new();
        for member in &members {
            expected.push(blob.len());
            blob.extend_from_slice(member);
        }

        assert_eq!(GzipMemberScanner::scan(&blob), expected);
    }

    #[test]
    fn test_scan_reports_candidate_at_tail() {
        let mut blob = vec![0u8; 5];
        blob.extend_from_slice(&HEADER);

        assert_eq!(GzipMemberScanner::scan(&blob), vec![5]);
    }
}
