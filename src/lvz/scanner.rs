//! Heuristic WRLD header scanner.
//!
//! The metadata stream has no table of contents. Headers are found by
//! searching for the [`TAG`] bytes anywhere in the stream and keeping the
//! matches whose fields pass [`HeaderRecord::is_admissible`]. After a match
//! the search resumes 4 bytes past the *start* of that match, so headers
//! that overlap or sit back to back are all visited.

use super::structures::{HEADER_SIZE, HeaderRecord, TAG};

/// How many admitted headers are reported to the scan callback.
pub const SCAN_LOG_LIMIT: usize = 50;

/// Iterator over tag matches that have a full header behind them, yielding
/// the match offset and the header window.
///
/// Stops at the first tag that has fewer than [`HEADER_SIZE`] bytes left,
/// since every later tag would be shorter still.
pub struct TagMatches<'a> {
    stream: &'a [u8],
    cursor: usize,
}

impl<'a> TagMatches<'a> {
    pub fn new(stream: &'a [u8]) -> Self {
        Self { stream, cursor: 0 }
    }
}

impl<'a> Iterator for TagMatches<'a> {
    type Item = (usize, &'a [u8; HEADER_SIZE]);

    fn next(&mut self) -> Option<Self::Item> {
        let stream = self.stream;
        let rest = stream.get(self.cursor..)?;
        let found = self.cursor + rest.windows(TAG.len()).position(|w| w == TAG)?;

        let Some(window) = stream[found..].first_chunk::<HEADER_SIZE>() else {
            self.cursor = stream.len();
            return None;
        };

        self.cursor = found + TAG.len();
        Some((found, window))
    }
}

/// Scan `stream` for admissible headers, in discovery order.
pub fn scan(stream: &[u8]) -> Vec<HeaderRecord> {
    scan_with(stream, 0, |_, _| {})
}

/// Like [`scan`], calling `on_admit(index, header)` for each of the first
/// `report_limit` admitted headers.
pub fn scan_with<F>(stream: &[u8], report_limit: usize, mut on_admit: F) -> Vec<HeaderRecord>
where
    F: FnMut(usize, &HeaderRecord),
{
    let mut headers = Vec::new();

    for (offset, window) in TagMatches::new(stream) {
        let header = HeaderRecord::parse(offset as u64, window);
        if !header.is_admissible() {
            continue;
        }

        if headers.len() < report_limit {
            on_admit(headers.len(), &header);
        }
        headers.push(header);
    }

    headers
}

/// Order headers by stream offset and drop repeated offsets, keeping the
/// first of each.
pub fn normalize(mut headers: Vec<HeaderRecord>) -> Vec<HeaderRecord> {
    headers.sort_by_key(|h| h.stream_offset);
    headers.dedup_by_key(|h| h.stream_offset);
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lvz::structures::tests::encode_header;
    use proptest::prelude::*;

    fn header_at(stream_offset: u64, total_size: u32, payload_offset: u32) -> HeaderRecord {
        HeaderRecord {
            stream_offset,
            record_type: 1,
            total_size,
            field_a: 0,
            field_b: 0,
            field_count: 0,
            payload_offset,
            reserved: 0,
        }
    }

    #[test]
    fn finds_headers_and_skips_filler() {
        let mut stream = vec![0xEE; 5];
        stream.extend(encode_header(1, 64, 0x100));
        stream.extend(vec![0xEE; 11]);
        stream.extend(encode_header(2, 48, 0x200));

        let headers = scan(&stream);
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].stream_offset, 5);
        assert_eq!(headers[0].payload_offset, 0x100);
        assert_eq!(headers[1].stream_offset, 48);
        assert_eq!(headers[1].record_type, 2);
    }

    #[test]
    fn drops_false_positive_tag() {
        let mut stream = encode_header(1, 40, 8);
        // tag inside unrelated data: size too small
        stream.extend(encode_header(9, 4, 8));
        // and one with no payload offset
        stream.extend(encode_header(9, 64, 0));

        let headers = scan(&stream);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].stream_offset, 0);
    }

    #[test]
    fn resumes_four_bytes_past_match_start() {
        // a second header starts inside the first one's field area
        let mut stream = encode_header(1, 40, 8);
        let inner = encode_header(2, 48, 16);
        stream.truncate(8);
        stream.extend(&inner);

        let headers = scan(&stream);
        let offsets: Vec<u64> = headers.iter().map(|h| h.stream_offset).collect();
        assert_eq!(offsets, vec![0, 8]);
        assert_eq!(headers[1].total_size, 48);

        // adjacent tags: "DLRWDLRW..." yields a candidate at 0 and at 4
        let mut adjacent = TAG.to_vec();
        adjacent.extend(encode_header(3, 32, 1));
        let matches: Vec<usize> = TagMatches::new(&adjacent).map(|(at, _)| at).collect();
        assert_eq!(matches, vec![0, 4]);

        let (_, window) = TagMatches::new(&adjacent).nth(1).unwrap();
        assert_eq!(&window[..], &adjacent[4..36]);
    }

    #[test]
    fn tag_without_room_for_header_is_ignored() {
        let mut stream = encode_header(1, 40, 8);
        stream.extend_from_slice(b"DLRW\x28\x00\x00\x00");

        assert_eq!(scan(&stream).len(), 1);
        assert!(scan(&stream[..31]).is_empty());
        assert!(scan(&[]).is_empty());
    }

    #[test]
    fn report_limit_bounds_callback() {
        let mut stream = Vec::new();
        for i in 0..60 {
            stream.extend(encode_header(i, 32, 1));
        }

        let mut reported = Vec::new();
        let headers = scan_with(&stream, SCAN_LOG_LIMIT, |idx, h| reported.push((idx, h.stream_offset)));

        assert_eq!(headers.len(), 60);
        assert_eq!(reported.len(), SCAN_LOG_LIMIT);
        assert_eq!(reported[49], (49, 49 * 32));
    }

    #[test]
    fn normalize_sorts_and_keeps_first_duplicate() {
        let headers = vec![
            header_at(64, 40, 1),
            header_at(0, 40, 2),
            header_at(64, 80, 3),
            header_at(32, 40, 4),
        ];

        let normalized = normalize(headers);
        let offsets: Vec<u64> = normalized.iter().map(|h| h.stream_offset).collect();
        assert_eq!(offsets, vec![0, 32, 64]);
        assert_eq!(normalized[2].payload_offset, 1);
    }

    proptest! {
        #[test]
        fn scanner_only_admits_valid_headers(
            chunks in proptest::collection::vec((any::<u32>(), 0u32..80, 0u32..4, 0usize..6), 0..20)
        ) {
            let mut stream = Vec::new();
            for (ty, size, payload, pad) in chunks {
                stream.extend(vec![0x55; pad]);
                stream.extend(encode_header(ty, size, payload));
            }

            for h in scan(&stream) {
                prop_assert!(h.total_size >= 32);
                prop_assert_ne!(h.payload_offset, 0);
                prop_assert!(h.stream_offset as usize + HEADER_SIZE <= stream.len());
            }
        }

        #[test]
        fn normalize_is_ordered_and_idempotent(
            offsets in proptest::collection::vec(0u64..64, 0..40)
        ) {
            let headers: Vec<_> = offsets.iter().map(|&o| header_at(o, 32, 1)).collect();
            let once = normalize(headers);

            for pair in once.windows(2) {
                prop_assert!(pair[0].stream_offset < pair[1].stream_offset);
            }
            prop_assert_eq!(normalize(once.clone()), once);
        }
    }
}
