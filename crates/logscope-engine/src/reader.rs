//! Line-oriented file scanning with batched emission.

use std::io::{self, BufRead, BufReader, Read};
use std::time::Instant;

use logscope_source::Source;
use regex::Regex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::engine::Engine;
use crate::protocol::{Meta, Path, Request, Response};

/// Initial scan buffer size.
const INITIAL_BUFFER: usize = 64 * 1024;
/// Hard cap on a single line; longer lines abort the file.
const MAX_LINE: usize = 1024 * 1024;

/// Buffered line reader enforcing [`MAX_LINE`].
pub(crate) struct LineScanner<R> {
    reader: BufReader<R>,
}

impl<R: Read> LineScanner<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self {
            reader: BufReader::with_capacity(INITIAL_BUFFER, inner),
        }
    }

    /// Reads the next line into `line` (delimiter and trailing `\r`
    /// stripped). Returns `Ok(false)` at end of input.
    pub(crate) fn read_line(&mut self, line: &mut Vec<u8>) -> io::Result<bool> {
        line.clear();
        loop {
            let (found_newline, used) = {
                let available = self.reader.fill_buf()?;
                if available.is_empty() {
                    return Ok(!line.is_empty());
                }
                match available.iter().position(|&b| b == b'\n') {
                    Some(pos) => {
                        line.extend_from_slice(&available[..pos]);
                        (true, pos + 1)
                    }
                    None => {
                        line.extend_from_slice(available);
                        (false, available.len())
                    }
                }
            };
            self.reader.consume(used);
            if line.len() > MAX_LINE {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("line exceeds {MAX_LINE} bytes"),
                ));
            }
            if found_newline {
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                return Ok(true);
            }
        }
    }
}

/// Scans one file in one source, emitting batched [`Response`]s.
///
/// Absent paths and directories are silent non-participation. With a
/// regex, only lines whose parsed message matches are emitted, capped per
/// file at `search_max_size`. Without a regex, an empty file still emits
/// one empty batch so clients learn it exists.
pub(crate) fn scan_source_file(
    engine: &Engine,
    token: &CancellationToken,
    outbound: &mpsc::Sender<Response>,
    request: &Request,
    source: &Source,
    path: &Path,
    regex: Option<&Regex>,
) {
    let key = source.fs.join(path.segments());

    let stat = match source.fs.lstat(&key) {
        Ok(stat) => stat,
        // The file need not exist in every source.
        Err(_) => return,
    };
    if stat.is_dir {
        return;
    }

    let file = match source.fs.open(&key) {
        Ok(file) => file,
        Err(e) => {
            warn!(source = %source.name, file = %key, error = %e, "open failed");
            return;
        }
    };

    let meta = Meta::for_file(
        request.meta.id,
        request.meta.action,
        source.name.clone(),
        path.clone(),
    );
    let mut scanner = LineScanner::new(file);
    let mut line_buf: Vec<u8> = Vec::new();
    let mut batch: Vec<logscope_parse::Log> = Vec::new();
    let mut memory = engine.parser().new_memory();
    let mut last_flush = Instant::now();
    let mut line_number: u64 = 1;
    let mut offset: u64 = 0;
    let mut matched_total: usize = 0;
    let mut sent_any = false;

    loop {
        match scanner.read_line(&mut line_buf) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                warn!(source = %source.name, file = %key, error = %e, "scan failed");
                return;
            }
        }
        if token.is_cancelled() {
            return;
        }

        let mut log = engine.parser().parse(&key, &line_buf, &mut memory);

        if let Some(re) = regex {
            if !re.is_match(&log.msg) {
                line_number += 1;
                offset += line_buf.len() as u64;
                continue;
            }
        }

        log.file_name = key.clone();
        log.offset = offset;
        log.fs = source.name.clone();
        log.line = line_number;

        if request.filter_time.excludes(log.time) {
            continue;
        }

        batch.push(log);
        line_number += 1;
        offset += line_buf.len() as u64;

        if regex.is_some() {
            matched_total += 1;
            if matched_total > engine.config().search_max_size {
                // Already-flushed batches stand; the overflow never leaves.
                return;
            }
        }

        if batch.len() > engine.config().content_batch_size
            || last_flush.elapsed() > engine.config().content_batch_time
        {
            sent_any = true;
            if outbound
                .blocking_send(Response::lines(meta.clone(), std::mem::take(&mut batch)))
                .is_err()
            {
                return;
            }
            last_flush = Instant::now();
        }
    }

    // No trailing empty frame after a stream, and no frame at all for a
    // searched file without matches. An untouched batch without a regex is
    // the empty-file existence signal.
    if batch.is_empty() && (sent_any || regex.is_some()) {
        return;
    }
    let _ = outbound.blocking_send(Response::lines(meta, batch));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(input: &[u8]) -> io::Result<Vec<Vec<u8>>> {
        let mut scanner = LineScanner::new(input);
        let mut lines = Vec::new();
        let mut buf = Vec::new();
        while scanner.read_line(&mut buf)? {
            lines.push(buf.clone());
        }
        Ok(lines)
    }

    #[test]
    fn splits_on_newlines() {
        let lines = scan_all(b"one\ntwo\nthree\n").expect("scan");
        assert_eq!(lines, vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]);
    }

    #[test]
    fn final_line_without_newline_is_kept() {
        let lines = scan_all(b"one\ntwo").expect("scan");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], b"two");
    }

    #[test]
    fn crlf_is_stripped() {
        let lines = scan_all(b"one\r\ntwo\r\n").expect("scan");
        assert_eq!(lines, vec![b"one".to_vec(), b"two".to_vec()]);
    }

    #[test]
    fn empty_input_has_no_lines() {
        let lines = scan_all(b"").expect("scan");
        assert!(lines.is_empty());
    }

    #[test]
    fn empty_lines_are_yielded() {
        let lines = scan_all(b"a\n\nb\n").expect("scan");
        assert_eq!(lines, vec![b"a".to_vec(), Vec::new(), b"b".to_vec()]);
    }

    #[test]
    fn line_longer_than_cap_is_an_error() {
        let long = vec![b'x'; MAX_LINE + 1];
        let err = scan_all(&long).expect_err("line too long");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn line_at_cap_is_fine() {
        let mut input = vec![b'x'; MAX_LINE];
        input.push(b'\n');
        let lines = scan_all(&input).expect("scan");
        assert_eq!(lines[0].len(), MAX_LINE);
    }

    #[test]
    fn lines_spanning_buffer_refills_are_joined() {
        // Longer than the initial buffer so fill_buf cycles.
        let line = vec![b'y'; INITIAL_BUFFER * 2 + 17];
        let mut input = line.clone();
        input.push(b'\n');
        input.extend_from_slice(b"tail\n");
        let lines = scan_all(&input).expect("scan");
        assert_eq!(lines[0], line);
        assert_eq!(lines[1], b"tail");
    }
}
