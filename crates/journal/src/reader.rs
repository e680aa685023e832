//! Shared-read line access to journal files.
//!
//! The game keeps a write handle on the active journal for the whole session,
//! so every read here opens the file non-exclusively and treats any I/O
//! failure as "no data yet" rather than an error. Responsiveness on failure
//! is the poller's job; nothing in this module sleeps or retries.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Read every line of a file. Returns whatever could be read — the empty
/// vec on open failure, a partial list if the read dies midway.
pub fn read_all_lines(path: &Path) -> Vec<String> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::debug!("cannot open {}: {e}", path.display());
            return Vec::new();
        }
    };

    let mut lines = Vec::new();
    for line in BufReader::new(file).lines() {
        match line {
            Ok(l) => lines.push(l),
            Err(e) => {
                tracing::debug!("read error in {}: {e}", path.display());
                break;
            }
        }
    }
    lines
}

/// Read the byte range `[offset, len)` of a file and split it into
/// terminated lines.
///
/// Returns the lines plus the new offset, which points just past the last
/// line terminator consumed. A trailing fragment with no terminator — the
/// producer was caught mid-write — is neither returned nor consumed, so the
/// next poll picks it up once it is complete. On any I/O failure the offset
/// comes back unchanged with no lines.
pub fn read_lines_from_offset(path: &Path, offset: u64) -> (Vec<String>, u64) {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::debug!("cannot open {}: {e}", path.display());
            return (Vec::new(), offset);
        }
    };

    if let Err(e) = file.seek(SeekFrom::Start(offset)) {
        tracing::debug!("cannot seek in {}: {e}", path.display());
        return (Vec::new(), offset);
    }

    let mut buf = Vec::new();
    if let Err(e) = file.read_to_end(&mut buf) {
        tracing::debug!("read error in {}: {e}", path.display());
        return (Vec::new(), offset);
    }

    let Some(last_newline) = buf.iter().rposition(|b| *b == b'\n') else {
        return (Vec::new(), offset);
    };

    let lines = buf[..last_newline]
        .split(|b| *b == b'\n')
        .map(|raw| {
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            String::from_utf8_lossy(raw).into_owned()
        })
        .collect();

    (lines, offset + last_newline as u64 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_all_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Journal.01.log");
        std::fs::write(&path, "{\"a\":1}\n{\"b\":2}\n").unwrap();
        assert_eq!(read_all_lines(&path), vec!["{\"a\":1}", "{\"b\":2}"]);
    }

    #[test]
    fn missing_file_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.log");
        assert!(read_all_lines(&path).is_empty());
        let (lines, offset) = read_lines_from_offset(&path, 42);
        assert!(lines.is_empty());
        assert_eq!(offset, 42);
    }

    #[test]
    fn offset_read_returns_only_new_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Journal.01.log");
        std::fs::write(&path, "first\n").unwrap();
        let (lines, offset) = read_lines_from_offset(&path, 0);
        assert_eq!(lines, vec!["first"]);

        let mut f = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        f.write_all(b"second\nthird\n").unwrap();

        let (lines, offset) = read_lines_from_offset(&path, offset);
        assert_eq!(lines, vec!["second", "third"]);
        assert_eq!(offset, std::fs::metadata(&path).unwrap().len());
    }

    #[test]
    fn unterminated_tail_is_left_for_the_next_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Journal.01.log");
        std::fs::write(&path, "complete\npart").unwrap();

        let (lines, offset) = read_lines_from_offset(&path, 0);
        assert_eq!(lines, vec!["complete"]);
        assert_eq!(offset, "complete\n".len() as u64);

        // The writer finishes the line later.
        let mut f = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        f.write_all(b"ial\n").unwrap();

        let (lines, _) = read_lines_from_offset(&path, offset);
        assert_eq!(lines, vec!["partial"]);
    }

    #[test]
    fn crlf_terminators_are_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Journal.01.log");
        std::fs::write(&path, "one\r\ntwo\r\n").unwrap();
        let (lines, _) = read_lines_from_offset(&path, 0);
        assert_eq!(lines, vec!["one", "two"]);
    }
}
