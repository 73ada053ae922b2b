//! Parsing and emission of the `.zsync` control-file format: a line-oriented
//! header followed by a blank line followed by the packed binary checksum
//! table.

use std::io::{self, BufRead, Read, Write};

use crate::error::{ControlError, Result};
use crate::rfc822;
use crate::target::{BlockRecord, StrongAlgorithm, TargetDescription};

const FORMAT_VERSION: &str = "0.6.2";
const INCOMPATIBLE_VERSION: &str = "0.0.4";

/// Parses a control file from a byte stream: header lines up to the blank
/// separator, then exactly `N * (W + S)` bytes of packed checksum records.
pub fn parse<R: Read>(mut reader: R) -> Result<TargetDescription> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    let mut cursor = io::Cursor::new(&buf);

    let mut headers = Headers::default();
    let mut line = String::new();
    loop {
        line.clear();
        let bytes_read = read_header_line(&mut cursor, &mut line)?;
        if bytes_read == 0 {
            return Err(ControlError::MalformedHeader(
                "unexpected end of file before blank line".to_string(),
            ));
        }
        if line.is_empty() {
            break;
        }
        headers.absorb(&line)?;
    }

    headers.into_target(&mut cursor)
}

/// Reads one `\n`-terminated line (without the terminator) from `cursor`,
/// tolerating a trailing `\r`. Returns the number of bytes consumed,
/// `0` at end of file.
fn read_header_line(cursor: &mut io::Cursor<&Vec<u8>>, line: &mut String) -> Result<usize> {
    let mut raw = Vec::new();
    let n = cursor.read_until(b'\n', &mut raw)?;
    if n == 0 {
        return Ok(0);
    }
    while raw.last() == Some(&b'\n') || raw.last() == Some(&b'\r') {
        raw.pop();
    }
    *line = String::from_utf8(raw)
        .map_err(|_| ControlError::MalformedHeader("header line is not valid UTF-8".to_string()))?;
    Ok(n)
}

#[derive(Default)]
struct Headers {
    version: Option<String>,
    min_version: Option<String>,
    length: Option<u64>,
    blocksize: Option<u32>,
    hash_lengths: Option<(u8, u8, u8)>,
    urls: Vec<String>,
    filename: Option<String>,
    mtime: Option<i64>,
    sha1: Option<[u8; 20]>,
    safe: Vec<String>,
}

impl Headers {
    fn absorb(&mut self, line: &str) -> Result<()> {
        let (key, value) = line
            .split_once(": ")
            .ok_or_else(|| ControlError::MalformedHeader(line.to_string()))?;

        match key {
            "zsync" => self.version = Some(value.to_string()),
            "Min-Version" => self.min_version = Some(value.to_string()),
            "Length" => {
                self.length = Some(parse_numeric("Length", value)?);
            }
            "Blocksize" => {
                self.blocksize = Some(parse_numeric("Blocksize", value)?);
            }
            "Hash-Lengths" => {
                self.hash_lengths = Some(parse_hash_lengths(value)?);
            }
            "URL" => self.urls.push(value.to_string()),
            "Filename" => {
                if value.contains('/') {
                    return Err(ControlError::UnsafeFilename(value.to_string()));
                }
                self.filename = Some(value.to_string());
            }
            "MTime" => self.mtime = rfc822::parse(value),
            "SHA-1" => self.sha1 = Some(parse_sha1_hex("SHA-1", value)?),
            "Safe" => self.safe = value.split_whitespace().map(str::to_string).collect(),
            "Z-Filename" | "Z-URL" | "Z-Map2" | "Recompress" => {
                // Explicitly unsupported; accepted and ignored.
            }
            other => {
                if !self.safe.iter().any(|s| s == other) {
                    return Err(ControlError::UnknownKey(other.to_string()));
                }
            }
        }
        Ok(())
    }

    fn into_target<R: Read>(self, body: &mut R) -> Result<TargetDescription> {
        let version = self
            .version
            .ok_or(ControlError::MissingRequiredField("zsync"))?;
        if version == INCOMPATIBLE_VERSION {
            return Err(ControlError::IncompatibleVersion(version));
        }
        if let Some(min) = &self.min_version {
            if min.as_str() > FORMAT_VERSION {
                return Err(ControlError::IncompatibleVersion(min.clone()));
            }
        }

        let length = self
            .length
            .ok_or(ControlError::MissingRequiredField("Length"))?;
        let blocksize = self
            .blocksize
            .ok_or(ControlError::MissingRequiredField("Blocksize"))?;
        if blocksize == 0 || (blocksize & (blocksize - 1)) != 0 {
            return Err(ControlError::BadBlocksize(u64::from(blocksize)));
        }
        let (seq_matches, weak_bytes, strong_bytes) = self
            .hash_lengths
            .ok_or(ControlError::MissingRequiredField("Hash-Lengths"))?;
        if self.urls.is_empty() {
            return Err(ControlError::MissingRequiredField("URL"));
        }

        let block_count = length.div_ceil(u64::from(blocksize)) as u32;
        let record_len = usize::from(weak_bytes) + usize::from(strong_bytes);
        let table_len = record_len * block_count as usize;

        let mut table = vec![0u8; table_len];
        let got = read_fully(body, &mut table)?;
        if got != table_len {
            return Err(ControlError::TruncatedChecksumTable {
                expected: table_len,
                got,
            });
        }

        let mut blocks = Vec::with_capacity(block_count as usize);
        for (id, record) in table.chunks_exact(record_len).enumerate() {
            let (weak_raw, strong_raw) = record.split_at(usize::from(weak_bytes));
            let weak = decode_weak(weak_raw);
            blocks.push(BlockRecord {
                id: id as u32,
                weak,
                strong_prefix: strong_raw.to_vec(),
            });
        }

        Ok(TargetDescription {
            blocksize,
            length,
            seq_matches,
            weak_bytes,
            strong_bytes,
            strong_algorithm: StrongAlgorithm::Sha1,
            whole_file_sha1: self.sha1,
            urls: self.urls,
            filename: self.filename,
            mtime: self.mtime,
            blocks,
        })
    }
}

fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match reader.read(&mut buf[total..])? {
            0 => break,
            n => total += n,
        }
    }
    Ok(total)
}

fn parse_numeric<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ControlError::BadNumericField {
            key,
            value: value.to_string(),
        })
}

fn parse_hash_lengths(value: &str) -> Result<(u8, u8, u8)> {
    let parts: Vec<&str> = value.split(',').collect();
    if parts.len() != 3 {
        return Err(ControlError::MalformedHeader(format!(
            "Hash-Lengths: {value}"
        )));
    }
    let k: i64 = parts[0]
        .trim()
        .parse()
        .map_err(|_| ControlError::MalformedHeader(format!("Hash-Lengths: {value}")))?;
    let w: i64 = parts[1]
        .trim()
        .parse()
        .map_err(|_| ControlError::MalformedHeader(format!("Hash-Lengths: {value}")))?;
    let s: i64 = parts[2]
        .trim()
        .parse()
        .map_err(|_| ControlError::MalformedHeader(format!("Hash-Lengths: {value}")))?;
    if !(1..=2).contains(&k) || !(1..=4).contains(&w) || !(3..=16).contains(&s) {
        return Err(ControlError::BadHashLengths { k, w, s });
    }
    Ok((k as u8, w as u8, s as u8))
}

fn parse_sha1_hex(key: &'static str, value: &str) -> Result<[u8; 20]> {
    if value.len() != 40 {
        return Err(ControlError::BadNumericField {
            key,
            value: value.to_string(),
        });
    }
    let mut out = [0u8; 20];
    for (i, chunk) in value.as_bytes().chunks_exact(2).enumerate() {
        let hi = chunk[0] as char;
        let lo = chunk[1] as char;
        let byte = u8::from_str_radix(&format!("{hi}{lo}"), 16).map_err(|_| {
            ControlError::BadNumericField {
                key,
                value: value.to_string(),
            }
        })?;
        out[i] = byte;
    }
    Ok(out)
}

/// Decodes a `W`-byte big-endian weak sum, zero-extended to a full 32-bit
/// value on the high side.
fn decode_weak(bytes: &[u8]) -> u32 {
    let mut value: u32 = 0;
    for &byte in bytes {
        value = (value << 8) | u32::from(byte);
    }
    value
}

/// Encodes the trailing `weak_bytes` bytes of a full 32-bit rolling value.
fn encode_weak(value: u32, weak_bytes: u8) -> Vec<u8> {
    let full = value.to_be_bytes();
    full[4 - usize::from(weak_bytes)..].to_vec()
}

/// Writes a control file's header block plus packed checksum table.
pub fn emit<W: Write>(mut writer: W, target: &TargetDescription) -> Result<()> {
    writeln!(writer, "zsync: {FORMAT_VERSION}")?;
    writeln!(writer, "Length: {}", target.length)?;
    writeln!(writer, "Blocksize: {}", target.blocksize)?;
    writeln!(
        writer,
        "Hash-Lengths: {},{},{}",
        target.seq_matches, target.weak_bytes, target.strong_bytes
    )?;
    if let Some(filename) = &target.filename {
        writeln!(writer, "Filename: {filename}")?;
    }
    if let Some(mtime) = target.mtime {
        writeln!(writer, "MTime: {}", rfc822::format(mtime))?;
    }
    for url in &target.urls {
        writeln!(writer, "URL: {url}")?;
    }
    if let Some(sha1) = target.whole_file_sha1 {
        writeln!(writer, "SHA-1: {}", hex(&sha1))?;
    }
    writeln!(writer)?;

    for block in &target.blocks {
        writer.write_all(&encode_weak(block.weak, target.weak_bytes))?;
        writer.write_all(&block.strong_prefix)?;
    }
    Ok(())
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::choose_widths;
    use checksums::strong::{Sha1, StrongDigest};

    fn sample_target() -> TargetDescription {
        let length = 3000u64;
        let blocksize = 1024u32;
        let widths = choose_widths(length, blocksize);
        let block_count = length.div_ceil(u64::from(blocksize)) as u32;

        let blocks = (0..block_count)
            .map(|id| {
                let digest = Sha1::digest(format!("block-{id}").as_bytes());
                BlockRecord {
                    id,
                    weak: 0x1234_5678 + id,
                    strong_prefix: digest[..usize::from(widths.strong_bytes)].to_vec(),
                }
            })
            .collect();

        TargetDescription {
            blocksize,
            length,
            seq_matches: widths.k,
            weak_bytes: widths.weak_bytes,
            strong_bytes: widths.strong_bytes,
            strong_algorithm: StrongAlgorithm::Sha1,
            whole_file_sha1: Some([0xabu8; 20]),
            urls: vec!["http://example.invalid/target.bin".to_string()],
            filename: Some("target.bin".to_string()),
            mtime: Some(1_153_857_737),
            blocks,
        }
    }

    #[test]
    fn round_trips_headers_and_checksum_table() {
        let target = sample_target();
        let mut buf = Vec::new();
        emit(&mut buf, &target).unwrap();

        let parsed = parse(io::Cursor::new(buf)).unwrap();
        assert_eq!(parsed.length, target.length);
        assert_eq!(parsed.blocksize, target.blocksize);
        assert_eq!(parsed.seq_matches, target.seq_matches);
        assert_eq!(parsed.weak_bytes, target.weak_bytes);
        assert_eq!(parsed.strong_bytes, target.strong_bytes);
        assert_eq!(parsed.urls, target.urls);
        assert_eq!(parsed.filename, target.filename);
        assert_eq!(parsed.whole_file_sha1, target.whole_file_sha1);
        assert_eq!(parsed.blocks.len(), target.blocks.len());
        let mask: u32 = if target.weak_bytes >= 4 {
            0xffff_ffff
        } else {
            (1u32 << (8 * u32::from(target.weak_bytes))) - 1
        };
        for (got, want) in parsed.blocks.iter().zip(target.blocks.iter()) {
            assert_eq!(got.strong_prefix, want.strong_prefix);
            assert_eq!(got.weak & mask, want.weak & mask);
        }
    }

    #[test]
    fn incompatible_version_is_rejected() {
        let control = "zsync: 0.0.4\nLength: 10\nBlocksize: 1\nHash-Lengths: 1,2,4\nURL: http://x\n\n";
        let err = parse(io::Cursor::new(control.as_bytes())).unwrap_err();
        assert!(matches!(err, ControlError::IncompatibleVersion(_)));
    }

    #[test]
    fn unknown_header_aborts_unless_listed_in_safe() {
        let control = "zsync: 0.6.2\nLength: 10\nBlocksize: 1\nHash-Lengths: 1,2,4\nURL: http://x\nX-Custom: 1\n\n";
        let err = parse(io::Cursor::new(control.as_bytes())).unwrap_err();
        assert!(matches!(err, ControlError::UnknownKey(ref k) if k == "X-Custom"));
    }

    #[test]
    fn unknown_header_listed_in_safe_is_ignored() {
        let control = concat!(
            "zsync: 0.6.2\n",
            "Length: 0\n",
            "Blocksize: 1\n",
            "Hash-Lengths: 1,2,4\n",
            "URL: http://x\n",
            "Safe: X-Custom\n",
            "X-Custom: 1\n",
            "\n",
        );
        let parsed = parse(io::Cursor::new(control.as_bytes())).unwrap();
        assert_eq!(parsed.length, 0);
    }

    #[test]
    fn truncated_checksum_table_is_an_error() {
        let control = "zsync: 0.6.2\nLength: 10000\nBlocksize: 1024\nHash-Lengths: 1,2,4\nURL: http://x\n\n\x01\x02";
        let err = parse(io::Cursor::new(control.as_bytes())).unwrap_err();
        assert!(matches!(err, ControlError::TruncatedChecksumTable { .. }));
    }

    #[test]
    fn bad_hash_lengths_are_rejected() {
        let control = "zsync: 0.6.2\nLength: 10\nBlocksize: 1\nHash-Lengths: 3,4,16\nURL: http://x\n\n";
        let err = parse(io::Cursor::new(control.as_bytes())).unwrap_err();
        assert!(matches!(err, ControlError::BadHashLengths { .. }));
    }

    #[test]
    fn weak_sum_wire_encoding_keeps_trailing_bytes() {
        assert_eq!(encode_weak(0x1234_5678, 4), vec![0x12, 0x34, 0x56, 0x78]);
        assert_eq!(encode_weak(0x1234_5678, 2), vec![0x56, 0x78]);
        assert_eq!(decode_weak(&[0x56, 0x78]), 0x0000_5678);
    }
}
