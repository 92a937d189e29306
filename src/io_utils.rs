//! Stream plumbing shared by every command.
//!
//! - **stdin/stdout**: a missing path or `-` routes through the standard
//!   streams.
//! - **Encoding**: input fields are decoded and output is transcoded via
//!   `encoding_rs`, defaulting to UTF-8.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn describe_path(path: Option<&Path>) -> String {
    match path {
        Some(p) if !is_dash(p) => p.display().to_string(),
        _ => "stdin/stdout".to_string(),
    }
}

pub fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    match path {
        Some(p) if !is_dash(p) => Ok(Box::new(BufReader::new(
            File::open(p).with_context(|| format!("Opening input file {p:?}"))?,
        ))),
        _ => Ok(Box::new(io::stdin().lock())),
    }
}

pub fn open_output(path: Option<&Path>, encoding: &'static Encoding) -> Result<Box<dyn Write>> {
    let base: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(BufWriter::new(io::stdout())),
    };

    if encoding == UTF_8 {
        Ok(base)
    } else {
        Ok(Box::new(TranscodingWriter::new(base, encoding)))
    }
}

/// Decodes one field. Byte order marks are data here; only the start of the
/// stream may carry one (see [`decode_first_record`]).
pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

/// Decodes the first record of a stream, dropping a leading byte order mark
/// that matches `encoding`.
pub fn decode_first_record(
    record: &csv::ByteRecord,
    encoding: &'static Encoding,
) -> Result<Vec<String>> {
    record
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let field = match Encoding::for_bom(field) {
                Some((bom_encoding, len)) if idx == 0 && bom_encoding == encoding => &field[len..],
                _ => field,
            };
            decode_bytes(field, encoding)
        })
        .collect()
}

struct TranscodingWriter<W: Write> {
    inner: W,
    encoding: &'static Encoding,
    buffer: Vec<u8>,
}

impl<W: Write> TranscodingWriter<W> {
    fn new(inner: W, encoding: &'static Encoding) -> Self {
        Self {
            inner,
            encoding,
            buffer: Vec::new(),
        }
    }

    // Writes every complete UTF-8 sequence in the buffer, keeping a trailing
    // partial sequence for the next call unless `force` is set.
    fn flush_buffer(&mut self, force: bool) -> io::Result<()> {
        let valid_up_to = match std::str::from_utf8(&self.buffer) {
            Ok(_) => self.buffer.len(),
            Err(err) => {
                if let Some(error_len) = err.error_len() {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("Invalid UTF-8 sequence in output stream ({error_len} bytes)"),
                    ));
                }
                err.valid_up_to()
            }
        };

        if valid_up_to > 0 {
            let text = String::from_utf8(self.buffer[..valid_up_to].to_vec())
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            self.encode_and_write(&text)?;
            self.buffer.drain(..valid_up_to);
        }

        if force && !self.buffer.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Incomplete UTF-8 sequence at end of output stream",
            ));
        }
        Ok(())
    }

    fn encode_and_write(&mut self, text: &str) -> io::Result<()> {
        let (encoded, _output_encoding, had_errors) = self.encoding.encode(text);
        if had_errors {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Failed to encode text using {}", self.encoding.name()),
            ));
        }
        self.inner.write_all(encoded.as_ref())
    }
}

impl<W: Write> Write for TranscodingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        self.flush_buffer(false)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_buffer(true)?;
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;

    #[test]
    fn resolve_encoding_defaults_to_utf8() {
        assert_eq!(resolve_encoding(None).unwrap(), UTF_8);
        assert_eq!(resolve_encoding(Some(" latin1 ")).unwrap(), WINDOWS_1252);
        assert!(resolve_encoding(Some("klingon")).is_err());
    }

    #[test]
    fn transcoding_writer_handles_split_sequences() {
        let mut out = Vec::new();
        {
            let mut writer = TranscodingWriter::new(&mut out, WINDOWS_1252);
            let bytes = "café".as_bytes();
            writer.write_all(&bytes[..4]).unwrap();
            writer.write_all(&bytes[4..]).unwrap();
            writer.flush().unwrap();
        }
        assert_eq!(out, vec![b'c', b'a', b'f', 0xE9]);
    }

    #[test]
    fn decode_record_uses_encoding() {
        let record = csv::ByteRecord::from(vec![&b"caf\xe9"[..], &b"x"[..]]);
        let decoded = decode_record(&record, WINDOWS_1252).unwrap();
        assert_eq!(decoded, vec!["café".to_string(), "x".to_string()]);
        assert!(decode_record(&record, UTF_8).is_err());
    }

    #[test]
    fn decode_record_keeps_bom_bytes_inside_fields() {
        let record = csv::ByteRecord::from(vec![&b"\xff\xfeab"[..]]);
        let decoded = decode_record(&record, WINDOWS_1252).unwrap();
        assert_eq!(decoded, vec!["\u{ff}\u{fe}ab".to_string()]);

        let record = csv::ByteRecord::from(vec![&b"x"[..], &b"\xef\xbb\xbfv"[..]]);
        let decoded = decode_record(&record, UTF_8).unwrap();
        assert_eq!(decoded, vec!["x".to_string(), "\u{feff}v".to_string()]);
    }

    #[test]
    fn decode_first_record_strips_leading_bom_only() {
        let record = csv::ByteRecord::from(vec![&b"\xef\xbb\xbfid"[..], &b"\xef\xbb\xbfname"[..]]);
        let decoded = decode_first_record(&record, UTF_8).unwrap();
        assert_eq!(decoded, vec!["id".to_string(), "\u{feff}name".to_string()]);

        let record = csv::ByteRecord::from(vec![&b"\xff\xfeid"[..]]);
        let decoded = decode_first_record(&record, WINDOWS_1252).unwrap();
        assert_eq!(decoded, vec!["\u{ff}\u{fe}id".to_string()]);
    }
}
