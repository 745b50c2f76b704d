//! I/O helpers shared by the sampler, the persistence layer and the CLI.
//!
//! - **Encoding**: input files are transcoded to UTF-8 through
//!   `encoding_rs_io`, defaulting to UTF-8 (a BOM is honoured and stripped).
//! - **Line reading**: `read_line` tolerates `\r\n` endings and a trailing
//!   partial line.
//! - **CSV output**: preview rows are written with the `csv` writer to stdout
//!   or a file.

use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result as AnyResult, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};
use encoding_rs_io::{DecodeReaderBytes, DecodeReaderBytesBuilder};

use crate::error::{MapperError, Result};

pub type TextReader = BufReader<DecodeReaderBytes<File, Vec<u8>>>;

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> AnyResult<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

/// Opens `path` as a UTF-8 text stream decoded from `encoding`.
pub fn open_text_reader(path: &Path, encoding: &'static Encoding) -> Result<TextReader> {
    if !path.exists() {
        return Err(MapperError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|err| MapperError::io(path, err))?;
    let decoder = DecodeReaderBytesBuilder::new()
        .encoding(Some(encoding))
        .bom_override(true)
        .strip_bom(true)
        .build(file);
    Ok(BufReader::new(decoder))
}

/// Reads one line without its terminator. Returns `None` at end of input.
pub fn read_line<R: BufRead>(reader: &mut R, buf: &mut String) -> io::Result<Option<()>> {
    buf.clear();
    if reader.read_line(buf)? == 0 {
        return Ok(None);
    }
    while buf.ends_with(['\n', '\r']) {
        buf.pop();
    }
    Ok(Some(()))
}

pub fn open_csv_writer(path: Option<&Path>) -> AnyResult<csv::Writer<Box<dyn Write>>> {
    let base: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(io::stdout()),
    };
    let mut builder = csv::WriterBuilder::new();
    builder.quote_style(QuoteStyle::Necessary).double_quote(true);
    Ok(builder.from_writer(base))
}
