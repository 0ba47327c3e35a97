//! Result output for the command line.
//!
//! A full distribution is written as one JSON object (label → probability, in
//! vocabulary order); a dominant label is written as a bare line of text.

use serde::Serialize;
use std::io::{self, Write};

use crate::types::ClassificationResult;

/// Serializes results to an underlying writer, one result per line.
pub struct OutputWriter<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> OutputWriter<W> {
    /// `pretty` only affects JSON output.
    pub fn new(writer: W, pretty: bool) -> Self {
        Self { writer, pretty }
    }

    /// Write any serializable item as JSON followed by a newline.
    pub fn write_json<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, item).map_err(io::Error::other)?;
        } else {
            serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
        }
        writeln!(self.writer)
    }

    /// Write a classification result.
    pub fn write_result(&mut self, result: &ClassificationResult) -> io::Result<()> {
        match result {
            ClassificationResult::Distribution(distribution) => self.write_json(distribution),
            ClassificationResult::Dominant(label) => writeln!(self.writer, "{label}"),
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Serialize an item to a JSON string.
pub fn to_json<T: Serialize>(item: &T, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(item)
    } else {
        serde_json::to_string(item)
    }
}
