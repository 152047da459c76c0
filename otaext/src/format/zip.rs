// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

use std::{
    collections::{BTreeMap, BTreeSet},
    io::{self, Read, Seek, Write},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;
use zip::{
    CompressionMethod, DateTime, ZipArchive, ZipWriter,
    result::ZipError,
    write::SimpleFileOptions,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Entry not found in archive: {0}")]
    EntryNotFound(String),
    #[error("Failed to read archive entry: {0}")]
    ReadEntry(String, #[source] io::Error),
    #[error("Failed to write archive entry: {0}")]
    WriteEntry(String, #[source] io::Error),
    #[error("Zip error")]
    Zip(#[from] ZipError),
}

type Result<T> = std::result::Result<T, Error>;

/// Read access to the named entries of an archive. Lookups are exact string
/// comparisons against the entry names. No normalization is performed.
pub trait EntryReader {
    fn entry_exists(&self, path: &str) -> bool;

    fn read_entry(&mut self, path: &str) -> Result<Vec<u8>>;
}

/// Append-only write access to an archive under construction.
pub trait EntryWriter {
    fn write_entry(&mut self, name: &str, data: &[u8]) -> Result<()>;
}

impl EntryReader for BTreeMap<String, Vec<u8>> {
    fn entry_exists(&self, path: &str) -> bool {
        self.contains_key(path)
    }

    fn read_entry(&mut self, path: &str) -> Result<Vec<u8>> {
        self.get(path)
            .cloned()
            .ok_or_else(|| Error::EntryNotFound(path.to_owned()))
    }
}

impl EntryWriter for BTreeMap<String, Vec<u8>> {
    fn write_entry(&mut self, name: &str, data: &[u8]) -> Result<()> {
        self.insert(name.to_owned(), data.to_vec());
        Ok(())
    }
}

/// A read-only view of an OTA zip. The set of entry names is captured when
/// the archive is opened.
pub struct SourceArchive<R> {
    archive: ZipArchive<R>,
    names: BTreeSet<String>,
}

impl<R: Read + Seek> SourceArchive<R> {
    pub fn new(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;
        let names = archive
            .file_names()
            .map(|n| n.to_owned())
            .collect::<BTreeSet<_>>();

        trace!("Opened archive with {} entries", names.len());

        Ok(Self { archive, names })
    }

    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|n| n.as_str())
    }
}

impl<R: Read + Seek> EntryReader for SourceArchive<R> {
    fn entry_exists(&self, path: &str) -> bool {
        self.names.contains(path)
    }

    fn read_entry(&mut self, path: &str) -> Result<Vec<u8>> {
        if !self.entry_exists(path) {
            return Err(Error::EntryNotFound(path.to_owned()));
        }

        let mut file = match self.archive.by_name(path) {
            Ok(f) => f,
            Err(ZipError::FileNotFound) => return Err(Error::EntryNotFound(path.to_owned())),
            Err(e) => return Err(e.into()),
        };

        let mut data = vec![];
        file.read_to_end(&mut data)
            .map_err(|e| Error::ReadEntry(path.to_owned(), e))?;

        Ok(data)
    }
}

/// Compression method used for entries added to the output archive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryCompression {
    Stored,
    #[default]
    Deflated,
}

impl From<EntryCompression> for CompressionMethod {
    fn from(value: EntryCompression) -> Self {
        match value {
            EntryCompression::Stored => Self::Stored,
            EntryCompression::Deflated => Self::Deflated,
        }
    }
}

/// A write-only zip that receives the entries staged by the install-end
/// phase. The data is unusable until [`Self::finish()`] is called.
pub struct OutputArchive<W: Write + Seek> {
    writer: ZipWriter<W>,
    options: SimpleFileOptions,
    names: Vec<String>,
}

impl<W: Write + Seek> OutputArchive<W> {
    pub fn new(inner: W, compression: EntryCompression) -> Self {
        // Fixed timestamps keep the output reproducible for identical inputs.
        let options = SimpleFileOptions::default()
            .last_modified_time(DateTime::default())
            .compression_method(compression.into());

        Self {
            writer: ZipWriter::new(inner),
            options,
            names: vec![],
        }
    }

    /// Names of the entries written so far, in write order.
    pub fn entry_names(&self) -> &[String] {
        &self.names
    }

    pub fn finish(self) -> Result<W> {
        Ok(self.writer.finish()?)
    }
}

impl<W: Write + Seek> EntryWriter for OutputArchive<W> {
    fn write_entry(&mut self, name: &str, data: &[u8]) -> Result<()> {
        self.writer.start_file(name, self.options)?;
        self.writer
            .write_all(data)
            .map_err(|e| Error::WriteEntry(name.to_owned(), e))?;
        self.names.push(name.to_owned());

        trace!("Wrote {} byte entry: {name}", data.len());

        Ok(())
    }
}
