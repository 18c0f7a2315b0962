use crate::core::sequence::{Chunk, ChunkHeader, ChunkHeaderError, ChunkLayout, ChunkSet, SequenceRecord};
use noodles_fasta::record::{Definition, Sequence};
use noodles_fasta::{self as fasta, Record};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Default number of residues per sequence line.
pub const DEFAULT_LINE_WIDTH: usize = 80;

#[derive(Debug, Error)]
pub enum FastaError {
    #[error("I/O error: {0}")]
    Io(io::Error),
    #[error("Malformed FASTA record: {0}")]
    InvalidRecord(io::Error),
    #[error("Record identifier is not valid UTF-8")]
    InvalidIdentifier,
    #[error("Record '{id}' has non-ASCII symbol '{symbol}' at residue {position}")]
    NonAsciiResidue {
        id: String,
        position: usize,
        symbol: char,
    },
    #[error("Invalid chunk record: {0}")]
    Chunk(#[from] ChunkHeaderError),
    #[error("Line width must be positive")]
    ZeroLineWidth,
}

impl From<io::Error> for FastaError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::InvalidData => FastaError::InvalidRecord(e),
            _ => FastaError::Io(e),
        }
    }
}

fn record_id(record: &Record) -> Result<String, FastaError> {
    let name = std::str::from_utf8(record.name()).map_err(|_| FastaError::InvalidIdentifier)?;
    match record.description() {
        Some(description) => {
            let description =
                std::str::from_utf8(description).map_err(|_| FastaError::InvalidIdentifier)?;
            Ok(format!("{} {}", name, description.trim()).trim_end().to_string())
        }
        None => Ok(name.to_string()),
    }
}

fn to_sequence_record(record: &Record) -> Result<SequenceRecord, FastaError> {
    let id = record_id(record)?;
    let residues = String::from_utf8_lossy(record.sequence().as_ref());
    let sequence = SequenceRecord::new(id, &residues);
    if let Some((position, symbol)) = sequence.first_non_ascii() {
        return Err(FastaError::NonAsciiResidue {
            id: sequence.id,
            position,
            symbol,
        });
    }
    Ok(sequence)
}

/// Reads every record of a FASTA stream.
///
/// The identifier is the full definition line after `>`. Whitespace inside the
/// sequence is dropped. When an identifier repeats, the later record replaces
/// the earlier one in place and a warning is logged.
pub fn read_records(reader: &mut impl BufRead) -> Result<Vec<SequenceRecord>, FastaError> {
    let mut fa_in = fasta::io::Reader::new(reader);
    let mut records: Vec<SequenceRecord> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for result in fa_in.records() {
        let record = to_sequence_record(&result?)?;
        match positions.get(&record.id) {
            Some(&position) => {
                warn!(id = %record.id, "Duplicate sequence identifier; keeping the last record.");
                records[position] = record;
            }
            None => {
                positions.insert(record.id.clone(), records.len());
                records.push(record);
            }
        }
    }

    Ok(records)
}

pub fn read_records_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<SequenceRecord>, FastaError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    read_records(&mut reader)
}

/// Writes a chunk set as one FASTA record per chunk, wrapping residues at
/// `line_width`. Every chunk is followed by a blank line.
pub fn write_chunk_set(
    set: &ChunkSet,
    line_width: usize,
    writer: &mut impl Write,
) -> Result<(), FastaError> {
    if line_width == 0 {
        return Err(FastaError::ZeroLineWidth);
    }
    for (chunk, header) in set.chunks().iter().zip(set.headers()) {
        if let Some((position, symbol)) =
            chunk.residues.chars().enumerate().find(|(_, c)| !c.is_ascii())
        {
            return Err(FastaError::NonAsciiResidue {
                id: header.to_string(),
                position: position + 1,
                symbol,
            });
        }
        let definition = Definition::new(header.to_string(), None);
        let record = Record::new(definition, Sequence::from(chunk.residues.as_bytes().to_vec()));
        fasta::io::writer::Builder::default()
            .set_line_base_count(line_width)
            .build_from_writer(&mut *writer)
            .write_record(&record)?;
        writeln!(writer)?;
    }
    Ok(())
}

/// Writes `set` to `{dir}/{record_name}.fa` and returns the path written.
pub fn write_chunk_set_to_dir<P: AsRef<Path>>(
    set: &ChunkSet,
    line_width: usize,
    dir: P,
) -> Result<std::path::PathBuf, FastaError> {
    let path = dir.as_ref().join(format!("{}.fa", set.record_name()));
    let file = File::create(&path)?;
    let mut writer = BufWriter::new(file);
    write_chunk_set(set, line_width, &mut writer)?;
    writer.flush()?;
    Ok(path)
}

/// Reads back a chunk file, recovering the chunk order from the headers.
pub fn read_chunk_set(reader: &mut impl BufRead) -> Result<ChunkSet, FastaError> {
    let records = read_records(reader)?;
    let mut layout = ChunkLayout::Whole;
    let mut chunks = Vec::with_capacity(records.len());

    for record in &records {
        let header: ChunkHeader = record.id.parse()?;
        if header.layout() == ChunkLayout::Segmented {
            layout = ChunkLayout::Segmented;
        }
        chunks.push(Chunk::from_header(&header, &record.residues)?);
    }

    Ok(ChunkSet::from_chunks(layout, chunks)?)
}
