use super::error::FormatError;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing one of the solver text formats.
///
/// Implementors handle format-specific parsing and serialization of a single
/// in-memory record type; the path helpers are shared.
pub trait TextFormat {
    /// The in-memory record a file of this format decodes to.
    type Record;

    /// Reads a record from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(reader: &mut impl BufRead) -> Result<Self::Record, FormatError>;

    /// Writes a record to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(record: &Self::Record, writer: &mut impl Write) -> Result<(), FormatError>;

    /// Reads a record from a file path.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self::Record, FormatError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes a record to a file path, creating or truncating the file.
    fn write_to_path<P: AsRef<Path>>(record: &Self::Record, path: P) -> Result<(), FormatError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(record, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
