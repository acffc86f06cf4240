use crate::person::Person;
use thiserror::Error;

/// Fixed column order of the persisted document
pub const CSV_HEADER: [&str; 3] = ["name", "age", "height"];

/// Errors that can occur while encoding or decoding the CSV document
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write CSV: {0}")]
    Io(#[from] std::io::Error),

    #[error("document is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Parse a header-first CSV document into records
///
/// Empty input decodes to an empty sequence, so an absent object and an
/// empty document are indistinguishable to callers.
pub fn decode(bytes: &[u8]) -> Result<Vec<Person>, CodecError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }

    Ok(records)
}

/// Serialize records to CSV text
///
/// The header line is always emitted, even for an empty sequence.
pub fn encode(records: &[Person]) -> Result<String, CodecError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CodecError::Io(e.into_error()))?;

    Ok(String::from_utf8(bytes)?)
}
