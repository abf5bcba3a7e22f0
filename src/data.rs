use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use getset::CopyGetters;
use log::{debug, info};

use crate::conversion::converter::{ConverterOptions, RowConverter};
use crate::conversion::members::MemberIndex;
use crate::conversion::record::{flight, Record};

pub const DELIMITER: u8 = b';';

/// Exports end every line with `;`, which shows up as a column without a name.
const BLANK_COLUMN: &str = "";
const BYTE_ORDER_MARK: char = '\u{feff}';

#[derive(Debug, Default, Clone, Copy, PartialEq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct ConversionStats {
    converted: usize,
    skipped: usize,
}

/// Decodes an export as UTF-8, falling back to ISO-8859-1 for older files.
pub fn decode(bytes: Vec<u8>) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().into_iter().map(char::from).collect(),
    };

    match text.strip_prefix(BYTE_ORDER_MARK) {
        Some(text) => text.to_string(),
        None => text,
    }
}

pub fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(decode(bytes))
}

fn csv_reader(text: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .flexible(true)
        .from_reader(text.as_bytes())
}

/// Flights of a vereinsflieger.de export in file order, each with its
/// 1-based data row number.
///
/// Rows too short to reach the registration column are skipped and counted.
pub struct FlightReader<'a> {
    headers: csv::StringRecord,
    records: csv::StringRecordsIntoIter<&'a [u8]>,
    row: u64,
    skipped: usize,
}

impl<'a> FlightReader<'a> {
    pub fn new(text: &'a str) -> Result<FlightReader<'a>> {
        let mut reader = csv_reader(text);
        let headers = reader.headers()?.clone();

        Ok(FlightReader {
            headers,
            records: reader.into_records(),
            row: 0,
            skipped: 0,
        })
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for FlightReader<'_> {
    type Item = Result<(u64, Record)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(err) => return Some(Err(err.into())),
            };
            self.row += 1;

            let mut fields: Record = self.headers.iter().zip(record.iter()).collect();
            fields.remove(BLANK_COLUMN);

            if !fields.contains(flight::REGISTRATION) {
                debug!("skipping row without registration, row={}", self.row);
                self.skipped += 1;
                continue;
            }

            return Some(Ok((self.row, fields)));
        }
    }
}

pub fn read_members(text: &str) -> Result<MemberIndex> {
    let mut reader = csv_reader(text);
    let mut index = MemberIndex::new();

    for record in reader.deserialize::<Record>() {
        let mut member = record?;
        member.remove(BLANK_COLUMN);
        index.insert(member)?;
    }

    debug!("loaded member index, members={}", index.len());

    Ok(index)
}

/// Converts every flight and writes one ameavia row per flight. Stops at the
/// first fault.
pub fn convert<W: Write>(
    flights: &mut FlightReader,
    members: Option<&MemberIndex>,
    converter: &RowConverter,
    output: W,
) -> Result<ConversionStats> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(output);
    let mut stats = ConversionStats::default();

    for flight in flights.by_ref() {
        let (row, flight) = flight?;
        let record = converter.convert(&flight, members).map_err(|err| err.at_row(row))?;
        csv_writer.write_record(&record)?;
        stats.converted += 1;
    }

    csv_writer.flush()?;
    stats.skipped = flights.skipped();

    info!("converted flights, converted={}, skipped={}", stats.converted, stats.skipped);

    Ok(stats)
}

/// Reads the flight export and optional membership export from disk and
/// writes the result to `output`, or standard output when none is given.
pub fn convert_files(
    input: &Path,
    members: Option<&Path>,
    output: Option<&Path>,
    options: &ConverterOptions,
) -> Result<ConversionStats> {
    let members = match members {
        Some(path) => {
            let text = read_text(path)?;
            Some(read_members(&text).with_context(|| format!("failed to load members from {}", path.display()))?)
        },
        None => None,
    };

    let text = read_text(input)?;
    let mut flights = FlightReader::new(&text)?;
    let converter = RowConverter::new(options);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        },
        None => Box::new(io::stdout().lock()),
    };

    convert(&mut flights, members.as_ref(), &converter, writer)
        .with_context(|| format!("failed to convert {}", input.display()))
}
