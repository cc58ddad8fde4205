//! Parser for the per-station daily CSV feed (`csv/by_station/{id}.csv`).
//!
//! Rows look like `"USW00094728","20200101","TMAX","56","","","W","2400"`:
//! station id, date, element, value in tenths, then flag columns we ignore.
//! Only TMIN/TMAX rows with a valid date and a non-missing integer value are
//! kept. Every other row is skipped and counted in [`IngestStats`].
//!
//! Records are read as raw bytes so a row that is not valid UTF-8 is skipped
//! like any other malformed row instead of failing the whole feed.

use std::io;

use chrono::NaiveDate;
use csv::ByteRecord;

use crate::domain::{Element, MISSING_VALUE, RawObservation};

const DATE_FORMAT: &str = "%Y%m%d";

/// Why a data row was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Fewer than four columns
    ShortRow,
    /// Row is not valid UTF-8
    BadEncoding,
    /// The CSV reader could not frame the row
    Malformed,
    /// Element other than TMIN/TMAX
    OtherElement,
    /// Date not in `YYYYMMDD` form
    BadDate,
    /// Value is not an integer
    BadValue,
    /// Value is the missing-data sentinel
    MissingValue,
}

/// Row counts for one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Data rows seen (header and blank lines excluded)
    pub rows_read: usize,
    pub short_rows: usize,
    pub bad_encoding: usize,
    pub malformed_rows: usize,
    pub other_elements: usize,
    pub bad_dates: usize,
    pub bad_values: usize,
    pub missing_values: usize,
}

impl IngestStats {
    fn record(&mut self, reason: SkipReason) {
        let counter = match reason {
            SkipReason::ShortRow => &mut self.short_rows,
            SkipReason::BadEncoding => &mut self.bad_encoding,
            SkipReason::Malformed => &mut self.malformed_rows,
            SkipReason::OtherElement => &mut self.other_elements,
            SkipReason::BadDate => &mut self.bad_dates,
            SkipReason::BadValue => &mut self.bad_values,
            SkipReason::MissingValue => &mut self.missing_values,
        };
        *counter += 1;
    }

    /// Total rows dropped for any reason.
    pub fn skipped(&self) -> usize {
        self.short_rows
            + self.bad_encoding
            + self.malformed_rows
            + self.other_elements
            + self.bad_dates
            + self.bad_values
            + self.missing_values
    }
}

/// Observations from one feed plus the row counts.
#[derive(Debug, Clone, Default)]
pub struct ParsedObservations {
    pub observations: Vec<RawObservation>,
    pub stats: IngestStats,
}

/// Accumulates observations one CSV record at a time.
#[derive(Debug, Default)]
pub struct ObservationParser {
    parsed: ParsedObservations,
}

impl ObservationParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one data record (the header must already be stripped).
    pub fn push_record(&mut self, record: &ByteRecord) {
        self.parsed.stats.rows_read += 1;
        match parse_record(record) {
            Ok(observation) => self.parsed.observations.push(observation),
            Err(reason) => self.parsed.stats.record(reason),
        }
    }

    /// Count a row that never made it to a record.
    pub fn skip(&mut self, reason: SkipReason) {
        self.parsed.stats.rows_read += 1;
        self.parsed.stats.record(reason);
    }

    pub fn finish(self) -> ParsedObservations {
        self.parsed
    }
}

/// Read a whole feed from `reader`.
///
/// Only I/O failures are errors. The first record is the header; rows may
/// have any number of columns, and quoted fields may span lines.
pub fn read_observations<R: io::Read>(reader: R) -> io::Result<ParsedObservations> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut parser = ObservationParser::new();
    let mut record = ByteRecord::new();
    loop {
        match csv.read_byte_record(&mut record) {
            Ok(true) => parser.push_record(&record),
            Ok(false) => break,
            Err(err) => match err.into_kind() {
                csv::ErrorKind::Io(source) => return Err(source),
                _ => parser.skip(SkipReason::Malformed),
            },
        }
    }

    Ok(parser.finish())
}

/// Turn one data record into an observation.
pub fn parse_record(record: &ByteRecord) -> Result<RawObservation, SkipReason> {
    if record.len() < 4 {
        return Err(SkipReason::ShortRow);
    }
    if std::str::from_utf8(record.as_slice()).is_err() {
        return Err(SkipReason::BadEncoding);
    }
    let text = |i: usize| std::str::from_utf8(&record[i]).map_err(|_| SkipReason::BadEncoding);

    let element = Element::from_code(text(2)?).ok_or(SkipReason::OtherElement)?;
    let date = NaiveDate::parse_from_str(text(1)?, DATE_FORMAT).map_err(|_| SkipReason::BadDate)?;
    let value: i32 = text(3)?.parse().map_err(|_| SkipReason::BadValue)?;
    if value == MISSING_VALUE {
        return Err(SkipReason::MissingValue);
    }

    Ok(RawObservation::new(date, element, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "ID,DATE,ELEMENT,DATA_VALUE,M_FLAG,Q_FLAG,S_FLAG,OBS_TIME";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn parse(bytes: &[u8]) -> ParsedObservations {
        read_observations(bytes).unwrap()
    }

    #[test]
    fn parses_quoted_and_bare_rows() {
        let text = format!(
            "{HEADER}\n\
             \"USW00094728\",\"20200101\",\"TMAX\",\"56\",\"\",\"\",\"W\",\"2400\"\n\
             USW00094728,20200101,TMIN,-17,,,W,2400\n"
        );
        let parsed = parse(text.as_bytes());

        assert_eq!(
            parsed.observations,
            vec![
                RawObservation::new(date(2020, 1, 1), Element::MaxTemperature, 56),
                RawObservation::new(date(2020, 1, 1), Element::MinTemperature, -17),
            ]
        );
        assert_eq!(parsed.stats.rows_read, 2);
        assert_eq!(parsed.stats.skipped(), 0);
    }

    #[test]
    fn quoted_field_may_span_lines() {
        let text = format!(
            "{HEADER}\n\
             X,20200101,TMAX,10,\"note\nstill the same row\",,W,\n\
             X,20200102,TMAX,20,,,W,\n"
        );
        let parsed = parse(text.as_bytes());

        assert_eq!(parsed.observations.len(), 2);
        assert_eq!(parsed.stats.rows_read, 2);
        assert_eq!(parsed.stats.skipped(), 0);
    }

    #[test]
    fn header_row_is_skipped_even_if_it_looks_like_data() {
        let parsed = parse(b"X,20200101,TMAX,10\nX,20200102,TMAX,20\n");
        assert_eq!(parsed.observations.len(), 1);
        assert_eq!(parsed.observations[0].value, 20);
    }

    #[test]
    fn keeps_only_temperature_elements() {
        let text = format!(
            "{HEADER}\n\
             X,20200101,PRCP,5\n\
             X,20200101,SNOW,0\n\
             X,20200101,TMAX,100\n"
        );
        let parsed = parse(text.as_bytes());
        assert_eq!(parsed.observations.len(), 1);
        assert_eq!(parsed.observations[0].element, Element::MaxTemperature);
        assert_eq!(parsed.stats.other_elements, 2);
    }

    #[test]
    fn missing_sentinel_is_skipped() {
        let text = format!("{HEADER}\nX,20200101,TMIN,-9999\nX,20200102,TMIN,100\n");
        let parsed = parse(text.as_bytes());
        assert_eq!(parsed.observations.len(), 1);
        assert!(parsed.observations.iter().all(|o| !o.is_missing()));
        assert_eq!(parsed.stats.missing_values, 1);
    }

    #[test]
    fn malformed_rows_are_counted_not_fatal() {
        let text = format!(
            "{HEADER}\n\
             X,2020-01-01,TMAX,10\n\
             X,20201345,TMAX,10\n\
             X,20200101,TMAX,ten\n\
             X,20200101,TMAX,1.5\n\
             X,20200101\n\
             X,20200102,TMAX,30\n"
        );
        let parsed = parse(text.as_bytes());

        assert_eq!(parsed.observations.len(), 1);
        assert_eq!(parsed.observations[0].value, 30);
        assert_eq!(
            parsed.stats,
            IngestStats {
                rows_read: 6,
                short_rows: 1,
                bad_dates: 2,
                bad_values: 2,
                ..IngestStats::default()
            }
        );
    }

    #[test]
    fn invalid_utf8_row_is_skipped() {
        let mut body = b"ID,DATE,ELEMENT,DATA_VALUE\nX,20200101,TMAX,100\n".to_vec();
        body.extend_from_slice(b"X,20200102,TMAX,50,\xff\xfe\n");
        body.extend_from_slice(b"X,20200103,TMAX,200\n");

        let parsed = parse(&body);

        let values: Vec<i32> = parsed.observations.iter().map(|o| o.value).collect();
        assert_eq!(values, vec![100, 200]);
        assert_eq!(parsed.stats.bad_encoding, 1);
        assert_eq!(parsed.stats.rows_read, 3);
    }

    #[test]
    fn empty_and_header_only_feeds_yield_nothing() {
        assert!(parse(b"").observations.is_empty());
        let parsed = parse(HEADER.as_bytes());
        assert!(parsed.observations.is_empty());
        assert_eq!(parsed.stats.rows_read, 0);
    }

    #[test]
    fn blank_lines_are_ignored() {
        let text = format!("{HEADER}\n\nX,20200101,TMAX,10\n\n");
        let parsed = parse(text.as_bytes());
        assert_eq!(parsed.observations.len(), 1);
        assert_eq!(parsed.stats.rows_read, 1);
    }

    #[test]
    fn handles_crlf_line_endings() {
        let text = format!("{HEADER}\r\nX,19991231,TMIN,-5\r\n");
        let parsed = parse(text.as_bytes());
        assert_eq!(
            parsed.observations,
            vec![RawObservation::new(date(1999, 12, 31), Element::MinTemperature, -5)]
        );
    }

    #[test]
    fn io_errors_are_reported() {
        struct Failing;
        impl io::Read for Failing {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("connection reset"))
            }
        }

        let err = read_observations(Failing).unwrap_err();
        assert_eq!(err.to_string(), "connection reset");
    }
}
