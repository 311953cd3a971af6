use std::fs;
use std::path::{Path,PathBuf};
use thiserror::Error;
use tracing::{debug,info,warn};

use crate::point_cloud::{Point,PointCloud,LoadReport};
use crate::{Float,MAX_RAW_INTENSITY};

/// 1-indexed line holding the declared number of points as its last token.
pub const POINT_COUNT_LINE: usize = 10;
/// 1-indexed line holding the data encoding declaration.
pub const DATA_ENCODING_LINE: usize = 11;
/// 1-indexed line of the first point record.
pub const FIRST_DATA_LINE: usize = 12;

const FIELDS_PER_RECORD: usize = 4;
const NAN_TOKEN: &str = "nan";
const DATA_KEYWORD: &str = "DATA";
const ASCII_ENCODING: &str = "ascii";

#[derive(Debug,Error)]
pub enum FormatError {
    #[error("failed to read point cloud {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error
    },
    #[error("point cloud header is missing: expected at least {expected} lines, found {found}")]
    MissingHeader { expected: usize, found: usize },
    #[error("malformed header on line {line}: {content:?}")]
    MalformedHeader { line: usize, content: String },
    #[error("unsupported data encoding {0:?}, only ascii records can be read")]
    UnsupportedEncoding(String),
    #[error("line {line} has {found} fields, expected {}", FIELDS_PER_RECORD)]
    ShortRecord { line: usize, found: usize },
    #[error("line {line}: cannot parse {token:?} as a number")]
    InvalidNumber { line: usize, token: String }
}

#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_point_cloud(path: &Path) -> Result<(PointCloud, LoadReport), FormatError> {
    let contents = fs::read_to_string(path).map_err(|source| FormatError::Io{path: path.to_path_buf(), source})?;
    let (cloud, report) = parse_point_cloud(&contents)?;

    info!("origin points: {}, valid points: {}, invalid points: {}", report.declared, report.valid, report.dropped);
    if !report.is_consistent() {
        warn!("header declares {} points but {} records were read", report.declared, report.valid + report.dropped);
    }

    Ok((cloud, report))
}

/**
 * Parses the ascii point record format. Records with a `nan` field are sensor
 * dropouts and are skipped, everything else that does not parse is an error.
 */
pub fn parse_point_cloud(contents: &str) -> Result<(PointCloud, LoadReport), FormatError> {
    let lines = contents.lines().collect::<Vec<&str>>();
    if lines.len() < POINT_COUNT_LINE {
        return Err(FormatError::MissingHeader{expected: POINT_COUNT_LINE, found: lines.len()});
    }

    let declared = parse_declared_count(lines[POINT_COUNT_LINE-1])?;
    if let Some(encoding_line) = lines.get(DATA_ENCODING_LINE-1) {
        check_encoding(encoding_line)?;
    }

    let record_lines = lines.len().saturating_sub(FIRST_DATA_LINE-1);
    let mut points = Vec::<Point>::with_capacity(declared.min(record_lines));
    let mut dropped = 0;

    for (idx, line) in lines.iter().enumerate().skip(FIRST_DATA_LINE-1) {
        let line_number = idx+1;
        let fields = line.split_whitespace().collect::<Vec<&str>>();
        match fields.len() {
            0 => continue,
            n if n < FIELDS_PER_RECORD => return Err(FormatError::ShortRecord{line: line_number, found: n}),
            _ => ()
        };

        match parse_record(&fields[..FIELDS_PER_RECORD], line_number)? {
            Some(point) => points.push(point),
            None => dropped += 1
        }
    }

    let report = LoadReport{declared, valid: points.len(), dropped};
    debug!("parsed {:?}", report);
    Ok((PointCloud::new(points, declared), report))
}

fn parse_declared_count(line: &str) -> Result<usize, FormatError> {
    let malformed = || FormatError::MalformedHeader{line: POINT_COUNT_LINE, content: line.to_string()};
    let token = line.split_whitespace().last().ok_or_else(malformed)?;
    token.parse::<usize>().map_err(|_| malformed())
}

fn check_encoding(line: &str) -> Result<(), FormatError> {
    let tokens = line.split_whitespace().collect::<Vec<&str>>();
    match tokens.as_slice() {
        [keyword, encoding, ..] if *keyword == DATA_KEYWORD && !encoding.eq_ignore_ascii_case(ASCII_ENCODING) => Err(FormatError::UnsupportedEncoding(encoding.to_string())),
        [keyword] if *keyword == DATA_KEYWORD => Err(FormatError::MalformedHeader{line: DATA_ENCODING_LINE, content: line.to_string()}),
        _ => Ok(())
    }
}

fn parse_record(fields: &[&str], line_number: usize) -> Result<Option<Point>, FormatError> {
    if fields.iter().any(|f| f.eq_ignore_ascii_case(NAN_TOKEN)) {
        return Ok(None);
    }

    let mut values = [0.0 as Float; FIELDS_PER_RECORD];
    for (value, token) in values.iter_mut().zip(fields) {
        *value = token.parse::<Float>().map_err(|_| FormatError::InvalidNumber{line: line_number, token: token.to_string()})?;
    }

    if values.iter().any(|v| !v.is_finite()) {
        return Ok(None);
    }

    let [x, y, z, raw_intensity] = values;
    let intensity = (raw_intensity/MAX_RAW_INTENSITY).max(0.0).min(1.0);
    Ok(Some(Point::new(x, y, z, intensity)))
}
