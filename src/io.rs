use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use hashbrown::HashMap;
use serde_derive::Deserialize;
use tracing::debug;

use crate::dataset::DatasetError;

pub type RawId = String;
pub type InnerId = u32;
pub type Rating = f64;
pub type Timestamp = i64;

/// One line of a ratings file: `user item rating [timestamp]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRating {
    pub user: RawId,
    pub item: RawId,
    pub rating: Rating,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
}

impl RawRating {
    pub fn new(user: &str, item: &str, rating: Rating) -> Self {
        RawRating {
            user: user.to_string(),
            item: item.to_string(),
            rating,
            timestamp: None,
        }
    }
}

pub fn read_ratings<P: AsRef<Path>>(
    ratings_path: P,
    separator: u8,
    has_header: bool,
) -> Result<Vec<RawRating>, DatasetError> {
    let file = File::open(ratings_path.as_ref())?;
    parse_ratings(BufReader::new(file), separator, has_header)
}

pub fn parse_ratings<R: Read>(
    reader: R,
    separator: u8,
    has_header: bool,
) -> Result<Vec<RawRating>, DatasetError> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(separator)
        .has_headers(has_header)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut ratings = Vec::new();
    let mut record = StringRecord::new();
    while csv_reader.read_record(&mut record)? {
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        if record.len() < 3 {
            return Err(DatasetError::Parse {
                line,
                reason: format!("expected at least 3 fields, found {}", record.len()),
            });
        }
        // Positional deserialization; columns after the timestamp are ignored and an
        // unparseable timestamp column falls back to a rating without one.
        let leading = |qty: usize| StringRecord::from(record.iter().take(qty).collect::<Vec<_>>());
        let rating: RawRating = leading(4)
            .deserialize(None)
            .or_else(|_| leading(3).deserialize(None))
            .map_err(|e| DatasetError::Parse {
                line,
                reason: e.to_string(),
            })?;
        ratings.push(rating);
    }
    debug!(qty_ratings = ratings.len(), "parsed ratings");
    Ok(ratings)
}

/// Reads a `|`-separated item catalog (id, title, ...) encoded as ISO-8859-1.
pub fn read_item_names<P: AsRef<Path>>(
    item_names_path: P,
) -> Result<HashMap<RawId, String>, DatasetError> {
    let file = File::open(item_names_path.as_ref())?;
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(BufReader::new(file));

    let latin1 = |bytes: &[u8]| bytes.iter().map(|&b| b as char).collect::<String>();

    let mut names = HashMap::new();
    for result in csv_reader.byte_records() {
        let record = result?;
        if let (Some(id), Some(title)) = (record.get(0), record.get(1)) {
            names.insert(latin1(id), latin1(title));
        }
    }
    Ok(names)
}

#[cfg(test)]
mod io_test {
    use super::*;

    #[test]
    fn should_parse_tab_separated_ratings() {
        let data = "196\t242\t3\t881250949\n186\t302\t3\t891717742\n22\t377\t1\t878887116\n";
        let ratings = parse_ratings(data.as_bytes(), b'\t', false).unwrap();
        assert_eq!(3, ratings.len());
        assert_eq!("196", ratings[0].user);
        assert_eq!("242", ratings[0].item);
        assert_eq!(3.0, ratings[0].rating);
        assert_eq!(Some(881250949), ratings[0].timestamp);
    }

    #[test]
    fn should_parse_ratings_without_timestamp_and_skip_header() {
        let data = "userId,movieId,rating\n1,31,2.5\n1,1029,3.0\n";
        let ratings = parse_ratings(data.as_bytes(), b',', true).unwrap();
        assert_eq!(2, ratings.len());
        assert_eq!("1029", ratings[1].item);
        assert_eq!(None, ratings[1].timestamp);
    }

    #[test]
    fn should_report_line_of_malformed_rating() {
        let data = "1\t2\t4\n1\t3\tgood\n";
        match parse_ratings(data.as_bytes(), b'\t', false) {
            Err(DatasetError::Parse { line, .. }) => assert_eq!(2, line),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn should_reject_short_records() {
        let data = "1\t2\n";
        assert!(matches!(
            parse_ratings(data.as_bytes(), b'\t', false),
            Err(DatasetError::Parse { .. })
        ));
    }
}
