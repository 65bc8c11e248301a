//! Per-country school closure status, one row per country and day.
use std::fmt;
use std::io;
use std::str::FromStr;

use log::{debug, trace};

use serde::Serialize;

use enum_map::Enum;

use chrono::naive::NaiveDate;

use super::context::{Country, TimeBased, parse_closure_date, is_ascii_name};
use super::error::{Error, Result};
use super::ioutil::csv_reader;
use super::progress::{ProgressSink, StepMeter};


/// Closure file names which differ from the case files, mapped to the case
/// file spelling.
pub static CLOSURE_COUNTRY_NAMES_FIX: &[(&str, &str)] = &[
	("Bolivia (Plurinational State of)", "Bolivia"),
	("Brunei Darussalam", "Brunei"),
	("Central African republic", "Central African Republic"),
	("Congo", "Congo (Brazzaville)"),
	("Democratic Republic of the Congo", "Congo (Kinshasa)"),
	("Iran (Islamic Republic of)", "Iran"),
	("Republic of Korea", "Korea, South"),
	("Lao PDR", "Laos"),
	("Micronesia (Federated States of)", "Micronesia"),
	("Republic of Moldova", "Moldova"),
	("Russian Federation", "Russia"),
	("Syrian Arab Republic", "Syria"),
	("United Republic of Tanzania", "Tanzania"),
	("United States of America", "US"),
	("United Kingdom of Great Britain and Northern Ireland", "United Kingdom"),
	("Viet Nam", "Vietnam"),
];

/// Closure file countries without case data.
pub static CLOSURE_COUNTRIES_EXCLUDED: &[&str] = &[
	"Anguilla",
	"Aruba",
	"Bermuda",
	"British Virgin Islands",
	"Cayman Islands",
	"Cook Islands",
	"Democratic People's Republic of Korea",
	"Faroe Islands",
	"Gibraltar",
	"Greenland",
	"Montserrat",
	"Myanmar",
	"Nauru",
	"Niue",
	"Palestine",
	"Sint Marteen",
	"Svalbard",
	"Tokelau",
	"Turkmenistan",
	"Turks and Caicos Island",
	"Tuvalu",
];

static PROGRESS_INTERVAL: usize = 5000;

const DATE_COLUMN: usize = 0;
const COUNTRY_COLUMN: usize = 2;
const STATUS_COLUMN: usize = 3;


/// Variant order doubles as the tie-break order of majority votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Enum)]
pub enum ClosureStatus {
	Closed,
	PartiallyOpen,
	FullyOpen,
	AcademicBreak,
}

impl ClosureStatus {
	pub const ALL: [ClosureStatus; 4] = [
		Self::Closed,
		Self::PartiallyOpen,
		Self::FullyOpen,
		Self::AcademicBreak,
	];

	/// The phrase used by the closure file.
	pub fn phrase(&self) -> &'static str {
		match self {
			Self::Closed => "Closed due to COVID-19",
			Self::PartiallyOpen => "Partially open",
			Self::FullyOpen => "Fully open",
			Self::AcademicBreak => "Academic break",
		}
	}
}

impl fmt::Display for ClosureStatus {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.phrase())
	}
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseClosureStatusError(pub String);

impl fmt::Display for ParseClosureStatusError {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		write!(f, "unknown closure status {:?}", self.0)
	}
}

impl FromStr for ClosureStatus {
	type Err = ParseClosureStatusError;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		let s = s.trim();
		for status in Self::ALL.iter() {
			if status.phrase() == s {
				return Ok(*status)
			}
		}
		Err(ParseClosureStatusError(s.into()))
	}
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchoolClosureRecord {
	pub date: NaiveDate,
	/// `None` only for entries of the global series.
	pub country: Option<Country>,
	pub status: ClosureStatus,
}

impl SchoolClosureRecord {
	pub fn new(date: NaiveDate, country: Country, status: ClosureStatus) -> Self {
		Self{
			date,
			country: Some(country),
			status,
		}
	}

	pub fn global(date: NaiveDate, status: ClosureStatus) -> Self {
		Self{
			date,
			country: None,
			status,
		}
	}
}

impl TimeBased for SchoolClosureRecord {
	fn date(&self) -> NaiveDate {
		self.date
	}
}


pub fn is_excluded_closure_country(name: &str) -> bool {
	!is_ascii_name(name) || CLOSURE_COUNTRIES_EXCLUDED.iter().any(|v| *v == name)
}

/// Maps a closure file country name to the spelling of the case files.
pub fn fix_closure_country_name(name: &str) -> &str {
	for (from, to) in CLOSURE_COUNTRY_NAMES_FIX.iter() {
		if *from == name {
			return *to
		}
	}
	name
}

/// Reads the closure file. The exclusion list applies to the names as they
/// appear in the file, before renaming.
pub fn read_closures<R: io::Read, S: ProgressSink + ?Sized>(
		r: R,
		pm: &mut StepMeter<'_, S>,
) -> Result<Vec<SchoolClosureRecord>> {
	let mut r = csv_reader(r);
	let mut result = Vec::new();
	let mut skipped = 0;
	for (i, row) in r.records().enumerate() {
		let row = row?;
		let line = row.position().map(|p| p.line()).unwrap_or(i as u64 + 2);
		if row.len() <= STATUS_COLUMN {
			return Err(Error::ShortRow{
				line,
				expected: STATUS_COLUMN + 1,
				found: row.len(),
			})
		}

		let raw_name = &row[COUNTRY_COLUMN];
		if is_excluded_closure_country(raw_name) {
			trace!("skipping excluded closure country {:?} on line {}", raw_name, line);
			skipped += 1;
			continue
		}
		let name = fix_closure_country_name(raw_name);

		let date = match parse_closure_date(&row[DATE_COLUMN]) {
			Some(d) => d,
			None => return Err(Error::InvalidDate{
				line,
				value: row[DATE_COLUMN].into(),
			}),
		};
		let status = match row[STATUS_COLUMN].parse::<ClosureStatus>() {
			Ok(s) => s,
			Err(ParseClosureStatusError(value)) => return Err(Error::UnknownStatus{
				line,
				value,
			}),
		};
		result.push(SchoolClosureRecord::new(date, Country::new(name), status));

		if i % PROGRESS_INTERVAL == PROGRESS_INTERVAL - 1 {
			if let Some(pos) = row.position() {
				pm.update(pos.byte());
			}
		}
	}
	debug!("read {} closure records, skipped {} rows", result.len(), skipped);
	Ok(result)
}


#[cfg(test)]
mod tests {
	use super::*;

	use crate::progress::NullSink;

	fn read(data: &str) -> Result<Vec<SchoolClosureRecord>> {
		let mut sink = NullSink;
		let mut pm = StepMeter::new(&mut sink, "test", 0.0, 1.0, None);
		read_closures(data.as_bytes(), &mut pm)
	}

	#[test]
	fn status_phrases_round_trip() {
		for status in ClosureStatus::ALL.iter() {
			assert_eq!(status.phrase().parse::<ClosureStatus>(), Ok(*status));
		}
		assert_eq!("Closed".parse::<ClosureStatus>(), Err(ParseClosureStatusError("Closed".into())));
	}

	#[test]
	fn reads_rows_with_day_first_dates() {
		let data = "Date,ISO,Country,Status,Note\n\
			16/02/2020,AFG,Afghanistan,Fully open,\n\
			17/02/2020,AFG,Afghanistan,Closed due to COVID-19,\n\
			17/02/2020,ALB,Albania,Academic break,\n";
		let records = read(data).unwrap();
		assert_eq!(records, vec![
			SchoolClosureRecord::new(NaiveDate::from_ymd_opt(2020, 2, 16).unwrap(), Country::new("Afghanistan"), ClosureStatus::FullyOpen),
			SchoolClosureRecord::new(NaiveDate::from_ymd_opt(2020, 2, 17).unwrap(), Country::new("Afghanistan"), ClosureStatus::Closed),
			SchoolClosureRecord::new(NaiveDate::from_ymd_opt(2020, 2, 17).unwrap(), Country::new("Albania"), ClosureStatus::AcademicBreak),
		]);
	}

	#[test]
	fn renames_and_excludes_countries() {
		let data = "Date,ISO,Country,Status,Note\n\
			16/02/2020,RUS,Russian Federation,Fully open,\n\
			16/02/2020,GRL,Greenland,Fully open,\n\
			16/02/2020,CUW,Cura\u{e7}ao,Fully open,\n\
			16/02/2020,USA,United States of America,Partially open,\n";
		let records = read(data).unwrap();
		let names: Vec<&str> = records.iter().map(|r| r.country.as_ref().unwrap().name.as_str()).collect();
		assert_eq!(names, vec!["Russia", "US"]);
		assert_eq!(records[1].status, ClosureStatus::PartiallyOpen);
	}

	#[test]
	fn unknown_status_is_fatal() {
		let data = "Date,ISO,Country,Status,Note\n16/02/2020,AFG,Afghanistan,Open,\n";
		match read(data) {
			Err(Error::UnknownStatus{line, value}) => {
				assert_eq!(line, 2);
				assert_eq!(value, "Open");
			},
			other => panic!("unexpected result: {:?}", other),
		}
	}

	#[test]
	fn malformed_date_is_fatal() {
		let data = "Date,ISO,Country,Status,Note\n2020-02-16,AFG,Afghanistan,Fully open,\n";
		assert!(matches!(read(data), Err(Error::InvalidDate{line: 2, ..})));
	}

	#[test]
	fn unrenamed_names_pass_through() {
		assert_eq!(fix_closure_country_name("Chile"), "Chile");
		assert_eq!(fix_closure_country_name("Viet Nam"), "Vietnam");
	}
}
