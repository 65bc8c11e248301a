use std::fmt;
use std::io;

use chrono::NaiveDate;


#[derive(Debug)]
pub enum Error {
	Io(io::Error),
	Csv(csv::Error),
	Config(serde_json::Error),
	Request(reqwest::Error),
	/// A date header or date cell did not match the expected layout.
	InvalidDate{
		line: u64,
		value: String,
	},
	/// A case count cell was not a non-negative integer.
	InvalidCount{
		line: u64,
		value: String,
	},
	UnknownStatus{
		line: u64,
		value: String,
	},
	/// The row has fewer columns than the layout requires.
	ShortRow{
		line: u64,
		expected: usize,
		found: usize,
	},
	/// Two series which are summed index by index do not share the same dates.
	MisalignedSeries{
		series: String,
		index: usize,
		expected: Option<NaiveDate>,
		found: Option<NaiveDate>,
	},
	UnsortedClosures{
		previous: NaiveDate,
		found: NaiveDate,
	},
	/// A per-date sum does not fit the case counter.
	CountOverflow{
		series: String,
		date: NaiveDate,
	},
	ResourceUnavailable(String),
	UnknownResource(String),
	LoaderPanicked,
}

impl fmt::Display for Error {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Io(e) => fmt::Display::fmt(e, f),
			Self::Csv(e) => fmt::Display::fmt(e, f),
			Self::Config(e) => write!(f, "invalid configuration: {}", e),
			Self::Request(e) => fmt::Display::fmt(e, f),
			Self::InvalidDate{line, value} => write!(f, "malformed date {:?} on line {}", value, line),
			Self::InvalidCount{line, value} => write!(f, "malformed case count {:?} on line {}", value, line),
			Self::UnknownStatus{line, value} => write!(f, "unknown closure status {:?} on line {}", value, line),
			Self::ShortRow{line, expected, found} => write!(f, "line {} has {} columns, expected at least {}", line, found, expected),
			Self::MisalignedSeries{series, index, expected, found} => write!(f, "series {} does not line up at index {}: expected {:?}, found {:?}", series, index, expected, found),
			Self::UnsortedClosures{previous, found} => write!(f, "closure records are not sorted by date: {} follows {}", found, previous),
			Self::CountOverflow{series, date} => write!(f, "case count of {} on {} overflows", series, date),
			Self::ResourceUnavailable(name) => write!(f, "failed to obtain a complete copy of resource {}", name),
			Self::UnknownResource(name) => write!(f, "resource {} is not configured", name),
			Self::LoaderPanicked => f.write_str("the loader thread panicked"),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Io(e) => Some(e),
			Self::Csv(e) => Some(e),
			Self::Config(e) => Some(e),
			Self::Request(e) => Some(e),
			_ => None,
		}
	}
}

impl From<io::Error> for Error {
	fn from(other: io::Error) -> Self {
		Self::Io(other)
	}
}

impl From<csv::Error> for Error {
	fn from(other: csv::Error) -> Self {
		Self::Csv(other)
	}
}

impl From<serde_json::Error> for Error {
	fn from(other: serde_json::Error) -> Self {
		Self::Config(other)
	}
}

impl From<reqwest::Error> for Error {
	fn from(other: reqwest::Error) -> Self {
		Self::Request(other)
	}
}

pub type Result<T> = std::result::Result<T, Error>;
