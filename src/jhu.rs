//! Confirmed case time series in the column layout of the CSSE COVID-19
//! repository: one row per location, one column per day.
use std::io;

use log::{debug, trace};

use serde::Serialize;

use chrono::naive::NaiveDate;

use super::context::{Country, Province, City, Location, Locations, TimeBased, parse_header_date, is_ascii_name};
use super::error::{Error, Result};
use super::ioutil::csv_reader;
use super::progress::{ProgressSink, StepMeter};


/// "Countries" of the case files which are dropped on sight: ships, events
/// and territories without a counterpart in the closure data.
pub static COVID_COUNTRIES_EXCLUDED: &[&str] = &[
	"Burma",
	"Diamond Princess",
	"Holy See",
	"Kosovo",
	"MS Zaandam",
	"Sao Tome and Principe",
	"Summer Olympics 2020",
	"Taiwan*",
	"West Bank and Gaza",
];

/// Countries for which the global file only carries per-province rows.
pub static PROVINCE_ONLY_COUNTRIES: &[&str] = &[
	"China",
	"Canada",
	"Australia",
];

static PROGRESS_INTERVAL: usize = 1000;


#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CovidCaseRecord {
	pub date: NaiveDate,
	/// Cumulative confirmed cases.
	pub cases: u64,
	pub country: Option<Country>,
	pub province: Option<Province>,
	pub city: Option<City>,
}

impl CovidCaseRecord {
	pub fn country_level(date: NaiveDate, cases: u64, country: Country) -> Self {
		Self{
			date,
			cases,
			country: Some(country),
			province: None,
			city: None,
		}
	}

	pub fn global(date: NaiveDate, cases: u64) -> Self {
		Self{
			date,
			cases,
			country: None,
			province: None,
			city: None,
		}
	}

	pub fn is_country_level(&self) -> bool {
		self.country.is_some() && self.province.is_none() && self.city.is_none()
	}

	pub fn is_global(&self) -> bool {
		self.country.is_none() && self.province.is_none() && self.city.is_none()
	}

	/// The most specific location of the record.
	pub fn location(&self) -> Option<Location> {
		if let Some(city) = self.city.as_ref() {
			return Some(city.clone().into())
		}
		if let Some(province) = self.province.as_ref() {
			return Some(province.clone().into())
		}
		self.country.as_ref().map(|c| c.clone().into())
	}
}

impl TimeBased for CovidCaseRecord {
	fn date(&self) -> NaiveDate {
		self.date
	}
}


/// Column positions of a case file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseLayout {
	pub city: Option<usize>,
	pub province: usize,
	pub country: usize,
	pub first_date: usize,
}

impl CaseLayout {
	fn min_columns(&self) -> usize {
		let mut n = self.province.max(self.country);
		if let Some(city) = self.city {
			n = n.max(city);
		}
		n + 1
	}
}

/// `Province/State,Country/Region,Lat,Long,<dates...>`
pub static GLOBAL_LAYOUT: CaseLayout = CaseLayout{
	city: None,
	province: 0,
	country: 1,
	first_date: 4,
};

/// `UID,iso2,iso3,code3,FIPS,Admin2,Province_State,Country_Region,Lat,Long_,Combined_Key,<dates...>`
pub static REGIONAL_LAYOUT: CaseLayout = CaseLayout{
	city: Some(5),
	province: 6,
	country: 7,
	first_date: 11,
};


pub fn is_excluded_country(name: &str) -> bool {
	!is_ascii_name(name) || COVID_COUNTRIES_EXCLUDED.iter().any(|v| *v == name)
}

fn parse_dates(headers: &csv::StringRecord, layout: &CaseLayout) -> Result<Vec<NaiveDate>> {
	let mut dates = Vec::with_capacity(headers.len().saturating_sub(layout.first_date));
	for h in headers.iter().skip(layout.first_date) {
		match parse_header_date(h) {
			Some(d) => dates.push(d),
			None => return Err(Error::InvalidDate{
				line: 1,
				value: h.into(),
			}),
		}
	}
	Ok(dates)
}

/// Reads a case file, emitting one record per date column of every accepted
/// row. Rows of excluded countries are skipped.
pub fn read_cases<R: io::Read, S: ProgressSink + ?Sized>(
		r: R,
		layout: &CaseLayout,
		locations: &mut Locations,
		pm: &mut StepMeter<'_, S>,
) -> Result<Vec<CovidCaseRecord>> {
	let mut r = csv_reader(r);
	let headers = r.headers()?.clone();
	let dates = parse_dates(&headers, layout)?;
	let min_columns = layout.min_columns().max(layout.first_date + dates.len());

	let mut result = Vec::new();
	let mut skipped = 0;
	for (i, row) in r.records().enumerate() {
		let row = row?;
		let line = row.position().map(|p| p.line()).unwrap_or(i as u64 + 2);
		if row.len() < min_columns {
			return Err(Error::ShortRow{
				line,
				expected: min_columns,
				found: row.len(),
			})
		}

		let country_name = &row[layout.country];
		if is_excluded_country(country_name) {
			trace!("skipping excluded country {:?} on line {}", country_name, line);
			skipped += 1;
			continue
		}
		let country = Country::new(country_name);
		let province = Province::from_parts(&row[layout.province], &country);
		let city = match layout.city {
			Some(col) => City::from_parts(&row[col], province.as_ref()),
			None => None,
		};
		locations.insert(&country, province.as_ref(), city.as_ref());

		result.reserve(dates.len());
		for (date, cell) in dates.iter().zip(row.iter().skip(layout.first_date)) {
			let cases = match cell.trim().parse::<u64>() {
				Ok(v) => v,
				Err(_) => return Err(Error::InvalidCount{
					line,
					value: cell.into(),
				}),
			};
			result.push(CovidCaseRecord{
				date: *date,
				cases,
				country: Some(country.clone()),
				province: province.clone(),
				city: city.clone(),
			});
		}

		if i % PROGRESS_INTERVAL == PROGRESS_INTERVAL - 1 {
			if let Some(pos) = row.position() {
				pm.update(pos.byte());
			}
		}
	}
	debug!("read {} case records over {} dates, skipped {} rows", result.len(), dates.len(), skipped);
	Ok(result)
}

pub fn read_global_cases<R: io::Read, S: ProgressSink + ?Sized>(
		r: R,
		locations: &mut Locations,
		pm: &mut StepMeter<'_, S>,
) -> Result<Vec<CovidCaseRecord>> {
	read_cases(r, &GLOBAL_LAYOUT, locations, pm)
}

pub fn read_regional_cases<R: io::Read, S: ProgressSink + ?Sized>(
		r: R,
		locations: &mut Locations,
		pm: &mut StepMeter<'_, S>,
) -> Result<Vec<CovidCaseRecord>> {
	read_cases(r, &REGIONAL_LAYOUT, locations, pm)
}
