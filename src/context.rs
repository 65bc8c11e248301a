use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use smartstring::alias::{String as SmartString};

use chrono::naive::NaiveDate;


#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Country {
	pub name: SmartString,
}

impl Country {
	pub fn new<S: Into<SmartString>>(name: S) -> Self {
		Self{name: name.into()}
	}
}

impl fmt::Display for Country {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.write_str(&self.name)
	}
}


#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Province {
	pub name: SmartString,
	pub country: Country,
}

impl Province {
	pub fn new<S: Into<SmartString>>(name: S, country: Country) -> Self {
		Self{name: name.into(), country}
	}

	/// Empty names in the sources mean "no province".
	pub fn from_parts(name: &str, country: &Country) -> Option<Self> {
		if name.is_empty() {
			return None
		}
		Some(Self::new(name, country.clone()))
	}
}

impl fmt::Display for Province {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}, {}", self.name, self.country)
	}
}


#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct City {
	pub name: SmartString,
	pub province: Province,
}

impl City {
	pub fn new<S: Into<SmartString>>(name: S, province: Province) -> Self {
		Self{name: name.into(), province}
	}

	pub fn from_parts(name: &str, province: Option<&Province>) -> Option<Self> {
		if name.is_empty() {
			return None
		}
		Some(Self::new(name, province?.clone()))
	}

	pub fn country(&self) -> &Country {
		&self.province.country
	}
}

impl fmt::Display for City {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}, {}", self.name, self.province)
	}
}


#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind")]
pub enum Location {
	Country(Country),
	Province(Province),
	City(City),
}

impl Location {
	pub fn name(&self) -> &str {
		match self {
			Self::Country(c) => &c.name,
			Self::Province(p) => &p.name,
			Self::City(c) => &c.name,
		}
	}

	pub fn country(&self) -> &Country {
		match self {
			Self::Country(c) => c,
			Self::Province(p) => &p.country,
			Self::City(c) => c.country(),
		}
	}
}

impl fmt::Display for Location {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Country(c) => fmt::Display::fmt(c, f),
			Self::Province(p) => fmt::Display::fmt(p, f),
			Self::City(c) => fmt::Display::fmt(c, f),
		}
	}
}

impl From<Country> for Location {
	fn from(other: Country) -> Self {
		Self::Country(other)
	}
}

impl From<Province> for Location {
	fn from(other: Province) -> Self {
		Self::Province(other)
	}
}

impl From<City> for Location {
	fn from(other: City) -> Self {
		Self::City(other)
	}
}


/// Distinct locations seen while reading the sources.
#[derive(Debug, Clone, Default)]
pub struct Locations {
	pub countries: HashSet<Country>,
	pub provinces: HashSet<Province>,
	pub cities: HashSet<City>,
}

impl Locations {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, country: &Country, province: Option<&Province>, city: Option<&City>) {
		if !self.countries.contains(country) {
			self.countries.insert(country.clone());
		}
		if let Some(province) = province {
			if !self.provinces.contains(province) {
				self.provinces.insert(province.clone());
			}
		}
		if let Some(city) = city {
			if !self.cities.contains(city) {
				self.cities.insert(city.clone());
			}
		}
	}

	pub fn clear(&mut self) {
		self.countries.clear();
		self.provinces.clear();
		self.cities.clear();
	}
}


pub trait TimeBased {
	fn date(&self) -> NaiveDate;
}

impl<T: TimeBased + ?Sized> TimeBased for &T {
	fn date(&self) -> NaiveDate {
		(**self).date()
	}
}


/// Parses the `M/D/YY` column headers of the case files. Years are in the
/// 2000s.
pub fn parse_header_date(s: &str) -> Option<NaiveDate> {
	let mut parts = s.trim().split('/');
	let month = parts.next()?.parse::<u32>().ok()?;
	let day = parts.next()?.parse::<u32>().ok()?;
	let year_s = parts.next()?;
	if parts.next().is_some() || year_s.len() != 2 {
		return None
	}
	let year = 2000 + year_s.parse::<i32>().ok()?;
	NaiveDate::from_ymd_opt(year, month, day)
}

/// Parses the `D/M/YYYY` dates of the closure file.
pub fn parse_closure_date(s: &str) -> Option<NaiveDate> {
	let mut parts = s.trim().split('/');
	let day = parts.next()?.parse::<u32>().ok()?;
	let month = parts.next()?.parse::<u32>().ok()?;
	let year = parts.next()?.parse::<i32>().ok()?;
	if parts.next().is_some() {
		return None
	}
	NaiveDate::from_ymd_opt(year, month, day)
}

pub fn is_ascii_name(s: &str) -> bool {
	s.is_ascii()
}
