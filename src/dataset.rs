//! The loaded and indexed data set, and the background loader producing it.
use std::collections::HashSet;
use std::io;
use std::path::PathBuf;
use std::thread;

use log::{debug, info};

use smartstring::alias::{String as SmartString};

use chrono::NaiveDate;

use super::algorithms::{Groups, group_by, lower_bound, sort};
use super::context::{Country, Province, City, Locations};
use super::error::{Error, Result};
use super::ioutil::{magic_open, size_hint};
use super::jhu::{CovidCaseRecord, PROVINCE_ONLY_COUNTRIES, read_global_cases, read_regional_cases};
use super::progress::{ProgressSink, SharedProgress, StepMeter};
use super::timeseries::{country_level_cases, country_total, global_covid_series, global_closure_series, nearest_on_or_before};
use super::unesco::{ClosureStatus, SchoolClosureRecord, read_closures};


static GLOBAL_PHASE: (f64, f64) = (0.0, 0.40);
static REGIONAL_PHASE: (f64, f64) = (0.40, 0.80);
static CLOSURE_PHASE: (f64, f64) = (0.80, 0.95);
static INDEX_PHASE: (f64, f64) = (0.95, 1.0);


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFiles {
	pub global_covid: PathBuf,
	pub regional_covid: PathBuf,
	pub closures: PathBuf,
}


/// One input of [`Dataset::from_readers`] together with its expected size in
/// bytes, if known.
pub struct Source<R> {
	pub reader: R,
	pub size: Option<u64>,
}

impl<R: io::Read> Source<R> {
	pub fn new(reader: R, size: Option<u64>) -> Self {
		Self{reader, size}
	}
}


#[derive(Debug, Clone, Default)]
pub struct Dataset {
	countries: HashSet<Country>,
	sorted_countries: Vec<Country>,
	provinces: HashSet<Province>,
	sorted_provinces: Vec<Province>,
	country_provinces: Groups<Country, Province>,
	cities: HashSet<City>,
	sorted_cities: Vec<City>,
	province_cities: Groups<Province, City>,
	all_covid_cases: Vec<CovidCaseRecord>,
	country_all_cases: Groups<Country, CovidCaseRecord>,
	country_cases: Groups<Country, CovidCaseRecord>,
	global_covid_cases: Vec<CovidCaseRecord>,
	all_school_closures: Vec<SchoolClosureRecord>,
	country_closures: Groups<Country, SchoolClosureRecord>,
	global_school_closures: Vec<SchoolClosureRecord>,
}

fn is_province_only(country: &Country) -> bool {
	PROVINCE_ONLY_COUNTRIES.iter().any(|v| *v == country.name.as_str())
}

fn group_by_country<T: Clone, F: Fn(&T) -> Option<&Country>>(records: &[T], country_fn: F) -> Groups<Country, T> {
	let mut result = Groups::new();
	for r in records.iter() {
		if let Some(country) = country_fn(r) {
			result.push(country.clone(), r.clone());
		}
	}
	result
}

impl Dataset {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_files<S: ProgressSink + ?Sized>(files: &DataFiles, sink: &mut S) -> Result<Self> {
		info!("loading {}, {} and {}", files.global_covid.display(), files.regional_covid.display(), files.closures.display());
		Self::from_readers(
			Source::new(magic_open(&files.global_covid)?, size_hint(&files.global_covid)),
			Source::new(magic_open(&files.regional_covid)?, size_hint(&files.regional_covid)),
			Source::new(magic_open(&files.closures)?, size_hint(&files.closures)),
			sink,
		)
	}

	pub fn from_readers<G: io::Read, R: io::Read, C: io::Read, S: ProgressSink + ?Sized>(
			global: Source<G>,
			regional: Source<R>,
			closures: Source<C>,
			sink: &mut S,
	) -> Result<Self> {
		let mut locations = Locations::new();

		let mut all_covid_cases = {
			let mut pm = StepMeter::new(&mut *sink, "reading global cases", GLOBAL_PHASE.0, GLOBAL_PHASE.1, global.size);
			let cases = read_global_cases(global.reader, &mut locations, &mut pm)?;
			pm.finish();
			cases
		};
		{
			let mut pm = StepMeter::new(&mut *sink, "reading regional cases", REGIONAL_PHASE.0, REGIONAL_PHASE.1, regional.size);
			let cases = read_regional_cases(regional.reader, &mut locations, &mut pm)?;
			pm.finish();
			all_covid_cases.extend(cases);
		}
		let raw_closures = {
			let mut pm = StepMeter::new(&mut *sink, "reading school closures", CLOSURE_PHASE.0, CLOSURE_PHASE.1, closures.size);
			let closures = read_closures(closures.reader, &mut pm)?;
			pm.finish();
			closures
		};

		let mut pm = StepMeter::new(&mut *sink, "indexing", INDEX_PHASE.0, INDEX_PHASE.1, Some(4));
		let mut result = Self::new();
		result.index_locations(locations);
		pm.update(1);
		result.index_cases(all_covid_cases)?;
		pm.update(2);
		result.index_closures(raw_closures)?;
		pm.update(3);
		pm.finish();
		info!(
			"loaded {} countries, {} case records and {} closure records",
			result.countries.len(), result.all_covid_cases.len(), result.all_school_closures.len(),
		);
		Ok(result)
	}

	/// Location names are unique within their parent, so ties in the sort by
	/// name are broken by the parent names.
	fn index_locations(&mut self, locations: Locations) {
		let Locations{countries, provinces, cities} = locations;

		let countries_v: Vec<Country> = countries.iter().cloned().collect();
		self.sorted_countries = sort(&countries_v, |a, b| a.name.cmp(&b.name), false);
		self.countries = countries;

		let provinces_v: Vec<Province> = provinces.iter().cloned().collect();
		self.sorted_provinces = sort(
			&provinces_v,
			|a, b| a.name.cmp(&b.name).then_with(|| a.country.name.cmp(&b.country.name)),
			false,
		);
		self.country_provinces = group_by(self.sorted_provinces.iter().cloned(), |p| p.country.clone());
		self.provinces = provinces;

		let cities_v: Vec<City> = cities.iter().cloned().collect();
		self.sorted_cities = sort(
			&cities_v,
			|a, b| a.name.cmp(&b.name)
				.then_with(|| a.province.name.cmp(&b.province.name))
				.then_with(|| a.country().name.cmp(&b.country().name)),
			false,
		);
		self.province_cities = group_by(self.sorted_cities.iter().cloned(), |c| c.province.clone());
		self.cities = cities;
	}

	fn index_cases(&mut self, all_covid_cases: Vec<CovidCaseRecord>) -> Result<()> {
		self.country_all_cases = group_by_country(&all_covid_cases, |r| r.country.as_ref());
		let mut country_cases = Groups::new();
		for (country, records) in self.country_all_cases.iter() {
			let series = if is_province_only(country) {
				debug!("summing provinces of {}", country);
				country_total(country, records)?
			} else {
				country_level_cases(records)
			};
			country_cases.insert(country.clone(), series);
		}
		self.country_cases = country_cases;
		self.global_covid_cases = global_covid_series(
			self.sorted_countries.iter().filter_map(|c| self.country_cases.get(c).map(|s| (c, s))),
		)?;
		self.all_covid_cases = all_covid_cases;
		Ok(())
	}

	/// Closures are brought into date order first; countries keep their
	/// file order within a day.
	fn index_closures(&mut self, closures: Vec<SchoolClosureRecord>) -> Result<()> {
		let closures = sort(&closures, |a, b| a.date.cmp(&b.date), false);
		self.country_closures = group_by_country(&closures, |r| r.country.as_ref());
		self.global_school_closures = global_closure_series(&closures)?;
		self.all_school_closures = closures;
		Ok(())
	}

	/// Replaces the contents with the given files. On failure the data set is
	/// left empty.
	pub fn load<S: ProgressSink + ?Sized>(&mut self, files: &DataFiles, sink: &mut S) -> Result<()> {
		self.reset();
		*self = Self::from_files(files, sink)?;
		Ok(())
	}

	pub fn reset(&mut self) {
		*self = Self::default();
	}

	pub fn is_empty(&self) -> bool {
		self.countries.is_empty() && self.all_covid_cases.is_empty() && self.all_school_closures.is_empty()
	}

	pub fn countries(&self) -> &HashSet<Country> {
		&self.countries
	}

	pub fn sorted_countries(&self) -> &[Country] {
		&self.sorted_countries
	}

	pub fn country(&self, name: &str) -> Option<&Country> {
		let name = SmartString::from(name);
		let i = lower_bound(&self.sorted_countries, |c| c.name.clone(), &name);
		self.sorted_countries.get(i).filter(|c| c.name == name)
	}

	pub fn provinces(&self) -> &HashSet<Province> {
		&self.provinces
	}

	pub fn sorted_provinces(&self) -> &[Province] {
		&self.sorted_provinces
	}

	pub fn provinces_of(&self, country: &Country) -> &[Province] {
		self.country_provinces.get(country).unwrap_or(&[])
	}

	pub fn cities(&self) -> &HashSet<City> {
		&self.cities
	}

	pub fn sorted_cities(&self) -> &[City] {
		&self.sorted_cities
	}

	pub fn cities_of(&self, province: &Province) -> &[City] {
		self.province_cities.get(province).unwrap_or(&[])
	}

	pub fn all_covid_cases(&self) -> &[CovidCaseRecord] {
		&self.all_covid_cases
	}

	/// Records of every granularity within `country`.
	pub fn all_cases_of(&self, country: &Country) -> &[CovidCaseRecord] {
		self.country_all_cases.get(country).unwrap_or(&[])
	}

	/// The whole-country series of `country`.
	pub fn cases_of(&self, country: &Country) -> &[CovidCaseRecord] {
		self.country_cases.get(country).unwrap_or(&[])
	}

	pub fn country_cases(&self) -> &Groups<Country, CovidCaseRecord> {
		&self.country_cases
	}

	pub fn global_covid_cases(&self) -> &[CovidCaseRecord] {
		&self.global_covid_cases
	}

	pub fn all_school_closures(&self) -> &[SchoolClosureRecord] {
		&self.all_school_closures
	}

	pub fn closures_of(&self, country: &Country) -> &[SchoolClosureRecord] {
		self.country_closures.get(country).unwrap_or(&[])
	}

	pub fn country_closures(&self) -> &Groups<Country, SchoolClosureRecord> {
		&self.country_closures
	}

	pub fn global_school_closures(&self) -> &[SchoolClosureRecord] {
		&self.global_school_closures
	}

	pub fn cases_on(&self, country: &Country, date: NaiveDate) -> Option<&CovidCaseRecord> {
		nearest_on_or_before(self.cases_of(country), date)
	}

	pub fn closure_status_on(&self, country: &Country, date: NaiveDate) -> Option<ClosureStatus> {
		nearest_on_or_before(self.closures_of(country), date).map(|r| r.status)
	}

	/// Loads `files` on a worker thread.
	pub fn spawn_load(files: DataFiles) -> Result<LoadHandle> {
		let progress = SharedProgress::new();
		let mut sink = progress.clone();
		let handle = thread::Builder::new()
			.name("dataset-loader".into())
			.spawn(move || Self::from_files(&files, &mut sink))?;
		Ok(LoadHandle{handle, progress})
	}
}


pub struct LoadHandle {
	handle: thread::JoinHandle<Result<Dataset>>,
	progress: SharedProgress,
}

impl LoadHandle {
	/// Current `(fraction, description)` of the load.
	pub fn progress(&self) -> (f64, String) {
		self.progress.get()
	}

	pub fn is_finished(&self) -> bool {
		self.handle.is_finished()
	}

	pub fn join(self) -> Result<Dataset> {
		match self.handle.join() {
			Ok(result) => result,
			Err(_) => Err(Error::LoaderPanicked),
		}
	}
}
