use std::fs;
use std::io::Write;
use std::path::PathBuf;

use flate2::Compression;
use flate2::write::GzEncoder;

use chrono::NaiveDate;

use covid_closures::{Dataset, DataFiles, Country, ClosureStatus, SharedProgress, Error};


static GLOBAL: &str = "Province/State,Country/Region,Lat,Long,3/1/20,3/2/20\n\
	,France,46.2,2.2,100,130\n\
	New South Wales,Australia,-33.9,151.2,4,6\n\
	Victoria,Australia,-37.8,144.9,1,2\n\
	,US,40.0,-100.0,30,53\n";

static REGIONAL: &str = "UID,iso2,iso3,code3,FIPS,Admin2,Province_State,Country_Region,Lat,Long_,Combined_Key,3/1/20,3/2/20\n\
	84053033,US,USA,840,53033,King,Washington,US,47.5,-121.8,\"King, Washington, US\",14,21\n";

static CLOSURES: &str = "Date,ISO,Country,Status,Note\n\
	1/3/2020,FRA,France,Fully open,\n\
	1/3/2020,AUS,Australia,Academic break,\n\
	1/3/2020,USA,United States of America,Fully open,\n\
	2/3/2020,FRA,France,Partially open,\n\
	2/3/2020,AUS,Australia,Academic break,\n\
	2/3/2020,USA,United States of America,Partially open,\n\
	2/3/2020,GRL,Greenland,Closed due to COVID-19,\n";

struct Scratch {
	dir: PathBuf,
}

impl Scratch {
	fn new(name: &str) -> Self {
		let dir = std::env::temp_dir().join(format!("covid-closures-{}-{}", name, std::process::id()));
		fs::create_dir_all(&dir).unwrap();
		Self{dir}
	}

	fn write(&self, name: &str, contents: &str) -> PathBuf {
		let path = self.dir.join(name);
		fs::write(&path, contents).unwrap();
		path
	}

	fn write_gz(&self, name: &str, contents: &str) -> PathBuf {
		let path = self.dir.join(name);
		let mut enc = GzEncoder::new(fs::File::create(&path).unwrap(), Compression::default());
		enc.write_all(contents.as_bytes()).unwrap();
		enc.finish().unwrap();
		path
	}
}

impl Drop for Scratch {
	fn drop(&mut self) {
		let _ = fs::remove_dir_all(&self.dir);
	}
}

fn march(d: u32) -> NaiveDate {
	NaiveDate::from_ymd_opt(2020, 3, d).unwrap()
}

#[test]
fn loads_from_files() {
	let scratch = Scratch::new("load");
	let files = DataFiles{
		global_covid: scratch.write_gz("global.csv.gz", GLOBAL),
		regional_covid: scratch.write("us.csv", REGIONAL),
		closures: scratch.write("closures.csv", CLOSURES),
	};
	let mut progress = SharedProgress::new();
	let mut ds = Dataset::new();
	ds.load(&files, &mut progress).unwrap();
	assert_eq!(progress.fraction(), 1.0);

	let names: Vec<&str> = ds.sorted_countries().iter().map(|c| c.name.as_str()).collect();
	assert_eq!(names, vec!["Australia", "France", "US"]);

	let australia = Country::new("Australia");
	let totals: Vec<u64> = ds.cases_of(&australia).iter().map(|r| r.cases).collect();
	assert_eq!(totals, vec![5, 8]);

	let global: Vec<(NaiveDate, u64)> = ds.global_covid_cases().iter().map(|r| (r.date, r.cases)).collect();
	assert_eq!(global, vec![(march(1), 135), (march(2), 191)]);

	let statuses: Vec<ClosureStatus> = ds.global_school_closures().iter().map(|r| r.status).collect();
	assert_eq!(statuses, vec![ClosureStatus::FullyOpen, ClosureStatus::PartiallyOpen]);
	assert_eq!(ds.closure_status_on(&Country::new("US"), march(2)), Some(ClosureStatus::PartiallyOpen));
	assert!(ds.closures_of(&Country::new("Greenland")).is_empty());
}

#[test]
fn background_load_reports_progress() {
	let scratch = Scratch::new("spawn");
	let files = DataFiles{
		global_covid: scratch.write("global.csv", GLOBAL),
		regional_covid: scratch.write("us.csv", REGIONAL),
		closures: scratch.write("closures.csv", CLOSURES),
	};
	let handle = Dataset::spawn_load(files).unwrap();
	let mut last = 0.0;
	while !handle.is_finished() {
		let (fraction, _) = handle.progress();
		assert!(fraction >= last);
		last = fraction;
		std::thread::yield_now();
	}
	let (fraction, _) = handle.progress();
	assert_eq!(fraction, 1.0);
	let ds = handle.join().unwrap();
	assert_eq!(ds.cases_on(&Country::new("France"), march(2)).map(|r| r.cases), Some(130));
}

#[test]
fn background_load_surfaces_errors() {
	let scratch = Scratch::new("broken");
	let files = DataFiles{
		global_covid: scratch.write("global.csv", GLOBAL),
		regional_covid: scratch.write("us.csv", REGIONAL),
		closures: scratch.write("closures.csv", "Date,ISO,Country,Status,Note\n1/3/2020,FRA,France,Open,\n"),
	};
	let handle = Dataset::spawn_load(files).unwrap();
	match handle.join() {
		Err(Error::UnknownStatus{line, value}) => {
			assert_eq!(line, 2);
			assert_eq!(value, "Open");
		},
		other => panic!("unexpected result: {:?}", other.map(|_| ())),
	}
}
