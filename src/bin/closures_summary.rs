use std::io;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{error, info};

use serde::Serialize;

use chrono::NaiveDate;

use covid_closures::{Config, Dataset, Country, ClosureStatus, ProgressMeter, ProgressSink, init_resources, daily_increase, naive_today};


#[derive(Debug, Serialize)]
struct CountrySummary {
	country: String,
	date: Option<NaiveDate>,
	cases: Option<u64>,
	increase: Option<i64>,
	status: Option<ClosureStatus>,
	provinces: usize,
}

#[derive(Debug, Serialize)]
struct Summary {
	countries: usize,
	provinces: usize,
	cities: usize,
	first_date: Option<NaiveDate>,
	last_date: Option<NaiveDate>,
	global_cases: Option<u64>,
	global_status: Option<ClosureStatus>,
	country: Option<CountrySummary>,
}

fn summarize_country(ds: &Dataset, country: &Country, date: NaiveDate) -> CountrySummary {
	let series = ds.cases_of(country);
	let latest = ds.cases_on(country, date);
	let increase = latest.and_then(|r| {
		let i = series.iter().position(|x| x.date == r.date)?;
		daily_increase(series).get(i).cloned()
	});
	CountrySummary{
		country: country.name.to_string(),
		date: latest.map(|r| r.date),
		cases: latest.map(|r| r.cases),
		increase,
		status: ds.closure_status_on(country, date),
		provinces: ds.provinces_of(country).len(),
	}
}

fn summarize(ds: &Dataset, country: Option<&Country>) -> Summary {
	let global = ds.global_covid_cases();
	let date = global.last().map(|r| r.date).unwrap_or_else(naive_today);
	Summary{
		countries: ds.countries().len(),
		provinces: ds.provinces().len(),
		cities: ds.cities().len(),
		first_date: global.first().map(|r| r.date),
		last_date: global.last().map(|r| r.date),
		global_cases: global.last().map(|r| r.cases),
		global_status: ds.global_school_closures().last().map(|r| r.status),
		country: country.map(|c| summarize_country(ds, c, date)),
	}
}

fn print_summary(s: &Summary) {
	println!("{} countries, {} provinces, {} cities", s.countries, s.provinces, s.cities);
	if let (Some(first), Some(last)) = (s.first_date, s.last_date) {
		println!("cases from {} to {}", first, last);
	}
	if let Some(cases) = s.global_cases {
		println!("global cases: {}", cases);
	}
	if let Some(status) = s.global_status {
		println!("most common school status: {}", status);
	}
	if let Some(c) = s.country.as_ref() {
		match (c.date, c.cases) {
			(Some(date), Some(cases)) => println!("{}: {} cases on {} ({:+} on the day)", c.country, cases, date, c.increase.unwrap_or(0)),
			_ => println!("{}: no case data", c.country),
		}
		match c.status {
			Some(status) => println!("{}: schools {}", c.country, status),
			None => println!("{}: no closure data", c.country),
		}
	}
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let argv: Vec<String> = std::env::args().skip(1).collect();
	let json = argv.iter().any(|a| a == "--json");
	let pin = argv.iter().any(|a| a == "--pin");
	let country_name = argv.iter().find(|a| !a.starts_with("--"));

	let mut config = Config::from_env()?;
	init_resources(&config.resource)?;
	if pin {
		let pinned = config.resource.pin_missing()?;
		if !pinned.is_empty() {
			// the data directory override must not end up in the file
			let path = Config::env_path();
			let mut stored = Config::from_path(&path)?;
			for (name, identifier) in pinned {
				stored.resource.get_mut(&name)?.identifier = Some(identifier);
			}
			stored.save(&path)?;
			info!("stored checksums in {}", path.display());
		}
	}
	let files = config.data_files()?;

	let loader = Dataset::spawn_load(files)?;
	let mut pm = ProgressMeter::start();
	while !loader.is_finished() {
		let (fraction, description) = loader.progress();
		pm.report(fraction, &description);
		thread::sleep(Duration::from_millis(200));
	}
	let dataset = match loader.join() {
		Ok(ds) => Arc::new(ds),
		Err(e) => {
			error!("failed to load data: {}", e);
			return Err(e.into())
		},
	};
	pm.report(1.0, "done");
	pm.finish();

	let country = match country_name {
		Some(name) => match dataset.country(name) {
			Some(c) => Some(c.clone()),
			None => {
				error!("unknown country {:?}", name);
				return Err(format!("unknown country {:?}", name).into())
			},
		},
		None => None,
	};

	let summary = summarize(&dataset, country.as_ref());
	if json {
		serde_json::to_writer_pretty(io::stdout(), &summary)?;
		println!();
	} else {
		print_summary(&summary);
	}
	Ok(())
}
