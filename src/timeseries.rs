use std::convert::TryFrom;

use log::warn;

use enum_map::EnumMap;

use chrono::NaiveDate;

use super::algorithms::{filter, group_by, lower_bound};
use super::context::{Country, TimeBased};
use super::error::{Error, Result};
use super::jhu::CovidCaseRecord;
use super::unesco::{ClosureStatus, SchoolClosureRecord};


/// Records without province or city, i.e. the whole-country series.
pub fn country_level_cases(records: &[CovidCaseRecord]) -> Vec<CovidCaseRecord> {
	filter(records, |r| r.is_country_level())
}

fn add_cases(series: &str, total: &mut CovidCaseRecord, cases: u64) -> Result<()> {
	total.cases = match total.cases.checked_add(cases) {
		Some(v) => v,
		None => return Err(Error::CountOverflow{
			series: series.into(),
			date: total.date,
		}),
	};
	Ok(())
}

fn check_aligned<T: TimeBased, U: TimeBased>(series: &str, template: &[T], other: &[U]) -> Result<()> {
	for i in 0..template.len().max(other.len()) {
		let expected = template.get(i).map(|r| r.date());
		let found = other.get(i).map(|r| r.date());
		if expected != found {
			return Err(Error::MisalignedSeries{
				series: series.into(),
				index: i,
				expected,
				found,
			})
		}
	}
	Ok(())
}

/// Reconstructs the whole-country series of a country which only has
/// per-province rows by summing the provinces date by date.
///
/// The first province fixes the dates; every other province has to report
/// exactly the same dates in the same order.
pub fn country_total(country: &Country, records: &[CovidCaseRecord]) -> Result<Vec<CovidCaseRecord>> {
	let by_province = group_by(
		records.iter().filter(|r| r.province.is_some()),
		|r| r.province.clone(),
	);
	let mut provinces = by_province.iter();
	let (_, skeleton) = match provinces.next() {
		Some(v) => v,
		None => return Ok(Vec::new()),
	};
	let mut result: Vec<CovidCaseRecord> = skeleton.iter()
		.map(|r| CovidCaseRecord::country_level(r.date, r.cases, country.clone()))
		.collect();

	for (province, series) in provinces {
		let name = province.as_ref().map(|p| p.to_string()).unwrap_or_default();
		check_aligned(&name, &result, series)?;
		for (total, r) in result.iter_mut().zip(series.iter()) {
			add_cases(&country.name, total, r.cases)?;
		}
	}
	Ok(result)
}

/// Sums whole-country series into one global series. All series must share
/// the dates of the first non-empty one.
pub fn global_covid_series<'a, I: IntoIterator<Item = (&'a Country, &'a [CovidCaseRecord])>>(series: I) -> Result<Vec<CovidCaseRecord>> {
	let mut result: Option<Vec<CovidCaseRecord>> = None;
	for (country, cases) in series {
		if cases.is_empty() {
			warn!("{} has no country level cases, leaving it out of the global series", country);
			continue
		}
		let totals = result.get_or_insert_with(|| {
			cases.iter().map(|r| CovidCaseRecord::global(r.date, 0)).collect()
		});
		check_aligned(&country.name, &totals[..], cases)?;
		for (total, r) in totals.iter_mut().zip(cases.iter()) {
			add_cases("global", total, r.cases)?;
		}
	}
	Ok(result.unwrap_or_default())
}

/// The status with the highest count; ties go to the earlier variant.
pub fn majority_status(counts: &EnumMap<ClosureStatus, usize>) -> ClosureStatus {
	let mut best = ClosureStatus::ALL[0];
	let mut best_count = counts[best];
	for (status, count) in counts.iter() {
		if *count > best_count {
			best = status;
			best_count = *count;
		}
	}
	best
}

/// Majority vote across countries for every date of `closures`, which must
/// be sorted by date.
pub fn global_closure_series(closures: &[SchoolClosureRecord]) -> Result<Vec<SchoolClosureRecord>> {
	let mut result = Vec::new();
	let mut iter = closures.iter();
	let first = match iter.next() {
		Some(v) => v,
		None => return Ok(result),
	};
	let mut current = first.date;
	let mut counts: EnumMap<ClosureStatus, usize> = EnumMap::default();
	counts[first.status] += 1;
	for rec in iter {
		if rec.date < current {
			return Err(Error::UnsortedClosures{
				previous: current,
				found: rec.date,
			})
		}
		if rec.date != current {
			result.push(SchoolClosureRecord::global(current, majority_status(&counts)));
			counts = EnumMap::default();
			current = rec.date;
		}
		counts[rec.status] += 1;
	}
	result.push(SchoolClosureRecord::global(current, majority_status(&counts)));
	Ok(result)
}

/// Per-date increments of a cumulative series; the first entry is zero.
/// Negative values are retractions in the source data. Steps beyond the
/// range of `i64` saturate.
pub fn daily_increase(series: &[CovidCaseRecord]) -> Vec<i64> {
	let mut result = Vec::with_capacity(series.len());
	let mut prev: Option<u64> = None;
	for r in series.iter() {
		result.push(match prev {
			Some(p) if r.cases >= p => i64::try_from(r.cases - p).unwrap_or(i64::MAX),
			Some(p) => i64::try_from(p - r.cases).map(|d| -d).unwrap_or(i64::MIN),
			None => 0,
		});
		prev = Some(r.cases);
	}
	result
}

/// The latest entry on or before `date`, falling back to the first entry if
/// `date` precedes the series. `series` must be sorted by date.
pub fn nearest_on_or_before<T: TimeBased>(series: &[T], date: NaiveDate) -> Option<&T> {
	let i = lower_bound(series, |r| r.date(), &date);
	if i < series.len() && series[i].date() == date {
		return Some(&series[i])
	}
	if i > 0 {
		return Some(&series[i-1])
	}
	series.first()
}
