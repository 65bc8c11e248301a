use chrono::{NaiveDate, Utc};

pub mod algorithms;
mod config;
mod context;
mod dataset;
mod error;
mod ioutil;
mod jhu;
mod progress;
mod resources;
mod timeseries;
mod unesco;

pub use config::*;
pub use context::*;
pub use dataset::*;
pub use error::*;
pub use ioutil::{magic_open, size_hint};
pub use jhu::*;
pub use progress::*;
pub use resources::*;
pub use timeseries::*;
pub use unesco::*;


pub fn naive_today() -> NaiveDate {
	Utc::now().date_naive()
}
