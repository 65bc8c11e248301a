use std::env;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;

use serde::{Serialize, Deserialize};

use super::dataset::DataFiles;
use super::error::Result;
use super::resources::ResourceConfig;


pub static CONFIG_ENV: &str = "COVID_CLOSURES_CONFIG";
pub static DATA_DIR_ENV: &str = "COVID_CLOSURES_DATA_DIR";
pub static DEFAULT_CONFIG_PATH: &str = "resources/config.json";

pub static COVID_GLOBAL_RESOURCE: &str = "covid_global";
pub static COVID_REGIONAL_RESOURCE: &str = "covid_regional";
pub static CLOSURE_RESOURCE: &str = "closure";


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
	pub resource: ResourceConfig,
}

impl Config {
	pub fn from_reader<R: io::Read>(r: R) -> Result<Self> {
		Ok(serde_json::from_reader(io::BufReader::new(r))?)
	}

	pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
		let path = path.as_ref();
		debug!("reading configuration from {}", path.display());
		Self::from_reader(fs::File::open(path)?)
	}

	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let path = path.as_ref();
		debug!("writing configuration to {}", path.display());
		let mut w = io::BufWriter::new(fs::File::create(path)?);
		serde_json::to_writer_pretty(&mut w, self)?;
		w.flush()?;
		Ok(())
	}

	/// The file named by `COVID_CLOSURES_CONFIG`, or the default path.
	pub fn env_path() -> PathBuf {
		env::var_os(CONFIG_ENV)
			.map(PathBuf::from)
			.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
	}

	/// Reads the file at [`Config::env_path`] and applies
	/// `COVID_CLOSURES_DATA_DIR` if set.
	pub fn from_env() -> Result<Self> {
		let mut config = Self::from_path(Self::env_path())?;
		if let Some(dir) = env::var_os(DATA_DIR_ENV) {
			config.relocate(&dir);
		}
		Ok(config)
	}

	/// Moves every resource into `dir`, keeping its file name.
	pub fn relocate<P: AsRef<OsStr> + ?Sized>(&mut self, dir: &P) {
		let dir = Path::new(dir);
		for resource in self.resource.resources.iter_mut() {
			let file_name = match resource.local_path.file_name() {
				Some(v) => v.to_os_string(),
				None => continue,
			};
			resource.local_path = dir.join(file_name);
		}
	}

	pub fn data_files(&self) -> Result<DataFiles> {
		Ok(DataFiles{
			global_covid: self.resource.get(COVID_GLOBAL_RESOURCE)?.local_path.clone(),
			regional_covid: self.resource.get(COVID_REGIONAL_RESOURCE)?.local_path.clone(),
			closures: self.resource.get(CLOSURE_RESOURCE)?.local_path.clone(),
		})
	}
}
