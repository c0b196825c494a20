//! INI file configuration adapter.

use crate::domain::error::EpitomeError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, EpitomeError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| EpitomeError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, EpitomeError> {
        let Some(raw) = self.get_value(section, key) else {
            return Ok(None);
        };
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(EpitomeError::invalid_config(
                section,
                key,
                format!("expected a number, got '{raw}'"),
            )),
        }
    }

    fn get_usize(&self, section: &str, key: &str) -> Result<Option<usize>, EpitomeError> {
        let Some(raw) = self.get_value(section, key) else {
            return Ok(None);
        };
        raw.parse::<usize>().map(Some).map_err(|_| {
            EpitomeError::invalid_config(
                section,
                key,
                format!("expected a non-negative integer, got '{raw}'"),
            )
        })
    }
}
