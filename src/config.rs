use crate::error::{
    BadEnvVarSnafu, InvertedDelaySnafu, ParseDelaySnafu, ParseProbabilitySnafu,
    ProbabilityOutOfRangeSnafu, RosterResult,
};
use dotenvy::var;
use snafu::{ResultExt, ensure};
use std::{env::VarError, path::PathBuf, sync::Arc, time::Duration};

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    server_ip: String,
    storage_dir: Option<PathBuf>,
    simulation: Arc<SimulationConfig>,
}

impl RuntimeConfiguration {
    pub fn new() -> RosterResult<Self> {
        Self::from_lookup(|name| var(name))
    }

    /// Builds the configuration from `lookup` instead of the process environment.
    pub fn from_lookup(
        lookup: impl Fn(&'static str) -> Result<String, dotenvy::Error>,
    ) -> RosterResult<Self> {
        let get = |name| optional_var(&lookup, name);

        Ok(Self {
            server_ip: get("ROSTER_SERVER_IP")?.unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            storage_dir: get("ROSTER_STORAGE_DIR")?
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            simulation: Arc::new(SimulationConfig::from_lookup(&lookup)?),
        })
    }

    pub fn server_ip(&self) -> &str {
        &self.server_ip
    }

    pub fn storage_dir(&self) -> Option<&PathBuf> {
        self.storage_dir.as_ref()
    }

    pub fn simulation(&self) -> Arc<SimulationConfig> {
        self.simulation.clone()
    }
}

fn optional_var(
    lookup: &impl Fn(&'static str) -> Result<String, dotenvy::Error>,
    name: &'static str,
) -> RosterResult<Option<String>> {
    match lookup(name) {
        Ok(value) => Ok(Some(value)),
        Err(dotenvy::Error::EnvVar(VarError::NotPresent)) => Ok(None),
        Err(e) => Err(e).context(BadEnvVarSnafu { name }),
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    pub const fn millis(min: u64, max: u64) -> Self {
        Self {
            min: Duration::from_millis(min),
            max: Duration::from_millis(max),
        }
    }

    pub const fn fixed(delay: Duration) -> Self {
        Self {
            min: delay,
            max: delay,
        }
    }

    /// Parses `min-max` or a single value, both in milliseconds.
    fn parse(name: &'static str, original: &str) -> RosterResult<Self> {
        let parse_ms = |part: &str| {
            part.trim()
                .parse::<u64>()
                .context(ParseDelaySnafu {
                    name,
                    original: original.to_string(),
                })
        };

        let range = match original.split_once('-') {
            Some((min, max)) => Self::millis(parse_ms(min)?, parse_ms(max)?),
            None => Self::fixed(Duration::from_millis(parse_ms(original)?)),
        };
        ensure!(range.min <= range.max, InvertedDelaySnafu { name });

        Ok(range)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CallProfile {
    pub delay: DelayRange,
    pub failure_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub fetch_courses: CallProfile,
    pub save_student: CallProfile,
    pub update_student: CallProfile,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fetch_courses: CallProfile {
                delay: DelayRange::millis(1_000, 2_000),
                failure_rate: 0.1,
            },
            save_student: CallProfile {
                delay: DelayRange::millis(300, 500),
                failure_rate: 0.05,
            },
            update_student: CallProfile {
                delay: DelayRange::millis(200, 300),
                failure_rate: 0.0,
            },
        }
    }
}

impl SimulationConfig {
    fn from_lookup(
        lookup: &impl Fn(&'static str) -> Result<String, dotenvy::Error>,
    ) -> RosterResult<Self> {
        let mut config = Self::default();

        let delay = |name, slot: &mut DelayRange| -> RosterResult<()> {
            if let Some(raw) = optional_var(lookup, name)? {
                *slot = DelayRange::parse(name, &raw)?;
            }
            Ok(())
        };
        delay("ROSTER_FETCH_DELAY_MS", &mut config.fetch_courses.delay)?;
        delay("ROSTER_SAVE_DELAY_MS", &mut config.save_student.delay)?;
        delay("ROSTER_UPDATE_DELAY_MS", &mut config.update_student.delay)?;

        let probability = |name, slot: &mut f64| -> RosterResult<()> {
            if let Some(raw) = optional_var(lookup, name)? {
                let found = raw.trim().parse::<f64>().context(ParseProbabilitySnafu {
                    name,
                    original: raw.clone(),
                })?;
                ensure!(
                    (0.0..=1.0).contains(&found),
                    ProbabilityOutOfRangeSnafu { name, found }
                );
                *slot = found;
            }
            Ok(())
        };
        probability(
            "ROSTER_FETCH_FAILURE_RATE",
            &mut config.fetch_courses.failure_rate,
        )?;
        probability(
            "ROSTER_SAVE_FAILURE_RATE",
            &mut config.save_student.failure_rate,
        )?;

        Ok(config)
    }
}
