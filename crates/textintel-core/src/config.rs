//! Config - 環境変数からの設定読み込み
//!
//! Every knob has a default; only malformed values are errors.

use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379/0";
pub const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(86_400);
pub const DEFAULT_JOB_STATUS_TTL: Duration = Duration::from_secs(3_600);
pub const DEFAULT_JOB_RESULT_TTL: Duration = Duration::from_secs(3_600);

/// Queue name shared by the API and worker processes.
pub const QUEUE_NAME: &str = "genai";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Redis,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(()),
        }
    }
}

/// TTLs applied to cache entries and job records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ttls {
    pub cache: Duration,
    pub job_status: Duration,
    pub job_result: Duration,
}

impl Default for Ttls {
    fn default() -> Self {
        Self {
            cache: DEFAULT_CACHE_TTL,
            job_status: DEFAULT_JOB_STATUS_TTL,
            job_result: DEFAULT_JOB_RESULT_TTL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub redis_url: String,
    pub store_backend: StoreBackend,
    pub ttls: Ttls,
    pub inference_url: String,
    pub inference_token: Option<String>,
    /// `None` disables the per-call timeout.
    pub inference_timeout: Option<Duration>,
    pub host: String,
    pub port: u16,
    pub worker_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: DEFAULT_REDIS_URL.to_string(),
            store_backend: StoreBackend::default(),
            ttls: Ttls::default(),
            inference_url: DEFAULT_INFERENCE_URL.to_string(),
            inference_token: None,
            inference_timeout: None,
            host: "0.0.0.0".to_string(),
            port: 8000,
            worker_concurrency: 1,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let store_backend = match get("STORE_BACKEND") {
            Some(raw) => raw.parse::<StoreBackend>().map_err(|()| ConfigError::Invalid {
                var: "STORE_BACKEND",
                expected: "`redis` or `memory`",
                value: raw,
            })?,
            None => defaults.store_backend,
        };

        let ttls = Ttls {
            cache: seconds(&get, "CACHE_TTL")?.unwrap_or(DEFAULT_CACHE_TTL),
            job_status: seconds(&get, "JOB_STATUS_TTL")?.unwrap_or(DEFAULT_JOB_STATUS_TTL),
            job_result: seconds(&get, "JOB_RESULT_TTL")?.unwrap_or(DEFAULT_JOB_RESULT_TTL),
        };
        let inference_timeout = seconds(&get, "INFERENCE_TIMEOUT_SECS")?.filter(|d| !d.is_zero());

        let port = number::<u16>(&get, "TEXTINTEL_PORT", "a port number")?.unwrap_or(defaults.port);
        let worker_concurrency =
            number::<usize>(&get, "WORKER_CONCURRENCY", "a positive integer")?
                .unwrap_or(defaults.worker_concurrency);
        if worker_concurrency == 0 {
            return Err(ConfigError::Invalid {
                var: "WORKER_CONCURRENCY",
                expected: "a positive integer",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            redis_url: get("REDIS_URL").unwrap_or(defaults.redis_url),
            store_backend,
            ttls,
            inference_url: get("INFERENCE_URL").unwrap_or(defaults.inference_url),
            inference_token: get("INFERENCE_TOKEN"),
            inference_timeout,
            host: get("TEXTINTEL_HOST").unwrap_or(defaults.host),
            port,
            worker_concurrency,
        })
    }
}

fn number<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError> {
    get(var)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
                var,
                expected,
                value: raw,
            })
        })
        .transpose()
}

fn seconds(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<Duration>, ConfigError> {
    Ok(number::<u64>(get, var, "a whole number of seconds")?.map(Duration::from_secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| vars.get(k).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.ttls.cache, Duration::from_secs(86_400));
        assert_eq!(config.inference_timeout, None);
    }

    #[test]
    fn variables_override_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("REDIS_URL", "redis://cache:6379/2"),
            ("CACHE_TTL", "60"),
            ("JOB_RESULT_TTL", "120"),
            ("INFERENCE_TIMEOUT_SECS", "30"),
            ("INFERENCE_TOKEN", "hf_abc"),
            ("STORE_BACKEND", "Memory"),
            ("TEXTINTEL_PORT", "9000"),
            ("WORKER_CONCURRENCY", "4"),
        ]))
        .unwrap();
        assert_eq!(config.redis_url, "redis://cache:6379/2");
        assert_eq!(config.ttls.cache, Duration::from_secs(60));
        assert_eq!(config.ttls.job_status, DEFAULT_JOB_STATUS_TTL);
        assert_eq!(config.ttls.job_result, Duration::from_secs(120));
        assert_eq!(config.inference_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.inference_token.as_deref(), Some("hf_abc"));
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.port, 9000);
        assert_eq!(config.worker_concurrency, 4);
    }

    #[test]
    fn zero_timeout_disables_it() {
        let config = Config::from_lookup(lookup(&[("INFERENCE_TIMEOUT_SECS", "0")])).unwrap();
        assert_eq!(config.inference_timeout, None);
    }

    #[rstest]
    #[case("CACHE_TTL", "a day")]
    #[case("JOB_STATUS_TTL", "-1")]
    #[case("TEXTINTEL_PORT", "70000")]
    #[case("WORKER_CONCURRENCY", "0")]
    #[case("STORE_BACKEND", "postgres")]
    fn malformed_values_are_rejected(#[case] var: &'static str, #[case] value: &str) {
        let err = Config::from_lookup(lookup(&[(var, value)])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: v, .. } if v == var));
    }
}
