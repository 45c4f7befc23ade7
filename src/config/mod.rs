use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::errors::{EngineError, EngineResult};

const DEFAULT_DIR_NAME: &str = ".budget_engine";
const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";
const HOME_ENV: &str = "BUDGET_ENGINE_HOME";

pub const MIN_MONTH_START_DAY: u8 = 1;
pub const MAX_MONTH_START_DAY: u8 = 28;

/// User calendar preferences read by the period calculator.
///
/// `first_weekday` follows the 1 = Sunday ... 7 = Saturday convention and
/// `first_day_of_month` is limited to 1..=28 so every month contains it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarConfig {
    pub first_weekday: u8,
    pub first_day_of_month: u8,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            first_weekday: 1,
            first_day_of_month: 1,
        }
    }
}

impl CalendarConfig {
    /// Builds a config, clamping out-of-range values instead of failing.
    pub fn new(first_weekday: u8, first_day_of_month: u8) -> Self {
        Self {
            first_weekday,
            first_day_of_month,
        }
        .normalized()
    }

    /// Strict constructor that reports out-of-range values.
    pub fn try_new(first_weekday: u8, first_day_of_month: u8) -> EngineResult<Self> {
        if !(1..=7).contains(&first_weekday) {
            return Err(EngineError::InvalidConfiguration(format!(
                "first weekday {first_weekday} outside 1..=7"
            )));
        }
        if !(MIN_MONTH_START_DAY..=MAX_MONTH_START_DAY).contains(&first_day_of_month) {
            return Err(EngineError::InvalidConfiguration(format!(
                "first day of month {first_day_of_month} outside {MIN_MONTH_START_DAY}..={MAX_MONTH_START_DAY}"
            )));
        }
        Ok(Self {
            first_weekday,
            first_day_of_month,
        })
    }

    /// Returns a copy with both settings clamped into range, warning when anything changed.
    pub fn normalized(self) -> Self {
        let clamped = self.clamped();
        if clamped != self {
            tracing::warn!(
                first_weekday = self.first_weekday,
                first_day_of_month = self.first_day_of_month,
                "calendar configuration out of range, clamping"
            );
        }
        clamped
    }

    fn clamped(self) -> Self {
        Self {
            first_weekday: self.first_weekday.clamp(1, 7),
            first_day_of_month: self
                .first_day_of_month
                .clamp(MIN_MONTH_START_DAY, MAX_MONTH_START_DAY),
        }
    }

    pub fn week_start(&self) -> Weekday {
        match self.clamped().first_weekday {
            1 => Weekday::Sun,
            2 => Weekday::Mon,
            3 => Weekday::Tue,
            4 => Weekday::Wed,
            5 => Weekday::Thu,
            6 => Weekday::Fri,
            _ => Weekday::Sat,
        }
    }

    pub fn month_start_day(&self) -> u32 {
        u32::from(self.clamped().first_day_of_month)
    }
}

/// Persisted engine preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_path: Option<PathBuf>,
}

/// Returns the application data directory, defaulting to `~/.budget_engine`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Loads and saves [`Config`] under a base directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> EngineResult<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> EngineResult<Self> {
        fs::create_dir_all(&base)?;
        Ok(Self {
            path: base.join(CONFIG_FILE),
        })
    }

    pub fn load(&self) -> EngineResult<Config> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            let mut config: Config = serde_json::from_str(&data)?;
            config.calendar = config.calendar.normalized();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> EngineResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        let mut file = File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use tempfile::tempdir;
    use tracing_subscriber::{layer::Context, prelude::*, Layer};

    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn clamps_month_start_day() {
        assert_eq!(CalendarConfig::new(1, 31).first_day_of_month, 28);
        assert_eq!(CalendarConfig::new(1, 0).first_day_of_month, 1);
        assert_eq!(CalendarConfig::new(9, 5).first_weekday, 7);
    }

    #[test]
    fn accessors_clamp_without_warning_again() {
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(warnings.clone()));
        tracing::subscriber::with_default(subscriber, || {
            let raw = CalendarConfig {
                first_weekday: 0,
                first_day_of_month: 40,
            };
            for _ in 0..3 {
                assert_eq!(raw.week_start(), Weekday::Sun);
                assert_eq!(raw.month_start_day(), 28);
            }
            assert_eq!(warnings.load(Ordering::SeqCst), 0);

            let normalized = raw.normalized();
            assert_eq!(normalized, CalendarConfig::new(1, 28));
            assert_eq!(warnings.load(Ordering::SeqCst), 1);
        });
    }

    #[test]
    fn strict_constructor_rejects_out_of_range() {
        let err = CalendarConfig::try_new(1, 29).expect_err("29 is out of range");
        assert!(matches!(err, EngineError::InvalidConfiguration(_)));
        assert!(CalendarConfig::try_new(2, 28).is_ok());
    }

    #[test]
    fn maps_weekday_codes() {
        assert_eq!(CalendarConfig::new(1, 1).week_start(), Weekday::Sun);
        assert_eq!(CalendarConfig::new(2, 1).week_start(), Weekday::Mon);
        assert_eq!(CalendarConfig::new(7, 1).week_start(), Weekday::Sat);
    }

    #[test]
    fn manager_round_trips_config() {
        let dir = tempdir().expect("tempdir");
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
        assert_eq!(manager.load().expect("default"), Config::default());

        let config = Config {
            calendar: CalendarConfig::new(2, 15),
            ledger_path: Some(dir.path().join("ledger.json")),
        };
        manager.save(&config).expect("save");
        assert_eq!(manager.load().expect("load"), config);
    }
}
