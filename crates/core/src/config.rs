//! Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::league::League;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub scrape: ScrapeConfig,
    pub reconcile: ReconcileConfig,
    pub leagues: LeaguesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the per-league CSV ledgers and debug artifacts.
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Soft bound on the page-ready wait; the run continues on expiry.
    pub page_load_timeout_secs: u64,
    /// Default browser mode for triggered runs.
    pub headless: bool,
    /// Directory of saved page trees used by the fixture provider.
    pub fixture_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// A match must have started at least this long ago to be settled.
    pub min_age_hours: i64,
    /// Matches older than this are abandoned (left unsettled forever).
    pub max_age_days: i64,
    /// Total line assumed when the ledger value is missing or non-numeric.
    pub default_total_line: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaguesConfig {
    pub khl: LeagueEndpoints,
    pub nhl: LeagueEndpoints,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueEndpoints {
    /// Upcoming-fixtures page with current odds.
    pub odds_url: String,
    /// Results page; a `?date=YYYY-MM-DD` query selects the day.
    pub results_url: String,
}

impl AppConfig {
    /// Endpoints for the given league.
    #[must_use]
    pub fn endpoints(&self, league: League) -> &LeagueEndpoints {
        match league {
            League::Khl => &self.leagues.khl,
            League::Nhl => &self.leagues.nhl,
        }
    }

    /// Absolute path of a ledger or artifact file under the data directory.
    #[must_use]
    pub fn data_path(&self, file_name: &str) -> PathBuf {
        self.storage.data_dir.join(file_name)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            storage: StorageConfig {
                data_dir: PathBuf::from("data"),
            },
            scrape: ScrapeConfig {
                page_load_timeout_secs: 10,
                headless: true,
                fixture_dir: PathBuf::from("fixtures"),
            },
            reconcile: ReconcileConfig {
                min_age_hours: 2,
                max_age_days: 3,
                default_total_line: 5.5,
            },
            leagues: LeaguesConfig {
                khl: LeagueEndpoints {
                    odds_url: "https://fon.bet/sports/hockey/tournament/776".to_string(),
                    results_url: "https://fon.bet/results/hockey/13283".to_string(),
                },
                nhl: LeagueEndpoints {
                    odds_url: "https://fon.bet/sports/hockey/tournament/777".to_string(),
                    results_url: "https://fon.bet/results/hockey/11781".to_string(),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.reconcile.min_age_hours, 2);
        assert_eq!(config.reconcile.max_age_days, 3);
        assert!((config.reconcile.default_total_line - 5.5).abs() < f64::EPSILON);
        assert_eq!(config.scrape.page_load_timeout_secs, 10);
    }

    #[test]
    fn test_endpoints_per_league() {
        let config = AppConfig::default();
        assert!(config.endpoints(League::Khl).results_url.contains("13283"));
        assert!(config.endpoints(League::Nhl).results_url.contains("11781"));
    }

    #[test]
    fn test_data_path() {
        let config = AppConfig::default();
        let path = config.data_path(&League::Khl.odds_file());
        assert!(path.ends_with("data/khl_odds.csv"));
    }
}
