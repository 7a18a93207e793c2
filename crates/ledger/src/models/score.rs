//! Match result model.
//!
//! Results are stored in the ledger as compact strings: `"3:2"` for a
//! regulation finish, `"3:2 OT (Ак Барс)"` / `"3:2 Б (Ак Барс)"` for
//! overtime and shootout finishes with the winning side annotated.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How the match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Finish {
    Regulation,
    Overtime,
    Shootout,
}

impl Finish {
    /// Ledger marker for this finish; regulation has none.
    #[must_use]
    pub fn marker(self) -> Option<&'static str> {
        match self {
            Self::Regulation => None,
            Self::Overtime => Some("OT"),
            Self::Shootout => Some("Б"),
        }
    }
}

/// A match result as read from the results feed.
///
/// For overtime/shootout finishes the goals here are the regulation score
/// where the feed variant allows recovering it; the ledger treats those
/// matches as draws at regulation regardless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreLine {
    pub home: u32,
    pub away: u32,
    pub finish: Finish,
    /// Winning team for overtime/shootout finishes, when identified.
    pub winner: Option<String>,
}

impl ScoreLine {
    /// A regulation-time result.
    #[must_use]
    pub fn regulation(home: u32, away: u32) -> Self {
        Self {
            home,
            away,
            finish: Finish::Regulation,
            winner: None,
        }
    }

    /// An overtime or shootout result with an optional winner annotation.
    #[must_use]
    pub fn extra_time(home: u32, away: u32, finish: Finish, winner: Option<String>) -> Self {
        Self {
            home,
            away,
            finish,
            winner,
        }
    }

    /// Combined goal count, used for total (over/under) settlement.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.home + self.away
    }

    /// True for overtime and shootout finishes.
    #[must_use]
    pub fn is_extra_time(&self) -> bool {
        self.finish != Finish::Regulation
    }

    /// Parses a ledger result string. Accepts Latin and Cyrillic overtime
    /// markers (`OT`/`ОТ`) and shootout markers (`Б`/`B`).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (score_part, rest) = match s.split_once(' ') {
            Some((head, tail)) => (head, tail.trim()),
            None => (s, ""),
        };

        let (home_str, away_str) = score_part.split_once(':')?;
        let home: u32 = home_str.trim().parse().ok()?;
        let away: u32 = away_str.trim().parse().ok()?;

        if rest.is_empty() {
            return Some(Self::regulation(home, away));
        }

        let (marker, winner_part) = match rest.split_once(' ') {
            Some((marker, tail)) => (marker, tail.trim()),
            None => (rest, ""),
        };

        let finish = match marker {
            "OT" | "ОТ" => Finish::Overtime,
            "Б" | "B" => Finish::Shootout,
            _ => return None,
        };

        let winner = winner_part
            .strip_prefix('(')
            .and_then(|w| w.strip_suffix(')'))
            .map(str::to_string);

        Some(Self::extra_time(home, away, finish, winner))
    }
}

impl fmt::Display for ScoreLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.home, self.away)?;
        if let Some(marker) = self.finish.marker() {
            write!(f, " {marker}")?;
            if let Some(winner) = &self.winner {
                write!(f, " ({winner})")?;
            }
        }
        Ok(())
    }
}
