//! League definitions and per-league conventions.
//!
//! Each league owns a pair of ledger files and a results-feed quirk: the NHL
//! results feed reports the post-overtime score, so the winner's goal count
//! has to be rolled back by one to recover the regulation score.

use std::fmt;
use std::str::FromStr;

/// A hockey league tracked by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum League {
    Khl,
    Nhl,
}

/// How a league's results feed encodes overtime/shootout scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreAdjust {
    /// The feed already shows the regulation score.
    None,
    /// The feed shows the final score; subtract one goal from the winner
    /// to recover the regulation score.
    SubtractWinnerGoal,
}

impl League {
    /// All leagues, in display order.
    pub const ALL: [League; 2] = [League::Khl, League::Nhl];

    /// Short lowercase identifier used in file names and API paths.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Khl => "khl",
            Self::Nhl => "nhl",
        }
    }

    /// Human-readable league name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Khl => "КХЛ",
            Self::Nhl => "НХЛ",
        }
    }

    /// File name of the odds ledger for this league.
    #[must_use]
    pub fn odds_file(self) -> String {
        format!("{}_odds.csv", self.id())
    }

    /// File name of the settled-results ledger for this league.
    #[must_use]
    pub fn results_file(self) -> String {
        format!("{}_results_final.csv", self.id())
    }

    /// File name of the debug artifact written when a page yields nothing.
    #[must_use]
    pub fn debug_page_file(self) -> String {
        format!("debug_{}_page.json", self.id())
    }

    /// Score adjustment required by this league's results feed.
    #[must_use]
    pub fn score_adjust(self) -> ScoreAdjust {
        match self {
            Self::Khl => ScoreAdjust::None,
            Self::Nhl => ScoreAdjust::SubtractWinnerGoal,
        }
    }

    /// Known team name fragments used to filter odds pages down to actual
    /// league fixtures (the odds page mixes in specials and other leagues).
    #[must_use]
    pub fn known_teams(self) -> &'static [&'static str] {
        match self {
            Self::Khl => &[
                "Лада",
                "Сочи",
                "Ак Барс",
                "Барыс",
                "Торпедо",
                "Металлург",
                "Нефтехимик",
                "Амур",
                "Спартак",
                "Дрэгонс",
                "Автомобилист",
                "СКА",
                "Динамо Москва",
                "Салават Юлаев",
                "Трактор",
                "Северсталь",
                "Динамо Минск",
                "Локомотив",
                "ЦСКА",
                "ХК",
            ],
            Self::Nhl => &[
                "Рейнджерс",
                "Айлендерс",
                "Бостон",
                "Баффало",
                "Вашингтон",
                "Вегас",
                "Виннипег",
                "Даллас",
                "Детройт",
                "Калгари",
                "Каролина",
                "Колорадо",
                "Коламбус",
                "Лос-Анджелес",
                "Миннесота",
                "Монреаль",
                "Нэшвилл",
                "Нью-Джерси",
                "Оттава",
                "Питтсбург",
                "Сан-Хосе",
                "Сиэтл",
                "Сент-Луис",
                "Тампа-Бэй",
                "Торонто",
                "Филадельфия",
                "Флорида",
                "Чикаго",
                "Эдмонтон",
                "Юта",
            ],
        }
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for League {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "khl" => Ok(Self::Khl),
            "nhl" => Ok(Self::Nhl),
            other => Err(anyhow::anyhow!("unknown league: {other}")),
        }
    }
}
