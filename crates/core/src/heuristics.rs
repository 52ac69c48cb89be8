//! Show/season/episode extraction from torrent and file names.
//!
//! These are best-effort patterns over scene-style names such as
//! `Show.Name.S01E02.1080p.mkv`. They are not a general parser.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use thiserror::Error;

static SEASON_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.*?)S(\d+)").expect("season pattern is valid"));

static EPISODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.*?)S(\d+)\.?E(\d+)").expect("episode pattern is valid"));

/// Errors from name parsing.
#[derive(Debug, Error)]
pub enum HeuristicError {
    /// Name has no `S<nn>` marker.
    #[error("failed to extract TV name/season from name {0}")]
    NoSeason(String),

    /// Name has no `S<nn>E<nn>` marker.
    #[error("failed to extract TV name/season/episode from name {0}")]
    NoEpisode(String),

    /// A numeric component did not fit.
    #[error("failed to convert {component} '{value}' to a number")]
    InvalidNumber {
        component: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Nothing usable before the season marker.
    #[error("no show name before the season marker in {0}")]
    EmptyName(String),
}

/// Show name plus season/episode numbers derived from a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TvInfo {
    pub name: String,
    pub season: u32,
    pub episode: u32,
}

impl TvInfo {
    /// Library file name for this episode, e.g. `Show S01E02.mkv`.
    ///
    /// `ext` includes the leading dot.
    pub fn to_episode_name(&self, ext: &str) -> String {
        format!(
            "{} S{:02}E{:02}{}",
            self.name, self.season, self.episode, ext
        )
    }
}

/// Parses the show name and season from a season pack name like `Show.S01`.
///
/// The episode is left at 0.
pub fn parse_tv_season(name: &str) -> Result<TvInfo, HeuristicError> {
    let caps = SEASON_PATTERN
        .captures(name)
        .ok_or_else(|| HeuristicError::NoSeason(name.to_string()))?;

    Ok(TvInfo {
        name: show_name(&caps[1], name)?,
        season: parse_number("season", &caps[2])?,
        episode: 0,
    })
}

/// Parses show name, season and episode from names like `Show.S01E02.Title`
/// or `Show S01.E02`.
pub fn parse_tv_episode(name: &str) -> Result<TvInfo, HeuristicError> {
    let caps = EPISODE_PATTERN
        .captures(name)
        .ok_or_else(|| HeuristicError::NoEpisode(name.to_string()))?;

    Ok(TvInfo {
        name: show_name(&caps[1], name)?,
        season: parse_number("season", &caps[2])?,
        episode: parse_number("episode", &caps[3])?,
    })
}

// Scene names use dots or underscores between words.
fn show_name(prefix: &str, original: &str) -> Result<String, HeuristicError> {
    let cleaned = prefix.replace(['.', '_'], " ");
    let cleaned = cleaned.trim_matches(|c: char| c.is_whitespace() || c == '-');
    if cleaned.is_empty() {
        return Err(HeuristicError::EmptyName(original.to_string()));
    }
    Ok(cleaned.to_string())
}

fn parse_number(component: &'static str, value: &str) -> Result<u32, HeuristicError> {
    value
        .parse::<u32>()
        .map_err(|source| HeuristicError::InvalidNumber {
            component,
            value: value.to_string(),
            source,
        })
}
