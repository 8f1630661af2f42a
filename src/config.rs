use std::env;
use std::str::FromStr;

/// Energy and valence assigned to a recommendation when the catalog has
/// no audio features for its track.
pub const DEFAULT_AUDIO_FEATURE: f64 = 0.5;

/// How many entries are returned by the recent list when no limit is given.
pub const DEFAULT_RECENT_LIMIT: u32 = 10;

/// How many tracks are requested per recommendation batch.
pub const DEFAULT_RECOMMENDATION_LIMIT: u8 = 10;

/// How many tracks a search returns when no limit is given.
pub const DEFAULT_SEARCH_LIMIT: u8 = 10;

/// How many of the latest entries feed the daily affirmation.
pub const AFFIRMATION_ENTRY_COUNT: u32 = 5;

/// How many characters of each entry are shown to the affirmation model.
pub const AFFIRMATION_EXCERPT_LENGTH: usize = 50;

/// Returns the value of the named environment variable if it exists or panics.
pub fn get_variable(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("must define {} environment variable", name))
}

/// Returns the value of the named environment variable, or `default`
/// if it isn't set.
pub fn get_variable_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_owned())
}

/// Parses the named environment variable, falling back to `default` if
/// it isn't set. Panics if it is set but can't be parsed.
pub fn parse_variable_or<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .unwrap_or_else(|_| panic!("parse {} environment variable", name)),
        Err(_) => default,
    }
}

/// Runtime settings consulted by the route handlers.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub(crate) recent_limit: u32,
    pub(crate) recommendation_limit: u8,
}

impl Config {
    pub fn new(recent_limit: u32, recommendation_limit: u8) -> Self {
        Self {
            recent_limit,
            recommendation_limit,
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            parse_variable_or("MOODTRACK_RECENT_LIMIT", DEFAULT_RECENT_LIMIT),
            parse_variable_or(
                "MOODTRACK_RECOMMENDATION_LIMIT",
                DEFAULT_RECOMMENDATION_LIMIT,
            ),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_LIMIT, DEFAULT_RECOMMENDATION_LIMIT)
    }
}
