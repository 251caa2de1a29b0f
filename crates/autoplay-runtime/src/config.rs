//! Autoplay configuration
//!
//! Settings arrive in layers: built-in defaults, a page-wide settings
//! object, then the data attributes of each plugin element. Later layers
//! win. Values are validated while merging; anything unusable falls back
//! to its default with a warning so it can never reach the cycle clock.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use autoplay_core::{AutoplayError, AutoplayResult, Direction};
use autoplay_state::TabPolicy;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Number, Value};
use tracing::warn;

/// Default cycle length
pub const DEFAULT_CYCLE: Duration = Duration::from_secs(3);

/// Default viewport margin for the visibility source
pub const DEFAULT_ROOT_MARGIN: &str = "-75px 0px -75px 0px";

/// Default direction token
pub const DEFAULT_DIRECTION: &str = "forwards";

/// Dataset key that may legitimately be empty (empty means the default section)
const SECTION_KEY: &str = "section";

/// A duration as written in settings: bare seconds or text
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawDuration {
    Seconds(f64),
    Text(String),
}

impl RawDuration {
    /// Parse into a usable cycle length
    ///
    /// Numbers and numeric strings are seconds; other strings are read as
    /// human durations (`"2500ms"`, `"4s"`). NaN, infinite, zero and
    /// negative values are rejected.
    pub fn parse(&self) -> AutoplayResult<Duration> {
        match self {
            RawDuration::Seconds(secs) => seconds(*secs),
            RawDuration::Text(text) => {
                let text = text.trim();
                if let Ok(secs) = text.parse::<f64>() {
                    return seconds(secs);
                }
                let duration = humantime::parse_duration(text)
                    .map_err(|e| AutoplayError::InvalidDuration(format!("{text:?}: {e}")))?;
                if duration.is_zero() {
                    return Err(AutoplayError::InvalidDuration(format!("{text:?}")));
                }
                Ok(duration)
            }
        }
    }
}

fn seconds(secs: f64) -> AutoplayResult<Duration> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(AutoplayError::InvalidDuration(secs.to_string()));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| AutoplayError::InvalidDuration(e.to_string()))
}

/// A boolean as written in settings: a JSON bool or text
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawFlag {
    Bool(bool),
    Text(String),
}

impl RawFlag {
    /// Only `"true"` (any case) counts as true for text
    pub fn value(&self) -> bool {
        match self {
            RawFlag::Bool(b) => *b,
            RawFlag::Text(text) => text.trim().eq_ignore_ascii_case("true"),
        }
    }
}

/// A direction token as written in settings: text or a bare number (`0`)
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawToken {
    Number(Number),
    Text(String),
}

impl fmt::Display for RawToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawToken::Number(n) => write!(f, "{n}"),
            RawToken::Text(text) => f.write_str(text),
        }
    }
}

/// Read one setting, dropping it with a warning if its value has the
/// wrong shape so the rest of the layer still applies
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            warn!(error = %e, %value, "ignoring unreadable setting");
            Ok(None)
        }
    }
}

/// One layer of settings, every option optional
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigLayer {
    #[serde(alias = "timing", deserialize_with = "lenient")]
    pub cycle_duration_seconds: Option<RawDuration>,
    #[serde(deserialize_with = "lenient")]
    pub direction: Option<RawToken>,
    #[serde(deserialize_with = "lenient")]
    pub root_margin: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub show_controls: Option<RawFlag>,
    #[serde(alias = "playInBackend", deserialize_with = "lenient")]
    pub play_in_background_frame: Option<RawFlag>,
    #[serde(alias = "selectors", alias = "selector", deserialize_with = "lenient")]
    pub section: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub tab_policy: Option<String>,
}

impl ConfigLayer {
    /// Read a layer from a settings object
    ///
    /// Unknown keys are ignored and values of the wrong shape are dropped
    /// one by one; only a non-object fails.
    pub fn from_json(value: &Value) -> Result<Self, serde_json::Error> {
        ConfigLayer::deserialize(value)
    }

    /// Read a layer from a plugin element's data attributes
    ///
    /// Empty attributes are treated as absent, except the section, where
    /// empty selects the default list section.
    pub fn from_dataset(dataset: &HashMap<String, String>) -> Self {
        let map: Map<String, Value> = dataset
            .iter()
            .filter(|(key, value)| key.as_str() == SECTION_KEY || !value.is_empty())
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect();

        match ConfigLayer::from_json(&Value::Object(map)) {
            Ok(layer) => layer,
            Err(e) => {
                warn!(error = %e, "unreadable data attributes, ignoring layer");
                ConfigLayer::default()
            }
        }
    }
}

/// Fully resolved settings of one plugin element
#[derive(Clone, Debug, PartialEq)]
pub struct AutoplayConfig {
    pub cycle_duration: Duration,
    /// Raw direction token, resolved by [`AutoplayConfig::direction`]
    pub direction_token: String,
    pub root_margin: RootMargin,
    pub show_controls: bool,
    pub play_in_background_frame: bool,
    /// Comma-separated target selectors; empty means the default section
    pub section: String,
    pub tab_policy: TabPolicy,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        AutoplayConfig {
            cycle_duration: DEFAULT_CYCLE,
            direction_token: DEFAULT_DIRECTION.to_string(),
            root_margin: RootMargin::default(),
            show_controls: true,
            play_in_background_frame: true,
            section: String::new(),
            tab_policy: TabPolicy::default(),
        }
    }
}

impl AutoplayConfig {
    /// Defaults overlaid with each layer in turn
    pub fn merge<'a>(layers: impl IntoIterator<Item = &'a ConfigLayer>) -> Self {
        let mut config = AutoplayConfig::default();
        for layer in layers {
            config.apply(layer);
        }
        config
    }

    /// Overlay one layer. Invalid values leave the current value in place.
    pub fn apply(&mut self, layer: &ConfigLayer) {
        if let Some(raw) = &layer.cycle_duration_seconds {
            match raw.parse() {
                Ok(duration) => self.cycle_duration = duration,
                Err(e) => warn!(error = %e, "keeping cycle duration {:?}", self.cycle_duration),
            }
        }
        if let Some(direction) = &layer.direction {
            self.direction_token = direction.to_string();
        }
        if let Some(margin) = &layer.root_margin {
            match margin.parse() {
                Ok(margin) => self.root_margin = margin,
                Err(e) => warn!(error = %e, "keeping root margin {}", self.root_margin),
            }
        }
        if let Some(flag) = &layer.show_controls {
            self.show_controls = flag.value();
        }
        if let Some(flag) = &layer.play_in_background_frame {
            self.play_in_background_frame = flag.value();
        }
        if let Some(section) = &layer.section {
            self.section = section.clone();
        }
        if let Some(policy) = &layer.tab_policy {
            match policy.parse() {
                Ok(policy) => self.tab_policy = policy,
                Err(e) => warn!(error = %e, "keeping tab policy {}", self.tab_policy),
            }
        }
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        Direction::resolve(&self.direction_token)
    }

    /// Target selectors, one engine each
    ///
    /// A section without commas is a single selector, possibly empty.
    pub fn selectors(&self) -> Vec<String> {
        if !self.section.contains(',') {
            return vec![self.section.clone()];
        }
        self.section
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    /// Whether instances may run in this frame
    #[inline]
    pub fn permits_frame(&self, is_top_frame: bool) -> bool {
        is_top_frame || self.play_in_background_frame
    }
}

/// One component of a viewport margin
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarginLength {
    Px(f64),
    Percent(f64),
}

impl FromStr for MarginLength {
    type Err = AutoplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AutoplayError::InvalidRootMargin(s.to_string());
        let (number, make): (&str, fn(f64) -> MarginLength) = if let Some(n) = s.strip_suffix("px") {
            (n, MarginLength::Px)
        } else if let Some(n) = s.strip_suffix('%') {
            (n, MarginLength::Percent)
        } else {
            (s, MarginLength::Px)
        };
        let value: f64 = number.parse().map_err(|_| invalid())?;
        if !value.is_finite() {
            return Err(invalid());
        }
        // Unitless lengths are only valid as zero
        if number.len() == s.len() && value != 0.0 {
            return Err(invalid());
        }
        Ok(make(value))
    }
}

impl fmt::Display for MarginLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarginLength::Px(v) => write!(f, "{v}px"),
            MarginLength::Percent(v) => write!(f, "{v}%"),
        }
    }
}

/// Viewport margin, CSS shorthand order (top, right, bottom, left)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootMargin {
    pub top: MarginLength,
    pub right: MarginLength,
    pub bottom: MarginLength,
    pub left: MarginLength,
}

impl Default for RootMargin {
    fn default() -> Self {
        RootMargin {
            top: MarginLength::Px(-75.0),
            right: MarginLength::Px(0.0),
            bottom: MarginLength::Px(-75.0),
            left: MarginLength::Px(0.0),
        }
    }
}

impl FromStr for RootMargin {
    type Err = AutoplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<MarginLength>, _>>()?;
        let (top, right, bottom, left) = match parts.as_slice() {
            [all] => (*all, *all, *all, *all),
            [v, h] => (*v, *h, *v, *h),
            [t, h, b] => (*t, *h, *b, *h),
            [t, r, b, l] => (*t, *r, *b, *l),
            _ => return Err(AutoplayError::InvalidRootMargin(s.to_string())),
        };
        Ok(RootMargin {
            top,
            right,
            bottom,
            left,
        })
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}
