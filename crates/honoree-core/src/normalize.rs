//! Input name cleaning and highway/person detection.
//!
//! Memorial highway designations such as `"Trooper Jane Doe Memorial Highway"`
//! carry the honoree's name between a rank prefix and a road suffix. Highway
//! cleaning strips one trailing road suffix (optionally preceded by
//! `Memorial` or `Historic`) and unambiguous leading ranks, as long as a
//! name of at least two words is left. Person names
//! only lose punctuation and redundant whitespace.

use crate::error::CoreError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

const ROAD_SUFFIXES: &str = "Trail|GreeneWay|Overpass|Beltway|Roadway|Interchange|Corridor|\
                             Expressway|Intersection|Road|Causeway|Street|Drive|Highway|\
                             Boulevard|Way|Parkway|Bridge|Avenue|Lane";

const HIGHWAY_KEYWORDS: &str = "highway|boulevard|street|road|roadway|avenue|lane|drive|parkway|\
                                way|bridge|trail|expressway|beltway|corridor|interchange|\
                                causeway|overpass|greeneway|intersection";

/// Ranks and titles dropped from the front of a highway designation.
///
/// Only words that are never given names or surnames: "Chief", "Major" or
/// "Officer" can belong to the honoree's name and are kept.
const LEADING_TITLES: &[&str] = &[
    "trooper",
    "patrolman",
    "deputy",
    "detective",
    "sergeant",
    "sgt",
    "corporal",
    "cpl",
    "lieutenant",
    "lt",
    "capt",
    "pvt",
    "spc",
    "honorable",
    "hon",
    "dr",
];

/// Titles are only dropped while this many name words remain after them.
const MIN_NAME_WORDS: usize = 2;

fn suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?i)\s+((Memorial|Historic)\s+)?({ROAD_SUFFIXES})$"))
            .expect("road suffix regex is valid")
    })
}

fn keyword_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?i)\b({HIGHWAY_KEYWORDS})\b")).expect("keyword regex is valid")
    })
}

fn punctuation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s]").expect("punctuation regex is valid"))
}

/// What an input string turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Person,
    Highway,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Person => "person",
            InputKind::Highway => "highway",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the caller wants inputs interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    Person,
    Highway,
    #[default]
    Auto,
}

impl FromStr for InputMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "person" => Ok(InputMode::Person),
            "highway" => Ok(InputMode::Highway),
            "auto" => Ok(InputMode::Auto),
            other => Err(CoreError::UnknownInputMode(other.to_string())),
        }
    }
}

/// A cleaned input name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedName {
    /// The input exactly as given.
    pub raw: String,
    /// The extracted person name.
    pub cleaned: String,
    pub kind: InputKind,
}

/// Classify a string as a highway designation if it contains a road keyword.
pub fn detect_kind(input: &str) -> InputKind {
    if keyword_re().is_match(input) {
        InputKind::Highway
    } else {
        InputKind::Person
    }
}

/// Extract the person's name from a highway designation.
pub fn clean_highway_name(designation: &str) -> String {
    let text = normalize_quotes(designation.trim());
    let without_suffix = suffix_re().replace(&text, "");
    let cleaned = strip_punctuation(&without_suffix);
    strip_leading_titles(&cleaned)
}

/// Tidy a person name: punctuation removed, whitespace collapsed.
pub fn clean_person_name(name: &str) -> String {
    strip_punctuation(&normalize_quotes(name))
}

/// Clean `raw` according to `mode`.
///
/// Never fails: if cleaning leaves nothing, the trimmed input is kept.
pub fn normalize(raw: &str, mode: InputMode) -> NormalizedName {
    let kind = match mode {
        InputMode::Person => InputKind::Person,
        InputMode::Highway => InputKind::Highway,
        InputMode::Auto => detect_kind(raw),
    };

    let cleaned = match kind {
        InputKind::Highway => clean_highway_name(raw),
        InputKind::Person => clean_person_name(raw),
    };

    let cleaned = if cleaned.is_empty() {
        raw.trim().to_string()
    } else {
        cleaned
    };

    NormalizedName {
        raw: raw.to_string(),
        cleaned,
        kind,
    }
}

fn normalize_quotes(text: &str) -> String {
    text.replace(['\u{2019}', '\u{2018}'], "'")
        .replace(['\u{201C}', '\u{201D}'], "\"")
}

fn strip_punctuation(text: &str) -> String {
    let stripped = punctuation_re().replace_all(text, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_leading_titles(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    let mut skip = 0;
    while skip < words.len()
        && words.len() - skip > MIN_NAME_WORDS
        && LEADING_TITLES.contains(&words[skip].to_lowercase().as_str())
    {
        skip += 1;
    }
    words[skip..].join(" ")
}
