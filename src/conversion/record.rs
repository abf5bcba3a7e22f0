use std::collections::HashMap;

use serde::Deserialize;

use super::ConversionError;

/// Header names of the vereinsflieger.de flight list export.
pub mod flight {
    pub const REGISTRATION: &str = "Lfz.";
    pub const DATE: &str = "Datum";
    pub const START_TIME: &str = "Start";
    pub const LANDING_TIME: &str = "Landung";
    pub const DURATION: &str = "Zeit";
    pub const START_LOCATION: &str = "Startort";
    pub const LANDING_LOCATION: &str = "Landeort";
    pub const LANDINGS: &str = "Landungen";
    pub const BILLING: &str = "Abr.";
    pub const PILOT: &str = "Pilot";
    pub const COPILOT: &str = "Begleiter/FI";
    pub const REMARK: &str = "Bemerkung";
    pub const TOW_HEIGHT: &str = "Schlepphöhe";
    pub const ENGINE_START: &str = "Motorzähler Start";
    pub const ENGINE_END: &str = "Motorzähler Ende";
    pub const FLIGHT_TYPE: &str = "Flugart";
    pub const START_TYPE: &str = "S.-Art";
    pub const TOW_AIRCRAFT: &str = "Schlepp-Lfz";
}

/// Header names of the membership export.
pub mod member {
    pub const ID: &str = "Mitgliedsnummer";
    pub const COST_TIER: &str = "Kostenstufe";
    pub const LAST_NAME: &str = "Nachname";
    pub const FIRST_NAME: &str = "Vorname";
}

/// One CSV row keyed by header name.
///
/// A key is absent when the row was shorter than the header, which is
/// different from a present but empty value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Record(HashMap<String, String>);

impl Record {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn field(&self, name: &str) -> Result<&str, ConversionError> {
        self.get(name).ok_or_else(|| ConversionError::missing(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        self.0.insert(name.to_string(), value.to_string());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
