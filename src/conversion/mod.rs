use enum_dispatch::enum_dispatch;
use thiserror::Error;

pub mod converter;
pub mod members;
pub mod record;
pub mod rules;


use members::MemberIndex;
use record::Record;
use rules::{
    AbroadFlag, AircraftCategory, BillingCategory, Blank, CrewMember, CrewShare, EngineHours, PilotInCommand,
    Registration, Rule, Towing, Verbatim,
};

#[derive(Debug, PartialEq, Error)]
pub enum ConversionError {
    #[error("missing required field `{field}`")]
    MissingField { field: String },
    #[error("field `{field}` is not a decimal number: {value:?}")]
    MalformedNumber { field: String, value: String },
    #[error("engine hours out of range: {start:?} to {end:?}")]
    EngineHoursOverflow { start: String, end: String },
    #[error("row {row}: {fault}")]
    Row { row: u64, fault: Box<ConversionError> },
}

impl ConversionError {
    pub fn missing(field: &str) -> ConversionError {
        ConversionError::MissingField { field: field.to_string() }
    }

    /// Attaches the 1-based data row number the fault was raised for.
    pub fn at_row(self, row: u64) -> ConversionError {
        ConversionError::Row {
            row,
            fault: Box::new(self),
        }
    }
}

/// Everything a rule may look at while deriving its columns for one flight.
pub struct RowContext<'a> {
    pub flight: &'a Record,
    pub members: Option<&'a MemberIndex>,
}

#[enum_dispatch]
pub trait DeriveColumns {
    /// Number of output columns the rule always contributes.
    fn width(&self) -> usize;

    fn derive(&self, ctx: &RowContext, out: &mut Vec<String>) -> Result<(), ConversionError>;
}
