use std::str::FromStr;

use enum_dispatch::enum_dispatch;
use rust_decimal::Decimal;

use super::record::flight;
use super::{ConversionError, DeriveColumns, RowContext};

pub const UNKNOWN_VALUE: &str = "";

const FLAG_SET: &str = "T";
const ABROAD: &str = "F";
const NO_MARKER_PHRASES: [&str; 2] = ["ohne marke", "keine marke"];
const ENGINE_HOURS_PRECISION: u32 = 2;

#[enum_dispatch(DeriveColumns)]
pub enum Rule {
    Registration,
    Verbatim,
    Blank,
    AbroadFlag,
    BillingCategory,
    PilotInCommand,
    CrewMember,
    CrewShare,
    EngineHours,
    Towing,
    AircraftCategory,
}

/// Country code and registration suffix, split at the first `-`.
pub struct Registration;

impl DeriveColumns for Registration {
    fn width(&self) -> usize {
        2
    }

    fn derive(&self, ctx: &RowContext, out: &mut Vec<String>) -> Result<(), ConversionError> {
        let (country, suffix) = split_registration(ctx.flight.field(flight::REGISTRATION)?);
        out.push(country.to_string());
        out.push(suffix.to_string());

        Ok(())
    }
}

pub fn split_registration(registration: &str) -> (&str, &str) {
    registration.split_once('-').unwrap_or((UNKNOWN_VALUE, registration))
}

/// Copies a source field unchanged.
pub struct Verbatim {
    field: &'static str,
}

impl Verbatim {
    pub fn new(field: &'static str) -> Verbatim {
        Verbatim { field }
    }
}

impl DeriveColumns for Verbatim {
    fn width(&self) -> usize {
        1
    }

    fn derive(&self, ctx: &RowContext, out: &mut Vec<String>) -> Result<(), ConversionError> {
        out.push(ctx.flight.field(self.field)?.to_string());

        Ok(())
    }
}

/// Columns the export has no data for, or whose rule is switched off.
pub struct Blank {
    columns: usize,
}

impl Blank {
    pub fn new(columns: usize) -> Blank {
        Blank { columns }
    }
}

impl DeriveColumns for Blank {
    fn width(&self) -> usize {
        self.columns
    }

    fn derive(&self, _ctx: &RowContext, out: &mut Vec<String>) -> Result<(), ConversionError> {
        out.resize(out.len() + self.columns, UNKNOWN_VALUE.to_string());

        Ok(())
    }
}

pub struct AbroadFlag;

impl DeriveColumns for AbroadFlag {
    fn width(&self) -> usize {
        1
    }

    fn derive(&self, _ctx: &RowContext, out: &mut Vec<String>) -> Result<(), ConversionError> {
        out.push(ABROAD.to_string());

        Ok(())
    }
}

/// ameavia price category.
///
/// The club rate always wins. Otherwise the flight type decides, unless
/// `by_flight_type` is off, in which case only club-rate flights get a
/// category.
pub struct BillingCategory {
    by_flight_type: bool,
}

impl BillingCategory {
    pub fn new(by_flight_type: bool) -> BillingCategory {
        BillingCategory { by_flight_type }
    }
}

impl DeriveColumns for BillingCategory {
    fn width(&self) -> usize {
        1
    }

    fn derive(&self, ctx: &RowContext, out: &mut Vec<String>) -> Result<(), ConversionError> {
        let billing = ctx.flight.field(flight::BILLING)?;
        let flight_type = if self.by_flight_type {
            Some(ctx.flight.field(flight::FLIGHT_TYPE)?)
        } else {
            None
        };

        out.push(billing_category(billing, flight_type).to_string());

        Ok(())
    }
}

pub fn billing_category(billing: &str, flight_type: Option<&str>) -> &'static str {
    if billing == "K" {
        return "X";
    }

    match flight_type {
        Some("C" | "S" | "N") => "C",
        Some("P") => "G",
        Some("W") => "X",
        _ => UNKNOWN_VALUE,
    }
}

/// Marks the pilot seat as pilot in command.
///
/// Set whenever the flight has a pilot field, whether or not the name
/// resolves to a member ID.
pub struct PilotInCommand;

impl DeriveColumns for PilotInCommand {
    fn width(&self) -> usize {
        1
    }

    fn derive(&self, ctx: &RowContext, out: &mut Vec<String>) -> Result<(), ConversionError> {
        ctx.flight.field(flight::PILOT)?;
        out.push(FLAG_SET.to_string());

        Ok(())
    }
}

/// Resolves a crew name to its member ID.
pub struct CrewMember {
    name_field: &'static str,
}

impl CrewMember {
    pub fn pilot() -> CrewMember {
        CrewMember {
            name_field: flight::PILOT,
        }
    }

    pub fn copilot() -> CrewMember {
        CrewMember {
            name_field: flight::COPILOT,
        }
    }
}

impl DeriveColumns for CrewMember {
    fn width(&self) -> usize {
        1
    }

    fn derive(&self, ctx: &RowContext, out: &mut Vec<String>) -> Result<(), ConversionError> {
        let name = ctx.flight.field(self.name_field)?;
        let id = match ctx.members {
            Some(members) => members.member_id(name)?.unwrap_or(UNKNOWN_VALUE),
            None => UNKNOWN_VALUE,
        };
        out.push(id.to_string());

        Ok(())
    }
}

/// Percentage of the flight cost a crew seat carries.
pub struct CrewShare {
    sole_payer: &'static str,
}

impl CrewShare {
    pub fn pilot() -> CrewShare {
        CrewShare { sole_payer: "P" }
    }

    pub fn copilot() -> CrewShare {
        CrewShare { sole_payer: "B" }
    }

    pub fn share(&self, billing: &str) -> u8 {
        match billing {
            "PB" => 50,
            code if code == self.sole_payer => 100,
            _ => 0,
        }
    }
}

impl DeriveColumns for CrewShare {
    fn width(&self) -> usize {
        1
    }

    fn derive(&self, ctx: &RowContext, out: &mut Vec<String>) -> Result<(), ConversionError> {
        out.push(self.share(ctx.flight.field(flight::BILLING)?).to_string());

        Ok(())
    }
}

/// Engine time used, from the meter readings before and after the flight.
pub struct EngineHours;

impl DeriveColumns for EngineHours {
    fn width(&self) -> usize {
        1
    }

    fn derive(&self, ctx: &RowContext, out: &mut Vec<String>) -> Result<(), ConversionError> {
        let start = ctx.flight.field(flight::ENGINE_START)?;
        let end = ctx.flight.field(flight::ENGINE_END)?;

        if start.is_empty() || end.is_empty() {
            out.push(UNKNOWN_VALUE.to_string());
            return Ok(());
        }

        let used = parse_comma_decimal(flight::ENGINE_END, end)?
            .checked_sub(parse_comma_decimal(flight::ENGINE_START, start)?)
            .ok_or_else(|| ConversionError::EngineHoursOverflow {
                start: start.to_string(),
                end: end.to_string(),
            })?;
        out.push(format_comma_decimal(used));

        Ok(())
    }
}

/// Parses a decimal written with `,` as the decimal separator. Surrounding
/// blanks are ignored; a blank-only value is malformed.
pub fn parse_comma_decimal(field: &str, value: &str) -> Result<Decimal, ConversionError> {
    Decimal::from_str(&value.trim().replace(',', ".")).map_err(|_| ConversionError::MalformedNumber {
        field: field.to_string(),
        value: value.to_string(),
    })
}

pub fn format_comma_decimal(value: Decimal) -> String {
    let rounded = value.round_dp(ENGINE_HOURS_PRECISION);
    format!("{:.2}", rounded).replace('.', ",")
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TowService {
    /// Tow to 600 m.
    Standard,
    /// Tow to 1000 m, or the part above 600 m.
    Extended,
}

impl TowService {
    pub fn code(self, youth: bool) -> &'static str {
        match (self, youth) {
            (TowService::Standard, true) => "FSS6",
            (TowService::Standard, false) => "FSV6",
            (TowService::Extended, true) => "FSSZ",
            (TowService::Extended, false) => "FSVZ",
        }
    }
}

/// Which services a tow is billed as, given whether the pilot flew without a
/// tow voucher ("ohne Marke") and the release height.
pub fn tow_services(no_marker: bool, height: &str) -> (Option<TowService>, Option<TowService>) {
    let first = match (no_marker, height) {
        (true, "600" | "1000") => Some(TowService::Standard),
        (false, "1000") => Some(TowService::Extended),
        _ => None,
    };
    let second = (no_marker && height == "1000").then_some(TowService::Extended);

    (first, second)
}

/// Towing performance codes and their flags, for tows by the club's own tow
/// planes.
pub struct Towing {
    tow_planes: Vec<String>,
}

impl Towing {
    pub fn new(tow_planes: Vec<String>) -> Towing {
        Towing { tow_planes }
    }

    fn push_service(service: Option<TowService>, youth: bool, out: &mut Vec<String>) {
        match service {
            Some(service) => {
                out.push(service.code(youth).to_string());
                out.push(FLAG_SET.to_string());
            },
            None => {
                out.push(UNKNOWN_VALUE.to_string());
                out.push(UNKNOWN_VALUE.to_string());
            },
        }
    }
}

impl DeriveColumns for Towing {
    fn width(&self) -> usize {
        4
    }

    fn derive(&self, ctx: &RowContext, out: &mut Vec<String>) -> Result<(), ConversionError> {
        let tow_aircraft = ctx.flight.field(flight::TOW_AIRCRAFT)?;
        if !self.tow_planes.iter().any(|plane| plane == tow_aircraft) {
            return Blank::new(self.width()).derive(ctx, out);
        }

        let remark = ctx.flight.field(flight::REMARK)?.to_lowercase();
        let no_marker = NO_MARKER_PHRASES.iter().any(|phrase| remark.contains(phrase));
        let height = ctx.flight.field(flight::TOW_HEIGHT)?;
        let pilot = ctx.flight.field(flight::PILOT)?;
        let youth = match ctx.members {
            Some(members) => members.is_youth(pilot)?,
            None => false,
        };

        let (first, second) = tow_services(no_marker, height);
        Towing::push_service(first, youth, out);
        Towing::push_service(second, youth, out);

        Ok(())
    }
}

/// ameavia aircraft kind, from the German registration class letter.
pub struct AircraftCategory;

impl DeriveColumns for AircraftCategory {
    fn width(&self) -> usize {
        1
    }

    fn derive(&self, ctx: &RowContext, out: &mut Vec<String>) -> Result<(), ConversionError> {
        let category = aircraft_category(ctx.flight.field(flight::REGISTRATION)?);
        out.push(category.map_or_else(String::new, |c| c.to_string()));

        Ok(())
    }
}

pub fn aircraft_category(registration: &str) -> Option<u8> {
    if registration.starts_with("D-E") {
        Some(1)
    } else if registration.starts_with("D-K") {
        Some(3)
    } else if registration.starts_with("D-") {
        Some(2)
    } else {
        None
    }
}
