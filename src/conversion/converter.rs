use super::members::MemberIndex;
use super::record::{flight, Record};
use super::rules::{
    AbroadFlag, AircraftCategory, BillingCategory, Blank, CrewMember, CrewShare, EngineHours, PilotInCommand,
    Registration, Rule, Towing, Verbatim,
};
use super::{ConversionError, DeriveColumns, RowContext};

/// Registrations of the club's own tow planes.
pub const DEFAULT_TOW_PLANES: [&str; 2] = ["D-EFSG", "D-EMKB"];

/// Which derivations the converter performs.
///
/// Every switch keeps its columns in the layout; a disabled rule emits empty
/// values and does not read its source fields. Only `legacy_engine_meter`
/// changes the number of columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ConverterOptions {
    /// Resolve pilot and copilot to member IDs, and set the abroad and
    /// pilot-in-command flags.
    pub crew_ids: bool,
    pub crew_shares: bool,
    /// Derive the price category from the flight type, not only the club rate.
    pub flight_type_billing: bool,
    pub engine_hours: bool,
    pub towing: bool,
    /// Append the raw engine meter start reading as a trailing column.
    pub legacy_engine_meter: bool,
    pub tow_planes: Vec<String>,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        ConverterOptions {
            crew_ids: true,
            crew_shares: true,
            flight_type_billing: true,
            engine_hours: true,
            towing: true,
            legacy_engine_meter: true,
            tow_planes: DEFAULT_TOW_PLANES.iter().map(|plane| plane.to_string()).collect(),
        }
    }
}

impl ConverterOptions {
    /// Every derivation switched off: renames and the club-rate category only.
    /// The abroad and pilot-in-command flags stay empty because they belong to
    /// crew-ID resolution.
    pub fn minimal() -> ConverterOptions {
        ConverterOptions {
            crew_ids: false,
            crew_shares: false,
            flight_type_billing: false,
            engine_hours: false,
            towing: false,
            legacy_engine_meter: false,
            ..ConverterOptions::default()
        }
    }

    pub fn width(&self) -> usize {
        self.layout().iter().map(DeriveColumns::width).sum()
    }

    fn layout(&self) -> Vec<Rule> {
        fn either(enabled: bool, rule: impl Into<Rule>) -> Rule {
            if enabled {
                rule.into()
            } else {
                Blank::new(1).into()
            }
        }

        let mut rules: Vec<Rule> = vec![
            Registration.into(),
            Verbatim::new(flight::DATE).into(),
            Verbatim::new(flight::START_TIME).into(),
            Verbatim::new(flight::LANDING_TIME).into(),
            Verbatim::new(flight::DURATION).into(),
            Verbatim::new(flight::START_LOCATION).into(),
            Verbatim::new(flight::LANDING_LOCATION).into(),
            Verbatim::new(flight::LANDINGS).into(),
            either(self.crew_ids, AbroadFlag),
            BillingCategory::new(self.flight_type_billing).into(),
            either(self.crew_ids, PilotInCommand),
            either(self.crew_ids, CrewMember::pilot()),
            either(self.crew_shares, CrewShare::pilot()),
            either(self.crew_ids, CrewMember::copilot()),
            either(self.crew_shares, CrewShare::copilot()),
            // crew 3 and 4 with their shares
            Blank::new(4).into(),
            Verbatim::new(flight::REMARK).into(),
            Verbatim::new(flight::TOW_HEIGHT).into(),
            either(self.engine_hours, EngineHours),
        ];

        if self.towing {
            rules.push(Towing::new(self.tow_planes.clone()).into());
        } else {
            rules.push(Blank::new(4).into());
        }

        rules.extend([
            Rule::from(Verbatim::new(flight::FLIGHT_TYPE)),
            Rule::from(Verbatim::new(flight::START_TYPE)),
            Rule::from(AircraftCategory),
        ]);

        if self.legacy_engine_meter {
            rules.push(Verbatim::new(flight::ENGINE_START).into());
        }

        rules
    }
}

/// One ameavia row, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord(Vec<String>);

impl OutputRecord {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, column: usize) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a OutputRecord {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Converts vereinsflieger.de flights into ameavia rows.
///
/// Holds no per-row state: converting the same flight twice gives the same
/// row.
pub struct RowConverter {
    rules: Vec<Rule>,
    width: usize,
}

impl RowConverter {
    pub fn new(options: &ConverterOptions) -> RowConverter {
        let rules = options.layout();
        let width = rules.iter().map(DeriveColumns::width).sum();

        RowConverter { rules, width }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn convert(&self, flight: &Record, members: Option<&MemberIndex>) -> Result<OutputRecord, ConversionError> {
        let ctx = RowContext { flight, members };
        let mut out = Vec::with_capacity(self.width);

        for rule in &self.rules {
            rule.derive(&ctx, &mut out)?;
        }

        debug_assert_eq!(out.len(), self.width);

        Ok(OutputRecord(out))
    }
}

impl Default for RowConverter {
    fn default() -> Self {
        RowConverter::new(&ConverterOptions::default())
    }
}
