use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use vf2ameavia::conversion::converter::{ConverterOptions, RowConverter};
use vf2ameavia::conversion::record::flight;
use vf2ameavia::data::{self, FlightReader};

const HEADER: &str = "Datum;Lfz.;Start;Landung;Zeit;Startort;Landeort;Landungen;Abr.;Pilot;Begleiter/FI;Bemerkung;\
                      Schlepphöhe;Motorzähler Start;Motorzähler Ende;Flugart;S.-Art;Schlepp-Lfz;";

const GLIDER_TOW: &str =
    "03.05.2014;D-1234;10:15;10:47;0:32;Hahnweide;Hahnweide;1;PB;Junior, Jan;Muster, Max;ohne Marke;1000;;;S;W;D-EFSG;";
const SUMMARY: &str = "Summe";
const MOTOR_FLIGHT: &str =
    "05.05.2014;D-KOOL;14:02;14:40;0:38;Hahnweide;Hahnweide;1;K;Muster, Max;;Ausbildung;;100,25;101,00;P;E;;";

const MEMBERS: &str = "Mitgliedsnummer;Nachname;Vorname;Kostenstufe;\n\
                       1001;Muster;Max;Erwachsener;\n\
                       1003;Junior;Jan;Jugendlicher;\n";

fn flight_log(rows: &[&str]) -> String {
    let mut text = String::from(HEADER);
    for row in rows {
        text.push_str("\r\n");
        text.push_str(row);
    }
    text.push_str("\r\n");
    text
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Result<Workspace> {
        Ok(Workspace { dir: TempDir::new()? })
    }

    fn write(&self, name: &str, contents: &[u8]) -> Result<PathBuf> {
        let path = self.dir.path().join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

#[test]
fn test_convert_with_members() -> Result<()> {
    let workspace = Workspace::new()?;
    let input = workspace.write("flights.csv", flight_log(&[GLIDER_TOW, SUMMARY, MOTOR_FLIGHT]).as_bytes())?;
    let members = workspace.write("members.csv", MEMBERS.as_bytes())?;
    let output = workspace.path("ameavia.csv");

    let stats = data::convert_files(&input, Some(&members), Some(&output), &ConverterOptions::default())?;

    assert_eq!(stats.converted(), 2);
    assert_eq!(stats.skipped(), 1);
    assert_eq!(
        fs::read_to_string(&output)?,
        "D;1234;03.05.2014;10:15;10:47;0:32;Hahnweide;Hahnweide;1;F;C;T;1003;50;1001;50;;;;;ohne Marke;1000;;FSS6;T;FSSZ;T;S;W;2;\r\n\
         D;KOOL;05.05.2014;14:02;14:40;0:38;Hahnweide;Hahnweide;1;F;X;T;1001;0;;0;;;;;Ausbildung;;0,75;;;;;P;E;3;100,25\r\n"
    );

    Ok(())
}

#[test]
fn test_convert_without_members() -> Result<()> {
    let workspace = Workspace::new()?;
    let input = workspace.write("flights.csv", flight_log(&[GLIDER_TOW, MOTOR_FLIGHT]).as_bytes())?;
    let output = workspace.path("ameavia.csv");

    let stats = data::convert_files(&input, None, Some(&output), &ConverterOptions::default())?;

    assert_eq!(stats.converted(), 2);
    assert_eq!(stats.skipped(), 0);
    assert_eq!(
        fs::read_to_string(&output)?,
        "D;1234;03.05.2014;10:15;10:47;0:32;Hahnweide;Hahnweide;1;F;C;T;;50;;50;;;;;ohne Marke;1000;;FSV6;T;FSVZ;T;S;W;2;\r\n\
         D;KOOL;05.05.2014;14:02;14:40;0:38;Hahnweide;Hahnweide;1;F;X;T;;0;;0;;;;;Ausbildung;;0,75;;;;;P;E;3;100,25\r\n"
    );

    Ok(())
}

#[test]
fn test_convert_latin1_export() -> Result<()> {
    let workspace = Workspace::new()?;
    let latin1: Vec<u8> = flight_log(&[GLIDER_TOW]).chars().map(|c| c as u8).collect();
    let input = workspace.write("flights.csv", &latin1)?;
    let output = workspace.path("ameavia.csv");

    data::convert_files(&input, None, Some(&output), &ConverterOptions::default())?;

    let converted = fs::read_to_string(&output)?;
    let columns: Vec<&str> = converted.trim_end().split(';').collect();
    assert_eq!(columns.len(), 31);
    assert_eq!(columns[21], "1000");

    Ok(())
}

#[test]
fn test_convert_aborts_on_missing_field() -> Result<()> {
    let workspace = Workspace::new()?;
    let truncated = "06.05.2014;D-KOOL;09:00;09:30;0:30;Hahnweide;Hahnweide;1";
    let input = workspace.write("flights.csv", flight_log(&[GLIDER_TOW, SUMMARY, truncated, MOTOR_FLIGHT]).as_bytes())?;
    let output = workspace.path("ameavia.csv");

    match data::convert_files(&input, None, Some(&output), &ConverterOptions::default()) {
        Err(err) => {
            let message = format!("{:#}", err);
            assert!(message.contains("row 3: missing required field `Abr.`"), "{}", message);
        },
        Ok(_) => bail!("a flight without billing code should abort the run"),
    }

    Ok(())
}

#[test]
fn test_convert_aborts_on_missing_member_name() -> Result<()> {
    let workspace = Workspace::new()?;
    let input = workspace.write("flights.csv", flight_log(&[GLIDER_TOW]).as_bytes())?;
    let members = workspace.write("members.csv", "Mitgliedsnummer;Nachname;Kostenstufe\n1001;Muster;Erwachsener\n".as_bytes())?;
    let output = workspace.path("ameavia.csv");

    match data::convert_files(&input, Some(&members), Some(&output), &ConverterOptions::default()) {
        Err(err) => {
            let message = format!("{:#}", err);
            assert!(message.contains("missing required field `Vorname`"), "{}", message);
        },
        Ok(_) => bail!("a membership export without first names should abort the run"),
    }

    Ok(())
}

#[test]
fn test_missing_input_file() -> Result<()> {
    let workspace = Workspace::new()?;
    let output = workspace.path("ameavia.csv");

    match data::convert_files(&workspace.path("absent.csv"), None, Some(&output), &ConverterOptions::default()) {
        Err(err) => assert!(err.to_string().contains("absent.csv")),
        Ok(_) => bail!("converting a file that does not exist should fail"),
    }

    Ok(())
}

#[test]
fn test_flight_reader_blank_column() -> Result<()> {
    let with_blank = flight_log(&[GLIDER_TOW]);
    let (row, flight) = FlightReader::new(&with_blank)?
        .next()
        .transpose()?
        .ok_or_else(|| anyhow!("export with blank column yielded no flight"))?;
    assert_eq!(row, 1);
    assert_eq!(flight.get(""), None);
    assert_eq!(flight.get(flight::TOW_AIRCRAFT), Some("D-EFSG"));

    let without_blank = with_blank.replace(";\r\n", "\r\n");
    let (_, flight) = FlightReader::new(&without_blank)?
        .next()
        .transpose()?
        .ok_or_else(|| anyhow!("export without blank column yielded no flight"))?;
    assert_eq!(flight.get(flight::TOW_AIRCRAFT), Some("D-EFSG"));
    assert_eq!(flight.get(flight::REGISTRATION), Some("D-1234"));

    Ok(())
}

#[test]
fn test_flight_reader_absent_and_empty_fields() -> Result<()> {
    let log = flight_log(&[SUMMARY, "07.05.2014;", MOTOR_FLIGHT]);
    let mut flights = FlightReader::new(&log)?;

    let (row, flight) = flights.next().transpose()?.ok_or_else(|| anyhow!("flight with empty registration missing"))?;
    assert_eq!(row, 2);
    assert_eq!(flight.get(flight::REGISTRATION), Some(""));
    assert_eq!(flight.get(flight::START_TIME), None);

    let (row, flight) = flights.next().transpose()?.ok_or_else(|| anyhow!("motor flight missing"))?;
    assert_eq!(row, 3);
    assert_eq!(flight.get(flight::REGISTRATION), Some("D-KOOL"));

    assert!(flights.next().is_none());
    assert_eq!(flights.skipped(), 1);

    Ok(())
}

#[test]
fn test_convert_minimal_layout() -> Result<()> {
    let log = flight_log(&[MOTOR_FLIGHT]);
    let mut flights = FlightReader::new(&log)?;
    let converter = RowConverter::new(&ConverterOptions::minimal());
    let mut output = Vec::new();

    let stats = data::convert(&mut flights, None, &converter, &mut output)?;

    assert_eq!(stats.converted(), 1);
    assert_eq!(
        String::from_utf8(output)?,
        "D;KOOL;05.05.2014;14:02;14:40;0:38;Hahnweide;Hahnweide;1;;X;;;;;;;;;;Ausbildung;;;;;;;P;E;3\r\n"
    );

    Ok(())
}

#[test]
fn test_output_rows_end_with_crlf() -> Result<()> {
    let log = flight_log(&[GLIDER_TOW, MOTOR_FLIGHT]);
    let mut flights = FlightReader::new(&log)?;
    let mut output = Vec::new();

    data::convert(&mut flights, None, &RowConverter::default(), &mut output)?;

    let text = String::from_utf8(output)?;
    assert_eq!(text.matches("\r\n").count(), 2);
    assert_eq!(text.matches('\n').count(), 2);
    assert!(text.ends_with("100,25\r\n"));

    Ok(())
}

#[test]
fn test_decode() {
    assert_eq!(data::decode("Schlepphöhe".as_bytes().to_vec()), "Schlepphöhe");
    assert_eq!(data::decode(b"Schlepph\xf6he".to_vec()), "Schlepphöhe");
    assert_eq!(data::decode("\u{feff}Datum".as_bytes().to_vec()), "Datum");
}
