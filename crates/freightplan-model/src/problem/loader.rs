// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::problem::{
    builder::ProblemBuilder,
    cargo::{Cargo, CargoId, Priority},
    err::DataError,
    flight::{AirportCode, Flight, FlightId},
    prob::Problem,
    rules::ConnectionRule,
};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use csv::StringRecord;
use freightplan_core::prelude::{Money, Volume, Weight};
use std::{collections::HashMap, fs::File, io::Read, path::Path};

const FLIGHT_COLUMNS: &[&str] = &[
    "flight_id",
    "origin",
    "destination",
    "departure",
    "arrival",
    "weight_capacity_kg",
    "volume_capacity_m3",
    "cost_per_kg",
];

const CARGO_COLUMNS: &[&str] = &[
    "cargo_id",
    "origin",
    "destination",
    "weight_kg",
    "volume_m3",
    "revenue_inr",
    "priority",
    "perishable",
    "max_transit_hours",
    "ready_time",
    "due_by",
    "handling_cost_per_kg",
    "sla_penalty_per_hour",
];

const CONNECTION_COLUMNS: &[&str] = &[
    "origin",
    "destination",
    "connection_airport",
    "min_connection_minutes",
    "max_connection_minutes",
    "handling_fee",
];

const BOOL_TRUE: &[&str] = &["true", "1", "yes", "y"];
const BOOL_FALSE: &[&str] = &["false", "0", "no", "n"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Loads the three tabular inputs into a [`Problem`]. Naive timestamps
/// are interpreted in the configured offset, Asia/Calcutta by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProblemLoader {
    default_offset: FixedOffset,
}

impl Default for ProblemLoader {
    fn default() -> Self {
        Self {
            default_offset: FixedOffset::east_opt(5 * 3600 + 1800).expect("static offset"),
        }
    }
}

impl ProblemLoader {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_default_offset(mut self, offset: FixedOffset) -> Self {
        self.default_offset = offset;
        self
    }

    /// Reads `flights.csv`, `cargo.csv` and `connections.csv` from `dir`.
    pub fn from_dir(&self, dir: impl AsRef<Path>) -> Result<Problem, DataError> {
        let dir = dir.as_ref();
        let flights = self.flights_from_reader(File::open(dir.join("flights.csv"))?, "flights.csv")?;
        let cargo = self.cargo_from_reader(File::open(dir.join("cargo.csv"))?, "cargo.csv")?;
        let rules =
            self.rules_from_reader(File::open(dir.join("connections.csv"))?, "connections.csv")?;
        ProblemBuilder::new()
            .with_flights(flights)
            .with_cargo(cargo)
            .with_rules(rules)
            .build()
    }

    pub fn flights_from_reader<R: Read>(
        &self,
        rdr: R,
        file: &str,
    ) -> Result<Vec<Flight>, DataError> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
        let columns = Columns::resolve(&mut reader, file, FLIGHT_COLUMNS)?;

        let mut flights = Vec::new();
        for (record_no, record) in reader.records().enumerate() {
            let record = record?;
            let id = columns.required(&record, "flight_id", record_no as u64)?;
            let flight = Flight::new(
                FlightId::from_str_id(id),
                airport(columns.get(&record, "origin")),
                airport(columns.get(&record, "destination")),
                self.parse_timestamp(columns.get(&record, "departure"), "departure")?,
                self.parse_timestamp(columns.get(&record, "arrival"), "arrival")?,
                Weight::new(parse_f64(columns.get(&record, "weight_capacity_kg"), "weight_capacity_kg")?),
                Volume::new(parse_f64(columns.get(&record, "volume_capacity_m3"), "volume_capacity_m3")?),
                parse_f64(columns.get(&record, "cost_per_kg"), "cost_per_kg")?,
            )?;
            flights.push(flight);
        }
        Ok(flights)
    }

    pub fn cargo_from_reader<R: Read>(&self, rdr: R, file: &str) -> Result<Vec<Cargo>, DataError> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
        let columns = Columns::resolve(&mut reader, file, CARGO_COLUMNS)?;

        let mut cargo = Vec::new();
        for (record_no, record) in reader.records().enumerate() {
            let record = record?;
            let id = columns.required(&record, "cargo_id", record_no as u64)?;
            let priority: Priority = columns.get(&record, "priority").parse()?;
            let item = Cargo::new(
                CargoId::from_str_id(id),
                airport(columns.get(&record, "origin")),
                airport(columns.get(&record, "destination")),
                Weight::new(parse_f64(columns.get(&record, "weight_kg"), "weight_kg")?),
                Volume::new(parse_f64(columns.get(&record, "volume_m3"), "volume_m3")?),
                Money::new(parse_f64(columns.get(&record, "revenue_inr"), "revenue_inr")?),
                priority,
                parse_bool(columns.get(&record, "perishable"), "perishable")?,
                parse_f64(columns.get(&record, "max_transit_hours"), "max_transit_hours")?,
                self.parse_timestamp(columns.get(&record, "ready_time"), "ready_time")?,
                self.parse_timestamp(columns.get(&record, "due_by"), "due_by")?,
                parse_f64(columns.get(&record, "handling_cost_per_kg"), "handling_cost_per_kg")?,
                parse_f64(columns.get(&record, "sla_penalty_per_hour"), "sla_penalty_per_hour")?,
            )?;
            cargo.push(item);
        }
        Ok(cargo)
    }

    pub fn rules_from_reader<R: Read>(
        &self,
        rdr: R,
        file: &str,
    ) -> Result<Vec<ConnectionRule>, DataError> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
        let columns = Columns::resolve(&mut reader, file, CONNECTION_COLUMNS)?;

        let mut rules = Vec::new();
        for record in reader.records() {
            let record = record?;
            let via = columns.get(&record, "connection_airport");
            let rule = ConnectionRule::new(
                airport(columns.get(&record, "origin")),
                airport(columns.get(&record, "destination")),
                if via.is_empty() { None } else { Some(airport(via)) },
                parse_i64(columns.get(&record, "min_connection_minutes"), "min_connection_minutes")?,
                parse_i64(columns.get(&record, "max_connection_minutes"), "max_connection_minutes")?,
                Money::new(parse_f64(columns.get(&record, "handling_fee"), "handling_fee")?),
            )?;
            rules.push(rule);
        }
        Ok(rules)
    }

    fn parse_timestamp(
        &self,
        raw: &str,
        field: &'static str,
    ) -> Result<DateTime<FixedOffset>, DataError> {
        let s = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt);
        }
        for fmt in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                if let Some(dt) = naive.and_local_timezone(self.default_offset).single() {
                    return Ok(dt);
                }
            }
        }
        Err(DataError::BadTimestamp {
            field,
            value: s.to_owned(),
        })
    }
}

fn airport(code: &str) -> AirportCode {
    AirportCode::new(code.trim().to_ascii_uppercase())
}

fn parse_f64(raw: &str, field: &'static str) -> Result<f64, DataError> {
    raw.trim().parse::<f64>().map_err(|_| DataError::BadNumber {
        field,
        value: raw.to_owned(),
    })
}

fn parse_i64(raw: &str, field: &'static str) -> Result<i64, DataError> {
    raw.trim().parse::<i64>().map_err(|_| DataError::BadNumber {
        field,
        value: raw.to_owned(),
    })
}

fn parse_bool(raw: &str, field: &'static str) -> Result<bool, DataError> {
    let norm = raw.trim().to_ascii_lowercase();
    if BOOL_TRUE.contains(&norm.as_str()) {
        return Ok(true);
    }
    if BOOL_FALSE.contains(&norm.as_str()) {
        return Ok(false);
    }
    Err(DataError::BadBool {
        field,
        value: raw.to_owned(),
    })
}

/// Header-name to index map with a required-columns check up front.
struct Columns {
    file: String,
    index: HashMap<String, usize>,
}

impl Columns {
    fn resolve<R: Read>(
        reader: &mut csv::Reader<R>,
        file: &str,
        required: &[&str],
    ) -> Result<Self, DataError> {
        let headers = reader.headers()?.clone();
        let mut index = HashMap::with_capacity(headers.len());
        for (i, name) in headers.iter().enumerate() {
            index.insert(name.trim().to_owned(), i);
        }
        let missing: Vec<String> = required
            .iter()
            .filter(|c| !index.contains_key(**c))
            .map(|c| (*c).to_owned())
            .collect();
        if !missing.is_empty() {
            return Err(DataError::MissingColumns {
                file: file.to_owned(),
                columns: missing,
            });
        }
        Ok(Self {
            file: file.to_owned(),
            index,
        })
    }

    fn get<'r>(&self, record: &'r StringRecord, name: &str) -> &'r str {
        self.index
            .get(name)
            .and_then(|&i| record.get(i))
            .unwrap_or("")
    }

    fn required<'r>(
        &self,
        record: &'r StringRecord,
        name: &'static str,
        record_no: u64,
    ) -> Result<&'r str, DataError> {
        let value = self.get(record, name);
        if value.trim().is_empty() {
            return Err(DataError::EmptyField {
                file: self.file.clone(),
                field: name,
                record: record_no,
            });
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    const FLIGHTS: &str = "\
flight_id,origin,destination,departure,arrival,weight_capacity_kg,volume_capacity_m3,cost_per_kg
FL1,del,bom,2024-03-01T08:00:00,2024-03-01T10:00:00,10000,50,10
FL2,BOM,MAA,2024-03-01T11:30:00+05:30,2024-03-01T14:00:00+05:30,8000,40,12
";

    const CARGO: &str = "\
cargo_id,origin,destination,weight_kg,volume_m3,revenue_inr,priority,perishable,max_transit_hours,ready_time,due_by,handling_cost_per_kg,sla_penalty_per_hour
CG1,DEL,MAA,2000,8,100000,HIGH,yes,24,2024-03-01T06:00:00,2024-03-01T18:00:00,1.5,500
CG2,DEL,BOM,500,2,40000,low,0,12,2024-03-01T06:00:00,2024-03-01T12:00:00,1.0,200
";

    const CONNECTIONS: &str = "\
origin,destination,connection_airport,min_connection_minutes,max_connection_minutes,handling_fee
DEL,MAA,BOM,60,180,250
DEL,MAA,,45,600,100
";

    #[test]
    fn test_flights_parse_with_default_offset() {
        let loader = ProblemLoader::new();
        let flights = loader
            .flights_from_reader(FLIGHTS.as_bytes(), "flights.csv")
            .unwrap();
        assert_eq!(flights.len(), 2);
        // Naive timestamps pick up +05:30.
        assert_eq!(flights[0].departure().offset().local_minus_utc(), 19800);
        assert_eq!(flights[0].departure().hour(), 8);
        // Airport codes are upper-cased.
        assert_eq!(flights[0].origin().as_str(), "DEL");
    }

    #[test]
    fn test_missing_column_is_reported() {
        let loader = ProblemLoader::new();
        let broken = "flight_id,origin,destination\nFL1,DEL,BOM\n";
        let err = loader
            .flights_from_reader(broken.as_bytes(), "flights.csv")
            .unwrap_err();
        match err {
            DataError::MissingColumns { file, columns } => {
                assert_eq!(file, "flights.csv");
                assert!(columns.contains(&"departure".to_owned()));
                assert!(columns.contains(&"cost_per_kg".to_owned()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cargo_parses_priority_and_bool() {
        let loader = ProblemLoader::new();
        let cargo = loader.cargo_from_reader(CARGO.as_bytes(), "cargo.csv").unwrap();
        assert_eq!(cargo[0].priority(), Priority::High);
        assert!(cargo[0].perishable());
        assert_eq!(cargo[1].priority(), Priority::Low);
        assert!(!cargo[1].perishable());
    }

    #[test]
    fn test_bad_bool_is_rejected() {
        let loader = ProblemLoader::new();
        let broken = CARGO.replace(",yes,", ",maybe,");
        let err = loader
            .cargo_from_reader(broken.as_bytes(), "cargo.csv")
            .unwrap_err();
        assert!(matches!(err, DataError::BadBool { field: "perishable", .. }));
    }

    #[test]
    fn test_bad_timestamp_is_rejected() {
        let loader = ProblemLoader::new();
        let broken = FLIGHTS.replace("2024-03-01T08:00:00", "yesterday");
        let err = loader
            .flights_from_reader(broken.as_bytes(), "flights.csv")
            .unwrap_err();
        assert!(matches!(err, DataError::BadTimestamp { field: "departure", .. }));
    }

    #[test]
    fn test_same_origin_destination_cargo_rejected() {
        let loader = ProblemLoader::new();
        let broken = CARGO.replace("CG2,DEL,BOM", "CG2,DEL,DEL");
        let err = loader
            .cargo_from_reader(broken.as_bytes(), "cargo.csv")
            .unwrap_err();
        assert!(matches!(err, DataError::Cargo(_)));
    }

    #[test]
    fn test_empty_connection_airport_is_wildcard() {
        let loader = ProblemLoader::new();
        let rules = loader
            .rules_from_reader(CONNECTIONS.as_bytes(), "connections.csv")
            .unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].via().map(|a| a.as_str()), Some("BOM"));
        assert!(rules[1].via().is_none());
    }

    #[test]
    fn test_zulu_timestamps_accepted() {
        let loader = ProblemLoader::new();
        let zulu = FLIGHTS.replace("2024-03-01T08:00:00,", "2024-03-01T02:30:00Z,");
        let flights = loader
            .flights_from_reader(zulu.as_bytes(), "flights.csv")
            .unwrap();
        // 02:30 UTC is the same instant as 08:00 +05:30.
        let expected = DateTime::parse_from_rfc3339("2024-03-01T08:00:00+05:30").unwrap();
        assert_eq!(flights[0].departure(), expected);
    }
}
