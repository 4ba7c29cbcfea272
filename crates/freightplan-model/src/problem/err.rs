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

use crate::problem::cargo::{CargoError, CargoId, ParsePriorityError};
use crate::problem::flight::{AirportCode, FlightError, FlightId};
use crate::problem::rules::RuleError;

/// Anything that makes source data unusable. Loading aborts on the first
/// of these; optimization-level conditions are alerts, never errors.
#[derive(Debug)]
pub enum DataError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingColumns { file: String, columns: Vec<String> },
    EmptyField { file: String, field: &'static str, record: u64 },
    BadTimestamp { field: &'static str, value: String },
    BadNumber { field: &'static str, value: String },
    BadBool { field: &'static str, value: String },
    BadPriority(ParsePriorityError),
    Flight(FlightError),
    Cargo(CargoError),
    Rule(RuleError),
    DuplicateFlight(FlightId),
    DuplicateCargo(CargoId),
    UnknownRuleAirport {
        origin: AirportCode,
        destination: AirportCode,
        airport: AirportCode,
    },
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use DataError::*;
        match self {
            Io(e) => write!(f, "I/O error: {e}"),
            Csv(e) => write!(f, "CSV error: {e}"),
            MissingColumns { file, columns } => {
                write!(f, "{file} is missing required columns: {}", columns.join(", "))
            }
            EmptyField { file, field, record } => {
                write!(f, "{file}: field '{field}' is empty in record {record}")
            }
            BadTimestamp { field, value } => {
                write!(f, "'{value}' for field '{field}' is not a valid ISO 8601 timestamp")
            }
            BadNumber { field, value } => {
                write!(f, "'{value}' for field '{field}' is not a valid number")
            }
            BadBool { field, value } => {
                write!(f, "'{value}' for field '{field}' must be boolean-like")
            }
            BadPriority(e) => write!(f, "{e}"),
            Flight(e) => write!(f, "{e}"),
            Cargo(e) => write!(f, "{e}"),
            Rule(e) => write!(f, "{e}"),
            DuplicateFlight(id) => write!(f, "Duplicate flight identifier {id}"),
            DuplicateCargo(id) => write!(f, "Duplicate cargo identifier {id}"),
            UnknownRuleAirport {
                origin,
                destination,
                airport,
            } => write!(
                f,
                "Connection rule {origin} -> {destination} references {airport}, which no flight or cargo uses"
            ),
        }
    }
}

impl std::error::Error for DataError {}

impl From<std::io::Error> for DataError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<csv::Error> for DataError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

impl From<ParsePriorityError> for DataError {
    fn from(e: ParsePriorityError) -> Self {
        Self::BadPriority(e)
    }
}

impl From<FlightError> for DataError {
    fn from(e: FlightError) -> Self {
        Self::Flight(e)
    }
}

impl From<CargoError> for DataError {
    fn from(e: CargoError) -> Self {
        Self::Cargo(e)
    }
}

impl From<RuleError> for DataError {
    fn from(e: RuleError) -> Self {
        Self::Rule(e)
    }
}
