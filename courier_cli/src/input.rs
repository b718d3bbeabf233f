use courier_matrix_providers::coordinate::Coordinate;
use jiff::civil;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where a depot or stop is: a free-form address to geocode, or coordinates.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Place {
    Address { address: String },
    Coordinates { latitude: f64, longitude: f64 },
}

impl Place {
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            Place::Address { .. } => None,
            Place::Coordinates {
                latitude,
                longitude,
            } => Some(Coordinate::new(*latitude, *longitude)),
        }
    }

    /// Address sent to the geocoder, with the default country appended when
    /// the address does not already end with it.
    pub fn geocoding_query(&self, default_country: Option<&str>) -> Option<String> {
        let Place::Address { address } = self else {
            return None;
        };

        let address = address.trim();
        match default_country.map(str::trim) {
            Some(country)
                if !country.is_empty()
                    && !address
                        .to_lowercase()
                        .ends_with(&country.to_lowercase()) =>
            {
                Some(format!("{address}, {country}"))
            }
            _ => Some(address.to_owned()),
        }
    }
}

impl std::fmt::Display for Place {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Place::Address { address } => write!(f, "{address}"),
            Place::Coordinates {
                latitude,
                longitude,
            } => write!(f, "{latitude},{longitude}"),
        }
    }
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(rename = "Stop")]
pub struct StopInput {
    #[serde(flatten)]
    pub place: Place,

    /// Earliest service time, e.g. "08:00"
    pub start_time: civil::Time,

    /// Latest service time, e.g. "10:30"
    pub end_time: civil::Time,
}

/// Input file of `courier optimize` and `courier matrix`.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(rename = "Problem")]
pub struct ProblemInput {
    pub depot: Place,
    pub stops: Vec<StopInput>,
}

impl ProblemInput {
    pub fn places(&self) -> impl Iterator<Item = &Place> {
        std::iter::once(&self.depot).chain(self.stops.iter().map(|stop| &stop.place))
    }
}
