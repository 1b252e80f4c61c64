use serde::{Deserialize, Serialize};

/// Body style of a car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarType {
    Sedan,
    Hatchback,
    Combi,
    Cabrio,
    Roadster,
}

/// Country of origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Country {
    CzechRepublic,
    Usa,
    Germany,
    Japan,
}

/// A vehicle record. The number plate is the business key.
///
/// Records are replaced as a whole; there is no partial update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub name: String,
    /// Engine displacement in litres.
    pub displacement: f64,
    pub car_type: CarType,
    pub color: String,
    pub number_plate: String,
    pub country: Country,
}

impl Car {
    pub fn new(
        name: impl Into<String>,
        displacement: f64,
        car_type: CarType,
        color: impl Into<String>,
        number_plate: impl Into<String>,
        country: Country,
    ) -> Self {
        Car {
            name: name.into(),
            displacement,
            car_type,
            color: color.into(),
            number_plate: number_plate.into(),
            country,
        }
    }

    pub fn number_plate(&self) -> &str {
        &self.number_plate
    }
}
