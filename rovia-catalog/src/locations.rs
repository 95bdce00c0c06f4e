use serde::{Deserialize, Serialize};

/// A pickup/return station and its one-way surcharge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub name: String,
    pub surcharge: f64,
}

/// Read-only surcharge table supplied by the catalog provider. Fetched
/// once at startup and shared for the life of the process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationCatalog {
    locations: Vec<Location>,
}

impl LocationCatalog {
    pub fn new(locations: Vec<Location>) -> Self {
        Self { locations }
    }

    /// Surcharge for a station by name. Unknown stations cost nothing
    /// rather than failing the quote.
    pub fn surcharge_for(&self, name: &str) -> f64 {
        self.locations
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name.trim()))
            .map(|l| l.surcharge)
            .unwrap_or(0.0)
    }

    pub fn all(&self) -> &[Location] {
        &self.locations
    }
}

pub fn default_locations() -> Vec<Location> {
    vec![
        Location { name: "City Office".to_string(), surcharge: 0.0 },
        Location { name: "Airport".to_string(), surcharge: 25.0 },
        Location { name: "Harbour Terminal".to_string(), surcharge: 15.0 },
        Location { name: "Central Station".to_string(), surcharge: 10.0 },
        Location { name: "Hotel Delivery".to_string(), surcharge: 30.0 },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surcharge_lookup() {
        let catalog = LocationCatalog::new(default_locations());

        assert_eq!(catalog.surcharge_for("Airport"), 25.0);
        assert_eq!(catalog.surcharge_for("airport "), 25.0);
        assert_eq!(catalog.surcharge_for("City Office"), 0.0);
    }

    #[test]
    fn test_unknown_location_is_free() {
        let catalog = LocationCatalog::new(default_locations());

        assert_eq!(catalog.surcharge_for("Moon Base"), 0.0);
    }
}
