use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How an add-on is billed. Carried through to presentation; the
/// subtotal formula itself is quantity x unit price for every unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingUnit {
    PerRental,
    PerDay,
}

/// One add-on from the catalog provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtraItem {
    pub name: String,
    pub unit_price: f64,
    pub billing_unit: BillingUnit,
}

/// Read-only add-on catalog, fetched once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtrasCatalog {
    items: Vec<ExtraItem>,
}

impl ExtrasCatalog {
    pub fn new(items: Vec<ExtraItem>) -> Self {
        Self { items }
    }

    pub fn get(&self, name: &str) -> Option<&ExtraItem> {
        self.items.iter().find(|i| i.name == name)
    }

    pub fn all(&self) -> &[ExtraItem] {
        &self.items
    }

    /// Sum over catalog entries of selected quantity x unit price.
    /// Quantities missing from the selection default to zero; selections
    /// naming items the catalog does not carry contribute nothing.
    pub fn subtotal(&self, selection: &HashMap<String, u32>) -> f64 {
        self.items
            .iter()
            .map(|item| {
                let qty = selection.get(&item.name).copied().unwrap_or(0);
                qty as f64 * item.unit_price
            })
            .sum()
    }
}

pub fn default_extras() -> Vec<ExtraItem> {
    vec![
        ExtraItem { name: "Cooler Box".to_string(), unit_price: 1.0, billing_unit: BillingUnit::PerDay },
        ExtraItem { name: "Child Seat".to_string(), unit_price: 5.0, billing_unit: BillingUnit::PerRental },
        ExtraItem { name: "Navigation Unit".to_string(), unit_price: 3.0, billing_unit: BillingUnit::PerDay },
        ExtraItem { name: "Extra Helmet".to_string(), unit_price: 2.0, billing_unit: BillingUnit::PerRental },
        ExtraItem { name: "Phone Mount".to_string(), unit_price: 1.5, billing_unit: BillingUnit::PerRental },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extras_subtotal() {
        let catalog = ExtrasCatalog::new(default_extras());
        let mut selection = HashMap::new();
        selection.insert("Cooler Box".to_string(), 2);

        assert_eq!(catalog.subtotal(&selection), 2.0);
    }

    #[test]
    fn test_unknown_selection_contributes_nothing() {
        let catalog = ExtrasCatalog::new(default_extras());
        let mut selection = HashMap::new();
        selection.insert("Jetpack".to_string(), 4);

        assert_eq!(catalog.subtotal(&selection), 0.0);
    }

    #[test]
    fn test_empty_selection_is_free() {
        let catalog = ExtrasCatalog::new(default_extras());

        assert_eq!(catalog.subtotal(&HashMap::new()), 0.0);
    }
}
