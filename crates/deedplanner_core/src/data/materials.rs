//! Construction material counts

use crate::error::DatabaseError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A multiset of construction materials (name -> count)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Materials(BTreeMap<String, i32>);

impl Materials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` of a material, summing with any existing count
    pub fn add(&mut self, name: impl Into<String>, count: i32) {
        *self.0.entry(name.into()).or_insert(0) += count;
    }

    /// Merge another material set into this one
    pub fn add_all(&mut self, other: &Materials) {
        for (name, count) in &other.0 {
            self.add(name.clone(), *count);
        }
    }

    pub fn get(&self, name: &str) -> i32 {
        self.0.get(name).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.0.iter().map(|(name, count)| (name.as_str(), *count))
    }
}

/// Parses the compact `"Log=4, Nails=2"` list form
impl FromStr for Materials {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut materials = Materials::new();
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (name, count) = entry
                .split_once('=')
                .ok_or_else(|| DatabaseError::InvalidMaterials(entry.to_string()))?;
            let count: i32 = count
                .trim()
                .parse()
                .map_err(|_| DatabaseError::InvalidMaterials(entry.to_string()))?;
            materials.add(name.trim(), count);
        }
        Ok(materials)
    }
}

impl fmt::Display for Materials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Materials needed:")?;
        writeln!(f)?;
        for (name, count) in &self.0 {
            writeln!(f, "{} = {}", name, count)?;
        }
        if self.0.is_empty() {
            writeln!(f, "None")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_sums_counts() {
        let mut materials = Materials::new();
        materials.add("Log", 2);
        materials.add("Log", 3);
        materials.add("Nails", 1);
        assert_eq!(materials.get("Log"), 5);
        assert_eq!(materials.get("Nails"), 1);
        assert_eq!(materials.get("Rock shards"), 0);
    }

    #[test]
    fn test_parse_list() {
        let materials: Materials = "Log=4, Nails = 2,Log=1".parse().unwrap();
        assert_eq!(materials.get("Log"), 5);
        assert_eq!(materials.get("Nails"), 2);

        assert!("Log".parse::<Materials>().is_err());
        assert!("Log=many".parse::<Materials>().is_err());
        assert!("".parse::<Materials>().unwrap().is_empty());
    }

    #[test]
    fn test_display() {
        let empty = Materials::new();
        assert!(empty.to_string().ends_with("None\n"));

        let mut materials = Materials::new();
        materials.add("Plank", 10);
        let text = materials.to_string();
        assert!(text.starts_with("Materials needed:"));
        assert!(text.contains("Plank = 10"));
    }
}
