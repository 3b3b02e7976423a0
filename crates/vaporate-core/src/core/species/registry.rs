use crate::core::models::snapshot::SpeciesLegend;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Configuration of one element of the emitter.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSpec {
    pub label: String,
    /// Atomic mass in g/mol.
    pub mass: f64,
    /// Ionic charge state on evaporation.
    pub charge: i32,
    /// Evaporation field strength per field bin. Bins must be `0..N`.
    pub field_bins: BTreeMap<u32, f64>,
}

/// One `(element, field bin)` combination and its composite identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesEntry {
    pub element_label: String,
    pub base_id: u32,
    pub field_bin: u32,
    pub composite_id: u32,
    pub mass: f64,
    pub charge: i32,
    pub field_threshold: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct ElementRecord {
    spec: ElementSpec,
    base_id: u32,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegistryError {
    #[error("No elements configured for the emitter")]
    NoElements,
    #[error("Element labels must not be empty")]
    EmptyLabel,
    #[error("Element '{0}' is configured more than once")]
    DuplicateElement(String),
    #[error("Element '{0}' has no field bins")]
    NoFieldBins(String),
    #[error("Field bins of element '{label}' must be 0..{count}, found bin {found}")]
    NonContiguousBins {
        label: String,
        count: usize,
        found: u32,
    },
    #[error("Elements '{first}' and '{second}' share the relaxation type symbol '{symbol}'")]
    SymbolCollision {
        symbol: char,
        first: String,
        second: String,
    },
    #[error("Composite id {0} is not registered")]
    UnknownCompositeId(u32),
    #[error("Element '{0}' is not registered")]
    UnknownElement(String),
    #[error("Field bin {bin} is not registered for element '{label}'")]
    UnknownFieldBin { label: String, bin: u32 },
}

/// Bidirectional mapping between `(element, field bin)` pairs and composite identifiers.
///
/// Base identifiers are decimal aligned: with a stride of 10 (up to ten bins per element),
/// the first element owns 10..19, the second 20..29 and so on. All composite identifiers
/// therefore lie above the reserved vacuum/boundary codes.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesRegistry {
    elements: Vec<ElementRecord>,
    entries: Vec<SpeciesEntry>,
    by_id: HashMap<u32, usize>,
    stride: u32,
}

impl SpeciesRegistry {
    pub fn from_elements(elements: &[ElementSpec]) -> Result<Self, RegistryError> {
        if elements.is_empty() {
            return Err(RegistryError::NoElements);
        }

        let mut symbols: HashMap<char, &str> = HashMap::new();
        for spec in elements {
            let symbol = spec
                .label
                .chars()
                .next()
                .ok_or(RegistryError::EmptyLabel)?;
            if elements.iter().filter(|e| e.label == spec.label).count() > 1 {
                return Err(RegistryError::DuplicateElement(spec.label.clone()));
            }
            if let Some(first) = symbols.insert(symbol, &spec.label) {
                return Err(RegistryError::SymbolCollision {
                    symbol,
                    first: first.to_string(),
                    second: spec.label.clone(),
                });
            }
            if spec.field_bins.is_empty() {
                return Err(RegistryError::NoFieldBins(spec.label.clone()));
            }
            for (expected, &found) in spec.field_bins.keys().enumerate() {
                if found as usize != expected {
                    return Err(RegistryError::NonContiguousBins {
                        label: spec.label.clone(),
                        count: spec.field_bins.len(),
                        found,
                    });
                }
            }
        }

        let max_bins = elements
            .iter()
            .map(|e| e.field_bins.len())
            .max()
            .unwrap_or(0);
        let mut stride: u32 = 10;
        while (stride as usize) < max_bins {
            stride *= 10;
        }

        let mut records = Vec::with_capacity(elements.len());
        let mut entries = Vec::new();
        let mut by_id = HashMap::new();
        for (k, spec) in elements.iter().enumerate() {
            let base_id = stride * (k as u32 + 1);
            for (&field_bin, &field_threshold) in &spec.field_bins {
                let composite_id = base_id + field_bin;
                by_id.insert(composite_id, entries.len());
                entries.push(SpeciesEntry {
                    element_label: spec.label.clone(),
                    base_id,
                    field_bin,
                    composite_id,
                    mass: spec.mass,
                    charge: spec.charge,
                    field_threshold,
                });
            }
            records.push(ElementRecord {
                spec: spec.clone(),
                base_id,
            });
        }

        Ok(Self {
            elements: records,
            entries,
            by_id,
            stride,
        })
    }

    /// Returns the element label encoded by `composite_id`.
    pub fn resolve(&self, composite_id: u32) -> Result<&str, RegistryError> {
        self.entry(composite_id).map(|e| e.element_label.as_str())
    }

    pub fn entry(&self, composite_id: u32) -> Result<&SpeciesEntry, RegistryError> {
        self.by_id
            .get(&composite_id)
            .map(|&i| &self.entries[i])
            .ok_or(RegistryError::UnknownCompositeId(composite_id))
    }

    pub fn composite_id_for(&self, element_label: &str, field_bin: u32) -> Result<u32, RegistryError> {
        let record = self.record(element_label)?;
        if !record.spec.field_bins.contains_key(&field_bin) {
            return Err(RegistryError::UnknownFieldBin {
                label: element_label.to_string(),
                bin: field_bin,
            });
        }
        Ok(record.base_id + field_bin)
    }

    /// Number of field bins registered for `element_label`.
    pub fn bin_count(&self, element_label: &str) -> Result<usize, RegistryError> {
        self.record(element_label).map(|r| r.spec.field_bins.len())
    }

    pub fn element(&self, element_label: &str) -> Result<&ElementSpec, RegistryError> {
        self.record(element_label).map(|r| &r.spec)
    }

    /// Element labels in configuration order.
    pub fn element_labels(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|r| r.spec.label.as_str())
    }

    pub fn entries(&self) -> &[SpeciesEntry] {
        &self.entries
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// The legend written to geometry snapshots, one pair per composite id.
    pub fn legend(&self) -> SpeciesLegend {
        SpeciesLegend::new(
            self.entries
                .iter()
                .map(|e| (e.composite_id, e.element_label.clone()))
                .collect(),
        )
    }

    fn record(&self, element_label: &str) -> Result<&ElementRecord, RegistryError> {
        self.elements
            .iter()
            .find(|r| r.spec.label == element_label)
            .ok_or_else(|| RegistryError::UnknownElement(element_label.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(label: &str, bins: u32) -> ElementSpec {
        ElementSpec {
            label: label.to_string(),
            mass: 183.85,
            charge: 3,
            field_bins: (0..bins).map(|b| (b, 57e-9 + b as f64 * 1e-9)).collect(),
        }
    }

    #[test]
    fn tungsten_with_ten_bins_occupies_ten_to_nineteen() {
        let registry = SpeciesRegistry::from_elements(&[element("W", 10)]).unwrap();
        assert_eq!(registry.stride(), 10);
        assert_eq!(registry.composite_id_for("W", 0).unwrap(), 10);
        assert_eq!(registry.composite_id_for("W", 9).unwrap(), 19);
        assert_eq!(registry.entries().len(), 10);
    }

    #[test]
    fn resolve_inverts_composite_id_for_every_pair() {
        let registry =
            SpeciesRegistry::from_elements(&[element("W", 10), element("Re", 4), element("Ta", 7)])
                .unwrap();
        for label in ["W", "Re", "Ta"] {
            for bin in 0..registry.bin_count(label).unwrap() as u32 {
                let id = registry.composite_id_for(label, bin).unwrap();
                assert_eq!(registry.resolve(id).unwrap(), label);
                assert_eq!(registry.entry(id).unwrap().field_bin, bin);
            }
        }
    }

    #[test]
    fn composite_ids_are_unique_and_above_reserved_codes() {
        let registry =
            SpeciesRegistry::from_elements(&[element("W", 10), element("Re", 10)]).unwrap();
        let mut ids: Vec<_> = registry.entries().iter().map(|e| e.composite_id).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert!(ids.iter().all(|&id| id > 3));
    }

    #[test]
    fn stride_grows_with_bin_count() {
        let registry = SpeciesRegistry::from_elements(&[element("W", 12)]).unwrap();
        assert_eq!(registry.stride(), 100);
        assert_eq!(registry.composite_id_for("W", 11).unwrap(), 111);
    }

    #[test]
    fn unregistered_composite_id_is_a_lookup_error() {
        let registry = SpeciesRegistry::from_elements(&[element("W", 3)]).unwrap();
        assert_eq!(
            registry.resolve(13),
            Err(RegistryError::UnknownCompositeId(13))
        );
        assert_eq!(registry.resolve(2), Err(RegistryError::UnknownCompositeId(2)));
    }

    #[test]
    fn unknown_element_and_bin_are_rejected() {
        let registry = SpeciesRegistry::from_elements(&[element("W", 3)]).unwrap();
        assert!(matches!(
            registry.composite_id_for("Mo", 0),
            Err(RegistryError::UnknownElement(_))
        ));
        assert!(matches!(
            registry.composite_id_for("W", 3),
            Err(RegistryError::UnknownFieldBin { bin: 3, .. })
        ));
    }

    #[test]
    fn construction_rejects_invalid_element_sets() {
        assert_eq!(
            SpeciesRegistry::from_elements(&[]),
            Err(RegistryError::NoElements)
        );
        assert!(matches!(
            SpeciesRegistry::from_elements(&[element("W", 2), element("W", 2)]),
            Err(RegistryError::DuplicateElement(_))
        ));
        assert!(matches!(
            SpeciesRegistry::from_elements(&[element("W", 0)]),
            Err(RegistryError::NoFieldBins(_))
        ));
        assert!(matches!(
            SpeciesRegistry::from_elements(&[element("", 2)]),
            Err(RegistryError::EmptyLabel)
        ));
        assert!(matches!(
            SpeciesRegistry::from_elements(&[element("Ta", 2), element("Ti", 2)]),
            Err(RegistryError::SymbolCollision { symbol: 'T', .. })
        ));

        let mut gapped = element("W", 3);
        gapped.field_bins.remove(&1);
        assert!(matches!(
            SpeciesRegistry::from_elements(&[gapped]),
            Err(RegistryError::NonContiguousBins { found: 2, .. })
        ));
    }

    #[test]
    fn legend_lists_every_composite_id() {
        let registry = SpeciesRegistry::from_elements(&[element("W", 2), element("Re", 1)]).unwrap();
        let legend = registry.legend();
        assert_eq!(
            legend.entries(),
            &[(10, "W".to_string()), (11, "W".to_string()), (20, "Re".to_string())]
        );
    }
}
