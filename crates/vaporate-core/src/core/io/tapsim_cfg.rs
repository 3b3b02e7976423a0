//! Species blocks appended to the evaporation solver's mesh configuration.

use super::error::FormatError;
use crate::core::species::registry::SpeciesRegistry;
use std::io::Write;

/// Writes one `ID = ...` block per registered composite identifier.
pub fn write_species_blocks(
    registry: &SpeciesRegistry,
    writer: &mut impl Write,
) -> Result<(), FormatError> {
    for entry in registry.entries() {
        writeln!(writer)?;
        writeln!(writer, "ID = {}", entry.composite_id)?;
        writeln!(writer, "NAME = {}_{}", entry.element_label, entry.field_bin)?;
        writeln!(writer, "CHARGE_DENSITY = 0.00000e+00")?;
        writeln!(writer, "DIELECTRICITY = 1.00000e+00")?;
        writeln!(writer, "REMOVABLE = 1")?;
        writeln!(writer, "NEUMANN_BOUNDARY = 0")?;
        writeln!(writer, "DIRICHLET_BOUNDARY = 1")?;
        writeln!(writer, "POTENTIAL = 1.00000e+03")?;
        writeln!(writer, "MASS = {}", entry.mass)?;
        writeln!(writer, "EVAPORATION_CHARGE_STATE = {}", entry.charge)?;
        writeln!(writer, "EVAPORATION_FIELD_STRENGTH = {:e}", entry.field_threshold)?;
        writeln!(writer, "EVAPORATION_ACTIVATION_ENERGY = 1.00000e+00")?;
    }
    Ok(())
}
