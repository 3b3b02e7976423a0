//! The relaxation solver's atom data file (`read_data` layout, atomic style).

use super::error::{FormatError, ParseErrorKind, parse_float, parse_int, require_columns};
use super::traits::TextFormat;
use crate::core::models::relax::{AtomData, AtomType, CellBounds, RelaxAtom};
use nalgebra::Point3;
use std::io::{BufRead, Write};

const AXES: [&str; 3] = ["x", "y", "z"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Masses,
    Atoms,
}

pub struct LammpsDataFile;

impl TextFormat for LammpsDataFile {
    type Record = AtomData;

    fn read_from(reader: &mut impl BufRead) -> Result<AtomData, FormatError> {
        let mut title: Option<String> = None;
        let mut atom_count: Option<usize> = None;
        let mut type_count: Option<usize> = None;
        let mut lo = [None; 3];
        let mut hi = [None; 3];
        let mut atom_types = Vec::new();
        let mut atoms = Vec::new();
        let mut section = Section::Header;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            if title.is_none() {
                title = Some(line.trim().to_string());
                continue;
            }

            let (content, comment) = match line.split_once('#') {
                Some((content, comment)) => (content.trim(), Some(comment.trim())),
                None => (line.trim(), None),
            };
            if content.is_empty() {
                continue;
            }
            match content {
                "Masses" => {
                    section = Section::Masses;
                    continue;
                }
                "Atoms" => {
                    section = Section::Atoms;
                    continue;
                }
                _ => {}
            }

            let tokens: Vec<&str> = content.split_whitespace().collect();
            match section {
                Section::Header => {
                    if content.ends_with("atom types") {
                        type_count = Some(parse_int(tokens[0], line_num, "atom type count")?);
                    } else if content.ends_with("atoms") {
                        atom_count = Some(parse_int(tokens[0], line_num, "atom count")?);
                    } else if let Some(axis) = AXES
                        .iter()
                        .position(|a| content.ends_with(&format!("{a}lo {a}hi")))
                    {
                        require_columns(&tokens, 4, line_num)?;
                        lo[axis] = Some(parse_float(tokens[0], line_num, "lower bound")?);
                        hi[axis] = Some(parse_float(tokens[1], line_num, "upper bound")?);
                    } else {
                        return Err(FormatError::Parse {
                            line: line_num,
                            kind: ParseErrorKind::UnexpectedRecord(line.clone()),
                        });
                    }
                }
                Section::Masses => {
                    require_columns(&tokens, 2, line_num)?;
                    atom_types.push(AtomType {
                        id: parse_int(tokens[0], line_num, "atom type")?,
                        mass: parse_float(tokens[1], line_num, "mass")?,
                        label: comment.unwrap_or_default().to_string(),
                    });
                }
                Section::Atoms => {
                    require_columns(&tokens, 5, line_num)?;
                    atoms.push(RelaxAtom {
                        local_index: parse_int(tokens[0], line_num, "atom id")?,
                        type_id: parse_int(tokens[1], line_num, "atom type")?,
                        position: Point3::new(
                            parse_float(tokens[2], line_num, "x")?,
                            parse_float(tokens[3], line_num, "y")?,
                            parse_float(tokens[4], line_num, "z")?,
                        ),
                    });
                }
            }
        }

        let title = title.ok_or_else(|| FormatError::MissingRecord("title line".into()))?;
        let atom_count =
            atom_count.ok_or_else(|| FormatError::MissingRecord("atom count".into()))?;
        let type_count =
            type_count.ok_or_else(|| FormatError::MissingRecord("atom type count".into()))?;
        let mut bounds = [(0.0, 0.0); 3];
        for axis in 0..3 {
            bounds[axis] = match (lo[axis], hi[axis]) {
                (Some(l), Some(h)) => (l, h),
                _ => {
                    return Err(FormatError::MissingRecord(format!(
                        "{0}lo {0}hi bounds",
                        AXES[axis]
                    )));
                }
            };
        }

        if atoms.len() != atom_count {
            return Err(FormatError::Inconsistency(format!(
                "header declares {} atoms but {} atom records were found",
                atom_count,
                atoms.len()
            )));
        }
        if atom_types.len() != type_count {
            return Err(FormatError::Inconsistency(format!(
                "header declares {} atom types but {} mass records were found",
                type_count,
                atom_types.len()
            )));
        }
        for (i, atom) in atoms.iter().enumerate() {
            if atom.local_index != i + 1 {
                return Err(FormatError::Inconsistency(format!(
                    "atom record {} carries id {}; ids must be contiguous from 1",
                    i + 1,
                    atom.local_index
                )));
            }
            if !atom_types.iter().any(|t| t.id == atom.type_id) {
                return Err(FormatError::Inconsistency(format!(
                    "atom {} uses undeclared type {}",
                    atom.local_index, atom.type_id
                )));
            }
        }

        Ok(AtomData {
            title,
            atom_types,
            cell: CellBounds {
                lo: Point3::new(bounds[0].0, bounds[1].0, bounds[2].0),
                hi: Point3::new(bounds[0].1, bounds[1].1, bounds[2].1),
            },
            atoms,
        })
    }

    fn write_to(data: &AtomData, writer: &mut impl Write) -> Result<(), FormatError> {
        writeln!(writer, "{}", data.title)?;
        writeln!(writer)?;
        writeln!(writer, "{} atoms", data.atoms.len())?;
        writeln!(writer)?;
        writeln!(writer, "{} atom types", data.atom_types.len())?;
        writeln!(writer)?;
        for (axis, name) in AXES.iter().enumerate() {
            writeln!(
                writer,
                "{} {} {name}lo {name}hi",
                data.cell.lo[axis], data.cell.hi[axis]
            )?;
        }
        writeln!(writer)?;
        writeln!(writer, "Masses")?;
        writeln!(writer)?;
        for atom_type in &data.atom_types {
            writeln!(writer, "{} {} # {}", atom_type.id, atom_type.mass, atom_type.label)?;
        }
        writeln!(writer)?;
        writeln!(writer, "Atoms")?;
        writeln!(writer)?;
        for atom in &data.atoms {
            writeln!(
                writer,
                "{} {} {} {} {}",
                atom.local_index, atom.type_id, atom.position.x, atom.position.y, atom.position.z
            )?;
        }
        Ok(())
    }
}

/// Writes the fixed-atom list, one local index per line.
pub fn write_index_list(indices: &[usize], writer: &mut impl Write) -> Result<(), FormatError> {
    for index in indices {
        writeln!(writer, "{}", index)?;
    }
    Ok(())
}
