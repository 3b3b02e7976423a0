//! Single-frame custom dumps written by the relaxation solver.
//!
//! ```text
//! ITEM: TIMESTEP
//! 1000
//! ITEM: NUMBER OF ATOMS
//! 2
//! ITEM: BOX BOUNDS pp pp pp
//! -10 10
//! -10 10
//! -10 10
//! ITEM: ATOMS id x y z type c_cnum
//! 1 0.0 0.0 0.0 1 8
//! 2 2.7 0.0 0.0 1 3
//! ```
//!
//! The `x`, `y`, `z` and `type` columns are required. `id` orders the rows when present,
//! and the first `c_*` column is read as the coordination number.

use super::error::{FormatError, ParseErrorKind, parse_float, parse_int, require_columns};
use super::traits::TextFormat;
use crate::core::models::relax::{CellBounds, RelaxedAtom};
use nalgebra::Point3;
use std::io::{BufRead, Write};

const ITEM_PREFIX: &str = "ITEM:";
const COORDINATION_PREFIX: &str = "c_";

#[derive(Debug, Clone, PartialEq)]
pub struct DumpFrame {
    pub timestep: u64,
    /// The `ITEM: BOX BOUNDS` line and its three bound lines, verbatim.
    pub box_lines: Vec<String>,
    /// Atoms ordered by local index.
    pub atoms: Vec<RelaxedAtom>,
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    id: Option<usize>,
    x: usize,
    y: usize,
    z: usize,
    kind: usize,
    coordination: Option<usize>,
    width: usize,
}

impl Columns {
    fn parse(names: &[&str]) -> Result<Self, FormatError> {
        let find = |name: &str| names.iter().position(|n| *n == name);
        let require = |name: &'static str| {
            find(name).ok_or_else(|| FormatError::MissingRecord(format!("ATOMS column '{}'", name)))
        };
        Ok(Self {
            id: find("id"),
            x: require("x")?,
            y: require("y")?,
            z: require("z")?,
            kind: require("type")?,
            coordination: names.iter().position(|n| n.starts_with(COORDINATION_PREFIX)),
            width: names.len(),
        })
    }
}

pub struct DumpFile;

impl TextFormat for DumpFile {
    type Record = DumpFrame;

    fn read_from(reader: &mut impl BufRead) -> Result<DumpFrame, FormatError> {
        let mut lines = reader
            .lines()
            .enumerate()
            .map(|(i, l)| l.map(|l| (i + 1, l)));

        let mut timestep: Option<u64> = None;
        let mut declared: Option<usize> = None;
        let mut box_lines = Vec::new();
        let mut columns: Option<Columns> = None;
        let mut atoms = Vec::new();

        while let Some(next) = lines.next() {
            let (line_num, line) = next?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some(item) = trimmed.strip_prefix(ITEM_PREFIX) {
                if columns.is_some() {
                    return Err(FormatError::Inconsistency(format!(
                        "line {}: only single-frame dumps are supported",
                        line_num
                    )));
                }
                let item = item.trim();
                if item == "TIMESTEP" {
                    let (value_line, value) = next_value(&mut lines, "TIMESTEP")?;
                    timestep = Some(parse_int(value.trim(), value_line, "timestep")?);
                } else if item == "NUMBER OF ATOMS" {
                    let (value_line, value) = next_value(&mut lines, "NUMBER OF ATOMS")?;
                    declared = Some(parse_int(value.trim(), value_line, "atom count")?);
                } else if item.starts_with("BOX BOUNDS") {
                    box_lines.push(line.clone());
                    for _ in 0..3 {
                        let (_, bound) = next_value(&mut lines, "BOX BOUNDS")?;
                        box_lines.push(bound);
                    }
                } else if let Some(names) = item.strip_prefix("ATOMS") {
                    let names: Vec<&str> = names.split_whitespace().collect();
                    columns = Some(Columns::parse(&names)?);
                } else {
                    return Err(FormatError::Parse {
                        line: line_num,
                        kind: ParseErrorKind::UnexpectedRecord(line.clone()),
                    });
                }
                continue;
            }

            let Some(cols) = columns else {
                return Err(FormatError::Parse {
                    line: line_num,
                    kind: ParseErrorKind::UnexpectedRecord(line.clone()),
                });
            };
            let tokens: Vec<&str> = trimmed.split_whitespace().collect();
            require_columns(&tokens, cols.width, line_num)?;
            let local_index = match cols.id {
                Some(i) => parse_int(tokens[i], line_num, "atom id")?,
                None => atoms.len() + 1,
            };
            let coordination = match cols.coordination {
                Some(i) => Some(parse_coordination(tokens[i], line_num)?),
                None => None,
            };
            atoms.push(RelaxedAtom {
                local_index,
                position: Point3::new(
                    parse_float(tokens[cols.x], line_num, "x")?,
                    parse_float(tokens[cols.y], line_num, "y")?,
                    parse_float(tokens[cols.z], line_num, "z")?,
                ),
                type_token: tokens[cols.kind].to_string(),
                coordination,
            });
        }

        if columns.is_none() {
            return Err(FormatError::MissingRecord("ITEM: ATOMS".into()));
        }
        if let Some(declared) = declared {
            if declared != atoms.len() {
                return Err(FormatError::Inconsistency(format!(
                    "dump declares {} atoms but {} atom rows were found",
                    declared,
                    atoms.len()
                )));
            }
        }

        atoms.sort_by_key(|a| a.local_index);
        for (i, atom) in atoms.iter().enumerate() {
            if atom.local_index != i + 1 {
                return Err(FormatError::Inconsistency(format!(
                    "atom ids must be contiguous from 1; position {} holds id {}",
                    i + 1,
                    atom.local_index
                )));
            }
        }

        Ok(DumpFrame {
            timestep: timestep.unwrap_or(0),
            box_lines,
            atoms,
        })
    }

    fn write_to(frame: &DumpFrame, writer: &mut impl Write) -> Result<(), FormatError> {
        writeln!(writer, "ITEM: TIMESTEP")?;
        writeln!(writer, "{}", frame.timestep)?;
        writeln!(writer, "ITEM: NUMBER OF ATOMS")?;
        writeln!(writer, "{}", frame.atoms.len())?;
        if frame.box_lines.is_empty() {
            let cell = CellBounds::enclosing(frame.atoms.iter().map(|a| &a.position), 0.0);
            writeln!(writer, "ITEM: BOX BOUNDS pp pp pp")?;
            for axis in 0..3 {
                let (lo, hi) = cell.map_or((0.0, 0.0), |c| (c.lo[axis], c.hi[axis]));
                writeln!(writer, "{} {}", lo, hi)?;
            }
        } else {
            for line in &frame.box_lines {
                writeln!(writer, "{}", line)?;
            }
        }

        let with_coordination = frame.atoms.iter().any(|a| a.coordination.is_some());
        if with_coordination {
            writeln!(writer, "ITEM: ATOMS id x y z type c_cnum")?;
        } else {
            writeln!(writer, "ITEM: ATOMS id x y z type")?;
        }
        for atom in &frame.atoms {
            write!(
                writer,
                "{} {} {} {} {}",
                atom.local_index, atom.position.x, atom.position.y, atom.position.z, atom.type_token
            )?;
            if with_coordination {
                write!(writer, " {}", atom.coordination.unwrap_or(0))?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }
}

fn next_value(
    lines: &mut impl Iterator<Item = std::io::Result<(usize, String)>>,
    item: &str,
) -> Result<(usize, String), FormatError> {
    match lines.next() {
        Some(res) => Ok(res?),
        None => Err(FormatError::MissingRecord(format!("value of ITEM: {}", item))),
    }
}

/// Coordination numbers are written as floating-point values; they must be whole and non-negative.
fn parse_coordination(token: &str, line: usize) -> Result<u32, FormatError> {
    let value = parse_float(token, line, "coordination number")?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(FormatError::Parse {
            line,
            kind: ParseErrorKind::InvalidInt {
                field: "coordination number",
                value: token.to_string(),
            },
        });
    }
    Ok(value as u32)
}
