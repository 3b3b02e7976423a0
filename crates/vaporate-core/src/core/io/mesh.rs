//! The evaporation solver's ASCII node file.
//!
//! ```text
//! ASCII 5 0 0
//! 1e-10	2e-10	3e-10	10	0
//! ...
//! # 10=W 11=W
//! ```

use super::error::{FormatError, ParseErrorKind, parse_float, parse_int, require_columns};
use super::traits::TextFormat;
use crate::core::models::node::Node;
use crate::core::models::snapshot::{GeometrySnapshot, MeshHeader, SpeciesLegend};
use nalgebra::Point3;
use std::io::{BufRead, Write};

const HEADER_MARKER: &str = "ASCII";
const LEGEND_PREFIX: char = '#';

pub struct MeshFile;

impl TextFormat for MeshFile {
    type Record = GeometrySnapshot;

    fn read_from(reader: &mut impl BufRead) -> Result<GeometrySnapshot, FormatError> {
        let mut header: Option<(usize, MeshHeader)> = None;
        let mut nodes = Vec::new();
        let mut legend: Option<SpeciesLegend> = None;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if header.is_none() {
                header = Some(parse_header(trimmed, line_num)?);
                continue;
            }

            if trimmed.starts_with(LEGEND_PREFIX) {
                if legend.is_some() {
                    return Err(FormatError::Parse {
                        line: line_num,
                        kind: ParseErrorKind::UnexpectedRecord(line),
                    });
                }
                legend = Some(parse_legend(trimmed, line_num)?.with_source_line(line));
                continue;
            }
            if legend.is_some() {
                return Err(FormatError::Inconsistency(format!(
                    "node record on line {} follows the species legend",
                    line_num
                )));
            }

            nodes.push(parse_node(&line, line_num)?.with_source_line(line));
        }

        let (declared, header) =
            header.ok_or_else(|| FormatError::MissingRecord("ASCII header".into()))?;
        if declared != nodes.len() {
            return Err(FormatError::Inconsistency(format!(
                "header declares {} nodes but {} node records were found",
                declared,
                nodes.len()
            )));
        }

        Ok(GeometrySnapshot::new(
            header,
            nodes,
            legend.unwrap_or_default(),
        ))
    }

    fn write_to(snapshot: &GeometrySnapshot, writer: &mut impl Write) -> Result<(), FormatError> {
        write!(writer, "{} {}", HEADER_MARKER, snapshot.node_count())?;
        for flag in &snapshot.header.flags {
            write!(writer, " {}", flag)?;
        }
        writeln!(writer)?;

        for node in snapshot.nodes() {
            match node.source_line() {
                Some(line) => writeln!(writer, "{}", line)?,
                None => writeln!(writer, "{}", format_node(node))?,
            }
        }

        match snapshot.legend.source_line() {
            Some(line) => writeln!(writer, "{}", line)?,
            None => writeln!(writer, "{}", format_legend(&snapshot.legend))?,
        }
        Ok(())
    }
}

fn parse_header(line: &str, line_num: usize) -> Result<(usize, MeshHeader), FormatError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.first() != Some(&HEADER_MARKER) {
        return Err(FormatError::MissingRecord("ASCII header".into()));
    }
    require_columns(&tokens, 2, line_num)?;
    let count = parse_int(tokens[1], line_num, "node count")?;
    let flags = tokens[2..].iter().map(|t| t.to_string()).collect();
    Ok((count, MeshHeader { flags }))
}

fn parse_node(line: &str, line_num: usize) -> Result<Node, FormatError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    require_columns(&tokens, 5, line_num)?;
    let x = parse_float(tokens[0], line_num, "x")?;
    let y = parse_float(tokens[1], line_num, "y")?;
    let z = parse_float(tokens[2], line_num, "z")?;
    let category_code = parse_int(tokens[3], line_num, "category code")?;
    let charge_state = parse_float(tokens[4], line_num, "charge state")?;
    Ok(Node::new(Point3::new(x, y, z), category_code, charge_state))
}

fn parse_legend(line: &str, line_num: usize) -> Result<SpeciesLegend, FormatError> {
    let body = line.trim_start_matches(LEGEND_PREFIX);
    let mut entries = Vec::new();
    for pair in body.split_whitespace() {
        let invalid = || FormatError::Parse {
            line: line_num,
            kind: ParseErrorKind::InvalidLegendEntry(pair.to_string()),
        };
        let (id, label) = pair.split_once('=').ok_or_else(invalid)?;
        let id: u32 = id.parse().map_err(|_| invalid())?;
        if label.is_empty() {
            return Err(invalid());
        }
        entries.push((id, label.to_string()));
    }
    Ok(SpeciesLegend::new(entries))
}

/// Formats a node as a tab-separated record, coordinates in exponent notation.
pub fn format_node(node: &Node) -> String {
    format!(
        "{:e}\t{:e}\t{:e}\t{}\t{}",
        node.position.x, node.position.y, node.position.z, node.category_code, node.charge_state
    )
}

pub fn format_legend(legend: &SpeciesLegend) -> String {
    let mut line = String::from(LEGEND_PREFIX);
    for (id, label) in legend.entries() {
        line.push_str(&format!(" {}={}", id, label));
    }
    line
}
