//! Surface classification files written by the evaporation solver.
//!
//! After a fixed header of five lines, each row starts with a node number followed by a
//! classification code; code `10` marks a surface node. The table ends at the first
//! blank line.

use super::error::{FormatError, parse_int, require_columns};
use std::collections::BTreeSet;
use std::io::BufRead;

const HEADER_LINES: usize = 5;
const SURFACE_CODE: &str = "10";

/// Reads the 1-based indices of all surface nodes.
pub fn read_surface_nodes(reader: &mut impl BufRead) -> Result<BTreeSet<usize>, FormatError> {
    let mut surface = BTreeSet::new();
    for (line_num, line_res) in reader.lines().enumerate().skip(HEADER_LINES) {
        let line = line_res?;
        let line_num = line_num + 1;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            break;
        }
        require_columns(&tokens, 2, line_num)?;
        if tokens[1] == SURFACE_CODE {
            surface.insert(parse_int(tokens[0], line_num, "node number")?);
        }
    }
    Ok(surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "h1\nh2\nh3\nh4\nh5\n";

    #[test]
    fn collects_nodes_flagged_as_surface() {
        let text = format!("{HEADER}1 10\n2 0\n3 10 extra\n4 3\n");
        let nodes = read_surface_nodes(&mut Cursor::new(text)).unwrap();
        assert_eq!(nodes.into_iter().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn stops_at_first_blank_line() {
        let text = format!("{HEADER}1 10\n\n2 10\n");
        let nodes = read_surface_nodes(&mut Cursor::new(text)).unwrap();
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn header_only_file_has_no_surface() {
        let nodes = read_surface_nodes(&mut Cursor::new(HEADER)).unwrap();
        assert!(nodes.is_empty());
    }

    #[test]
    fn single_column_row_is_rejected() {
        let text = format!("{HEADER}7\n");
        let err = read_surface_nodes(&mut Cursor::new(text)).unwrap_err();
        assert!(matches!(err, FormatError::Parse { line: 6, .. }));
    }
}
