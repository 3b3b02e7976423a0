//! Evaporation result files: a header block closed by an `ASCII` marker line, then one
//! row per event whose third column is the evaporated node's index.

use super::error::{FormatError, parse_int, require_columns};
use crate::core::models::event::EvaporationEvent;
use std::io::BufRead;

const DATA_MARKER: &str = "ASCII";
const NODE_INDEX_COLUMN: usize = 2;

pub fn read_events(reader: &mut impl BufRead) -> Result<Vec<EvaporationEvent>, FormatError> {
    let mut in_data = false;
    let mut events = Vec::new();

    for (line_num, line_res) in reader.lines().enumerate() {
        let line = line_res?;
        let line_num = line_num + 1;
        let trimmed = line.trim();

        if !in_data {
            in_data = trimmed == DATA_MARKER;
            continue;
        }
        if trimmed.is_empty() {
            continue;
        }
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        require_columns(&tokens, NODE_INDEX_COLUMN + 1, line_num)?;
        let node_index = parse_int(tokens[NODE_INDEX_COLUMN], line_num, "node index")?;
        events.push(EvaporationEvent::new(node_index));
    }

    if !in_data {
        return Err(FormatError::MissingRecord(format!(
            "'{}' data marker",
            DATA_MARKER
        )));
    }
    Ok(events)
}
