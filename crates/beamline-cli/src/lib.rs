//! CLI logic for the beamline lattice tool.
//!
//! This module contains the core CLI logic: reading a lattice document,
//! assembling the requested sequences, printing the node table and
//! optionally writing the assembled lattice back as a document.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::{debug, info};

use beamline::{BeamlineError, Lattice, LatticeBuilder};

/// Run the beamline CLI application
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `BeamlineError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
/// - Assembly errors
pub fn run(args: &Args) -> Result<(), BeamlineError> {
    info!(input_path = args.input; "Processing lattice");

    let mut app_config = config::load_config(args.config.as_ref())?;
    if let Some(max_drift_length) = args.max_drift_length {
        debug!(max_drift_length = max_drift_length; "Overriding maximum drift length");
        app_config = app_config.with_max_drift_length(max_drift_length);
    }

    let source = fs::read_to_string(&args.input)?;

    let builder = LatticeBuilder::new(app_config);
    let document = builder.parse(&source)?;

    let names: Vec<String> = if args.sequences.is_empty() {
        document
            .sequence_names()
            .iter()
            .map(|name| name.to_text())
            .collect()
    } else {
        args.sequences.clone()
    };
    let names: Vec<&str> = names.iter().map(String::as_str).collect();

    let lattice = builder.assemble(&document, &names)?;
    print!("{}", format_table(&lattice));

    if let Some(output) = &args.output {
        fs::write(output, builder.to_document(&lattice))?;
        info!(output_file = output; "Lattice document written");
    }

    Ok(())
}

const HEADERS: [&str; 7] = ["name", "type", "start", "center", "end", "parts", "children"];

/// Render the top-level nodes of `lattice` as an aligned table in lattice
/// coordinates, followed by the total length.
pub fn format_table(lattice: &Lattice) -> String {
    let mut rows: Vec<[String; 7]> = Vec::new();
    for sequence in lattice.sequences() {
        let offset = sequence.position();
        for (index, node) in sequence.nodes().iter().enumerate() {
            let extent = node.extent().translate(offset);
            rows.push([
                node.name().to_text(),
                node.kind().tag().to_string(),
                format!("{:.6}", extent.start()),
                format!("{:.6}", extent.center()),
                format!("{:.6}", extent.end()),
                node.part_count().to_string(),
                sequence.children_of(index).count().to_string(),
            ]);
        }
    }

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut table = String::new();
    push_row(&mut table, &HEADERS, &widths);
    for row in &rows {
        push_row(&mut table, row, &widths);
    }
    table.push_str(&format!("total length: {:.6}\n", lattice.length()));
    table
}

fn push_row(table: &mut String, cells: &[impl AsRef<str>], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(column, (cell, &width))| {
            // Names and types read left to right, numbers line up on the right.
            if column < 2 {
                format!("{:<width$}", cell.as_ref())
            } else {
                format!("{:>width$}", cell.as_ref())
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    table.push_str(line.trim_end());
    table.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
        <LINAC>
          <MEBT length="1.0">
            <accElement name="Q1" type="QUAD" length="0.2" pos="0.5">
              <parameters field="3"/>
            </accElement>
            <accElement name="M1" type="MARKER" length="0" pos="0.5"/>
          </MEBT>
          <DTL1 length="0.5"/>
        </LINAC>
    "#;

    #[test]
    fn test_format_table() {
        let lattice = LatticeBuilder::default()
            .build(SOURCE, &["MEBT", "DTL1"])
            .unwrap();
        let table = format_table(&lattice);
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("name"));
        assert!(lines[2].starts_with("Q1 "));
        assert!(lines[2].ends_with("1         1"));
        assert!(lines[4].starts_with("DTL1:START:1:drift"));
        assert!(lines[4].contains("1.500000"));
        assert_eq!(lines[5], "total length: 1.500000");
    }
}
