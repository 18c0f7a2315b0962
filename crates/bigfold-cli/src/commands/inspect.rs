use crate::cli::InspectArgs;
use crate::error::{CliError, Result};
use bigfold::core::io::pdb::PdbFile;
use bigfold::core::io::residue_table::{self, ResidueRow};
use bigfold::core::io::traits::MolecularFile;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing::info;

pub fn run(args: InspectArgs) -> Result<()> {
    let (system, _) = PdbFile::read_from_path(&args.input).map_err(|e| CliError::FileParsing {
        path: args.input.clone(),
        source: e.into(),
    })?;
    let rows = residue_table::residue_rows(&system);
    info!(
        "Read {} residue(s) in {} chain(s) from {:?}",
        rows.len(),
        system.chain_count(),
        &args.input
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&rows, &mut out)?;
    out.flush()?;

    if let Some(csv_path) = &args.csv {
        let file = File::create(csv_path)?;
        residue_table::write_csv(&rows, BufWriter::new(file)).map_err(|e| {
            CliError::FileParsing {
                path: csv_path.clone(),
                source: e.into(),
            }
        })?;
        info!("Residue table written to {:?}", csv_path);
    }
    Ok(())
}

/// One `#chain:number (code)<TAB>confidence` line per residue, then a summary.
fn write_report(rows: &[ResidueRow], out: &mut impl Write) -> io::Result<()> {
    for row in rows {
        writeln!(out, "{}\t{:.2}", row, row.confidence)?;
    }
    if !rows.is_empty() {
        let mean = rows.iter().map(|r| r.confidence).sum::<f64>() / rows.len() as f64;
        writeln!(out, "# {} residues, mean confidence {:.2}", rows.len(), mean)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    const TWO_RESIDUES: &str = "\
ATOM      1  N   MET A   1      11.104   6.134  -6.504  1.00 91.50           N
ATOM      2  CA  MET A   1      11.639   6.071  -5.147  1.00 91.50           C
ATOM      3  N   LYS A   2      12.560   7.020  -3.340  1.00 62.25           N
ATOM      4  CA  LYS A   2      13.320   8.210  -3.010  1.00 62.25           C
END
";

    #[test]
    fn report_lists_residues_with_confidence_and_mean() {
        let rows = vec![
            ResidueRow {
                chain: 'A',
                number: 1,
                name: "MET".into(),
                code: 'M',
                confidence: 91.5,
                atoms: 2,
            },
            ResidueRow {
                chain: 'A',
                number: 2,
                name: "LYS".into(),
                code: 'K',
                confidence: 62.25,
                atoms: 2,
            },
        ];
        let mut out = Vec::new();
        write_report(&rows, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "#A:1 (M)\t91.50");
        assert_eq!(lines[1], "#A:2 (K)\t62.25");
        assert_eq!(lines[2], "# 2 residues, mean confidence 76.88");
    }

    #[test]
    fn writes_csv_table_for_a_pdb_file() {
        let dir = tempdir().unwrap();
        let pdb = dir.path().join("model.pdb");
        std::fs::write(&pdb, TWO_RESIDUES).unwrap();
        let csv = dir.path().join("residues.csv");

        run(InspectArgs {
            input: pdb,
            csv: Some(csv.clone()),
        })
        .unwrap();

        let rows = residue_table::read_csv(File::open(csv).unwrap()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].code, 'K');
        assert_eq!(rows[1].confidence, 62.25);
    }

    #[test]
    fn missing_input_is_a_parsing_error() {
        let result = run(InspectArgs {
            input: PathBuf::from("/nonexistent/model.pdb"),
            csv: None,
        });
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }
}
