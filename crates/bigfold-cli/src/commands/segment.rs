use super::progress_handler;
use crate::cli::SegmentArgs;
use crate::config::build_segment_plan;
use crate::error::{CliError, Result};
use bigfold::core::io::fasta;
use bigfold::engine::progress::ProgressReporter;
use bigfold::workflows;
use std::fs;
use tracing::info;

pub fn run(args: SegmentArgs, quiet: bool) -> Result<()> {
    let plan = build_segment_plan(&args)?;

    info!("Reading sequences from {:?}", &plan.input_path);
    let records =
        fasta::read_records_from_path(&plan.input_path).map_err(|e| CliError::FileParsing {
            path: plan.input_path.clone(),
            source: e.into(),
        })?;
    if records.is_empty() {
        return Err(CliError::Argument(format!(
            "No sequences found in {}",
            plan.input_path.display()
        )));
    }

    let progress_handler = progress_handler(quiet);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let sets = workflows::segment::run(&records, &plan.core_config, &reporter)?;

    fs::create_dir_all(&plan.output_dir)?;
    for set in &sets {
        let path = fasta::write_chunk_set_to_dir(set, plan.core_config.line_width, &plan.output_dir)?;
        info!(id = set.parent_id(), chunks = set.len(), "Wrote {:?}", &path);
        println!(
            "✓ {} ({} residues) -> {} chunk(s) in {}",
            set.parent_id(),
            set.chunks().last().map_or(0, |c| c.end),
            set.len(),
            path.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn args(input: PathBuf, output_dir: PathBuf) -> SegmentArgs {
        SegmentArgs {
            input,
            output_dir,
            config: None,
            segment_length: Some(10),
            overlap_length: Some(4),
            line_width: None,
            set_values: vec![],
        }
    }

    #[test]
    fn writes_one_chunk_file_per_sequence() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.fa");
        fs::write(&input, ">long\nMKVLAAGIVGLLLAQW\n>short\nMKV\n").unwrap();
        let out = dir.path().join("chunks");

        run(args(input, out.clone()), true).unwrap();

        let file = fs::File::open(out.join("long_segments.fa")).unwrap();
        let set = fasta::read_chunk_set(&mut BufReader::new(file)).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.reconstruct_sequence(), "MKVLAAGIVGLLLAQW");

        let whole = fs::read_to_string(out.join("short.fa")).unwrap();
        assert!(whole.starts_with(">short_1-3\nMKV\n"));
    }

    #[test]
    fn empty_input_is_an_argument_error() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("empty.fa");
        fs::write(&input, "").unwrap();

        let result = run(args(input, dir.path().to_path_buf()), true);
        assert!(matches!(result, Err(CliError::Argument(_))));
    }
}
