//! CSV bias ledger
//!
//! The ledger is a two-column CSV file (`file,bias`) holding at most one row
//! per labeled filename. Updates rewrite the whole file rather than patching
//! it in place.

use std::path::Path;

use anyhow::{Context, Result};

const HEADER: [&str; 2] = ["file", "bias"];

/// Records `bias` for `file_name`, replacing any prior row for that filename.
///
/// Existing rows keep their order; the new row goes at the end. A missing
/// ledger file is created with the header and the single new row. Rows with a
/// field count other than two are dropped silently.
pub fn record_bias(output: &Path, file_name: &str, bias: f32) -> Result<()> {
    let mut rows = if output.exists() {
        read_rows(output)?
    } else {
        Vec::new()
    };
    rows.retain(|(name, _)| name != file_name);
    rows.push((file_name.to_string(), bias.to_string()));

    let mut writer = csv::Writer::from_path(output)
        .with_context(|| format!("couldn't write bias ledger: {}", output.display()))?;
    writer
        .write_record(HEADER)
        .context("couldn't write bias ledger header")?;
    for (name, value) in &rows {
        writer
            .write_record([name.as_str(), value.as_str()])
            .with_context(|| format!("couldn't write bias ledger row for {name}"))?;
    }
    writer.flush().context("couldn't flush bias ledger")?;
    Ok(())
}

/// Reads the `(file, bias)` rows of an existing ledger, skipping the header
/// and any row that does not have exactly two fields.
pub fn read_rows(path: &Path) -> Result<Vec<(String, String)>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("couldn't read bias ledger: {}", path.display()))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.with_context(|| format!("couldn't parse bias ledger: {}", path.display()))?;
        if record.len() == 2 {
            rows.push((record[0].to_string(), record[1].to_string()));
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_ledger_is_created_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("biases.csv");

        record_bias(&path, "img1.png", 0.7).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("file,bias\n"));
        assert!(contents.contains("img1.png,0.7"));
    }

    #[test]
    fn test_relabeling_keeps_exactly_one_row_with_the_latest_bias() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("biases.csv");

        record_bias(&path, "img1.png", 0.2).unwrap();
        record_bias(&path, "img2.png", 0.8).unwrap();
        record_bias(&path, "img1.png", 0.9).unwrap();

        let rows = read_rows(&path).unwrap();
        assert_eq!(
            rows,
            vec![
                ("img2.png".to_string(), "0.8".to_string()),
                ("img1.png".to_string(), "0.9".to_string()),
            ]
        );
    }

    #[test]
    fn test_malformed_rows_are_dropped_on_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("biases.csv");
        std::fs::write(&path, "file,bias\na.png,0.5\nbroken\nb.png,0.25,extra\n").unwrap();

        record_bias(&path, "c.png", 0.1).unwrap();

        let rows = read_rows(&path).unwrap();
        assert_eq!(
            rows,
            vec![
                ("a.png".to_string(), "0.5".to_string()),
                ("c.png".to_string(), "0.1".to_string()),
            ]
        );
    }

    #[test]
    fn test_exact_boundary_bias_serializes_plainly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("biases.csv");

        record_bias(&path, "tie.png", 0.5).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("tie.png,0.5"));
    }
}
