use coinpulse_domain::errors::DatasetError;
use coinpulse_domain::value_objects::raw_table::RawTable;
use std::fs;
use std::path::Path;

const DELIMITER: u8 = b'|';
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub fn read_table(path: &Path, dataset: &str) -> Result<RawTable, DatasetError> {
    let bytes = fs::read(path).map_err(|err| {
        DatasetError::io(
            dataset,
            format!("failed to read table {}: {}", path.display(), err),
        )
    })?;
    parse_table(&bytes, dataset, &path.display().to_string())
}

/// Parses pipe-delimited UTF-8 text with a header row.
///
/// A leading byte-order mark is ignored. Rows whose field count differs from
/// the header (including rows the csv reader cannot decode) are skipped and
/// counted on the returned table; only a non-UTF-8 payload fails the load.
pub fn parse_table(bytes: &[u8], dataset: &str, file: &str) -> Result<RawTable, DatasetError> {
    let _span = tracing::info_span!("infra.tables.parse", dataset = %dataset, file = %file).entered();

    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    std::str::from_utf8(body).map_err(|err| DatasetError::Encoding {
        dataset: dataset.to_string(),
        file: file.to_string(),
        reason: err.to_string(),
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .flexible(true)
        .from_reader(body);

    let headers: Vec<String> = match reader.headers() {
        Ok(record) => record.iter().map(str::to_string).collect(),
        Err(err) => {
            return Err(DatasetError::io(
                dataset,
                format!("failed to read header of {file}: {err}"),
            ))
        }
    };

    let mut table = RawTable::new(dataset, headers);
    for result in reader.records() {
        match result {
            Ok(record) => {
                table.push_row(record.iter().map(str::to_string).collect());
            }
            Err(err) => {
                tracing::debug!(error = %err, "skipping undecodable row");
                table.skipped_rows += 1;
            }
        }
    }

    metrics::counter!("coinpulse.infra.tables.rows_total", "dataset" => dataset.to_string())
        .increment(table.len() as u64);
    metrics::counter!("coinpulse.infra.tables.skipped_rows_total", "dataset" => dataset.to_string())
        .increment(table.skipped_rows as u64);
    if table.skipped_rows > 0 {
        tracing::warn!(skipped = table.skipped_rows, "skipped malformed rows");
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::{parse_table, read_table};
    use coinpulse_domain::errors::DatasetError;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_tmp_path(name: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!("coinpulse_{name}_{}_{}", std::process::id(), now))
    }

    #[test]
    fn parses_pipe_delimited_rows_and_strips_bom() {
        let data = "\u{feff}date|crypto|sentiment\n2024-11-01|Bitcoin|bullish\n2024-11-02|Ethereum|bearish\n";
        let table = parse_table(data.as_bytes(), "sentiment", "inline").expect("parse");
        assert_eq!(table.headers, vec!["date", "crypto", "sentiment"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1][1], "Ethereum");
        assert_eq!(table.skipped_rows, 0);
    }

    #[test]
    fn corrupt_trailing_row_is_skipped_not_fatal() {
        let data = "date|crypto|sentiment\n2024-11-01|Bitcoin|bullish\n2024-11-02|Eth";
        let table = parse_table(data.as_bytes(), "sentiment", "inline").expect("parse");
        assert_eq!(table.len(), 1);
        assert_eq!(table.skipped_rows, 1);
    }

    #[test]
    fn header_only_input_is_an_empty_table() {
        let table = parse_table(b"date | crypto | price\n", "prices", "inline").expect("parse");
        assert!(table.is_empty());
        assert_eq!(table.headers, vec!["date", "crypto", "price"]);
    }

    #[test]
    fn non_utf8_payload_names_the_file() {
        let err = parse_table(b"date|crypto\n\xff\xfe|x\n", "prices", "prices.csv")
            .expect_err("encoding error");
        assert!(matches!(err, DatasetError::Encoding { ref file, .. } if file == "prices.csv"));
        assert!(err.to_string().contains("prices.csv"));
    }

    #[test]
    fn read_table_reports_missing_file_as_io() {
        let err = read_table(&unique_tmp_path("missing.csv"), "prices").expect_err("io");
        assert_eq!(err.kind(), "io");
    }

    #[test]
    fn read_table_loads_from_disk() {
        let path = unique_tmp_path("table.csv");
        fs::write(&path, "date|crypto|price\n2024-12-01|Solana|231.5\n").expect("write");
        let table = read_table(&path, "prices").expect("read");
        assert_eq!(table.len(), 1);
        assert_eq!(table.name, "prices");
        let _ = fs::remove_file(&path);
    }
}
