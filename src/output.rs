use crate::statistics::ComparisonRecord;
use anyhow::{Context, Result};
use csv::Writer;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

pub async fn write_output_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    fs::write(path, bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    info!(path = %path.display(), bytes = bytes.len(), "output written");
    Ok(())
}

fn finalize_writer(mut writer: Writer<Vec<u8>>, label: &str) -> Result<Vec<u8>> {
    writer
        .flush()
        .with_context(|| format!("failed to flush {label}"))?;
    writer
        .into_inner()
        .with_context(|| format!("failed to finalize {label}"))
}

pub fn serialize_comparisons(records: &[ComparisonRecord]) -> Result<Vec<u8>> {
    let mut writer = Writer::from_writer(Vec::new());
    for record in records {
        writer
            .serialize(record)
            .context("failed to serialize comparison record")?;
    }
    finalize_writer(writer, "comparison CSV writer")
}

/// `statistics.csv` becomes `statistics.csv.gz`.
pub fn archive_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".gz");
    PathBuf::from(name)
}

fn gzip(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(bytes)
        .context("failed to compress CSV output")?;
    encoder.finish().context("failed to finish gzip stream")
}

/// Saves the comparison table, gzipped when `archive` is set. Returns the
/// path actually written.
pub async fn save_comparisons_csv(
    records: &[ComparisonRecord],
    path: &Path,
    archive: bool,
) -> Result<PathBuf> {
    let serialized = serialize_comparisons(records)?;
    if archive {
        let target = archive_path(path);
        write_output_file(&target, &gzip(&serialized)?).await?;
        Ok(target)
    } else {
        write_output_file(path, &serialized).await?;
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::{Period, PeriodFigures, StatisticsPayload, build_comparisons};
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn records() -> Vec<ComparisonRecord> {
        let payload = StatisticsPayload {
            sales: PeriodFigures {
                current: 300.0,
                previous: 200.0,
            },
            ..StatisticsPayload::default()
        };
        build_comparisons(&payload, Period::Month)
    }

    #[test]
    fn csv_has_header_and_labels() {
        let bytes = serialize_comparisons(&records()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("metric,period,current,previous,change"));
        assert_eq!(lines.next(), Some("sales,month,300.0,200.0,+50%"));
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn archive_appends_gz() {
        assert_eq!(
            archive_path(Path::new("data/output/statistics.csv")),
            PathBuf::from("data/output/statistics.csv.gz")
        );
    }

    #[tokio::test]
    async fn archived_csv_decompresses_to_plain_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("statistics.csv");
        let written = save_comparisons_csv(&records(), &path, true).await.unwrap();
        assert_eq!(written, archive_path(&path));
        assert!(!path.exists());

        let compressed = std::fs::read(&written).unwrap();
        let mut decoded = String::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_string(&mut decoded)
            .unwrap();
        let plain = String::from_utf8(serialize_comparisons(&records()).unwrap()).unwrap();
        assert_eq!(decoded, plain);
    }

    #[tokio::test]
    async fn plain_csv_is_written_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statistics.csv");
        let written = save_comparisons_csv(&records(), &path, false).await.unwrap();
        assert_eq!(written, path);
        assert!(path.exists());
    }
}
