use std::io::Write;
use std::path::Path;

use codeloc_core::Result;
use codeloc_domain::FileRecord;

/// Write `bytes` to a temporary file in the target's directory and move it
/// into place atomically. A crash mid-write never leaves a half-written
/// file at `path`.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.persist(path)?;
    Ok(())
}

/// Read an intermediate or translated record from disk.
pub fn read_records(path: &Path) -> Result<Vec<FileRecord>> {
    let file = std::fs::File::open(path)?;
    let records: Vec<FileRecord> = serde_json::from_reader(std::io::BufReader::new(file))?;
    Ok(records)
}

/// Persist a record atomically as pretty-printed JSON.
pub fn write_records(path: &Path, records: &[FileRecord]) -> Result<()> {
    let mut json = serde_json::to_vec_pretty(records)?;
    json.push(b'\n');
    write_atomic(path, &json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_replaces_content_and_leaves_no_residue() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("file.txt");
        std::fs::write(&target, "old").unwrap();

        write_atomic(&target, b"new").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "new");

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["file.txt".to_string()]);
    }

    #[test]
    fn records_round_trip_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.json");
        let records = vec![FileRecord {
            file: "demo.py".into(),
            map: vec![],
        }];
        write_records(&path, &records).unwrap();
        let loaded = read_records(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].file, "demo.py");
    }
}
