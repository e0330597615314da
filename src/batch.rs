//! Reading and bundling the line-oriented batch file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::errors::{Error, Result};

/// Read task command lines from the batch file.
///
/// One task per non-empty line; blank lines and `#` comment lines are
/// skipped, trailing whitespace is trimmed.
pub fn read_tasks(path: &Path) -> Result<Vec<String>> {
    let io_err = |source| Error::BatchIo {
        file: path.display().to_string(),
        source,
    };
    let file = File::open(path).map_err(&io_err)?;
    let mut tasks = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(&io_err)?;
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        tasks.push(line.to_string());
    }
    Ok(tasks)
}

/// Group consecutive task lines into compound commands, `bundle_size` lines
/// per array task. A task stops at the first failing line in its bundle.
pub fn bundle(tasks: &[String], bundle_size: usize) -> Vec<String> {
    tasks
        .chunks(bundle_size.max(1))
        .map(|chunk| chunk.join(" && "))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn skips_blanks_and_comments() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "echo a\n\n# comment\necho b  \n   \n").unwrap();
        file.flush().unwrap();

        let tasks = read_tasks(file.path()).unwrap();
        assert_eq!(tasks, vec!["echo a".to_string(), "echo b".to_string()]);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_tasks(Path::new("/no/such/batch.sh")).unwrap_err();
        assert!(err.to_string().contains("/no/such/batch.sh"));
    }

    #[test]
    fn bundles_consecutive_lines() {
        let tasks: Vec<String> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(bundle(&tasks, 2), vec!["a && b", "c && d", "e"]);
        assert_eq!(bundle(&tasks, 1), tasks);
        assert_eq!(bundle(&tasks, 0), tasks);
        assert_eq!(bundle(&tasks, 10), vec!["a && b && c && d && e"]);
    }
}
