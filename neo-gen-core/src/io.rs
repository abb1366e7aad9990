use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::{env, io};

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Reads a CSV file with a header row.
///
/// - The first line is skipped
/// - Blank lines are ignored
/// - Fields are parsed with `parse_csv_line`
pub(crate) fn read_csv<P: AsRef<Path>>(filename: P) -> io::Result<Vec<Vec<String>>> {
	Ok(read_file(filename)?
		.iter()
		.skip(1)
		.filter_map(|line| parse_csv_line(line))
		.collect())
}

/// Parses a single CSV line into fields.
///
/// Rules:
/// - Commas inside double quotes are kept
/// - `""` inside a quoted field stands for one `"`
/// - Blank lines return `None`
pub fn parse_csv_line(line: &str) -> Option<Vec<String>> {
	if line.trim().is_empty() {
		return None;
	}

	let mut fields = Vec::new();
	let mut field = String::new();
	let mut in_quotes = false;
	let mut chars = line.chars().peekable();
	while let Some(c) = chars.next() {
		match c {
			'"' if in_quotes && chars.peek() == Some(&'"') => {
				field.push('"');
				chars.next();
			}
			'"' => in_quotes = !in_quotes,
			',' if !in_quotes => fields.push(std::mem::take(&mut field)),
			_ => field.push(c),
		}
	}
	fields.push(field);
	Some(fields)
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub(crate) fn normalize_folder(input: &Path) -> PathBuf {
	if input == Path::new(".") || input == Path::new("./") {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		input.to_path_buf()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_simple_line() {
		assert_eq!(parse_csv_line("a,b,c"), Some(vec!["a".into(), "b".into(), "c".into()]));
	}

	#[test]
	fn keeps_commas_inside_quotes() {
		assert_eq!(parse_csv_line("a,\"b,b2\",c"), Some(vec!["a".into(), "b,b2".into(), "c".into()]));
	}

	#[test]
	fn unescapes_doubled_quotes() {
		assert_eq!(parse_csv_line("\"a\",\"b\"\"c\",d"), Some(vec!["a".into(), "b\"c".into(), "d".into()]));
	}

	#[test]
	fn keeps_trailing_empty_fields() {
		assert_eq!(parse_csv_line("a,,"), Some(vec!["a".into(), String::new(), String::new()]));
	}

	#[test]
	fn blank_lines_are_skipped() {
		assert_eq!(parse_csv_line(""), None);
		assert_eq!(parse_csv_line("   "), None);
	}

	#[test]
	fn csv_files_skip_their_header() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("rows.csv");
		std::fs::write(&path, "id,form\np1,bio-\n\np2,\"micro-\"\n").unwrap();
		let rows = read_csv(&path).unwrap();
		assert_eq!(rows, vec![vec!["p1".to_owned(), "bio-".to_owned()], vec!["p2".to_owned(), "micro-".to_owned()]]);
	}
}
