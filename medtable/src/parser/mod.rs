//! Delimited text parsing with encoding and delimiter auto-detection.
//!
//! Produces raw header and row strings only; mapping onto a schema and
//! normalizing values happens in [`crate::ingest`].

use crate::error::{IngestError, IngestResult};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Result of parsing with metadata
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    /// Header row as written in the file
    pub headers: Vec<String>,
    /// Data rows; may be shorter or longer than `headers`
    pub rows: Vec<Vec<String>>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes with the named encoding, lossy UTF-8 when the label is unknown.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding_rs::Encoding::for_label(encoding.trim().as_bytes()) {
        Some(enc) => enc.decode(bytes).0.into_owned(),
        None => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Decode an export. Valid UTF-8 (with or without BOM) is taken as is;
/// anything else goes through charset detection.
///
/// Returns the text and the encoding name used.
pub fn decode_bytes(bytes: &[u8]) -> (String, String) {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(text) => (text.to_string(), "utf-8".to_string()),
        Err(_) => {
            let encoding = detect_encoding(bytes);
            (decode_content(bytes, &encoding), encoding)
        }
    }
}

/// Pick `;` or `,` from the header line.
///
/// The header is the first non-blank line, as the CSV reader skips blank
/// ones. Semicolon wins when the header has at least one and no more commas
/// than semicolons; spreadsheet exports in German locales use it.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content
        .trim_start_matches('\u{feff}')
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("");

    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();

    if semicolons > 0 && semicolons >= commas {
        ';'
    } else {
        ','
    }
}

/// Parse text with an explicit delimiter. The first row is the header;
/// blank rows are skipped.
pub fn parse_str(content: &str, delimiter: char) -> IngestResult<ParseResult> {
    let delimiter_byte = u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| IngestError::Csv(format!("delimiter '{}' is not ASCII", delimiter)))?;

    let content = content.trim_start_matches('\u{feff}');
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(ParseResult {
        headers,
        rows,
        encoding: "utf-8".to_string(),
        delimiter,
    })
}

/// Parse text, detecting the delimiter.
pub fn parse_str_auto(content: &str) -> IngestResult<ParseResult> {
    parse_str(content, detect_delimiter(content))
}

/// Parse raw bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> IngestResult<ParseResult> {
    let (content, encoding) = decode_bytes(bytes);
    let mut result = parse_str_auto(&content)?;
    result.encoding = encoding;
    Ok(result)
}
