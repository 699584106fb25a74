use anyhow::Result;
use chrono::NaiveTime;

/// Serialize a header row plus data rows into CSV bytes.
pub fn to_csv_bytes(header: &[&str], rows: &[Vec<String>]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("csv buffer flush failed: {}", e))
}

/// Times are exported as HH:MM:SS, missing values as `--`.
pub fn time_or_dashes(time: Option<NaiveTime>) -> String {
    time.map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--".to_string())
}

/// Uploaded files are expected in UTF-8; anything else is read as Latin-1
/// so an import never fails outright on encoding.
pub fn decode_csv_bytes(bytes: &[u8]) -> String {
    match String::from_utf8(bytes.to_vec()) {
        Ok(text) => text,
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_rows() {
        let bytes = to_csv_bytes(
            &["Date", "Status"],
            &[vec!["2025-01-06".into(), "Present".into()]],
        )
        .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "Date,Status\n2025-01-06,Present\n");
    }

    #[test]
    fn quotes_fields_with_commas() {
        let bytes = to_csv_bytes(&["Reason"], &[vec!["fever, flu".into()]]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "Reason\n\"fever, flu\"\n");
    }

    #[test]
    fn formats_times_with_placeholder() {
        let t = NaiveTime::from_hms_opt(9, 5, 0).unwrap();
        assert_eq!(time_or_dashes(Some(t)), "09:05:00");
        assert_eq!(time_or_dashes(None), "--");
    }

    #[test]
    fn latin1_fallback_keeps_every_byte() {
        let bytes = [b'n', 0xE9, b'e']; // "née" in Latin-1
        assert_eq!(decode_csv_bytes(&bytes), "n\u{e9}e");
        assert_eq!(decode_csv_bytes(b"plain"), "plain");
    }
}
