// ── Device list import ──
//
// `address,current_password[,new_password]` per line, from a CSV file
// and/or inline items. Fields are always comma separated; double quotes
// protect commas inside a field. Only the address is trimmed, passwords
// are taken verbatim.

use std::path::Path;

use tracing::debug;

use crate::error::CoreError;
use crate::model::DeviceEntry;

const DELIMITER: char = ',';

/// Read devices from an optional CSV file followed by inline items.
///
/// File entries come first; duplicates (same address and password) are
/// dropped, keeping the first occurrence.
pub fn import_devices(csv: Option<&Path>, inline: &[String]) -> Result<Vec<DeviceEntry>, CoreError> {
    let mut entries = Vec::new();

    if let Some(path) = csv {
        let text = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        entries.extend(parse_device_list(&text)?);
        debug!(path = %path.display(), count = entries.len(), "imported device list");
    }

    for (idx, item) in inline.iter().enumerate() {
        if let Some(entry) = parse_line(item, idx + 1)? {
            entries.push(entry);
        }
    }

    Ok(dedup(entries))
}

/// Parse a whole device list.
pub fn parse_device_list(text: &str) -> Result<Vec<DeviceEntry>, CoreError> {
    let mut entries = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if let Some(entry) = parse_line(line, idx + 1)? {
            entries.push(entry);
        }
    }
    Ok(entries)
}

fn parse_line(line: &str, number: usize) -> Result<Option<DeviceEntry>, CoreError> {
    if line.trim().is_empty() {
        return Ok(None);
    }

    let fail = |reason: &str| CoreError::Import {
        line: number,
        content: line.to_owned(),
        reason: reason.to_owned(),
    };

    let mut fields = split_fields(line).into_iter();
    let (Some(address), Some(current)) = (fields.next(), fields.next()) else {
        return Err(fail("need to have at least address and current password"));
    };
    let address = address.trim();
    if address.is_empty() || current.is_empty() {
        return Err(fail("address and current password must not be empty"));
    }
    let new = fields.next();

    Ok(Some(DeviceEntry::new(address, current, new)))
}

fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' if quoted || field.is_empty() => quoted = !quoted,
            DELIMITER if !quoted => fields.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    fields.push(field);
    fields
}

fn dedup(entries: Vec<DeviceEntry>) -> Vec<DeviceEntry> {
    let mut unique: Vec<DeviceEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        if unique.contains(&entry) {
            debug!(rsc = %entry.address, "dropping duplicate entry");
        } else {
            unique.push(entry);
        }
    }
    unique
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn addresses(entries: &[DeviceEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.address.as_str()).collect()
    }

    #[test]
    fn reads_addresses_passwords_and_new_password() {
        let entries = parse_device_list(
            "192.168.0.67,123456789abcdef0!,n3w!\n\nrsc-8DD123FFF,123456789abcdef0+\n10.0.0.2,pw,\n",
        )
        .unwrap();
        assert_eq!(
            addresses(&entries),
            ["192.168.0.67", "rsc-8DD123FFF", "10.0.0.2"]
        );
        assert_eq!(entries[0].old_password.expose_secret(), "123456789abcdef0!");
        assert_eq!(
            entries[0].new_password.as_ref().unwrap().expose_secret(),
            "n3w!"
        );
        assert!(!entries[1].has_new_password());
        assert!(!entries[2].has_new_password());
    }

    #[test]
    fn semicolons_and_tabs_stay_inside_passwords() {
        let entries = parse_device_list("10.0.0.1,Ab;cd;ef1\n10.0.0.2,pw\t2\n").unwrap();
        assert_eq!(addresses(&entries), ["10.0.0.1", "10.0.0.2"]);
        assert_eq!(entries[0].old_password.expose_secret(), "Ab;cd;ef1");
        assert!(!entries[0].has_new_password());
        assert_eq!(entries[1].old_password.expose_secret(), "pw\t2");
    }

    #[test]
    fn only_the_address_is_trimmed() {
        let entries = parse_device_list("  rsc-8DD123FFF , old ,\" new \"\n").unwrap();
        assert_eq!(addresses(&entries), ["rsc-8DD123FFF"]);
        assert_eq!(entries[0].old_password.expose_secret(), " old ");
        assert_eq!(
            entries[0].new_password.as_ref().unwrap().expose_secret(),
            " new "
        );
    }

    #[test]
    fn quoted_fields_keep_delimiters() {
        let entries = parse_device_list("10.0.0.1,\"pa,ss\"\"word\"\n").unwrap();
        assert_eq!(entries[0].old_password.expose_secret(), "pa,ss\"word");
    }

    #[test]
    fn short_line_names_line_number() {
        let err = parse_device_list("10.0.0.1,pw\n\n10.0.0.2\n").unwrap_err();
        match err {
            CoreError::Import { line, content, .. } => {
                assert_eq!(line, 3);
                assert_eq!(content, "10.0.0.2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn file_first_then_inline_without_duplicates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "10.0.0.1,pw1").unwrap();
        writeln!(file, "10.0.0.2,pw2").unwrap();

        let inline = [
            "10.0.0.3,pw3".to_owned(),
            "10.0.0.1,pw1".to_owned(),
            "10.0.0.1,other".to_owned(),
        ];
        let entries = import_devices(Some(file.path()), &inline).unwrap();
        assert_eq!(
            addresses(&entries),
            ["10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.1"]
        );
        assert_eq!(entries[3].old_password.expose_secret(), "other");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = import_devices(Some(Path::new("/nonexistent/rscs.csv")), &[]).unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
    }
}
