/**
 * Task files on disk are UTF-16 with a byte order mark, matching what the
 * scheduler itself exports. Reading sniffs the mark and falls back to UTF-8
 * for hand-written files.
 */
use crate::schtasks::error::SchtasksError;
use log::error;
use std::fs;
use std::path::Path;

/// Read a task XML file, decoding by its byte order mark.
pub fn read_task_file(path: &Path) -> Result<String, SchtasksError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            error!("[tasks] Could not read task file {path:?}: {err:?}");
            return Err(SchtasksError::ReadFile);
        }
    };

    if bytes.starts_with(&[0xff, 0xfe]) {
        let code_units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        return Ok(String::from_utf16_lossy(&code_units));
    }
    if bytes.starts_with(&[0xfe, 0xff]) {
        let code_units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return Ok(String::from_utf16_lossy(&code_units));
    }

    Ok(String::from_utf8_lossy(&bytes).to_string())
}

/// Write task XML as UTF-16 little endian with a byte order mark.
pub fn write_task_file(path: &Path, xml: &str) -> Result<(), SchtasksError> {
    let mut bytes: Vec<u8> = vec![0xff, 0xfe];
    for code_unit in xml.encode_utf16() {
        bytes.extend_from_slice(&code_unit.to_le_bytes());
    }

    if let Err(err) = fs::write(path, bytes) {
        error!("[tasks] Could not write task file {path:?}: {err:?}");
        return Err(SchtasksError::WriteFile);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{read_task_file, write_task_file};
    use crate::schtasks::error::SchtasksError;
    use std::path::PathBuf;

    #[test]
    fn test_utf16_round_trip() {
        let mut path = std::env::temp_dir();
        path.push("task_file_round_trip.xml");
        let xml = "<?xml version=\"1.0\" encoding=\"UTF-16\"?><Task>π</Task>";

        write_task_file(&path, xml).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], &[0xff, 0xfe]);

        let read_back = read_task_file(&path).unwrap();
        assert_eq!(read_back, xml);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_read_utf8_fallback() {
        let mut path = std::env::temp_dir();
        path.push("task_file_utf8.xml");
        std::fs::write(&path, "<Task/>").unwrap();
        assert_eq!(read_task_file(&path).unwrap(), "<Task/>");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_read_big_endian() {
        let mut path = std::env::temp_dir();
        path.push("task_file_be.xml");
        let mut bytes: Vec<u8> = vec![0xfe, 0xff];
        for code_unit in "<Task/>".encode_utf16() {
            bytes.extend_from_slice(&code_unit.to_be_bytes());
        }
        std::fs::write(&path, bytes).unwrap();
        assert_eq!(read_task_file(&path).unwrap(), "<Task/>");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_task_file(&PathBuf::from("/definitely/not/here.xml"));
        assert_eq!(result.unwrap_err(), SchtasksError::ReadFile);
    }
}
