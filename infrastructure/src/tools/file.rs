//! File tool: read_file

use std::fs;
use std::path::Path;

use lab_domain::Tool;
use tracing::{error, info};

/// Tool name constant
pub const READ_FILE: &str = "read_file";

/// Maximum file size to read (1 MiB)
pub const MAX_READ_SIZE: u64 = 1024 * 1024;

pub fn read_file_tool() -> Tool {
    Tool::new(
        READ_FILE,
        "Reads a UTF-8 text file and returns its contents. Input should be a file path.",
        read_file,
    )
}

/// Read a text file, reporting every problem as an agent-readable string
pub fn read_file(input: &str) -> String {
    let path_str = input.trim();
    info!(tool = READ_FILE, path = path_str, "read_file tool called");

    match read_capped(Path::new(path_str)) {
        Ok(content) => {
            info!(tool = READ_FILE, bytes = content.len(), "read_file result");
            content
        }
        Err(reason) => {
            error!(tool = READ_FILE, %reason, "read_file error");
            format!("Error reading file: {}", reason)
        }
    }
}

fn read_capped(path: &Path) -> Result<String, String> {
    if path.as_os_str().is_empty() {
        return Err("no path given".to_string());
    }
    if !path.exists() {
        return Err(format!("'{}' does not exist", path.display()));
    }
    if !path.is_file() {
        return Err(format!("'{}' is not a file", path.display()));
    }

    let metadata = fs::metadata(path).map_err(|e| e.to_string())?;
    if metadata.len() > MAX_READ_SIZE {
        return Err(format!(
            "file is too large ({} bytes, max {} bytes)",
            metadata.len(),
            MAX_READ_SIZE
        ));
    }

    fs::read_to_string(path).map_err(|e| e.to_string())
}
