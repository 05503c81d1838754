use std::io::{BufReader, BufWriter, Write};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Write anything serializable in a compact binary form, creating parent directories as needed.
pub fn write_binary<T: Serialize>(path: &str, obj: &T) -> Result<()> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs_err::create_dir_all(parent)?;
        }
    }
    let mut file = BufWriter::new(fs_err::File::create(path)?);
    bincode::serialize_into(&mut file, obj).with_context(|| format!("serializing {}", path))?;
    file.flush()?;
    Ok(())
}

pub fn read_binary<T: DeserializeOwned>(path: &str) -> Result<T> {
    let file = BufReader::new(fs_err::File::open(path)?);
    let obj = bincode::deserialize_from(file).with_context(|| format!("deserializing {}", path))?;
    Ok(obj)
}
