//! Reading ROM images off disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::cpu::Mem;

#[derive(Debug, Error)]
pub enum RomError {
    #[error("couldn't read rom {path:?}")]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("rom is {len} bytes; at most {max} fit in memory", max = Mem::MAX_ROM_LEN)]
    TooLarge { len: usize },
}

/// Read a ROM image, checking it will fit in program space.
pub fn read(path: impl AsRef<Path>) -> Result<Vec<u8>, RomError> {
    let path = path.as_ref();
    let rom = fs::read(path).map_err(|source| RomError::NotFound {
        path: path.to_owned(),
        source,
    })?;
    if rom.len() > Mem::MAX_ROM_LEN {
        return Err(RomError::TooLarge { len: rom.len() });
    }
    log::info!("loaded {} byte rom from {path:?}", rom.len());
    Ok(rom)
}
