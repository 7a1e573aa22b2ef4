//! Save/Load for run progress
//!
//! The run (wallet, level, quota, loadout and upgrade board) is written with
//! bincode behind a version number. Encounters are never saved; a run is
//! only persisted between fights.

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use crate::engine::RunState;

/// Version number for save file format (increment when format changes)
pub const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    /// Save format version
    pub version: u32,
    pub run: RunState,
}

impl RunSnapshot {
    pub fn new(run: RunState) -> Self {
        Self {
            version: SAVE_VERSION,
            run,
        }
    }
}

/// Write the run to `writer`
pub fn save_run<W: Write>(writer: W, run: &RunState) -> Result<(), SaveError> {
    let snapshot = RunSnapshot::new(run.clone());
    bincode::serialize_into(writer, &snapshot)?;
    log::info!(
        "Saved run: level {}, {} captures, balance {}",
        run.level,
        run.total_captures,
        run.wallet.balance
    );
    Ok(())
}

/// Read a run written by [`save_run`]
pub fn load_run<R: Read>(reader: R) -> Result<RunState, SaveError> {
    let snapshot: RunSnapshot = bincode::deserialize_from(reader)?;
    if snapshot.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: snapshot.version,
        });
    }
    log::info!("Loaded run: level {}", snapshot.run.level);
    Ok(snapshot.run)
}

/// Human-readable snapshot, for debugging and external tools
pub fn export_json(run: &RunState) -> Result<String, SaveError> {
    Ok(serde_json::to_string_pretty(&RunSnapshot::new(run.clone()))?)
}

/// Errors that can occur during save/load
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    Json(serde_json::Error),
    VersionMismatch { expected: u32, found: u32 },
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(e: serde_json::Error) -> Self {
        SaveError::Json(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::Json(e) => write!(f, "JSON error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(f, "Save version mismatch: expected {}, found {}", expected, found)
            }
        }
    }
}

impl std::error::Error for SaveError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CombatEngine;

    #[test]
    fn test_save_load_roundtrip() {
        let mut engine = CombatEngine::with_seed(7);
        engine.run.wallet.award(340);
        engine.run.level = 3;
        engine.run.total_captures = 5;
        engine.run.loadout.multipliers.power = 1.3;

        let mut buffer = Vec::new();
        engine.save_run(&mut buffer).expect("Save failed");

        let mut loaded = CombatEngine::with_seed(8);
        loaded.load_run(&buffer[..]).expect("Load failed");
        assert_eq!(loaded.run, engine.run);
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let snapshot = RunSnapshot {
            version: SAVE_VERSION + 1,
            run: RunState::default(),
        };
        let bytes = bincode::serialize(&snapshot).unwrap();
        match load_run(&bytes[..]) {
            Err(SaveError::VersionMismatch { expected, found }) => {
                assert_eq!(expected, SAVE_VERSION);
                assert_eq!(found, SAVE_VERSION + 1);
            }
            other => panic!("expected a version mismatch, got {:?}", other.map(|r| r.level)),
        }
    }

    #[test]
    fn test_truncated_save_is_an_error() {
        let mut buffer = Vec::new();
        save_run(&mut buffer, &RunState::default()).unwrap();
        buffer.truncate(buffer.len() / 2);
        assert!(matches!(load_run(&buffer[..]), Err(SaveError::Bincode(_))));
    }

    #[test]
    fn test_export_json() {
        let json = export_json(&RunState::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], SAVE_VERSION);
        assert_eq!(value["run"]["level"], 1);
        assert_eq!(value["run"]["quota"], 2);
    }
}
