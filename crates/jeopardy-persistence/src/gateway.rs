//! Stream-level save and load behind a shared lock.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::atomic::{atomic_write, with_board_extension};
use crate::error::{PersistenceError, Result};

/// Indentation used for saved documents.
const INDENT: &[u8] = b"\t";

/// Serializes values to and from streams, one operation at a time.
///
/// Cloning a gateway shares its lock: a save and a load issued through
/// any two clones queue behind each other. Independent gateways created
/// with [`PersistenceGateway::new`] do not block each other, which lets
/// tests run in parallel; applications normally share
/// [`PersistenceGateway::global`].
///
/// The gateway never opens streams itself. `save` and `load` take the
/// stream by value and drop (close) it before returning.
#[derive(Debug, Clone, Default)]
pub struct PersistenceGateway {
    lock: Arc<Mutex<()>>,
}

impl PersistenceGateway {
    /// Creates a gateway with its own lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide gateway.
    pub fn global() -> &'static PersistenceGateway {
        static GLOBAL: OnceLock<PersistenceGateway> = OnceLock::new();
        GLOBAL.get_or_init(PersistenceGateway::new)
    }

    fn acquire(&self) -> Result<MutexGuard<'_, ()>> {
        self.lock.lock().map_err(|_| PersistenceError::LockPoisoned)
    }

    /// Writes `value` to `sink` as indented JSON, then closes the sink.
    ///
    /// A failed write may leave the sink partially written; use
    /// [`save_to_path`](Self::save_to_path) for atomic file replacement.
    pub fn save<W: Write, T: Serialize + ?Sized>(&self, mut sink: W, value: &T) -> Result<()> {
        let _guard = self.acquire()?;
        let data = encode(value)?;
        sink.write_all(&data)?;
        sink.flush()?;
        drop(sink);
        debug!(bytes = data.len(), "Saved document to stream");
        Ok(())
    }

    /// Reads a full document from `source` into `target`, then closes the
    /// source.
    ///
    /// `target` is only replaced when decoding succeeds.
    pub fn load<R: Read, T: DeserializeOwned>(&self, source: R, target: &mut T) -> Result<()> {
        let _guard = self.acquire()?;
        *target = decode(BufReader::new(source))?;
        debug!("Loaded document from stream");
        Ok(())
    }

    /// Saves `value` to `path`, adding the `.jpdy` extension if missing.
    ///
    /// The file is replaced atomically, so a failed save leaves any
    /// previous contents intact. Returns the path actually written.
    pub fn save_to_path<T: Serialize + ?Sized>(
        &self,
        path: impl AsRef<Path>,
        value: &T,
    ) -> Result<PathBuf> {
        let path = with_board_extension(path.as_ref());
        let _guard = self.acquire()?;
        let data = encode(value)?;
        atomic_write(&path, &data)?;
        debug!(path = %path.display(), bytes = data.len(), "Saved document to file");
        Ok(path)
    }

    /// Loads a value from the file at `path`.
    pub fn load_from_path<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> Result<T> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| PersistenceError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let _guard = self.acquire()?;
        let value = decode(BufReader::new(file))?;
        debug!(path = %path.display(), "Loaded document from file");
        Ok(value)
    }
}

/// Encodes a value as tab-indented JSON with a trailing newline.
fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut data, formatter);
    value
        .serialize(&mut serializer)
        .map_err(PersistenceError::Serialize)?;
    data.push(b'\n');
    Ok(data)
}

fn decode<R: Read, T: DeserializeOwned>(reader: R) -> Result<T> {
    serde_json::from_reader(reader).map_err(|e| {
        if e.is_io() {
            PersistenceError::Io(e.into())
        } else {
            PersistenceError::Deserialize(e)
        }
    })
}
