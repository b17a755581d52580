//! Named-operation registry.
//!
//! Tasks carry a reference to a registered operation rather than an arbitrary
//! closure, so the set of things the pool can run is a closed, inspectable
//! namespace. Names resolve at submit time; workers never touch the registry.

use crate::error::{Error, Result};
use crate::task::{OpFn, OpResult, Payload};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

pub struct OperationRegistry {
    ops: RwLock<HashMap<Arc<str>, Arc<OpFn>>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self {
            ops: RwLock::new(HashMap::new()),
        }
    }

    /// Install an operation under `name`. Names are single-assignment.
    pub fn register<F>(&self, name: &str, op: F) -> Result<()>
    where
        F: Fn(Payload) -> OpResult + Send + Sync + 'static,
    {
        let mut ops = self.ops.write();
        if ops.contains_key(name) {
            return Err(Error::OperationExists(name.to_string()));
        }
        ops.insert(Arc::from(name), Arc::new(op));
        Ok(())
    }

    /// Look up an operation, returning the interned name alongside it.
    pub fn resolve(&self, name: &str) -> Option<(Arc<str>, Arc<OpFn>)> {
        self.ops
            .read()
            .get_key_value(name)
            .map(|(k, v)| (Arc::clone(k), Arc::clone(v)))
    }

    pub fn len(&self) -> usize {
        self.ops.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.read().is_empty()
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ops = self.ops.read();
        let mut names: Vec<&str> = ops.keys().map(|k| k.as_ref()).collect();
        names.sort_unstable();
        f.debug_struct("OperationRegistry")
            .field("ops", &names)
            .finish()
    }
}
