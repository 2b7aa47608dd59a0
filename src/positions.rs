use crate::error::{Error, Result};
use crate::models::Position;
use std::collections::HashMap;

/// Open-position bookkeeping, owned by the orchestrating caller and passed
/// by reference into the evaluation loop. At most one position per token;
/// the analyzers themselves never touch this.
#[derive(Debug, Default)]
pub struct PositionRegistry {
    positions: HashMap<String, Position>,
}

impl PositionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails if the token already has an open position.
    pub fn open(&mut self, token_id: &str, position: Position) -> Result<()> {
        if self.positions.contains_key(token_id) {
            return Err(Error::ValidationError(format!(
                "Token {} already has an open position",
                token_id
            )));
        }
        self.positions.insert(token_id.to_string(), position);
        Ok(())
    }

    pub fn close(&mut self, token_id: &str) -> Option<Position> {
        self.positions.remove(token_id)
    }

    pub fn get(&self, token_id: &str) -> Option<&Position> {
        self.positions.get(token_id)
    }

    pub fn contains(&self, token_id: &str) -> bool {
        self.positions.contains_key(token_id)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Position)> {
        self.positions.iter()
    }
}
