//! Binary serialization for grammars using postcard.

use super::json::GrammarError;
use super::types::Grammar;

impl Grammar {
    /// Deserialize grammar from binary format.
    pub fn from_binary(bytes: &[u8]) -> Result<Self, GrammarError> {
        Ok(postcard::from_bytes(bytes)?)
    }

    /// Serialize grammar to binary format.
    pub fn to_binary(&self) -> Result<Vec<u8>, GrammarError> {
        Ok(postcard::to_allocvec(self)?)
    }
}
