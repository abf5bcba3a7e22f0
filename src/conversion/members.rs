use std::collections::HashMap;

use super::record::{member, Record};
use super::ConversionError;

const YOUTH_COST_TIER: &str = "Jugendlicher";

/// Membership records keyed by `"Lastname, Firstname"`, the way pilot names
/// appear in the flight export.
#[derive(Debug, Default)]
pub struct MemberIndex {
    members: HashMap<String, Record>,
}

impl MemberIndex {
    pub fn new() -> MemberIndex {
        MemberIndex {
            members: HashMap::new(),
        }
    }

    /// Builds the index from membership rows. A later row with the same name
    /// replaces an earlier one. A row without a name field fails the build.
    pub fn build<I>(records: I) -> Result<MemberIndex, ConversionError>
    where
        I: IntoIterator<Item = Record>,
    {
        let mut index = MemberIndex::new();
        for record in records {
            index.insert(record)?;
        }

        Ok(index)
    }

    pub fn insert(&mut self, record: Record) -> Result<(), ConversionError> {
        let key = format!("{}, {}", record.field(member::LAST_NAME)?, record.field(member::FIRST_NAME)?);
        self.members.insert(key, record);

        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Record> {
        self.members.get(name)
    }

    /// Member ID for a name, `None` when the name is not a known member.
    pub fn member_id(&self, name: &str) -> Result<Option<&str>, ConversionError> {
        match self.get(name) {
            Some(record) => Ok(Some(record.field(member::ID)?)),
            None => Ok(None),
        }
    }

    /// Whether the named member pays the youth rate. Unknown names are not.
    pub fn is_youth(&self, name: &str) -> Result<bool, ConversionError> {
        match self.get(name) {
            Some(record) => Ok(record.field(member::COST_TIER)? == YOUTH_COST_TIER),
            None => Ok(false),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
