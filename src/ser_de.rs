use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::DistinguishedName;

impl Serialize for DistinguishedName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let stringified = self.to_string();
        stringified.serialize(serializer)
    }
}
impl<'de> Deserialize<'de> for DistinguishedName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let stringified = String::deserialize(deserializer)?;
        Ok(Self::new(stringified))
    }
}
