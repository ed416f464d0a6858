use serde::ser::{Serialize, SerializeSeq, SerializeStruct, Serializer};

use crate::record::{Position, Record};

/// A record serializes as a sequence of its fields. Its position is left out.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for field in self {
            seq.serialize_element(field)?;
        }
        seq.end()
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("Position", 3)?;
        st.serialize_field("byte", &self.byte())?;
        st.serialize_field("line", &self.line())?;
        st.serialize_field("record", &self.record())?;
        st.end()
    }
}
