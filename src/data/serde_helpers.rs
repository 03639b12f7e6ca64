/// `Option<Uuid>` counterpart of `bson::serde_helpers::uuid_1_as_binary`.
pub mod optional_uuid_as_binary {
    use bson::serde_helpers::uuid_1_as_binary;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use uuid::Uuid;

    pub fn serialize<S: Serializer>(value: &Option<Uuid>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(id) => uuid_1_as_binary::serialize(id, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<bson::Binary>::deserialize(deserializer)?
            .map(|binary| Uuid::from_slice(&binary.bytes).map_err(D::Error::custom))
            .transpose()
    }
}
