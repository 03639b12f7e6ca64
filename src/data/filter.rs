use bson::spec::BinarySubtype;
use bson::{doc, Binary, Bson, Document};
use uuid::Uuid;

/// Matches how `uuid_1_as_binary` stores ids.
#[inline]
pub fn uuid_bson(id: Uuid) -> Bson {
    Bson::Binary(Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.as_bytes().to_vec(),
    })
}

#[inline]
pub fn by_id(id: Uuid) -> Document {
    doc! { "_id": uuid_bson(id) }
}

#[inline]
pub fn by_ids(ids: impl IntoIterator<Item = Uuid>) -> Document {
    let ids: Vec<Bson> = ids.into_iter().map(uuid_bson).collect();
    doc! { "_id": { "$in": ids } }
}

#[inline]
pub fn by_email(email: impl Into<String>) -> Document {
    doc! { "email": email.into() }
}

#[inline]
pub fn active() -> Document {
    doc! { "isActive": true }
}

/// Combines filters; later keys win on collision.
pub fn all(filters: impl IntoIterator<Item = Document>) -> Document {
    let mut combined = Document::new();
    for filter in filters {
        for (key, value) in filter {
            combined.insert(key, value);
        }
    }
    combined
}
