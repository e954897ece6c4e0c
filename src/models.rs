//! Record types used by the scenarios
//!
//! - `Parent` / `Child`: linked many-to-many through the `association` table,
//!   external ids unique per table
//! - `User` / `Address`: linked one-to-many through `addresses.user_uuid`,
//!   no uniqueness and no foreign key

use crate::id::{ExternalId, EXTERNAL_ID_LEN};
use crate::record::Record;
use crate::relation::{Join, Side};
use crate::schema::{ColumnDef, IndexDef, TableDef};
use rusqlite::types::Value;
use serde::Serialize;

const UUID_LEN: Option<u32> = Some(EXTERNAL_ID_LEN as u32);

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn optional_text(value: &Option<String>) -> Value {
    value.as_deref().map(text).unwrap_or(Value::Null)
}

/// Shared layout of `parents` and `children`
fn named_entity_table(name: &'static str, uuid_index: &'static str) -> TableDef {
    TableDef::new(name)
        .column(ColumnDef::integer("id").primary_key())
        .column(ColumnDef::string("uuid", UUID_LEN).not_null())
        .column(ColumnDef::string("name", None))
        .index(IndexDef::unique(uuid_index, &["uuid"]))
}

/// Link table pairing a parent's and a child's external ids
pub fn association_table() -> TableDef {
    TableDef::new("association")
        .column(ColumnDef::string("parent_uuid", UUID_LEN).primary_key())
        .column(ColumnDef::string("child_uuid", UUID_LEN).primary_key())
}

/// `parents.uuid == association.parent_uuid AND association.child_uuid == children.uuid`
pub fn parent_child_join() -> Join {
    Join::secondary(
        "association",
        ("uuid", "parent_uuid"),
        ("child_uuid", "uuid"),
    )
}

/// `addresses.user_uuid == user.uuid`, the address carries the reference
pub fn address_user_join() -> Join {
    Join::reference("user_uuid", "uuid", Side::Local)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parent {
    pub id: Option<i64>,
    pub uuid: ExternalId,
    pub name: Option<String>,
}

impl Parent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            uuid: ExternalId::generate(),
            name: Some(name.into()),
        }
    }
}

impl Record for Parent {
    const TABLE: &'static str = "parents";

    fn table() -> TableDef {
        named_entity_table(Self::TABLE, "parents_uuid_idx")
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("uuid", text(self.uuid.as_str())),
            ("name", optional_text(&self.name)),
        ]
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            uuid: row.get(1)?,
            name: row.get(2)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Child {
    pub id: Option<i64>,
    pub uuid: ExternalId,
    pub name: Option<String>,
}

impl Child {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            uuid: ExternalId::generate(),
            name: Some(name.into()),
        }
    }
}

impl Record for Child {
    const TABLE: &'static str = "children";

    fn table() -> TableDef {
        named_entity_table(Self::TABLE, "children_uuid_idx")
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("uuid", text(self.uuid.as_str())),
            ("name", optional_text(&self.name)),
        ]
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            uuid: row.get(1)?,
            name: row.get(2)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Option<i64>,
    pub uuid: ExternalId,
    pub name: Option<String>,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            uuid: ExternalId::generate(),
            name: Some(name.into()),
        }
    }
}

impl Record for User {
    const TABLE: &'static str = "user";

    fn table() -> TableDef {
        TableDef::new(Self::TABLE)
            .column(ColumnDef::integer("id").primary_key())
            .column(ColumnDef::string("uuid", UUID_LEN).not_null())
            .column(ColumnDef::string("name", None))
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("uuid", text(self.uuid.as_str())),
            ("name", optional_text(&self.name)),
        ]
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            uuid: row.get(1)?,
            name: row.get(2)?,
        })
    }
}

/// An address belonging to a user by external id.
///
/// `user_uuid` is a plain column: it may name a user that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub id: Option<i64>,
    pub user_uuid: ExternalId,
}

impl Address {
    pub fn new(user_uuid: ExternalId) -> Self {
        Self { id: None, user_uuid }
    }
}

impl Record for Address {
    const TABLE: &'static str = "addresses";

    fn table() -> TableDef {
        TableDef::new(Self::TABLE)
            .column(ColumnDef::integer("id").primary_key())
            .column(ColumnDef::string("user_uuid", UUID_LEN).not_null())
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![("user_uuid", text(self.user_uuid.as_str()))]
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_uuid: row.get(1)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniqueness_is_declared_only_for_many_to_many() {
        assert!(Parent::table().indexes.iter().all(|i| i.unique));
        assert!(Child::table().indexes.iter().all(|i| i.unique));
        assert!(User::table().indexes.is_empty());
        assert!(Address::table().indexes.is_empty());
    }

    #[test]
    fn test_value_of() {
        let mut parent = Parent::new("John Doe");
        assert_eq!(parent.value_of("id"), None);
        parent.set_id(7);
        assert_eq!(parent.value_of("id"), Some(Value::Integer(7)));
        assert_eq!(
            parent.value_of("uuid"),
            Some(Value::Text(parent.uuid.to_string()))
        );
        assert_eq!(parent.value_of("missing"), None);
    }

    #[test]
    fn test_nameless_record() {
        let child = Child {
            id: None,
            uuid: ExternalId::generate(),
            name: None,
        };
        assert_eq!(child.value_of("name"), Some(Value::Null));
    }

    #[test]
    fn test_association_ddl() {
        let ddl = association_table().create_statement();
        assert_eq!(
            ddl,
            "\nCREATE TABLE association (\n\
             \tparent_uuid VARCHAR(36) NOT NULL, \n\
             \tchild_uuid VARCHAR(36) NOT NULL, \n\
             \tPRIMARY KEY (parent_uuid, child_uuid)\n\
             )\n\n"
        );
    }
}
