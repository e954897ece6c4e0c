//! Relationship descriptors
//!
//! A relationship is declared once as a [`Join`] between two record types and
//! compiled against the registered table definitions when the schema is
//! built. Two join shapes exist:
//! - `Reference`: a column on one side equals a column on the other
//!   (one-to-many through a plain scalar column, no foreign key)
//! - `Secondary`: both sides meet through an association table
//!   (many-to-many)

use crate::record::{Record, ID_COLUMN};
use crate::schema::TableDef;
use crate::{Error, Result};
use std::fmt;
use std::marker::PhantomData;

/// One end of a join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The record the relationship is declared on
    Local,
    /// The related record
    Remote,
}

impl Side {
    pub fn flip(self) -> Side {
        match self {
            Side::Local => Side::Remote,
            Side::Remote => Side::Local,
        }
    }
}

/// How many related records a relationship yields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

/// Matching condition between a source and a target table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Join {
    /// `source.local == target.remote`; `carrier` holds the reference value
    Reference {
        local: &'static str,
        remote: &'static str,
        carrier: Side,
    },
    /// `source.local == assoc.local_key AND assoc.remote_key == target.remote`
    Secondary {
        table: &'static str,
        local: &'static str,
        local_key: &'static str,
        remote_key: &'static str,
        remote: &'static str,
    },
}

impl Join {
    pub fn reference(local: &'static str, remote: &'static str, carrier: Side) -> Self {
        Join::Reference { local, remote, carrier }
    }

    pub fn secondary(
        table: &'static str,
        (local, local_key): (&'static str, &'static str),
        (remote_key, remote): (&'static str, &'static str),
    ) -> Self {
        Join::Secondary {
            table,
            local,
            local_key,
            remote_key,
            remote,
        }
    }

    /// The same condition seen from the target side
    pub fn reversed(&self) -> Join {
        match *self {
            Join::Reference { local, remote, carrier } => Join::Reference {
                local: remote,
                remote: local,
                carrier: carrier.flip(),
            },
            Join::Secondary {
                table,
                local,
                local_key,
                remote_key,
                remote,
            } => Join::Secondary {
                table,
                local: remote,
                local_key: remote_key,
                remote_key: local_key,
                remote: local,
            },
        }
    }

    /// A source carrying the reference points at exactly one target
    pub fn cardinality(&self) -> Cardinality {
        match self {
            Join::Reference { carrier: Side::Local, .. } => Cardinality::One,
            _ => Cardinality::Many,
        }
    }

    /// Column on the source table used to match
    pub fn local_column(&self) -> &'static str {
        match self {
            Join::Reference { local, .. } | Join::Secondary { local, .. } => local,
        }
    }

    /// Column on the target table used to match
    pub fn remote_column(&self) -> &'static str {
        match self {
            Join::Reference { remote, .. } | Join::Secondary { remote, .. } => remote,
        }
    }
}

/// How a link between two records is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LinkPlan {
    /// Insert `(source.local, target.remote)` into the association table
    InsertAssociation { sql: String },
    /// Set the source's reference column to `target.remote`
    UpdateSource { sql: String },
    /// Set the target's reference column to `source.local`
    UpdateTarget { sql: String },
}

/// Untyped relationship metadata kept on the schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipInfo {
    pub name: &'static str,
    pub source: &'static str,
    pub target: &'static str,
    pub join: Join,
    pub back_populates: Option<&'static str>,
}

/// A compiled relationship from records of type `S` to records of type `T`.
///
/// Obtained from [`SchemaBuilder`](crate::schema::SchemaBuilder); loading and
/// linking go through [`Session`](crate::storage::Session).
pub struct Relationship<S: Record, T: Record> {
    info: RelationshipInfo,
    pub(crate) load_sql: String,
    pub(crate) link: LinkPlan,
    _records: PhantomData<fn() -> (S, T)>,
}

impl<S: Record, T: Record> Relationship<S, T> {
    /// Validate `join` against the table definitions and precompute SQL
    pub(crate) fn compile(
        name: &'static str,
        join: Join,
        back_populates: Option<&'static str>,
        source: &TableDef,
        target: &TableDef,
        association: Option<&TableDef>,
    ) -> Result<Self> {
        require_column(source, join.local_column(), name)?;
        require_column(target, join.remote_column(), name)?;

        let (load_sql, link) = match &join {
            Join::Reference { local, remote, carrier } => {
                let load_sql = format!(
                    "SELECT {} FROM {} AS t WHERE t.{} = ?1 ORDER BY t.{}",
                    target.column_list(Some("t")),
                    target.name,
                    remote,
                    ID_COLUMN
                );
                let link = match carrier {
                    Side::Local => LinkPlan::UpdateSource {
                        sql: format!(
                            "UPDATE {} SET {} = ?1 WHERE {} = ?2",
                            source.name, local, ID_COLUMN
                        ),
                    },
                    Side::Remote => LinkPlan::UpdateTarget {
                        sql: format!(
                            "UPDATE {} SET {} = ?1 WHERE {} = ?2",
                            target.name, remote, ID_COLUMN
                        ),
                    },
                };
                (load_sql, link)
            }
            Join::Secondary {
                table,
                local_key,
                remote_key,
                remote,
                ..
            } => {
                let assoc = association.filter(|a| a.name == *table).ok_or_else(|| {
                    Error::Schema(format!(
                        "relationship {} uses unregistered association table {}",
                        name, table
                    ))
                })?;
                require_column(assoc, local_key, name)?;
                require_column(assoc, remote_key, name)?;

                let load_sql = format!(
                    "SELECT {} FROM {} AS t JOIN {} AS a ON a.{} = t.{} WHERE a.{} = ?1 ORDER BY t.{}",
                    target.column_list(Some("t")),
                    target.name,
                    assoc.name,
                    remote_key,
                    remote,
                    local_key,
                    ID_COLUMN
                );
                let link = LinkPlan::InsertAssociation {
                    sql: format!(
                        "INSERT INTO {} ({}, {}) VALUES (?1, ?2)",
                        assoc.name, local_key, remote_key
                    ),
                };
                (load_sql, link)
            }
        };

        Ok(Self {
            info: RelationshipInfo {
                name,
                source: source.name,
                target: target.name,
                join,
                back_populates,
            },
            load_sql,
            link,
            _records: PhantomData,
        })
    }

    pub fn name(&self) -> &'static str {
        self.info.name
    }

    pub fn join(&self) -> &Join {
        &self.info.join
    }

    pub fn cardinality(&self) -> Cardinality {
        self.info.join.cardinality()
    }

    /// Name of the inverse relationship on the target, if materialized
    pub fn back_populates(&self) -> Option<&'static str> {
        self.info.back_populates
    }

    pub fn info(&self) -> &RelationshipInfo {
        &self.info
    }

    /// SELECT used to load related records; `?1` is the source's local value
    pub fn load_sql(&self) -> &str {
        &self.load_sql
    }
}

impl<S: Record, T: Record> fmt::Debug for Relationship<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relationship")
            .field("info", &self.info)
            .field("load_sql", &self.load_sql)
            .finish()
    }
}

fn require_column(table: &TableDef, column: &str, relationship: &str) -> Result<()> {
    if table.has_column(column) {
        Ok(())
    } else {
        Err(Error::Schema(format!(
            "relationship {} references unknown column {}.{}",
            relationship, table.name, column
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_reversed() {
        let join = Join::reference("user_uuid", "uuid", Side::Local);
        assert_eq!(join.cardinality(), Cardinality::One);

        let back = join.reversed();
        assert_eq!(back, Join::reference("uuid", "user_uuid", Side::Remote));
        assert_eq!(back.cardinality(), Cardinality::Many);
        assert_eq!(back.reversed(), join);
    }

    #[test]
    fn test_secondary_reversed() {
        let join = Join::secondary(
            "association",
            ("uuid", "parent_uuid"),
            ("child_uuid", "uuid"),
        );
        assert_eq!(join.cardinality(), Cardinality::Many);

        match join.reversed() {
            Join::Secondary { local_key, remote_key, .. } => {
                assert_eq!(local_key, "child_uuid");
                assert_eq!(remote_key, "parent_uuid");
            }
            other => panic!("unexpected join: {:?}", other),
        }
        assert_eq!(join.reversed().cardinality(), Cardinality::Many);
    }
}
