//! One-to-many: addresses referencing users by external id
//!
//! `Address.user` is always declared. With a back-reference the inverse
//! `User.addresses` is materialized as well; without it users cannot reach
//! their addresses.

use super::{Entry, Report, Scenario, Section};
use crate::models::{self, Address, User};
use crate::record::Record;
use crate::relation::Relationship;
use crate::schema::SchemaBuilder;
use crate::storage::Session;
use crate::Result;

pub struct Model {
    pub session: Session,
    pub user: Relationship<Address, User>,
    /// Present only with a back-reference
    pub addresses: Option<Relationship<User, Address>>,
}

pub fn setup(backref: bool) -> Result<Model> {
    let mut builder = SchemaBuilder::new();
    builder.table::<User>()?.table::<Address>()?;

    let (user, addresses) = if backref {
        let (user, addresses) =
            builder.bidirectional::<Address, User>("user", "addresses", models::address_user_join())?;
        (user, Some(addresses))
    } else {
        let user = builder.relationship::<Address, User>("user", models::address_user_join())?;
        (user, None)
    };

    let session = Session::open_in_memory(builder.build())?;
    Ok(Model {
        session,
        user,
        addresses,
    })
}

pub fn run(backref: bool, show_schemas: bool) -> Result<Report> {
    let Model {
        mut session,
        user: user_rel,
        addresses,
    } = setup(backref)?;

    let mut user = User::new("John Doe");
    session.add(&mut user)?;
    session.commit()?;

    let mut address = Address::new(user.uuid.clone());
    session.add(&mut address)?;
    session.commit()?;

    let mut user_section = Section::new("Users");
    for user in session.query_all::<User>()? {
        let address_ids: Option<Vec<i64>> = match &addresses {
            Some(rel) => Some(
                session
                    .load_related(rel, &user)?
                    .iter()
                    .filter_map(|a| a.id)
                    .collect(),
            ),
            None => None,
        };
        user_section.entries.push(Entry::User {
            name: user.name,
            addresses: address_ids,
        });
    }

    let mut address_section = Section::new("Addresses");
    for address in session.query_all::<Address>()? {
        let owner = session.load_one(&user_rel, &address)?;
        address_section.entries.push(Entry::Address {
            user: address.user_uuid.to_string(),
            owner: owner.and_then(|u| u.name),
        });
    }

    let mut sections = vec![user_section, address_section];
    if show_schemas {
        let mut schemas = Section::new("Schemas");
        for table in [User::TABLE, Address::TABLE] {
            schemas.entries.push(Entry::Ddl {
                statement: session.schema().create_statement(table)?,
            });
        }
        sections.push(schemas);
    }

    let scenario = if backref {
        Scenario::OneToMany
    } else {
        Scenario::OneToManyUnidirectional
    };
    Ok(Report { scenario, sections })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExternalId;

    #[test]
    fn test_backref_report() {
        let report = run(true, false).unwrap();
        assert_eq!(report.scenario, Scenario::OneToMany);
        assert!(report.section("Schemas").is_none());

        let users = &report.section("Users").unwrap().entries;
        assert_eq!(
            users,
            &vec![Entry::User {
                name: Some("John Doe".to_string()),
                addresses: Some(vec![1]),
            }]
        );

        let addresses = &report.section("Addresses").unwrap().entries;
        assert_eq!(addresses.len(), 1);
        match &addresses[0] {
            Entry::Address { user, owner } => {
                assert!(user.parse::<ExternalId>().is_ok());
                assert_eq!(owner.as_deref(), Some("John Doe"));
            }
            other => panic!("unexpected entry: {:?}", other),
        }
    }

    #[test]
    fn test_unidirectional_report() {
        let report = run(false, true).unwrap();
        assert_eq!(report.scenario, Scenario::OneToManyUnidirectional);

        let users = &report.section("Users").unwrap().entries;
        assert_eq!(
            users,
            &vec![Entry::User {
                name: Some("John Doe".to_string()),
                addresses: None,
            }]
        );

        let schemas = &report.section("Schemas").unwrap().entries;
        assert_eq!(
            schemas[1],
            Entry::Ddl {
                statement: "\nCREATE TABLE addresses (\n\
                            \tid INTEGER NOT NULL, \n\
                            \tuser_uuid VARCHAR(36) NOT NULL, \n\
                            \tPRIMARY KEY (id)\n\
                            )\n\n"
                .to_string(),
            }
        );
    }

    #[test]
    fn test_text_output() {
        let report = run(true, false).unwrap();
        let uuid = match &report.section("Addresses").unwrap().entries[0] {
            Entry::Address { user, .. } => user.clone(),
            other => panic!("unexpected entry: {:?}", other),
        };

        assert_eq!(
            report.to_string(),
            format!(
                "# Users\n\
                 User: name=John Doe\n\
                 \n\
                 # Addresses\n\
                 Address: user={}\n\
                 \n",
                uuid
            )
        );
    }

    #[test]
    fn test_unidirectional_declares_single_relationship() {
        let model = setup(false).unwrap();
        assert!(model.addresses.is_none());
        assert_eq!(model.session.schema().relationships().len(), 1);
        assert!(model.session.schema().relationships_of(User::TABLE).is_empty());
    }

    #[test]
    fn test_address_matches_user_uuid() {
        let Model {
            mut session,
            addresses,
            ..
        } = setup(true).unwrap();
        let addresses = addresses.unwrap();

        let mut user = User::new("John Doe");
        session.add(&mut user).unwrap();
        session.commit().unwrap();
        let mut address = Address::new(user.uuid.clone());
        session.add(&mut address).unwrap();
        let mut stray = Address::new(ExternalId::generate());
        session.add(&mut stray).unwrap();
        session.commit().unwrap();

        let stored = session.query_all::<Address>().unwrap();
        assert_eq!(stored[0].user_uuid, user.uuid);
        assert_eq!(session.load_related(&addresses, &user).unwrap(), vec![address]);
    }
}
