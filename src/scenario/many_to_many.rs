//! Many-to-many: parents and children linked through `association`

use super::{names, Entry, Report, Scenario, Section};
use crate::models::{self, Child, Parent};
use crate::record::Record;
use crate::relation::Relationship;
use crate::schema::SchemaBuilder;
use crate::storage::Session;
use crate::Result;

/// Schema plus both directions of the parent/child relationship
pub struct Model {
    pub session: Session,
    pub children: Relationship<Parent, Child>,
    pub parents: Relationship<Child, Parent>,
}

/// Declare the tables and relationship and open a fresh store
pub fn setup() -> Result<Model> {
    let mut builder = SchemaBuilder::new();
    builder
        .table::<Parent>()?
        .table::<Child>()?
        .association(models::association_table())?;
    let (children, parents) =
        builder.bidirectional::<Parent, Child>("children", "parents", models::parent_child_join())?;

    let session = Session::open_in_memory(builder.build())?;
    Ok(Model {
        session,
        children,
        parents,
    })
}

pub fn run(show_schemas: bool) -> Result<Report> {
    let Model {
        mut session,
        children,
        parents,
    } = setup()?;

    let mut parent = Parent::new("John Doe");
    session.add(&mut parent)?;
    session.commit()?;

    let mut child = Child::new("Jimmy Doe");
    session.add(&mut child)?;
    session.commit()?;

    session.link(&children, &mut parent, &mut child)?;

    let mut parent_section = Section::new("Parents");
    for parent in session.query_all::<Parent>()? {
        let related = session.load_related(&children, &parent)?;
        parent_section.entries.push(Entry::Parent {
            children: names(related.iter().map(|c| &c.name)),
            name: parent.name,
        });
    }

    let mut child_section = Section::new("Children");
    for child in session.query_all::<Child>()? {
        let related = session.load_related(&parents, &child)?;
        child_section.entries.push(Entry::Child {
            parents: names(related.iter().map(|p| &p.name)),
            name: child.name,
        });
    }

    let mut sections = vec![parent_section, child_section];
    if show_schemas {
        let mut schemas = Section::new("Schemas");
        for table in ["association", Parent::TABLE, Child::TABLE] {
            schemas.entries.push(Entry::Ddl {
                statement: session.schema().create_statement(table)?,
            });
        }
        sections.push(schemas);
    }

    Ok(Report {
        scenario: Scenario::ManyToMany,
        sections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report() {
        let report = run(true).unwrap();

        let parents = report.section("Parents").unwrap();
        assert_eq!(
            parents.entries,
            vec![Entry::Parent {
                name: Some("John Doe".to_string()),
                children: vec!["Jimmy Doe".to_string()],
            }]
        );

        let children = report.section("Children").unwrap();
        assert_eq!(
            children.entries,
            vec![Entry::Child {
                name: Some("Jimmy Doe".to_string()),
                parents: vec!["John Doe".to_string()],
            }]
        );

        let schemas = report.section("Schemas").unwrap();
        assert_eq!(schemas.entries.len(), 3);
        assert!(matches!(
            &schemas.entries[0],
            Entry::Ddl { statement } if statement.starts_with("\nCREATE TABLE association (\n\t")
        ));
    }

    #[test]
    fn test_text_output() {
        let text = run(false).unwrap().to_string();
        assert_eq!(
            text,
            "# Parents\n\
             Parent: name=John Doe, children=['Jimmy Doe']\n\
             \n\
             # Children\n\
             Child: name=Jimmy Doe, parents=['John Doe']\n\
             \n"
        );
    }

    #[test]
    fn test_multiple_links() {
        let Model {
            mut session,
            children,
            parents,
        } = setup().unwrap();

        let mut mom = Parent::new("Jane Doe");
        let mut dad = Parent::new("John Doe");
        let mut kid = Child::new("Jimmy Doe");
        session.add(&mut mom).unwrap();
        session.add(&mut dad).unwrap();
        session.add(&mut kid).unwrap();
        session.commit().unwrap();

        session.link(&children, &mut mom, &mut kid).unwrap();
        session.link(&children, &mut dad, &mut kid).unwrap();
        session.commit().unwrap();

        let kid_parents = session.load_related(&parents, &kid).unwrap();
        assert_eq!(kid_parents, vec![mom.clone(), dad.clone()]);
        assert_eq!(session.load_related(&children, &mom).unwrap(), vec![kid]);
    }
}
