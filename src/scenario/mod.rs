//! Runnable relationship scenarios
//!
//! Each scenario is self-contained: it builds its own schema, opens its own
//! in-memory session, writes sample rows, links them, reads them back and
//! returns a [`Report`].

pub mod many_to_many;
pub mod one_to_many;

use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The available scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    /// Parents and children through an association table
    ManyToMany,
    /// Users and addresses, navigable from both sides
    OneToMany,
    /// Users and addresses, navigable from the address only
    OneToManyUnidirectional,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::ManyToMany => "many-to-many",
            Scenario::OneToMany => "one-to-many",
            Scenario::OneToManyUnidirectional => "one-to-many-unidirectional",
        }
    }

    pub fn all() -> &'static [Scenario] {
        &[
            Scenario::ManyToMany,
            Scenario::OneToMany,
            Scenario::OneToManyUnidirectional,
        ]
    }

    pub fn description(&self) -> &'static str {
        match self {
            Scenario::ManyToMany => "Parent <-> Child through an association table",
            Scenario::OneToMany => "Address -> User by user_uuid, with User.addresses back-reference",
            Scenario::OneToManyUnidirectional => "Address -> User by user_uuid, no back-reference",
        }
    }

    /// Whether the default report ends with the CREATE TABLE statements
    pub fn prints_schemas(&self) -> bool {
        !matches!(self, Scenario::OneToMany)
    }

    pub fn run(&self) -> Result<Report> {
        self.run_with(&RunOptions::default())
    }

    pub fn run_with(&self, options: &RunOptions) -> Result<Report> {
        tracing::info!("Running scenario {}", self);
        let show_schemas = options.show_schemas.unwrap_or_else(|| self.prints_schemas());
        let report = match self {
            Scenario::ManyToMany => many_to_many::run(show_schemas)?,
            Scenario::OneToMany => one_to_many::run(true, show_schemas)?,
            Scenario::OneToManyUnidirectional => one_to_many::run(false, show_schemas)?,
        };
        tracing::info!("Scenario {} produced {} sections", self, report.sections.len());
        Ok(report)
    }
}

impl FromStr for Scenario {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "many-to-many" | "m2m" => Ok(Scenario::ManyToMany),
            "one-to-many" | "o2m" => Ok(Scenario::OneToMany),
            "one-to-many-unidirectional" | "o2m-unidirectional" => {
                Ok(Scenario::OneToManyUnidirectional)
            }
            _ => Err(Error::Config(format!("Unknown scenario: {}", s))),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Knobs for a scenario run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Force the schema section on or off; `None` keeps the scenario default
    pub show_schemas: Option<bool>,
}

/// Output of one scenario run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub scenario: Scenario,
    pub sections: Vec<Section>,
}

impl Report {
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            write!(f, "{}", section)?;
        }
        Ok(())
    }
}

/// A titled block of report entries
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub title: &'static str,
    pub entries: Vec<Entry>,
}

impl Section {
    pub fn new(title: &'static str) -> Self {
        Self {
            title,
            entries: Vec::new(),
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.title)?;
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        writeln!(f)
    }
}

/// One printed line (or statement) of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entry {
    Parent {
        name: Option<String>,
        children: Vec<String>,
    },
    Child {
        name: Option<String>,
        parents: Vec<String>,
    },
    User {
        name: Option<String>,
        /// Address ids, present when the back-reference exists
        #[serde(skip_serializing_if = "Option::is_none")]
        addresses: Option<Vec<i64>>,
    },
    Address {
        user: String,
        /// Name of the resolved owner, absent when the reference dangles
        owner: Option<String>,
    },
    Ddl {
        statement: String,
    },
}

fn display_name(name: &Option<String>) -> &str {
    name.as_deref().unwrap_or("None")
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Parent { name, children } => write!(
                f,
                "Parent: name={}, children={}",
                display_name(name),
                QuotedList(children)
            ),
            Entry::Child { name, parents } => write!(
                f,
                "Child: name={}, parents={}",
                display_name(name),
                QuotedList(parents)
            ),
            // addresses and owner are reported in JSON only
            Entry::User { name, .. } => write!(f, "User: name={}", display_name(name)),
            Entry::Address { user, .. } => write!(f, "Address: user={}", user),
            Entry::Ddl { statement } => write!(f, "{}", statement),
        }
    }
}

/// `['a', 'b']` list of single-quoted names
struct QuotedList<'a>(&'a [String]);

impl fmt::Display for QuotedList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            // double quotes only when the name holds a single quote and no double quote
            let quote = if name.contains('\'') && !name.contains('"') { '"' } else { '\'' };
            write!(f, "{}", quote)?;
            for c in name.chars() {
                if c == '\\' || c == quote {
                    write!(f, "\\")?;
                }
                write!(f, "{}", c)?;
            }
            write!(f, "{}", quote)?;
        }
        f.write_str("]")
    }
}

/// Names of related records, `None` for a missing name
pub(crate) fn names<'a>(names: impl IntoIterator<Item = &'a Option<String>>) -> Vec<String> {
    names
        .into_iter()
        .map(|n| display_name(n).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_roundtrip() {
        for scenario in Scenario::all() {
            let parsed: Scenario = scenario.as_str().parse().unwrap();
            assert_eq!(*scenario, parsed);
        }
        assert_eq!(Scenario::from_str("M2M").unwrap(), Scenario::ManyToMany);
        assert!(Scenario::from_str("one-to-one").is_err());
    }

    #[test]
    fn test_entry_display() {
        let parent = Entry::Parent {
            name: Some("John Doe".to_string()),
            children: vec!["Jimmy Doe".to_string()],
        };
        assert_eq!(parent.to_string(), "Parent: name=John Doe, children=['Jimmy Doe']");

        let child = Entry::Child {
            name: Some("Jimmy Doe".to_string()),
            parents: vec!["John Doe".to_string(), "Jane O'Neil".to_string()],
        };
        assert_eq!(
            child.to_string(),
            "Child: name=Jimmy Doe, parents=['John Doe', \"Jane O'Neil\"]"
        );

        let user = Entry::User { name: None, addresses: None };
        assert_eq!(user.to_string(), "User: name=None");

        let user = Entry::User {
            name: Some("John Doe".to_string()),
            addresses: Some(vec![1]),
        };
        assert_eq!(user.to_string(), "User: name=John Doe");

        let address = Entry::Address {
            user: "u".to_string(),
            owner: Some("John Doe".to_string()),
        };
        assert_eq!(address.to_string(), "Address: user=u");
    }

    #[test]
    fn test_section_layout() {
        let mut section = Section::new("Children");
        section.entries.push(Entry::Child {
            name: Some("Jimmy Doe".to_string()),
            parents: vec![],
        });
        assert_eq!(
            section.to_string(),
            "# Children\nChild: name=Jimmy Doe, parents=[]\n\n"
        );
    }

    #[test]
    fn test_report_json_is_tagged() {
        let report = Report {
            scenario: Scenario::OneToMany,
            sections: vec![Section {
                title: "Users",
                entries: vec![Entry::User {
                    name: Some("John Doe".to_string()),
                    addresses: None,
                }],
            }],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["scenario"], "one-to-many");
        assert_eq!(json["sections"][0]["entries"][0]["kind"], "user");
        assert!(json["sections"][0]["entries"][0].get("addresses").is_none());
    }
}
