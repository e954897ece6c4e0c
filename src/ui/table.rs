use crate::scenario::Scenario;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct ScenarioRow {
    #[tabled(rename = "Scenario")]
    pub name: String,
    #[tabled(rename = "Schemas")]
    pub schemas: String,
    #[tabled(rename = "Description")]
    pub description: String,
}

pub struct TableBuilder {
    rows: Vec<ScenarioRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_scenario(&mut self, scenario: Scenario) {
        self.rows.push(ScenarioRow {
            name: scenario.as_str().to_string(),
            schemas: if scenario.prints_schemas() { "yes" } else { "no" }.to_string(),
            description: scenario.description().to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn scenario_table(scenarios: &[Scenario]) -> String {
    let mut builder = TableBuilder::new();
    for scenario in scenarios {
        builder.add_scenario(*scenario);
    }
    builder.build()
}
