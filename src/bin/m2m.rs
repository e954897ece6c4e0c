//! Many-to-many scenario: parents and children through an association table

use relmap::Scenario;

fn main() -> anyhow::Result<()> {
    relmap::logging::init(None);
    let report = Scenario::ManyToMany.run()?;
    print!("{}", report);
    Ok(())
}
