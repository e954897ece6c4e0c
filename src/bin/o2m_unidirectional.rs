//! One-to-many scenario: addresses and users, no back-reference, schemas printed

use relmap::Scenario;

fn main() -> anyhow::Result<()> {
    relmap::logging::init(None);
    let report = Scenario::OneToManyUnidirectional.run()?;
    print!("{}", report);
    Ok(())
}
