//! One-to-many scenario: addresses and users, with the User.addresses back-reference

use relmap::Scenario;

fn main() -> anyhow::Result<()> {
    relmap::logging::init(None);
    let report = Scenario::OneToMany.run()?;
    print!("{}", report);
    Ok(())
}
