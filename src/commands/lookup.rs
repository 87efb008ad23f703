//! The `lookup` command: print the value bound to a name.

use crate::error::Result;
use crate::exit;
use crate::outcome::Outcome;

pub fn run(name: &str) -> Result<Outcome> {
    let code = exit::lookup(name)?;
    println!("{}", code);
    Ok(Outcome::Completed)
}
