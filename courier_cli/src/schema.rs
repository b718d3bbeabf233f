use schemars::schema_for;

use crate::input::ProblemInput;

pub fn run() -> anyhow::Result<()> {
    let schema = schema_for!(ProblemInput);
    println!("{}", serde_json::to_string_pretty(&schema)?);

    Ok(())
}
