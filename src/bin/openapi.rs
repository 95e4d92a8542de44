use anyhow::Result;

// Print the OpenAPI document to stdout.
fn main() -> Result<()> {
    println!("{}", flatauth::api::openapi().to_pretty_json()?);
    Ok(())
}
