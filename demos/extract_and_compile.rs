//! Extracts constraints from a source snippet, compiles them into an
//! IR, and prints the result plus any diagnostics.
//!
//! Run with:
//!   cargo run --example extract_and_compile

use ananke_core::braid::Braid;
use ananke_core::clew::Clew;
use ananke_core::error::Result;

const SOURCE: &str = r#"
/// Never log the raw password.
pub async fn authenticate(username: &str, password: &str) -> Result<Session, AuthError> {
    assert!(!username.is_empty());
    let user = lookup_user(username).await?;
    verify_password(&user, password)?;
    Ok(Session::new(user))
}
"#;

#[tokio::main]
async fn main() -> Result<()> {
    ananke_core::init_tracing();

    println!("=== Ananke: extract + compile ===\n");

    let clew = Clew::default();
    let constraints = clew.extract_from_code(SOURCE, "rust").await?;
    println!("Clew extracted {} constraint(s):", constraints.len());
    for c in constraints.iter() {
        println!("  - [{:?}/{:?}] {}", c.kind, c.enforcement, c.name);
    }
    println!();

    let braid = Braid::default();
    let output = braid.compile(constraints.constraints).await?;

    println!("Braid compiled IR '{}' (priority {}):", output.ir.name, output.ir.priority);
    println!("  grammar:       {}", output.ir.grammar.is_some());
    println!("  json_schema:   {}", output.ir.json_schema.is_some());
    println!("  regex rules:   {}", output.ir.regex_patterns.len());
    println!("  token masks:   {}", output.ir.token_masks.is_some());

    if !output.diagnostics.is_empty() {
        println!("\nDiagnostics:");
        for line in output.diagnostics.as_readable_lines() {
            println!("  - {line}");
        }
    }

    if !output.holes.is_empty() {
        println!("\nHoles left for a downstream refiner:");
        for hole in &output.holes {
            println!("  - {} ({:?}, {:?})", hole.provenance, hole.scale, hole.origin);
        }
    }

    Ok(())
}
