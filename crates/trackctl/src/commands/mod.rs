//! Command implementations for trackctl

pub mod decode;
pub mod listen;
pub mod outline;

/// Pretty-print a serializable value to stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), crate::error::CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
