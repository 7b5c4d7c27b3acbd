//! `methods` - print the method catalog for both channels.

use arlayer::protocol::{MethodInfo, DATABASE_METHODS, SESSION_METHODS};

use crate::error::CliError;

pub fn run() -> Result<(), CliError> {
    print!("{}", render_catalog());
    Ok(())
}

fn render_catalog() -> String {
    let mut out = String::new();
    render_channel(&mut out, "session", SESSION_METHODS);
    out.push('\n');
    render_channel(&mut out, "database", DATABASE_METHODS);
    out
}

fn render_channel(out: &mut String, channel: &str, methods: &[MethodInfo]) {
    out.push_str(&format!("[{}]\n", channel));
    for method in methods {
        out.push_str(&format!("  {}", method.name));
        if !method.arguments.is_empty() {
            out.push_str(&format!("({})", method.arguments));
        }
        out.push('\n');
        out.push_str(&format!("      {}\n", method.summary));
        if !method.aliases.is_empty() {
            out.push_str(&format!("      aliases: {}\n", method.aliases.join(", ")));
        }
    }
}
