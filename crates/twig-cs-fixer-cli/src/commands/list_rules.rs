//! List rules command implementation.

use std::io::{self, Write};
use twig_cs_fixer_rules::{all_rules, Standard};

/// Runs the list-rules command.
pub fn run() -> io::Result<()> {
    write_rules(&mut io::stdout().lock())
}

fn write_rules(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "Available rules:\n")?;
    writeln!(out, "{:<22} {:<8} Description", "Name", "Fixable")?;
    writeln!(out, "{}", "-".repeat(80))?;

    for rule in all_rules() {
        let fixable = if rule.as_fixable().is_some() { "yes" } else { "no" };
        writeln!(
            out,
            "{:<22} {:<8} {}",
            rule.name(),
            fixable,
            rule.description()
        )?;
    }

    writeln!(out, "\nStandards:")?;
    for standard in Standard::ALL {
        let names: Vec<_> = standard.rules().iter().map(|r| r.name()).collect();
        let default = if standard == Standard::default() {
            " (default)"
        } else {
            ""
        };
        writeln!(out, "  {:<12} {}{default}", standard.name(), names.join(", "))?;
    }

    writeln!(out, "\nDisable or configure a rule in .twig-cs-fixer.toml, e.g.:")?;
    writeln!(out, "  [rules.TrailingSpace]\n  enabled = false")
}
