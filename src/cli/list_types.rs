//! List the capability types and categories the generator understands.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::generator::{CATEGORIES, CapabilityType};

/// Command to list capability types and categories.
#[derive(Args, Debug)]
pub struct ListTypesCommand {}

impl ListTypesCommand {
    pub fn execute(self) -> Result<()> {
        print!("{}", render());
        Ok(())
    }
}

fn render() -> String {
    let mut out = format!("\n{}\n\n", "Supported Capability Types:".bold());
    for kind in CapabilityType::ALL {
        out.push_str(&format!("  - {:<15} → {}\n", kind.slug(), kind.label()));
    }

    out.push_str(&format!("\n{}\n\n", "Supported Categories:".bold()));
    for category in CATEGORIES {
        out.push_str(&format!(
            "  - {:<16} {:<8} → plugins/{}/\n",
            category.slug,
            category.label,
            category.slug
        ));
    }
    out.push('\n');
    out
}
