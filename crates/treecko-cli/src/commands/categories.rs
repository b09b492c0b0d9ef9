//! Category management command.

use clap::{Args, Subcommand};
use console::style;

use treecko_core::{TransactionStore, TreeckoConfig};

use super::open_store;

/// Arguments for the categories command.
#[derive(Args)]
pub struct CategoriesArgs {
    #[command(subcommand)]
    command: CategoriesCommand,
}

#[derive(Subcommand)]
enum CategoriesCommand {
    /// List categories
    List,

    /// Add a category
    Add {
        /// Category name
        name: String,
    },

    /// Delete a category
    Delete {
        /// Category name
        name: String,
    },

    /// Set or clear the category of a stored transaction
    Assign {
        /// Stored transaction id
        id: i64,

        /// Category name (omit to clear)
        name: Option<String>,
    },
}

pub async fn run(args: CategoriesArgs, config: &TreeckoConfig) -> anyhow::Result<()> {
    let mut store = open_store(config)?;

    match args.command {
        CategoriesCommand::List => {
            let categories = store.categories()?;
            if categories.is_empty() {
                println!("No categories defined.");
            }
            for category in categories {
                println!("{}", category.name);
            }
        }
        CategoriesCommand::Add { name } => {
            let category = store.add_category(name.trim())?;
            println!("{} Added category '{}'", style("✓").green(), category.name);
        }
        CategoriesCommand::Delete { name } => {
            if store.delete_category(&name)? {
                println!("{} Deleted category '{}'", style("✓").green(), name);
            } else {
                anyhow::bail!("Category not found: {}", name);
            }
        }
        CategoriesCommand::Assign { id, name } => {
            store.set_category(id, name.as_deref())?;
            match name {
                Some(name) => println!("{} Transaction #{} is now '{}'", style("✓").green(), id, name),
                None => println!("{} Cleared category of transaction #{}", style("✓").green(), id),
            }
        }
    }

    Ok(())
}
