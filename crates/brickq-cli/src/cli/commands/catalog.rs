//! `brickq catalog`: list and show saved queries.

use anyhow::{anyhow, Result};
use brickq_client::{catalog, SAVED_QUERIES};

use super::super::args::{CatalogArgs, CatalogSub};
use crate::exit_codes::EXIT_SUCCESS;

pub fn run(args: CatalogArgs) -> Result<i32> {
    match args.cmd {
        CatalogSub::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(SAVED_QUERIES)?);
            } else {
                for query in SAVED_QUERIES {
                    println!("{}", query.name);
                }
            }
            Ok(EXIT_SUCCESS)
        }
        CatalogSub::Show { name } => match catalog::find(&name) {
            Some(query) => {
                println!("{}", query.body.trim_end());
                Ok(EXIT_SUCCESS)
            }
            None => Err(unknown_query(&name)),
        },
    }
}

pub(crate) fn unknown_query(name: &str) -> anyhow::Error {
    anyhow!("no saved query named {:?} (see `brickq catalog list`)", name)
}
