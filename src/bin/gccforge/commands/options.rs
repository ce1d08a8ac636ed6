//! `gccforge options` command

use anyhow::Result;
use serde_json::json;

use crate::cli::OptionsArgs;
use gccforge::core::recipe::Recipe;

pub fn execute(args: OptionsArgs) -> Result<()> {
    let recipe = Recipe::gcc48();

    if args.json {
        let options: Vec<_> = recipe
            .options()
            .iter()
            .map(|o| json!({ "name": o.as_str(), "description": o.description() }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&options)?);
        return Ok(());
    }

    let width = recipe
        .options()
        .iter()
        .map(|o| o.as_str().len())
        .max()
        .unwrap_or(0);
    for option in recipe.options() {
        println!("--{:<width$}  {}", option.as_str(), option.description(), width = width);
    }

    Ok(())
}
