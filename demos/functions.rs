//! Demonstrates AnyFunction as a command registry.
//!
//! Commands are stored by name with their signatures erased, and called with
//! whatever arguments arrive. Arguments are converted to the declared
//! parameter types on each call.
//!
//! Run with: cargo run --example functions

use sovran_any::{any_visitable, Any, AnyError, AnyFunction, Shared};
use std::collections::HashMap;

fn main() -> Result<(), AnyError> {
    let inventory = Any::new(Inventory::default());

    let mut commands: HashMap<&str, AnyFunction> = HashMap::new();

    // Parameters are converted from whatever numeric type arrives
    commands.insert(
        "add",
        AnyFunction::new(|stock: Shared<Inventory>, item: String, count: u32| {
            stock.with_mut(|stock| *stock.items.entry(item).or_insert(0) += count)
        }),
    );

    commands.insert(
        "count",
        AnyFunction::new(|stock: Shared<Inventory>, item: String| {
            stock.with(|stock| stock.items.get(&item).copied().unwrap_or(0))
        }),
    );

    // Erased commands inspect their arguments themselves
    commands.insert(
        "describe",
        AnyFunction::erased(|args: &[Any]| {
            args.iter()
                .map(|arg| arg.type_index().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        }),
    );

    // List the signatures
    let mut names: Vec<_> = commands.keys().copied().collect();
    names.sort();
    for name in &names {
        println!("{}: {:?}", name, commands[name]);
    }

    run(&commands, "add", &[inventory.clone(), Any::new("bolts"), Any::new(40u8)])?;
    run(&commands, "add", &[inventory.clone(), Any::new("bolts"), Any::new(2.0f64)])?;
    run(&commands, "add", &[inventory.clone(), Any::new("nuts"), Any::new(10i64)])?;

    let bolts = run(&commands, "count", &[inventory.clone(), Any::new("bolts")])?;
    println!("Bolts in stock: {}", bolts.get::<u32>()?);

    let types = run(&commands, "describe", &[Any::new(1i8), Any::new("x"), inventory.clone()])?;
    println!("Argument types: {}", types.get::<String>()?);

    // Wrong arity
    match run(&commands, "count", &[inventory.clone()]) {
        Err(AnyError::ArgumentCount { expected, actual }) => {
            println!("count expects {} arguments, got {}", expected, actual)
        }
        other => println!("Unexpected result: {:?}", other),
    }

    // Negative counts do not fit a u32
    match run(&commands, "add", &[inventory.clone(), Any::new("nuts"), Any::new(-5i32)]) {
        Err(e) => println!("Refused: {}", e),
        Ok(_) => println!("This shouldn't happen - negative count accepted"),
    }

    inventory.with(|stock: &Inventory| {
        println!("\nFinal inventory:");
        let mut items: Vec<_> = stock.items.iter().collect();
        items.sort();
        for (item, count) in items {
            println!("  {}: {}", item, count);
        }
    })?;

    Ok(())
}

fn run(commands: &HashMap<&str, AnyFunction>, name: &str, args: &[Any]) -> Result<Any, AnyError> {
    let command = commands.get(name).ok_or(AnyError::Empty)?;
    command.call(args)
}

#[derive(Debug, Default)]
struct Inventory {
    items: HashMap<String, u32>,
}

any_visitable!(Inventory);
