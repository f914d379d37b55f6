use sovran_any::{Any, AnyError, TypeIndex};

fn describe(any: &Any) -> String {
    format!("{} ({})", any.get::<f64>().unwrap_or(f64::NAN), any.type_index())
}

fn main() -> Result<(), AnyError> {
    // Store numbers of different types
    let values = vec![
        Any::new(42i32),
        Any::new(7u8),
        Any::new(-3i64),
        Any::new(2.5f32),
        Any::new(5.9f64),
    ];

    // Every number can be read as any other arithmetic type
    for value in &values {
        println!("As f64: {}", describe(value));
    }

    let total: i64 = values
        .iter()
        .map(|value| value.get::<i64>())
        .sum::<Result<i64, AnyError>>()?;
    println!("Sum as i64 (floats truncated): {}", total);

    // Conversions are checked
    let big = Any::new(300i32);
    match big.get::<u8>() {
        Ok(value) => println!("This shouldn't happen - got {}", value),
        Err(AnyError::TypeMismatch { from, to }) => {
            println!("Correctly refused to squeeze {} into {}", from, to)
        }
        Err(e) => println!("Unexpected error: {}", e),
    }

    // Update a number in place; every alias sees the change
    let counter = Any::new(0u32);
    let alias = counter.clone();
    for _ in 0..3 {
        alias.with_mut(|count: &mut u32| *count += 1)?;
    }
    println!("Counter: {}", counter.get::<u32>()?);

    // Conversions are by value only, borrows need the stored type
    match counter.with(|count: &u64| *count) {
        Ok(_) => println!("This shouldn't happen - borrowed a u32 as u64"),
        Err(e) => println!("Borrow as u64 failed: {}", e),
    }

    // An empty container reports its emptiness
    let empty = Any::default();
    println!("Empty type: {}", empty.type_index());
    assert_eq!(empty.type_index(), TypeIndex::void());
    if let Err(e) = empty.get::<i32>() {
        println!("Empty get: {}", e);
    }

    Ok(())
}
