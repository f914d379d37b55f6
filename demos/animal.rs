use sovran_any::{any_visitable, visitor_pointer_cast, Any, AnyError, Ref, Shared};

// Base type shared by every animal
#[derive(Debug, Clone)]
struct Animal {
    name: String,
    sound: String,
}

#[derive(Debug, Clone)]
struct Dog {
    animal: Animal,
    tricks: Vec<String>,
}

#[derive(Debug, Clone)]
struct Cat {
    animal: Animal,
    lives: u8,
}

impl AsRef<Animal> for Dog {
    fn as_ref(&self) -> &Animal {
        &self.animal
    }
}

impl AsMut<Animal> for Dog {
    fn as_mut(&mut self) -> &mut Animal {
        &mut self.animal
    }
}

impl AsRef<Animal> for Cat {
    fn as_ref(&self) -> &Animal {
        &self.animal
    }
}

impl AsMut<Animal> for Cat {
    fn as_mut(&mut self) -> &mut Animal {
        &mut self.animal
    }
}

any_visitable!(Animal);
any_visitable!(Dog: [Ref<Animal>]);
any_visitable!(Cat: [Ref<Animal>]);

fn speak(any: &Any) -> Result<String, AnyError> {
    any.with(|animal: &Animal| format!("{} says: {}", animal.name, animal.sound))
}

fn main() -> Result<(), AnyError> {
    let pets = vec![
        Any::new(Dog {
            animal: Animal {
                name: "Rover".to_string(),
                sound: "Woof!".to_string(),
            },
            tricks: vec!["sit".to_string(), "roll over".to_string()],
        }),
        Any::new(Cat {
            animal: Animal {
                name: "Whiskers".to_string(),
                sound: "Meow!".to_string(),
            },
            lives: 9,
        }),
    ];

    // Every pet can be viewed as an Animal
    for pet in &pets {
        println!("{} ({})", speak(pet)?, pet.type_index());
    }

    // Rename through the base view
    pets[0].with_mut(|animal: &mut Animal| animal.name = "Rover Jr.".to_string())?;
    println!("After rename: {}", speak(&pets[0])?);

    // Hold on to the base, then recover the concrete type
    let animals: Vec<Shared<Animal>> = pets
        .iter()
        .filter_map(|pet| pet.get_shared::<Animal>())
        .collect();

    for animal in &animals {
        if let Some(dog) = visitor_pointer_cast::<Dog, _>(animal) {
            dog.with(|dog| println!("{} knows {:?}", dog.animal.name, dog.tricks))?;
        } else if let Some(cat) = visitor_pointer_cast::<Cat, _>(animal) {
            cat.with(|cat| println!("{} has {} lives", cat.animal.name, cat.lives))?;
        }
    }

    // Try viewing a cat as a dog (should fail)
    match pets[1].with(|_: &Dog| ()) {
        Ok(_) => println!("This shouldn't happen - a cat is not a dog"),
        Err(AnyError::TypeMismatch { from, to }) => {
            println!("Correctly detected that {} is not {}", from, to)
        }
        Err(e) => println!("Unexpected error: {}", e),
    }

    // The handles keep the pets alive after the containers are gone
    drop(pets);
    for animal in &animals {
        println!("Still here: {}", animal.with(|animal| animal.name.clone())?);
    }

    Ok(())
}
