// src/function_tests.rs
#[cfg(test)]
mod tests {
    use crate::{any_visitable, Any, AnyError, AnyFunction, Ref, Shared, TypeIndex};
    use tracing_test::traced_test;

    #[derive(Debug, Clone, PartialEq)]
    struct Account {
        owner: String,
        balance: i64,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Savings {
        account: Account,
        rate: f64,
    }

    impl AsRef<Account> for Savings {
        fn as_ref(&self) -> &Account {
            &self.account
        }
    }

    impl AsMut<Account> for Savings {
        fn as_mut(&mut self) -> &mut Account {
            &mut self.account
        }
    }

    any_visitable!(Account);
    any_visitable!(Savings: [Ref<Account>]);

    fn savings() -> Savings {
        Savings {
            account: Account {
                owner: "ada".to_string(),
                balance: 100,
            },
            rate: 0.02,
        }
    }

    #[test]
    fn test_call_converts_arguments() -> Result<(), AnyError> {
        let scale = AnyFunction::new(|value: f64, factor: i32| value * f64::from(factor));

        let result = scale.call(&[Any::new(1.5f32), Any::new(4u8)])?;
        assert_eq!(result.get::<f64>()?, 6.0);
        assert_eq!(result.type_index(), TypeIndex::of::<f64>());

        // float arguments truncate when the parameter is an integer
        let result = scale.call(&[Any::new(2i64), Any::new(3.9f64)])?;
        assert_eq!(result.get::<f64>()?, 6.0);
        Ok(())
    }

    #[test]
    fn test_argument_count_mismatch() {
        let concat = AnyFunction::new(|a: String, b: String| a + &b);

        let err = concat.call(&[Any::new("one")]).unwrap_err();
        assert_eq!(
            err,
            AnyError::ArgumentCount {
                expected: 2,
                actual: 1
            }
        );

        let err = concat
            .call(&[Any::new("a"), Any::new("b"), Any::new("c")])
            .unwrap_err();
        assert_eq!(
            err,
            AnyError::ArgumentCount {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_argument_cast_failure() {
        let length = AnyFunction::new(|text: String| text.len());

        match length.call(&[Any::new(5i32)]) {
            Err(AnyError::TypeMismatch { from, to }) => {
                assert_eq!(from, TypeIndex::of::<i32>());
                assert_eq!(to, TypeIndex::of::<String>());
            }
            other => panic!("expected a type mismatch, got {:?}", other),
        }

        // empty arguments are reported as such
        assert_eq!(length.call(&[Any::default()]).unwrap_err(), AnyError::Empty);
    }

    #[test]
    fn test_argument_types() {
        let f = AnyFunction::new(|_: i32, _: String, _: Vec<u8>| true);

        assert_eq!(f.argument_count(), Some(3));
        assert_eq!(f.argument_type(0), Ok(TypeIndex::of::<i32>()));
        assert_eq!(f.argument_type(1), Ok(TypeIndex::of::<String>()));
        assert_eq!(f.argument_type(2), Ok(TypeIndex::of::<Vec<u8>>()));
        assert_eq!(f.return_type(), TypeIndex::of::<bool>());
        assert_eq!(
            f.argument_type(3),
            Err(AnyError::ArgumentIndex { index: 3, count: 3 })
        );
    }

    #[test]
    fn test_zero_arity() -> Result<(), AnyError> {
        let answer = AnyFunction::new(|| 42u32);
        assert_eq!(answer.argument_count(), Some(0));
        assert_eq!(
            answer.argument_type(0),
            Err(AnyError::ArgumentIndex { index: 0, count: 0 })
        );
        assert_eq!(answer.call(&[])?.get::<u32>()?, 42);
        assert!(answer.call(&[Any::new(1)]).is_err());
        Ok(())
    }

    #[test]
    fn test_unit_return_gives_empty_any() -> Result<(), AnyError> {
        let noop = AnyFunction::new(|_: bool| ());
        assert_eq!(noop.return_type(), TypeIndex::void());

        let result = noop.call(&[Any::new(true)])?;
        assert!(result.is_empty());
        Ok(())
    }

    #[test]
    fn test_result_return_propagates() -> Result<(), AnyError> {
        let checked = AnyFunction::new(|value: i64| {
            if value < 0 {
                Err(AnyError::Empty)
            } else {
                Ok(value * 2)
            }
        });
        assert_eq!(checked.return_type(), TypeIndex::of::<i64>());
        assert_eq!(checked.call_with((21i64,))?.get::<i64>()?, 42);
        assert_eq!(checked.call_with((-1i64,)).unwrap_err(), AnyError::Empty);
        Ok(())
    }

    #[test]
    fn test_erased_function() -> Result<(), AnyError> {
        let count = AnyFunction::erased(|args: &[Any]| args.len());

        assert_eq!(count.argument_count(), None);
        assert_eq!(count.argument_type(7), Ok(TypeIndex::of::<Any>()));
        assert_eq!(count.return_type(), TypeIndex::of::<usize>());
        assert_eq!(count.call(&[])?.get::<usize>()?, 0);
        assert_eq!(
            count
                .call(&[Any::new(1), Any::new("two"), Any::new(3.0)])?
                .get::<usize>()?,
            3
        );
        Ok(())
    }

    #[test]
    fn test_any_parameter_receives_alias() -> Result<(), AnyError> {
        let bump = AnyFunction::new(|any: Any| any.with_mut(|value: &mut i32| *value += 1));
        let value = Any::new(1i32);

        let result = bump.call(std::slice::from_ref(&value))?;
        assert!(result.is_empty());
        assert_eq!(value.get::<i32>()?, 2);
        Ok(())
    }

    #[test]
    fn test_shared_parameter_mutates_caller_value() -> Result<(), AnyError> {
        let deposit = AnyFunction::new(|account: Shared<Account>, amount: i64| {
            account.with_mut(|account| account.balance += amount)
        });

        let value = Any::new(savings());
        deposit.call(&[value.clone(), Any::new(50i32)])?;

        let balance = value.with(|savings: &Savings| savings.account.balance)?;
        assert_eq!(balance, 150);
        Ok(())
    }

    #[test]
    fn test_base_view_parameter() -> Result<(), AnyError> {
        let owner = AnyFunction::new(|account: Account| account.owner);
        let result = owner.call(&[Any::new(savings())])?;
        assert_eq!(result.get::<String>()?, "ada");

        // a base does not convert to its derived type
        let rate = AnyFunction::new(|savings: Savings| savings.rate);
        assert!(matches!(
            rate.call(&[Any::new(Account {
                owner: "bob".to_string(),
                balance: 0
            })]),
            Err(AnyError::TypeMismatch { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_functions_are_values() -> Result<(), AnyError> {
        let double = AnyFunction::new(|x: i32| x * 2);
        let stored = Any::new(double);

        let f = stored.get::<AnyFunction>()?;
        assert_eq!(f.call_with((21,))?.get::<i32>()?, 42);
        assert_eq!(format!("{:?}", f), "AnyFunction(fn(i32) -> i32)");
        Ok(())
    }

    #[test]
    fn test_call_with_vector_arguments() -> Result<(), AnyError> {
        let join = AnyFunction::new(|a: String, b: char, c: u16| format!("{}{}{}", a, b, c));
        let args = vec![Any::new("x"), Any::new('-'), Any::new(7u8)];
        assert_eq!(join.call_with(args)?.get::<String>()?, "x-7");
        Ok(())
    }

    #[test]
    #[traced_test]
    fn test_arity_mismatch_is_logged() {
        let f = AnyFunction::new(|_: u8| ());
        assert!(f.call(&[]).is_err());
        assert!(logs_contain("argument count mismatch"));
    }
}
