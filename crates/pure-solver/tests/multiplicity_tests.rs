use super::*;

#[test]
fn test_print_forms() {
    assert_eq!(Multiplicity::ONE.to_string(), "1");
    assert_eq!(Multiplicity::ZERO_ONE.to_string(), "0..1");
    assert_eq!(Multiplicity::ZERO_MANY.to_string(), "*");
    assert_eq!(Multiplicity::ONE_MANY.to_string(), "1..*");
    assert_eq!(Multiplicity::exactly(2).to_string(), "2");
    assert_eq!(Multiplicity::parameter("m").print_bracketed(), "[m]");
}

#[test]
fn test_parse_accepts_bracketed_and_bare() {
    assert_eq!("[1]".parse::<Multiplicity>(), Ok(Multiplicity::ONE));
    assert_eq!("0..1".parse::<Multiplicity>(), Ok(Multiplicity::ZERO_ONE));
    assert_eq!("[*]".parse::<Multiplicity>(), Ok(Multiplicity::ZERO_MANY));
    assert_eq!("1..*".parse::<Multiplicity>(), Ok(Multiplicity::ONE_MANY));
    assert_eq!("[m]".parse::<Multiplicity>(), Ok(Multiplicity::parameter("m")));
}

#[test]
fn test_parse_rejects_garbage() {
    assert!("[]".parse::<Multiplicity>().is_err());
    assert!("2..1".parse::<Multiplicity>().is_err());
    assert!("[1".parse::<Multiplicity>().is_err());
    assert!("1..x".parse::<Multiplicity>().is_err());
    let err = "a b".parse::<Multiplicity>().unwrap_err();
    assert_eq!(err.to_string(), "Invalid multiplicity 'a b'");
}

#[test]
fn test_subsumes() {
    assert!(Multiplicity::ZERO_MANY.subsumes(&Multiplicity::ONE));
    assert!(Multiplicity::ZERO_MANY.subsumes(&Multiplicity::ONE_MANY));
    assert!(Multiplicity::ZERO_ONE.subsumes(&Multiplicity::ONE));
    assert!(!Multiplicity::ONE.subsumes(&Multiplicity::ZERO_ONE));
    assert!(!Multiplicity::ONE.subsumes(&Multiplicity::ZERO_MANY));
    assert!(Multiplicity::parameter("m").subsumes(&Multiplicity::parameter("m")));
    assert!(!Multiplicity::ZERO_MANY.subsumes(&Multiplicity::parameter("m")));
}

#[test]
fn test_to_one_and_to_many() {
    assert!(Multiplicity::ONE.is_to_one());
    assert!(Multiplicity::ZERO_ONE.is_to_one());
    assert!(!Multiplicity::ZERO_MANY.is_to_one());
    assert!(Multiplicity::ZERO_MANY.is_to_many());
    assert!(Multiplicity::exactly(2).is_to_many());
    assert!(!Multiplicity::parameter("m").is_to_many());
}

#[test]
fn test_intersect() {
    assert_eq!(
        Multiplicity::ZERO_MANY.intersect(&Multiplicity::ONE),
        Some(Multiplicity::ONE)
    );
    assert_eq!(
        Multiplicity::ONE_MANY.intersect(&Multiplicity::ZERO_ONE),
        Some(Multiplicity::ONE)
    );
    assert_eq!(Multiplicity::ZERO.intersect(&Multiplicity::ONE_MANY), None);
}

#[test]
fn test_min_subsuming() {
    let result = Multiplicity::min_subsuming([&Multiplicity::ONE, &Multiplicity::ZERO_ONE]);
    assert_eq!(result, Multiplicity::ZERO_ONE);

    let result = Multiplicity::min_subsuming([&Multiplicity::ONE, &Multiplicity::ONE_MANY]);
    assert_eq!(result, Multiplicity::ONE_MANY);

    let param = Multiplicity::parameter("m");
    assert_eq!(
        Multiplicity::min_subsuming([&Multiplicity::ONE, &param]),
        Multiplicity::ZERO_MANY
    );
    assert_eq!(Multiplicity::min_subsuming([]), Multiplicity::ZERO);
}

#[test]
fn test_sum_of_collection_elements() {
    let sum = Multiplicity::sum([&Multiplicity::ONE, &Multiplicity::ONE]);
    assert_eq!(sum, Multiplicity::exactly(2));

    let sum = Multiplicity::sum([&Multiplicity::ONE, &Multiplicity::ZERO_ONE]);
    assert_eq!(sum, Multiplicity::range(1, Some(2)));

    let sum = Multiplicity::sum([&Multiplicity::ONE, &Multiplicity::ZERO_MANY]);
    assert_eq!(sum, Multiplicity::ONE_MANY);

    assert_eq!(Multiplicity::sum([]), Multiplicity::ZERO);
}
