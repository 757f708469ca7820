//! Type clauses evaluated against registered native values.

use std::sync::Once;

use datex_interface::{
    Capability, Dispatch, Dispatcher, Hook, InterfaceError, Loaded, Registry, RegistryTypeComparator,
    TypeInterface,
};
use datex_logic::{Assertion, Clause, LogicError, MatchConfig, Matcher};
use datex_types::{NativeClass, TypeRef, Value};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

struct Celsius(f64);
struct Fahrenheit(f64);

fn temperature(unit: &str) -> TypeRef {
    TypeRef::new("units", "Temperature").with_variation(unit)
}

fn units_registry() -> Registry {
    let registry = Registry::default();
    registry
        .register(
            TypeInterface::new(TypeRef::new("units", "Temperature"))
                .with_class(NativeClass::of::<Celsius>())
                .with_get_type(|_| temperature("celsius"))
                .with_hook(
                    Capability::Serialize,
                    Hook::returning(|call| {
                        let text = match (
                            call.target.downcast_ref::<Celsius>(),
                            call.target.downcast_ref::<Fahrenheit>(),
                        ) {
                            (Some(c), _) => format!("{}°C", c.0),
                            (_, Some(f)) => format!("{}°F", f.0),
                            _ => String::new(),
                        };
                        Value::new(text)
                    }),
                ),
        )
        .unwrap();
    registry
        .register(
            TypeInterface::new(temperature("fahrenheit"))
                .with_class(NativeClass::of::<Fahrenheit>())
                .with_hook(Capability::Serialize, Hook::returning(|_| Value::new("shadowed"))),
        )
        .unwrap();
    registry
}

#[test]
fn values_satisfy_type_clauses() {
    init_tracing();
    let registry = units_registry();
    let cmp = RegistryTypeComparator::new(&registry);
    let any_temperature = Clause::atom(TypeRef::new("units", "Temperature"));

    assert!(cmp.value_matches(&Value::new(Celsius(21.0)), &any_temperature).unwrap());
    assert!(cmp.value_matches(&Value::new(Fahrenheit(70.0)), &any_temperature).unwrap());

    let not_celsius = Clause::not(Clause::atom(temperature("celsius")));
    assert!(!cmp.value_matches(&Value::new(Celsius(21.0)), &not_celsius).unwrap());
    assert!(cmp.value_matches(&Value::new(Fahrenheit(70.0)), &not_celsius).unwrap());

    // undetermined types satisfy nothing, not even the empty disjunction
    assert!(!cmp.value_matches(&Value::new(21.0_f64), &Clause::or([])).unwrap());
}

#[test]
fn value_side_disjunctions_must_all_match() {
    let registry = units_registry();
    let cmp = RegistryTypeComparator::new(&registry);
    let either = Clause::or([
        Clause::atom(temperature("celsius")),
        Clause::atom(temperature("fahrenheit")),
    ]);

    assert!(cmp
        .type_matches(&either, &Clause::atom(TypeRef::new("units", "Temperature")))
        .unwrap());
    assert!(!cmp.type_matches(&either, &Clause::atom(temperature("celsius"))).unwrap());
    assert!(cmp
        .type_matches(&Clause::and(either_members()), &Clause::atom(temperature("celsius")))
        .unwrap());
}

fn either_members() -> [Clause<TypeRef>; 2] {
    [
        Clause::atom(temperature("celsius")),
        Clause::atom(temperature("fahrenheit")),
    ]
}

#[test]
fn type_assertions_run_inside_target_clauses() {
    let registry = units_registry();
    let cmp = RegistryTypeComparator::new(&registry);
    let metric: Clause<TypeRef> =
        Assertion::native("metric", |ty: &TypeRef| ty.variation() == Some("celsius")).into();
    let target = Clause::and([Clause::atom(TypeRef::new("units", "Temperature")), metric]);

    assert!(cmp.value_matches(&Value::new(Celsius(0.0)), &target).unwrap());
    assert!(!cmp.value_matches(&Value::new(Fahrenheit(32.0)), &target).unwrap());

    let strict = Matcher::direct().with_config(MatchConfig {
        strict_assertions: true,
        ..MatchConfig::default()
    });
    let err = strict
        .matches(&Clause::atom(temperature("fahrenheit")), Some(&target), Some(&cmp))
        .unwrap_err();
    assert_eq!(err.to_string(), "assertion failed: metric is false");
}

#[test]
fn type_clauses_collapse_through_the_registry() {
    let registry = units_registry();
    let cmp = RegistryTypeComparator::new(&registry);
    let matcher = Matcher::<TypeRef>::direct();

    let flat = matcher
        .collapse(
            &Clause::or([Clause::or(either_members()), Clause::atom(temperature("celsius"))]),
            &cmp,
        )
        .unwrap();
    assert!(flat.is_complete());
    assert_eq!(flat.len(), 2);

    let contradiction = matcher
        .collapse(
            &Clause::and([
                Clause::atom(temperature("celsius")),
                Clause::atom(temperature("fahrenheit")),
            ]),
            &cmp,
        )
        .unwrap();
    assert!(!contradiction.is_complete());
    assert!(contradiction.is_empty());

    let asserted: Clause<TypeRef> = Assertion::native("any", |_: &TypeRef| true).into();
    assert!(matches!(
        matcher.collapse(&asserted, &cmp),
        Err(LogicError::UnsupportedAssertion(_))
    ));
}

#[tokio::test]
async fn dispatch_follows_value_types() {
    init_tracing();
    let registry = units_registry();
    let dispatcher = Dispatcher::new(&registry);

    let serialize = |value: Value| async move {
        dispatcher
            .serialize(value, None)
            .await
            .unwrap()
            .done()
            .and_then(|v| v.downcast_ref::<String>().cloned())
    };
    assert_eq!(serialize(Value::new(Celsius(21.0))).await, Some("21°C".to_string()));

    // the root configuration answers before the variant's own
    assert_eq!(serialize(Value::new(Fahrenheit(70.0))).await, Some("70°F".to_string()));
    assert!(registry
        .interface_exact(&temperature("fahrenheit"))
        .is_some_and(|interface| interface.declares(Capability::Serialize)));

    assert!(dispatcher
        .serialize(Value::new(21.0_f64), None)
        .await
        .unwrap()
        .is_not_existing());
}

#[tokio::test]
async fn global_registry_loads_namespaces_lazily() {
    init_tracing();
    struct Kelvin;

    let registry = Registry::global();
    registry.add_loader(["integration-test"], |ty: TypeRef| async move {
        if ty.name() == "Kelvin" {
            Ok::<_, InterfaceError>(Loaded::from(
                TypeInterface::default()
                    .with_class(NativeClass::of::<Kelvin>())
                    .normal_object(true),
            ))
        } else {
            Ok(Loaded::Resolved(false))
        }
    });

    let kelvin = TypeRef::new("integration-test", "Kelvin");
    assert!(registry.load_type_configuration(&kelvin).await.unwrap());
    assert_eq!(
        registry.class_for_type(&kelvin).await.unwrap().id(),
        NativeClass::of::<Kelvin>().id()
    );
    assert_eq!(
        registry
            .class_for_type(&TypeRef::new("integration-test", "Rankine"))
            .await
            .unwrap_err(),
        InterfaceError::TypeNotLoaded(TypeRef::new("integration-test", "Rankine"))
    );

    let keys = Dispatcher::global().keys(Value::new(Kelvin), None).await.unwrap();
    assert!(matches!(keys, Dispatch::NotExisting));
}
