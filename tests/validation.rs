mod support;

use std::sync::mpsc;
use std::time::Duration;

use futures::future::BoxFuture;
use schema_model::serde_json::{json, Map, Value};
use schema_model::{
    required, Check, CheckContext, CheckError, Constraint, FailureKind, InlineRunner, Model,
    ModelError, ModelOptions, PropertyDescriptor, Schema, Validator, Violation, DEFAULT_GROUP,
};
use support::{failing_after, passing_after};

fn signup_schema() -> Schema {
    Schema::new()
        .property(
            "email",
            PropertyDescriptor::new()
                .filter("string")
                .constraint(required(["g1"])),
        )
        .property("name", PropertyDescriptor::new().filter("string").value("Ada"))
}

#[tokio::test]
async fn grouped_constraint_runs_only_for_its_group_and_default() {
    support::init_tracing();
    let model = Model::new(signup_schema(), ModelOptions::default()).unwrap();

    let failures = model.validate("g1").await.unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].tag, "required");
    assert_eq!(failures[0].group, "g1");
    assert_eq!(failures[0].property_name.as_deref(), Some("email"));
    assert_eq!(failures[0].property_value, Some(json!("")));
    assert_eq!(failures[0].status_code, 422);

    assert!(model.validate("g2").await.unwrap().is_empty());

    let failures = model.validate(DEFAULT_GROUP).await.unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].group, DEFAULT_GROUP);
}

#[tokio::test]
async fn ungrouped_checks_run_under_every_group() {
    let schema = Schema::new().property(
        "email",
        PropertyDescriptor::new()
            .filter("string")
            .constraint(required(Vec::<String>::new())),
    );
    let model = Model::new(schema, ModelOptions::default()).unwrap();

    for group in [DEFAULT_GROUP, "g1", "anything"] {
        assert_eq!(model.validate(group).await.unwrap().len(), 1);
    }
}

#[tokio::test]
async fn passing_model_has_no_failures() {
    let mut model = Model::new(signup_schema(), ModelOptions::default()).unwrap();
    model.set("email", "ada@example.com").unwrap();
    assert!(model.validate("g1").await.unwrap().is_empty());
}

#[tokio::test]
async fn results_keep_scheduling_order() {
    let schema = Schema::new()
        .property(
            "first",
            PropertyDescriptor::new()
                .constraint(failing_after("slow", 40))
                .constraint(failing_after("fast", 1)),
        )
        .property(
            "second",
            PropertyDescriptor::new()
                .constraint(failing_after("instant", 0))
                .validate(failing_after("last", 10)),
        );
    let options = ModelOptions::default().validator(
        Validator::new(|_, _| async {
            Err::<(), _>(CheckError::from(Violation::validator("model", Map::new())))
        }),
    );
    let model = Model::new(schema, options).unwrap();

    let failures = model.validate(DEFAULT_GROUP).await.unwrap();
    let tags: Vec<_> = failures.iter().map(|f| f.tag.as_str()).collect();
    assert_eq!(tags, vec!["slow", "fast", "instant", "last", "model"]);
    assert_eq!(failures[4].kind, FailureKind::Validator);
    assert_eq!(failures[4].property_name, None);
}

#[tokio::test]
async fn fault_rejects_the_whole_validation() {
    let fault = Constraint::new(|_, _| async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        Err::<(), _>(CheckError::fault("lookup service unavailable"))
    });
    let schema = Schema::new()
        .property("a", PropertyDescriptor::new().constraint(passing_after(1)))
        .property("b", PropertyDescriptor::new().constraint(failing_after("b", 1)))
        .property("c", PropertyDescriptor::new().constraint(fault));
    let options = ModelOptions::default().validator(Validator::sync(|_, _| Ok(())));
    let model = Model::new(schema, options).unwrap();

    let err = model.validate(DEFAULT_GROUP).await.unwrap_err();
    assert!(matches!(err, ModelError::PipelineFault(_)));
    assert_eq!(
        err.to_string(),
        "validation check faulted: lookup service unavailable"
    );
}

#[tokio::test]
async fn validators_see_the_serialized_model() {
    let equal_passwords = Validator::sync(|snapshot: &Value, context: &CheckContext| {
        assert_eq!(context.property, None);
        if snapshot["password"] == snapshot["confirm"] {
            return Ok(());
        }
        let mut props = Map::new();
        props.insert("password".into(), snapshot["password"].clone());
        props.insert("confirm".into(), snapshot["confirm"].clone());
        Err(Violation::validator("equalPasswords", props)
            .with_status(400)
            .into())
    })
    .groups(["signup"]);

    let schema = Schema::new()
        .property("password", PropertyDescriptor::new().value("secret"))
        .property("confirm", PropertyDescriptor::new().value("other"));
    let mut model =
        Model::new(schema, ModelOptions::default().validator(equal_passwords)).unwrap();

    assert!(model.validate("login").await.unwrap().is_empty());

    let failures = model.validate("signup").await.unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].tag, "equalPasswords");
    assert_eq!(failures[0].status_code, 400);
    assert_eq!(failures[0].props.as_ref().unwrap()["confirm"], json!("other"));

    model.set("confirm", "secret").unwrap();
    assert!(model.validate("signup").await.unwrap().is_empty());
}

#[tokio::test]
async fn constraints_receive_coerced_values_and_context() {
    let adult = Constraint::new(|value: Value, context: CheckContext| async move {
        assert_eq!(context.property.as_deref(), Some("age"));
        match value.as_i64() {
            Some(age) if age >= 18 => Ok(()),
            _ => Err(CheckError::from(
                Violation::constraint("adult").with_message("must be an adult"),
            )),
        }
    });
    let schema = Schema::new().property(
        "age",
        PropertyDescriptor::new().filter("integer").value("17.9").constraint(adult),
    );
    let model = Model::new(schema, ModelOptions::default()).unwrap();

    let failures = model.validate(DEFAULT_GROUP).await.unwrap();
    assert_eq!(failures[0].property_value, Some(json!(17)));
    assert_eq!(failures[0].message.as_deref(), Some("must be an adult"));
}

#[tokio::test]
async fn validation_future_outlives_the_model_borrow() {
    let model = Model::new(signup_schema(), ModelOptions::default()).unwrap();
    let pending = model.validate("g1");
    drop(model);

    let failures = tokio::spawn(pending).await.unwrap().unwrap();
    assert_eq!(failures.len(), 1);
}

#[test]
fn validate_with_inline_runner_calls_back() {
    let model = Model::new(signup_schema(), ModelOptions::default()).unwrap();
    let (tx, rx) = mpsc::channel();

    model.validate_with("g1", &InlineRunner, move |outcome| {
        tx.send(outcome.map(|failures| failures.len())).unwrap();
    });

    assert_eq!(rx.recv().unwrap().unwrap(), 1);
}

#[tokio::test]
async fn validate_with_spawning_runner() {
    let model = Model::new(signup_schema(), ModelOptions::default()).unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel();
    let runner = |task: BoxFuture<'static, ()>| {
        tokio::spawn(task);
    };

    model.validate_with("g2", &runner, move |outcome| {
        let _ = tx.send(outcome.map(|failures| failures.is_empty()));
    });

    assert!(rx.await.unwrap().unwrap());
}

#[tokio::test]
async fn failures_serialize_with_camel_case_keys() {
    let model = Model::new(signup_schema(), ModelOptions::default()).unwrap();
    let failures = model.validate("g1").await.unwrap();

    let encoded = schema_model::serde_json::to_value(&failures[0]).unwrap();
    assert_eq!(
        encoded,
        json!({
            "kind": "Constraint",
            "propertyName": "email",
            "propertyValue": "",
            "tag": "required",
            "group": "g1",
            "statusCode": 422
        })
    );
}

#[test]
fn sync_checks_work_without_a_runtime() {
    let even = Check::sync(|value, _| match value.as_i64() {
        Some(n) if n % 2 == 0 => Ok(()),
        _ => Err(Violation::constraint("even").into()),
    });
    let schema = Schema::new().property("n", PropertyDescriptor::new().value(3).constraint(even));
    let model = Model::new(schema, ModelOptions::default()).unwrap();

    let (tx, rx) = mpsc::channel();
    model.validate_with(DEFAULT_GROUP, &InlineRunner, move |outcome| {
        tx.send(outcome.unwrap()).unwrap();
    });
    assert_eq!(rx.recv().unwrap()[0].tag, "even");
}
