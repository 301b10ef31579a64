//! 规则评估性能基准测试
//!
//! 针对单条规则和整张表单的校验进行性能测试。

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::{Value, json};
use std::hint::black_box;
use validation_engine::{
    BindingCompiler, FieldValidator, FormValues, NoFields, RuleKind, RuleRegistry,
    ValidationOptions,
};

/// 单条规则基准
fn bench_single_rules(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_rules");
    let registry = RuleRegistry::global();

    let cases: Vec<(RuleKind, Value, ValidationOptions)> = vec![
        (RuleKind::Req, json!("hello"), ValidationOptions::default()),
        (RuleKind::Email, json!("a.b@c-d.com"), ValidationOptions::default()),
        (RuleKind::Password, json!("Secret123"), ValidationOptions::default()),
        (
            RuleKind::Length,
            json!("abcdef"),
            ValidationOptions::new().min(2).max(30),
        ),
        (
            RuleKind::Number,
            json!("1234.56"),
            ValidationOptions::new().float().decimals(2).min(1).max(5000),
        ),
        (
            RuleKind::Number,
            json!("100000000000000000000"),
            ValidationOptions::new().max("99999999999999999999"),
        ),
        (
            RuleKind::Regular,
            json!("Douglas"),
            ValidationOptions::new().regex(r"^[a-zA-Z\s'.-]{1,35}$"),
        ),
        (RuleKind::Address, json!("12 Harbour Road"), ValidationOptions::default()),
    ];

    for (i, (kind, value, options)) in cases.iter().enumerate() {
        group.bench_with_input(
            BenchmarkId::new(kind.as_str(), i),
            &(kind, value, options),
            |b, (kind, value, options)| {
                b.iter(|| {
                    registry.evaluate(
                        black_box(**kind),
                        black_box(Some(*value)),
                        black_box(*options),
                        "Field",
                        &NoFields,
                    )
                })
            },
        );
    }

    group.finish();
}

/// 整张表单基准
fn bench_form_validation(c: &mut Criterion) {
    let schema = BindingCompiler::new()
        .compile_schema_json(
            r##"
            {
                "fields": [
                    { "field": "first_name", "rules": [ { "rule": "req" }, { "rule": "letter_symbol" } ] },
                    { "field": "email", "rules": [ { "rule": "req" }, { "rule": "email" } ] },
                    {
                        "field": "password",
                        "rules": [ { "rule": "req" }, { "rule": "length", "options": { "min": 6, "max": 25 } }, { "rule": "password" } ]
                    },
                    { "field": "password_confirm", "rules": [ { "rule": "compare", "options": { "to": "#password" } } ] }
                ]
            }
            "##,
        )
        .unwrap();

    let valid = FormValues::new(json!({
        "first_name": "Mary",
        "email": "mary@example.com",
        "password": "Secret123",
        "password_confirm": "Secret123"
    }));
    let invalid = FormValues::new(json!({
        "first_name": "",
        "email": "mary@",
        "password": "abc",
        "password_confirm": "abd"
    }));

    let validator = FieldValidator::new();
    let mut group = c.benchmark_group("form_validation");

    group.bench_function("valid_form", |b| {
        b.iter(|| validator.validate_form(black_box(&schema), black_box(&valid)))
    });
    group.bench_function("invalid_form_short_circuit", |b| {
        b.iter(|| validator.validate_form(black_box(&schema), black_box(&invalid)))
    });

    group.finish();
}

criterion_group!(benches, bench_single_rules, bench_form_validation);
criterion_main!(benches);
