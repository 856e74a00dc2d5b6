//! End-to-end binding tests: a request in, a response out.

use std::collections::HashMap;
use std::convert::Infallible;

use bytes::Bytes;
use http::{Request, StatusCode};
use postcall::{Context, Dynamic, Endpoint, Json, Typed};
use serde::Serialize;

fn post(endpoint: &Endpoint, body: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("TestHeader", "abc")
        .body(Bytes::from(body.to_string()))
        .unwrap();

    let response = endpoint.handle(request);
    (response.status(), response.into_body())
}

#[test]
fn test_context_and_list() {
    let endpoint = Endpoint::bind("get_request", |ctx: Context, _: Vec<isize>| {
        if ctx.header("TestHeader") != Some("abc") {
            return Err("header was incorrect".to_string());
        }
        Ok("ok".to_string())
    })
    .unwrap();

    assert!(endpoint.signature().wants_context());
    assert_eq!(
        post(&endpoint, "[[10, 11, 12]]"),
        (StatusCode::OK, "\"ok\"\n".to_string())
    );
}

#[test]
fn test_generic_arguments() {
    let endpoint = Endpoint::bind("generic", |a: isize, b: String, c: f64| -> Result<String, Infallible> {
        Ok(format!("{}+{}+{:.1}", a, b, c))
    })
    .unwrap();

    assert_eq!(
        post(&endpoint, "[1, \"test_string\", 123.2451]"),
        (StatusCode::OK, "\"1+test_string+123.2\"\n".to_string())
    );
}

#[test]
fn test_only_error_fail() {
    let endpoint = Endpoint::bind("only_error_fail", |_: isize, _: String, _: f64| -> Result<(), String> {
        Err("error".to_string())
    })
    .unwrap();

    assert_eq!(
        post(&endpoint, "[1, \"test_string\", 123.2451]"),
        (StatusCode::BAD_REQUEST, "\"error\"\n".to_string())
    );
}

#[test]
fn test_only_error() {
    let endpoint = Endpoint::bind("only_error", |_: isize, _: String, _: f64| -> Result<(), String> {
        Ok(())
    })
    .unwrap();

    assert_eq!(
        post(&endpoint, "[1, \"test_string\", 123.2451]"),
        (StatusCode::OK, String::new())
    );
}

#[test]
fn test_nil_values() {
    let endpoint = Endpoint::bind(
        "nil_values",
        |a: Option<isize>, b: Option<String>, c: HashMap<String, String>| {
            if a.is_none() && b.is_none() && c.is_empty() {
                Ok("ok".to_string())
            } else {
                Err("not everything was nil".to_string())
            }
        },
    )
    .unwrap();

    assert_eq!(
        post(&endpoint, "[null, null, null]"),
        (StatusCode::OK, "\"ok\"\n".to_string())
    );
}

#[derive(Debug, Typed, Serialize)]
struct Outer {
    #[typed(rename = "c")]
    #[serde(rename = "c")]
    a: isize,
    #[typed(rename = "a")]
    #[serde(rename = "a")]
    b: Inner,
}

#[derive(Debug, Typed, Serialize)]
struct Inner {
    #[typed(rename = "b")]
    #[serde(rename = "b")]
    c: String,
}

#[test]
fn test_struct_with_renamed_fields() {
    let endpoint = Endpoint::bind("struct", |a: Outer| -> Result<Json<Outer>, Infallible> {
        Ok(Json(a))
    })
    .unwrap();

    assert_eq!(
        post(&endpoint, r#"[{"c":1233,"a":{"b":"hello"},"unknown":true}]"#),
        (StatusCode::OK, "{\"c\":1233,\"a\":{\"b\":\"hello\"}}\n".to_string())
    );
}

#[test]
fn test_struct_missing_fields_are_zero() {
    let endpoint = Endpoint::bind("struct", |a: Outer| -> Result<String, Infallible> {
        Ok(format!("{}:{}", a.a, a.b.c))
    })
    .unwrap();

    assert_eq!(
        post(&endpoint, r#"[{"A": {}}]"#),
        (StatusCode::OK, "\"0:\"\n".to_string())
    );
}

#[test]
fn test_struct_nested_mismatch() {
    let endpoint = Endpoint::bind("struct", |_: Outer| -> Result<(), Infallible> { Ok(()) }).unwrap();

    assert_eq!(
        post(&endpoint, r#"[{"c":1,"a":{"b":5}}]"#),
        (
            StatusCode::BAD_REQUEST,
            "\"mismatching argument type of 1. argument at 'a.b'. got=float64 expected=string\"\n"
                .to_string()
        )
    );
}

#[test]
fn test_not_nilable() {
    let endpoint = Endpoint::bind("not_nilable", |_: isize, _: String, _: f64| -> Result<Dynamic, Infallible> {
        Ok(Dynamic::Null)
    })
    .unwrap();

    assert_eq!(
        post(&endpoint, "[null, null, null]"),
        (StatusCode::BAD_REQUEST, "\"1. can't be null\"\n".to_string())
    );
}

#[test]
fn test_wrong_type() {
    let endpoint = Endpoint::bind("wrong_type", |_: isize| -> Result<Dynamic, Infallible> {
        Ok(Dynamic::Null)
    })
    .unwrap();

    assert_eq!(
        post(&endpoint, r#"[{"a":1233,"b":{"c":"hello"}}]"#),
        (
            StatusCode::BAD_REQUEST,
            "\"mismatching argument type of 1. argument. got=map expected=int\"\n".to_string()
        )
    );
}

#[test]
fn test_numeric_narrowing_is_silent() {
    let endpoint = Endpoint::bind("narrow", |a: u8, b: i32, c: f32| -> Result<String, Infallible> {
        Ok(format!("{} {} {}", a, b, c))
    })
    .unwrap();

    assert_eq!(
        post(&endpoint, "[300, -2.9, 0.5]"),
        (StatusCode::OK, "\"255 -2 0.5\"\n".to_string())
    );
}

#[test]
fn test_error_wins_over_payload() {
    let endpoint = Endpoint::bind("failing", |n: isize| -> Result<isize, String> {
        Err(format!("{} is not allowed", n))
    })
    .unwrap();

    assert_eq!(
        post(&endpoint, "[7]"),
        (StatusCode::BAD_REQUEST, "\"7 is not allowed\"\n".to_string())
    );
}

#[test]
fn test_second_argument_failure_short_circuits() {
    let endpoint = Endpoint::bind("two", |_: String, _: bool| -> Result<(), Infallible> {
        panic!("must not be invoked")
    })
    .unwrap();

    assert_eq!(
        post(&endpoint, r#"["x", "yes"]"#),
        (
            StatusCode::BAD_REQUEST,
            "\"mismatching argument type of 2. argument. got=string expected=bool\"\n".to_string()
        )
    );
}

#[test]
fn test_dynamic_accepts_anything() {
    let endpoint = Endpoint::bind("any", |v: Dynamic| -> Result<Dynamic, Infallible> { Ok(v) }).unwrap();

    assert_eq!(
        post(&endpoint, r#"[{"list":[1,2.5,null],"ok":true}]"#),
        (
            StatusCode::OK,
            "{\"list\":[1,2.5,null],\"ok\":true}\n".to_string()
        )
    );
}

#[test]
fn test_null_for_dynamic_parameter_fails() {
    let endpoint = Endpoint::bind("any", |v: Dynamic| -> Result<Dynamic, Infallible> { Ok(v) }).unwrap();

    assert_eq!(
        post(&endpoint, "[null]"),
        (StatusCode::BAD_REQUEST, "\"1. can't be null\"\n".to_string())
    );
}

#[test]
fn test_json_value_round_trip_keeps_integers() {
    let endpoint = Endpoint::bind("json", |v: serde_json::Value| -> Result<serde_json::Value, Infallible> {
        Ok(v)
    })
    .unwrap();

    assert_eq!(
        post(&endpoint, r#"[{"n":1233,"l":[1,2],"f":0.25}]"#),
        (
            StatusCode::OK,
            "{\"n\":1233,\"l\":[1,2],\"f\":0.25}\n".to_string()
        )
    );
}
