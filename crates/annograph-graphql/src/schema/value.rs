//! Conversions between handler JSON and GraphQL values.

use async_graphql::Value;
use async_graphql::dynamic::ResolverContext;

use crate::handler::Parameters;

/// Name of the scalar that carries arbitrary JSON.
pub const JSON_SCALAR: &str = "JSON";

/// Creates the JSON scalar type.
pub fn create_json_scalar() -> async_graphql::dynamic::Scalar {
    async_graphql::dynamic::Scalar::new(JSON_SCALAR)
        .description("A JSON scalar value. Accepts any valid JSON.")
}

/// Converts a `serde_json::Value` to an `async_graphql::Value`.
pub(crate) fn json_to_graphql_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else if let Some(f) = n.as_f64() {
                async_graphql::Number::from_f64(f).map_or(Value::Null, Value::Number)
            } else {
                Value::Null
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => {
            Value::List(arr.into_iter().map(json_to_graphql_value).collect())
        }
        serde_json::Value::Object(obj) => {
            let map: async_graphql::indexmap::IndexMap<async_graphql::Name, Value> = obj
                .into_iter()
                .map(|(k, v)| (async_graphql::Name::new(k), json_to_graphql_value(v)))
                .collect();
            Value::Object(map)
        }
    }
}

/// Collects the arguments supplied for the current field.
///
/// Arguments the request omits are absent from the result.
pub(crate) fn collect_parameters(ctx: &ResolverContext<'_>) -> Result<Parameters, async_graphql::Error> {
    let mut parameters = Parameters::new();
    for (name, value) in ctx.args.as_index_map() {
        parameters.insert(name.to_string(), value.clone().into_json()?);
    }
    Ok(parameters)
}

/// Reads a field out of the parent object value.
pub(crate) fn extract_field(
    ctx: &ResolverContext<'_>,
    field_name: &str,
) -> Result<Option<Value>, async_graphql::Error> {
    if let Some(parent) = ctx.parent_value.as_value()
        && let Value::Object(obj) = parent
        && let Some(value) = obj.get(&async_graphql::Name::new(field_name))
    {
        return Ok(Some(value.clone()));
    }
    Ok(None)
}
