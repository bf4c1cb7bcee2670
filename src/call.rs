//! Call Module
//!
//! The inputs of one invocation of a memoized computation: positional
//! arguments, keyword arguments and a per-call invalidation token.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::key::RequestView;

// == Arg ==
/// A single positional or keyword input.
#[derive(Debug, Clone)]
pub enum Arg {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<Arg>),
    Map(BTreeMap<String, Arg>),
    Null,
    /// A request-like object, consumed by the `request` key strategy
    Request(Arc<dyn RequestView>),
}

impl Arg {
    /// Wraps a request so it can be passed as an argument.
    pub fn request(request: impl RequestView + 'static) -> Self {
        Arg::Request(Arc::new(request))
    }

    /// Returns true if the `args` strategy folds this input into the key.
    ///
    /// Maps, nulls and requests are ignored, so calls differing only in
    /// those inputs share a key.
    pub fn is_key_material(&self) -> bool {
        matches!(
            self,
            Arg::Str(_) | Arg::Int(_) | Arg::Float(_) | Arg::Bool(_) | Arg::List(_)
        )
    }

    /// Returns the request view if this argument carries one.
    pub fn as_request(&self) -> Option<&dyn RequestView> {
        match self {
            Arg::Request(request) => Some(request.as_ref()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Arg::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Arg::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Str(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other),
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Str(s) => f.write_str(s),
            Arg::Int(n) => write!(f, "{}", n),
            // Debug keeps the fractional part, so 1 and 1.0 render differently
            Arg::Float(x) => write!(f, "{:?}", x),
            Arg::Bool(b) => write!(f, "{}", b),
            Arg::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt_nested(f)?;
                }
                f.write_str("]")
            }
            Arg::Map(map) => {
                f.write_str("{")?;
                for (i, (name, item)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}: ", name)?;
                    item.fmt_nested(f)?;
                }
                f.write_str("}")
            }
            Arg::Null => f.write_str("null"),
            Arg::Request(_) => f.write_str("<request>"),
        }
    }
}

// == Conversions ==
impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Str(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Str(s)
    }
}

impl From<i64> for Arg {
    fn from(n: i64) -> Self {
        Arg::Int(n)
    }
}

impl From<i32> for Arg {
    fn from(n: i32) -> Self {
        Arg::Int(i64::from(n))
    }
}

impl From<u32> for Arg {
    fn from(n: u32) -> Self {
        Arg::Int(i64::from(n))
    }
}

impl From<f64> for Arg {
    fn from(x: f64) -> Self {
        Arg::Float(x)
    }
}

impl From<bool> for Arg {
    fn from(b: bool) -> Self {
        Arg::Bool(b)
    }
}

impl<T: Into<Arg>> From<Vec<T>> for Arg {
    fn from(items: Vec<T>) -> Self {
        Arg::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(value: Option<T>) -> Self {
        value.map_or(Arg::Null, Into::into)
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Arg::Null,
            Value::Bool(b) => Arg::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Arg::Int(i),
                None => Arg::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Arg::Str(s),
            Value::Array(items) => Arg::List(items.into_iter().map(Arg::from).collect()),
            Value::Object(map) => {
                Arg::Map(map.into_iter().map(|(k, v)| (k, Arg::from(v))).collect())
            }
        }
    }
}

// == Call ==
/// Inputs of one invocation, built fluently:
///
/// ```
/// use mini_memoize::Call;
///
/// let call = Call::new().arg(2024).kwarg("age", 7).no_cache();
/// assert_eq!(call.args().len(), 1);
/// assert!(call.wants_no_cache());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Call {
    args: Vec<Arg>,
    kwargs: BTreeMap<String, Arg>,
    no_cache: bool,
}

impl Call {
    /// Creates a call with no inputs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a call whose first positional argument is `request`.
    pub fn with_request(request: impl RequestView + 'static) -> Self {
        Self::new().arg(Arg::request(request))
    }

    /// Appends a positional argument.
    pub fn arg(mut self, arg: impl Into<Arg>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Sets a keyword argument. Keyword arguments never affect the key.
    pub fn kwarg(mut self, name: impl Into<String>, arg: impl Into<Arg>) -> Self {
        self.kwargs.insert(name.into(), arg.into());
        self
    }

    /// Requests invalidation of whatever key this call derives.
    pub fn no_cache(mut self) -> Self {
        self.no_cache = true;
        self
    }

    /// Sets the invalidation token from a flag.
    pub fn with_no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    pub fn kwargs(&self) -> &BTreeMap<String, Arg> {
        &self.kwargs
    }

    pub fn kwarg_value(&self, name: &str) -> Option<&Arg> {
        self.kwargs.get(name)
    }

    /// Returns true if the caller asked for this call's key to be invalidated.
    pub fn wants_no_cache(&self) -> bool {
        self.no_cache
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_rendering() {
        assert_eq!(Arg::from("abc").to_string(), "abc");
        assert_eq!(Arg::from(42).to_string(), "42");
        assert_eq!(Arg::from(1.0).to_string(), "1.0");
        assert_eq!(Arg::from(2.5).to_string(), "2.5");
        assert_eq!(Arg::from(true).to_string(), "true");
    }

    #[test]
    fn test_list_rendering_quotes_nested_strings() {
        let arg = Arg::from(vec![Arg::from("a"), Arg::from(1), Arg::from(vec![false])]);
        assert_eq!(arg.to_string(), r#"["a", 1, [false]]"#);
    }

    #[test]
    fn test_key_material_types() {
        assert!(Arg::from("x").is_key_material());
        assert!(Arg::from(1).is_key_material());
        assert!(Arg::from(1.5).is_key_material());
        assert!(Arg::from(true).is_key_material());
        assert!(Arg::from(vec![1, 2]).is_key_material());

        assert!(!Arg::Null.is_key_material());
        assert!(!Arg::Map(BTreeMap::new()).is_key_material());
    }

    #[test]
    fn test_from_json_value() {
        let arg = Arg::from(json!({"year": 2024, "ratio": 0.5, "tags": ["a"], "x": null}));

        match arg {
            Arg::Map(map) => {
                assert_eq!(map["year"].as_i64(), Some(2024));
                assert!(matches!(map["ratio"], Arg::Float(r) if r == 0.5));
                assert!(matches!(&map["tags"], Arg::List(items) if items.len() == 1));
                assert!(matches!(map["x"], Arg::Null));
            }
            other => panic!("expected a map, got {:?}", other),
        }
    }

    #[test]
    fn test_option_conversion() {
        assert!(matches!(Arg::from(None::<i64>), Arg::Null));
        assert_eq!(Arg::from(Some("a")).as_str(), Some("a"));
    }

    #[test]
    fn test_call_builder() {
        let call = Call::new().arg(3).arg("x").kwarg("age", 7);

        assert_eq!(call.args().len(), 2);
        assert_eq!(call.args()[0].as_i64(), Some(3));
        assert_eq!(call.kwarg_value("age").and_then(Arg::as_i64), Some(7));
        assert!(!call.wants_no_cache());
        assert!(call.clone().no_cache().wants_no_cache());
        assert!(!call.with_no_cache(false).wants_no_cache());
    }
}
