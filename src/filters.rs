//! Named predicate filters and the built-in set.

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// A named predicate deciding pass/fail for one value.
///
/// Arguments are the raw string tokens from the rule chain; filters that need
/// numbers parse them themselves.
pub trait Filter: Send + Sync {
    fn check(&self, value: Option<&Value>, args: &[String]) -> bool;
}

impl<F> Filter for F
where
    F: Fn(Option<&Value>, &[String]) -> bool + Send + Sync,
{
    fn check(&self, value: Option<&Value>, args: &[String]) -> bool {
        self(value, args)
    }
}

/// Filters indexed by name. Re-registration overwrites.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    filters: IndexMap<String, Arc<dyn Filter>>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the built-in filters.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        register_builtins(&mut registry);
        registry
    }

    pub fn register<F: Filter + 'static>(&mut self, name: impl Into<String>, filter: F) {
        self.filters.insert(name.into(), Arc::new(filter));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Filter>> {
        self.filters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.filters.keys()).finish()
    }
}

// ─── Built-ins ──────────────────────────────────────────────────────────────

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$").unwrap()
});

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)(https?|ftp)://[^\s/$.?#][^\s]*$").unwrap());

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{4})-(\d{2})-(\d{2})(?:[T ](\d{2}):(\d{2})(?::(\d{2})(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?)?$",
    )
    .unwrap()
});

static ALPHA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\p{L}+$").unwrap());

static ALPHA_NUM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\p{L}\p{N}]+$").unwrap());

static ALPHA_DASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\p{N}_-]+$").unwrap());

/// Registers every built-in filter.
pub fn register_builtins(registry: &mut FilterRegistry) {
    registry.register("required", required);
    registry.register("string", |v: Option<&Value>, _: &[String]| {
        matches!(v, Some(Value::String(_)))
    });
    registry.register("number", |v: Option<&Value>, _: &[String]| {
        matches!(v, Some(Value::Number(_)))
    });
    registry.register("numeric", |v: Option<&Value>, _: &[String]| {
        as_number(v).is_some()
    });
    registry.register("integer", integer);
    registry.register("boolean", boolean);
    registry.register("array", |v: Option<&Value>, _: &[String]| {
        matches!(v, Some(Value::Array(_)))
    });
    registry.register("object", |v: Option<&Value>, _: &[String]| {
        matches!(v, Some(Value::Object(_)))
    });
    registry.register("email", |v: Option<&Value>, _: &[String]| {
        matches_str(v, &EMAIL_RE)
    });
    registry.register("url", |v: Option<&Value>, _: &[String]| matches_str(v, &URL_RE));
    registry.register("date", date);
    registry.register("alpha", |v: Option<&Value>, _: &[String]| {
        matches_str(v, &ALPHA_RE)
    });
    registry.register("alpha_num", |v: Option<&Value>, _: &[String]| {
        matches_str(v, &ALPHA_NUM_RE)
    });
    registry.register("alpha_dash", |v: Option<&Value>, _: &[String]| {
        matches_str(v, &ALPHA_DASH_RE)
    });
    registry.register("min", |v: Option<&Value>, args: &[String]| {
        compare_size(v, args, |size, n| size >= n)
    });
    registry.register("max", |v: Option<&Value>, args: &[String]| {
        compare_size(v, args, |size, n| size <= n)
    });
    registry.register("size", |v: Option<&Value>, args: &[String]| {
        compare_size(v, args, |size, n| size == n)
    });
    registry.register("between", between);
    registry.register("in", |v: Option<&Value>, args: &[String]| one_of(v, args));
    registry.register("not_in", |v: Option<&Value>, args: &[String]| {
        v.is_some() && !one_of(v, args)
    });
    registry.register("regex", regex_filter);
}

fn required(value: Option<&Value>, _: &[String]) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(_) => true,
    }
}

fn integer(value: Option<&Value>, _: &[String]) -> bool {
    match value {
        Some(Value::Number(n)) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        Some(Value::String(s)) => s.trim().parse::<i64>().is_ok(),
        _ => false,
    }
}

/// `boolean` accepts booleans and `"true"`/`"false"`; with an argument the
/// value must also equal it.
fn boolean(value: Option<&Value>, args: &[String]) -> bool {
    let actual = match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) if s == "true" => true,
        Some(Value::String(s)) if s == "false" => false,
        _ => return false,
    };
    match args.first().map(String::as_str) {
        None => true,
        Some("true") => actual,
        Some("false") => !actual,
        Some(_) => false,
    }
}

fn date(value: Option<&Value>, _: &[String]) -> bool {
    let Some(Value::String(s)) = value else {
        return false;
    };
    let Some(caps) = DATE_RE.captures(s) else {
        return false;
    };
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    let (Some(year), Some(month), Some(day)) = (field(1), field(2), field(3)) else {
        return false;
    };
    if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
        return false;
    }
    let hour_ok = field(4).is_none_or(|h| h < 24);
    let minute_ok = field(5).is_none_or(|m| m < 60);
    let second_ok = field(6).is_none_or(|s| s < 60);
    hour_ok && minute_ok && second_ok
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn between(value: Option<&Value>, args: &[String]) -> bool {
    let (Some(low), Some(high)) = (parse_arg(args, 0), parse_arg(args, 1)) else {
        return false;
    };
    measure(value).is_some_and(|size| size >= low && size <= high)
}

fn one_of(value: Option<&Value>, args: &[String]) -> bool {
    match value {
        Some(Value::String(s)) => args.iter().any(|a| a == s),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => {
            let rendered = v.to_string();
            args.iter().any(|a| *a == rendered)
        }
        _ => false,
    }
}

/// Arguments are rejoined with `,` since the chain grammar splits on it.
fn regex_filter(value: Option<&Value>, args: &[String]) -> bool {
    let Some(Value::String(s)) = value else {
        return false;
    };
    match Regex::new(&args.join(",")) {
        Ok(re) => re.is_match(s),
        Err(_) => false,
    }
}

fn matches_str(value: Option<&Value>, re: &Regex) -> bool {
    matches!(value, Some(Value::String(s)) if re.is_match(s))
}

fn as_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Characters for strings, value for numbers, length for arrays and maps.
fn measure(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::String(s) => Some(s.chars().count() as f64),
        Value::Number(n) => n.as_f64(),
        Value::Array(a) => Some(a.len() as f64),
        Value::Object(o) => Some(o.len() as f64),
        _ => None,
    }
}

fn parse_arg(args: &[String], index: usize) -> Option<f64> {
    args.get(index)?.trim().parse::<f64>().ok()
}

fn compare_size(value: Option<&Value>, args: &[String], cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (measure(value), parse_arg(args, 0)) {
        (Some(size), Some(n)) => cmp(size, n),
        _ => false,
    }
}
