//! Plist helpers over `lexpr` values.
//!
//! Profiles and replay scripts are written as Emacs-style property lists,
//! e.g. `(:navigation-start-threshold 0.03 :use-rails-navigation t)`.

use lexpr::Value;

use crate::math::Vec3;

/// Find the value following `:key` in a plist.
///
/// Handles both `Value::Keyword("key")` (elisp parser) and
/// `Value::Symbol(":key")` (default parser) forms.
pub fn plist_get<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let prefixed = format!(":{}", key);
    let mut current = value;
    loop {
        match current {
            Value::Cons(pair) => {
                let is_key = match pair.car() {
                    Value::Keyword(k) => k.as_ref() == key,
                    Value::Symbol(s) => s.as_ref() == prefixed,
                    _ => false,
                };
                if is_key {
                    return match pair.cdr() {
                        Value::Cons(next) => Some(next.car()),
                        _ => None,
                    };
                }
                current = pair.cdr();
            }
            _ => return None,
        }
    }
}

/// Render an atom as a plain string. Keywords lose their leading colon.
pub fn atom_string(value: &Value) -> String {
    match value {
        Value::Keyword(v) => v.to_string(),
        Value::Symbol(v) => {
            let s = v.to_string();
            s.strip_prefix(':').unwrap_or(&s).to_string()
        }
        Value::String(v) => v.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => bool_sexp(*b).to_string(),
        Value::Nil | Value::Null => "nil".to_string(),
        other => other.to_string(),
    }
}

/// Extract a keyword value from a plist as a string.
pub fn get_keyword(value: &Value, key: &str) -> Option<String> {
    plist_get(value, key).map(atom_string)
}

/// Extract an integer value from a plist.
pub fn get_int(value: &Value, key: &str) -> Option<i64> {
    get_keyword(value, key).and_then(|s| s.parse().ok())
}

/// Extract a floating-point value from a plist.
pub fn get_float(value: &Value, key: &str) -> Option<f64> {
    get_keyword(value, key).and_then(|s| s.parse().ok())
}

/// Extract a boolean value from a plist.
/// Treats "nil" as false, anything else as true.
pub fn get_bool(value: &Value, key: &str) -> Option<bool> {
    get_keyword(value, key).map(|s| s != "nil")
}

/// Items of a proper list. Anything else yields an empty vector.
pub fn list_items(value: &Value) -> Vec<&Value> {
    let mut items = Vec::new();
    let mut current = value;
    while let Value::Cons(pair) = current {
        items.push(pair.car());
        current = pair.cdr();
    }
    items
}

/// Extract a list value from a plist.
pub fn get_list<'a>(value: &'a Value, key: &str) -> Vec<&'a Value> {
    plist_get(value, key).map(list_items).unwrap_or_default()
}

/// Extract a three-element numeric list as a vector.
pub fn get_vec3(value: &Value, key: &str) -> Option<Vec3> {
    let items = get_list(value, key);
    if items.len() != 3 {
        return None;
    }
    let mut out = [0.0f32; 3];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = atom_string(item).parse::<f32>().ok()?;
    }
    Some(Vec3::from(out))
}

/// Escape a string for s-expression output.
pub fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// `t` / `nil` for s-expression output.
pub fn bool_sexp(b: bool) -> &'static str {
    if b {
        "t"
    } else {
        "nil"
    }
}
