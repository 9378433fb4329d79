use std::sync::LazyLock;

use regex::Regex;

use crate::data::NO_NAMESPACE;

/// Keys containing any of these characters would break downstream columns.
static PROBLEM_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[=\+/&<>;'"\?%#$@,\. \t\r\n]"#).expect("valid regex"));

// Empty segments are rejected: `:x` or `x:` would otherwise produce an empty
// namespace or local name column.
static NAMESPACED_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_]+(:[a-z_]+)+$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyClass {
    pub namespace: String,
    pub local_name: String,
    pub well_formed: bool,
}

impl KeyClass {
    pub fn has_namespace(&self) -> bool {
        self.namespace != NO_NAMESPACE
    }
}

pub fn is_well_formed(raw_key: &str) -> bool {
    !PROBLEM_CHARS.is_match(raw_key)
}

/// Splits `addr:street` into `("addr", "street")`. Only keys made entirely of
/// lowercase/underscore segments joined by single colons get a namespace;
/// anything else is kept whole under [`NO_NAMESPACE`].
pub fn classify(raw_key: &str) -> KeyClass {
    let well_formed = is_well_formed(raw_key);
    if well_formed && NAMESPACED_KEY.is_match(raw_key) {
        if let Some((namespace, local_name)) = raw_key.split_once(':') {
            return KeyClass {
                namespace: namespace.to_string(),
                local_name: local_name.to_string(),
                well_formed,
            };
        }
    }
    KeyClass {
        namespace: NO_NAMESPACE.to_string(),
        local_name: raw_key.to_string(),
        well_formed,
    }
}
