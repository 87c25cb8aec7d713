// src/macros.rs

/// String shorthand: `s!()` → empty, `s!(x)` → `String::from(x)`.
#[macro_export]
macro_rules! s {
    () => {
        ::std::string::String::new()
    };
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}

/// Concatenate string slices into a fresh `String`.
#[macro_export]
macro_rules! join {
    ($first:expr $(, $rest:expr)+ $(,)?) => {{
        let mut s = ::std::string::String::from($first);
        $(
            s.push_str($rest);
        )+
        s
    }};
}

/// Build a set of normalized column names: `names!["Id", " Notes "]`.
#[macro_export]
macro_rules! names {
    () => {
        ::std::collections::BTreeSet::<::std::string::String>::new()
    };
    ($($name:expr),+ $(,)?) => {{
        let mut set = ::std::collections::BTreeSet::<::std::string::String>::new();
        $(
            set.insert($crate::core::sanitize::normalize_name($name));
        )+
        set
    }};
}
