/// Shorthand for `.to_owned()` on string literals and slices
///
/// # Examples
///
/// ```rust
/// use util::str;
///
/// let value: String = str!("Registers refreshed.");
/// assert_eq!(value, "Registers refreshed.");
/// ```
#[macro_export]
macro_rules! str {
    ($a:expr) => {
        $a.to_owned()
    };
}

/// Same as `expect()` but with the error (or nothing, for `Option`) available to build the
/// panic message
///
/// ```rust
/// use util::Expect;
///
/// let result: Result<u16, &'static str> = Ok(502);
/// assert_eq!(result.panic(|e| format!("{} just happened", e)), 502);
/// ```
pub trait Expect<F: FnOnce(Self::Error) -> String> {
    type Value;
    type Error;

    fn panic(self, f: F) -> Self::Value;
}

impl<T, E, F: FnOnce(E) -> String> Expect<F> for Result<T, E> {
    type Value = T;
    type Error = E;

    fn panic(self, f: F) -> Self::Value {
        match self {
            Ok(v) => v,
            Err(e) => panic!("{}", f(e)),
        }
    }
}

impl<T, F: FnOnce(()) -> String> Expect<F> for Option<T> {
    type Value = T;
    type Error = ();

    fn panic(self, f: F) -> Self::Value {
        match self {
            Some(v) => v,
            None => panic!("{}", f(())),
        }
    }
}
