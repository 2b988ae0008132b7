use std::{
    borrow::Cow,
    fmt::{Debug, Display},
};

pub enum Error {
    Derive(keystretch::Error),
    InvalidField(&'static str),
    InvalidHex(&'static str),
    Io(std::io::Error),
    Mismatch,
    Toml(toml::de::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Derive(e) => Display::fmt(e, f),
            Self::InvalidField(field) => write!(f, "invalid value for config field `{field}`"),
            Self::InvalidHex(what) => write!(f, "{what} is not valid hex"),
            Self::Io(e) => Display::fmt(e, f),
            Self::Mismatch => f.write_str("the derived key does not match"),
            Self::Toml(e) => write!(f, "could not parse TOML config: {e}"),
        }
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl From<keystretch::Error> for Error {
    fn from(value: keystretch::Error) -> Self {
        Self::Derive(value)
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<toml::de::Error> for Error {
    fn from(value: toml::de::Error) -> Self {
        Self::Toml(value)
    }
}

pub struct Context {
    error: Error,
    context: Option<Cow<'static, str>>,
}

impl Display for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{}: {}", context, self.error)
        } else {
            Display::fmt(&self.error, f)
        }
    }
}

impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self, f)
    }
}

impl From<Error> for Context {
    fn from(error: Error) -> Self {
        Self {
            error,
            context: None,
        }
    }
}

pub trait ResultExt<T> {
    fn context<C: Into<Cow<'static, str>>>(self, context: C) -> Result<T, Context>;
}

impl<T, E: Into<Error>> ResultExt<T> for Result<T, E> {
    fn context<C: Into<Cow<'static, str>>>(self, context: C) -> Result<T, Context> {
        self.map_err(|e| Context {
            error: e.into(),
            context: Some(context.into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_prefixes_the_error() {
        let r: Result<(), Error> = Err(Error::InvalidField("cost"));
        let e = r.context("while reading config").unwrap_err();
        assert_eq!(
            e.to_string(),
            "while reading config: invalid value for config field `cost`"
        );
        assert_eq!(Context::from(Error::Mismatch).to_string(), "the derived key does not match");
    }

    #[test]
    fn library_errors_convert() {
        let r = keystretch::scrypt(b"pw", b"salt", 3, 1, 1, 16).context("deriving");
        let e = r.unwrap_err().to_string();
        assert!(e.starts_with("deriving: invalid scrypt parameters"), "{e}");
    }
}
