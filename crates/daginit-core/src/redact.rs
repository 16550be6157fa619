use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Flag that introduces the cookie on the release command line
pub const SECRET_FLAG: &str = "--cookie";

/// Fixed replacement for any cookie value
pub const SECRET_MASK: &str = "**********";

// Covers the generated cookie alphabet as well, so random cookies are masked whole.
static COOKIE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"--cookie [A-Za-z0-9_=!?\-]+").expect("cookie pattern is valid"));

/// Masks the cookie in a rendered command line. Everything outside the
/// token is left untouched, and masking an already masked line is a no-op.
pub fn redact(command_line: &str) -> Cow<'_, str> {
    COOKIE_REGEX.replace_all(command_line, format!("{SECRET_FLAG} {SECRET_MASK}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacts_token() {
        let line = "/rel/releases/1/elixir --cookie abc-DEF_12= --boot /rel/releases/1/start";
        assert_eq!(
            redact(line),
            "/rel/releases/1/elixir --cookie ********** --boot /rel/releases/1/start"
        );
    }

    #[test]
    fn test_redacts_generated_alphabet() {
        let line = "elixir --cookie a!b?c=9 --no-halt";
        assert_eq!(redact(line), "elixir --cookie ********** --no-halt");
    }

    #[test]
    fn test_mask_length_is_fixed() {
        for token in ["a", "0123456789abcdefghijklmnopqrstuvwxyz"] {
            let line = format!("x --cookie {token}");
            assert_eq!(redact(&line), "x --cookie **********");
        }
    }

    #[test]
    fn test_idempotent() {
        let line = "elixir --cookie secret123 --sname demo";
        let once = redact(line).into_owned();
        let twice = redact(&once).into_owned();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_no_cookie_is_unchanged() {
        let line = "elixir --boot start --erl +fnue -mode embedded";
        assert!(matches!(redact(line), Cow::Borrowed(_)));
        assert_eq!(redact(line), line);
    }

    #[test]
    fn test_token_at_end_of_line() {
        assert_eq!(redact("--cookie zzz"), "--cookie **********");
    }
}
