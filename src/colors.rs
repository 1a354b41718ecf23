//! Fixed ANSI color tables for write-pattern decorations.

pub const RESET: &str = "\x1b[0m";

/// Foreground escape for a color name, `None` if the name is unknown.
pub fn foreground(name: &str) -> Option<&'static str> {
    let code = match name {
        "black" => "\x1b[30m",
        "red" => "\x1b[31m",
        "green" => "\x1b[32m",
        "yellow" => "\x1b[33m",
        "blue" => "\x1b[34m",
        "magenta" => "\x1b[35m",
        "cyan" => "\x1b[36m",
        "white" => "\x1b[37m",
        "brightblack" => "\x1b[90m",
        "brightred" => "\x1b[91m",
        "brightgreen" => "\x1b[92m",
        "brightyellow" => "\x1b[93m",
        "brightblue" => "\x1b[94m",
        "brightmagenta" => "\x1b[95m",
        "brightcyan" => "\x1b[96m",
        "brightwhite" => "\x1b[97m",
        _ => return None,
    };
    Some(code)
}

/// Background escape for a color name, `None` if the name is unknown.
pub fn background(name: &str) -> Option<&'static str> {
    let code = match name {
        "black" => "\x1b[40m",
        "red" => "\x1b[41m",
        "green" => "\x1b[42m",
        "yellow" => "\x1b[43m",
        "blue" => "\x1b[44m",
        "magenta" => "\x1b[45m",
        "cyan" => "\x1b[46m",
        "white" => "\x1b[47m",
        "brightblack" => "\x1b[100m",
        "brightred" => "\x1b[101m",
        "brightgreen" => "\x1b[102m",
        "brightyellow" => "\x1b[103m",
        "brightblue" => "\x1b[104m",
        "brightmagenta" => "\x1b[105m",
        "brightcyan" => "\x1b[106m",
        "brightwhite" => "\x1b[107m",
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_colors() {
        assert_eq!(foreground("red"), Some("\x1b[31m"));
        assert_eq!(background("red"), Some("\x1b[41m"));
        assert_eq!(foreground("brightcyan"), Some("\x1b[96m"));
    }

    #[test]
    fn test_unknown_color() {
        assert_eq!(foreground("crimson"), None);
        assert_eq!(background(""), None);
    }
}
