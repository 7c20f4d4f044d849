//! Path helpers shared by the configuration layer and the embedded backend.

use std::{
    env,
    iter::Peekable,
    path::{PathBuf, MAIN_SEPARATOR},
    str::Chars,
};

use crate::error::{PathError, PathResult};

/// Resolves a user supplied path into an absolute [`PathBuf`].
///
/// `$VAR` and `${VAR}` are expanded from the environment, a leading `~` becomes the home
/// directory and relative paths are joined onto the current working directory.
///
/// # Errors
///
/// * [`PathError::Empty`] if the input is blank
/// * [`PathError::MissingEnvVar`] if a referenced variable is unset
/// * [`PathError::UnclosedVariable`] for `${` without a matching `}`
/// * [`PathError::CurrentDir`] if the working directory cannot be read
///
/// # Example
///
/// ```
/// use sqldb_utils::path::resolve_path;
///
/// let path = resolve_path("/var/lib/sqldb").unwrap();
/// assert!(path.is_absolute());
/// ```
pub fn resolve_path(path: &str) -> PathResult<PathBuf> {
    let path = path.trim();
    if path.is_empty() {
        return Err(PathError::Empty);
    }

    let expanded = PathBuf::from(expand_vars(path)?);
    if expanded.is_absolute() {
        return Ok(expanded);
    }

    env::current_dir()
        .map(|cwd| cwd.join(expanded))
        .map_err(|source| PathError::CurrentDir { source })
}

/// Expands `~`, `$VAR` and `${VAR}` in `input`.
///
/// A `$` that is not followed by a variable name is kept as is.
pub fn expand_vars(input: &str) -> PathResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '~' if out.is_empty() => out.push_str(&home_dir().to_string_lossy()),
            '$' if chars.peek() == Some(&'{') => {
                chars.next();
                let name = take_braced(&mut chars)?;
                out.push_str(&lookup(&name, input)?);
            }
            '$' => {
                let name = take_name(&mut chars);
                if name.is_empty() {
                    out.push('$');
                } else {
                    out.push_str(&lookup(&name, input)?);
                }
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

fn take_braced(chars: &mut Peekable<Chars>) -> PathResult<String> {
    let mut name = String::new();
    for c in chars.by_ref() {
        if c == '}' {
            return Ok(name);
        }
        name.push(c);
    }
    Err(PathError::UnclosedVariable {
        input: format!("${{{name}"),
    })
}

fn take_name(chars: &mut Peekable<Chars>) -> String {
    let mut name = String::new();
    while let Some(c) = chars.next_if(|c| c.is_alphanumeric() || *c == '_') {
        name.push(c);
    }
    name
}

fn lookup(name: &str, input: &str) -> PathResult<String> {
    match name {
        "HOME" => Ok(home_dir().to_string_lossy().into_owned()),
        "XDG_CONFIG_HOME" => Ok(xdg_config_home().to_string_lossy().into_owned()),
        "XDG_DATA_HOME" => Ok(xdg_data_home().to_string_lossy().into_owned()),
        _ => env::var(name).map_err(|_| PathError::MissingEnvVar {
            var: name.into(),
            input: input.into(),
        }),
    }
}

/// Returns `$HOME`, falling back to the working directory when it is unset.
pub fn home_dir() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .or_else(|_| env::current_dir())
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Returns `$XDG_CONFIG_HOME` or `~/.config`.
pub fn xdg_config_home() -> PathBuf {
    env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns `$XDG_DATA_HOME` or `~/.local/share`.
pub fn xdg_data_home() -> PathBuf {
    env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local").join("share"))
}

/// Rewrites both `/` and `\` into the platform separator.
pub fn normalize_separators(path: &str) -> String {
    path.chars()
        .map(|c| if c == '/' || c == '\\' { MAIN_SEPARATOR } else { c })
        .collect()
}

/// Joins an embedded database directory and file name.
///
/// The directory keeps its textual form (no variable expansion), has its separators
/// normalized and gains a trailing separator before `name` is appended. An empty `host`
/// yields `name` unchanged.
///
/// ```
/// use sqldb_utils::path::database_file;
///
/// assert_eq!(database_file("", "app.db"), "app.db");
/// ```
pub fn database_file(host: &str, name: &str) -> String {
    let host = host.trim();
    if host.is_empty() {
        return name.to_string();
    }

    let mut dir = normalize_separators(host);
    if !dir.ends_with(MAIN_SEPARATOR) {
        dir.push(MAIN_SEPARATOR);
    }
    dir.push_str(name);
    dir
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serial_test::serial;
    use tempfile::TempDir;

    use super::*;

    #[test]
    #[serial]
    fn test_expand_vars() {
        env::set_var("SQLDB_TEST_DIR", "/srv/data");

        assert_eq!(expand_vars("$SQLDB_TEST_DIR/db").unwrap(), "/srv/data/db");
        assert_eq!(expand_vars("${SQLDB_TEST_DIR}/db").unwrap(), "/srv/data/db");
        assert_eq!(expand_vars("cost$").unwrap(), "cost$");

        env::remove_var("SQLDB_TEST_DIR");
    }

    #[test]
    #[serial]
    fn test_expand_vars_errors() {
        env::remove_var("SQLDB_SURELY_UNSET");

        assert!(matches!(
            expand_vars("$SQLDB_SURELY_UNSET/x"),
            Err(PathError::MissingEnvVar { .. })
        ));
        assert!(matches!(
            expand_vars("${HOME"),
            Err(PathError::UnclosedVariable { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_tilde_and_home() {
        env::set_var("HOME", "/home/sqldb");

        assert_eq!(expand_vars("~/data").unwrap(), "/home/sqldb/data");
        assert_eq!(expand_vars("a~b").unwrap(), "a~b");
        assert_eq!(home_dir(), PathBuf::from("/home/sqldb"));
    }

    #[test]
    #[serial]
    fn test_xdg_dirs() {
        env::set_var("HOME", "/home/sqldb");
        env::remove_var("XDG_CONFIG_HOME");
        env::remove_var("XDG_DATA_HOME");

        assert_eq!(xdg_config_home(), PathBuf::from("/home/sqldb/.config"));
        assert_eq!(xdg_data_home(), PathBuf::from("/home/sqldb/.local/share"));

        env::set_var("XDG_CONFIG_HOME", "/etc/xdg");
        assert_eq!(xdg_config_home(), PathBuf::from("/etc/xdg"));
        env::remove_var("XDG_CONFIG_HOME");
    }

    #[test]
    fn test_resolve_path() {
        assert!(matches!(resolve_path("   "), Err(PathError::Empty)));

        let abs = resolve_path("/tmp/sqldb").unwrap();
        assert_eq!(abs, PathBuf::from("/tmp/sqldb"));

        let rel = resolve_path("relative.db").unwrap();
        assert!(rel.is_absolute());
        assert!(rel.ends_with("relative.db"));
    }

    #[test]
    fn test_database_file() {
        let sep = MAIN_SEPARATOR;

        assert_eq!(database_file("", "app.db"), "app.db");
        assert_eq!(
            database_file("/var/db", "app.db"),
            format!("{sep}var{sep}db{sep}app.db")
        );
        assert_eq!(
            database_file("data\\nested/", "app.db"),
            format!("data{sep}nested{sep}app.db")
        );
    }

    #[test]
    #[serial]
    fn test_database_file_under_resolved_dir() {
        let dir = TempDir::new().unwrap();
        env::set_var("SQLDB_TEST_ROOT", dir.path());

        let data_dir = resolve_path("${SQLDB_TEST_ROOT}/nested").unwrap();
        fs::create_dir_all(&data_dir).unwrap();

        let file = database_file(&data_dir.to_string_lossy(), "app.db");
        fs::write(&file, b"").unwrap();
        assert!(dir.path().join("nested").join("app.db").is_file());

        env::remove_var("SQLDB_TEST_ROOT");
    }
}
