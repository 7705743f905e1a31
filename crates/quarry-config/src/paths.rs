//! XDG directories and path expansion.

use std::{env, iter::Peekable, path::PathBuf, str::Chars};

use crate::error::{ConfigError, Result};

/// Returns `$HOME`, or the current directory when it is unset.
pub fn home_dir() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// `$XDG_CONFIG_HOME`, defaulting to `$HOME/.config`.
pub fn xdg_config_home() -> PathBuf {
    env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// `$XDG_DATA_HOME`, defaulting to `$HOME/.local/share`.
pub fn xdg_data_home() -> PathBuf {
    env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Resolves a path string that may contain environment variables.
///
/// `$VAR` and `${VAR}` are expanded, a leading `~` becomes the home
/// directory, and relative paths are joined onto the current directory.
///
/// # Errors
///
/// * [`ConfigError::EmptyPath`] if the path is blank
/// * [`ConfigError::MissingEnvVar`] if a referenced variable is unset
/// * [`ConfigError::UnclosedVariable`] for `${` without a closing brace
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    let path = path.trim();
    if path.is_empty() {
        return Err(ConfigError::EmptyPath);
    }

    let resolved = PathBuf::from(expand_variables(path)?);
    if resolved.is_absolute() {
        Ok(resolved)
    } else {
        Ok(env::current_dir()?.join(resolved))
    }
}

fn expand_variables(path: &str) -> Result<String> {
    let mut result = String::with_capacity(path.len());
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '$' if chars.peek() == Some(&'{') => {
                chars.next();
                let var = consume_until(&mut chars, '}')?;
                expand_env_var(&var, &mut result, path)?;
            }
            '$' => {
                let var = consume_var_name(&mut chars);
                if var.is_empty() {
                    result.push('$');
                } else {
                    expand_env_var(&var, &mut result, path)?;
                }
            }
            '~' if result.is_empty() => result.push_str(&home_dir().to_string_lossy()),
            _ => result.push(c),
        }
    }

    Ok(result)
}

fn consume_until(chars: &mut Peekable<Chars>, delimiter: char) -> Result<String> {
    let mut var = String::new();
    for c in chars.by_ref() {
        if c == delimiter {
            return Ok(var);
        }
        var.push(c);
    }
    Err(ConfigError::UnclosedVariable {
        input: format!("${{{var}"),
    })
}

fn consume_var_name(chars: &mut Peekable<Chars>) -> String {
    let mut var = String::new();
    while let Some(c) = chars.next_if(|c| c.is_alphanumeric() || *c == '_') {
        var.push(c);
    }
    var
}

fn expand_env_var(var: &str, result: &mut String, original: &str) -> Result<()> {
    match var {
        "HOME" => result.push_str(&home_dir().to_string_lossy()),
        "XDG_CONFIG_HOME" => result.push_str(&xdg_config_home().to_string_lossy()),
        "XDG_DATA_HOME" => result.push_str(&xdg_data_home().to_string_lossy()),
        _ => {
            let value = env::var(var).map_err(|_| ConfigError::MissingEnvVar {
                input: original.into(),
                var: var.into(),
            })?;
            result.push_str(&value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;
    use crate::test_utils::with_env;

    #[test]
    #[serial]
    fn test_xdg_defaults() {
        with_env(vec![("HOME", "/home/quarry")], || {
            env::remove_var("XDG_CONFIG_HOME");
            env::remove_var("XDG_DATA_HOME");
            assert_eq!(xdg_config_home(), PathBuf::from("/home/quarry/.config"));
            assert_eq!(xdg_data_home(), PathBuf::from("/home/quarry/.local/share"));
        });
    }

    #[test]
    #[serial]
    fn test_resolve_tilde_and_vars() {
        with_env(
            vec![("HOME", "/home/quarry"), ("QUARRY_TEST_DIR", "/srv/data")],
            || {
                assert_eq!(
                    resolve_path("~/db/quarry.db").unwrap(),
                    PathBuf::from("/home/quarry/db/quarry.db")
                );
                assert_eq!(
                    resolve_path("$QUARRY_TEST_DIR/q.db").unwrap(),
                    PathBuf::from("/srv/data/q.db")
                );
                assert_eq!(
                    resolve_path("${QUARRY_TEST_DIR}/q.db").unwrap(),
                    PathBuf::from("/srv/data/q.db")
                );
                assert_eq!(resolve_path("/a/$/b").unwrap(), PathBuf::from("/a/$/b"));
            },
        );
    }

    #[test]
    #[serial]
    fn test_resolve_errors() {
        env::remove_var("QUARRY_TEST_UNSET");
        assert!(matches!(resolve_path("  "), Err(ConfigError::EmptyPath)));
        assert!(matches!(
            resolve_path("$QUARRY_TEST_UNSET/x"),
            Err(ConfigError::MissingEnvVar { .. })
        ));
        assert!(matches!(
            resolve_path("/tmp/${HOME"),
            Err(ConfigError::UnclosedVariable { .. })
        ));
    }

    #[test]
    fn test_relative_path_is_absolute() {
        let resolved = resolve_path("quarry.db").unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("quarry.db"));
    }
}
