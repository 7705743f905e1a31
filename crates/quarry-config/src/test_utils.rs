use std::env;

/// Puts the saved variables back when dropped, including during a panic.
struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, previous) in self.saved.drain(..) {
            match previous {
                Some(v) => env::set_var(&key, v),
                None => env::remove_var(&key),
            }
        }
    }
}

/// Runs `f` with `vars` exported, restoring the previous environment after.
/// Callers must be `#[serial]`.
pub fn with_env<F: FnOnce()>(vars: Vec<(&str, &str)>, f: F) {
    let _guard = EnvGuard {
        saved: vars
            .iter()
            .map(|(k, _)| (k.to_string(), env::var(k).ok()))
            .collect(),
    };

    for (key, value) in &vars {
        env::set_var(key, value);
    }

    f();
}

#[cfg(test)]
mod tests {
    use std::panic;

    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_env_restored_after_panic() {
        env::remove_var("QUARRY_TEST_GUARD");

        let result = panic::catch_unwind(|| {
            with_env(vec![("QUARRY_TEST_GUARD", "set")], || {
                assert_eq!(env::var("QUARRY_TEST_GUARD").as_deref(), Ok("set"));
                panic!("inside with_env");
            });
        });

        assert!(result.is_err());
        assert!(env::var("QUARRY_TEST_GUARD").is_err());
    }
}
