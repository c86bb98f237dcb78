/// Flags exactly as supplied on the command line.
///
/// `increment_build_number` is `None` when the caller did not pass it, which
/// is distinct from passing it with a value of `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestedFlags {
    pub do_not_increment: bool,
    pub increment_build_number: Option<bool>,
    pub increment_revision_number: bool,
    pub do_not_check_in: bool,
}

/// Effective options for one stamping run.
///
/// Computed once from [RequestedFlags] and passed by value into every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StampOptions {
    pub increment_build: bool,
    pub increment_revision: bool,
    pub check_in: bool,
}

impl StampOptions {
    /// Applies the precedence rules between the requested flags.
    ///
    /// - `do_not_increment` turns off both increments and check-in, whatever else was passed.
    /// - A revision increment requested without an explicit build flag does not also
    ///   bump the build number.
    /// - The build number is incremented by default.
    pub fn resolve(flags: &RequestedFlags) -> Self {
        if flags.do_not_increment {
            return StampOptions {
                increment_build: false,
                increment_revision: false,
                check_in: false,
            };
        }

        let increment_build = match flags.increment_build_number {
            Some(explicit) => explicit,
            None => !flags.increment_revision_number,
        };

        StampOptions {
            increment_build,
            increment_revision: flags.increment_revision_number,
            check_in: !flags.do_not_check_in,
        }
    }
}

impl Default for StampOptions {
    fn default() -> Self {
        StampOptions::resolve(&RequestedFlags::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_increment_build_and_check_in() {
        let options = StampOptions::default();
        assert!(options.increment_build);
        assert!(!options.increment_revision);
        assert!(options.check_in);
    }

    #[test]
    fn test_do_not_increment_overrides_everything() {
        let combos = [
            (None, false, false),
            (Some(true), true, false),
            (Some(true), false, false),
            (None, true, true),
            (Some(false), true, false),
        ];

        for (build, revision, no_check_in) in combos {
            let flags = RequestedFlags {
                do_not_increment: true,
                increment_build_number: build,
                increment_revision_number: revision,
                do_not_check_in: no_check_in,
            };
            let options = StampOptions::resolve(&flags);
            assert!(!options.increment_build, "flags: {:?}", flags);
            assert!(!options.increment_revision, "flags: {:?}", flags);
            assert!(!options.check_in, "flags: {:?}", flags);
        }
    }

    #[test]
    fn test_revision_only_disables_build() {
        let flags = RequestedFlags {
            increment_revision_number: true,
            ..Default::default()
        };
        let options = StampOptions::resolve(&flags);
        assert!(!options.increment_build);
        assert!(options.increment_revision);
    }

    #[test]
    fn test_revision_and_explicit_build() {
        let flags = RequestedFlags {
            increment_build_number: Some(true),
            increment_revision_number: true,
            ..Default::default()
        };
        let options = StampOptions::resolve(&flags);
        assert!(options.increment_build);
        assert!(options.increment_revision);
    }

    #[test]
    fn test_explicit_build_off() {
        let flags = RequestedFlags {
            increment_build_number: Some(false),
            ..Default::default()
        };
        let options = StampOptions::resolve(&flags);
        assert!(!options.increment_build);
        assert!(!options.increment_revision);
        assert!(options.check_in);
    }

    #[test]
    fn test_do_not_check_in() {
        let flags = RequestedFlags {
            do_not_check_in: true,
            ..Default::default()
        };
        let options = StampOptions::resolve(&flags);
        assert!(options.increment_build);
        assert!(!options.check_in);
    }
}
